use std::fs;
use std::ops::Bound;
use std::path::{Path, PathBuf};

use redb::{Database, ReadOnlyTable, ReadableTable, TableDefinition, WriteTransaction};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::options::{Durability, StoreOptions};
use crate::traits::{OrderedStore, StoreCursor};

/// File name of the database inside a queue directory.
pub const DB_FILE_NAME: &str = "queue.redb";

const QUEUE_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("queue");

/// Persistent ordered store backed by a single redb file.
///
/// The storage location is a directory; the database lives at
/// `<dir>/queue.redb`. Every `put`/`delete` is its own write transaction,
/// every cursor reads from its own read transaction (a snapshot), and
/// [`take_first`](OrderedStore::take_first) runs in one write transaction so
/// a dequeue cannot race another.
pub struct RedbStore {
    db: Database,
    path: PathBuf,
    durability: Durability,
}

impl RedbStore {
    /// Create a new store in `dir`, failing if one already exists there.
    pub fn create(dir: impl AsRef<Path>, options: &StoreOptions) -> StoreResult<Self> {
        let dir = dir.as_ref();
        let path = dir.join(DB_FILE_NAME);
        if path.exists() {
            return Err(StoreError::AlreadyExists {
                path: dir.to_path_buf(),
            });
        }
        fs::create_dir_all(dir)?;

        let db = Self::builder(options).create(&path)?;
        let store = Self::init(db, path, options)?;
        info!(path = %store.path.display(), "created queue store");
        Ok(store)
    }

    /// Open the existing store in `dir`, failing if there is none.
    pub fn open(dir: impl AsRef<Path>, options: &StoreOptions) -> StoreResult<Self> {
        let dir = dir.as_ref();
        let path = dir.join(DB_FILE_NAME);
        if !path.exists() {
            return Err(StoreError::NotFound {
                path: dir.to_path_buf(),
            });
        }

        let db = Self::builder(options).open(&path)?;
        let store = Self::init(db, path, options)?;
        info!(path = %store.path.display(), "opened queue store");
        Ok(store)
    }

    /// Open the store in `dir`, creating it first if needed.
    pub fn open_or_create(dir: impl AsRef<Path>, options: &StoreOptions) -> StoreResult<Self> {
        let dir = dir.as_ref();
        if dir.join(DB_FILE_NAME).exists() {
            Self::open(dir, options)
        } else {
            Self::create(dir, options)
        }
    }

    /// Path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn builder(options: &StoreOptions) -> redb::Builder {
        let mut builder = redb::Builder::new();
        if let Some(bytes) = options.cache_size {
            builder.set_cache_size(bytes);
        }
        builder
    }

    /// Make sure the queue table exists so read transactions can open it.
    fn init(db: Database, path: PathBuf, options: &StoreOptions) -> StoreResult<Self> {
        let store = Self {
            db,
            path,
            durability: options.durability,
        };
        let txn = store.begin_write()?;
        txn.open_table(QUEUE_TABLE)?;
        txn.commit()?;
        Ok(store)
    }

    fn begin_write(&self) -> StoreResult<WriteTransaction> {
        let mut txn = self.db.begin_write()?;
        txn.set_durability(self.durability.into());
        Ok(txn)
    }
}

fn lower(bound: Option<&[u8]>) -> Bound<&[u8]> {
    bound.map_or(Bound::Unbounded, Bound::Included)
}

impl OrderedStore for RedbStore {
    fn put(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        let txn = self.begin_write()?;
        {
            let mut table = txn.open_table(QUEUE_TABLE)?;
            table.insert(key, value)?;
        }
        txn.commit()?;
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> StoreResult<()> {
        let txn = self.begin_write()?;
        {
            let mut table = txn.open_table(QUEUE_TABLE)?;
            table.remove(key)?;
        }
        txn.commit()?;
        Ok(())
    }

    fn cursor(&self, lower_bound: Option<&[u8]>) -> StoreResult<Box<dyn StoreCursor + '_>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(QUEUE_TABLE)?;
        let mut cursor = RedbCursor {
            table,
            current: None,
            error: None,
        };
        cursor.load(lower(lower_bound));
        Ok(Box::new(cursor))
    }

    fn take_first<T, E>(
        &self,
        lower_bound: Option<&[u8]>,
        decode: impl FnOnce(&[u8], &[u8]) -> Result<T, E>,
    ) -> Result<Option<T>, E>
    where
        E: From<StoreError>,
    {
        let txn = self.begin_write()?;
        let taken = {
            let mut table = txn.open_table(QUEUE_TABLE).map_err(StoreError::from)?;
            let front = match table
                .range::<&[u8]>((lower(lower_bound), Bound::Unbounded))
                .map_err(StoreError::from)?
                .next()
            {
                Some(entry) => {
                    let (k, v) = entry.map_err(StoreError::from)?;
                    Some((k.value().to_vec(), decode(k.value(), v.value())))
                }
                None => None,
            };
            match front {
                Some((key, Ok(decoded))) => {
                    table.remove(key.as_slice()).map_err(StoreError::from)?;
                    Some(Ok(decoded))
                }
                Some((_, Err(e))) => Some(Err(e)),
                None => None,
            }
        };

        match taken {
            Some(Ok(decoded)) => {
                txn.commit().map_err(StoreError::from)?;
                Ok(Some(decoded))
            }
            Some(Err(e)) => {
                txn.abort().map_err(StoreError::from)?;
                Err(e)
            }
            None => {
                txn.abort().map_err(StoreError::from)?;
                Ok(None)
            }
        }
    }

    fn count(&self) -> StoreResult<usize> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(QUEUE_TABLE)?;
        let mut n = 0;
        for entry in table.range::<&[u8]>(..)? {
            entry?;
            n += 1;
        }
        Ok(n)
    }

    fn close(self) -> StoreResult<()> {
        debug!(path = %self.path.display(), "closing queue store");
        drop(self.db);
        Ok(())
    }
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore")
            .field("path", &self.path)
            .field("durability", &self.durability)
            .finish()
    }
}

/// Cursor over a read transaction's view of the queue table.
///
/// Holds an owned copy of the current entry and re-seeks past it on
/// `next()`, so no engine borrow outlives a single call.
struct RedbCursor {
    table: ReadOnlyTable<&'static [u8], &'static [u8]>,
    current: Option<(Vec<u8>, Vec<u8>)>,
    error: Option<StoreError>,
}

impl RedbCursor {
    fn load(&mut self, start: Bound<&[u8]>) {
        let found = match self.table.range::<&[u8]>((start, Bound::Unbounded)) {
            Ok(mut range) => range
                .next()
                .map(|entry| entry.map(|(k, v)| (k.value().to_vec(), v.value().to_vec()))),
            Err(e) => Some(Err(e)),
        };
        match found {
            Some(Ok(entry)) => self.current = Some(entry),
            Some(Err(e)) => {
                self.current = None;
                self.error = Some(e.into());
            }
            None => self.current = None,
        }
    }
}

impl StoreCursor for RedbCursor {
    fn is_valid(&self) -> bool {
        self.current.is_some()
    }

    fn key(&self) -> &[u8] {
        self.current.as_ref().map_or(&[][..], |(k, _)| k.as_slice())
    }

    fn value(&self) -> &[u8] {
        self.current.as_ref().map_or(&[][..], |(_, v)| v.as_slice())
    }

    fn next(&mut self) {
        if let Some((key, _)) = self.current.take() {
            self.load(Bound::Excluded(key.as_slice()));
        }
    }

    fn take_error(&mut self) -> Option<StoreError> {
        self.error.take()
    }
}
