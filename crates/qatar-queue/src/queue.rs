use std::path::Path;

use qatar_store::{OrderedStore, RedbStore, StoreOptions};
use qatar_types::{Identifier, Item};
use tracing::{debug, info};

use crate::config::{OpenMode, QueueConfig};
use crate::error::{QueueError, QueueResult};
use crate::translate::{item_from_cursor, items_from_cursor};

/// A FIFO queue over an ordered store.
///
/// Holds nothing but the store handle. Queue order is ascending
/// [`Identifier`] order; the smallest key in the store is the front.
pub struct Queue<S: OrderedStore = RedbStore> {
    store: S,
}

impl Queue<RedbStore> {
    /// Create a new queue in `dir`. Fails if one already exists.
    pub fn create(dir: impl AsRef<Path>) -> QueueResult<Self> {
        Self::with_config(&QueueConfig::new(dir.as_ref(), OpenMode::Create))
    }

    /// Open the existing queue in `dir`. Fails if there is none.
    pub fn open(dir: impl AsRef<Path>) -> QueueResult<Self> {
        Self::with_config(&QueueConfig::new(dir.as_ref(), OpenMode::Open))
    }

    /// Open the queue in `dir`, creating it if needed.
    pub fn open_or_create(dir: impl AsRef<Path>) -> QueueResult<Self> {
        Self::with_config(&QueueConfig::new(dir.as_ref(), OpenMode::OpenOrCreate))
    }

    /// Open a redb-backed queue as described by `config`.
    pub fn with_config(config: &QueueConfig) -> QueueResult<Self> {
        let options: &StoreOptions = &config.store;
        let store = match config.mode {
            OpenMode::Create => RedbStore::create(&config.dir, options)?,
            OpenMode::Open => RedbStore::open(&config.dir, options)?,
            OpenMode::OpenOrCreate => RedbStore::open_or_create(&config.dir, options)?,
        };
        info!(dir = %config.dir.display(), mode = ?config.mode, "queue ready");
        Ok(Self::new(store))
    }
}

impl<S: OrderedStore> Queue<S> {
    /// Wrap an already-open store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Release the store. The queue cannot be used afterwards.
    pub fn close(self) -> QueueResult<()> {
        self.store.close()?;
        Ok(())
    }

    /// Append `data` under a freshly generated identifier and return it.
    ///
    /// The identifier is the handle for a later [`delete`](Self::delete).
    pub fn enqueue(&self, data: &[u8]) -> QueueResult<Identifier> {
        let id = Identifier::generate();
        self.store.put(id.as_bytes(), data)?;
        debug!(id = %id, len = data.len(), "enqueued");
        Ok(id)
    }

    /// Store `data` under a caller-chosen identifier.
    ///
    /// No uniqueness check: an existing item with the same identifier is
    /// silently replaced. The item's position is wherever `id` sorts, not
    /// the back of the queue.
    pub fn enqueue_with_id(&self, data: &[u8], id: Identifier) -> QueueResult<()> {
        self.store.put(id.as_bytes(), data)?;
        debug!(id = %id, len = data.len(), "enqueued with caller identifier");
        Ok(())
    }

    /// The front item, without removing it.
    pub fn peek(&self) -> QueueResult<Option<Item>> {
        let mut cursor = self.store.cursor(None)?;
        item_from_cursor(cursor.as_mut())
    }

    /// The first item whose identifier is `>= id`, without removing it.
    ///
    /// Feeding back `item.id.next()` walks the queue without rescanning
    /// from the front.
    pub fn peek_after(&self, id: Identifier) -> QueueResult<Option<Item>> {
        let mut cursor = self.store.cursor(Some(id.as_bytes()))?;
        item_from_cursor(cursor.as_mut())
    }

    /// Up to `limit` items from the front, in queue order.
    pub fn peek_multi(&self, limit: usize) -> QueueResult<Vec<Item>> {
        let mut cursor = self.store.cursor(None)?;
        items_from_cursor(cursor.as_mut(), limit)
    }

    /// Up to `limit` items starting at the first identifier `>= id`.
    pub fn peek_multi_after(&self, limit: usize, id: Identifier) -> QueueResult<Vec<Item>> {
        let mut cursor = self.store.cursor(Some(id.as_bytes()))?;
        items_from_cursor(cursor.as_mut(), limit)
    }

    /// Remove and return the front item.
    ///
    /// Atomic when the store's `take_first` is (redb, memory). The front key
    /// is decoded before anything is removed: if it is not a valid
    /// identifier the entry stays in place and `InvalidIdentifier` is
    /// returned, exactly as [`peek`](Self::peek) would report it.
    pub fn dequeue(&self) -> QueueResult<Option<Item>> {
        self.take(None)
    }

    /// Remove and return the first item whose identifier is `>= id`.
    pub fn dequeue_after(&self, id: Identifier) -> QueueResult<Option<Item>> {
        self.take(Some(id.as_bytes()))
    }

    /// Remove the item with identifier `id`, wherever it sits in the queue.
    /// Removing an absent identifier succeeds.
    pub fn delete(&self, id: Identifier) -> QueueResult<()> {
        self.store.delete(id.as_bytes())?;
        debug!(id = %id, "deleted");
        Ok(())
    }

    /// Number of items in the queue.
    ///
    /// Asks the store on every call; nothing is cached here. Keys are
    /// counted without being decoded.
    pub fn count(&self) -> QueueResult<usize> {
        Ok(self.store.count()?)
    }

    fn take(&self, lower_bound: Option<&[u8]>) -> QueueResult<Option<Item>> {
        let item = self.store.take_first(lower_bound, |key, value| {
            Item::from_entry(key, value).map_err(QueueError::from)
        })?;
        if let Some(item) = &item {
            debug!(id = %item.id, "dequeued");
        }
        Ok(item)
    }
}

impl<S: OrderedStore + std::fmt::Debug> std::fmt::Debug for Queue<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Queue").field("store", &self.store).finish()
    }
}
