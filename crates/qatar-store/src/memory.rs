use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::{Arc, RwLock};

use crate::error::{StoreError, StoreResult};
use crate::traits::{OrderedStore, StoreCursor};

type Map = BTreeMap<Vec<u8>, Vec<u8>>;

/// In-memory, `BTreeMap`-based ordered store.
///
/// Intended for tests and embedding. The map sits behind an `Arc` that
/// cursors share: opening a cursor is O(1), and a write clones the map only
/// while some cursor still holds the old version. That gives cursors the same
/// snapshot semantics as the persistent backend.
pub struct MemoryStore {
    entries: RwLock<Arc<Map>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Arc::new(BTreeMap::new())),
        }
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().expect("lock poisoned").is_empty()
    }

    /// Remove all entries from the store.
    pub fn clear(&self) {
        *self.entries.write().expect("lock poisoned") = Arc::new(BTreeMap::new());
    }

    /// Look up a single key.
    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.entries.read().expect("lock poisoned").get(key).cloned()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn first_key(map: &Map, start: Bound<&[u8]>) -> Option<Vec<u8>> {
    map.range::<[u8], _>((start, Bound::Unbounded))
        .next()
        .map(|(k, _)| k.clone())
}

impl OrderedStore for MemoryStore {
    fn put(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        let mut map = self.entries.write().expect("lock poisoned");
        Arc::make_mut(&mut *map).insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> StoreResult<()> {
        let mut map = self.entries.write().expect("lock poisoned");
        if map.contains_key(key) {
            Arc::make_mut(&mut *map).remove(key);
        }
        Ok(())
    }

    fn cursor(&self, lower_bound: Option<&[u8]>) -> StoreResult<Box<dyn StoreCursor + '_>> {
        let snapshot = Arc::clone(&*self.entries.read().expect("lock poisoned"));
        let start = lower_bound.map_or(Bound::Unbounded, Bound::Included);
        let current = first_key(&snapshot, start);
        Ok(Box::new(MemoryCursor { snapshot, current }))
    }

    fn take_first<T, E>(
        &self,
        lower_bound: Option<&[u8]>,
        decode: impl FnOnce(&[u8], &[u8]) -> Result<T, E>,
    ) -> Result<Option<T>, E>
    where
        E: From<StoreError>,
    {
        // One write lock covers decode and removal.
        let mut map = self.entries.write().expect("lock poisoned");
        let start = lower_bound.map_or(Bound::Unbounded, Bound::Included);
        let Some((key, value)) = map.range::<[u8], _>((start, Bound::Unbounded)).next() else {
            return Ok(None);
        };
        let decoded = decode(key.as_slice(), value.as_slice())?;
        let key = key.clone();
        Arc::make_mut(&mut *map).remove(&key);
        Ok(Some(decoded))
    }

    fn count(&self) -> StoreResult<usize> {
        Ok(self.len())
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("entry_count", &self.len())
            .finish()
    }
}

/// Cursor over a shared version of a [`MemoryStore`] map. Never fails.
struct MemoryCursor {
    snapshot: Arc<Map>,
    current: Option<Vec<u8>>,
}

impl StoreCursor for MemoryCursor {
    fn is_valid(&self) -> bool {
        self.current.is_some()
    }

    fn key(&self) -> &[u8] {
        self.current.as_deref().unwrap_or_default()
    }

    fn value(&self) -> &[u8] {
        self.current
            .as_ref()
            .and_then(|k| self.snapshot.get(k))
            .map_or(&[][..], Vec::as_slice)
    }

    fn next(&mut self) {
        if let Some(key) = self.current.take() {
            self.current = first_key(&self.snapshot, Bound::Excluded(key.as_slice()));
        }
    }

    fn take_error(&mut self) -> Option<StoreError> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(key: &[u8], value: &[u8]) -> StoreResult<(Vec<u8>, Vec<u8>)> {
        Ok((key.to_vec(), value.to_vec()))
    }

    fn keys(store: &MemoryStore, lower: Option<&[u8]>) -> Vec<Vec<u8>> {
        let mut cursor = store.cursor(lower).unwrap();
        let mut out = Vec::new();
        while cursor.is_valid() {
            out.push(cursor.key().to_vec());
            cursor.next();
        }
        assert!(cursor.take_error().is_none());
        out
    }

    // -----------------------------------------------------------------------
    // Core operations
    // -----------------------------------------------------------------------

    #[test]
    fn put_and_get() {
        let store = MemoryStore::new();
        store.put(b"k", b"v").unwrap();
        assert_eq!(store.get(b"k"), Some(b"v".to_vec()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn put_overwrites() {
        let store = MemoryStore::new();
        store.put(b"k", b"one").unwrap();
        store.put(b"k", b"two").unwrap();
        assert_eq!(store.get(b"k"), Some(b"two".to_vec()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn delete_absent_is_noop() {
        let store = MemoryStore::new();
        store.delete(b"missing").unwrap();
        store.put(b"k", b"v").unwrap();
        store.delete(b"k").unwrap();
        store.delete(b"k").unwrap();
        assert!(store.is_empty());
    }

    // -----------------------------------------------------------------------
    // Cursor
    // -----------------------------------------------------------------------

    #[test]
    fn cursor_iterates_in_key_order() {
        let store = MemoryStore::new();
        for k in [b"c", b"a", b"b"] {
            store.put(k, b"").unwrap();
        }
        assert_eq!(keys(&store, None), vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    }

    #[test]
    fn cursor_seek_is_inclusive() {
        let store = MemoryStore::new();
        for k in [b"a", b"b", b"c"] {
            store.put(k, b"").unwrap();
        }
        assert_eq!(keys(&store, Some(b"b".as_slice())), vec![b"b".to_vec(), b"c".to_vec()]);
        assert_eq!(keys(&store, Some(b"bb".as_slice())), vec![b"c".to_vec()]);
        assert!(keys(&store, Some(b"d".as_slice())).is_empty());
    }

    #[test]
    fn empty_cursor_is_invalid_without_error() {
        let store = MemoryStore::new();
        let mut cursor = store.cursor(None).unwrap();
        assert!(!cursor.is_valid());
        assert!(cursor.take_error().is_none());
    }

    #[test]
    fn invalid_cursor_reads_empty_slices() {
        let store = MemoryStore::new();
        store.put(b"a", b"1").unwrap();
        let mut cursor = store.cursor(None).unwrap();
        cursor.next();
        assert!(!cursor.is_valid());
        assert!(cursor.key().is_empty());
        assert!(cursor.value().is_empty());
        cursor.next();
        assert!(!cursor.is_valid());
    }

    #[test]
    fn cursor_shares_the_map_until_a_write() {
        let store = MemoryStore::new();
        for i in 0u32..10_000 {
            store.put(&i.to_be_bytes(), b"payload").unwrap();
        }
        let mut cursor = store.cursor(None).unwrap();
        assert_eq!(Arc::strong_count(&*store.entries.read().unwrap()), 2);
        assert_eq!(cursor.key(), 0u32.to_be_bytes());

        store.put(&10_000u32.to_be_bytes(), b"late").unwrap();
        store.delete(&0u32.to_be_bytes()).unwrap();
        assert_eq!(Arc::strong_count(&*store.entries.read().unwrap()), 1);

        let mut seen = 0;
        while cursor.is_valid() {
            assert_eq!(cursor.value(), b"payload");
            seen += 1;
            cursor.next();
        }
        assert_eq!(seen, 10_000);
        assert_eq!(store.len(), 10_000);
    }

    #[test]
    fn cursor_is_a_snapshot() {
        let store = MemoryStore::new();
        store.put(b"a", b"1").unwrap();
        let mut cursor = store.cursor(None).unwrap();
        store.put(b"b", b"2").unwrap();
        store.delete(b"a").unwrap();

        assert!(cursor.is_valid());
        assert_eq!(cursor.key(), b"a");
        assert_eq!(cursor.value(), b"1");
        cursor.next();
        assert!(!cursor.is_valid());
    }

    // -----------------------------------------------------------------------
    // take_first
    // -----------------------------------------------------------------------

    #[test]
    fn take_first_removes_smallest() {
        let store = MemoryStore::new();
        store.put(b"b", b"2").unwrap();
        store.put(b"a", b"1").unwrap();
        let taken = store.take_first(None, raw).unwrap();
        assert_eq!(taken, Some((b"a".to_vec(), b"1".to_vec())));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn take_first_with_bound() {
        let store = MemoryStore::new();
        for k in [b"a", b"b", b"c"] {
            store.put(k, k).unwrap();
        }
        let taken = store.take_first(Some(b"b".as_slice()), raw).unwrap();
        assert_eq!(taken, Some((b"b".to_vec(), b"b".to_vec())));
        assert_eq!(keys(&store, None), vec![b"a".to_vec(), b"c".to_vec()]);
    }

    #[test]
    fn take_first_on_empty() {
        let store = MemoryStore::new();
        assert!(store.take_first(None, raw).unwrap().is_none());
    }

    #[test]
    fn take_first_keeps_entry_when_decode_fails() {
        let store = MemoryStore::new();
        store.put(b"a", b"precious").unwrap();
        let taken: StoreResult<Option<()>> = store.take_first(None, |_, _| {
            Err(StoreError::NotFound {
                path: "rejected".into(),
            })
        });
        assert!(matches!(taken, Err(StoreError::NotFound { .. })));
        assert_eq!(store.get(b"a"), Some(b"precious".to_vec()));
    }

    // -----------------------------------------------------------------------
    // Misc
    // -----------------------------------------------------------------------

    #[test]
    fn clear_and_debug() {
        let store = MemoryStore::default();
        store.put(b"x", b"y").unwrap();
        let debug = format!("{store:?}");
        assert!(debug.contains("MemoryStore"));
        assert!(debug.contains("entry_count"));
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn concurrent_writers() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(MemoryStore::new());
        let handles: Vec<_> = (0u8..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.put(&[i], &[i]).unwrap())
            })
            .collect();
        for h in handles {
            h.join().expect("thread should not panic");
        }
        assert_eq!(store.len(), 8);
    }
}
