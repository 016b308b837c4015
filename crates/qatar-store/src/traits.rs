use crate::error::{StoreError, StoreResult};

/// Forward cursor over a sorted key range.
///
/// Positioning never returns an error directly. When the engine fails, the
/// cursor becomes invalid and keeps the error until [`take_error`] is
/// called. An exhausted cursor and a failed one both report
/// `is_valid() == false`; only `take_error` tells them apart, so callers
/// must check it after every traversal.
///
/// [`take_error`]: StoreCursor::take_error
pub trait StoreCursor {
    /// Returns true if the cursor is positioned at an entry.
    fn is_valid(&self) -> bool;

    /// Current key. Only meaningful while `is_valid()` is true.
    fn key(&self) -> &[u8];

    /// Current value. Only meaningful while `is_valid()` is true.
    ///
    /// The slice may be reused once the cursor advances; copy it to keep it.
    fn value(&self) -> &[u8];

    /// Advance to the next entry in ascending key order.
    fn next(&mut self);

    /// Take the pending engine error, if any.
    fn take_error(&mut self) -> Option<StoreError>;
}

/// A persistent (or in-memory) sorted map with byte-string keys.
///
/// All implementations must satisfy these invariants:
/// - Keys iterate in ascending byte-wise order.
/// - `delete` of an absent key is a successful no-op.
/// - `put` of an existing key overwrites it.
/// - A cursor observes a point-in-time view taken when it was created.
/// - All engine errors are propagated, never retried or swallowed.
pub trait OrderedStore: Send + Sync {
    /// Insert or overwrite `key`.
    fn put(&self, key: &[u8], value: &[u8]) -> StoreResult<()>;

    /// Remove `key` if present.
    fn delete(&self, key: &[u8]) -> StoreResult<()>;

    /// Open a forward cursor.
    ///
    /// With a lower bound the first position is the smallest key `>= bound`;
    /// without one it is the smallest key in the store.
    fn cursor(&self, lower_bound: Option<&[u8]>) -> StoreResult<Box<dyn StoreCursor + '_>>;

    /// Remove the first entry at or after `lower_bound` and return it decoded.
    ///
    /// `decode` sees the entry before anything is removed. If it fails the
    /// entry stays in the store and the error is returned; `Ok(None)` means
    /// there was no entry to take.
    ///
    /// The default implementation reads through a cursor and then calls
    /// [`delete`](OrderedStore::delete). Those are two separate operations:
    /// a concurrent caller can observe or remove the same entry in between.
    /// Backends with transactions should override this to make it atomic.
    fn take_first<T, E>(
        &self,
        lower_bound: Option<&[u8]>,
        decode: impl FnOnce(&[u8], &[u8]) -> Result<T, E>,
    ) -> Result<Option<T>, E>
    where
        Self: Sized,
        E: From<StoreError>,
    {
        let (key, decoded) = {
            let mut cursor = self.cursor(lower_bound)?;
            if let Some(e) = cursor.take_error() {
                return Err(e.into());
            }
            if !cursor.is_valid() {
                return Ok(None);
            }
            (cursor.key().to_vec(), decode(cursor.key(), cursor.value())?)
        };
        self.delete(&key)?;
        Ok(Some(decoded))
    }

    /// Number of entries in the store.
    ///
    /// The default walks a cursor from the smallest key and reports the
    /// cursor's pending error, if any, instead of a partial count.
    fn count(&self) -> StoreResult<usize> {
        let mut cursor = self.cursor(None)?;
        let mut n = 0;
        while cursor.is_valid() {
            n += 1;
            cursor.next();
        }
        match cursor.take_error() {
            Some(e) => Err(e),
            None => Ok(n),
        }
    }

    /// Release the store handle.
    ///
    /// Consuming `self` makes a second close, or any use after close, a
    /// compile error. Dropping the store has the same effect; `close` exists
    /// to surface errors and make the release point explicit.
    fn close(self) -> StoreResult<()>
    where
        Self: Sized,
    {
        drop(self);
        Ok(())
    }
}
