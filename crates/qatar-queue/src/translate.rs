//! Cursor position → [`Item`] translation.
//!
//! Every item read in the queue goes through these functions. They own the two
//! rules that are easy to get wrong against a sorted store: check the
//! cursor's pending error whenever it stops being valid, and copy key and
//! value out of the cursor before it moves.

use qatar_store::StoreCursor;
use qatar_types::Item;

use crate::error::QueueResult;

/// Decode the entry under the cursor.
///
/// `Ok(None)` means the range is empty or exhausted; `Err` means the store
/// failed or the key is not an identifier.
pub fn item_from_cursor(cursor: &mut dyn StoreCursor) -> QueueResult<Option<Item>> {
    if let Some(e) = cursor.take_error() {
        return Err(e.into());
    }
    if !cursor.is_valid() {
        return Ok(None);
    }
    let item = Item::from_entry(cursor.key(), cursor.value())?;
    Ok(Some(item))
}

/// Decode up to `limit` consecutive entries starting at the cursor.
///
/// Stops early, without error, when the range runs out. The first error
/// discards everything collected so far.
pub fn items_from_cursor(cursor: &mut dyn StoreCursor, limit: usize) -> QueueResult<Vec<Item>> {
    let mut items = Vec::with_capacity(limit.min(64));
    while items.len() < limit {
        match item_from_cursor(cursor)? {
            Some(item) => items.push(item),
            None => break,
        }
        cursor.next();
    }
    if let Some(e) = cursor.take_error() {
        return Err(e.into());
    }
    Ok(items)
}
