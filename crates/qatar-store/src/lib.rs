//! Ordered key-value storage for qatar.
//!
//! The queue layer only needs a sorted map with byte-string keys: point
//! writes, point deletes, and a forward cursor that can start at a seek
//! position. This crate defines that capability set and ships two backends.
//!
//! # Storage Backends
//!
//! All backends implement the [`OrderedStore`] trait:
//!
//! - [`RedbStore`] -- persistent, one redb file per queue directory
//! - [`MemoryStore`] -- `BTreeMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Keys are compared byte-wise; iteration is always ascending.
//! 2. Deleting an absent key succeeds.
//! 3. A cursor sees the store as it was when the cursor was created.
//! 4. Cursor errors are reported lazily through [`StoreCursor::take_error`].
//! 5. The store never interprets keys or values.
//! 6. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod memory;
pub mod options;
pub mod redb_store;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use options::{Durability, StoreOptions};
pub use redb_store::{RedbStore, DB_FILE_NAME};
pub use traits::{OrderedStore, StoreCursor};
