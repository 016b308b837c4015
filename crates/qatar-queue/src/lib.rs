//! Persistent FIFO queue on an ordered key-value store.
//!
//! Each item is stored under a time-sortable [`Identifier`], so the store's
//! key order *is* the queue order and the smallest key is always the front.
//! There are no head or tail pointers to keep consistent.
//!
//! ```ignore
//! use qatar_queue::Queue;
//!
//! let queue = Queue::create("/var/lib/jobs")?;
//! let id = queue.enqueue(b"payload")?;
//! let item = queue.dequeue()?.expect("just enqueued");
//! assert_eq!(item.id, id);
//! queue.close()?;
//! ```
//!
//! # Guarantees
//!
//! - Items come out in ascending identifier order, which for generated
//!   identifiers is enqueue order.
//! - `dequeue` is atomic on [`RedbStore`] and [`MemoryStore`]. On a backend
//!   that keeps the default [`OrderedStore::take_first`], it is a peek
//!   followed by a delete and two consumers may see the same item.
//! - Multi-item peeks read from one snapshot of the store.
//! - Nothing here provides exactly-once delivery across consumers.

pub mod config;
pub mod error;
pub mod queue;
pub mod translate;

pub use config::{OpenMode, QueueConfig};
pub use error::{QueueError, QueueResult};
pub use queue::Queue;

pub use qatar_store::{MemoryStore, OrderedStore, RedbStore, StoreCursor, StoreOptions};
pub use qatar_types::{Identifier, Item};
