//! Foundation types for qatar.
//!
//! Every queued entry lives in the store under an [`Identifier`]: a UUID v7
//! whose byte order is its creation order. That single property is what lets
//! a sorted key-value store double as a FIFO queue.
//!
//! # Key Types
//!
//! - [`Identifier`]: time-sortable 16-byte key
//! - [`Item`]: an identifier paired with its owned payload

pub mod error;
pub mod identifier;
pub mod item;

pub use error::IdentifierError;
pub use identifier::{Identifier, IDENTIFIER_LEN};
pub use item::Item;
