use serde::{Deserialize, Serialize};

use crate::error::IdentifierError;
use crate::identifier::Identifier;

/// A queued entry: its identifier and an owned copy of its payload.
///
/// The payload is opaque. Items are never updated in place; replacing one
/// means deleting it and enqueueing again.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: Identifier,
    pub data: Vec<u8>,
}

impl Item {
    pub fn new(id: Identifier, data: impl Into<Vec<u8>>) -> Self {
        Self {
            id,
            data: data.into(),
        }
    }

    /// Build an item from a raw store entry, copying the value.
    pub fn from_entry(key: &[u8], value: &[u8]) -> Result<Self, IdentifierError> {
        let id = Identifier::from_bytes(key)?;
        Ok(Self {
            id,
            data: value.to_vec(),
        })
    }

    /// Payload rendered for display; invalid UTF-8 is replaced.
    pub fn data_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }
}
