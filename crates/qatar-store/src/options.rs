use serde::{Deserialize, Serialize};

/// When a committed write is guaranteed to be on disk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Durability {
    /// Every write is fsync'd before it returns.
    #[default]
    Immediate,
    /// Writes become durable with a later commit; a crash may lose the
    /// most recent ones.
    Eventual,
}

impl From<Durability> for redb::Durability {
    fn from(d: Durability) -> Self {
        match d {
            Durability::Immediate => redb::Durability::Immediate,
            Durability::Eventual => redb::Durability::Eventual,
        }
    }
}

/// Tuning knobs for persistent backends.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreOptions {
    pub durability: Durability,
    /// Page cache size in bytes; `None` keeps the engine default.
    pub cache_size: Option<usize>,
}
