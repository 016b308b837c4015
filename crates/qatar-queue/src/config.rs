use std::path::PathBuf;

use qatar_store::StoreOptions;
use serde::{Deserialize, Serialize};

/// How [`Queue::with_config`](crate::Queue::with_config) treats the
/// directory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpenMode {
    /// Fail if a queue already exists there.
    Create,
    /// Fail if no queue exists there.
    Open,
    /// Open it, creating it first if needed.
    #[default]
    OpenOrCreate,
}

/// Where a queue lives and how to open it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Queue directory; the store owns everything inside it.
    pub dir: PathBuf,
    pub mode: OpenMode,
    #[serde(default)]
    pub store: StoreOptions,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            mode: OpenMode::default(),
            store: StoreOptions::default(),
        }
    }
}

impl QueueConfig {
    /// Config for `dir` with the given mode and default store options.
    pub fn new(dir: impl Into<PathBuf>, mode: OpenMode) -> Self {
        Self {
            dir: dir.into(),
            mode,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qatar_store::Durability;

    #[test]
    fn default_config() {
        let c = QueueConfig::default();
        assert_eq!(c.dir, PathBuf::from("."));
        assert_eq!(c.mode, OpenMode::OpenOrCreate);
        assert_eq!(c.store, StoreOptions::default());
    }

    #[test]
    fn new_keeps_default_store_options() {
        let c = QueueConfig::new("/tmp/q", OpenMode::Create);
        assert_eq!(c.dir, PathBuf::from("/tmp/q"));
        assert_eq!(c.mode, OpenMode::Create);
        assert_eq!(c.store.durability, Durability::Immediate);
    }

    #[test]
    fn store_options_default_when_missing() {
        let c: QueueConfig = serde_json::from_str(r#"{"dir":"/q","mode":"Open"}"#).unwrap();
        assert_eq!(c.mode, OpenMode::Open);
        assert_eq!(c.store, StoreOptions::default());
    }
}
