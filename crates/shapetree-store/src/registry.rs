//! Explicit storage registry.
//!
//! A server owns one [`StorageRegistry`] and asks it for backends by
//! [`StorageConfig`]. The registry hands back the same instance for the same
//! configuration, so every request against one storage root sees one store.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{StoreError, StoreResult};
use crate::fs::FsStorage;
use crate::memory::InMemoryStorage;
use crate::traits::Storage;

/// Which backend to open.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StorageConfig {
    #[default]
    Memory,
    Filesystem { root: PathBuf, base: Url },
}

/// Open backends keyed by configuration.
#[derive(Default)]
pub struct StorageRegistry {
    open: Mutex<HashMap<StorageConfig, Arc<dyn Storage>>>,
}

impl std::fmt::Debug for StorageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.open.lock().map(|m| m.len()).unwrap_or(0);
        f.debug_struct("StorageRegistry").field("open", &count).finish()
    }
}

impl StorageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the backend for `config`, opening it on first use.
    pub fn open(&self, config: &StorageConfig) -> StoreResult<Arc<dyn Storage>> {
        let mut open = self
            .open
            .lock()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?;
        if let Some(storage) = open.get(config) {
            return Ok(Arc::clone(storage));
        }
        let storage: Arc<dyn Storage> = match config {
            StorageConfig::Memory => Arc::new(InMemoryStorage::new()),
            StorageConfig::Filesystem { root, base } => {
                Arc::new(FsStorage::new(root.clone(), base.clone())?)
            }
        };
        tracing::info!(?config, "opened storage backend");
        open.insert(config.clone(), Arc::clone(&storage));
        Ok(storage)
    }

    /// Number of distinct backends opened so far.
    pub fn len(&self) -> usize {
        self.open.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
