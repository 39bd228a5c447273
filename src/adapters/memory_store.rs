//! In-memory storage adapter.
//!
//! Backs both [`ConfigPort`] and [`StoragePort`] with one map keyed by
//! `(namespace, key)`.  The tests use it; [`FileStore`](super::file_store::FileStore)
//! is the on-disk counterpart.
//!
//! The config lives under its own key next to the persisted state and is
//! checked with [`ControllerConfig::validate`] in both directions.

use std::cell::RefCell;
use std::collections::BTreeMap;

use log::{debug, info};

use crate::app::ports::{ConfigError, ConfigPort, StorageError, StoragePort};
use crate::config::ControllerConfig;

pub(super) const CONFIG_NAMESPACE: &str = "hygrostat";
pub(super) const CONFIG_KEY: &str = "config";

/// Largest value a single key may hold.
pub(super) const VALUE_LIMIT: usize = 4000;

type Slot = (String, String);

#[derive(Default)]
pub struct MemoryStore {
    values: RefCell<BTreeMap<Slot, Vec<u8>>>,
}

fn slot(namespace: &str, key: &str) -> Slot {
    (namespace.to_owned(), key.to_owned())
}

impl MemoryStore {
    pub fn new() -> Self {
        debug!("MemoryStore: empty");
        Self::default()
    }

    fn put(&self, namespace: &str, key: &str, data: Vec<u8>) {
        self.values.borrow_mut().insert(slot(namespace, key), data);
    }
}

impl ConfigPort for MemoryStore {
    fn load(&self) -> Result<ControllerConfig, ConfigError> {
        let values = self.values.borrow();
        let Some(bytes) = values.get(&slot(CONFIG_NAMESPACE, CONFIG_KEY)) else {
            info!("MemoryStore: no stored config, using defaults");
            return Ok(ControllerConfig::default());
        };
        let config: ControllerConfig =
            postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
        config.validate()?;
        info!("MemoryStore: config loaded ({} bytes)", bytes.len());
        Ok(config)
    }

    fn save(&self, config: &ControllerConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::Encode)?;
        if bytes.len() > VALUE_LIMIT {
            return Err(ConfigError::TooLarge);
        }
        info!("MemoryStore: config stored ({} bytes)", bytes.len());
        self.put(CONFIG_NAMESPACE, CONFIG_KEY, bytes);
        Ok(())
    }
}

impl StoragePort for MemoryStore {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        let values = self.values.borrow();
        let data = values
            .get(&slot(namespace, key))
            .ok_or(StorageError::NotFound)?;
        let n = data.len().min(buf.len());
        buf[..n].copy_from_slice(&data[..n]);
        Ok(n)
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        if data.len() > VALUE_LIMIT {
            return Err(StorageError::Full);
        }
        self.put(namespace, key, data.to_vec());
        Ok(())
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        self.values.borrow_mut().remove(&slot(namespace, key));
        Ok(())
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.values.borrow().contains_key(&slot(namespace, key))
    }
}
