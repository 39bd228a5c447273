//! Directory-backed storage adapter.
//!
//! Implements [`ConfigPort`] and [`StoragePort`] on top of a state
//! directory so the simulator keeps its setpoint, preset and power state
//! across runs.
//!
//! - Layout: one file per value at `<dir>/<namespace>/<key>`.
//! - Config is stored as JSON next to the persisted state and validated in
//!   both directions.
//! - Writes go to a `.tmp` sibling first and are renamed into place, so a
//!   crash leaves either the old or the new value.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use super::memory_store::{CONFIG_KEY, CONFIG_NAMESPACE, VALUE_LIMIT};
use crate::app::ports::{ConfigError, ConfigPort, StorageError, StoragePort};
use crate::config::ControllerConfig;

pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) the state directory at `root`.
    pub fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        info!("FileStore: state directory {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, namespace: &str, key: &str) -> PathBuf {
        self.root.join(namespace).join(key)
    }

    fn put(&self, namespace: &str, key: &str, data: &[u8]) -> io::Result<()> {
        let path = self.path(namespace, key);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &path)?;
        debug!("FileStore: wrote {} ({} bytes)", path.display(), data.len());
        Ok(())
    }
}

fn storage_error(e: &io::Error) -> StorageError {
    match e.kind() {
        ErrorKind::NotFound => StorageError::NotFound,
        _ => {
            warn!("FileStore: {}", e);
            StorageError::Backend
        }
    }
}

impl ConfigPort for FileStore {
    fn load(&self) -> Result<ControllerConfig, ConfigError> {
        let path = self.path(CONFIG_NAMESPACE, CONFIG_KEY);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("FileStore: no stored config, using defaults");
                return Ok(ControllerConfig::default());
            }
            Err(e) => {
                warn!("FileStore: reading {}: {}", path.display(), e);
                return Err(ConfigError::Corrupted);
            }
        };
        let config = ControllerConfig::from_json(&text)?;
        info!("FileStore: config loaded from {}", path.display());
        Ok(config)
    }

    fn save(&self, config: &ControllerConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let text = serde_json::to_string_pretty(config).map_err(|_| ConfigError::Encode)?;
        if text.len() > VALUE_LIMIT {
            return Err(ConfigError::TooLarge);
        }
        self.put(CONFIG_NAMESPACE, CONFIG_KEY, text.as_bytes())
            .map_err(|e| {
                warn!("FileStore: storing config: {}", e);
                ConfigError::Encode
            })?;
        info!("FileStore: config stored ({} bytes)", text.len());
        Ok(())
    }
}

impl StoragePort for FileStore {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        let data = fs::read(self.path(namespace, key)).map_err(|e| storage_error(&e))?;
        let n = data.len().min(buf.len());
        buf[..n].copy_from_slice(&data[..n]);
        Ok(n)
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        if data.len() > VALUE_LIMIT {
            return Err(StorageError::Full);
        }
        self.put(namespace, key, data).map_err(|e| storage_error(&e))
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path(namespace, key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error(&e)),
        }
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        self.path(namespace, key).is_file()
    }
}
