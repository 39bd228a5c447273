//! Persisted user state.
//!
//! Only what the user chose survives a restart: power, target, preset and
//! the last mode.  Readings, dwell timers and boost windows are runtime
//! state and start fresh.  Stored as a postcard blob through
//! [`StoragePort`].

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::control::setpoint::Preset;
use crate::control::OperatingMode;

use super::ports::{StorageError, StoragePort};

pub const STATE_NAMESPACE: &str = "hygrostat";
pub const STATE_KEY: &str = "state";

/// Upper bound of an encoded [`PersistedState`].
const STATE_BLOB_MAX: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub powered: bool,
    pub humidity_target: f32,
    pub saved_target: Option<f32>,
    pub preset: Preset,
    pub mode: OperatingMode,
}

impl PersistedState {
    /// Load the stored state.  Missing or undecodable blobs yield `None`.
    pub fn load(storage: &impl StoragePort) -> Option<Self> {
        let mut buf = [0u8; STATE_BLOB_MAX];
        let len = match storage.read(STATE_NAMESPACE, STATE_KEY, &mut buf) {
            Ok(len) => len,
            Err(StorageError::NotFound) => return None,
            Err(e) => {
                warn!("state read failed: {}", e);
                return None;
            }
        };
        match postcard::from_bytes::<Self>(&buf[..len]) {
            Ok(state) => {
                info!("restored state: {:?}", state);
                Some(state)
            }
            Err(_) => {
                warn!("stored state corrupted, ignoring");
                None
            }
        }
    }

    pub fn save(&self, storage: &mut impl StoragePort) -> Result<(), StorageError> {
        let mut buf = [0u8; STATE_BLOB_MAX];
        let bytes = postcard::to_slice(self, &mut buf).map_err(|_| StorageError::Full)?;
        storage.write(STATE_NAMESPACE, STATE_KEY, bytes)
    }
}
