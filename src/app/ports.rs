//! Ports between the control core and its surroundings.
//!
//! ```text
//!   devices / log / flash ◀── adapters ──▶ ports ◀── AppService
//! ```
//!
//! Every outward effect of the service goes through one of these traits.
//! Adapters are handed to [`AppService`](super::service::AppService) per
//! call, so a test can swap any of them for a recording mock.
//!
//! Sensor sources have no port: they push readings into the service (or
//! the [`EventQueue`](crate::events::EventQueue)) whenever they have one.

use crate::config::ControllerConfig;
use crate::control::Actuator;
use crate::time::Instant;

// ───────────────────────────────────────────────────────────────
// Actuators
// ───────────────────────────────────────────────────────────────

/// Commands for the humidifier and ventilation devices.
///
/// Which method is used depends on the slot's configured kind; a slot never
/// receives calls for a capability it does not have.
pub trait ActuatorPort {
    /// Switch a binary actuator on or off.
    fn set_state(&mut self, actuator: Actuator, on: bool);

    /// Select a level by name from the slot's configured level set.
    fn set_level(&mut self, actuator: Actuator, level: &str);

    /// Switch the power of a power-gated leveled actuator.
    fn set_power(&mut self, actuator: Actuator, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Events
// ───────────────────────────────────────────────────────────────

/// Receives every [`AppEvent`](super::events::AppEvent) the service emits.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Clock
// ───────────────────────────────────────────────────────────────

/// Monotonic clock.  Injected so tests can drive time by hand.
pub trait TimePort {
    fn now(&self) -> Instant;
}

// ───────────────────────────────────────────────────────────────
// Configuration
// ───────────────────────────────────────────────────────────────

/// Stored controller configuration.
///
/// `save` rejects a config that fails [`ControllerConfig::validate`];
/// out-of-range values are never clamped on the way in.
pub trait ConfigPort {
    /// Stored config, or [`ControllerConfig::default()`] when none is stored.
    fn load(&self) -> Result<ControllerConfig, ConfigError>;

    fn save(&self, config: &ControllerConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Key/value storage
// ───────────────────────────────────────────────────────────────

/// Namespaced blob storage for the persisted controller state.
///
/// A `write` replaces the whole value or leaves the old one in place.
pub trait StoragePort {
    /// Copy the value into `buf`; returns the copied length.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Removing a missing key is not an error.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Errors
// ───────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum ConfigError {
    /// Stored or supplied document could not be decoded.
    Corrupted,
    /// A field is out of range; the message names it.
    ValidationFailed(&'static str),
    /// Encoded config exceeds the backend's value size.
    TooLarge,
    /// Config could not be encoded.
    Encode,
}

#[derive(Debug, PartialEq, Eq)]
pub enum StorageError {
    NotFound,
    /// No space left for the value.
    Full,
    /// Backend failure.
    Backend,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config unreadable"),
            Self::ValidationFailed(msg) => write!(f, "invalid config: {}", msg),
            Self::TooLarge => write!(f, "config too large for storage"),
            Self::Encode => write!(f, "config encoding failed"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "no such key"),
            Self::Full => write!(f, "storage full"),
            Self::Backend => write!(f, "storage backend error"),
        }
    }
}

impl core::error::Error for ConfigError {}
impl core::error::Error for StorageError {}
