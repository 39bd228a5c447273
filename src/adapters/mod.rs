//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to              |
//! |----------------|--------------------|--------------------------|
//! | `file_store`   | ConfigPort         | State directory on disk  |
//! |                | StoragePort        |                          |
//! | `log_sink`     | EventSink          | `log` output             |
//! |                | ActuatorPort       | `log` output (simulator) |
//! | `memory_store` | ConfigPort         | In-memory key/value map  |
//! |                | StoragePort        |                          |
//! | `relay`        | ActuatorPort       | `embedded-hal` OutputPin |
//! | `time`         | TimePort           | std / manual clock       |
//!
//! `script` is not a port adapter: it turns simulator input lines into
//! [`ControlEvent`](crate::events::ControlEvent)s.

pub mod file_store;
pub mod log_sink;
pub mod memory_store;
pub mod relay;
pub mod script;
pub mod time;
