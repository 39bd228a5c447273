//! Application core: domain orchestration, zero I/O.
//!
//! This module wires the control law to the outside world: command
//! handling, boost triggers, event emission, and persisted user state.
//! All interaction with devices happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real hardware.

pub mod commands;
pub mod events;
pub mod persist;
pub mod ports;
pub mod service;
pub mod triggers;
