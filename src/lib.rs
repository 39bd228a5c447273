//! Hygrostat controller library.
//!
//! Closed-loop humidity / CO2 / VOC control for one zone: a humidifier and
//! a ventilation actuator driven from sensor readings, with dwell-time
//! protection, a timed boost override and a stale-sensor fail-safe.
//!
//! The control law lives in [`control`]; [`app::service::AppService`] is the
//! entry point hosts talk to.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod error;
pub mod events;
pub mod safety;
pub mod sensors;
pub mod time;
