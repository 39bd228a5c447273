//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (UI, automation,
//! a boost helper switch) that the [`AppService`](super::service::AppService)
//! interprets and acts upon.

use core::time::Duration;

use crate::control::setpoint::Preset;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppCommand {
    /// Switch the controller on.
    TurnOn,

    /// Switch the controller off; actuators are held off.
    TurnOff,

    /// Change the humidity target (clamped to the configured range).
    SetHumidityTarget(f32),

    /// Select a preset.
    SetPreset(Preset),

    /// Service-style boost request.  `None` uses the configured default.
    Boost { duration: Option<Duration> },

    /// Service-style boost cancel.
    StopBoost,

    /// New state of the boolean boost helper.  Rising edge starts a default
    /// boost, falling edge stops it.
    BoostHelper(bool),

    /// Persist user state immediately.
    SaveState,
}
