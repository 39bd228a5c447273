//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log them, publish them, or mirror
//! them into a UI.

use crate::control::setpoint::Preset;
use crate::control::{ActuatorCommand, OperatingMode, VentilationReason};
use crate::sensors::Signal;
use crate::time::Instant;

/// Why a boost ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoostEnd {
    Expired,
    Stopped,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),

    /// The derived operating mode changed.
    ModeChanged {
        from: OperatingMode,
        to: OperatingMode,
    },

    /// Actuator commands changed.
    CommandsChanged {
        humidifier: ActuatorCommand,
        ventilation: ActuatorCommand,
        reason: VentilationReason,
    },

    /// A monitored signal went stale.
    SensorStale(Signal),

    /// A stale signal is fresh again.
    SensorRecovered(Signal),

    /// A reading was rejected as implausible.
    ReadingRejected { signal: Signal, value: f32 },

    /// A boost window started or was replaced.
    BoostStarted { until: Instant },

    /// The boost window ended.
    BoostEnded(BoostEnd),

    /// Power state changed.
    PowerChanged(bool),

    /// Humidity target or preset changed.
    SetpointChanged { target: f32, preset: Preset },

    /// The application service has started (carries initial mode).
    Started(OperatingMode),
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryData {
    pub mode: OperatingMode,
    pub powered: bool,
    pub humidity: Option<f32>,
    pub co2: Option<f32>,
    pub voc: Option<f32>,
    pub target: f32,
    pub preset: Preset,
    pub humidifier: ActuatorCommand,
    pub ventilation: ActuatorCommand,
    pub ventilation_reason: VentilationReason,
    /// Seconds left in the boost window, if one is running.
    pub boost_remaining_secs: Option<u64>,
    pub fault_flags: u8,
}
