//! Unified error types for the hygrostat core.
//!
//! A single `Error` enum that every caller-facing operation returns, so the
//! command path of the control loop handles failures uniformly.  All
//! variants are `Copy`; nothing here allocates.
//!
//! Stale sensors are deliberately **not** an error: they are a safety
//! condition tracked as a [`SafetyFault`] that forces the fail-safe output.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level controller error
// ---------------------------------------------------------------------------

/// Every fallible operation of the controller funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A boost was requested for a duration outside the allowed window.
    /// Carries the rejected duration in seconds.
    InvalidDuration { secs: u64 },
    /// A target value was not a finite number.
    InvalidTarget,
    /// The requested preset has no configured target.
    PresetUnavailable,
    /// The operation needs a ventilation actuator but none is configured.
    NoVentilation,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDuration { secs } => {
                write!(f, "boost duration {secs}s outside allowed window")
            }
            Self::InvalidTarget => write!(f, "target is not a finite number"),
            Self::PresetUnavailable => write!(f, "preset not configured"),
            Self::NoVentilation => write!(f, "no ventilation actuator configured"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Safety faults
// ---------------------------------------------------------------------------

/// Safety faults are accumulated in a bitfield by the safety supervisor so
/// that several stale signals can be tracked and individually cleared.
/// A set `HumidityStale` bit forces every actuator off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SafetyFault {
    /// Humidity reading missing, implausible, or older than the stale window.
    HumidityStale = 0b0000_0001,
    /// CO2 reading missing or stale (its intent is dropped).
    Co2Stale = 0b0000_0010,
    /// VOC reading missing or stale (its intent is dropped).
    VocStale = 0b0000_0100,
}

impl SafetyFault {
    pub const ALL: [SafetyFault; 3] = [Self::HumidityStale, Self::Co2Stale, Self::VocStale];

    /// Return the bitmask for this fault.
    pub const fn mask(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for SafetyFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HumidityStale => write!(f, "humidity sensor stale"),
            Self::Co2Stale => write!(f, "CO2 sensor stale"),
            Self::VocStale => write!(f, "VOC sensor stale"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
