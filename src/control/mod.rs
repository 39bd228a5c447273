//! Control law: everything between "latest readings" and "actuator
//! commands".
//!
//! ```text
//!  ReadingStore ─▶ threshold ─▶ resolver ─▶ boost override ─▶ dwell ─▶ Decision
//!                  (intents)    (cap, max)   (vent = max)     (gate)
//! ```
//!
//! [`engine::DecisionEngine`] runs the chain once per tick or sensor update.
//! Every stage is a plain function or a small state struct; nothing here
//! performs I/O or reads a clock.

pub mod boost;
pub mod dwell;
pub mod engine;
pub mod resolver;
pub mod setpoint;
pub mod threshold;

use serde::{Deserialize, Serialize};

use crate::time::Instant;

/// Actuator slots driven by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actuator {
    Humidifier,
    Ventilation,
}

impl Actuator {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Humidifier => "humidifier",
            Self::Ventilation => "ventilation",
        }
    }
}

impl core::fmt::Display for Actuator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Command for one actuator.
///
/// Binary slots use `Off`/`On`; leveled slots use `Off`/`Level(index)` into
/// their level set.  The derived ordering ranks higher levels above lower
/// ones, which is what the resolver's "highest need wins" relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActuatorCommand {
    #[default]
    Off,
    On,
    Level(u8),
}

impl ActuatorCommand {
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Off)
    }
}

impl core::fmt::Display for ActuatorCommand {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Off => f.write_str("off"),
            Self::On => f.write_str("on"),
            Self::Level(i) => write!(f, "level[{i}]"),
        }
    }
}

/// Which signal is driving the ventilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VentilationReason {
    #[default]
    None,
    Humidity,
    Co2,
    Voc,
    /// A boost is running the fan at its top level.
    Boost,
}

/// Derived operating mode, recomputed every cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatingMode {
    #[default]
    Idle,
    Humidifying,
    Dehumidifying,
    Ventilating,
    VentilatingAndHumidifying,
    Boost,
}

impl OperatingMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Humidifying => "humidifying",
            Self::Dehumidifying => "dehumidifying",
            Self::Ventilating => "ventilating",
            Self::VentilatingAndHumidifying => "ventilating_and_humidifying",
            Self::Boost => "boost",
        }
    }
}

impl core::fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of one decision cycle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Decision {
    pub mode: OperatingMode,
    pub humidifier: ActuatorCommand,
    pub ventilation: ActuatorCommand,
    pub ventilation_reason: VentilationReason,
    /// Safety fault bitmask at the time of the decision.
    pub faults: u8,
    /// End of the boost window, if one is running.
    pub boost_until: Option<Instant>,
}

impl Decision {
    pub fn command(&self, actuator: Actuator) -> ActuatorCommand {
        match actuator {
            Actuator::Humidifier => self.humidifier,
            Actuator::Ventilation => self.ventilation,
        }
    }

    /// True if the actuator-facing part differs from `other`.
    pub fn commands_differ(&self, other: &Decision) -> bool {
        self.humidifier != other.humidifier || self.ventilation != other.ventilation
    }
}
