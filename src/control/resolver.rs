//! Arbitration between competing intents.
//!
//! Ventilation is shared by dehumidifying, CO2 and VOC: the strongest
//! demand wins and ties go to the earlier signal (humidity, then CO2, then
//! VOC).  While the air is critically dry the dehumidify intent is
//! dropped and the winner is capped to a protective level.  The humidifier
//! is driven by humidity alone.

use log::debug;

use crate::config::{ActuatorKind, ControllerConfig};

use super::threshold::{self, Intensity};
use super::{ActuatorCommand, OperatingMode, VentilationReason};

/// Per-signal intents for one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intents {
    pub humidify: Intensity,
    pub dehumidify: Intensity,
    pub co2: Intensity,
    pub voc: Intensity,
}

impl Default for Intents {
    fn default() -> Self {
        Self {
            humidify: Intensity::None,
            dehumidify: Intensity::None,
            co2: Intensity::None,
            voc: Intensity::None,
        }
    }
}

/// Commands the resolver wants before dwell gating.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Resolution {
    pub humidifier: ActuatorCommand,
    pub ventilation: ActuatorCommand,
    pub ventilation_reason: VentilationReason,
    /// The protective cap lowered the ventilation command.
    pub capped: bool,
}

pub struct Resolver<'a> {
    humidifier: &'a ActuatorKind,
    ventilation: &'a ActuatorKind,
    protective_cap: u8,
}

impl<'a> Resolver<'a> {
    pub fn new(config: &'a ControllerConfig) -> Self {
        Self {
            humidifier: &config.humidifier.kind,
            ventilation: &config.ventilation.kind,
            protective_cap: config.humidity.protective_cap,
        }
    }

    /// Resolve intents into commands.  `critically_dry` enables the
    /// protective ventilation cap.
    pub fn resolve(&self, intents: &Intents, critically_dry: bool) -> Resolution {
        // Never ventilate to dry air that is already critically dry.
        let dehumidify = if critically_dry {
            Intensity::None
        } else {
            intents.dehumidify
        };
        let candidates = [
            (VentilationReason::Humidity, dehumidify),
            (VentilationReason::Co2, intents.co2),
            (VentilationReason::Voc, intents.voc),
        ];

        let mut ventilation = ActuatorCommand::Off;
        let mut reason = VentilationReason::None;
        for (candidate, intensity) in candidates {
            let cmd = threshold::command_for(self.ventilation, intensity);
            // Strictly greater: ties keep the earlier signal.
            if cmd > ventilation {
                ventilation = cmd;
                reason = candidate;
            }
        }

        let mut capped = false;
        if critically_dry {
            // An on/off fan counts as level 1, so only a zero cap stops it.
            let limited = match ventilation {
                ActuatorCommand::Level(index) if index > self.protective_cap => Some(
                    threshold::level_command(self.ventilation, self.protective_cap as usize),
                ),
                ActuatorCommand::On if self.protective_cap == 0 => Some(ActuatorCommand::Off),
                _ => None,
            };
            if let Some(limited) = limited {
                debug!(
                    "ventilation capped {} -> {} (critically dry)",
                    ventilation, limited
                );
                ventilation = limited;
                capped = true;
            }
        }
        if !ventilation.is_active() {
            reason = VentilationReason::None;
        }

        Resolution {
            humidifier: threshold::command_for(self.humidifier, intents.humidify),
            ventilation,
            ventilation_reason: reason,
            capped,
        }
    }
}

/// Operating mode from the commands actually applied.
pub fn derive_mode(
    humidifier: ActuatorCommand,
    ventilation: ActuatorCommand,
    reason: VentilationReason,
    boost_active: bool,
) -> OperatingMode {
    if boost_active {
        return OperatingMode::Boost;
    }
    match (humidifier.is_active(), ventilation.is_active()) {
        (false, false) => OperatingMode::Idle,
        (true, false) => OperatingMode::Humidifying,
        (true, true) => OperatingMode::VentilatingAndHumidifying,
        (false, true) => match reason {
            VentilationReason::Humidity => OperatingMode::Dehumidifying,
            _ => OperatingMode::Ventilating,
        },
    }
}
