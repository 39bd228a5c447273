//! Threshold policy: signal value → desired intensity → actuator command.
//!
//! Each intent is a linear ramp that starts at its threshold (intensity 0)
//! and reaches 1 at its end point; beyond the end point it is `Critical`.
//!
//! ```text
//!  intensity
//!     1 ┤            ┌──────── Critical
//!       │          ╱
//!       │        ╱
//!     0 ┼──────┘
//!       └──────┬─────┬──────▶ distance past threshold
//!          threshold  end
//! ```

use crate::config::{ActuatorKind, AirQualityThresholds, HumidityThresholds};

use super::ActuatorCommand;

/// How hard an actuator should work for one signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intensity {
    /// Signal within its band.
    None,
    /// Fraction of the ramp covered, in `[0, 1]`.
    Proportional(f32),
    /// At or beyond the end of the ramp.
    Critical,
}

impl Intensity {
    pub fn fraction(self) -> f32 {
        match self {
            Self::None => 0.0,
            Self::Proportional(f) => f,
            Self::Critical => 1.0,
        }
    }

    pub fn is_active(self) -> bool {
        match self {
            Self::None => false,
            Self::Proportional(f) => f > 0.0,
            Self::Critical => true,
        }
    }
}

/// Humidity thresholds resolved against the live target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HumidityBand {
    /// Humidifying starts below this value.
    pub humidify_start: f32,
    /// Humidify intensity reaches 1 here.
    pub floor: f32,
    /// Dehumidifying starts above this value.
    pub dehumidify_start: f32,
    /// Dehumidify intensity reaches 1 here.
    pub ceiling: f32,
    /// Ventilation is capped below this value.
    pub critical_low: f32,
}

impl HumidityBand {
    pub fn new(th: &HumidityThresholds, target: f32) -> Self {
        Self {
            humidify_start: target - th.dry_tolerance,
            floor: th.humidify_floor,
            dehumidify_start: th
                .dehumidify_threshold
                .unwrap_or(target + th.wet_tolerance),
            ceiling: th.dehumidify_ceiling,
            critical_low: th.dehumidify_critical,
        }
    }
}

/// Linear ramp over `span`; `distance` is how far past the threshold we are.
fn ramp(distance: f32, span: f32) -> Intensity {
    if span <= 0.0 || distance >= span {
        return Intensity::Critical;
    }
    Intensity::Proportional((distance / span).clamp(0.0, 1.0))
}

/// Humidify intent: fires strictly below `target - dry_tolerance`.
pub fn humidify(value: f32, band: &HumidityBand) -> Intensity {
    if !(value < band.humidify_start) {
        return Intensity::None;
    }
    ramp(band.humidify_start - value, band.humidify_start - band.floor)
}

/// Dehumidify-via-ventilation intent: fires strictly above the threshold.
pub fn dehumidify(value: f32, band: &HumidityBand) -> Intensity {
    if !(value > band.dehumidify_start) {
        return Intensity::None;
    }
    ramp(value - band.dehumidify_start, band.ceiling - band.dehumidify_start)
}

/// CO2 / VOC intent: fires strictly above target, saturates at critical.
pub fn air_quality(value: f32, th: &AirQualityThresholds) -> Intensity {
    if !(value > th.target) {
        return Intensity::None;
    }
    ramp(value - th.target, th.critical - th.target)
}

/// `round(fraction * (count - 1))`, the index into a level set.
pub fn level_index(fraction: f32, count: usize) -> usize {
    if count <= 1 {
        return 0;
    }
    let top = count - 1;
    let idx = (fraction.clamp(0.0, 1.0) * top as f32).round() as usize;
    idx.min(top)
}

/// Level index as a command, folding the set's "off" level into `Off`.
pub fn level_command(kind: &ActuatorKind, index: usize) -> ActuatorCommand {
    if kind.is_off_level(index) {
        ActuatorCommand::Off
    } else {
        ActuatorCommand::Level(index as u8)
    }
}

/// Map an intensity onto the command vocabulary of an actuator slot.
///
/// Slots without a usable level set are driven as on/off: any active
/// intensity turns them on.
pub fn command_for(kind: &ActuatorKind, intensity: Intensity) -> ActuatorCommand {
    if !intensity.is_active() || !kind.is_present() {
        return ActuatorCommand::Off;
    }
    match kind.level_count() {
        None => ActuatorCommand::On,
        Some(count) => {
            let index = match intensity {
                Intensity::Critical => count - 1,
                other => level_index(other.fraction(), count),
            };
            level_command(kind, index)
        }
    }
}

/// The strongest command a slot accepts.
pub fn max_command(kind: &ActuatorKind) -> ActuatorCommand {
    command_for(kind, Intensity::Critical)
}
