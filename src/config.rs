//! Controller configuration parameters
//!
//! All tunable parameters for one controlled zone.  Configuration is
//! immutable once a controller is built: a reconfiguration constructs a new
//! controller.  User-facing setpoint changes live in
//! [`Setpoint`](crate::control::setpoint::Setpoint), not here.

use core::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::control::boost::{BOOST_MAX_SECS, BOOST_MIN_SECS};

/// Maximum number of discrete levels an actuator may expose.
pub const MAX_LEVELS: usize = 8;
/// Maximum byte length of a single level name.
pub const LEVEL_NAME_LEN: usize = 16;

/// A single level name, e.g. `"2"` or `"high"`.
pub type Level = heapless::String<LEVEL_NAME_LEN>;
/// Ordered level set, lowest first.
pub type LevelSet = heapless::Vec<Level, MAX_LEVELS>;

// ---------------------------------------------------------------------------
// Actuator slots
// ---------------------------------------------------------------------------

/// What kind of device sits in an actuator slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActuatorKind {
    /// Nothing connected; commands for this slot are always `Off`.
    Absent,
    /// Simple on/off device.
    Binary,
    /// Multi-level device driven by level name.
    Leveled {
        levels: LevelSet,
        /// Device needs a separate power switch in addition to its level.
        #[serde(default)]
        power_gated: bool,
    },
}

impl ActuatorKind {
    pub fn is_present(&self) -> bool {
        !matches!(self, Self::Absent)
    }

    /// Number of usable levels, or `None` for slots driven as on/off.
    /// A leveled slot without levels is misconfigured and degrades to on/off.
    pub fn level_count(&self) -> Option<usize> {
        match self {
            Self::Leveled { levels, .. } if !levels.is_empty() => Some(levels.len()),
            _ => None,
        }
    }

    pub fn level(&self, index: usize) -> Option<&str> {
        match self {
            Self::Leveled { levels, .. } => levels.get(index).map(Level::as_str),
            _ => None,
        }
    }

    /// True if `index` names the level set's "off" entry (`"0"` / `"off"`).
    /// Only the lowest level can be an off level.
    pub fn is_off_level(&self, index: usize) -> bool {
        index == 0
            && self.level(0).is_some_and(|name| {
                let name = name.trim();
                name == "0" || name.eq_ignore_ascii_case("off")
            })
    }

    pub fn is_power_gated(&self) -> bool {
        matches!(self, Self::Leveled { power_gated: true, .. })
    }

    /// Leveled slot with an empty level set.
    pub fn is_misconfigured(&self) -> bool {
        matches!(self, Self::Leveled { levels, .. } if levels.is_empty())
    }
}

/// One actuator slot: the device kind plus its dwell time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActuatorSlot {
    pub kind: ActuatorKind,
    /// Minimum time a command must be held before it may change.
    #[serde(default)]
    pub min_cycle_secs: Option<u32>,
}

impl ActuatorSlot {
    pub fn absent() -> Self {
        Self {
            kind: ActuatorKind::Absent,
            min_cycle_secs: None,
        }
    }

    pub fn binary() -> Self {
        Self {
            kind: ActuatorKind::Binary,
            min_cycle_secs: None,
        }
    }

    /// Leveled slot from level names.  Names longer than
    /// [`LEVEL_NAME_LEN`] or beyond [`MAX_LEVELS`] entries are dropped.
    pub fn leveled(names: &[&str], power_gated: bool) -> Self {
        let mut levels = LevelSet::new();
        for name in names {
            let mut level = Level::new();
            if level.push_str(name).is_err() || levels.push(level).is_err() {
                warn!("level '{}' dropped (name too long or set full)", name);
            }
        }
        Self {
            kind: ActuatorKind::Leveled {
                levels,
                power_gated,
            },
            min_cycle_secs: None,
        }
    }

    pub fn with_min_cycle_secs(mut self, secs: u32) -> Self {
        self.min_cycle_secs = Some(secs);
        self
    }

    /// Dwell time, `None` when unset or zero.
    pub fn min_cycle(&self) -> Option<Duration> {
        self.min_cycle_secs
            .filter(|s| *s > 0)
            .map(|s| Duration::from_secs(u64::from(s)))
    }
}

// ---------------------------------------------------------------------------
// Signal thresholds
// ---------------------------------------------------------------------------

/// Humidity band (all values in %RH).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HumidityThresholds {
    /// Initial target humidity.
    pub target: f32,
    /// Lowest target a user may set.
    pub min_target: f32,
    /// Highest target a user may set.
    pub max_target: f32,
    /// Deadband below target before humidifying starts.
    pub dry_tolerance: f32,
    /// Deadband above target before dehumidifying starts
    /// (used when `dehumidify_threshold` is unset).
    pub wet_tolerance: f32,
    /// Humidity at which humidify intensity reaches 100 %.
    pub humidify_floor: f32,
    /// Fixed dehumidify threshold; `None` follows `target + wet_tolerance`.
    #[serde(default)]
    pub dehumidify_threshold: Option<f32>,
    /// Humidity at which dehumidify intensity reaches 100 %.
    pub dehumidify_ceiling: f32,
    /// Below this humidity ventilation is capped to `protective_cap`.
    pub dehumidify_critical: f32,
    /// Highest ventilation level index allowed during a low-humidity excursion.
    pub protective_cap: u8,
    /// Target applied by the `away` preset; preset unavailable when `None`.
    #[serde(default)]
    pub away_target: Option<f32>,
    /// While away, target changes only update the saved target.
    #[serde(default)]
    pub away_fixed: bool,
}

impl Default for HumidityThresholds {
    fn default() -> Self {
        Self {
            target: 43.0,
            min_target: 30.0,
            max_target: 60.0,
            dry_tolerance: 3.0,
            wet_tolerance: 3.0,
            humidify_floor: 25.0,
            dehumidify_threshold: None,
            dehumidify_ceiling: 65.0,
            dehumidify_critical: 35.0,
            protective_cap: 2,
            away_target: None,
            away_fixed: false,
        }
    }
}

/// Air-quality band for CO2 (ppm) or VOC (index / ppb).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AirQualityThresholds {
    /// Ventilation starts above this value.
    pub target: f32,
    /// Ventilation reaches its maximum level at this value.
    pub critical: f32,
}

impl AirQualityThresholds {
    pub const fn co2_default() -> Self {
        Self {
            target: 800.0,
            critical: 1400.0,
        }
    }

    pub const fn voc_default() -> Self {
        Self {
            target: 250.0,
            critical: 500.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Controller configuration
// ---------------------------------------------------------------------------

/// Core controller configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    // --- Signals ---
    pub humidity: HumidityThresholds,
    /// CO2 band; CO2 is not monitored when `None`.
    #[serde(default)]
    pub co2: Option<AirQualityThresholds>,
    /// VOC band; VOC is not monitored when `None`.
    #[serde(default)]
    pub voc: Option<AirQualityThresholds>,

    // --- Actuators ---
    pub humidifier: ActuatorSlot,
    pub ventilation: ActuatorSlot,

    // --- Timing ---
    /// Readings older than this are stale.  `None` disables age checks
    /// (a signal that never reported is still stale).
    #[serde(default)]
    pub stale_secs: Option<u32>,
    /// Boost length used by the helper switch and by duration-less requests.
    pub boost_default_secs: u32,
    /// Re-send held actuator commands at this interval.
    #[serde(default)]
    pub keep_alive_secs: Option<u32>,
    /// Cadence of the periodic tick driven by the host loop.
    pub tick_interval_ms: u32,
    /// Telemetry report interval (seconds).
    pub telemetry_interval_secs: u32,

    // --- Power ---
    /// Whether the controller starts powered on.
    pub initial_power: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            humidity: HumidityThresholds::default(),
            co2: Some(AirQualityThresholds::co2_default()),
            voc: None,

            humidifier: ActuatorSlot::leveled(&["1", "2", "3"], true).with_min_cycle_secs(300),
            ventilation: ActuatorSlot::leveled(&["0", "1", "2", "3", "4"], false)
                .with_min_cycle_secs(120),

            stale_secs: Some(900),
            boost_default_secs: 900,
            keep_alive_secs: None,
            tick_interval_ms: 5000,
            telemetry_interval_secs: 60,

            initial_power: true,
        }
    }
}

impl ControllerConfig {
    /// Parse a JSON document and validate it.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(text).map_err(|e| {
            warn!("config parse failed: {}", e);
            ConfigError::Corrupted
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn stale_duration(&self) -> Option<Duration> {
        self.stale_secs
            .filter(|s| *s > 0)
            .map(|s| Duration::from_secs(u64::from(s)))
    }

    pub fn boost_default(&self) -> Duration {
        Duration::from_secs(u64::from(self.boost_default_secs))
    }

    pub fn keep_alive(&self) -> Option<Duration> {
        self.keep_alive_secs
            .filter(|s| *s > 0)
            .map(|s| Duration::from_secs(u64::from(s)))
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.tick_interval_ms))
    }

    pub fn telemetry_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.telemetry_interval_secs))
    }

    /// Range-check every field.  Invalid values are rejected, never clamped.
    ///
    /// A leveled actuator without levels is accepted with a warning: the
    /// engine drives it as plain on/off.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let h = &self.humidity;
        let humidity_fields = [
            h.target,
            h.min_target,
            h.max_target,
            h.dry_tolerance,
            h.wet_tolerance,
            h.humidify_floor,
            h.dehumidify_ceiling,
            h.dehumidify_critical,
        ];
        if humidity_fields
            .iter()
            .any(|v| !v.is_finite() || !(0.0..=100.0).contains(v))
        {
            return Err(ConfigError::ValidationFailed(
                "humidity thresholds must be finite and within 0–100",
            ));
        }
        if h.min_target > h.max_target {
            return Err(ConfigError::ValidationFailed(
                "humidity min_target must be <= max_target",
            ));
        }
        if !(h.min_target..=h.max_target).contains(&h.target) {
            return Err(ConfigError::ValidationFailed(
                "humidity target must lie within min_target..=max_target",
            ));
        }
        if h.humidify_floor >= h.min_target - h.dry_tolerance {
            return Err(ConfigError::ValidationFailed(
                "humidify_floor must be below min_target - dry_tolerance",
            ));
        }
        let dehumidify_start = h
            .dehumidify_threshold
            .unwrap_or(h.target + h.wet_tolerance);
        if !dehumidify_start.is_finite() || dehumidify_start >= h.dehumidify_ceiling {
            return Err(ConfigError::ValidationFailed(
                "dehumidify_ceiling must be above the dehumidify threshold",
            ));
        }
        // A runtime target change moves the derived threshold up to here.
        if h.dehumidify_threshold.is_none()
            && h.max_target + h.wet_tolerance >= h.dehumidify_ceiling
        {
            return Err(ConfigError::ValidationFailed(
                "dehumidify_ceiling must be above max_target + wet_tolerance",
            ));
        }
        if h.dehumidify_critical >= dehumidify_start {
            return Err(ConfigError::ValidationFailed(
                "dehumidify_critical must be below the dehumidify threshold",
            ));
        }
        if let Some(away) = h.away_target {
            if !away.is_finite() || !(h.min_target..=h.max_target).contains(&away) {
                return Err(ConfigError::ValidationFailed(
                    "away_target must lie within min_target..=max_target",
                ));
            }
        }

        for band in [self.co2, self.voc].iter().flatten() {
            if !band.target.is_finite() || !band.critical.is_finite() || band.target < 0.0 {
                return Err(ConfigError::ValidationFailed(
                    "air-quality thresholds must be finite and non-negative",
                ));
            }
            if band.critical <= band.target {
                return Err(ConfigError::ValidationFailed(
                    "air-quality critical must be above target",
                ));
            }
        }

        if !(BOOST_MIN_SECS..=BOOST_MAX_SECS).contains(&u64::from(self.boost_default_secs)) {
            return Err(ConfigError::ValidationFailed(
                "boost_default_secs must be 60–3600",
            ));
        }
        if !(100..=60_000).contains(&self.tick_interval_ms) {
            return Err(ConfigError::ValidationFailed(
                "tick_interval_ms must be 100–60000",
            ));
        }
        if !(5..=3600).contains(&self.telemetry_interval_secs) {
            return Err(ConfigError::ValidationFailed(
                "telemetry_interval_secs must be 5–3600",
            ));
        }

        for (name, slot) in [
            ("humidifier", &self.humidifier),
            ("ventilation", &self.ventilation),
        ] {
            if slot.kind.is_misconfigured() {
                warn!("{} has no levels configured, driving it as on/off", name);
            }
        }

        Ok(())
    }
}
