//! User-adjustable humidity target and preset.
//!
//! The band edges and ramps live in the immutable config; only the target
//! they are centred on moves at runtime.

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::HumidityThresholds;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    #[default]
    Normal,
    Away,
}

impl Preset {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Away => "away",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        [Self::Normal, Self::Away]
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone)]
pub struct Setpoint {
    target: f32,
    /// Target to return to when leaving `away`.
    saved: Option<f32>,
    preset: Preset,
    min: f32,
    max: f32,
    away_target: Option<f32>,
    away_fixed: bool,
}

impl Setpoint {
    pub fn new(th: &HumidityThresholds) -> Self {
        Self {
            target: th.target,
            saved: None,
            preset: Preset::Normal,
            min: th.min_target,
            max: th.max_target,
            away_target: th.away_target,
            away_fixed: th.away_fixed,
        }
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn saved(&self) -> Option<f32> {
        self.saved
    }

    pub fn preset(&self) -> Preset {
        self.preset
    }

    fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    /// Set the target, clamped to the configured range.  Returns the
    /// target in effect afterwards.
    ///
    /// With `away_fixed`, a change while away only updates the target that
    /// is restored on return.
    pub fn set_target(&mut self, value: f32) -> Result<f32> {
        if !value.is_finite() {
            return Err(Error::InvalidTarget);
        }
        let value = self.clamp(value);
        if self.preset == Preset::Away && self.away_fixed {
            self.saved = Some(value);
            info!("saved target set to {:.1} (away preset fixed)", value);
        } else {
            self.target = value;
            info!("target set to {:.1}", value);
        }
        Ok(self.target)
    }

    /// Switch preset.  Selecting the active preset is a no-op.
    pub fn set_preset(&mut self, preset: Preset) -> Result<()> {
        if preset == self.preset {
            return Ok(());
        }
        match preset {
            Preset::Away => {
                let away = self.away_target.ok_or(Error::PresetUnavailable)?;
                self.saved = Some(self.target);
                self.target = self.clamp(away);
            }
            Preset::Normal => {
                if let Some(saved) = self.saved.take() {
                    self.target = saved;
                }
            }
        }
        self.preset = preset;
        info!("preset {} (target {:.1})", preset.as_str(), self.target);
        Ok(())
    }

    /// Reinstate persisted values.  Non-finite targets are ignored and an
    /// away preset without a configured away target falls back to normal.
    pub fn restore(&mut self, target: f32, saved: Option<f32>, preset: Preset) {
        if target.is_finite() {
            self.target = self.clamp(target);
        }
        self.saved = saved.filter(|v| v.is_finite()).map(|v| self.clamp(v));
        self.preset = if preset == Preset::Away && self.away_target.is_none() {
            Preset::Normal
        } else {
            preset
        };
    }
}
