//! Sensor subsystem: the [`ReadingStore`] holding the latest value of every
//! monitored signal.
//!
//! Sensor adapters push `(signal, value, timestamp)`; the store keeps only
//! the most recent reading per signal and answers "is it stale?".  A
//! rejected (implausible) value clears the slot, so the signal is treated
//! exactly like one that stopped reporting.

pub mod plausibility;

use core::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::time::Instant;

/// A monitored environmental signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Signal {
    /// Relative humidity, %RH.
    Humidity = 0,
    /// Carbon dioxide, ppm.
    Co2 = 1,
    /// Volatile organic compounds, sensor index / ppb.
    Voc = 2,
}

impl Signal {
    pub const COUNT: usize = 3;
    pub const ALL: [Signal; Self::COUNT] = [Self::Humidity, Self::Co2, Self::Voc];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Humidity => "humidity",
            Self::Co2 => "co2",
            Self::Voc => "voc",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(name))
    }
}

impl core::fmt::Display for Signal {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latest value of one signal and when it was taken.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalReading {
    pub value: f32,
    pub timestamp: Instant,
}

/// Latest reading per signal.  No history is retained.
#[derive(Debug, Clone, Default)]
pub struct ReadingStore {
    slots: [Option<SignalReading>; Signal::COUNT],
}

impl ReadingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reading, overwriting the previous one.
    ///
    /// Returns `false` if the value was implausible; the slot is then
    /// cleared so the signal reads as stale until a good value arrives.
    pub fn update(&mut self, signal: Signal, value: f32, timestamp: Instant) -> bool {
        if !plausibility::is_plausible(signal, value) {
            warn!("{} reading {} rejected as implausible", signal, value);
            self.clear(signal);
            return false;
        }
        self.slots[signal as usize] = Some(SignalReading { value, timestamp });
        true
    }

    /// Forget the current reading of `signal`.
    pub fn clear(&mut self, signal: Signal) {
        self.slots[signal as usize] = None;
    }

    pub fn latest(&self, signal: Signal) -> Option<SignalReading> {
        self.slots[signal as usize]
    }

    /// Latest value regardless of age.
    pub fn value(&self, signal: Signal) -> Option<f32> {
        self.latest(signal).map(|r| r.value)
    }

    /// True iff nothing was ever received, or `stale_after` is set and the
    /// reading is strictly older than it.
    pub fn is_stale(&self, signal: Signal, now: Instant, stale_after: Option<Duration>) -> bool {
        match (self.latest(signal), stale_after) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(r), Some(limit)) => now.saturating_duration_since(r.timestamp) > limit,
        }
    }

    /// Value of `signal` if it is fresh.
    pub fn fresh_value(
        &self,
        signal: Signal,
        now: Instant,
        stale_after: Option<Duration>,
    ) -> Option<f32> {
        if self.is_stale(signal, now, stale_after) {
            None
        } else {
            self.value(signal)
        }
    }
}
