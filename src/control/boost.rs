//! Timed ventilation boost.
//!
//! A boost forces ventilation to its maximum level until `until`.  A new
//! request replaces the running window; it never extends it.

use core::time::Duration;

use log::{info, warn};

use crate::error::{Error, Result};
use crate::time::Instant;

/// Shortest accepted boost, seconds.
pub const BOOST_MIN_SECS: u64 = 60;
/// Longest accepted boost, seconds.
pub const BOOST_MAX_SECS: u64 = 3600;

/// Normalized boost request, whatever trigger produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoostEvent {
    Requested { duration: Duration },
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoostState {
    #[default]
    Inactive,
    Active { until: Instant },
}

#[derive(Debug, Clone, Default)]
pub struct BoostController {
    state: BoostState,
}

impl BoostController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> BoostState {
        self.state
    }

    /// Start (or restart) a boost of `duration` from `now`.
    ///
    /// Durations outside `BOOST_MIN_SECS..=BOOST_MAX_SECS` are rejected and
    /// leave the state untouched.
    pub fn request(&mut self, duration: Duration, now: Instant) -> Result<Instant> {
        if duration < Duration::from_secs(BOOST_MIN_SECS)
            || duration > Duration::from_secs(BOOST_MAX_SECS)
        {
            warn!("boost of {}s rejected", duration.as_secs());
            return Err(Error::InvalidDuration {
                secs: duration.as_secs(),
            });
        }
        let until = now + duration;
        if let BoostState::Active { until: previous } = self.state {
            info!("boost window replaced: {} -> {}", previous, until);
        } else {
            info!("boost started until {}", until);
        }
        self.state = BoostState::Active { until };
        Ok(until)
    }

    /// Cancel a running boost.  Returns `true` if one was running.
    pub fn stop(&mut self) -> bool {
        let was_active = self.is_active();
        if was_active {
            info!("boost stopped");
        }
        self.state = BoostState::Inactive;
        was_active
    }

    /// End the boost if its window has elapsed.  Returns `true` on expiry.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.state {
            BoostState::Active { until } if now >= until => {
                info!("boost expired at {}", now);
                self.state = BoostState::Inactive;
                true
            }
            _ => false,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, BoostState::Active { .. })
    }

    pub fn until(&self) -> Option<Instant> {
        match self.state {
            BoostState::Active { until } => Some(until),
            BoostState::Inactive => None,
        }
    }

    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.until().map(|until| now.saturating_duration_until(until))
    }
}
