//! Boost trigger adapters.
//!
//! Two kinds of trigger reach the controller: a service-style call with an
//! optional duration, and a boolean helper whose edges start and stop the
//! boost.  Both are reduced here to a [`BoostEvent`], so the boost state
//! machine never sees where a request came from.

use core::time::Duration;

use crate::control::boost::BoostEvent;

/// Edge detector for a boolean boost helper.
///
/// The helper is assumed off at start, so a helper that is already on when
/// first observed counts as a rising edge.
#[derive(Debug, Clone, Copy, Default)]
pub struct HelperEdge {
    last: bool,
}

impl HelperEdge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the helper's current state.  Returns an event on an edge.
    pub fn observe(&mut self, state: bool, default_duration: Duration) -> Option<BoostEvent> {
        let previous = core::mem::replace(&mut self.last, state);
        match (previous, state) {
            (false, true) => Some(BoostEvent::Requested {
                duration: default_duration,
            }),
            (true, false) => Some(BoostEvent::Stopped),
            _ => None,
        }
    }

    pub fn state(&self) -> bool {
        self.last
    }

    /// Forget the helper state, e.g. after the boost expired on its own.
    pub fn reset(&mut self) {
        self.last = false;
    }
}

/// Service-style boost call.
pub fn service_request(duration: Option<Duration>, default_duration: Duration) -> BoostEvent {
    BoostEvent::Requested {
        duration: duration.unwrap_or(default_duration),
    }
}
