//! Minimum-cycle (dwell) gate for one actuator.
//!
//! A new command is held back until the previous one has been applied for
//! at least `min_cycle`.  Re-requesting the current command never resets
//! the timer.  The very first change after construction or
//! [`DwellGate::release`] is always accepted.

use core::time::Duration;

use log::debug;

use crate::time::Instant;

use super::{Actuator, ActuatorCommand};

#[derive(Debug, Clone)]
pub struct DwellGate {
    actuator: Actuator,
    current: ActuatorCommand,
    last_change: Option<Instant>,
    min_cycle: Option<Duration>,
}

impl DwellGate {
    pub fn new(actuator: Actuator, min_cycle: Option<Duration>) -> Self {
        Self {
            actuator,
            current: ActuatorCommand::Off,
            last_change: None,
            min_cycle,
        }
    }

    /// Command currently in effect.
    pub fn current(&self) -> ActuatorCommand {
        self.current
    }

    pub fn last_change(&self) -> Option<Instant> {
        self.last_change
    }

    /// Pass `desired` through if the dwell allows it, else keep the
    /// current command.  Returns the command in effect afterwards.
    pub fn filter(&mut self, desired: ActuatorCommand, now: Instant) -> ActuatorCommand {
        if desired == self.current {
            return self.current;
        }
        if self.remaining(now).is_some() {
            debug!(
                "{} change {} -> {} held by dwell",
                self.actuator, self.current, desired
            );
            return self.current;
        }
        self.apply(desired, now);
        self.current
    }

    /// Apply `cmd` regardless of the dwell.  Used for fail-safe and
    /// power-off transitions.
    pub fn force(&mut self, cmd: ActuatorCommand, now: Instant) {
        if cmd != self.current {
            self.apply(cmd, now);
        }
    }

    /// Forget the last change so the next one is accepted immediately.
    pub fn release(&mut self) {
        self.last_change = None;
    }

    /// Time until a change would be accepted; `None` if it would be now.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        let (Some(last), Some(min)) = (self.last_change, self.min_cycle) else {
            return None;
        };
        let elapsed = now.saturating_duration_since(last);
        if elapsed >= min {
            None
        } else {
            Some(min - elapsed)
        }
    }

    fn apply(&mut self, cmd: ActuatorCommand, now: Instant) {
        self.current = cmd;
        self.last_change = Some(now);
    }
}
