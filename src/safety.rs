//! Safety supervisor.
//!
//! The supervisor runs **every decision cycle before the control law** and
//! accumulates a fault bitmask of stale signals.
//!
//! ## Fault lifecycle
//!
//! 1. A signal stops reporting, reports garbage, or ages past the stale
//!    window.
//! 2. The supervisor sets the corresponding bit.
//! 3. `HumidityStale` makes the engine force every actuator off and report
//!    `idle`.  A stale CO2 / VOC bit only drops that signal's intent.
//! 4. Each cycle the supervisor re-evaluates and clears bits whose signal
//!    is fresh again.
//!
//! Signals without a configured band are not monitored and never fault.

use core::time::Duration;

use log::{error, info, warn};

use crate::config::ControllerConfig;
use crate::error::SafetyFault;
use crate::sensors::{ReadingStore, Signal};
use crate::time::Instant;

/// Fault bit tracking the freshness of `signal`.
pub fn fault_for(signal: Signal) -> SafetyFault {
    match signal {
        Signal::Humidity => SafetyFault::HumidityStale,
        Signal::Co2 => SafetyFault::Co2Stale,
        Signal::Voc => SafetyFault::VocStale,
    }
}

pub struct SafetySupervisor {
    stale_after: Option<Duration>,
    /// Signals that are monitored, indexed by `Signal as usize`.
    monitored: [bool; Signal::COUNT],
    /// Latched fault bitmask.
    faults: u8,
}

impl SafetySupervisor {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            stale_after: config.stale_duration(),
            monitored: [true, config.co2.is_some(), config.voc.is_some()],
            faults: 0,
        }
    }

    pub fn is_monitored(&self, signal: Signal) -> bool {
        self.monitored[signal as usize]
    }

    /// Evaluate staleness of every monitored signal.
    /// Returns the updated fault bitmask.
    pub fn evaluate(&mut self, readings: &ReadingStore, now: Instant) -> u8 {
        for signal in Signal::ALL {
            let fault = fault_for(signal);
            if self.is_monitored(signal) {
                self.eval_fault(fault, readings.is_stale(signal, now, self.stale_after));
            } else {
                self.clear_fault(fault);
            }
        }
        self.faults
    }

    /// Current fault bitmask.
    pub fn faults(&self) -> u8 {
        self.faults
    }

    /// True if **any** fault is active.
    pub fn has_faults(&self) -> bool {
        self.faults != 0
    }

    /// Check if a specific fault is active.
    pub fn has_fault(&self, fault: SafetyFault) -> bool {
        self.faults & fault.mask() != 0
    }

    // ── Internal ──────────────────────────────────────────────────

    fn eval_fault(&mut self, fault: SafetyFault, condition: bool) {
        if condition {
            if self.faults & fault.mask() == 0 {
                if fault == SafetyFault::HumidityStale {
                    error!("SAFETY FAULT SET: {fault}");
                } else {
                    warn!("SAFETY FAULT SET: {fault}");
                }
            }
            self.faults |= fault.mask();
        } else {
            if self.faults & fault.mask() != 0 {
                info!("SAFETY FAULT CLEARED: {fault}");
            }
            self.faults &= !fault.mask();
        }
    }

    fn clear_fault(&mut self, fault: SafetyFault) {
        self.faults &= !fault.mask();
    }
}
