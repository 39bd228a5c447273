//! Decision engine: one controller instance for one zone.
//!
//! Owns every piece of control state (readings, safety, setpoint, dwell
//! gates, boost) and runs the full chain on each call to
//! [`DecisionEngine::decide`].  Priority, first match wins:
//!
//! 1. Powered off: both actuators off, mode kept from the last cycle.
//! 2. Humidity stale: both actuators off, mode `idle`.  Beats boost and
//!    critical air quality.
//! 3. Threshold policy → resolver → boost override → dwell gates, with the
//!    mode derived from what the gates let through.

use core::time::Duration;

use log::{debug, info};

use crate::config::ControllerConfig;
use crate::error::{Error, Result, SafetyFault};
use crate::safety::SafetySupervisor;
use crate::sensors::{ReadingStore, Signal};
use crate::time::Instant;

use super::boost::BoostController;
use super::dwell::DwellGate;
use super::resolver::{self, Intents, Resolver};
use super::setpoint::{Preset, Setpoint};
use super::threshold::{self, HumidityBand, Intensity};
use super::{Actuator, ActuatorCommand, Decision, OperatingMode, VentilationReason};

pub struct DecisionEngine {
    config: ControllerConfig,
    readings: ReadingStore,
    safety: SafetySupervisor,
    setpoint: Setpoint,
    humidifier_gate: DwellGate,
    ventilation_gate: DwellGate,
    boost: BoostController,
    /// Boost state seen by the previous cycle, for edge detection.
    boost_was_active: bool,
    powered: bool,
    mode: OperatingMode,
    /// Reason behind the ventilation command currently held by the gate.
    ventilation_reason: VentilationReason,
    last: Decision,
}

impl DecisionEngine {
    /// Build an engine for an already validated configuration.
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            readings: ReadingStore::new(),
            safety: SafetySupervisor::new(&config),
            setpoint: Setpoint::new(&config.humidity),
            humidifier_gate: DwellGate::new(Actuator::Humidifier, config.humidifier.min_cycle()),
            ventilation_gate: DwellGate::new(Actuator::Ventilation, config.ventilation.min_cycle()),
            boost: BoostController::new(),
            boost_was_active: false,
            powered: config.initial_power,
            mode: OperatingMode::Idle,
            ventilation_reason: VentilationReason::None,
            last: Decision::default(),
            config,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn readings(&self) -> &ReadingStore {
        &self.readings
    }

    pub fn setpoint(&self) -> &Setpoint {
        &self.setpoint
    }

    pub fn boost(&self) -> &BoostController {
        &self.boost
    }

    pub fn faults(&self) -> u8 {
        self.safety.faults()
    }

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    pub fn mode(&self) -> OperatingMode {
        self.mode
    }

    pub fn last_decision(&self) -> &Decision {
        &self.last
    }

    /// Time until `actuator` may change command, if it is being held.
    pub fn dwell_remaining(&self, actuator: Actuator, now: Instant) -> Option<Duration> {
        match actuator {
            Actuator::Humidifier => self.humidifier_gate.remaining(now),
            Actuator::Ventilation => self.ventilation_gate.remaining(now),
        }
    }

    // ── Inputs ────────────────────────────────────────────────────

    /// Record a sensor value.  Returns `false` if it was rejected.
    pub fn record_reading(&mut self, signal: Signal, value: f32, at: Instant) -> bool {
        self.readings.update(signal, value, at)
    }

    /// Switch the controller on or off.  Returns `true` if the state changed.
    ///
    /// Powering on releases both dwell gates so the first decision applies
    /// at once.
    pub fn set_powered(&mut self, on: bool) -> bool {
        if on == self.powered {
            return false;
        }
        if on {
            self.release_gates();
        }
        self.powered = on;
        info!("controller powered {}", if on { "on" } else { "off" });
        true
    }

    pub fn set_humidity_target(&mut self, value: f32) -> Result<f32> {
        self.setpoint.set_target(value)
    }

    /// Change preset.  A real change releases the dwell gates.
    pub fn set_preset(&mut self, preset: Preset) -> Result<()> {
        let previous = self.setpoint.preset();
        self.setpoint.set_preset(preset)?;
        if previous != preset {
            self.release_gates();
        }
        Ok(())
    }

    /// Reinstate persisted user state.
    pub fn restore(
        &mut self,
        powered: bool,
        target: f32,
        saved: Option<f32>,
        preset: Preset,
        mode: OperatingMode,
    ) {
        self.setpoint.restore(target, saved, preset);
        self.powered = powered;
        self.mode = mode;
        self.release_gates();
    }

    /// Start or replace a boost window.  Fails without a ventilation
    /// actuator or for out-of-range durations.
    pub fn request_boost(&mut self, duration: Duration, now: Instant) -> Result<Instant> {
        if !self.config.ventilation.kind.is_present() {
            return Err(Error::NoVentilation);
        }
        self.boost.request(duration, now)
    }

    /// Cancel a running boost.  Returns `true` if one was running.
    pub fn stop_boost(&mut self) -> bool {
        self.boost.stop()
    }

    // ── Decision cycle ────────────────────────────────────────────

    /// Run one decision cycle at `now`.
    pub fn decide(&mut self, now: Instant) -> Decision {
        self.boost.expire(now);
        let faults = self.safety.evaluate(&self.readings, now);
        let boost_active = self.boost.is_active();
        let boost_edge = boost_active != self.boost_was_active;
        self.boost_was_active = boost_active;

        let mut decision = if !self.powered {
            self.force_off(now);
            Decision {
                mode: self.mode,
                ..Decision::default()
            }
        } else if faults & SafetyFault::HumidityStale.mask() != 0 {
            self.force_off(now);
            self.mode = OperatingMode::Idle;
            Decision::default()
        } else {
            self.regulate(now, boost_active, boost_edge)
        };

        decision.faults = faults;
        decision.boost_until = self.boost.until();
        self.last = decision;
        decision
    }

    fn regulate(&mut self, now: Instant, boost_active: bool, boost_edge: bool) -> Decision {
        let stale_after = self.config.stale_duration();
        let Some(humidity) = self
            .readings
            .fresh_value(Signal::Humidity, now, stale_after)
        else {
            self.force_off(now);
            self.mode = OperatingMode::Idle;
            return Decision::default();
        };

        let band = HumidityBand::new(&self.config.humidity, self.setpoint.target());
        let intents = Intents {
            humidify: threshold::humidify(humidity, &band),
            dehumidify: threshold::dehumidify(humidity, &band),
            co2: self.air_quality_intent(Signal::Co2, now),
            voc: self.air_quality_intent(Signal::Voc, now),
        };
        let resolution = Resolver::new(&self.config).resolve(&intents, humidity < band.critical_low);
        debug!(
            "rh={:.1} intents={:?} -> humidifier {} ventilation {} ({:?})",
            humidity, intents, resolution.humidifier, resolution.ventilation,
            resolution.ventilation_reason
        );

        let (desired_ventilation, desired_reason) = if boost_active {
            (
                threshold::max_command(&self.config.ventilation.kind),
                VentilationReason::Boost,
            )
        } else {
            (resolution.ventilation, resolution.ventilation_reason)
        };

        let humidifier = self.humidifier_gate.filter(resolution.humidifier, now);
        let ventilation = if boost_edge {
            self.ventilation_gate.force(desired_ventilation, now);
            desired_ventilation
        } else {
            self.ventilation_gate.filter(desired_ventilation, now)
        };

        if ventilation == desired_ventilation {
            self.ventilation_reason = desired_reason;
        }
        if !ventilation.is_active() {
            self.ventilation_reason = VentilationReason::None;
        }

        self.mode = resolver::derive_mode(humidifier, ventilation, self.ventilation_reason, boost_active);
        Decision {
            mode: self.mode,
            humidifier,
            ventilation,
            ventilation_reason: self.ventilation_reason,
            ..Decision::default()
        }
    }

    fn air_quality_intent(&self, signal: Signal, now: Instant) -> Intensity {
        let band = match signal {
            Signal::Co2 => self.config.co2,
            Signal::Voc => self.config.voc,
            Signal::Humidity => None,
        };
        let Some(band) = band else {
            return Intensity::None;
        };
        match self
            .readings
            .fresh_value(signal, now, self.config.stale_duration())
        {
            Some(value) => threshold::air_quality(value, &band),
            None => Intensity::None,
        }
    }

    fn force_off(&mut self, now: Instant) {
        self.humidifier_gate.force(ActuatorCommand::Off, now);
        self.ventilation_gate.force(ActuatorCommand::Off, now);
        self.ventilation_reason = VentilationReason::None;
    }

    fn release_gates(&mut self) {
        self.humidifier_gate.release();
        self.ventilation_gate.release();
    }
}
