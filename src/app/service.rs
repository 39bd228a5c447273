//! Application service: the hexagonal core.
//!
//! [`AppService`] owns the decision engine and the boost trigger state.
//! It exposes a clean, device-agnostic API.  All I/O flows through port
//! traits injected at call sites, making the entire service testable with
//! mock adapters.
//!
//! ```text
//!  readings ──▶ ┌────────────────────────────┐ ──▶ EventSink
//!  ticks    ──▶ │        AppService          │
//!  commands ──▶ │  Engine · Safety · Boost   │ ──▶ ActuatorPort
//!               └────────────────────────────┘
//! ```

use core::time::Duration;

use log::{info, warn};

use crate::config::{ActuatorKind, ControllerConfig};
use crate::control::boost::BoostEvent;
use crate::control::engine::DecisionEngine;
use crate::control::{Actuator, ActuatorCommand, Decision, OperatingMode};
use crate::error::Result;
use crate::events::ControlEvent;
use crate::safety::fault_for;
use crate::sensors::Signal;
use crate::time::Instant;

use super::commands::AppCommand;
use super::events::{AppEvent, BoostEnd, TelemetryData};
use super::persist::PersistedState;
use super::ports::{ActuatorPort, ConfigError, EventSink, StoragePort};
use super::triggers::{self, HelperEdge};

/// Delay between the last user change and the automatic state save.
const AUTO_SAVE_DELAY: Duration = Duration::from_secs(5);

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    engine: DecisionEngine,
    helper: HelperEdge,
    /// Commands last written to the actuator port.
    applied: Option<Decision>,
    last_sent_at: Option<Instant>,
    next_telemetry: Option<Instant>,
    cycle_count: u64,
    state_dirty: bool,
    dirty_since: Instant,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** drive any actuator; call [`start`](Self::start) next.
    pub fn new(config: ControllerConfig) -> core::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            engine: DecisionEngine::new(config),
            helper: HelperEdge::new(),
            applied: None,
            last_sent_at: None,
            next_telemetry: None,
            cycle_count: 0,
            state_dirty: false,
            dirty_since: Instant::ZERO,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Reinstate persisted user state.  Call before [`start`](Self::start).
    pub fn restore(&mut self, state: &PersistedState) {
        self.engine.restore(
            state.powered,
            state.humidity_target,
            state.saved_target,
            state.preset,
            state.mode,
        );
        info!(
            "state restored: powered={} target={:.1} preset={}",
            state.powered,
            self.engine.setpoint().target(),
            self.engine.setpoint().preset().as_str()
        );
    }

    /// Announce the service and run a first decision cycle, so every
    /// actuator starts from a known (usually off) state.
    pub fn start(
        &mut self,
        now: Instant,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Decision {
        sink.emit(&AppEvent::Started(self.engine.mode()));
        info!("AppService started in {}", self.engine.mode());
        self.next_telemetry = Some(now + self.engine.config().telemetry_interval());
        self.cycle(now, hw, sink)
    }

    // ── Event handling ────────────────────────────────────────

    /// Record a sensor reading and run a decision cycle.
    pub fn handle_reading(
        &mut self,
        signal: Signal,
        value: f32,
        at: Instant,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Decision {
        if !self.engine.record_reading(signal, value, at) {
            sink.emit(&AppEvent::ReadingRejected { signal, value });
        }
        self.cycle(at, hw, sink)
    }

    /// Periodic tick: decision cycle plus telemetry when due.
    pub fn tick(
        &mut self,
        now: Instant,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Decision {
        let decision = self.cycle(now, hw, sink);
        if self.next_telemetry.is_none_or(|due| now >= due) {
            sink.emit(&AppEvent::Telemetry(self.build_telemetry(now)));
            self.next_telemetry = Some(now + self.engine.config().telemetry_interval());
        }
        decision
    }

    /// Process an external command.  A rejected command changes nothing
    /// and skips the decision cycle.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        now: Instant,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        let default_boost = self.engine.config().boost_default();
        match cmd {
            AppCommand::TurnOn | AppCommand::TurnOff => {
                let on = cmd == AppCommand::TurnOn;
                if self.engine.set_powered(on) {
                    sink.emit(&AppEvent::PowerChanged(on));
                    self.mark_state_dirty(now);
                }
            }
            AppCommand::SetHumidityTarget(value) => {
                self.engine.set_humidity_target(value).inspect_err(|e| {
                    warn!("target {} rejected: {}", value, e);
                })?;
                self.emit_setpoint(sink);
                self.mark_state_dirty(now);
            }
            AppCommand::SetPreset(preset) => {
                self.engine.set_preset(preset).inspect_err(|e| {
                    warn!("preset {} rejected: {}", preset.as_str(), e);
                })?;
                self.emit_setpoint(sink);
                self.mark_state_dirty(now);
            }
            AppCommand::Boost { duration } => {
                self.apply_boost(triggers::service_request(duration, default_boost), now, sink)?;
            }
            AppCommand::StopBoost => {
                self.apply_boost(BoostEvent::Stopped, now, sink)?;
            }
            AppCommand::BoostHelper(state) => {
                if let Some(event) = self.helper.observe(state, default_boost) {
                    self.apply_boost(event, now, sink)?;
                }
            }
            AppCommand::SaveState => {
                self.dirty_since = Instant::ZERO;
                self.state_dirty = true;
                info!("Explicit state save requested (will flush on next auto-save check)");
            }
        }
        self.cycle(now, hw, sink);
        Ok(())
    }

    /// Route one queued [`ControlEvent`].
    pub fn dispatch(
        &mut self,
        event: ControlEvent,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        match event {
            ControlEvent::Reading { signal, value, at } => {
                self.handle_reading(signal, value, at, hw, sink);
            }
            ControlEvent::Tick { at } => {
                self.tick(at, hw, sink);
            }
            ControlEvent::Command { cmd, at } => self.handle_command(cmd, at, hw, sink)?,
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a telemetry snapshot from the current state.
    pub fn build_telemetry(&self, now: Instant) -> TelemetryData {
        let readings = self.engine.readings();
        let last = self.engine.last_decision();
        TelemetryData {
            mode: last.mode,
            powered: self.engine.is_powered(),
            humidity: readings.value(Signal::Humidity),
            co2: readings.value(Signal::Co2),
            voc: readings.value(Signal::Voc),
            target: self.engine.setpoint().target(),
            preset: self.engine.setpoint().preset(),
            humidifier: last.humidifier,
            ventilation: last.ventilation,
            ventilation_reason: last.ventilation_reason,
            boost_remaining_secs: self.engine.boost().remaining(now).map(|d| d.as_secs()),
            fault_flags: self.engine.faults(),
        }
    }

    pub fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    pub fn mode(&self) -> OperatingMode {
        self.engine.mode()
    }

    pub fn last_decision(&self) -> &Decision {
        self.engine.last_decision()
    }

    /// Current active fault bitmask (0 = no faults).
    pub fn fault_flags(&self) -> u8 {
        self.engine.faults()
    }

    /// Decision cycles executed since construction.
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    pub fn current_config(&self) -> ControllerConfig {
        self.engine.config().clone()
    }

    /// Snapshot of the user state that survives a restart.
    pub fn persisted_state(&self) -> PersistedState {
        let setpoint = self.engine.setpoint();
        PersistedState {
            powered: self.engine.is_powered(),
            humidity_target: setpoint.target(),
            saved_target: setpoint.saved(),
            preset: setpoint.preset(),
            mode: self.engine.mode(),
        }
    }

    // ── Internal ──────────────────────────────────────────────

    /// Run one decision cycle, apply the result, emit what changed.
    fn cycle(
        &mut self,
        now: Instant,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Decision {
        self.cycle_count += 1;
        let previous = *self.engine.last_decision();
        let previous_faults = self.engine.faults();
        let boost_before = self.engine.boost().is_active();

        let decision = self.engine.decide(now);

        if boost_before && !self.engine.boost().is_active() {
            self.helper.reset();
            sink.emit(&AppEvent::BoostEnded(BoostEnd::Expired));
        }
        for signal in Signal::ALL {
            let mask = fault_for(signal).mask();
            match (previous_faults & mask != 0, decision.faults & mask != 0) {
                (false, true) => sink.emit(&AppEvent::SensorStale(signal)),
                (true, false) => sink.emit(&AppEvent::SensorRecovered(signal)),
                _ => {}
            }
        }

        self.apply_actuators(&decision, now, hw);

        if decision.commands_differ(&previous) {
            sink.emit(&AppEvent::CommandsChanged {
                humidifier: decision.humidifier,
                ventilation: decision.ventilation,
                reason: decision.ventilation_reason,
            });
        }
        if decision.mode != previous.mode {
            sink.emit(&AppEvent::ModeChanged {
                from: previous.mode,
                to: decision.mode,
            });
            self.mark_state_dirty(now);
        }
        decision
    }

    fn apply_boost(
        &mut self,
        event: BoostEvent,
        now: Instant,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        match event {
            BoostEvent::Requested { duration } => {
                let until = self.engine.request_boost(duration, now)?;
                sink.emit(&AppEvent::BoostStarted { until });
            }
            BoostEvent::Stopped => {
                if self.engine.stop_boost() {
                    sink.emit(&AppEvent::BoostEnded(BoostEnd::Stopped));
                }
            }
        }
        Ok(())
    }

    fn emit_setpoint(&self, sink: &mut impl EventSink) {
        let setpoint = self.engine.setpoint();
        sink.emit(&AppEvent::SetpointChanged {
            target: setpoint.target(),
            preset: setpoint.preset(),
        });
    }

    /// Translate a decision into port calls.  Unchanged commands are only
    /// re-sent once the keep-alive interval has elapsed.
    fn apply_actuators(&mut self, decision: &Decision, now: Instant, hw: &mut impl ActuatorPort) {
        let config = self.engine.config();
        let keep_alive_due = match (config.keep_alive(), self.last_sent_at) {
            (Some(interval), Some(sent)) => now.saturating_duration_since(sent) >= interval,
            _ => false,
        };

        let mut sent = false;
        for (actuator, kind) in [
            (Actuator::Humidifier, &config.humidifier.kind),
            (Actuator::Ventilation, &config.ventilation.kind),
        ] {
            let cmd = decision.command(actuator);
            let unchanged = self.applied.is_some_and(|d| d.command(actuator) == cmd);
            if unchanged && !keep_alive_due {
                continue;
            }
            send_command(hw, actuator, kind, cmd);
            sent = true;
        }

        if sent {
            self.last_sent_at = Some(now);
        }
        self.applied = Some(*decision);
    }

    // ── State dirty-flag management ───────────────────────────

    /// Mark the user state as modified.
    pub fn mark_state_dirty(&mut self, now: Instant) {
        if !self.state_dirty {
            self.state_dirty = true;
            self.dirty_since = now;
        }
    }

    /// Save the state once it has been dirty for 5 seconds.
    /// Returns `true` if the state was saved.
    pub fn auto_save_if_needed(&mut self, storage: &mut impl StoragePort, now: Instant) -> bool {
        if !self.state_dirty {
            return false;
        }
        if now.saturating_duration_since(self.dirty_since) < AUTO_SAVE_DELAY {
            return false;
        }
        match self.persisted_state().save(storage) {
            Ok(()) => {
                self.state_dirty = false;
                info!("State auto-saved");
                true
            }
            Err(e) => {
                warn!("State auto-save failed: {}", e);
                false
            }
        }
    }

    /// Force-save if dirty (call before shutdown).
    pub fn force_save_if_dirty(&mut self, storage: &mut impl StoragePort) {
        if !self.state_dirty {
            return;
        }
        match self.persisted_state().save(storage) {
            Ok(()) => {
                self.state_dirty = false;
                info!("State force-saved before shutdown");
            }
            Err(e) => {
                warn!("State force-save failed: {}", e);
            }
        }
    }

    /// Whether the state has unsaved changes.
    pub fn is_state_dirty(&self) -> bool {
        self.state_dirty
    }
}

/// Issue the port calls for one actuator command.
///
/// A leveled slot without levels is driven as on/off.  A leveled slot
/// without power gating is turned "off" by selecting its lowest level.
fn send_command(
    hw: &mut impl ActuatorPort,
    actuator: Actuator,
    kind: &ActuatorKind,
    cmd: ActuatorCommand,
) {
    match kind {
        ActuatorKind::Absent => {}
        ActuatorKind::Binary => hw.set_state(actuator, cmd.is_active()),
        ActuatorKind::Leveled { power_gated, .. } if kind.is_misconfigured() => {
            if *power_gated {
                hw.set_power(actuator, cmd.is_active());
            } else {
                hw.set_state(actuator, cmd.is_active());
            }
        }
        ActuatorKind::Leveled { levels, power_gated } => {
            let level = match cmd {
                ActuatorCommand::Off => {
                    if *power_gated {
                        hw.set_power(actuator, false);
                        return;
                    }
                    levels.first()
                }
                ActuatorCommand::Level(index) => levels.get(index as usize),
                ActuatorCommand::On => levels.last(),
            };
            if *power_gated {
                hw.set_power(actuator, true);
            }
            match level {
                Some(level) => hw.set_level(actuator, level.as_str()),
                None => warn!("{} has no level for {}", actuator, cmd),
            }
        }
    }
}
