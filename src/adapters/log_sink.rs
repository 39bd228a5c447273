//! Log-based adapters.
//!
//! [`LogEventSink`] implements [`EventSink`] by writing structured
//! application events to the logger.  [`LogActuators`] implements
//! [`ActuatorPort`] by logging every command, which is all the simulator
//! needs.  An MQTT or GPIO adapter would implement the same traits.

use log::info;

use crate::app::events::{AppEvent, BoostEnd};
use crate::app::ports::{ActuatorPort, EventSink};
use crate::control::Actuator;

/// Adapter that logs every [`AppEvent`].
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

fn fmt_reading(value: Option<f32>) -> String {
    value.map_or_else(|| "--".to_string(), |v| format!("{v:.1}"))
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | mode={} power={} | RH={}% (target {:.1}, {}) CO2={}ppm VOC={} | \
                     humidifier={} ventilation={} ({:?}) | boost={} | faults=0b{:08b}",
                    t.mode,
                    if t.powered { "on" } else { "off" },
                    fmt_reading(t.humidity),
                    t.target,
                    t.preset.as_str(),
                    fmt_reading(t.co2),
                    fmt_reading(t.voc),
                    t.humidifier,
                    t.ventilation,
                    t.ventilation_reason,
                    t.boost_remaining_secs
                        .map_or_else(|| "off".to_string(), |s| format!("{s}s")),
                    t.fault_flags,
                );
            }
            AppEvent::ModeChanged { from, to } => {
                info!("MODE | {} -> {}", from, to);
            }
            AppEvent::CommandsChanged {
                humidifier,
                ventilation,
                reason,
            } => {
                info!(
                    "CMD | humidifier={} ventilation={} reason={:?}",
                    humidifier, ventilation, reason
                );
            }
            AppEvent::SensorStale(signal) => {
                info!("SENSOR | {} stale", signal);
            }
            AppEvent::SensorRecovered(signal) => {
                info!("SENSOR | {} recovered", signal);
            }
            AppEvent::ReadingRejected { signal, value } => {
                info!("SENSOR | {} reading {} rejected", signal, value);
            }
            AppEvent::BoostStarted { until } => {
                info!("BOOST | active until {}", until);
            }
            AppEvent::BoostEnded(end) => {
                let why = match end {
                    BoostEnd::Expired => "expired",
                    BoostEnd::Stopped => "stopped",
                };
                info!("BOOST | {}", why);
            }
            AppEvent::PowerChanged(on) => {
                info!("POWER | {}", if *on { "on" } else { "off" });
            }
            AppEvent::SetpointChanged { target, preset } => {
                info!("SETPOINT | target={:.1} preset={}", target, preset.as_str());
            }
            AppEvent::Started(mode) => {
                info!("START | initial_mode={}", mode);
            }
        }
    }
}

/// Actuator adapter that only logs the commands it receives.
#[derive(Default)]
pub struct LogActuators;

impl LogActuators {
    pub fn new() -> Self {
        Self
    }
}

impl ActuatorPort for LogActuators {
    fn set_state(&mut self, actuator: Actuator, on: bool) {
        info!("ACT | {} {}", actuator, if on { "on" } else { "off" });
    }

    fn set_level(&mut self, actuator: Actuator, level: &str) {
        info!("ACT | {} level={}", actuator, level);
    }

    fn set_power(&mut self, actuator: Actuator, on: bool) {
        info!("ACT | {} power {}", actuator, if on { "on" } else { "off" });
    }
}
