//! Fuzz target: script lines through the full service
//!
//! Splits arbitrary text into lines, parses each one and dispatches the
//! resulting events.  Neither the parser nor the service may panic, and a
//! stale humidity signal must always leave both actuators off.
//!
//! cargo fuzz run fuzz_script_line

#![no_main]

use hygrostat::adapters::script;
use hygrostat::app::events::AppEvent;
use hygrostat::app::ports::{ActuatorPort, EventSink};
use hygrostat::app::service::AppService;
use hygrostat::config::ControllerConfig;
use hygrostat::control::{Actuator, ActuatorCommand};
use hygrostat::error::SafetyFault;
use hygrostat::time::Instant;
use libfuzzer_sys::fuzz_target;

struct Null;

impl ActuatorPort for Null {
    fn set_state(&mut self, _: Actuator, _: bool) {}
    fn set_level(&mut self, _: Actuator, _: &str) {}
    fn set_power(&mut self, _: Actuator, _: bool) {}
}

impl EventSink for Null {
    fn emit(&mut self, _: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    let Ok(mut app) = AppService::new(ControllerConfig::default()) else {
        return;
    };
    let (mut hw, mut sink) = (Null, Null);
    app.start(Instant::ZERO, &mut hw, &mut sink);

    for line in text.lines() {
        let Ok(Some(event)) = script::parse_line(line, Instant::ZERO) else {
            continue;
        };
        let _ = app.dispatch(event, &mut hw, &mut sink);

        let d = app.last_decision();
        if d.faults & SafetyFault::HumidityStale.mask() != 0 {
            assert_eq!(d.humidifier, ActuatorCommand::Off);
            assert_eq!(d.ventilation, ActuatorCommand::Off);
        }
    }
});
