//! Fuzz target: `DecisionEngine::decide`
//!
//! Interprets the input as a stream of 5-byte operations (opcode plus a
//! little-endian `f32`) and runs a decision after each one, with time
//! advancing by the opcode's upper bits.  Asserts the fail-safe and power
//! invariants on every cycle.
//!
//! cargo fuzz run fuzz_decision

#![no_main]

use core::time::Duration;

use hygrostat::config::ControllerConfig;
use hygrostat::control::engine::DecisionEngine;
use hygrostat::control::setpoint::Preset;
use hygrostat::control::ActuatorCommand;
use hygrostat::error::SafetyFault;
use hygrostat::sensors::Signal;
use hygrostat::time::Instant;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut config = ControllerConfig::default();
    config.humidity.away_target = Some(35.0);
    let mut engine = DecisionEngine::new(config);
    let mut now = Instant::ZERO;

    for op in data.chunks_exact(5) {
        let value = f32::from_le_bytes([op[1], op[2], op[3], op[4]]);
        now = now + Duration::from_secs(u64::from(op[0] >> 3) * 10);

        match op[0] & 0x07 {
            0 => {
                engine.record_reading(Signal::Humidity, value, now);
            }
            1 => {
                engine.record_reading(Signal::Co2, value, now);
            }
            2 => {
                engine.record_reading(Signal::Voc, value, now);
            }
            3 => {
                let _ = engine.set_humidity_target(value);
            }
            4 => {
                let secs = u64::from(op[1]) * 30;
                let _ = engine.request_boost(Duration::from_secs(secs), now);
            }
            5 => {
                engine.stop_boost();
            }
            6 => {
                engine.set_powered(op[1] & 1 == 1);
            }
            _ => {
                let preset = if op[1] & 1 == 1 { Preset::Away } else { Preset::Normal };
                let _ = engine.set_preset(preset);
            }
        }

        let d = engine.decide(now);
        let humidity_stale = d.faults & SafetyFault::HumidityStale.mask() != 0;
        if !engine.is_powered() || humidity_stale {
            assert_eq!(d.humidifier, ActuatorCommand::Off);
            assert_eq!(d.ventilation, ActuatorCommand::Off);
        }
        assert_eq!(d.boost_until.is_some(), engine.boost().is_active());
        assert!(engine.setpoint().target().is_finite());
    }
});
