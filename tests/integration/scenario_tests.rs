//! End-to-end control scenarios on a five-level fan and a three-level
//! power-gated humidifier.

use core::time::Duration;

use hygrostat::adapters::time::ManualClock;
use hygrostat::app::ports::TimePort;
use hygrostat::app::service::AppService;
use hygrostat::config::{AirQualityThresholds, ControllerConfig};
use hygrostat::control::{Actuator, ActuatorCommand, OperatingMode, VentilationReason};
use hygrostat::sensors::Signal;
use hygrostat::time::Instant;

use crate::mock_hw::{started, MockActuators, RecordingSink};

fn at(secs: u64) -> Instant {
    Instant::from_secs(secs)
}

/// CO2 band 600..900 ppm, dehumidifying above 48 %RH.
fn config() -> ControllerConfig {
    let mut config = ControllerConfig {
        co2: Some(AirQualityThresholds {
            target: 600.0,
            critical: 900.0,
        }),
        ..Default::default()
    };
    config.humidity.dehumidify_threshold = Some(48.0);
    config
}

fn feed(
    app: &mut AppService,
    hw: &mut MockActuators,
    sink: &mut RecordingSink,
    rh: f32,
    co2: f32,
    when: Instant,
) {
    app.handle_reading(Signal::Humidity, rh, when, hw, sink);
    app.handle_reading(Signal::Co2, co2, when, hw, sink);
}

// ── Regulation ────────────────────────────────────────────────

#[test]
fn dry_room_humidifies_at_middle_level() {
    let (mut app, mut hw, mut sink) = started(config());
    feed(&mut app, &mut hw, &mut sink, 30.0, 600.0, at(0));

    let d = app.last_decision();
    assert_eq!(d.humidifier, ActuatorCommand::Level(1));
    assert_eq!(d.ventilation, ActuatorCommand::Off);
    assert_eq!(d.mode, OperatingMode::Humidifying);
    assert_eq!(hw.level(Actuator::Humidifier), Some("2"));
    assert_eq!(hw.is_on(Actuator::Humidifier), Some(true));
}

#[test]
fn critical_co2_runs_fan_at_top_level() {
    let (mut app, mut hw, mut sink) = started(config());
    feed(&mut app, &mut hw, &mut sink, 50.0, 950.0, at(0));

    let d = app.last_decision();
    assert_eq!(d.ventilation, ActuatorCommand::Level(4));
    assert_eq!(d.ventilation_reason, VentilationReason::Co2);
    assert_eq!(d.humidifier, ActuatorCommand::Off);
    assert_eq!(d.mode, OperatingMode::Ventilating);
    assert_eq!(hw.level(Actuator::Ventilation), Some("4"));
}

#[test]
fn humid_room_dehumidifies_proportionally() {
    let (mut app, mut hw, mut sink) = started(config());
    feed(&mut app, &mut hw, &mut sink, 60.0, 600.0, at(0));

    // (60 - 48) / (65 - 48) of four steps rounds to level 3.
    let d = app.last_decision();
    assert_eq!(d.ventilation, ActuatorCommand::Level(3));
    assert_eq!(d.ventilation_reason, VentilationReason::Humidity);
    assert_eq!(d.mode, OperatingMode::Dehumidifying);
}

#[test]
fn equal_demand_credits_humidity() {
    let (mut app, mut hw, mut sink) = started(config());
    feed(&mut app, &mut hw, &mut sink, 66.0, 950.0, at(0));

    let d = app.last_decision();
    assert_eq!(d.ventilation, ActuatorCommand::Level(4));
    assert_eq!(d.ventilation_reason, VentilationReason::Humidity);
}

#[test]
fn critically_dry_caps_ventilation() {
    let (mut app, mut hw, mut sink) = started(config());
    feed(&mut app, &mut hw, &mut sink, 20.0, 950.0, at(0));

    let d = app.last_decision();
    assert_eq!(d.ventilation, ActuatorCommand::Level(2), "capped at the protective level");
    assert_eq!(d.humidifier, ActuatorCommand::Level(2), "below the floor runs flat out");
    assert_eq!(d.mode, OperatingMode::VentilatingAndHumidifying);
    assert_eq!(hw.level(Actuator::Ventilation), Some("2"));
}

// ── Fail-safe ─────────────────────────────────────────────────

#[test]
fn stale_humidity_overrides_critical_co2() {
    let (mut app, mut hw, mut sink) = started(config());
    feed(&mut app, &mut hw, &mut sink, 50.0, 950.0, at(1000));
    assert_eq!(app.last_decision().ventilation, ActuatorCommand::Level(4));

    app.handle_reading(Signal::Co2, 950.0, at(2000), &mut hw, &mut sink);
    let d = app.tick(at(2000), &mut hw, &mut sink);

    assert_eq!(d.humidifier, ActuatorCommand::Off);
    assert_eq!(d.ventilation, ActuatorCommand::Off);
    assert_eq!(d.mode, OperatingMode::Idle);
    assert_eq!(hw.level(Actuator::Ventilation), Some("0"));
}

#[test]
fn stale_co2_only_drops_its_intent() {
    let (mut app, mut hw, mut sink) = started(config());
    feed(&mut app, &mut hw, &mut sink, 45.0, 950.0, at(0));
    assert_eq!(app.last_decision().ventilation, ActuatorCommand::Level(4));

    app.handle_reading(Signal::Humidity, 45.0, at(901), &mut hw, &mut sink);
    let d = app.tick(at(901), &mut hw, &mut sink);

    assert_eq!(d.ventilation, ActuatorCommand::Off);
    assert_eq!(d.mode, OperatingMode::Idle);
    assert_ne!(d.faults, 0);
}

// ── Dwell ─────────────────────────────────────────────────────

#[test]
fn fan_holds_through_dwell_window() {
    let (mut app, mut hw, mut sink) = started(config());
    let clock = ManualClock::new(Instant::ZERO);
    feed(&mut app, &mut hw, &mut sink, 45.0, 950.0, clock.now());
    assert_eq!(app.last_decision().ventilation, ActuatorCommand::Level(4));
    hw.clear();

    clock.advance(Duration::from_secs(60));
    app.handle_reading(Signal::Co2, 500.0, clock.now(), &mut hw, &mut sink);
    let d = app.last_decision();
    assert_eq!(d.ventilation, ActuatorCommand::Level(4), "held by the 120 s dwell");
    assert_eq!(d.ventilation_reason, VentilationReason::Co2);
    assert_eq!(
        app.engine().dwell_remaining(Actuator::Ventilation, clock.now()),
        Some(Duration::from_secs(60))
    );
    assert!(hw.calls.is_empty());

    // A late timestamp from another source cannot rewind the timeline.
    clock.set(at(30));
    assert_eq!(clock.now(), at(60));

    clock.set(at(120));
    let d = app.tick(clock.now(), &mut hw, &mut sink);
    assert_eq!(d.ventilation, ActuatorCommand::Off);
    assert_eq!(d.mode, OperatingMode::Idle);
    assert_eq!(hw.level(Actuator::Ventilation), Some("0"));
}

#[test]
fn humidifier_dwell_is_independent() {
    let (mut app, mut hw, mut sink) = started(config());
    feed(&mut app, &mut hw, &mut sink, 30.0, 600.0, at(0));
    assert_eq!(app.last_decision().humidifier, ActuatorCommand::Level(1));

    // Air quality worsens: the fan may start, the humidifier stays put.
    app.handle_reading(Signal::Humidity, 41.0, at(10), &mut hw, &mut sink);
    app.handle_reading(Signal::Co2, 950.0, at(10), &mut hw, &mut sink);
    let d = app.last_decision();
    assert_eq!(d.humidifier, ActuatorCommand::Level(1), "300 s humidifier dwell");
    assert_eq!(d.ventilation, ActuatorCommand::Level(4));
    assert_eq!(d.mode, OperatingMode::VentilatingAndHumidifying);

    let d = app.tick(at(300), &mut hw, &mut sink);
    assert_eq!(d.humidifier, ActuatorCommand::Off);
    assert_eq!(d.mode, OperatingMode::Ventilating);
}
