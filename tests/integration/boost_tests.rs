//! Boost: service calls, helper switch edges, expiry and overrides.

use core::time::Duration;

use hygrostat::app::commands::AppCommand;
use hygrostat::app::events::{AppEvent, BoostEnd};
use hygrostat::config::{ActuatorSlot, ControllerConfig};
use hygrostat::control::{Actuator, ActuatorCommand, OperatingMode, VentilationReason};
use hygrostat::error::Error;
use hygrostat::sensors::Signal;
use hygrostat::time::Instant;

use crate::mock_hw::started;

fn at(secs: u64) -> Instant {
    Instant::from_secs(secs)
}

fn boost(secs: u64) -> AppCommand {
    AppCommand::Boost {
        duration: Some(Duration::from_secs(secs)),
    }
}

// ── Service boost ─────────────────────────────────────────────

#[test]
fn two_minute_boost_reverts_on_time() {
    let mut config = ControllerConfig::default();
    config.co2 = Some(hygrostat::config::AirQualityThresholds {
        target: 600.0,
        critical: 900.0,
    });
    let (mut app, mut hw, mut sink) = started(config);
    app.handle_reading(Signal::Humidity, 45.0, at(0), &mut hw, &mut sink);
    app.handle_reading(Signal::Co2, 750.0, at(0), &mut hw, &mut sink);
    assert_eq!(app.last_decision().ventilation, ActuatorCommand::Level(2));

    app.handle_command(boost(120), at(0), &mut hw, &mut sink)
        .unwrap();
    assert!(sink.contains(&AppEvent::BoostStarted { until: at(120) }));
    assert_eq!(app.last_decision().ventilation, ActuatorCommand::Level(4));
    assert_eq!(app.mode(), OperatingMode::Boost);
    assert_eq!(hw.level(Actuator::Ventilation), Some("4"));

    for t in [1, 60, 119] {
        let d = app.tick(at(t), &mut hw, &mut sink);
        assert_eq!(d.ventilation, ActuatorCommand::Level(4), "boost still active at {t} s");
        assert_eq!(d.ventilation_reason, VentilationReason::Boost);
        assert_eq!(d.boost_until, Some(at(120)));
    }

    let d = app.tick(at(120), &mut hw, &mut sink);
    assert_eq!(d.ventilation, ActuatorCommand::Level(2));
    assert_eq!(d.ventilation_reason, VentilationReason::Co2);
    assert_eq!(d.mode, OperatingMode::Ventilating);
    assert_eq!(d.boost_until, None);
    assert!(sink.contains(&AppEvent::BoostEnded(BoostEnd::Expired)));
    assert_eq!(hw.level(Actuator::Ventilation), Some("2"));
}

#[test]
fn new_request_replaces_window() {
    let (mut app, mut hw, mut sink) = started(ControllerConfig::default());
    app.handle_reading(Signal::Humidity, 45.0, at(0), &mut hw, &mut sink);

    app.handle_command(boost(1800), at(0), &mut hw, &mut sink)
        .unwrap();
    app.handle_command(boost(60), at(10), &mut hw, &mut sink)
        .unwrap();

    assert_eq!(app.engine().boost().until(), Some(at(70)));
    let d = app.tick(at(70), &mut hw, &mut sink);
    assert_eq!(d.mode, OperatingMode::Idle);
}

#[test]
fn default_duration_when_omitted() {
    let (mut app, mut hw, mut sink) = started(ControllerConfig::default());
    app.handle_command(AppCommand::Boost { duration: None }, at(5), &mut hw, &mut sink)
        .unwrap();
    assert!(sink.contains(&AppEvent::BoostStarted { until: at(905) }));
}

#[test]
fn out_of_range_duration_is_rejected() {
    let (mut app, mut hw, mut sink) = started(ControllerConfig::default());

    for secs in [30, 3601] {
        let result = app.handle_command(boost(secs), at(1), &mut hw, &mut sink);
        assert_eq!(result, Err(Error::InvalidDuration { secs }));
    }
    assert!(!app.engine().boost().is_active());
    assert!(sink.events.is_empty());
}

#[test]
fn boost_requires_ventilation() {
    let config = ControllerConfig {
        ventilation: ActuatorSlot::absent(),
        ..Default::default()
    };
    let (mut app, mut hw, mut sink) = started(config);
    assert_eq!(
        app.handle_command(boost(120), at(1), &mut hw, &mut sink),
        Err(Error::NoVentilation)
    );
}

#[test]
fn stop_reverts_immediately() {
    let (mut app, mut hw, mut sink) = started(ControllerConfig::default());
    app.handle_reading(Signal::Humidity, 45.0, at(0), &mut hw, &mut sink);
    app.handle_command(boost(600), at(0), &mut hw, &mut sink)
        .unwrap();
    assert_eq!(hw.level(Actuator::Ventilation), Some("4"));

    app.handle_command(AppCommand::StopBoost, at(10), &mut hw, &mut sink)
        .unwrap();

    assert!(sink.contains(&AppEvent::BoostEnded(BoostEnd::Stopped)));
    assert_eq!(app.last_decision().ventilation, ActuatorCommand::Off, "stop bypasses the dwell");
    assert_eq!(app.last_decision().ventilation_reason, VentilationReason::None);
    assert_eq!(hw.level(Actuator::Ventilation), Some("0"));
}

#[test]
fn stop_without_boost_is_silent() {
    let (mut app, mut hw, mut sink) = started(ControllerConfig::default());
    app.handle_command(AppCommand::StopBoost, at(1), &mut hw, &mut sink)
        .unwrap();
    assert!(!sink
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::BoostEnded(_))));
}

// ── Overrides ─────────────────────────────────────────────────

#[test]
fn boost_ignores_protective_cap() {
    let (mut app, mut hw, mut sink) = started(ControllerConfig::default());
    app.handle_reading(Signal::Humidity, 20.0, at(0), &mut hw, &mut sink);
    app.handle_command(boost(120), at(0), &mut hw, &mut sink)
        .unwrap();
    assert_eq!(app.last_decision().ventilation, ActuatorCommand::Level(4));
}

#[test]
fn stale_humidity_suppresses_boost() {
    let (mut app, mut hw, mut sink) = started(ControllerConfig::default());
    app.handle_command(boost(300), at(0), &mut hw, &mut sink)
        .unwrap();
    let d = app.last_decision();
    assert_eq!(d.ventilation, ActuatorCommand::Off);
    assert_eq!(d.mode, OperatingMode::Idle);

    let d = app.handle_reading(Signal::Humidity, 45.0, at(10), &mut hw, &mut sink);
    assert_eq!(d.ventilation, ActuatorCommand::Level(4));
    assert_eq!(d.mode, OperatingMode::Boost);
}

#[test]
fn telemetry_reports_remaining_boost() {
    let (mut app, mut hw, mut sink) = started(ControllerConfig::default());
    app.handle_reading(Signal::Humidity, 45.0, at(0), &mut hw, &mut sink);
    app.handle_command(boost(120), at(0), &mut hw, &mut sink)
        .unwrap();
    assert_eq!(app.build_telemetry(at(60)).boost_remaining_secs, Some(60));
}

// ── Helper switch ─────────────────────────────────────────────

#[test]
fn helper_edges_start_and_stop() {
    let (mut app, mut hw, mut sink) = started(ControllerConfig::default());
    app.handle_reading(Signal::Humidity, 45.0, at(0), &mut hw, &mut sink);

    app.handle_command(AppCommand::BoostHelper(true), at(1), &mut hw, &mut sink)
        .unwrap();
    assert!(sink.contains(&AppEvent::BoostStarted { until: at(901) }));
    sink.clear();

    app.handle_command(AppCommand::BoostHelper(true), at(2), &mut hw, &mut sink)
        .unwrap();
    assert!(
        !sink.events.iter().any(|e| matches!(e, AppEvent::BoostStarted { .. })),
        "level without edge does nothing"
    );

    app.handle_command(AppCommand::BoostHelper(false), at(3), &mut hw, &mut sink)
        .unwrap();
    assert!(sink.contains(&AppEvent::BoostEnded(BoostEnd::Stopped)));
    assert!(!app.engine().boost().is_active());
}

#[test]
fn helper_rearms_after_expiry() {
    let config = ControllerConfig {
        boost_default_secs: 60,
        ..Default::default()
    };
    let (mut app, mut hw, mut sink) = started(config);
    app.handle_reading(Signal::Humidity, 45.0, at(0), &mut hw, &mut sink);

    app.handle_command(AppCommand::BoostHelper(true), at(0), &mut hw, &mut sink)
        .unwrap();
    app.tick(at(60), &mut hw, &mut sink);
    assert!(sink.contains(&AppEvent::BoostEnded(BoostEnd::Expired)));
    sink.clear();

    app.handle_command(AppCommand::BoostHelper(true), at(70), &mut hw, &mut sink)
        .unwrap();
    assert!(sink.contains(&AppEvent::BoostStarted { until: at(130) }));
}
