//! AppService integration tests: actuator port calls, events, commands.

use hygrostat::app::commands::AppCommand;
use hygrostat::app::events::AppEvent;
use hygrostat::app::service::AppService;
use hygrostat::config::{ActuatorSlot, ControllerConfig};
use hygrostat::control::setpoint::Preset;
use hygrostat::control::{Actuator, ActuatorCommand, OperatingMode};
use hygrostat::error::{Error, SafetyFault};
use hygrostat::sensors::Signal;
use hygrostat::time::Instant;

use crate::mock_hw::{started, ActuatorCall, MockActuators, RecordingSink};

fn at(secs: u64) -> Instant {
    Instant::from_secs(secs)
}

// ── Start-up ──────────────────────────────────────────────────

#[test]
fn start_drives_everything_off() {
    let mut app = AppService::new(ControllerConfig::default()).unwrap();
    let mut hw = MockActuators::new();
    let mut sink = RecordingSink::new();

    let decision = app.start(Instant::ZERO, &mut hw, &mut sink);

    assert_eq!(decision.humidifier, ActuatorCommand::Off);
    assert_eq!(decision.ventilation, ActuatorCommand::Off);
    assert_eq!(decision.mode, OperatingMode::Idle);
    assert_eq!(
        hw.calls,
        vec![
            ActuatorCall::SetPower { actuator: Actuator::Humidifier, on: false },
            ActuatorCall::SetLevel { actuator: Actuator::Ventilation, level: "0".into() },
        ],
        "power-gated humidifier is cut, non-gated fan drops to its lowest level"
    );
    assert_eq!(sink.events[0], AppEvent::Started(OperatingMode::Idle));
    assert!(sink.contains(&AppEvent::SensorStale(Signal::Humidity)));
    assert_eq!(app.cycle_count(), 1);
}

// ── Actuator port translation ─────────────────────────────────

#[test]
fn humidifier_level_is_powered_then_selected() {
    let (mut app, mut hw, mut sink) = started(ControllerConfig::default());

    let d = app.handle_reading(Signal::Humidity, 30.0, at(1), &mut hw, &mut sink);

    assert_eq!(d.humidifier, ActuatorCommand::Level(1));
    assert_eq!(
        hw.calls,
        vec![
            ActuatorCall::SetPower { actuator: Actuator::Humidifier, on: true },
            ActuatorCall::SetLevel { actuator: Actuator::Humidifier, level: "2".into() },
        ]
    );
    assert!(sink.contains(&AppEvent::SensorRecovered(Signal::Humidity)));
    assert!(sink.contains(&AppEvent::ModeChanged {
        from: OperatingMode::Idle,
        to: OperatingMode::Humidifying,
    }));
}

#[test]
fn unchanged_commands_are_not_resent() {
    let (mut app, mut hw, mut sink) = started(ControllerConfig::default());
    app.handle_reading(Signal::Humidity, 30.0, at(1), &mut hw, &mut sink);
    hw.clear();
    sink.clear();

    app.handle_reading(Signal::Humidity, 30.2, at(2), &mut hw, &mut sink);
    app.tick(at(3), &mut hw, &mut sink);

    assert!(hw.calls.is_empty(), "no port calls expected, got {:?}", hw.calls);
    assert!(!sink
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::CommandsChanged { .. })));
}

#[test]
fn keep_alive_resends_current_commands() {
    let config = ControllerConfig {
        keep_alive_secs: Some(60),
        ..Default::default()
    };
    let (mut app, mut hw, mut sink) = started(config);
    app.handle_reading(Signal::Humidity, 30.0, at(1), &mut hw, &mut sink);
    hw.clear();

    app.tick(at(30), &mut hw, &mut sink);
    assert!(hw.calls.is_empty(), "keep-alive not yet due");

    app.tick(at(61), &mut hw, &mut sink);
    assert_eq!(
        hw.calls,
        vec![
            ActuatorCall::SetPower { actuator: Actuator::Humidifier, on: true },
            ActuatorCall::SetLevel { actuator: Actuator::Humidifier, level: "2".into() },
            ActuatorCall::SetLevel { actuator: Actuator::Ventilation, level: "0".into() },
        ]
    );
}

#[test]
fn binary_ventilation_uses_set_state() {
    let config = ControllerConfig {
        ventilation: ActuatorSlot::binary(),
        ..Default::default()
    };
    let (mut app, mut hw, mut sink) = started(config);
    app.handle_reading(Signal::Humidity, 45.0, at(1), &mut hw, &mut sink);
    hw.clear();

    let d = app.handle_reading(Signal::Co2, 1500.0, at(1), &mut hw, &mut sink);

    assert_eq!(d.ventilation, ActuatorCommand::On);
    assert_eq!(d.mode, OperatingMode::Ventilating);
    assert_eq!(
        hw.calls,
        vec![ActuatorCall::SetState { actuator: Actuator::Ventilation, on: true }]
    );
}

#[test]
fn absent_humidifier_is_never_driven() {
    let config = ControllerConfig {
        humidifier: ActuatorSlot::absent(),
        ..Default::default()
    };
    let (mut app, mut hw, mut sink) = started(config);

    let d = app.handle_reading(Signal::Humidity, 20.0, at(1), &mut hw, &mut sink);

    assert_eq!(d.humidifier, ActuatorCommand::Off);
    assert!(hw
        .calls
        .iter()
        .all(|c| !matches!(c, ActuatorCall::SetPower { actuator: Actuator::Humidifier, .. }
            | ActuatorCall::SetLevel { actuator: Actuator::Humidifier, .. }
            | ActuatorCall::SetState { actuator: Actuator::Humidifier, .. })));
}

#[test]
fn leveled_slot_without_levels_degrades_to_on_off() {
    let config = ControllerConfig {
        humidifier: ActuatorSlot::leveled(&[], true),
        ..Default::default()
    };
    let (mut app, mut hw, mut sink) = started(config);

    let d = app.handle_reading(Signal::Humidity, 30.0, at(1), &mut hw, &mut sink);

    assert_eq!(d.humidifier, ActuatorCommand::On);
    assert_eq!(
        hw.calls,
        vec![ActuatorCall::SetPower { actuator: Actuator::Humidifier, on: true }]
    );
}

// ── Readings & staleness ──────────────────────────────────────

#[test]
fn rejected_reading_fails_safe() {
    let (mut app, mut hw, mut sink) = started(ControllerConfig::default());
    app.handle_reading(Signal::Humidity, 30.0, at(1), &mut hw, &mut sink);
    hw.clear();
    sink.clear();

    let d = app.handle_reading(Signal::Humidity, f32::NAN, at(2), &mut hw, &mut sink);

    assert!(sink.events.iter().any(|e| matches!(
        e,
        AppEvent::ReadingRejected { signal: Signal::Humidity, .. }
    )));
    assert!(sink.contains(&AppEvent::SensorStale(Signal::Humidity)));
    assert_eq!(d.mode, OperatingMode::Idle);
    assert_eq!(
        hw.calls,
        vec![ActuatorCall::SetPower { actuator: Actuator::Humidifier, on: false }],
        "fail-safe off bypasses the humidifier dwell"
    );
}

#[test]
fn humidity_ageing_out_turns_everything_off() {
    let (mut app, mut hw, mut sink) = started(ControllerConfig::default());
    app.handle_reading(Signal::Humidity, 30.0, at(1), &mut hw, &mut sink);

    let d = app.tick(at(901), &mut hw, &mut sink);
    assert_eq!(d.humidifier, ActuatorCommand::Level(1), "900 s old is still fresh");

    let d = app.tick(at(902), &mut hw, &mut sink);
    assert_eq!(d.humidifier, ActuatorCommand::Off);
    assert_eq!(d.mode, OperatingMode::Idle);
    assert_ne!(app.fault_flags() & SafetyFault::HumidityStale.mask(), 0);
}

// ── Power ─────────────────────────────────────────────────────

#[test]
fn power_off_then_on() {
    let (mut app, mut hw, mut sink) = started(ControllerConfig::default());
    app.handle_reading(Signal::Humidity, 30.0, at(1), &mut hw, &mut sink);
    hw.clear();

    app.handle_command(AppCommand::TurnOff, at(10), &mut hw, &mut sink)
        .unwrap();
    assert!(sink.contains(&AppEvent::PowerChanged(false)));
    assert_eq!(app.last_decision().humidifier, ActuatorCommand::Off);
    assert_eq!(
        app.mode(),
        OperatingMode::Humidifying,
        "mode is kept while powered off"
    );
    assert_eq!(
        hw.calls,
        vec![ActuatorCall::SetPower { actuator: Actuator::Humidifier, on: false }]
    );

    // Still powered off: readings do not switch anything on.
    app.handle_reading(Signal::Humidity, 28.0, at(20), &mut hw, &mut sink);
    assert_eq!(app.last_decision().humidifier, ActuatorCommand::Off);

    // Power-on releases the dwell gate, so the humidifier returns at once.
    app.handle_command(AppCommand::TurnOn, at(30), &mut hw, &mut sink)
        .unwrap();
    assert!(sink.contains(&AppEvent::PowerChanged(true)));
    assert!(app.last_decision().humidifier.is_active());
}

#[test]
fn repeated_power_command_is_silent() {
    let (mut app, mut hw, mut sink) = started(ControllerConfig::default());
    app.handle_command(AppCommand::TurnOn, at(1), &mut hw, &mut sink)
        .unwrap();
    assert!(!sink
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::PowerChanged(_))));
    assert!(!app.is_state_dirty());
}

// ── Setpoint commands ─────────────────────────────────────────

#[test]
fn target_change_moves_the_band() {
    let (mut app, mut hw, mut sink) = started(ControllerConfig::default());
    let d = app.handle_reading(Signal::Humidity, 42.0, at(1), &mut hw, &mut sink);
    assert_eq!(d.mode, OperatingMode::Idle);

    app.handle_command(AppCommand::SetHumidityTarget(50.0), at(2), &mut hw, &mut sink)
        .unwrap();

    assert!(sink.contains(&AppEvent::SetpointChanged {
        target: 50.0,
        preset: Preset::Normal,
    }));
    // Band now starts at 47: (47 - 42) / (47 - 25) rounds to the first level.
    assert_eq!(app.last_decision().humidifier, ActuatorCommand::Level(0));
    assert_eq!(hw.level(Actuator::Humidifier), Some("1"));
    assert_eq!(app.mode(), OperatingMode::Humidifying);
}

#[test]
fn low_target_never_dehumidifies_critically_dry_air() {
    let config = ControllerConfig {
        ventilation: ActuatorSlot::binary(),
        ..Default::default()
    };
    let (mut app, mut hw, mut sink) = started(config);
    app.handle_command(AppCommand::SetHumidityTarget(30.0), at(1), &mut hw, &mut sink)
        .unwrap();

    // 34 % is above the derived threshold of 33 but below the 35 % floor.
    let d = app.handle_reading(Signal::Humidity, 34.0, at(2), &mut hw, &mut sink);

    assert_eq!(d.ventilation, ActuatorCommand::Off);
    assert_ne!(d.mode, OperatingMode::Dehumidifying);
    assert_ne!(hw.is_on(Actuator::Ventilation), Some(true));
}

#[test]
fn target_is_clamped() {
    let (mut app, mut hw, mut sink) = started(ControllerConfig::default());
    app.handle_command(AppCommand::SetHumidityTarget(95.0), at(1), &mut hw, &mut sink)
        .unwrap();
    assert_eq!(app.engine().setpoint().target(), 60.0);
}

#[test]
fn invalid_target_is_rejected() {
    let (mut app, mut hw, mut sink) = started(ControllerConfig::default());
    let cycles = app.cycle_count();

    let result = app.handle_command(
        AppCommand::SetHumidityTarget(f32::NAN),
        at(1),
        &mut hw,
        &mut sink,
    );

    assert_eq!(result, Err(Error::InvalidTarget));
    assert_eq!(app.engine().setpoint().target(), 43.0);
    assert_eq!(app.cycle_count(), cycles, "rejected command skips the cycle");
    assert!(sink.events.is_empty());
}

#[test]
fn away_preset_requires_configuration() {
    let (mut app, mut hw, mut sink) = started(ControllerConfig::default());
    let result = app.handle_command(AppCommand::SetPreset(Preset::Away), at(1), &mut hw, &mut sink);
    assert_eq!(result, Err(Error::PresetUnavailable));
    assert_eq!(app.engine().setpoint().preset(), Preset::Normal);
}

#[test]
fn away_preset_round_trip() {
    let mut config = ControllerConfig::default();
    config.humidity.away_target = Some(35.0);
    let (mut app, mut hw, mut sink) = started(config);

    app.handle_command(AppCommand::SetPreset(Preset::Away), at(1), &mut hw, &mut sink)
        .unwrap();
    assert_eq!(app.engine().setpoint().target(), 35.0);
    assert!(sink.contains(&AppEvent::SetpointChanged {
        target: 35.0,
        preset: Preset::Away,
    }));

    app.handle_command(AppCommand::SetPreset(Preset::Normal), at(2), &mut hw, &mut sink)
        .unwrap();
    assert_eq!(app.engine().setpoint().target(), 43.0);
}

// ── Telemetry ─────────────────────────────────────────────────

#[test]
fn telemetry_on_interval() {
    let (mut app, mut hw, mut sink) = started(ControllerConfig::default());
    app.handle_reading(Signal::Humidity, 30.0, at(1), &mut hw, &mut sink);
    app.handle_reading(Signal::Co2, 650.0, at(1), &mut hw, &mut sink);
    sink.clear();

    app.tick(at(30), &mut hw, &mut sink);
    assert!(!sink.events.iter().any(|e| matches!(e, AppEvent::Telemetry(_))));

    app.tick(at(60), &mut hw, &mut sink);
    let telemetry = sink
        .events
        .iter()
        .find_map(|e| match e {
            AppEvent::Telemetry(t) => Some(t.clone()),
            _ => None,
        })
        .expect("telemetry due at 60 s");
    assert_eq!(telemetry.mode, OperatingMode::Humidifying);
    assert_eq!(telemetry.humidity, Some(30.0));
    assert_eq!(telemetry.co2, Some(650.0));
    assert_eq!(telemetry.voc, None);
    assert_eq!(telemetry.humidifier, ActuatorCommand::Level(1));
    assert_eq!(telemetry.boost_remaining_secs, None);
    assert_eq!(telemetry.fault_flags, 0);
}

// ── Queue dispatch ────────────────────────────────────────────

#[test]
fn dispatch_routes_queued_events() {
    use hygrostat::events::{ControlEvent, EventQueue};

    let (mut app, mut hw, mut sink) = started(ControllerConfig::default());
    let queue = EventQueue::new();
    assert!(queue.push(ControlEvent::Reading {
        signal: Signal::Humidity,
        value: 30.0,
        at: at(1),
    }));
    assert!(queue.push(ControlEvent::Command {
        cmd: AppCommand::SetHumidityTarget(f32::NAN),
        at: at(2),
    }));
    assert!(queue.push(ControlEvent::Tick { at: at(3) }));

    let mut errors = 0;
    queue.drain(|event| {
        if app.dispatch(event, &mut hw, &mut sink).is_err() {
            errors += 1;
        }
    });

    assert_eq!(errors, 1);
    assert!(queue.is_empty());
    assert_eq!(app.mode(), OperatingMode::Humidifying);
}
