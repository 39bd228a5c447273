//! Line-oriented event script, used by the simulator.
//!
//! ```text
//! # comment
//! 0     humidity 30.5
//! 0     co2 950
//! 12.5  tick
//! 20    boost 120        # seconds, default when omitted
//! 30    stop
//! 40    helper on|off
//! 50    target 45
//! 55    preset away|normal
//! 60    on | off | save
//! ```
//!
//! The leading number is the event time in seconds; when it is missing the
//! caller's clock supplies it.

use core::fmt;
use core::time::Duration;

use crate::app::commands::AppCommand;
use crate::control::setpoint::Preset;
use crate::events::ControlEvent;
use crate::sensors::Signal;
use crate::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptError {
    /// First word is neither a number nor a known verb.
    UnknownVerb,
    /// Verb needs an argument that is not there.
    MissingArgument,
    /// Argument could not be parsed.
    BadArgument,
    /// Timestamp is negative or not finite.
    BadTimestamp,
    /// Extra words after a complete command.
    TrailingInput,
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownVerb => write!(f, "unknown verb"),
            Self::MissingArgument => write!(f, "missing argument"),
            Self::BadArgument => write!(f, "bad argument"),
            Self::BadTimestamp => write!(f, "bad timestamp"),
            Self::TrailingInput => write!(f, "unexpected trailing input"),
        }
    }
}

impl core::error::Error for ScriptError {}

fn parse_secs(word: &str) -> Result<Instant, ScriptError> {
    let secs: f64 = word.parse().map_err(|_| ScriptError::BadTimestamp)?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(ScriptError::BadTimestamp);
    }
    Ok(Instant::from_millis((secs * 1000.0).round() as u64))
}

fn parse_f32(word: Option<&str>) -> Result<f32, ScriptError> {
    word.ok_or(ScriptError::MissingArgument)?
        .parse()
        .map_err(|_| ScriptError::BadArgument)
}

fn parse_switch(word: Option<&str>) -> Result<bool, ScriptError> {
    match word.ok_or(ScriptError::MissingArgument)? {
        w if w.eq_ignore_ascii_case("on") || w == "1" || w.eq_ignore_ascii_case("true") => Ok(true),
        w if w.eq_ignore_ascii_case("off") || w == "0" || w.eq_ignore_ascii_case("false") => {
            Ok(false)
        }
        _ => Err(ScriptError::BadArgument),
    }
}

/// Parse one script line.  Blank lines and comments yield `Ok(None)`.
pub fn parse_line(line: &str, now: Instant) -> Result<Option<ControlEvent>, ScriptError> {
    let line = line.split('#').next().unwrap_or_default().trim();
    let mut words = line.split_whitespace().peekable();
    let Some(first) = words.peek().copied() else {
        return Ok(None);
    };

    let at = if first.starts_with(|c: char| c.is_ascii_digit() || c == '.' || c == '-') {
        words.next();
        parse_secs(first)?
    } else {
        now
    };
    let Some(verb) = words.next() else {
        return Ok(Some(ControlEvent::Tick { at }));
    };
    let verb = verb.to_ascii_lowercase();

    let event = if let Some(signal) = Signal::parse(&verb) {
        ControlEvent::Reading {
            signal,
            value: parse_f32(words.next())?,
            at,
        }
    } else {
        let cmd = match verb.as_str() {
            "tick" => None,
            "on" => Some(AppCommand::TurnOn),
            "off" => Some(AppCommand::TurnOff),
            "target" => Some(AppCommand::SetHumidityTarget(parse_f32(words.next())?)),
            "preset" => {
                let name = words.next().ok_or(ScriptError::MissingArgument)?;
                Some(AppCommand::SetPreset(
                    Preset::parse(name).ok_or(ScriptError::BadArgument)?,
                ))
            }
            "boost" => {
                let duration = match words.next() {
                    Some(w) => Some(Duration::from_secs(
                        w.parse().map_err(|_| ScriptError::BadArgument)?,
                    )),
                    None => None,
                };
                Some(AppCommand::Boost { duration })
            }
            "stop" | "stop_boost" => Some(AppCommand::StopBoost),
            "helper" => Some(AppCommand::BoostHelper(parse_switch(words.next())?)),
            "save" => Some(AppCommand::SaveState),
            _ => return Err(ScriptError::UnknownVerb),
        };
        match cmd {
            Some(cmd) => ControlEvent::Command { cmd, at },
            None => ControlEvent::Tick { at },
        }
    };

    if words.next().is_some() {
        return Err(ScriptError::TrailingInput);
    }
    Ok(Some(event))
}
