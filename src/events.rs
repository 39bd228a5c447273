//! Inbound event queue.
//!
//! Events are produced by:
//! - sensor adapters (new reading)
//! - the host's periodic timer (tick)
//! - user-facing surfaces (commands: power, target, preset, boost)
//!
//! and consumed by the control loop, which hands them to
//! [`AppService::dispatch`](crate::app::service::AppService::dispatch) one
//! at a time in FIFO order.  Each event runs a decision cycle to
//! completion before the next is popped.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Sensors     │────▶│              │     │              │
//! │ Tick timer  │────▶│  EventQueue  │────▶│  AppService  │
//! │ Commands    │────▶│              │     │  (consumer)  │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```

use core::time::Duration;

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use crate::app::commands::AppCommand;
use crate::sensors::Signal;
use crate::time::Instant;

/// Maximum number of pending events.
pub const EVENT_QUEUE_CAP: usize = 32;

/// Most overdue ticks replayed after a gap before the schedule skips ahead.
pub const MAX_CATCH_UP_TICKS: u32 = 64;

/// Everything that can trigger a decision cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlEvent {
    /// A sensor reported a value.
    Reading {
        signal: Signal,
        value: f32,
        at: Instant,
    },
    /// Periodic tick; drives boost expiry and staleness detection.
    Tick { at: Instant },
    /// User or automation command.
    Command { cmd: AppCommand, at: Instant },
}

impl ControlEvent {
    /// Time the event was captured.
    pub fn at(&self) -> Instant {
        match *self {
            Self::Reading { at, .. } | Self::Tick { at } | Self::Command { at, .. } => at,
        }
    }
}

/// Bounded FIFO between event producers and the control loop.
///
/// Single-context only: producers and consumer share one executor thread.
pub struct EventQueue {
    channel: Channel<NoopRawMutex, ControlEvent, EVENT_QUEUE_CAP>,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Enqueue an event.  Returns `false` if the queue is full (event dropped).
    pub fn push(&self, event: ControlEvent) -> bool {
        self.channel.try_send(event).is_ok()
    }

    /// Next event, or `None` if empty.
    pub fn pop(&self) -> Option<ControlEvent> {
        self.channel.try_receive().ok()
    }

    /// Drain all pending events into a callback, FIFO order.
    pub fn drain(&self, mut handler: impl FnMut(ControlEvent)) {
        while let Some(event) = self.pop() {
            handler(event);
        }
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }
}

/// Periodic tick deadlines for a host loop that only wakes on input.
///
/// After a gap longer than [`MAX_CATCH_UP_TICKS`] intervals the missed ticks
/// are dropped and a single tick fires at the current time.
pub struct TickSchedule {
    next: Instant,
    every: Duration,
}

impl TickSchedule {
    pub fn new(start: Instant, every: Duration) -> Self {
        let every = every.max(Duration::from_millis(1));
        Self {
            next: start + every,
            every,
        }
    }

    /// Next due tick at or before `now`, advancing the schedule.
    pub fn poll(&mut self, now: Instant) -> Option<Instant> {
        if self.next > now {
            return None;
        }
        let lag = now.saturating_duration_since(self.next);
        if lag > self.every * MAX_CATCH_UP_TICKS {
            warn!("tick schedule {} ms behind, skipping ahead", lag.as_millis());
            self.next = now;
        }
        let due = self.next;
        self.next = due + self.every;
        Some(due)
    }
}
