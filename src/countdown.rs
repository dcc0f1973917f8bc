//! Countdown component anchored to an absolute end time.
//!
//! A countdown is started with a whole number of seconds. It reports the full
//! duration immediately, then checks once per interval. Every check derives the
//! remaining time from `end - now` instead of decrementing a counter, so a late
//! or dropped tick never accumulates error: the next check simply reads the
//! clock again.
//!
//! # Basic Usage
//!
//! ```rust
//! use themed_timers::countdown::{self, Event};
//! use themed_timers::time::ManualClock;
//!
//! let clock = ManualClock::new(0);
//! let mut timer = countdown::new(clock.clone());
//!
//! let (first, _next_check) = timer.start(90).unwrap();
//! assert_eq!(first, Event::Tick { remaining: 90 });
//! assert_eq!(timer.view(), "01:30");
//!
//! clock.advance_secs(1);
//! assert_eq!(timer.check(), Some(Event::Tick { remaining: 89 }));
//! ```
//!
//! # bubbletea-rs Integration
//!
//! `start` returns a [`Cmd`] that delivers a [`TickMsg`] one interval later.
//! Forward messages to [`Model::update`]; each accepted tick yields the event
//! and the command for the next check.
//!
//! ```rust
//! use bubbletea_rs::{Cmd, Msg};
//! use themed_timers::countdown::{self, Event};
//! use themed_timers::time;
//!
//! struct App {
//!     timer: countdown::Model,
//!     done: bool,
//! }
//!
//! impl App {
//!     fn update(&mut self, msg: Msg) -> Option<Cmd> {
//!         let (event, next) = self.timer.update(&msg)?;
//!         if event == Event::Finished {
//!             self.done = true;
//!         }
//!         next
//!     }
//! }
//!
//! let mut app = App { timer: countdown::new(time::system()), done: false };
//! let _ = app.timer.start(300);
//! ```
//!
//! # Cancellation
//!
//! Each `start` and `stop` advances an internal tag. Tick messages carry the
//! tag they were scheduled with and are dropped when it is no longer current,
//! so a restarted countdown never sees ticks from the one it replaced.

use crate::error::{Result, TimerError};
use crate::time::SharedClock;
use crate::visual;
use bubbletea_rs::{tick as bubbletea_tick, Cmd, Msg};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

// Internal ID management for countdown instances
static LAST_ID: AtomicI64 = AtomicI64::new(0);

fn next_id() -> i64 {
    LAST_ID.fetch_add(1, Ordering::SeqCst) + 1
}

/// Shortest spacing between checks. A zero period cannot be scheduled.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Rounds half-way values upward, so `-0.5` reads as zero rather than `-1`.
fn round_half_up(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

/// Formats whole seconds as zero-padded `MM:SS`.
///
/// Minutes are not wrapped into hours, so a 90 minute countdown reads `90:00`.
/// Negative inputs render as `00:00`.
///
/// ```rust
/// use themed_timers::countdown::format_mm_ss;
///
/// assert_eq!(format_mm_ss(0), "00:00");
/// assert_eq!(format_mm_ss(309), "05:09");
/// assert_eq!(format_mm_ss(5400), "90:00");
/// ```
pub fn format_mm_ss(secs: i64) -> String {
    let secs = secs.max(0);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Lifecycle of a countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    /// Never started, or stopped by hand.
    #[default]
    Idle,
    /// Counting down; periodic checks are live.
    Running,
    /// Reached the end. Progress stays pinned at 1.0 until the next start.
    Finished,
}

/// What a countdown reports to its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Whole seconds left, never negative.
    Tick { remaining: i64 },
    /// Emitted exactly once per started countdown.
    Finished,
}

/// Message delivered by the periodic check command.
#[derive(Debug, Clone)]
pub struct TickMsg {
    /// The countdown this tick belongs to.
    pub id: i64,
    tag: i64,
}

/// Wall-clock anchored countdown.
#[derive(Debug, Clone)]
pub struct Model {
    /// Spacing of periodic checks. Defaults to one second.
    pub interval: Duration,

    id: i64,
    tag: i64,
    status: Status,
    total_secs: i64,
    remaining_secs: i64,
    started_at_ms: i64,
    end_at_ms: i64,
    clock: SharedClock,
}

/// Creates an idle countdown that checks once per second.
pub fn new(clock: SharedClock) -> Model {
    new_with_interval(clock, Duration::from_secs(1))
}

/// Creates an idle countdown with a custom check interval.
pub fn new_with_interval(clock: SharedClock, interval: Duration) -> Model {
    Model {
        interval,
        id: next_id(),
        tag: 0,
        status: Status::Idle,
        total_secs: 0,
        remaining_secs: 0,
        started_at_ms: 0,
        end_at_ms: 0,
        clock,
    }
}

impl Model {
    /// Unique id of this countdown, carried by its [`TickMsg`]s.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Current lifecycle state.
    ///
    /// ```rust
    /// use themed_timers::countdown::{self, Status};
    /// use themed_timers::time::ManualClock;
    ///
    /// let clock = ManualClock::new(0);
    /// let mut timer = countdown::new(clock.clone());
    /// assert_eq!(timer.status(), Status::Idle);
    ///
    /// let _ = timer.start(1).unwrap();
    /// assert_eq!(timer.status(), Status::Running);
    ///
    /// clock.advance_secs(2);
    /// timer.check();
    /// assert_eq!(timer.status(), Status::Finished);
    /// ```
    pub fn status(&self) -> Status {
        self.status
    }

    /// Shorthand for `status() == Status::Running`.
    pub fn running(&self) -> bool {
        self.status == Status::Running
    }

    /// Shorthand for `status() == Status::Finished`.
    pub fn finished(&self) -> bool {
        self.status == Status::Finished
    }

    /// Length of the current (or last) countdown in seconds.
    pub fn total_secs(&self) -> i64 {
        self.total_secs
    }

    /// Seconds left as of the last report.
    pub fn remaining_secs(&self) -> i64 {
        self.remaining_secs
    }

    /// Clock reading, in epoch milliseconds, at the last `start`.
    pub fn started_at_ms(&self) -> i64 {
        self.started_at_ms
    }

    /// Absolute end time every check measures against.
    pub fn end_at_ms(&self) -> i64 {
        self.end_at_ms
    }

    /// Starts a countdown of `duration_secs`, replacing any countdown in flight.
    ///
    /// Returns the immediate first report, always `Tick { remaining:
    /// duration_secs }`, together with the command for the first periodic
    /// check. Zero and negative durations are rejected and leave the model
    /// untouched, so a countdown that could never finish is never entered.
    ///
    /// # Errors
    ///
    /// [`TimerError::InvalidDuration`] when `duration_secs <= 0`, or when the
    /// end time would not fit in the clock's millisecond range.
    pub fn start(&mut self, duration_secs: i64) -> Result<(Event, Cmd)> {
        if duration_secs <= 0 {
            return Err(TimerError::invalid_duration(format!(
                "countdown needs a positive number of seconds, got {duration_secs}"
            )));
        }

        let now = self.clock.now_ms();
        let end = duration_secs
            .checked_mul(1000)
            .and_then(|ms| now.checked_add(ms))
            .ok_or_else(|| {
                TimerError::invalid_duration(format!(
                    "countdown of {duration_secs} seconds is too long"
                ))
            })?;

        // Any check scheduled by a previous start is stale from here on.
        self.tag += 1;

        self.started_at_ms = now;
        self.end_at_ms = end;
        self.total_secs = duration_secs;
        self.remaining_secs = duration_secs;
        self.status = Status::Running;

        tracing::debug!(id = self.id, duration_secs, "countdown started");
        Ok((
            Event::Tick {
                remaining: duration_secs,
            },
            self.tick(),
        ))
    }

    /// Cancels the countdown without reporting a finish. Safe to repeat.
    pub fn stop(&mut self) {
        self.tag += 1;
        if self.status == Status::Running {
            tracing::debug!(id = self.id, remaining = self.remaining_secs, "countdown stopped");
        }
        self.status = Status::Idle;
    }

    /// Runs one periodic check against the clock.
    ///
    /// Returns `None` unless the countdown is running. A remaining time below
    /// zero finishes the countdown; this tolerates up to one interval of
    /// overshoot instead of finishing at exactly zero, so the zero tick is
    /// always shown first when checks land on whole seconds.
    pub fn check(&mut self) -> Option<Event> {
        if self.status != Status::Running {
            return None;
        }

        let delta_ms = self.end_at_ms - self.clock.now_ms();
        let remaining = round_half_up(delta_ms as f64 / 1000.0);

        if remaining < 0 {
            self.status = Status::Finished;
            self.remaining_secs = 0;
            self.tag += 1;
            tracing::info!(id = self.id, total_secs = self.total_secs, "countdown finished");
            return Some(Event::Finished);
        }

        self.remaining_secs = remaining;
        Some(Event::Tick { remaining })
    }

    /// Builds the tick message this countdown currently accepts.
    pub fn tick_msg(&self) -> TickMsg {
        TickMsg {
            id: self.id,
            tag: self.tag,
        }
    }

    fn tick(&self) -> Cmd {
        let id = self.id;
        let tag = self.tag;
        bubbletea_tick(self.interval.max(MIN_INTERVAL), move |_| {
            Box::new(TickMsg { id, tag }) as Msg
        })
    }

    /// Handles a periodic check message.
    ///
    /// Messages for other countdowns, stale tags and ticks arriving while not
    /// running are ignored. An accepted tick yields its event and, unless the
    /// countdown just finished, the command for the next check.
    pub fn update(&mut self, msg: &Msg) -> Option<(Event, Option<Cmd>)> {
        let tick_msg = msg.downcast_ref::<TickMsg>()?;
        if tick_msg.id != self.id || tick_msg.tag != self.tag {
            return None;
        }

        let event = self.check()?;
        let next = match event {
            Event::Tick { .. } => Some(self.tick()),
            Event::Finished => None,
        };
        Some((event, next))
    }

    /// Fraction of the countdown elapsed, as of the clock's current time.
    pub fn progress(&self) -> f64 {
        self.progress_at(self.clock.now_ms())
    }

    /// Fraction of the countdown elapsed at `now_ms`.
    ///
    /// While running this uses millisecond precision so visuals move smoothly
    /// between the once-per-second reports. A finished countdown is pinned at
    /// 1.0; a stopped one holds where it was last reported.
    pub fn progress_at(&self, now_ms: i64) -> f64 {
        match self.status {
            Status::Finished => 1.0,
            Status::Running => {
                let remaining = (self.end_at_ms - now_ms) as f64 / 1000.0;
                visual::progress(remaining, self.total_secs as f64)
            }
            Status::Idle => {
                visual::progress(self.remaining_secs as f64, self.total_secs as f64)
            }
        }
    }

    /// Renders the last reported remaining time as `MM:SS`.
    pub fn view(&self) -> String {
        format_mm_ss(self.remaining_secs)
    }
}
