//! Per-mount timer context.
//!
//! A [`TimerSession`] owns the countdown, the alarm and the countdown
//! display of one mounted theme instance. Themes create one on mount and
//! drop it on unmount, so nothing about a countdown outlives the theme that
//! started it and two themes never share timer state.

use super::ThemeContext;
use crate::alarm::{self, with_auto_stop, with_pulse};
use crate::countdown::{self, format_mm_ss, Event};
use crate::error::Result;
use bubbletea_rs::{batch, tick as bubbletea_tick, Cmd, Msg};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

static LAST_ID: AtomicI64 = AtomicI64::new(0);

fn next_id() -> i64 {
    LAST_ID.fetch_add(1, Ordering::SeqCst) + 1
}

/// Readout shown once a countdown finishes.
pub const DONE_TEXT: &str = "Done!";

/// Deadline that hides the display after a countdown finishes.
#[derive(Debug, Clone)]
pub struct FadeMsg {
    /// The session this fade belongs to.
    pub id: i64,
    tag: i64,
}

/// The countdown readout.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Display {
    /// `MM:SS` while counting, [`DONE_TEXT`] after the finish.
    pub text: String,
    /// Cleared by the fade deadline.
    pub visible: bool,
}

/// Result of routing one message through a session.
#[derive(Default)]
pub struct SessionUpdate {
    /// Countdown event produced by the message, if any.
    pub event: Option<Event>,
    /// Follow-up work: the next check, or the alarm and fade on finish.
    pub cmd: Option<Cmd>,
}

/// Per-mount timer state: one countdown, one alarm and the readout they drive.
///
/// A theme creates a session on mount and drops it on unmount, so nothing a
/// session scheduled can outlive the theme that owned it.
#[derive(Debug)]
pub struct TimerSession {
    countdown: countdown::Model,
    alarm: alarm::Model,
    display: Display,
    fade_after: Option<Duration>,
    id: i64,
    fade_tag: i64,
}

impl TimerSession {
    /// Creates an idle session using the context's clock, config and sound.
    pub fn new(ctx: &ThemeContext) -> Self {
        let config = &ctx.config;
        Self {
            countdown: countdown::new_with_interval(ctx.clock.clone(), config.tick_interval()),
            alarm: alarm::new_with_options(
                ctx.sound(),
                &[
                    with_auto_stop(config.alarm_auto_stop()),
                    with_pulse(config.alarm_pulse()),
                ],
            ),
            display: Display::default(),
            fade_after: None,
            id: next_id(),
            fade_tag: 0,
        }
    }

    /// Hides the display `after` a countdown finishes.
    pub fn with_fade(mut self, after: Duration) -> Self {
        self.fade_after = Some(after);
        self
    }

    pub fn countdown(&self) -> &countdown::Model {
        &self.countdown
    }

    pub fn alarm(&self) -> &alarm::Model {
        &self.alarm
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    /// Starts a countdown, replacing the current one.
    ///
    /// The previous countdown's pending check, a ringing alarm and a pending
    /// display fade are all cancelled first. An invalid duration is rejected
    /// before any of that happens.
    pub fn start(&mut self, duration_secs: i64) -> Result<(Event, Cmd)> {
        let (event, cmd) = self.countdown.start(duration_secs)?;
        self.alarm.silence();
        self.alarm.prime();
        self.fade_tag += 1;
        self.display = Display {
            text: format_mm_ss(duration_secs),
            visible: true,
        };
        tracing::info!(session = self.id, duration_secs, "timer started");
        Ok((event, cmd))
    }

    /// Cancels the countdown, the alarm and any pending fade. Safe to repeat.
    pub fn stop(&mut self) {
        self.countdown.stop();
        self.alarm.silence();
        self.fade_tag += 1;
    }

    /// Builds the fade deadline this session currently accepts.
    pub fn fade_msg(&self) -> FadeMsg {
        FadeMsg {
            id: self.id,
            tag: self.fade_tag,
        }
    }

    fn fade_cmd(&self, after: Duration) -> Cmd {
        let id = self.id;
        let tag = self.fade_tag;
        bubbletea_tick(after, move |_| Box::new(FadeMsg { id, tag }) as Msg)
    }

    fn finish(&mut self) -> Cmd {
        self.display.text = DONE_TEXT.to_string();
        let mut cmds = vec![self.alarm.ring()];
        if let Some(after) = self.fade_after {
            self.fade_tag += 1;
            cmds.push(self.fade_cmd(after));
        }
        batch(cmds)
    }

    /// Routes a message to the countdown, the alarm or the fade deadline.
    pub fn update(&mut self, msg: &Msg) -> SessionUpdate {
        if let Some((event, next)) = self.countdown.update(msg) {
            let cmd = match event {
                Event::Tick { remaining } => {
                    self.display.text = format_mm_ss(remaining);
                    next
                }
                Event::Finished => Some(self.finish()),
            };
            return SessionUpdate {
                event: Some(event),
                cmd,
            };
        }

        if let Some(fade) = msg.downcast_ref::<FadeMsg>() {
            if fade.id == self.id && fade.tag == self.fade_tag {
                self.display.visible = false;
            }
            return SessionUpdate::default();
        }

        SessionUpdate {
            event: None,
            cmd: self.alarm.update(msg),
        }
    }
}
