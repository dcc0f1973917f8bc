//! Alarm component: one looping sound that silences itself.
//!
//! An alarm player owns a single [`Sound`]. Ringing while already ringing
//! stops the current playback first (pause and rewind) and then starts again,
//! so there is never more than one audible alarm. Every ring schedules an
//! [`AutoSilenceMsg`] after the auto-stop window; the message carries the
//! player's tag at ring time, and each ring or silence advances the tag, so
//! only the most recent ring's deadline can ever silence the alarm.
//!
//! Playback failures are logged and otherwise ignored. An alarm that cannot
//! make a sound still counts as rung; the countdown that triggered it is never
//! affected.
//!
//! ```rust
//! use themed_timers::alarm::{self, Silent};
//! use std::time::Duration;
//!
//! let mut player = alarm::new(Box::new(Silent::default()));
//! assert_eq!(player.auto_stop, Duration::from_secs(10));
//!
//! let _auto_silence = player.ring();
//! assert!(player.ringing());
//!
//! player.silence();
//! assert!(!player.ringing());
//! ```

use crate::error::{Result, TimerError};
use bubbletea_rs::{batch, tick as bubbletea_tick, Cmd, Msg};
use std::fmt::Debug;
use std::io::{IsTerminal, Write};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

// Internal ID management for alarm instances
static LAST_ID: AtomicI64 = AtomicI64::new(0);

fn next_id() -> i64 {
    LAST_ID.fetch_add(1, Ordering::SeqCst) + 1
}

/// How long a ring lasts unless silenced sooner.
pub const DEFAULT_AUTO_STOP: Duration = Duration::from_secs(10);
/// Spacing of loop pulses while ringing.
pub const DEFAULT_PULSE: Duration = Duration::from_secs(1);

/// A loopable sound resource.
pub trait Sound: Send + Debug {
    /// Starts playback from the current position.
    fn play(&mut self) -> Result<()>;

    /// Halts playback, keeping the position.
    fn pause(&mut self);

    /// Resets the playback position to the start.
    fn rewind(&mut self);

    /// Makes playback restart from the beginning when it reaches the end.
    fn set_looping(&mut self, looping: bool);

    /// Whether the sound is currently audible.
    fn is_playing(&self) -> bool;

    /// Checks that playback is possible without making a sound.
    fn prime(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called periodically while the alarm rings. Backends without native
    /// looping restart their sound here.
    fn pulse(&mut self) {}
}

/// Rings the terminal bell.
#[derive(Debug, Clone)]
pub struct TerminalBell {
    asset: String,
    playing: bool,
    looping: bool,
}

impl TerminalBell {
    /// `asset` names the alarm in logs and errors.
    pub fn new(asset: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            playing: false,
            looping: false,
        }
    }

    fn check_terminal(&self) -> Result<()> {
        if std::io::stdout().is_terminal() {
            Ok(())
        } else {
            Err(TimerError::playback_denied(
                &self.asset,
                "stdout is not a terminal",
            ))
        }
    }

    fn bell(&self) -> Result<()> {
        let mut out = std::io::stdout();
        crossterm::queue!(out, crossterm::style::Print('\u{7}'))
            .and_then(|_| out.flush())
            .map_err(|e| TimerError::playback_denied(&self.asset, e.to_string()))
    }
}

impl Sound for TerminalBell {
    fn play(&mut self) -> Result<()> {
        self.check_terminal()?;
        self.bell()?;
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn rewind(&mut self) {}

    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn prime(&mut self) -> Result<()> {
        self.check_terminal()
    }

    fn pulse(&mut self) {
        if self.playing && self.looping {
            if let Err(err) = self.bell() {
                tracing::debug!(%err, "alarm pulse failed");
            }
        }
    }
}

/// A sound that tracks playback state but makes no noise.
#[derive(Debug, Clone, Default)]
pub struct Silent {
    playing: bool,
}

impl Sound for Silent {
    fn play(&mut self) -> Result<()> {
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn rewind(&mut self) {}

    fn set_looping(&mut self, _looping: bool) {}

    fn is_playing(&self) -> bool {
        self.playing
    }
}

/// Deadline message that silences the alarm it was scheduled by.
#[derive(Debug, Clone)]
pub struct AutoSilenceMsg {
    /// The alarm this deadline belongs to.
    pub id: i64,
    tag: i64,
}

/// Loop pulse while ringing.
#[derive(Debug, Clone)]
pub struct PulseMsg {
    /// The alarm this pulse belongs to.
    pub id: i64,
    tag: i64,
}

/// Alarm player owning a single looping sound.
#[derive(Debug)]
pub struct Model {
    /// How long a ring lasts before silencing itself.
    pub auto_stop: Duration,
    /// Spacing of loop pulses while ringing.
    pub pulse: Duration,

    sound: Box<dyn Sound>,
    id: i64,
    tag: i64,
    ringing: bool,
    rings: u64,
    auto_silences: u64,
}

/// Configuration options for [`new_with_options`].
pub enum AlarmOption {
    WithAutoStop(Duration),
    WithPulse(Duration),
}

impl AlarmOption {
    fn apply(&self, m: &mut Model) {
        match self {
            AlarmOption::WithAutoStop(d) => m.auto_stop = *d,
            AlarmOption::WithPulse(d) => m.pulse = *d,
        }
    }
}

/// Sets how long a ring lasts before silencing itself.
pub fn with_auto_stop(d: Duration) -> AlarmOption {
    AlarmOption::WithAutoStop(d)
}

/// Sets the spacing of loop pulses.
pub fn with_pulse(d: Duration) -> AlarmOption {
    AlarmOption::WithPulse(d)
}

/// Creates an idle player with the default windows.
pub fn new(sound: Box<dyn Sound>) -> Model {
    new_with_options(sound, &[])
}

/// Creates a player with custom windows.
///
/// ```rust
/// use themed_timers::alarm::{self, with_auto_stop, Silent};
/// use std::time::Duration;
///
/// let player = alarm::new_with_options(
///     Box::new(Silent::default()),
///     &[with_auto_stop(Duration::from_secs(5))],
/// );
/// assert_eq!(player.auto_stop, Duration::from_secs(5));
/// assert!(!player.ringing());
/// ```
pub fn new_with_options(sound: Box<dyn Sound>, opts: &[AlarmOption]) -> Model {
    let mut m = Model {
        auto_stop: DEFAULT_AUTO_STOP,
        pulse: DEFAULT_PULSE,
        sound,
        id: next_id(),
        tag: 0,
        ringing: false,
        rings: 0,
        auto_silences: 0,
    };
    for opt in opts {
        opt.apply(&mut m);
    }
    m
}

impl Model {
    /// Unique id of this player, carried by its scheduled messages.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Whether a ring is in progress.
    pub fn ringing(&self) -> bool {
        self.ringing
    }

    /// Number of times `ring` was called.
    pub fn rings(&self) -> u64 {
        self.rings
    }

    /// Number of auto-silence deadlines that fired.
    pub fn auto_silences(&self) -> u64 {
        self.auto_silences
    }

    /// Checks that the sound can play, so a later ring is not the first
    /// attempt. Failures are logged and ignored.
    pub fn prime(&mut self) {
        if let Err(err) = self.sound.prime() {
            tracing::warn!(id = self.id, %err, "alarm sound unavailable");
        }
    }

    /// Starts the alarm, preempting any alarm already ringing.
    ///
    /// Returns the auto-silence deadline batched with the first loop pulse.
    pub fn ring(&mut self) -> Cmd {
        if self.ringing {
            self.silence();
        }
        self.tag += 1;
        self.rings += 1;
        self.ringing = true;

        self.sound.set_looping(true);
        if let Err(err) = self.sound.play() {
            tracing::warn!(id = self.id, %err, "alarm playback failed");
        } else {
            tracing::info!(id = self.id, auto_stop_ms = self.auto_stop.as_millis() as u64, "alarm ringing");
        }

        batch(vec![self.auto_silence_cmd(), self.pulse_cmd()])
    }

    /// Stops playback and cancels the pending auto-silence. Safe to repeat.
    pub fn silence(&mut self) {
        if !self.ringing {
            return;
        }
        self.tag += 1;
        self.ringing = false;
        self.sound.pause();
        self.sound.rewind();
        tracing::debug!(id = self.id, "alarm silenced");
    }

    /// Builds the auto-silence deadline this player currently accepts.
    pub fn auto_silence_msg(&self) -> AutoSilenceMsg {
        AutoSilenceMsg {
            id: self.id,
            tag: self.tag,
        }
    }

    /// Builds the loop pulse this player currently accepts.
    pub fn pulse_msg(&self) -> PulseMsg {
        PulseMsg {
            id: self.id,
            tag: self.tag,
        }
    }

    fn auto_silence_cmd(&self) -> Cmd {
        let id = self.id;
        let tag = self.tag;
        bubbletea_tick(self.auto_stop, move |_| {
            Box::new(AutoSilenceMsg { id, tag }) as Msg
        })
    }

    fn pulse_cmd(&self) -> Cmd {
        let id = self.id;
        let tag = self.tag;
        bubbletea_tick(self.pulse, move |_| Box::new(PulseMsg { id, tag }) as Msg)
    }

    /// Handles auto-silence deadlines and loop pulses addressed to this alarm.
    pub fn update(&mut self, msg: &Msg) -> Option<Cmd> {
        if let Some(deadline) = msg.downcast_ref::<AutoSilenceMsg>() {
            if deadline.id == self.id && deadline.tag == self.tag && self.ringing {
                self.auto_silences += 1;
                self.silence();
            }
            return None;
        }

        if let Some(pulse) = msg.downcast_ref::<PulseMsg>() {
            if pulse.id != self.id || pulse.tag != self.tag || !self.ringing {
                return None;
            }
            self.sound.pulse();
            return Some(self.pulse_cmd());
        }

        None
    }
}

impl Drop for Model {
    fn drop(&mut self) {
        self.silence();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bubbletea_rs::event::BatchCmdMsg;
    use std::sync::{Arc, Mutex};
    use tokio::time::{sleep, timeout, Instant};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Call {
        Play,
        Pause,
        Rewind,
        Loop(bool),
        Pulse,
    }

    #[derive(Debug, Clone)]
    struct Recorder {
        calls: Arc<Mutex<Vec<Call>>>,
        playing: bool,
        deny: bool,
    }

    impl Recorder {
        fn new() -> (Self, Arc<Mutex<Vec<Call>>>) {
            let calls = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    calls: calls.clone(),
                    playing: false,
                    deny: false,
                },
                calls,
            )
        }
    }

    impl Sound for Recorder {
        fn play(&mut self) -> Result<()> {
            self.calls.lock().unwrap().push(Call::Play);
            if self.deny {
                return Err(TimerError::playback_denied("test", "denied"));
            }
            self.playing = true;
            Ok(())
        }
        fn pause(&mut self) {
            self.calls.lock().unwrap().push(Call::Pause);
            self.playing = false;
        }
        fn rewind(&mut self) {
            self.calls.lock().unwrap().push(Call::Rewind);
        }
        fn set_looping(&mut self, looping: bool) {
            self.calls.lock().unwrap().push(Call::Loop(looping));
        }
        fn is_playing(&self) -> bool {
            self.playing
        }
        fn pulse(&mut self) {
            self.calls.lock().unwrap().push(Call::Pulse);
        }
    }

    #[test]
    fn ring_loops_and_plays() {
        let (sound, calls) = Recorder::new();
        let mut player = new(Box::new(sound));
        let _cmd = player.ring();
        assert!(player.ringing());
        assert_eq!(*calls.lock().unwrap(), vec![Call::Loop(true), Call::Play]);
    }

    #[test]
    fn auto_silence_fires_once() {
        let (sound, calls) = Recorder::new();
        let mut player = new(Box::new(sound));
        let _ = player.ring();
        let deadline: Msg = Box::new(player.auto_silence_msg());

        assert!(player.update(&deadline).is_none());
        assert!(!player.ringing());
        assert_eq!(player.auto_silences(), 1);

        // Delivering it again changes nothing.
        player.update(&deadline);
        assert_eq!(player.auto_silences(), 1);
        let pauses = calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| **c == Call::Pause)
            .count();
        assert_eq!(pauses, 1);
    }

    #[test]
    fn ring_while_ringing_preempts() {
        let (sound, calls) = Recorder::new();
        let mut player = new(Box::new(sound));
        let _ = player.ring();
        let first_deadline: Msg = Box::new(player.auto_silence_msg());

        let _ = player.ring();
        let second_deadline: Msg = Box::new(player.auto_silence_msg());

        assert_eq!(
            *calls.lock().unwrap(),
            vec![
                Call::Loop(true),
                Call::Play,
                Call::Pause,
                Call::Rewind,
                Call::Loop(true),
                Call::Play,
            ]
        );

        // The first ring's deadline is stale and must not cut the second short.
        player.update(&first_deadline);
        assert!(player.ringing());
        assert_eq!(player.auto_silences(), 0);

        player.update(&second_deadline);
        assert!(!player.ringing());
        assert_eq!(player.auto_silences(), 1);
        assert_eq!(player.rings(), 2);
    }

    #[test]
    fn silence_cancels_deadline_and_is_idempotent() {
        let (sound, calls) = Recorder::new();
        let mut player = new(Box::new(sound));
        let _ = player.ring();
        let deadline: Msg = Box::new(player.auto_silence_msg());
        player.silence();
        player.silence();
        player.update(&deadline);
        assert_eq!(player.auto_silences(), 0);
        assert_eq!(
            calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| **c == Call::Pause)
                .count(),
            1
        );
    }

    #[test]
    fn denied_playback_is_swallowed() {
        let (mut sound, _calls) = Recorder::new();
        sound.deny = true;
        let mut player = new(Box::new(sound));
        let _ = player.ring();
        assert!(player.ringing());
        let deadline: Msg = Box::new(player.auto_silence_msg());
        player.update(&deadline);
        assert!(!player.ringing());
    }

    #[test]
    fn pulses_only_while_ringing() {
        let (sound, calls) = Recorder::new();
        let mut player = new(Box::new(sound));
        let _ = player.ring();
        let pulse: Msg = Box::new(player.pulse_msg());
        assert!(player.update(&pulse).is_some());
        assert_eq!(calls.lock().unwrap().last(), Some(&Call::Pulse));

        player.silence();
        let stale: Msg = Box::new(player.pulse_msg());
        assert!(player.update(&stale).is_none());
    }

    #[test]
    fn options_override_windows() {
        let player = new_with_options(
            Box::new(Silent::default()),
            &[
                with_auto_stop(Duration::from_secs(3)),
                with_pulse(Duration::from_millis(250)),
            ],
        );
        assert_eq!(player.auto_stop, Duration::from_secs(3));
        assert_eq!(player.pulse, Duration::from_millis(250));
    }

    /// Awaits a `ring` command and returns the auto-silence deadline it batches.
    async fn deadline_of(ring: Cmd) -> Cmd {
        let msg = ring.await.expect("ring yields a batch");
        let mut cmds = msg
            .downcast::<BatchCmdMsg>()
            .map(|batch| batch.0)
            .expect("ring yields a batch");
        assert_eq!(cmds.len(), 2);
        cmds.remove(0)
    }

    #[tokio::test(start_paused = true)]
    async fn ring_delivers_auto_silence_at_the_deadline() {
        let (sound, _calls) = Recorder::new();
        let mut player = new(Box::new(sound));
        let mut deadline = deadline_of(player.ring()).await;

        let start = Instant::now();
        assert!(timeout(Duration::from_millis(9_999), &mut deadline)
            .await
            .is_err());
        assert!(player.ringing());

        let msg = deadline.await.expect("deadline yields a message");
        assert!(start.elapsed() >= DEFAULT_AUTO_STOP);
        assert!(msg.downcast_ref::<AutoSilenceMsg>().is_some());
        assert!(player.update(&msg).is_none());
        assert!(!player.ringing());
        assert_eq!(player.auto_silences(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn only_the_latest_ring_deadline_silences() {
        let (sound, _calls) = Recorder::new();
        let mut player = new(Box::new(sound));
        let start = Instant::now();

        let first = tokio::spawn(deadline_of(player.ring()).await);
        sleep(Duration::from_secs(4)).await;
        let second = tokio::spawn(deadline_of(player.ring()).await);

        let stale = first.await.unwrap().expect("first deadline");
        assert!(start.elapsed() >= Duration::from_secs(10));
        player.update(&stale);
        assert!(player.ringing());
        assert_eq!(player.auto_silences(), 0);

        let current = second.await.unwrap().expect("second deadline");
        assert!(start.elapsed() >= Duration::from_secs(14));
        player.update(&current);
        assert!(!player.ringing());
        assert_eq!(player.auto_silences(), 1);
        assert_eq!(player.rings(), 2);
    }

    #[test]
    fn dropping_a_ringing_alarm_silences_it() {
        let (sound, calls) = Recorder::new();
        let mut player = new(Box::new(sound));
        let _ = player.ring();
        drop(player);
        assert_eq!(calls.lock().unwrap().last(), Some(&Call::Rewind));
    }
}
