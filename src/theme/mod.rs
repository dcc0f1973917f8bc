//! Mountable themes.
//!
//! A theme is a self-contained visual plus timer module. It acquires its
//! resources in [`Theme::mount`] (a render or refresh loop, a countdown
//! session, an alarm) and releases all of them in [`Theme::unmount`]. The
//! [`ThemeController`](crate::controller::ThemeController) guarantees that at
//! most one theme is mounted at a time.

pub mod candle;
pub mod clock;
pub mod ice;
pub mod session;

use crate::alarm::{Silent, Sound, TerminalBell};
use crate::config::{AlarmConfig, Config};
use crate::countdown::Status;
use crate::error::{Result, TimerError};
use crate::time::SharedClock;
use bubbletea_rs::{Cmd, Msg};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use unicode_width::UnicodeWidthStr;

pub use candle::CandleTheme;
pub use clock::ClockTheme;
pub use ice::IceTheme;
pub use session::{Display, FadeMsg, SessionUpdate, TimerSession};

/// Identifies one of the built-in themes.
///
/// ```rust
/// use themed_timers::theme::ThemeId;
///
/// let id: ThemeId = "candle".parse().unwrap();
/// assert_eq!(id.next(), ThemeId::Ice);
/// assert_eq!(ThemeId::Ice.next(), ThemeId::Clock);
/// assert!("lava".parse::<ThemeId>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeId {
    #[default]
    Clock,
    Candle,
    Ice,
}

impl ThemeId {
    pub const ALL: [ThemeId; 3] = [ThemeId::Clock, ThemeId::Candle, ThemeId::Ice];

    /// Lowercase name, as accepted on the command line and in config files.
    pub fn name(self) -> &'static str {
        match self {
            ThemeId::Clock => "clock",
            ThemeId::Candle => "candle",
            ThemeId::Ice => "ice",
        }
    }

    /// The theme after this one, wrapping around.
    pub fn next(self) -> ThemeId {
        match self {
            ThemeId::Clock => ThemeId::Candle,
            ThemeId::Candle => ThemeId::Ice,
            ThemeId::Ice => ThemeId::Clock,
        }
    }
}

impl fmt::Display for ThemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ThemeId {
    type Err = TimerError;

    fn from_str(s: &str) -> Result<Self> {
        ThemeId::ALL
            .into_iter()
            .find(|id| id.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TimerError::UnknownTheme(s.to_string()))
    }
}

/// The contract every theme implements.
pub trait Theme: Send {
    fn id(&self) -> ThemeId;

    /// Preset countdown lengths in minutes, in display order.
    fn presets(&self) -> &'static [u32];

    /// The preset shown as selected, if the theme highlights one.
    fn selected(&self) -> Option<u32> {
        None
    }

    /// Acquires the theme's resources and returns the command that starts its
    /// loop. Mounting a mounted theme does nothing.
    fn mount(&mut self) -> Result<Option<Cmd>>;

    /// Releases every resource acquired by `mount`: the loop, the countdown
    /// and the alarm. Safe to call on an unmounted theme.
    fn unmount(&mut self) -> Result<()>;

    fn is_mounted(&self) -> bool;

    /// Starts a countdown of `minutes`, replacing any countdown in progress.
    fn start_timer(&mut self, minutes: u32) -> Result<Option<Cmd>>;

    /// Cancels the countdown and silences the alarm.
    fn stop_timer(&mut self);

    fn update(&mut self, msg: &Msg) -> Option<Cmd>;

    fn view(&self) -> String;

    fn countdown_status(&self) -> Status;

    /// Fraction of the current countdown elapsed.
    fn progress(&self) -> f64;

    /// Loop commands (frames or refreshes) issued since the theme was built.
    fn frames_scheduled(&self) -> u64;
}

/// Builds the sound for one alarm player.
pub type SoundFactory = Arc<dyn Fn(&AlarmConfig) -> Box<dyn Sound> + Send + Sync>;

fn default_sound(alarm: &AlarmConfig) -> Box<dyn Sound> {
    if alarm.enabled {
        Box::new(TerminalBell::new(alarm.asset.clone()))
    } else {
        Box::new(Silent::default())
    }
}

/// Everything a theme needs to build its per-mount state.
#[derive(Clone)]
pub struct ThemeContext {
    /// Time source for countdowns and the clock face.
    pub clock: SharedClock,
    pub config: Config,
    sounds: SoundFactory,
}

impl fmt::Debug for ThemeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeContext")
            .field("clock", &self.clock)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ThemeContext {
    pub fn new(clock: SharedClock, config: Config) -> Self {
        Self {
            clock,
            config,
            sounds: Arc::new(default_sound),
        }
    }

    /// Replaces the sound backend used by alarms.
    pub fn with_sounds(
        mut self,
        sounds: impl Fn(&AlarmConfig) -> Box<dyn Sound> + Send + Sync + 'static,
    ) -> Self {
        self.sounds = Arc::new(sounds);
        self
    }

    /// Builds a fresh sound for one alarm player.
    pub fn sound(&self) -> Box<dyn Sound> {
        (self.sounds)(&self.config.alarm)
    }
}

/// Builds an unmounted theme.
pub fn build(id: ThemeId, ctx: &ThemeContext) -> Box<dyn Theme> {
    match id {
        ThemeId::Clock => Box::new(ClockTheme::new(ctx.clone())),
        ThemeId::Candle => Box::new(CandleTheme::new(ctx.clone())),
        ThemeId::Ice => Box::new(IceTheme::new(ctx.clone())),
    }
}

/// Pads `line` on both sides to `width` display columns.
pub(crate) fn center(line: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(line);
    if w >= width {
        return line.to_string();
    }
    let left = (width - w) / 2;
    let right = width - w - left;
    format!("{}{}{}", " ".repeat(left), line, " ".repeat(right))
}
