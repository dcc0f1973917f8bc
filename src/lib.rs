//! # themed-timers
//!
//! Themeable countdown timers for [bubbletea-rs](https://github.com/joshka/bubbletea-rs)
//! terminal applications: an analog clock with a countdown overlay, a candle
//! that burns down, and a block of ice that melts.
//!
//! ## Overview
//!
//! Every theme owns a countdown, an alarm and, for the animated themes, a
//! frame loop. All of them follow the Elm Architecture used by bubbletea-rs:
//! work is scheduled as commands, and the resulting messages come back through
//! `update`. Each scheduled message carries an instance id and a generation
//! tag, so stopping or restarting a component simply makes its in-flight
//! messages stale.
//!
//! ## Components
//!
//! - [`countdown`]: wall-clock anchored countdown with once-per-second checks
//! - [`alarm`]: looping alarm that silences itself after a fixed window
//! - [`frame`]: render loop with an explicit start/stop lifecycle
//! - [`visual`]: progress fraction and the candle and ice mappings
//! - [`clock`]: analog hand fractions and a text dial
//! - [`theme`]: the mountable themes and their per-mount timer session
//! - [`controller`]: keeps exactly one theme mounted
//!
//! ## Switching themes
//!
//! ```rust
//! use themed_timers::prelude::*;
//!
//! let ctx = ThemeContext::new(themed_timers::time::system(), Config::default());
//! let mut controller = ThemeController::new(ctx);
//!
//! controller.switch_to(ThemeId::Clock).unwrap();
//! controller.start_timer(5).unwrap();
//!
//! // The clock, its countdown and its alarm are released before the candle mounts.
//! controller.switch_to(ThemeId::Candle).unwrap();
//! assert_eq!(controller.active_id(), Some(ThemeId::Candle));
//! assert_eq!(controller.active().unwrap().countdown_status(), Status::Idle);
//! ```

pub mod alarm;
pub mod app;
pub mod clock;
pub mod config;
pub mod controller;
pub mod countdown;
pub mod error;
pub mod frame;
pub mod key;
pub mod logging;
pub mod presets;
pub mod theme;
pub mod time;
pub mod visual;

/// Commonly used types.
pub mod prelude {
    pub use crate::alarm::{Silent, Sound, TerminalBell};
    pub use crate::config::Config;
    pub use crate::controller::{Switch, ThemeController};
    pub use crate::countdown::{Event, Status};
    pub use crate::error::{Result, TimerError};
    pub use crate::theme::{Theme, ThemeContext, ThemeId};
    pub use crate::visual::progress;
}
