//! Owner of the single active theme.
//!
//! The controller holds at most one mounted theme. Switching always tears the
//! current theme down before the next one is built and mounted, and a theme
//! whose teardown fails is dropped anyway: the controller stops routing
//! messages to it, so its loop can never be rescheduled and two loops never
//! run side by side.
//!
//! ```rust
//! use themed_timers::config::Config;
//! use themed_timers::controller::ThemeController;
//! use themed_timers::theme::{ThemeContext, ThemeId};
//! use themed_timers::time;
//!
//! let mut controller = ThemeController::new(ThemeContext::new(time::system(), Config::default()));
//! assert_eq!(controller.active_id(), None);
//!
//! let switch = controller.switch_to(ThemeId::Candle).unwrap();
//! assert!(switch.cmd.is_some());
//! assert_eq!(controller.active_id(), Some(ThemeId::Candle));
//! ```

use crate::error::{Result, TimerError};
use crate::theme::{self, Theme, ThemeContext, ThemeId};
use bubbletea_rs::{Cmd, Msg};

/// Builds an unmounted theme for an id.
pub type Factory = Box<dyn Fn(ThemeId) -> Box<dyn Theme> + Send>;

/// The mounted theme and the id it was mounted under.
pub struct ActiveTheme {
    pub id: ThemeId,
    theme: Box<dyn Theme>,
}

/// Outcome of [`ThemeController::switch_to`].
pub struct Switch {
    /// Starts the new theme's loop.
    pub cmd: Option<Cmd>,
    /// Teardown failure of the outgoing theme. The switch still completed.
    pub teardown_error: Option<TimerError>,
}

pub struct ThemeController {
    factory: Factory,
    active: Option<ActiveTheme>,
    switches: u64,
}

impl ThemeController {
    /// Builds themes with [`theme::build`].
    pub fn new(ctx: ThemeContext) -> Self {
        Self::with_factory(move |id| theme::build(id, &ctx))
    }

    pub fn with_factory(factory: impl Fn(ThemeId) -> Box<dyn Theme> + Send + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            active: None,
            switches: 0,
        }
    }

    pub fn active_id(&self) -> Option<ThemeId> {
        self.active.as_ref().map(|a| a.id)
    }

    pub fn active(&self) -> Option<&dyn Theme> {
        self.active.as_ref().map(|a| a.theme.as_ref())
    }

    /// Completed switches since creation.
    pub fn switches(&self) -> u64 {
        self.switches
    }

    /// Replaces the active theme with a freshly mounted `id`.
    ///
    /// The outgoing theme is unmounted and dropped first. If its unmount
    /// fails the error is logged and returned in [`Switch::teardown_error`];
    /// the new theme is mounted regardless, since the old one is gone. An
    /// error from mounting the new theme leaves no theme active.
    pub fn switch_to(&mut self, id: ThemeId) -> Result<Switch> {
        let previous = self.active_id();
        let teardown_error = self.teardown();

        let mut theme = (self.factory)(id);
        let cmd = theme.mount()?;
        self.active = Some(ActiveTheme { id, theme });
        self.switches += 1;

        match previous {
            Some(from) => tracing::info!(%from, to = %id, "theme switched"),
            None => tracing::info!(to = %id, "theme mounted"),
        }
        Ok(Switch {
            cmd,
            teardown_error,
        })
    }

    fn teardown(&mut self) -> Option<TimerError> {
        let mut outgoing = self.active.take()?;
        match outgoing.theme.unmount() {
            Ok(()) => None,
            Err(err) => {
                tracing::error!(theme = %outgoing.id, error = %err, "teardown failed, dropping theme");
                Some(err)
            }
        }
    }

    /// Routes a message to the active theme only.
    pub fn update(&mut self, msg: &Msg) -> Option<Cmd> {
        self.active.as_mut()?.theme.update(msg)
    }

    pub fn start_timer(&mut self, minutes: u32) -> Result<Option<Cmd>> {
        let active = self.active.as_mut().ok_or(TimerError::NoActiveTheme)?;
        active.theme.start_timer(minutes)
    }

    pub fn stop_timer(&mut self) {
        if let Some(active) = self.active.as_mut() {
            active.theme.stop_timer();
        }
    }

    pub fn view(&self) -> String {
        self.active().map(|t| t.view()).unwrap_or_default()
    }

    /// Unmounts and drops the active theme.
    pub fn shutdown(&mut self) -> Option<TimerError> {
        let err = self.teardown();
        tracing::debug!("controller shut down");
        err
    }
}

impl Drop for ThemeController {
    fn drop(&mut self) {
        self.teardown();
    }
}
