//! Terminal host for the themes.
//!
//! [`App`] implements the bubbletea-rs `Model` trait: key presses pick presets
//! and switch themes, every other message is routed to the
//! [`ThemeController`]. Because `Model::init` takes no arguments, startup
//! settings are handed over once through [`configure`] before the program
//! runs.

use crate::config::Config;
use crate::controller::ThemeController;
use crate::error::{Result, TimerError};
use crate::key::Binding;
use crate::presets;
use crate::theme::{ThemeContext, ThemeId};
use crate::time::{self, SharedClock};
use bubbletea_rs::{batch, quit, Cmd, KeyMsg, Model as BubbleTeaModel, Msg};
use crossterm::event::{KeyCode, KeyModifiers};
use lipgloss_extras::prelude::*;
use once_cell::sync::OnceCell;

static STARTUP: OnceCell<Startup> = OnceCell::new();

/// Settings read by [`App::init`].
#[derive(Debug, Clone)]
pub struct Startup {
    pub config: Config,
    pub theme: ThemeId,
    /// Countdown to start right after the first theme mounts.
    pub start_minutes: Option<u32>,
    pub clock: SharedClock,
}

impl Default for Startup {
    fn default() -> Self {
        let config = Config::default();
        Self {
            theme: config.default_theme,
            config,
            start_minutes: None,
            clock: time::system(),
        }
    }
}

/// Stores the settings used by [`App::init`]. Can only be called once.
pub fn configure(startup: Startup) -> Result<()> {
    STARTUP
        .set(startup)
        .map_err(|_| TimerError::config("startup settings were already configured"))
}

#[derive(Debug, Clone)]
pub struct KeyMap {
    pub presets: Vec<Binding>,
    pub clock: Binding,
    pub candle: Binding,
    pub ice: Binding,
    pub next_theme: Binding,
    pub stop: Binding,
    pub quit: Binding,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            presets: ('1'..='6')
                .map(|c| Binding::new(vec![KeyCode::Char(c)]))
                .collect(),
            clock: Binding::new(vec![KeyCode::Char('c')]).with_help("c", "clock"),
            candle: Binding::new(vec![KeyCode::Char('n')]).with_help("n", "candle"),
            ice: Binding::new(vec![KeyCode::Char('i')]).with_help("i", "ice"),
            next_theme: Binding::new(vec![KeyCode::Tab]).with_help("tab", "next theme"),
            stop: Binding::new(vec![KeyCode::Char('s')]).with_help("s", "stop"),
            quit: Binding::new(vec![KeyCode::Char('q'), KeyCode::Esc])
                .with_modified(KeyCode::Char('c'), KeyModifiers::CONTROL)
                .with_help("q", "quit"),
        }
    }
}

impl KeyMap {
    fn help(&self) -> String {
        [
            "1-6 start".to_string(),
            self.stop.help_view(),
            self.clock.help_view(),
            self.candle.help_view(),
            self.ice.help_view(),
            self.next_theme.help_view(),
            self.quit.help_view(),
        ]
        .join(" • ")
    }
}

pub struct App {
    controller: ThemeController,
    keys: KeyMap,
    /// Last error shown under the presets.
    status: Option<String>,
}

impl App {
    /// Builds the app and mounts `theme`.
    pub fn new(ctx: ThemeContext, theme: ThemeId) -> (Self, Option<Cmd>) {
        let mut app = Self {
            controller: ThemeController::new(ctx),
            keys: KeyMap::default(),
            status: None,
        };
        let cmd = app.switch(theme);
        (app, cmd)
    }

    pub fn controller(&self) -> &ThemeController {
        &self.controller
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    fn report(&mut self, err: TimerError) {
        tracing::warn!(error = %err, "action failed");
        self.status = Some(err.to_string());
    }

    fn switch(&mut self, id: ThemeId) -> Option<Cmd> {
        match self.controller.switch_to(id) {
            Ok(switch) => {
                self.status = switch.teardown_error.map(|e| e.to_string());
                switch.cmd
            }
            Err(err) => {
                self.report(err);
                None
            }
        }
    }

    /// Starts a countdown of `minutes` on the active theme.
    pub fn start(&mut self, minutes: u32) -> Option<Cmd> {
        match self.controller.start_timer(minutes) {
            Ok(cmd) => {
                self.status = None;
                cmd
            }
            Err(err) => {
                self.report(err);
                None
            }
        }
    }

    fn start_preset(&mut self, index: usize) -> Option<Cmd> {
        let minutes = self.controller.active()?.presets().get(index).copied()?;
        self.start(minutes)
    }

    pub fn handle_key(&mut self, key: &KeyMsg) -> Option<Cmd> {
        let keys = &self.keys;
        if keys.quit.matches(key) {
            if let Some(err) = self.controller.shutdown() {
                tracing::error!(error = %err, "teardown failed on quit");
            }
            return Some(quit());
        }
        if let Some(index) = keys.presets.iter().position(|b| b.matches(key)) {
            return self.start_preset(index);
        }
        if keys.stop.matches(key) {
            self.controller.stop_timer();
            return None;
        }

        let target = if keys.clock.matches(key) {
            ThemeId::Clock
        } else if keys.candle.matches(key) {
            ThemeId::Candle
        } else if keys.ice.matches(key) {
            ThemeId::Ice
        } else if keys.next_theme.matches(key) {
            self.controller.active_id().unwrap_or_default().next()
        } else {
            return None;
        };
        self.switch(target)
    }

    fn presets_view(&self) -> String {
        let Some(theme) = self.controller.active() else {
            return String::new();
        };
        let normal = Style::new().foreground(Color::from("#9AA5B1"));
        let selected = Style::new().bold(true).foreground(Color::from("#FFB347"));
        theme
            .presets()
            .iter()
            .enumerate()
            .map(|(i, &minutes)| {
                let label = format!("[{}] {}", i + 1, presets::label(minutes));
                if theme.selected() == Some(minutes) {
                    selected.render(&label)
                } else {
                    normal.render(&label)
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
    }
}

impl BubbleTeaModel for App {
    fn init() -> (Self, Option<Cmd>) {
        let startup = STARTUP.get().cloned().unwrap_or_default();
        let ctx = ThemeContext::new(startup.clock, startup.config);
        let (mut app, mount) = App::new(ctx, startup.theme);
        let start = startup.start_minutes.and_then(|m| app.start(m));
        let cmds: Vec<Cmd> = [mount, start].into_iter().flatten().collect();
        let cmd = if cmds.is_empty() {
            None
        } else {
            Some(batch(cmds))
        };
        (app, cmd)
    }

    fn update(&mut self, msg: Msg) -> Option<Cmd> {
        if let Some(key) = msg.downcast_ref::<KeyMsg>() {
            return self.handle_key(key);
        }
        self.controller.update(&msg)
    }

    fn view(&self) -> String {
        let title = self
            .controller
            .active_id()
            .map(|id| Style::new().bold(true).render(id.name()))
            .unwrap_or_default();
        let mut out = vec![title, String::new(), self.controller.view(), String::new()];
        out.push(self.presets_view());
        if let Some(status) = &self.status {
            out.push(Style::new().foreground(Color::from("#FF6B6B")).render(status));
        }
        out.push(String::new());
        out.push(Style::new().foreground(Color::from("#626262")).render(&self.keys.help()));
        out.join("\n")
    }
}
