//! Melting candle theme.
//!
//! A frame loop drives the scene: every frame reads the countdown's progress
//! and burns the candle down to match, while the flame flickers. When the
//! countdown finishes the flame fades out over a fixed span of frame time.
//! The headline shows whole minutes left and the sub-line the exact `MM:SS`.

use super::{center, Theme, ThemeContext, ThemeId, TimerSession};
use crate::countdown::{format_mm_ss, Event, Status};
use crate::error::{Result, TimerError};
use crate::frame;
use crate::presets::{self, CANDLE_PRESETS};
use crate::visual::{candle_pose, flame_flicker, CandlePose, Flame, FlameFade, FLAME_SCALE};
use bubbletea_rs::{Cmd, Msg};
use lipgloss_extras::prelude::*;

/// Preset highlighted before one is picked.
pub const DEFAULT_MINUTES: u32 = 25;
/// Sub-line shown until a countdown reports.
pub const IDLE_SUBTITLE: &str = "Focus Session";

/// Wax rows drawn for a fresh candle.
const WAX_ROWS: usize = 10;
const WIDTH: usize = 15;

/// Candle that burns down over the countdown.
#[derive(Debug)]
pub struct CandleTheme {
    ctx: ThemeContext,
    session: Option<TimerSession>,
    frames: frame::Model,
    pose: CandlePose,
    flame: Flame,
    fade: Option<FlameFade>,
    scene_time: f64,
    headline: u32,
    subtitle: String,
    selected: u32,
    mounted: bool,
}

impl CandleTheme {
    pub fn new(ctx: ThemeContext) -> Self {
        let frames = frame::new(ctx.config.frame_rate);
        Self {
            ctx,
            session: None,
            frames,
            pose: CandlePose::full(),
            flame: Flame::default(),
            fade: None,
            scene_time: 0.0,
            headline: DEFAULT_MINUTES,
            subtitle: IDLE_SUBTITLE.to_string(),
            selected: DEFAULT_MINUTES,
            mounted: false,
        }
    }

    /// Candle geometry as of the last frame.
    pub fn pose(&self) -> CandlePose {
        self.pose
    }

    pub fn flame(&self) -> Flame {
        self.flame
    }

    /// Whole minutes shown in the headline.
    pub fn headline(&self) -> u32 {
        self.headline
    }

    /// [`IDLE_SUBTITLE`] until the first report, then the exact `MM:SS`.
    pub fn subtitle(&self) -> &str {
        &self.subtitle
    }

    /// The timer session, present while mounted.
    pub fn session(&self) -> Option<&TimerSession> {
        self.session.as_ref()
    }

    pub fn frames(&self) -> &frame::Model {
        &self.frames
    }

    fn reset_scene(&mut self) {
        self.pose = CandlePose::full();
        self.flame = Flame::default();
        self.fade = None;
    }

    fn on_frame(&mut self, dt: f64) {
        self.scene_time += dt;
        if let Some(session) = self.session.as_ref() {
            if session.countdown().running() {
                self.pose = candle_pose(session.countdown().progress());
            }
        }
        if let Some(fade) = self.fade.as_mut() {
            self.flame = fade.advance(dt);
            if fade.done() {
                self.fade = None;
            }
        } else if self.flame.visible {
            self.flame.intensity = flame_flicker(self.scene_time);
        }
    }

    fn on_event(&mut self, event: Event) {
        match event {
            Event::Tick { remaining } => {
                self.headline = ((remaining + 59) / 60) as u32;
                self.subtitle = format_mm_ss(remaining);
            }
            Event::Finished => {
                self.headline = 0;
                self.subtitle = format_mm_ss(0);
                self.pose = candle_pose(1.0);
                self.fade = Some(FlameFade::new(self.flame, self.ctx.config.flame_fade_secs));
                tracing::info!(theme = %ThemeId::Candle, "candle burned out");
            }
        }
    }

    fn flame_lines(&self) -> [String; 2] {
        let style = Style::new().foreground(Color::from("#FFB347"));
        if !self.flame.visible {
            return [" ".repeat(WIDTH), " ".repeat(WIDTH)];
        }
        let (top, bottom) = if self.flame.scale >= FLAME_SCALE * 0.6 {
            ("(", "/ \\")
        } else if self.flame.scale >= FLAME_SCALE * 0.3 {
            ("", "( )")
        } else {
            ("", ".")
        };
        [
            style.render(&center(top, WIDTH)),
            style.render(&center(bottom, WIDTH)),
        ]
    }

    fn wax_rows(&self) -> usize {
        (self.pose.height_scale * WAX_ROWS as f64).round() as usize
    }
}

impl Theme for CandleTheme {
    fn id(&self) -> ThemeId {
        ThemeId::Candle
    }

    fn presets(&self) -> &'static [u32] {
        &CANDLE_PRESETS
    }

    fn selected(&self) -> Option<u32> {
        Some(self.selected)
    }

    fn mount(&mut self) -> Result<Option<Cmd>> {
        if self.mounted {
            return Ok(None);
        }
        self.session = Some(TimerSession::new(&self.ctx));
        self.reset_scene();
        self.headline = self.selected;
        self.subtitle = IDLE_SUBTITLE.to_string();
        self.mounted = true;
        tracing::debug!(theme = %ThemeId::Candle, fps = self.frames.fps(), "mounted");
        Ok(Some(self.frames.start()))
    }

    fn unmount(&mut self) -> Result<()> {
        self.frames.stop();
        if let Some(mut session) = self.session.take() {
            session.stop();
        }
        if self.mounted {
            tracing::debug!(theme = %ThemeId::Candle, "unmounted");
        }
        self.mounted = false;
        Ok(())
    }

    fn is_mounted(&self) -> bool {
        self.mounted
    }

    fn start_timer(&mut self, minutes: u32) -> Result<Option<Cmd>> {
        let minutes = presets::validate_minutes(i64::from(minutes))?;
        let session = self.session.as_mut().ok_or(TimerError::NoActiveTheme)?;
        let (first, cmd) = session.start(presets::to_seconds(minutes))?;
        self.selected = minutes;
        self.reset_scene();
        self.on_event(first);
        Ok(Some(cmd))
    }

    fn stop_timer(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.stop();
        }
    }

    fn update(&mut self, msg: &Msg) -> Option<Cmd> {
        if let Some((dt, next)) = self.frames.update(msg) {
            self.on_frame(dt);
            return Some(next);
        }
        let update = self.session.as_mut()?.update(msg);
        if let Some(event) = update.event {
            self.on_event(event);
        }
        update.cmd
    }

    fn view(&self) -> String {
        let wax = Style::new().foreground(Color::from("#F3E5AB"));
        let wick = Style::new().foreground(Color::from("#5C4033"));
        let mut lines = Vec::with_capacity(WAX_ROWS + 8);

        let rows = self.wax_rows();
        for _ in rows..WAX_ROWS {
            lines.push(" ".repeat(WIDTH));
        }
        lines.extend(self.flame_lines());
        lines.push(wick.render(&center("|", WIDTH)));
        if rows == 0 {
            lines.push(wax.render(&center("▁▁▁▁▁", WIDTH)));
        }
        for _ in 0..rows {
            lines.push(wax.render(&center("█████", WIDTH)));
        }
        lines.push(center("▔▔▔▔▔▔▔▔▔", WIDTH));
        lines.push(String::new());

        let headline = Style::new()
            .bold(true)
            .render(&center(&format!("{}min", self.headline), WIDTH));
        lines.push(headline);
        lines.push(center(&self.subtitle, WIDTH));
        lines.join("\n")
    }

    fn countdown_status(&self) -> Status {
        self.session
            .as_ref()
            .map(|s| s.countdown().status())
            .unwrap_or_default()
    }

    fn progress(&self) -> f64 {
        self.session
            .as_ref()
            .map(|s| s.countdown().progress())
            .unwrap_or(0.0)
    }

    fn frames_scheduled(&self) -> u64 {
        self.frames.scheduled()
    }
}
