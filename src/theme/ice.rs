//! Melting ice theme.
//!
//! The block melts as the countdown progresses: it sinks, squashes and
//! spreads at the base while a puddle grows beneath it. The surface turns
//! glossier and clearer as it melts, which the renderer shows by switching
//! to lighter fill characters.

use super::{center, Theme, ThemeContext, ThemeId, TimerSession};
use crate::countdown::{format_mm_ss, Status};
use crate::error::{Result, TimerError};
use crate::frame;
use crate::presets::{self, ICE_PRESETS};
use crate::visual::{ice_pose, IcePose};
use bubbletea_rs::{Cmd, Msg};
use lipgloss_extras::prelude::*;

/// Length of the session shown before a preset is picked.
pub const DEFAULT_MINUTES: u32 = 35;

const BLOCK_ROWS: usize = 6;
const BLOCK_COLS: usize = 10;
const WIDTH: usize = 21;

/// Ice block that melts into a puddle over the countdown.
#[derive(Debug)]
pub struct IceTheme {
    ctx: ThemeContext,
    session: Option<TimerSession>,
    frames: frame::Model,
    pose: IcePose,
    mounted: bool,
}

impl IceTheme {
    pub fn new(ctx: ThemeContext) -> Self {
        let frames = frame::new(ctx.config.frame_rate);
        Self {
            ctx,
            session: None,
            frames,
            pose: ice_pose(0.0),
            mounted: false,
        }
    }

    /// Block geometry as of the last frame.
    pub fn pose(&self) -> IcePose {
        self.pose
    }

    pub fn session(&self) -> Option<&TimerSession> {
        self.session.as_ref()
    }

    pub fn frames(&self) -> &frame::Model {
        &self.frames
    }

    fn readout(&self) -> String {
        match self.session.as_ref().map(|s| s.display()) {
            Some(display) if display.visible => display.text.clone(),
            _ => format_mm_ss(presets::to_seconds(DEFAULT_MINUTES)),
        }
    }

    fn block_lines(&self) -> Vec<String> {
        let pose = &self.pose;
        let rows = ((BLOCK_ROWS as f64 * pose.squash).round() as usize).max(1);
        let sunk = (-pose.sink * 4.0).round() as usize;
        let fill = if pose.roughness > 0.1 {
            "█"
        } else if pose.roughness > 0.05 {
            "▓"
        } else {
            "▒"
        };

        let mut lines = vec![String::new(); BLOCK_ROWS - rows + sunk];
        for row in 0..rows {
            // Spread grows toward the base of the block.
            let depth = if rows > 1 {
                row as f64 / (rows - 1) as f64
            } else {
                1.0
            };
            let widen = 1.0 + (pose.spread - 1.0) * depth;
            let cols = (BLOCK_COLS as f64 * widen).round() as usize;
            lines.push(fill.repeat(cols.min(WIDTH)));
        }
        let puddle = ((WIDTH as f64) * pose.melt).round() as usize;
        lines.push("~".repeat(puddle.max(BLOCK_COLS).min(WIDTH)));
        lines
    }
}

impl Theme for IceTheme {
    fn id(&self) -> ThemeId {
        ThemeId::Ice
    }

    fn presets(&self) -> &'static [u32] {
        &ICE_PRESETS
    }

    fn mount(&mut self) -> Result<Option<Cmd>> {
        if self.mounted {
            return Ok(None);
        }
        self.session = Some(TimerSession::new(&self.ctx));
        self.pose = ice_pose(0.0);
        self.mounted = true;
        tracing::debug!(theme = %ThemeId::Ice, fps = self.frames.fps(), "mounted");
        Ok(Some(self.frames.start()))
    }

    fn unmount(&mut self) -> Result<()> {
        self.frames.stop();
        if let Some(mut session) = self.session.take() {
            session.stop();
        }
        if self.mounted {
            tracing::debug!(theme = %ThemeId::Ice, "unmounted");
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
        let (_, cmd) = session.start(presets::to_seconds(minutes))?;
        self.pose = ice_pose(0.0);
        Ok(Some(cmd))
    }

    fn stop_timer(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.stop();
        }
    }

    fn update(&mut self, msg: &Msg) -> Option<Cmd> {
        if let Some((_, next)) = self.frames.update(msg) {
            if let Some(session) = self.session.as_ref() {
                if session.countdown().status() != Status::Idle {
                    self.pose = ice_pose(session.countdown().progress());
                }
            }
            return Some(next);
        }
        self.session.as_mut()?.update(msg).cmd
    }

    fn view(&self) -> String {
        let ice = Style::new().foreground(Color::from("#A5F2F3"));
        let water = Style::new().foreground(Color::from("#4A90D9"));
        let mut lines: Vec<String> = Vec::new();
        let mut block = self.block_lines();
        let puddle = block.pop().unwrap_or_default();
        for line in block {
            lines.push(ice.render(&center(&line, WIDTH)));
        }
        lines.push(water.render(&center(&puddle, WIDTH)));
        lines.push(String::new());
        lines.push(Style::new().bold(true).render(&center(&self.readout(), WIDTH)));
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
