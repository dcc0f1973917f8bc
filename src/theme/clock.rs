//! Analog clock theme.
//!
//! Shows the wall clock as a text dial with a digital countdown overlay. The
//! hands are refreshed once per second by a tagged [`ClockTickMsg`]; the
//! overlay shows `MM:SS` while counting, `Done!` on finish, and is hidden
//! a few seconds later.

use super::{center, Theme, ThemeContext, ThemeId, TimerSession};
use crate::clock::{angles, dial, Hands};
use crate::countdown::Status;
use crate::error::{Result, TimerError};
use crate::presets::{self, CLOCK_PRESETS};
use bubbletea_rs::{tick as bubbletea_tick, Cmd, Msg};
use lipgloss_extras::prelude::*;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

static LAST_ID: AtomicI64 = AtomicI64::new(0);

fn next_id() -> i64 {
    LAST_ID.fetch_add(1, Ordering::SeqCst) + 1
}

const DIAL_RADIUS: usize = 6;
const REFRESH: Duration = Duration::from_secs(1);

/// Once-per-second refresh of the clock face.
#[derive(Debug, Clone)]
pub struct ClockTickMsg {
    /// The clock theme this refresh belongs to.
    pub id: i64,
    tag: i64,
}

/// Analog clock with a countdown overlay.
#[derive(Debug)]
pub struct ClockTheme {
    ctx: ThemeContext,
    session: Option<TimerSession>,
    hands: Hands,
    id: i64,
    tag: i64,
    mounted: bool,
    refreshes: u64,
}

impl ClockTheme {
    pub fn new(ctx: ThemeContext) -> Self {
        Self {
            ctx,
            session: None,
            hands: Hands::default(),
            id: next_id(),
            tag: 0,
            mounted: false,
            refreshes: 0,
        }
    }

    /// Hand fractions as of the last refresh.
    pub fn hands(&self) -> Hands {
        self.hands
    }

    /// The timer session, present while mounted.
    pub fn session(&self) -> Option<&TimerSession> {
        self.session.as_ref()
    }

    /// Builds the refresh message this theme currently accepts.
    pub fn tick_msg(&self) -> ClockTickMsg {
        ClockTickMsg {
            id: self.id,
            tag: self.tag,
        }
    }

    fn refresh_hands(&mut self) {
        self.hands = angles(&self.ctx.clock.local_time());
    }

    fn schedule_refresh(&mut self) -> Cmd {
        self.refreshes += 1;
        let id = self.id;
        let tag = self.tag;
        bubbletea_tick(REFRESH, move |_| Box::new(ClockTickMsg { id, tag }) as Msg)
    }

    fn overlay(&self, width: usize) -> String {
        match self.session.as_ref().map(|s| s.display()) {
            Some(display) if display.visible => Style::new()
                .bold(true)
                .foreground(Color::from("#F5F5F5"))
                .render(&center(&display.text, width)),
            _ => String::new(),
        }
    }
}

impl Theme for ClockTheme {
    fn id(&self) -> ThemeId {
        ThemeId::Clock
    }

    fn presets(&self) -> &'static [u32] {
        &CLOCK_PRESETS
    }

    fn mount(&mut self) -> Result<Option<Cmd>> {
        if self.mounted {
            return Ok(None);
        }
        self.session = Some(TimerSession::new(&self.ctx).with_fade(self.ctx.config.display_fade()));
        self.tag += 1;
        self.mounted = true;
        self.refresh_hands();
        tracing::debug!(theme = %ThemeId::Clock, "mounted");
        Ok(Some(self.schedule_refresh()))
    }

    fn unmount(&mut self) -> Result<()> {
        self.tag += 1;
        if let Some(mut session) = self.session.take() {
            session.stop();
        }
        if self.mounted {
            tracing::debug!(theme = %ThemeId::Clock, "unmounted");
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
        Ok(Some(cmd))
    }

    fn stop_timer(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.stop();
        }
    }

    fn update(&mut self, msg: &Msg) -> Option<Cmd> {
        if let Some(tick) = msg.downcast_ref::<ClockTickMsg>() {
            if !self.mounted || tick.id != self.id || tick.tag != self.tag {
                return None;
            }
            self.refresh_hands();
            return Some(self.schedule_refresh());
        }
        self.session.as_mut()?.update(msg).cmd
    }

    fn view(&self) -> String {
        let face = dial(&self.hands, DIAL_RADIUS);
        let width = face.first().map(|l| l.chars().count()).unwrap_or_default();
        let rim = Style::new().foreground(Color::from("#9AA5B1"));
        let mut lines: Vec<String> = face.iter().map(|line| rim.render(line)).collect();
        lines.push(String::new());
        lines.push(self.overlay(width));
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
        self.refreshes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::Silent;
    use crate::config::Config;
    use crate::time::ManualClock;
    use std::sync::Arc;

    // 1970-01-01 03:00:00 UTC
    const THREE_OCLOCK_MS: i64 = 3 * 3600 * 1000;

    fn theme() -> (Arc<ManualClock>, ClockTheme) {
        let clock = ManualClock::new(THREE_OCLOCK_MS);
        let ctx = ThemeContext::new(clock.clone(), Config::default())
            .with_sounds(|_| Box::new(Silent::default()));
        (clock, ClockTheme::new(ctx))
    }

    fn plain(s: &str) -> String {
        strip_ansi_escapes::strip_str(s)
    }

    #[test]
    fn mount_reads_hands_and_schedules_refresh() {
        let (_, mut theme) = theme();
        assert!(theme.mount().unwrap().is_some());
        assert!(theme.is_mounted());
        assert_eq!(theme.hands().hour, 0.25);
        assert_eq!(theme.frames_scheduled(), 1);
        assert!(theme.mount().unwrap().is_none());
        assert_eq!(theme.frames_scheduled(), 1);
    }

    #[test]
    fn refresh_moves_hands_each_second() {
        let (clock, mut theme) = theme();
        theme.mount().unwrap();
        clock.advance_secs(15);
        let msg: Msg = Box::new(theme.tick_msg());
        assert!(theme.update(&msg).is_some());
        assert_eq!(theme.hands().second, 0.25);
        assert_eq!(theme.frames_scheduled(), 2);
    }

    #[test]
    fn unmount_stops_refresh() {
        let (_, mut theme) = theme();
        theme.mount().unwrap();
        let pending: Msg = Box::new(theme.tick_msg());
        theme.unmount().unwrap();
        theme.unmount().unwrap();
        assert!(theme.update(&pending).is_none());
        assert_eq!(theme.frames_scheduled(), 1);
        assert!(theme.session().is_none());
    }

    #[test]
    fn start_requires_mount() {
        let (_, mut theme) = theme();
        assert!(matches!(
            theme.start_timer(5),
            Err(TimerError::NoActiveTheme)
        ));
    }

    #[test]
    fn overlay_counts_down_then_says_done() {
        let (clock, mut theme) = theme();
        theme.mount().unwrap();
        theme.start_timer(5).unwrap();
        assert!(plain(&theme.view()).contains("05:00"));
        assert_eq!(theme.countdown_status(), Status::Running);

        for _ in 0..301 {
            clock.advance_secs(1);
            let msg: Msg = Box::new(theme.session().unwrap().countdown().tick_msg());
            theme.update(&msg);
        }
        assert_eq!(theme.countdown_status(), Status::Finished);
        assert!(plain(&theme.view()).contains("Done!"));
        assert_eq!(theme.progress(), 1.0);

        let fade: Msg = Box::new(theme.session().unwrap().fade_msg());
        theme.update(&fade);
        assert!(!plain(&theme.view()).contains("Done!"));
    }

    #[test]
    fn stop_silences_alarm() {
        let (clock, mut theme) = theme();
        theme.mount().unwrap();
        theme.start_timer(5).unwrap();
        clock.advance_secs(301);
        let msg: Msg = Box::new(theme.session().unwrap().countdown().tick_msg());
        theme.update(&msg);
        assert!(theme.session().unwrap().alarm().ringing());
        theme.stop_timer();
        assert!(!theme.session().unwrap().alarm().ringing());
    }
}
