//! Theme switching through the controller, driven by the commands the themes
//! actually schedule.

use bubbletea_rs::{Cmd, Msg};
use std::sync::{Arc, Mutex};
use themed_timers::alarm::Sound;
use themed_timers::countdown::Status;
use themed_timers::prelude::*;
use themed_timers::theme;
use themed_timers::time::ManualClock;

#[derive(Debug, Clone, Default)]
struct Recorder {
    calls: Arc<Mutex<Vec<&'static str>>>,
    playing: bool,
}

impl Sound for Recorder {
    fn play(&mut self) -> Result<()> {
        self.calls.lock().unwrap().push("play");
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.calls.lock().unwrap().push("pause");
        self.playing = false;
    }

    fn rewind(&mut self) {}

    fn set_looping(&mut self, _looping: bool) {}

    fn is_playing(&self) -> bool {
        self.playing
    }
}

fn context(clock: Arc<ManualClock>, calls: Arc<Mutex<Vec<&'static str>>>) -> ThemeContext {
    ThemeContext::new(clock, Config::default()).with_sounds(move |_| {
        Box::new(Recorder {
            calls: calls.clone(),
            playing: false,
        })
    })
}

/// Leaves its inner theme running when asked to unmount.
struct StuckTheme(Box<dyn Theme>);

impl Theme for StuckTheme {
    fn id(&self) -> ThemeId {
        self.0.id()
    }

    fn presets(&self) -> &'static [u32] {
        self.0.presets()
    }

    fn mount(&mut self) -> Result<Option<Cmd>> {
        self.0.mount()
    }

    fn unmount(&mut self) -> Result<()> {
        Err(TimerError::teardown(self.0.id(), "renderer did not stop"))
    }

    fn is_mounted(&self) -> bool {
        self.0.is_mounted()
    }

    fn start_timer(&mut self, minutes: u32) -> Result<Option<Cmd>> {
        self.0.start_timer(minutes)
    }

    fn stop_timer(&mut self) {
        self.0.stop_timer()
    }

    fn update(&mut self, msg: &Msg) -> Option<Cmd> {
        self.0.update(msg)
    }

    fn view(&self) -> String {
        self.0.view()
    }

    fn countdown_status(&self) -> Status {
        self.0.countdown_status()
    }

    fn progress(&self) -> f64 {
        self.0.progress()
    }

    fn frames_scheduled(&self) -> u64 {
        self.0.frames_scheduled()
    }
}

#[tokio::test(start_paused = true)]
async fn clock_refresh_does_not_survive_switch_to_candle() {
    let ctx = context(ManualClock::new(0), Arc::default());
    let mut controller = ThemeController::new(ctx);

    let refresh = controller.switch_to(ThemeId::Clock).unwrap().cmd.unwrap();
    let clock_tick = refresh.await.unwrap();

    let switch = controller.switch_to(ThemeId::Candle).unwrap();
    assert!(switch.teardown_error.is_none());
    let frame = switch.cmd.unwrap().await.unwrap();

    let candle = controller.active().unwrap();
    assert_eq!(candle.id(), ThemeId::Candle);
    assert_eq!(candle.frames_scheduled(), 1);

    assert!(controller.update(&clock_tick).is_none());
    assert_eq!(controller.active().unwrap().frames_scheduled(), 1);

    assert!(controller.update(&frame).is_some());
    assert_eq!(controller.active().unwrap().frames_scheduled(), 2);
}

#[tokio::test(start_paused = true)]
async fn stuck_theme_is_dropped_and_its_loop_dies() {
    let ctx = context(ManualClock::new(0), Arc::default());
    let build_ctx = ctx.clone();
    let mut controller = ThemeController::with_factory(move |id| {
        let built = theme::build(id, &build_ctx);
        if id == ThemeId::Candle {
            Box::new(StuckTheme(built))
        } else {
            built
        }
    });

    let candle_frame = controller
        .switch_to(ThemeId::Candle)
        .unwrap()
        .cmd
        .unwrap()
        .await
        .unwrap();

    let switch = controller.switch_to(ThemeId::Ice).unwrap();
    assert!(matches!(
        switch.teardown_error,
        Some(TimerError::Teardown {
            theme: ThemeId::Candle,
            ..
        })
    ));
    assert_eq!(controller.active_id(), Some(ThemeId::Ice));

    assert!(controller.update(&candle_frame).is_none());
    assert_eq!(controller.active().unwrap().frames_scheduled(), 1);
}

#[tokio::test(start_paused = true)]
async fn five_minute_clock_countdown_finishes_once() {
    let clock = ManualClock::new(0);
    let calls = Arc::new(Mutex::new(Vec::new()));
    let mut controller = ThemeController::new(context(clock.clone(), calls.clone()));
    controller.switch_to(ThemeId::Clock).unwrap();

    let mut cmd = controller.start_timer(5).unwrap().unwrap();
    let mut checks = 0;
    while controller.active().unwrap().countdown_status() == Status::Running {
        clock.advance_secs(1);
        let msg = cmd.await.unwrap();
        checks += 1;
        match controller.update(&msg) {
            Some(next) => cmd = next,
            None => panic!("countdown stopped scheduling checks after {checks} checks"),
        }
    }

    assert_eq!(checks, 301);
    let active = controller.active().unwrap();
    assert_eq!(active.countdown_status(), Status::Finished);
    assert_eq!(active.progress(), 1.0);
    assert!(strip_ansi_escapes::strip_str(active.view()).contains("Done!"));
    assert_eq!(
        calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| **c == "play")
            .count(),
        1
    );
}

#[test]
fn switching_releases_running_countdown_and_alarm() {
    let clock = ManualClock::new(0);
    let calls = Arc::new(Mutex::new(Vec::new()));
    let mut controller = ThemeController::new(context(clock, calls));

    controller.switch_to(ThemeId::Candle).unwrap();
    controller.start_timer(25).unwrap();
    assert_eq!(
        controller.active().unwrap().countdown_status(),
        Status::Running
    );

    controller.switch_to(ThemeId::Candle).unwrap();
    assert_eq!(controller.active().unwrap().countdown_status(), Status::Idle);
    assert_eq!(controller.switches(), 2);
}

#[test]
fn invalid_durations_never_start() {
    let mut controller = ThemeController::new(context(ManualClock::new(0), Arc::default()));
    controller.switch_to(ThemeId::Ice).unwrap();
    assert!(matches!(
        controller.start_timer(0),
        Err(TimerError::InvalidDuration(_))
    ));
    assert_eq!(controller.active().unwrap().countdown_status(), Status::Idle);
}
