//! Render loop component.
//!
//! A frame loop schedules one [`FrameMsg`] per frame while it is running. The
//! owning theme calls [`Model::update`] with each message and receives the
//! fixed frame step along with the command for the next frame. Stopping the
//! loop invalidates any frame already in flight, so after `stop` no further
//! frame is ever scheduled by this instance.

use bubbletea_rs::{tick as bubbletea_tick, Cmd, Msg};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

// Internal ID management for frame loop instances
static LAST_ID: AtomicI64 = AtomicI64::new(0);

fn next_id() -> i64 {
    LAST_ID.fetch_add(1, Ordering::SeqCst) + 1
}

pub const DEFAULT_FPS: u32 = 60;
/// Highest frame rate a loop runs at. Higher requests are clamped.
pub const MAX_FPS: u32 = 240;

/// Message delivered once per frame to the loop that scheduled it.
#[derive(Debug, Clone)]
pub struct FrameMsg {
    /// The loop this frame belongs to.
    pub id: i64,
    tag: i64,
}

/// A start/stop render loop.
#[derive(Debug, Clone)]
pub struct Model {
    fps: u32,
    id: i64,
    tag: i64,
    running: bool,
    frame: u64,
    scheduled: u64,
}

/// Creates a stopped loop running at `fps`, clamped to `1..=MAX_FPS`.
///
/// ```rust
/// use themed_timers::frame::{self, MAX_FPS};
///
/// let frames = frame::new(30);
/// assert!(!frames.running());
/// assert_eq!(frames.step(), 1.0 / 30.0);
/// assert_eq!(frame::new(u32::MAX).fps(), MAX_FPS);
/// ```
pub fn new(fps: u32) -> Model {
    Model {
        fps: fps.clamp(1, MAX_FPS),
        id: next_id(),
        tag: 0,
        running: false,
        frame: 0,
        scheduled: 0,
    }
}

impl Default for Model {
    fn default() -> Self {
        new(DEFAULT_FPS)
    }
}

impl Model {
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Whether frames are currently being scheduled.
    pub fn running(&self) -> bool {
        self.running
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Seconds of scene time advanced per frame.
    pub fn step(&self) -> f64 {
        1.0 / self.fps as f64
    }

    /// Frames handled since creation.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Frame commands issued since creation.
    pub fn scheduled(&self) -> u64 {
        self.scheduled
    }

    /// Starts (or restarts) the loop and returns the first frame command.
    pub fn start(&mut self) -> Cmd {
        self.tag += 1;
        self.running = true;
        self.next_frame()
    }

    /// Stops the loop. Safe to repeat.
    pub fn stop(&mut self) {
        self.tag += 1;
        self.running = false;
    }

    /// Builds the frame message this loop currently accepts.
    pub fn frame_msg(&self) -> FrameMsg {
        FrameMsg {
            id: self.id,
            tag: self.tag,
        }
    }

    fn next_frame(&mut self) -> Cmd {
        self.scheduled += 1;
        let id = self.id;
        let tag = self.tag;
        let duration = Duration::from_nanos(1_000_000_000 / self.fps as u64);
        bubbletea_tick(duration, move |_| Box::new(FrameMsg { id, tag }) as Msg)
    }

    /// Accepts a frame message, returning the frame step and the next frame.
    pub fn update(&mut self, msg: &Msg) -> Option<(f64, Cmd)> {
        let frame_msg = msg.downcast_ref::<FrameMsg>()?;
        if !self.running || frame_msg.id != self.id || frame_msg.tag != self.tag {
            return None;
        }
        self.frame += 1;
        Some((self.step(), self.next_frame()))
    }
}
