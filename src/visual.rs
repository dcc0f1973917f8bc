//! Mapping from countdown progress to visual parameters.
//!
//! Everything here is a pure function of the progress fraction (and, for the
//! flame fade, of frame time). Themes call these once per rendered frame, not
//! once per countdown tick, so the visuals move smoothly even though the
//! digits only change once a second.

/// Height of a full candle in scene units.
pub const CANDLE_HEIGHT: f64 = 5.0;
/// Scene height of the candle's base.
pub const CANDLE_BOTTOM: f64 = -2.0;
/// A candle never shrinks below this fraction of its height.
pub const MIN_CANDLE_SCALE: f64 = 0.01;
/// Gap between the wick top and the flame's base.
pub const FLAME_OFFSET: f64 = 0.1;
/// Resting intensity of the flame light.
pub const FLAME_INTENSITY: f64 = 15.0;
/// Resting vertical stretch of the flame.
pub const FLAME_SCALE: f64 = 1.8;

/// Normalized completion of a countdown.
///
/// `1 - remaining / total`, clamped to `[0, 1]`. A non-positive total has no
/// meaningful progress and maps to 0.
///
/// ```rust
/// use themed_timers::visual::progress;
///
/// assert_eq!(progress(0.0, 100.0), 1.0);
/// assert_eq!(progress(100.0, 100.0), 0.0);
/// assert_eq!(progress(150.0, 100.0), 0.0);
/// assert_eq!(progress(25.0, 100.0), 0.75);
/// ```
pub fn progress(remaining: f64, total: f64) -> f64 {
    if !(total > 0.0) {
        return 0.0;
    }
    (1.0 - remaining / total).clamp(0.0, 1.0)
}

/// Linear interpolation between `a` and `b`.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Geometry of the candle for a given progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandlePose {
    /// Vertical scale of the wax body, `1.0` for a fresh candle.
    pub height_scale: f64,
    /// Scene height of the wick (the top of the wax).
    pub wick_y: f64,
    /// Scene height of the flame's base.
    pub flame_y: f64,
}

impl CandlePose {
    pub fn full() -> Self {
        candle_pose(0.0)
    }
}

/// The candle burns down as progress goes from 0 to 1.
pub fn candle_pose(progress: f64) -> CandlePose {
    let height_scale = (1.0 - progress.clamp(0.0, 1.0)).max(MIN_CANDLE_SCALE);
    let wick_y = CANDLE_BOTTOM + CANDLE_HEIGHT * height_scale;
    CandlePose {
        height_scale,
        wick_y,
        flame_y: wick_y + FLAME_OFFSET,
    }
}

/// Light intensity of a burning flame at scene time `time` (seconds).
pub fn flame_flicker(time: f64) -> f64 {
    let flicker = (time * 20.0).sin() * 0.1;
    (FLAME_INTENSITY + flicker * 5.0).max(0.0)
}

/// State of the candle flame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Flame {
    pub scale: f64,
    pub intensity: f64,
    pub visible: bool,
}

impl Default for Flame {
    fn default() -> Self {
        Self {
            scale: FLAME_SCALE,
            intensity: FLAME_INTENSITY,
            visible: true,
        }
    }
}

/// One-shot fade of the flame after the candle burns out.
///
/// Advanced by frame time; scale and intensity fall linearly to zero over
/// `duration` seconds, after which the flame is hidden.
#[derive(Debug, Clone, PartialEq)]
pub struct FlameFade {
    duration: f64,
    elapsed: f64,
    from: Flame,
}

impl FlameFade {
    pub fn new(from: Flame, duration: f64) -> Self {
        Self {
            duration,
            elapsed: 0.0,
            from,
        }
    }

    /// Advances the fade by `dt` seconds and returns the flame to draw.
    pub fn advance(&mut self, dt: f64) -> Flame {
        self.elapsed += dt;
        let alpha = if self.duration > 0.0 {
            (self.elapsed / self.duration).min(1.0)
        } else {
            1.0
        };
        if alpha >= 1.0 {
            return Flame {
                scale: 0.0,
                intensity: 0.0,
                visible: false,
            };
        }
        let s = 1.0 - alpha;
        Flame {
            scale: self.from.scale * s,
            intensity: self.from.intensity * s,
            visible: true,
        }
    }

    pub fn done(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Shape parameters of the melting ice block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IcePose {
    /// Melt factor, equal to progress.
    pub melt: f64,
    /// Vertical offset of the block as it settles.
    pub sink: f64,
    /// Vertical scale of the block.
    pub squash: f64,
    /// Horizontal spread at the base of the block.
    pub spread: f64,
    /// Surface roughness, glossier as it melts.
    pub roughness: f64,
    /// Light attenuation distance, clearer as it melts.
    pub attenuation: f64,
}

pub fn ice_pose(melt: f64) -> IcePose {
    let melt = melt.clamp(0.0, 1.0);
    IcePose {
        melt,
        sink: -0.5 * melt,
        squash: 1.0 - 0.6 * melt,
        spread: 1.0 + 0.5 * melt,
        roughness: lerp(0.15, 0.02, melt),
        attenuation: lerp(1.5, 5.0, melt),
    }
}
