//! Runtime configuration.
//!
//! Every knob has a default matching the behavior users expect out of the box:
//! one-second countdown checks, a 10 second alarm that loops until it silences
//! itself, and a 3 second fade of the clock's "Done!" overlay. A JSON file can
//! override any subset of the fields:
//!
//! ```json
//! { "default_theme": "candle", "alarm": { "auto_stop_ms": 5000 } }
//! ```

use crate::error::{Result, TimerError};
use crate::frame::MAX_FPS;
use crate::theme::ThemeId;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1_000;
pub const DEFAULT_FRAME_RATE: u32 = 60;
pub const DEFAULT_ALARM_AUTO_STOP_MS: u64 = 10_000;
pub const DEFAULT_ALARM_PULSE_MS: u64 = 1_000;
pub const DEFAULT_DISPLAY_FADE_MS: u64 = 3_000;
pub const DEFAULT_FLAME_FADE_SECS: f64 = 1.0;
pub const DEFAULT_ALARM_ASSET: &str = "alarm.mp3";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmConfig {
    /// When false the alarm uses a silent backend.
    pub enabled: bool,
    /// Identifier of the loopable alarm sound.
    pub asset: String,
    /// How long an alarm rings before silencing itself.
    pub auto_stop_ms: u64,
    /// Spacing of loop pulses while ringing.
    pub pulse_ms: u64,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            asset: DEFAULT_ALARM_ASSET.to_string(),
            auto_stop_ms: DEFAULT_ALARM_AUTO_STOP_MS,
            pulse_ms: DEFAULT_ALARM_PULSE_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub default_theme: ThemeId,
    pub tick_interval_ms: u64,
    pub frame_rate: u32,
    pub display_fade_ms: u64,
    pub flame_fade_secs: f64,
    pub alarm: AlarmConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_theme: ThemeId::Clock,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            frame_rate: DEFAULT_FRAME_RATE,
            display_fade_ms: DEFAULT_DISPLAY_FADE_MS,
            flame_fade_secs: DEFAULT_FLAME_FADE_SECS,
            alarm: AlarmConfig::default(),
        }
    }
}

impl Config {
    /// Reads and validates a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json(&raw)
            .map_err(|e| TimerError::config(format!("{}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| TimerError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(TimerError::config("tick_interval_ms must be positive"));
        }
        if self.frame_rate == 0 || self.frame_rate > MAX_FPS {
            return Err(TimerError::config(format!(
                "frame_rate must be between 1 and {MAX_FPS}"
            )));
        }
        if self.display_fade_ms == 0 {
            return Err(TimerError::config("display_fade_ms must be positive"));
        }
        if self.alarm.auto_stop_ms == 0 {
            return Err(TimerError::config("alarm.auto_stop_ms must be positive"));
        }
        if self.alarm.pulse_ms == 0 {
            return Err(TimerError::config("alarm.pulse_ms must be positive"));
        }
        if !(self.flame_fade_secs.is_finite() && self.flame_fade_secs > 0.0) {
            return Err(TimerError::config("flame_fade_secs must be positive"));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn display_fade(&self) -> Duration {
        Duration::from_millis(self.display_fade_ms)
    }

    pub fn alarm_auto_stop(&self) -> Duration {
        Duration::from_millis(self.alarm.auto_stop_ms)
    }

    pub fn alarm_pulse(&self) -> Duration {
        Duration::from_millis(self.alarm.pulse_ms)
    }
}
