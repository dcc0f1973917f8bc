//! Error type shared by every component in the crate.

use crate::theme::ThemeId;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TimerError>;

#[derive(thiserror::Error, Debug)]
pub enum TimerError {
    /// A countdown was requested with a zero, negative or unparsable length.
    #[error("invalid duration: {0}")]
    InvalidDuration(String),

    /// The sound backend refused to play. Never fatal to a countdown.
    #[error("alarm playback denied for `{asset}`: {reason}")]
    PlaybackDenied { asset: String, reason: String },

    /// A theme failed to release its resources on unmount.
    #[error("failed to tear down theme `{theme}`: {reason}")]
    Teardown { theme: ThemeId, reason: String },

    #[error("no theme is mounted")]
    NoActiveTheme,

    #[error("unknown theme: {0}")]
    UnknownTheme(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TimerError {
    pub fn invalid_duration(msg: impl Into<String>) -> Self {
        Self::InvalidDuration(msg.into())
    }

    pub fn playback_denied(asset: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PlaybackDenied {
            asset: asset.into(),
            reason: reason.into(),
        }
    }

    pub fn teardown(theme: ThemeId, reason: impl Into<String>) -> Self {
        Self::Teardown {
            theme,
            reason: reason.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(TimerError::invalid_duration("0")
            .to_string()
            .contains("invalid duration:"));
        assert!(TimerError::playback_denied("alarm.mp3", "no device")
            .to_string()
            .contains("alarm.mp3"));
        assert!(TimerError::teardown(ThemeId::Candle, "boom")
            .to_string()
            .contains("candle"));
        assert!(TimerError::config("x")
            .to_string()
            .contains("configuration error:"));
    }

    #[test]
    fn io_errors_convert() {
        let err: TimerError = std::io::Error::other("disk gone").into();
        assert!(err.to_string().contains("disk gone"));
    }
}
