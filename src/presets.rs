//! Preset countdown lengths offered by each theme.
//!
//! Preset values arrive as text (from key maps, config or a command line) and
//! are validated here, before anything reaches a countdown.

use crate::error::{Result, TimerError};

/// Minutes offered by the clock theme.
pub const CLOCK_PRESETS: [u32; 6] = [5, 10, 30, 45, 60, 90];

/// Minutes offered by the candle theme.
pub const CANDLE_PRESETS: [u32; 6] = [5, 10, 25, 45, 60, 90];

/// Minutes offered by the ice theme.
pub const ICE_PRESETS: [u32; 6] = CANDLE_PRESETS;

/// Parses a preset value in whole minutes.
///
/// ```rust
/// use themed_timers::presets::parse_minutes;
///
/// assert_eq!(parse_minutes("25").unwrap(), 25);
/// assert!(parse_minutes("0").is_err());
/// assert!(parse_minutes("-5").is_err());
/// assert!(parse_minutes("soon").is_err());
/// ```
pub fn parse_minutes(raw: &str) -> Result<u32> {
    let trimmed = raw.trim();
    let minutes: i64 = trimmed
        .parse()
        .map_err(|_| TimerError::invalid_duration(format!("`{trimmed}` is not a whole number of minutes")))?;
    validate_minutes(minutes)
}

/// Accepts 1 minute up to one day.
pub fn validate_minutes(minutes: i64) -> Result<u32> {
    if minutes <= 0 {
        return Err(TimerError::invalid_duration(format!(
            "{minutes} minutes is not a positive duration"
        )));
    }
    if minutes > 24 * 60 {
        return Err(TimerError::invalid_duration(format!(
            "{minutes} minutes is longer than a day"
        )));
    }
    Ok(minutes as u32)
}

pub fn to_seconds(minutes: u32) -> i64 {
    i64::from(minutes) * 60
}

/// Button label, e.g. `25min`.
pub fn label(minutes: u32) -> String {
    format!("{minutes}min")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_presets_differ_where_expected() {
        assert!(CLOCK_PRESETS.contains(&30));
        assert!(!CANDLE_PRESETS.contains(&30));
        assert!(CANDLE_PRESETS.contains(&25));
    }

    #[test]
    fn parse_accepts_surrounding_whitespace() {
        assert_eq!(parse_minutes(" 45 ").unwrap(), 45);
    }

    #[test]
    fn parse_rejects_bad_input() {
        for bad in ["", "abc", "1.5", "0", "-5", "100000"] {
            assert!(
                matches!(parse_minutes(bad), Err(TimerError::InvalidDuration(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn seconds_and_labels() {
        assert_eq!(to_seconds(5), 300);
        assert_eq!(label(90), "90min");
    }
}
