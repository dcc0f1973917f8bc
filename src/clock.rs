//! Analog clock hands derived from the time of day.
//!
//! Each hand is a fraction of a full turn. The fractions chain: the minute
//! hand includes the second fraction and the hour hand includes the minute
//! fraction, so the slower hands creep continuously instead of jumping on
//! unit boundaries.
//!
//! ```rust
//! use chrono::NaiveTime;
//! use themed_timers::clock::angles;
//!
//! let hands = angles(&NaiveTime::from_hms_opt(3, 0, 0).unwrap());
//! assert_eq!(hands.hour, 0.25);
//! assert_eq!(hands.minute, 0.0);
//! ```

use chrono::Timelike;

/// Hand positions as fractions of a full turn, each in `[0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hands {
    pub hour: f64,
    pub minute: f64,
    pub second: f64,
}

impl Hands {
    /// Hand rotations in degrees clockwise from twelve o'clock.
    pub fn degrees(&self) -> (f64, f64, f64) {
        (self.hour * 360.0, self.minute * 360.0, self.second * 360.0)
    }
}

/// Computes hand fractions for a time of day.
pub fn angles<T: Timelike>(now: &T) -> Hands {
    let second = now.second() as f64 / 60.0;
    let minute = (second + now.minute() as f64) / 60.0;
    let hour = (minute + (now.hour() % 12) as f64) / 12.0;
    Hands {
        hour,
        minute,
        second,
    }
}

const HOUR_MARKS: [(u32, &str); 4] = [(0, "12"), (3, "3"), (6, "6"), (9, "9")];

/// Draws a text dial of the given radius (in rows).
///
/// Columns are doubled so the face looks round in a terminal cell grid.
/// Hands are drawn shortest last, so the hour hand stays visible where it
/// overlaps the others.
pub fn dial(hands: &Hands, radius: usize) -> Vec<String> {
    let radius = radius.max(2);
    let rows = radius * 2 + 1;
    let cols = radius * 4 + 1;
    let (cy, cx) = (radius as f64, (radius * 2) as f64);
    let mut grid = vec![vec![' '; cols]; rows];

    let plot = |grid: &mut Vec<Vec<char>>, turn: f64, r: f64, ch: char| {
        let theta = turn * std::f64::consts::TAU;
        let y = (cy - r * theta.cos()).round();
        let x = (cx + 2.0 * r * theta.sin()).round();
        if y >= 0.0 && x >= 0.0 && (y as usize) < rows && (x as usize) < cols {
            grid[y as usize][x as usize] = ch;
        }
    };

    // Rim.
    for step in 0..60 {
        plot(&mut grid, step as f64 / 60.0, radius as f64, '·');
    }

    let r = radius as f64;
    for (turn, len, ch) in [
        (hands.second, r * 0.9, '.'),
        (hands.minute, r * 0.8, '*'),
        (hands.hour, r * 0.5, '#'),
    ] {
        let steps = (len * 4.0).ceil() as usize;
        for i in 1..=steps {
            plot(&mut grid, turn, len * i as f64 / steps as f64, ch);
        }
    }

    let mut lines: Vec<String> = grid.into_iter().map(|row| row.into_iter().collect()).collect();

    for (hour, label) in HOUR_MARKS {
        let theta = hour as f64 / 12.0 * std::f64::consts::TAU;
        let y = (cy - r * theta.cos()).round() as usize;
        let x = (cx + 2.0 * r * theta.sin()).round() as usize;
        let line = &mut lines[y];
        let mut chars: Vec<char> = line.chars().collect();
        let start = x.saturating_sub(label.len() / 2).min(cols - label.len());
        for (i, c) in label.chars().enumerate() {
            chars[start + i] = c;
        }
        *line = chars.into_iter().collect();
    }

    let mut center: Vec<char> = lines[radius].chars().collect();
    center[radius * 2] = 'o';
    lines[radius] = center.into_iter().collect();

    lines
}
