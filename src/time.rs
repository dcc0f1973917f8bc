//! Wall-clock sources.
//!
//! Countdowns anchor to an absolute end time and recompute the remaining time
//! from `end - now` on every check, so the source of "now" is injected. The
//! application uses [`SystemClock`]; tests drive a [`ManualClock`] forward by
//! hand and never sleep.

use chrono::{DateTime, Local, NaiveTime, Utc};
use std::fmt::Debug;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// A source of the current time.
pub trait Clock: Send + Sync + Debug {
    /// Milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;

    /// Local time of day, used by the analog clock face.
    fn local_time(&self) -> NaiveTime;
}

/// Shared handle to a clock, cloned into every component that needs one.
pub type SharedClock = Arc<dyn Clock>;

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn local_time(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// Returns the process clock.
pub fn system() -> SharedClock {
    Arc::new(SystemClock)
}

/// A clock that only moves when told to.
///
/// Local time is the UTC time of day of the current instant.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicI64,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Arc<Self> {
        Arc::new(Self {
            now_ms: AtomicI64::new(start_ms),
        })
    }

    pub fn set_ms(&self, ms: i64) {
        self.now_ms.store(ms, Ordering::SeqCst);
    }

    pub fn advance_ms(&self, ms: i64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn advance_secs(&self, secs: i64) {
        self.advance_ms(secs * 1000);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }

    fn local_time(&self) -> NaiveTime {
        DateTime::<Utc>::from_timestamp_millis(self.now_ms())
            .map(|dt| dt.time())
            .unwrap_or_default()
    }
}
