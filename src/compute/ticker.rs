//! Fixed-cadence tick timer driven by elapsed wall time.

use std::time::Duration;

/// Recurring timer owned by the playback controller.
///
/// The host loop reports elapsed time with [`Ticker::accumulate`]; each
/// [`Ticker::fire`] consumes one due period. Time only accumulates while
/// armed, and cancelling drops whatever was pending.
#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    elapsed: Duration,
    armed: bool,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            elapsed: Duration::ZERO,
            armed: false,
        }
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Start a fresh period.
    pub fn arm(&mut self) {
        self.armed = true;
        self.elapsed = Duration::ZERO;
    }

    /// Disarm and discard any pending time.
    pub fn cancel(&mut self) {
        self.armed = false;
        self.elapsed = Duration::ZERO;
    }

    pub fn accumulate(&mut self, elapsed: Duration) {
        if self.armed {
            self.elapsed = self.elapsed.saturating_add(elapsed);
        }
    }

    /// Consume one due period. Returns false if nothing is due.
    pub fn fire(&mut self) -> bool {
        if !self.armed || self.interval.is_zero() || self.elapsed < self.interval {
            return false;
        }
        self.elapsed -= self.interval;
        true
    }

    /// Time left until the next tick, if armed.
    pub fn remaining(&self) -> Option<Duration> {
        self.armed.then(|| self.interval.saturating_sub(self.elapsed))
    }
}

/// Convert a host frame delta in milliseconds to a `Duration`.
///
/// Negative and NaN deltas count as zero; deltas too large for a
/// `Duration` (including infinity) saturate to `Duration::MAX`.
pub fn elapsed_from_millis(elapsed_ms: f64) -> Duration {
    if elapsed_ms.is_nan() {
        log::warn!("Ignoring NaN frame delta");
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(elapsed_ms.max(0.0) / 1000.0).unwrap_or(Duration::MAX)
}
