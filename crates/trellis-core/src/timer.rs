//! A polled repeating timer with an explicit start/stop lifecycle.
//!
//! The layout engine is single-threaded and cooperatively scheduled, so
//! periodic work (edge autoscroll during a drag) is driven by the owner
//! polling an [`IntervalTimer`] rather than by a background thread. The
//! timer records when it was started and reports how many whole intervals
//! have elapsed on each poll.

use std::time::{Duration, Instant};

use thiserror::Error;

/// Timer-specific errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimerError {
    /// The timer is not running.
    #[error("timer is not active")]
    NotActive,
}

/// Result type for timer operations.
pub type TimerResult<T> = Result<T, TimerError>;

/// The maximum number of intervals a single poll will report.
///
/// If the owner stalls, the timer catches up by at most this many ticks
/// instead of replaying the entire gap.
const MAX_CATCH_UP_TICKS: u32 = 4;

/// A repeating timer polled by its owner.
///
/// The timer never fires on its own: the owner calls [`poll`](Self::poll)
/// and receives the number of whole intervals that have elapsed since the
/// previous poll. Starting an already-active timer restarts its phase;
/// stopping an inactive timer is a no-op (use [`try_stop`](Self::try_stop)
/// for strict semantics).
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    interval: Duration,
    next_fire: Option<Instant>,
}

impl IntervalTimer {
    /// Create an inactive timer with the given interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_fire: None,
        }
    }

    /// The configured interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether the timer is currently running.
    pub fn is_active(&self) -> bool {
        self.next_fire.is_some()
    }

    /// Start (or restart) the timer. The first fire occurs one interval
    /// after `now`.
    pub fn start(&mut self, now: Instant) {
        tracing::trace!(target: "trellis_core::timer", interval_ms = self.interval.as_millis() as u64, "timer started");
        self.next_fire = Some(now + self.interval);
    }

    /// Stop the timer. Does nothing if it is not running.
    pub fn stop(&mut self) {
        if self.next_fire.take().is_some() {
            tracing::trace!(target: "trellis_core::timer", "timer stopped");
        }
    }

    /// Stop the timer, reporting an error if it was not running.
    pub fn try_stop(&mut self) -> TimerResult<()> {
        if self.next_fire.is_none() {
            return Err(TimerError::NotActive);
        }
        self.stop();
        Ok(())
    }

    /// Report how many whole intervals have elapsed since the last poll.
    ///
    /// Returns 0 when the timer is inactive or the next fire time has not
    /// been reached. Catch-up after a stall is capped; the schedule is
    /// advanced past `now` either way, so a long stall does not produce a
    /// burst on later polls.
    pub fn poll(&mut self, now: Instant) -> u32 {
        let Some(next_fire) = self.next_fire else {
            return 0;
        };
        if now < next_fire {
            return 0;
        }

        let elapsed = now - next_fire;
        let intervals = if self.interval.is_zero() {
            0
        } else {
            (elapsed.as_nanos() / self.interval.as_nanos()) as u32
        };
        let ticks = (intervals + 1).min(MAX_CATCH_UP_TICKS);

        // Advance the schedule past `now`, preserving phase.
        self.next_fire = Some(next_fire + self.interval * (intervals + 1));
        ticks
    }
}
