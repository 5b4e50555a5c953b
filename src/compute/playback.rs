//! Playback controller: walks the "as of" date through the timeline.
//!
//! The controller owns the current timeline position and the tick timer.
//! The current date is always read back from the timeline at the current
//! index; it is never stored on its own.

use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Ticker, TimelineIndex};
use crate::schema::PlaybackConfig;

/// Playback state machine states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    /// Not started (or reset).
    #[default]
    Idle,
    /// Auto-advancing on the tick cadence.
    Playing,
    /// Stopped by the user or by a seek.
    Paused,
    /// Reached the last timeline entry.
    Finished,
}

/// A state change caused by a controller operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub from: PlaybackStatus,
    pub to: PlaybackStatus,
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TickOutcome {
    /// Moved to the next entry and kept playing.
    Advanced { index: usize, date: NaiveDate },
    /// Was already on the last entry; playback stopped there.
    Finished { index: usize, date: NaiveDate },
}

/// Requested seek position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum SeekTarget {
    Index(usize),
    Date(NaiveDate),
}

/// Result of a seek, so callers can see how the request was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeekOutcome {
    pub target: SeekTarget,
    /// Index actually selected. `None` only for an empty timeline.
    pub resolved: Option<usize>,
    /// The request fell outside the timeline and was pulled to a bound.
    pub clamped: bool,
    /// A date request landed exactly on a timeline entry (always true for
    /// in-range index requests).
    pub exact: bool,
}

/// Read-only view of playback state for renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlaybackSnapshot {
    pub status: PlaybackStatus,
    pub current_index: Option<usize>,
    pub current_date: Option<NaiveDate>,
    pub timeline_length: usize,
}

/// Timeline playback state machine.
///
/// Usage:
/// ```ignore
/// let mut controller = PlaybackController::new(timeline, &config.playback, today);
/// controller.play();
/// loop {
///     for outcome in controller.advance(frame_time) {
///         // redraw...
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct PlaybackController {
    timeline: TimelineIndex,
    status: PlaybackStatus,
    current_index: Option<usize>,
    ticker: Ticker,
    /// Reported as the effective date while the timeline is empty.
    default_date: NaiveDate,
}

impl PlaybackController {
    pub fn new(timeline: TimelineIndex, config: &PlaybackConfig, default_date: NaiveDate) -> Self {
        let current_index = if timeline.is_empty() { None } else { Some(0) };
        Self {
            timeline,
            status: PlaybackStatus::Idle,
            current_index,
            ticker: Ticker::new(config.tick_interval()),
            default_date,
        }
    }

    pub fn timeline(&self) -> &TimelineIndex {
        &self.timeline
    }

    #[inline]
    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    #[inline]
    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    /// Timeline date at the current index.
    #[inline]
    pub fn current_date(&self) -> Option<NaiveDate> {
        self.current_index.and_then(|i| self.timeline.date_at(i))
    }

    /// Date used for filtering: the current date, or the default date when
    /// there is no timeline.
    pub fn effective_date(&self) -> NaiveDate {
        self.current_date().unwrap_or(self.default_date)
    }

    pub fn default_date(&self) -> NaiveDate {
        self.default_date
    }

    pub fn tick_interval(&self) -> Duration {
        self.ticker.interval()
    }

    /// True while a tick is pending.
    pub fn is_timer_armed(&self) -> bool {
        self.ticker.is_armed()
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            status: self.status,
            current_index: self.current_index,
            current_date: self.current_date(),
            timeline_length: self.timeline.len(),
        }
    }

    /// Move to `to`, arming the timer only when entering `Playing`.
    fn enter(&mut self, to: PlaybackStatus) -> Option<Transition> {
        let from = self.status;
        if from == to {
            return None;
        }
        self.status = to;
        if to == PlaybackStatus::Playing {
            self.ticker.arm();
        } else {
            self.ticker.cancel();
        }
        log::debug!("Playback {from:?} -> {to:?} at index {:?}", self.current_index);
        Some(Transition { from, to })
    }

    /// Start or resume auto-advance. From `Finished`, restarts at index 0.
    ///
    /// No-op when already playing or when the timeline is empty.
    pub fn play(&mut self) -> Option<Transition> {
        if self.timeline.is_empty() {
            log::debug!("Ignoring play on empty timeline");
            return None;
        }
        match self.status {
            PlaybackStatus::Playing => None,
            PlaybackStatus::Finished => {
                self.current_index = Some(0);
                self.enter(PlaybackStatus::Playing)
            }
            PlaybackStatus::Idle | PlaybackStatus::Paused => self.enter(PlaybackStatus::Playing),
        }
    }

    /// Stop auto-advance. No-op unless playing.
    pub fn pause(&mut self) -> Option<Transition> {
        if self.status != PlaybackStatus::Playing {
            return None;
        }
        self.enter(PlaybackStatus::Paused)
    }

    /// Advance one entry. Ignored unless playing.
    pub fn tick(&mut self) -> Option<TickOutcome> {
        if self.status != PlaybackStatus::Playing {
            return None;
        }
        let index = self.current_index?;
        let last = self.timeline.last_index()?;

        if index < last {
            let next = index + 1;
            self.current_index = Some(next);
            let date = self.timeline.date_at(next)?;
            Some(TickOutcome::Advanced { index: next, date })
        } else {
            self.current_index = Some(last);
            self.enter(PlaybackStatus::Finished);
            let date = self.timeline.date_at(last)?;
            Some(TickOutcome::Finished { index: last, date })
        }
    }

    /// Report elapsed wall time to the tick timer.
    pub fn accumulate(&mut self, elapsed: Duration) {
        if self.status == PlaybackStatus::Playing {
            self.ticker.accumulate(elapsed);
        }
    }

    /// Run one due tick, if any.
    pub fn poll_tick(&mut self) -> Option<TickOutcome> {
        if self.status != PlaybackStatus::Playing || !self.ticker.fire() {
            return None;
        }
        self.tick()
    }

    /// Report elapsed time and run every tick that came due.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<TickOutcome> {
        self.accumulate(elapsed);
        std::iter::from_fn(|| self.poll_tick()).collect()
    }

    /// Jump to a timeline index (clamped) and pause.
    pub fn seek_index(&mut self, requested: usize) -> SeekOutcome {
        let target = SeekTarget::Index(requested);
        let Some(resolved) = self.timeline.clamp_index(requested) else {
            return SeekOutcome {
                target,
                resolved: None,
                clamped: false,
                exact: false,
            };
        };
        self.current_index = Some(resolved);
        self.enter(PlaybackStatus::Paused);
        SeekOutcome {
            target,
            resolved: Some(resolved),
            clamped: resolved != requested,
            exact: resolved == requested,
        }
    }

    /// Jump to the last entry on or before `date` and pause.
    ///
    /// A date before the first entry clamps to index 0.
    pub fn seek_date(&mut self, date: NaiveDate) -> SeekOutcome {
        let target = SeekTarget::Date(date);
        if self.timeline.is_empty() {
            return SeekOutcome {
                target,
                resolved: None,
                clamped: false,
                exact: false,
            };
        }
        let (resolved, clamped) = match self.timeline.floor_position(date) {
            Some(index) => (index, false),
            None => (0, true),
        };
        self.current_index = Some(resolved);
        self.enter(PlaybackStatus::Paused);
        SeekOutcome {
            target,
            resolved: Some(resolved),
            clamped,
            exact: self.timeline.position(date).is_some(),
        }
    }

    /// Seek one entry forward.
    pub fn step_forward(&mut self) -> SeekOutcome {
        let next = self.current_index.map_or(0, |i| i.saturating_add(1));
        self.seek_index(next)
    }

    /// Seek one entry back.
    pub fn step_back(&mut self) -> SeekOutcome {
        let prev = self.current_index.map_or(0, |i| i.saturating_sub(1));
        self.seek_index(prev)
    }

    /// Back to `Idle` at the first entry.
    pub fn reset(&mut self) -> Option<Transition> {
        self.current_index = if self.timeline.is_empty() { None } else { Some(0) };
        let transition = self.enter(PlaybackStatus::Idle);
        self.ticker.cancel();
        transition
    }

    /// Swap in a rebuilt timeline (after the facility store was replaced).
    ///
    /// Playback stops; the position moves to the last new entry on or before
    /// the previous date.
    pub fn replace_timeline(&mut self, timeline: TimelineIndex) -> Option<Transition> {
        let previous = self.current_date();
        self.timeline = timeline;

        if self.timeline.is_empty() {
            self.current_index = None;
            return self.enter(PlaybackStatus::Idle);
        }

        let index = previous
            .and_then(|date| self.timeline.floor_position(date))
            .unwrap_or(0);
        self.current_index = Some(index);

        match self.status {
            PlaybackStatus::Playing => self.enter(PlaybackStatus::Paused),
            PlaybackStatus::Finished if Some(index) != self.timeline.last_index() => {
                self.enter(PlaybackStatus::Paused)
            }
            _ => None,
        }
    }
}
