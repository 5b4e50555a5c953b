//! Change notifications delivered to view adapters.

use std::fmt;

use serde::Serialize;

use super::{PlaybackSnapshot, SeekOutcome, SeekTarget, TickOutcome, Transition};
use crate::schema::FacilityStatus;

/// What changed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Change {
    StatusToggled {
        status: FacilityStatus,
        included: bool,
    },
    Seek {
        outcome: SeekOutcome,
    },
    Tick {
        outcome: TickOutcome,
    },
    Playback {
        transition: Transition,
    },
    Reset,
    StoreReplaced {
        facilities: usize,
        timeline_length: usize,
    },
    /// The request was recovered from without changing state; see the
    /// attached diagnostic.
    Ignored,
}

/// Recovered failure attached to an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A date could not be normalized; the previous state was kept.
    InvalidDate { input: String, reason: String },
    /// The dataset is empty, so there is nothing to play or seek.
    EmptyDataset,
    /// A seek outside the timeline was pulled to the nearest bound.
    OutOfRangeSeek {
        requested: SeekTarget,
        resolved: usize,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::InvalidDate { input, reason } => {
                write!(f, "invalid date '{input}': {reason}")
            }
            Diagnostic::EmptyDataset => f.write_str("no facilities loaded"),
            Diagnostic::OutOfRangeSeek {
                requested,
                resolved,
            } => write!(f, "seek {requested:?} clamped to index {resolved}"),
        }
    }
}

impl Diagnostic {
    /// Diagnostic for a seek that had to be clamped.
    pub fn from_seek(outcome: &SeekOutcome) -> Option<Self> {
        match outcome.resolved {
            None => Some(Diagnostic::EmptyDataset),
            Some(resolved) if outcome.clamped => Some(Diagnostic::OutOfRangeSeek {
                requested: outcome.target,
                resolved,
            }),
            Some(_) => None,
        }
    }
}

/// Notification sent after every state mutation or recovered failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardEvent {
    pub change: Change,
    pub snapshot: PlaybackSnapshot,
    pub visible_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<Diagnostic>,
}

/// Handle returned by `subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SubscriberId(pub u64);

/// Subscriber callback.
pub type EventCallback = Box<dyn FnMut(&DashboardEvent)>;

/// Registered subscribers, notified in subscription order.
#[derive(Default)]
pub struct Subscribers {
    next_id: u64,
    entries: Vec<(SubscriberId, EventCallback)>,
}

impl fmt::Debug for Subscribers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("count", &self.entries.len())
            .finish()
    }
}

impl Subscribers {
    pub fn subscribe(&mut self, callback: EventCallback) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, callback));
        id
    }

    /// Returns false if `id` was not registered.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub fn emit(&mut self, event: &DashboardEvent) {
        for (_, callback) in &mut self.entries {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
