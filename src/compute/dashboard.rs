//! Dashboard engine: the single owner of filter and playback state.
//!
//! View adapters read through the accessors and change state only through
//! the named operations. Every mutation (and every recovered failure) is
//! pushed to subscribers as a [`DashboardEvent`].

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;

use super::{
    Change, DashboardEvent, Diagnostic, EventCallback, PlaybackController, PlaybackSnapshot,
    SeekOutcome, SubscriberId, Subscribers, TimelineIndex, Transition, VisibleSummary,
    visible_indices,
};
use crate::schema::{
    ConfigError, DashboardConfig, DatasetError, DateError, Facility, FacilitySource,
    FacilityStatus, FacilityStore, StatusSelection, normalize_date,
};

/// Errors surfaced to direct callers. State is unchanged when one is
/// returned.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Invalid date '{input}': {source}")]
    InvalidDate {
        input: String,
        #[source]
        source: DateError,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

/// Facility dashboard state.
///
/// Usage:
/// ```ignore
/// let mut dashboard = Dashboard::new(Arc::new(store), DashboardConfig::default())?;
/// dashboard.subscribe(|event| println!("{:?}", event.change));
/// dashboard.set_status_included(FacilityStatus::Signed, false);
/// dashboard.play();
/// dashboard.advance(Duration::from_millis(16));
/// ```
#[derive(Debug)]
pub struct Dashboard {
    store: Arc<FacilityStore>,
    selection: StatusSelection,
    controller: PlaybackController,
    /// Indices into the store of the visible facilities.
    visible: Vec<usize>,
    subscribers: Subscribers,
}

impl Dashboard {
    pub fn new(store: Arc<FacilityStore>, config: DashboardConfig) -> Result<Self, DashboardError> {
        config.validate()?;
        let default_date = config.resolve_default_date()?;
        let timeline = TimelineIndex::from_facilities(store.facilities());

        if store.is_empty() {
            log::warn!("Dashboard created with an empty facility dataset");
        }
        log::debug!(
            "Dashboard loaded {} facilities over {} dates",
            store.len(),
            timeline.len()
        );

        let mut dashboard = Self {
            store,
            selection: config.statuses,
            controller: PlaybackController::new(timeline, &config.playback, default_date),
            visible: Vec::new(),
            subscribers: Subscribers::default(),
        };
        dashboard.refresh();
        Ok(dashboard)
    }

    /// Build from a facility provider.
    pub fn from_source<S: FacilitySource + ?Sized>(
        source: &S,
        config: DashboardConfig,
    ) -> Result<Self, DashboardError> {
        let store = FacilityStore::new(source.load_facilities()?)?;
        Self::new(Arc::new(store), config)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Facilities currently on the map, in dataset order.
    pub fn visible_facilities(&self) -> Vec<&Facility> {
        let facilities = self.store.facilities();
        self.visible.iter().map(|&i| &facilities[i]).collect()
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    pub fn visible_summary(&self) -> VisibleSummary {
        VisibleSummary::from_facilities(self.visible_facilities())
    }

    pub fn status_selection(&self) -> &StatusSelection {
        &self.selection
    }

    pub fn playback_state(&self) -> PlaybackSnapshot {
        self.controller.snapshot()
    }

    /// The date the filter is currently applied at.
    pub fn as_of_date(&self) -> NaiveDate {
        self.controller.effective_date()
    }

    pub fn timeline(&self) -> &TimelineIndex {
        self.controller.timeline()
    }

    /// Any facility in the store by id, visible or not.
    pub fn facility(&self, id: &str) -> Option<&Facility> {
        self.store.get(id)
    }

    pub fn store(&self) -> &Arc<FacilityStore> {
        &self.store
    }

    pub fn tick_interval(&self) -> Duration {
        self.controller.tick_interval()
    }

    // ------------------------------------------------------------------
    // Subscriptions
    // ------------------------------------------------------------------

    /// Register a callback run after every change.
    ///
    /// The event carries the full playback snapshot, so callbacks do not
    /// need to read back from the dashboard.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriberId
    where
        F: FnMut(&DashboardEvent) + 'static,
    {
        self.subscribers.subscribe(Box::new(callback) as EventCallback)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Include or exclude a status. Returns true if the selection changed.
    pub fn set_status_included(&mut self, status: FacilityStatus, included: bool) -> bool {
        if !self.selection.set(status, included) {
            return false;
        }
        self.refresh();
        self.notify(Change::StatusToggled { status, included }, None);
        true
    }

    /// Seek to a date given as text.
    ///
    /// An unparsable date is logged, reported to subscribers and returned
    /// as an error; the current position is kept.
    pub fn set_current_date(&mut self, input: &str) -> Result<SeekOutcome, DashboardError> {
        match normalize_date(input) {
            Ok(date) => Ok(self.seek_date(date)),
            Err(source) => {
                log::warn!("Rejected date '{input}': {source}");
                self.notify(
                    Change::Ignored,
                    Some(Diagnostic::InvalidDate {
                        input: input.to_string(),
                        reason: source.to_string(),
                    }),
                );
                Err(DashboardError::InvalidDate {
                    input: input.to_string(),
                    source,
                })
            }
        }
    }

    pub fn seek_date(&mut self, date: NaiveDate) -> SeekOutcome {
        let outcome = self.controller.seek_date(date);
        self.after_seek(outcome)
    }

    pub fn seek_index(&mut self, index: usize) -> SeekOutcome {
        let outcome = self.controller.seek_index(index);
        self.after_seek(outcome)
    }

    pub fn step_forward(&mut self) -> SeekOutcome {
        let outcome = self.controller.step_forward();
        self.after_seek(outcome)
    }

    pub fn step_back(&mut self) -> SeekOutcome {
        let outcome = self.controller.step_back();
        self.after_seek(outcome)
    }

    fn after_seek(&mut self, outcome: SeekOutcome) -> SeekOutcome {
        let diagnostic = Diagnostic::from_seek(&outcome);
        if outcome.resolved.is_none() {
            log::warn!("Seek ignored: no facilities loaded");
            self.notify(Change::Ignored, diagnostic);
            return outcome;
        }
        if let Some(diagnostic) = &diagnostic {
            log::debug!("Seek adjusted: {diagnostic}");
        }
        self.refresh();
        self.notify(Change::Seek { outcome }, diagnostic);
        outcome
    }

    pub fn play(&mut self) -> Option<Transition> {
        let transition = self.controller.play();
        match transition {
            Some(transition) => {
                // Restarting from Finished moves back to the first date
                self.refresh();
                self.notify(Change::Playback { transition }, None);
            }
            None if self.timeline().is_empty() => {
                log::warn!("Play ignored: no facilities loaded");
                self.notify(Change::Ignored, Some(Diagnostic::EmptyDataset));
            }
            None => {}
        }
        transition
    }

    pub fn pause(&mut self) -> Option<Transition> {
        let transition = self.controller.pause();
        if let Some(transition) = transition {
            self.notify(Change::Playback { transition }, None);
        }
        transition
    }

    /// Back to `Idle` at the first date.
    ///
    /// Subscribers are notified whenever the position or status moved, even
    /// if the status itself was already `Idle`.
    pub fn reset(&mut self) -> Option<Transition> {
        let before = self.controller.snapshot();
        let transition = self.controller.reset();
        if self.controller.snapshot() != before {
            self.refresh();
            self.notify(Change::Reset, None);
        }
        transition
    }

    /// Feed elapsed wall time to the playback timer.
    ///
    /// Returns the number of ticks that fired; each one is notified
    /// separately.
    pub fn advance(&mut self, elapsed: Duration) -> usize {
        self.controller.accumulate(elapsed);
        let mut fired = 0;
        while let Some(outcome) = self.controller.poll_tick() {
            fired += 1;
            self.refresh();
            self.notify(Change::Tick { outcome }, None);
        }
        fired
    }

    /// Replace the facility dataset (e.g. after a re-fetch).
    ///
    /// The timeline is rebuilt only if `store` is a different allocation.
    /// Returns true if it was.
    pub fn replace_store(&mut self, store: Arc<FacilityStore>) -> bool {
        if Arc::ptr_eq(&self.store, &store) {
            return false;
        }
        self.store = store;
        let timeline = TimelineIndex::from_facilities(self.store.facilities());
        let timeline_length = timeline.len();
        self.controller.replace_timeline(timeline);
        self.refresh();
        log::debug!(
            "Facility store replaced: {} facilities, {} dates",
            self.store.len(),
            timeline_length
        );
        let diagnostic = self.store.is_empty().then_some(Diagnostic::EmptyDataset);
        self.notify(
            Change::StoreReplaced {
                facilities: self.store.len(),
                timeline_length,
            },
            diagnostic,
        );
        true
    }

    fn refresh(&mut self) {
        self.visible = visible_indices(
            self.store.facilities(),
            &self.selection,
            self.controller.effective_date(),
        );
    }

    fn notify(&mut self, change: Change, diagnostic: Option<Diagnostic>) {
        if self.subscribers.is_empty() {
            return;
        }
        let event = DashboardEvent {
            change,
            snapshot: self.controller.snapshot(),
            visible_count: self.visible.len(),
            diagnostic,
        };
        self.subscribers.emit(&event);
    }
}
