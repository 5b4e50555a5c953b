//! Hospital Timeline - Temporal filtering and playback for facility map dashboards.
//!
//! This crate holds the engine behind a map of facilities ("hospitals"),
//! each tagged with a deployment status and a deployment date. A user
//! scrubs through time to see which facilities were deployed or signed by
//! a given date, or lets the timeline play on its own.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Facility records, the facility store, status selection,
//!   date normalization and configuration
//! - `compute`: Temporal filter, timeline index, playback controller and the
//!   `Dashboard` facade that view adapters subscribe to
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use hospital_timeline::{
//!     compute::Dashboard,
//!     schema::{DashboardConfig, FacilityStatus, FacilityStore},
//! };
//!
//! let store = FacilityStore::load("facilities.json").unwrap();
//! let mut dashboard = Dashboard::new(Arc::new(store), DashboardConfig::default()).unwrap();
//!
//! dashboard.subscribe(|event| {
//!     println!("{:?}: {} visible", event.snapshot.current_date, event.visible_count);
//! });
//!
//! dashboard.set_status_included(FacilityStatus::Signed, false);
//! dashboard.play();
//! dashboard.advance(Duration::from_millis(1500));
//! ```

pub mod compute;
pub mod schema;

// WebAssembly bindings (only for wasm32 target)
#[cfg(target_arch = "wasm32")]
pub mod wasm;

// Re-export commonly used types
pub use compute::{Dashboard, DashboardEvent, PlaybackController, PlaybackStatus, TimelineIndex};
pub use schema::{DashboardConfig, Facility, FacilityStatus, FacilityStore, StatusSelection};
