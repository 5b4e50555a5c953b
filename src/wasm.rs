//! WebAssembly bindings for the dashboard engine.
//!
//! Provides a thin wrapper around `Dashboard` so every browser timeline
//! widget (desktop, mobile) observes the same state.

use std::sync::Arc;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::{
    compute::{Dashboard, SubscriberId, elapsed_from_millis},
    schema::{DashboardConfig, FacilityStatus, FacilityStore},
};

/// Initialize WASM module with panic hook and logging.
#[wasm_bindgen(start)]
pub fn init() {
    // Set panic hook for better error messages in browser
    console_error_panic_hook::set_once();

    // Initialize WASM logger
    wasm_logger::init(wasm_logger::Config::default());
}

/// Serialize to a plain JS value (maps become objects, not `Map`).
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
    value
        .serialize(&serializer)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

/// WebAssembly wrapper for the facility dashboard.
#[wasm_bindgen]
pub struct WasmDashboard {
    dashboard: Dashboard,
}

#[wasm_bindgen]
impl WasmDashboard {
    /// Create a dashboard from JSON.
    ///
    /// # Arguments
    /// * `facilities_json` - JSON array of facility records
    /// * `config_json` - JSON string containing DashboardConfig (may be empty)
    #[wasm_bindgen(constructor)]
    pub fn new(facilities_json: &str, config_json: &str) -> Result<WasmDashboard, JsValue> {
        let store = FacilityStore::from_json(facilities_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid facilities JSON: {e}")))?;

        let config: DashboardConfig = if config_json.trim().is_empty() {
            DashboardConfig::default()
        } else {
            serde_json::from_str(config_json)
                .map_err(|e| JsValue::from_str(&format!("Invalid config JSON: {e}")))?
        };

        let dashboard = Dashboard::new(Arc::new(store), config)
            .map_err(|e| JsValue::from_str(&format!("Invalid config: {e}")))?;

        Ok(WasmDashboard { dashboard })
    }

    /// Visible facilities as an array of records.
    #[wasm_bindgen(js_name = getVisibleFacilities)]
    pub fn get_visible_facilities(&self) -> Result<JsValue, JsValue> {
        to_js(&self.dashboard.visible_facilities())
    }

    /// Look up one facility by id (e.g. for a map popup). `undefined` if
    /// no such facility exists.
    #[wasm_bindgen(js_name = getFacility)]
    pub fn get_facility(&self, id: &str) -> Result<JsValue, JsValue> {
        match self.dashboard.facility(id) {
            Some(facility) => to_js(facility),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    #[wasm_bindgen(js_name = getVisibleSummary)]
    pub fn get_visible_summary(&self) -> Result<JsValue, JsValue> {
        to_js(&self.dashboard.visible_summary())
    }

    #[wasm_bindgen(js_name = getStatusSelection)]
    pub fn get_status_selection(&self) -> Result<JsValue, JsValue> {
        to_js(self.dashboard.status_selection())
    }

    /// Toggle a status ("deployed" or "signed").
    #[wasm_bindgen(js_name = setStatusIncluded)]
    pub fn set_status_included(&mut self, status: &str, included: bool) -> Result<bool, JsValue> {
        let status: FacilityStatus = status
            .parse()
            .map_err(|e| JsValue::from_str(&format!("{e}")))?;
        Ok(self.dashboard.set_status_included(status, included))
    }

    /// Seek to a date string. Returns the seek outcome.
    #[wasm_bindgen(js_name = setCurrentDate)]
    pub fn set_current_date(&mut self, date: &str) -> Result<JsValue, JsValue> {
        let outcome = self
            .dashboard
            .set_current_date(date)
            .map_err(|e| JsValue::from_str(&format!("{e}")))?;
        to_js(&outcome)
    }

    #[wasm_bindgen(js_name = seekIndex)]
    pub fn seek_index(&mut self, index: usize) -> Result<JsValue, JsValue> {
        let outcome = self.dashboard.seek_index(index);
        to_js(&outcome)
    }

    #[wasm_bindgen(js_name = stepForward)]
    pub fn step_forward(&mut self) -> Result<JsValue, JsValue> {
        let outcome = self.dashboard.step_forward();
        to_js(&outcome)
    }

    #[wasm_bindgen(js_name = stepBack)]
    pub fn step_back(&mut self) -> Result<JsValue, JsValue> {
        let outcome = self.dashboard.step_back();
        to_js(&outcome)
    }

    #[wasm_bindgen]
    pub fn play(&mut self) -> bool {
        self.dashboard.play().is_some()
    }

    #[wasm_bindgen]
    pub fn pause(&mut self) -> bool {
        self.dashboard.pause().is_some()
    }

    #[wasm_bindgen]
    pub fn reset(&mut self) -> bool {
        self.dashboard.reset().is_some()
    }

    /// Feed elapsed frame time (e.g. from `requestAnimationFrame`).
    /// Returns the number of timeline steps taken.
    #[wasm_bindgen]
    pub fn advance(&mut self, elapsed_ms: f64) -> usize {
        self.dashboard.advance(elapsed_from_millis(elapsed_ms))
    }

    #[wasm_bindgen(js_name = getPlaybackState)]
    pub fn get_playback_state(&self) -> Result<JsValue, JsValue> {
        to_js(&self.dashboard.playback_state())
    }

    /// Distinct deployment dates (`YYYY-MM-DD`), ascending.
    #[wasm_bindgen(js_name = getTimeline)]
    pub fn get_timeline(&self) -> Result<JsValue, JsValue> {
        to_js(self.dashboard.timeline())
    }

    #[wasm_bindgen(js_name = getTickIntervalMs)]
    pub fn get_tick_interval_ms(&self) -> f64 {
        self.dashboard.tick_interval().as_secs_f64() * 1000.0
    }

    /// Register a change listener. The callback receives each event object
    /// and should not call back into this dashboard synchronously.
    #[wasm_bindgen]
    pub fn subscribe(&mut self, callback: js_sys::Function) -> f64 {
        let id = self.dashboard.subscribe(move |event| {
            match to_js(event) {
                Ok(value) => {
                    if let Err(e) = callback.call1(&JsValue::NULL, &value) {
                        log::error!("Dashboard listener threw: {e:?}");
                    }
                }
                Err(e) => log::error!("Failed to serialize dashboard event: {e:?}"),
            }
        });
        id.0 as f64
    }

    #[wasm_bindgen]
    pub fn unsubscribe(&mut self, id: f64) -> bool {
        self.dashboard.unsubscribe(SubscriberId(id as u64))
    }
}
