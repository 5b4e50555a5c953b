//! Status selection (which statuses are shown on the map).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::FacilityStatus;

/// Inclusion flag per status.
///
/// Statuses without an entry are excluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusSelection(BTreeMap<FacilityStatus, bool>);

impl Default for StatusSelection {
    /// Every status included.
    fn default() -> Self {
        Self::all()
    }
}

impl StatusSelection {
    pub fn all() -> Self {
        Self(FacilityStatus::ALL.iter().map(|&s| (s, true)).collect())
    }

    pub fn none() -> Self {
        Self(BTreeMap::new())
    }

    /// Build from the statuses that should be included.
    pub fn only(statuses: &[FacilityStatus]) -> Self {
        Self(statuses.iter().map(|&s| (s, true)).collect())
    }

    pub fn is_included(&self, status: FacilityStatus) -> bool {
        self.0.get(&status).copied().unwrap_or(false)
    }

    /// Set a flag. Returns true if the selection changed.
    pub fn set(&mut self, status: FacilityStatus, included: bool) -> bool {
        let previous = self.is_included(status);
        self.0.insert(status, included);
        previous != included
    }

    /// True if at least one status is included.
    pub fn any(&self) -> bool {
        self.0.values().any(|&v| v)
    }

    /// Included statuses in display order.
    pub fn included(&self) -> Vec<FacilityStatus> {
        FacilityStatus::ALL
            .iter()
            .copied()
            .filter(|&s| self.is_included(s))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_includes_everything() {
        let selection = StatusSelection::default();
        assert!(selection.is_included(FacilityStatus::Deployed));
        assert!(selection.is_included(FacilityStatus::Signed));
        assert!(selection.any());
    }

    #[test]
    fn test_absent_key_is_excluded() {
        let selection = StatusSelection::only(&[FacilityStatus::Deployed]);
        assert!(selection.is_included(FacilityStatus::Deployed));
        assert!(!selection.is_included(FacilityStatus::Signed));

        let none = StatusSelection::none();
        assert!(!none.any());
        assert!(none.included().is_empty());
    }

    #[test]
    fn test_set_reports_change() {
        let mut selection = StatusSelection::default();
        assert!(!selection.set(FacilityStatus::Signed, true));
        assert!(selection.set(FacilityStatus::Signed, false));
        assert!(!selection.set(FacilityStatus::Signed, false));
        assert_eq!(selection.included(), vec![FacilityStatus::Deployed]);
    }

    #[test]
    fn test_json_shape() {
        let selection: StatusSelection =
            serde_json::from_str(r#"{ "signed": false, "deployed": true }"#).unwrap();
        assert_eq!(selection.included(), vec![FacilityStatus::Deployed]);

        let partial: StatusSelection = serde_json::from_str(r#"{ "signed": true }"#).unwrap();
        assert!(!partial.is_included(FacilityStatus::Deployed));
    }
}
