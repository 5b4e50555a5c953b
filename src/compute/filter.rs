//! Temporal filter: status selection plus "as of" date.
//!
//! All functions here are pure. The same inputs always give the same output,
//! in source order.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::schema::{DateError, Facility, FacilityStatus, StatusSelection, normalize_date};

/// True if `facility` is shown for the given selection and as-of day.
#[inline]
pub fn is_visible(facility: &Facility, selection: &StatusSelection, as_of: NaiveDate) -> bool {
    selection.is_included(facility.status) && facility.deployment_date <= as_of
}

/// Indices (into `facilities`) of the visible subset, ascending.
pub fn visible_indices(
    facilities: &[Facility],
    selection: &StatusSelection,
    as_of: NaiveDate,
) -> Vec<usize> {
    if !selection.any() {
        return Vec::new();
    }
    facilities
        .iter()
        .enumerate()
        .filter(|(_, f)| is_visible(f, selection, as_of))
        .map(|(i, _)| i)
        .collect()
}

/// Visible facilities, preserving source order.
pub fn visible_facilities<'a>(
    facilities: &'a [Facility],
    selection: &StatusSelection,
    as_of: NaiveDate,
) -> Vec<&'a Facility> {
    facilities
        .iter()
        .filter(|f| is_visible(f, selection, as_of))
        .collect()
}

/// Result of filtering against an unparsed as-of date.
#[derive(Debug, Clone)]
pub struct FilterOutcome<'a> {
    pub visible: Vec<&'a Facility>,
    /// Set when the as-of date could not be normalized.
    pub error: Option<DateError>,
}

/// Filter with a raw as-of string.
///
/// An unparsable date matches nothing; the parse error is returned
/// alongside the (empty) result rather than raised.
pub fn visible_facilities_at<'a>(
    facilities: &'a [Facility],
    selection: &StatusSelection,
    raw_as_of: &str,
) -> FilterOutcome<'a> {
    match normalize_date(raw_as_of) {
        Ok(as_of) => FilterOutcome {
            visible: visible_facilities(facilities, selection, as_of),
            error: None,
        },
        Err(err) => {
            log::warn!("Filter date rejected, showing nothing: {err}");
            FilterOutcome {
                visible: Vec::new(),
                error: Some(err),
            }
        }
    }
}

/// Visible facility counts for the map legend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VisibleSummary {
    pub total: usize,
    pub by_status: BTreeMap<FacilityStatus, usize>,
}

impl VisibleSummary {
    pub fn from_facilities<'a, I>(facilities: I) -> Self
    where
        I: IntoIterator<Item = &'a Facility>,
    {
        let mut summary = Self {
            total: 0,
            by_status: FacilityStatus::ALL.iter().map(|&s| (s, 0)).collect(),
        };
        for facility in facilities {
            summary.total += 1;
            *summary.by_status.entry(facility.status).or_default() += 1;
        }
        summary
    }

    pub fn count(&self, status: FacilityStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn scenario_dataset() -> Vec<Facility> {
        vec![
            Facility::new("signed", FacilityStatus::Signed, ymd(2024, 1, 1), "Early"),
            Facility::new("deployed", FacilityStatus::Deployed, ymd(2024, 6, 1), "Late"),
        ]
    }

    fn ids<'a>(facilities: &[&'a Facility]) -> Vec<&'a str> {
        facilities.iter().map(|f| f.id.as_str()).collect()
    }

    #[test]
    fn test_scenario_a_date_cutoff() {
        let data = scenario_dataset();
        let visible = visible_facilities(&data, &StatusSelection::all(), ymd(2024, 3, 1));
        assert_eq!(ids(&visible), vec!["signed"]);
    }

    #[test]
    fn test_scenario_b_status_cutoff() {
        let data = scenario_dataset();
        let selection = StatusSelection::only(&[FacilityStatus::Deployed]);
        let visible = visible_facilities(&data, &selection, ymd(2024, 12, 31));
        assert_eq!(ids(&visible), vec!["deployed"]);
    }

    #[test]
    fn test_same_day_is_visible() {
        let data = scenario_dataset();
        let visible = visible_facilities(&data, &StatusSelection::all(), ymd(2024, 6, 1));
        assert_eq!(ids(&visible), vec!["signed", "deployed"]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(visible_facilities(&[], &StatusSelection::all(), ymd(2024, 1, 1)).is_empty());

        let data = scenario_dataset();
        assert!(visible_indices(&data, &StatusSelection::none(), ymd(2030, 1, 1)).is_empty());
    }

    #[test]
    fn test_unparsable_date_fails_closed() {
        let data = scenario_dataset();
        let outcome = visible_facilities_at(&data, &StatusSelection::all(), "31/12/2024");
        assert!(outcome.visible.is_empty());
        assert!(matches!(outcome.error, Some(DateError::Unparsable { .. })));

        let ok = visible_facilities_at(&data, &StatusSelection::all(), "2024-03-01T10:00:00Z");
        assert!(ok.error.is_none());
        assert_eq!(ids(&ok.visible), vec!["signed"]);
    }

    #[test]
    fn test_summary_counts() {
        let data = scenario_dataset();
        let visible = visible_facilities(&data, &StatusSelection::all(), ymd(2025, 1, 1));
        let summary = VisibleSummary::from_facilities(visible);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.count(FacilityStatus::Deployed), 1);
        assert_eq!(summary.count(FacilityStatus::Signed), 1);
    }

    fn arb_facilities() -> impl Strategy<Value = Vec<Facility>> {
        prop::collection::vec((any::<bool>(), 0i64..730), 0..40).prop_map(|rows| {
            let base = ymd(2023, 1, 1);
            rows.into_iter()
                .enumerate()
                .map(|(i, (deployed, offset))| {
                    let status = if deployed {
                        FacilityStatus::Deployed
                    } else {
                        FacilityStatus::Signed
                    };
                    Facility::new(
                        format!("f{i}"),
                        status,
                        base + chrono::Days::new(offset as u64),
                        format!("Facility {i}"),
                    )
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_filter_matches_definition(
            data in arb_facilities(),
            deployed in any::<bool>(),
            signed in any::<bool>(),
            offset in 0u64..800,
        ) {
            let mut selection = StatusSelection::none();
            selection.set(FacilityStatus::Deployed, deployed);
            selection.set(FacilityStatus::Signed, signed);
            let as_of = ymd(2023, 1, 1) + chrono::Days::new(offset);

            let indices = visible_indices(&data, &selection, as_of);
            for (i, facility) in data.iter().enumerate() {
                let expected = selection.is_included(facility.status)
                    && facility.deployment_date <= as_of;
                prop_assert_eq!(indices.contains(&i), expected);
            }
            // Source order preserved
            prop_assert!(indices.windows(2).all(|w| w[0] < w[1]));
        }

        #[test]
        fn prop_filter_is_repeatable(data in arb_facilities(), offset in 0u64..800) {
            let as_of = ymd(2023, 1, 1) + chrono::Days::new(offset);
            let selection = StatusSelection::all();
            let first = visible_facilities(&data, &selection, as_of);
            let second = visible_facilities(&data, &selection, as_of);
            prop_assert_eq!(first, second);
        }
    }
}
