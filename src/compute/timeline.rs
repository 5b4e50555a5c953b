//! Timeline index: the distinct deployment dates in ascending order.

use chrono::NaiveDate;
use serde::Serialize;

use crate::schema::Facility;

/// Sorted, de-duplicated deployment dates.
///
/// Facilities sharing a date collapse into one entry; the filter still
/// returns all of them once that date is reached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TimelineIndex {
    dates: Vec<NaiveDate>,
}

impl TimelineIndex {
    pub fn from_facilities(facilities: &[Facility]) -> Self {
        let mut dates: Vec<NaiveDate> = facilities.iter().map(|f| f.deployment_date).collect();
        dates.sort_unstable();
        dates.dedup();
        Self { dates }
    }

    /// Build directly from dates, in any order.
    pub fn from_dates<I: IntoIterator<Item = NaiveDate>>(dates: I) -> Self {
        let mut dates: Vec<NaiveDate> = dates.into_iter().collect();
        dates.sort_unstable();
        dates.dedup();
        Self { dates }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    #[inline]
    pub fn date_at(&self, index: usize) -> Option<NaiveDate> {
        self.dates.get(index).copied()
    }

    pub fn first(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Last valid index, if any.
    pub fn last_index(&self) -> Option<usize> {
        self.dates.len().checked_sub(1)
    }

    /// Index of the entry equal to `date`.
    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }

    /// Index of the last entry on or before `date`.
    ///
    /// `None` if `date` precedes the whole timeline (or it is empty).
    pub fn floor_position(&self, date: NaiveDate) -> Option<usize> {
        self.dates.partition_point(|&d| d <= date).checked_sub(1)
    }

    /// Clamp an arbitrary index into `[0, len)`.
    pub fn clamp_index(&self, index: usize) -> Option<usize> {
        self.last_index().map(|last| index.min(last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FacilityStatus;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn timeline() -> TimelineIndex {
        let facilities = vec![
            Facility::new("c", FacilityStatus::Deployed, ymd(2024, 6, 1), "C"),
            Facility::new("a", FacilityStatus::Signed, ymd(2024, 1, 1), "A"),
            Facility::new("b", FacilityStatus::Deployed, ymd(2024, 6, 1), "B"),
            Facility::new("d", FacilityStatus::Signed, ymd(2024, 3, 15), "D"),
        ];
        TimelineIndex::from_facilities(&facilities)
    }

    #[test]
    fn test_sorted_and_deduplicated() {
        let timeline = timeline();
        assert_eq!(
            timeline.dates(),
            &[ymd(2024, 1, 1), ymd(2024, 3, 15), ymd(2024, 6, 1)]
        );
        assert_eq!(timeline.first(), Some(ymd(2024, 1, 1)));
        assert_eq!(timeline.last(), Some(ymd(2024, 6, 1)));
        assert_eq!(timeline.last_index(), Some(2));
    }

    #[test]
    fn test_lookups() {
        let timeline = timeline();
        assert_eq!(timeline.position(ymd(2024, 3, 15)), Some(1));
        assert_eq!(timeline.position(ymd(2024, 3, 16)), None);
        assert_eq!(timeline.date_at(2), Some(ymd(2024, 6, 1)));
        assert_eq!(timeline.date_at(3), None);
    }

    #[test]
    fn test_floor_position() {
        let timeline = timeline();
        assert_eq!(timeline.floor_position(ymd(2023, 12, 31)), None);
        assert_eq!(timeline.floor_position(ymd(2024, 1, 1)), Some(0));
        assert_eq!(timeline.floor_position(ymd(2024, 5, 31)), Some(1));
        assert_eq!(timeline.floor_position(ymd(2030, 1, 1)), Some(2));
    }

    #[test]
    fn test_empty_timeline() {
        let timeline = TimelineIndex::from_facilities(&[]);
        assert!(timeline.is_empty());
        assert_eq!(timeline.first(), None);
        assert_eq!(timeline.last_index(), None);
        assert_eq!(timeline.clamp_index(5), None);
        assert_eq!(timeline.floor_position(ymd(2024, 1, 1)), None);
    }

    #[test]
    fn test_clamp_index() {
        let timeline = timeline();
        assert_eq!(timeline.clamp_index(0), Some(0));
        assert_eq!(timeline.clamp_index(99), Some(2));
    }
}
