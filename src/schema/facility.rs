//! Facility records and the immutable facility store.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::date::serde_date;

/// Deployment status of a facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacilityStatus {
    /// System is live at the facility.
    #[serde(alias = "Deployed")]
    Deployed,
    /// Contract signed, not yet live.
    #[serde(alias = "Signed")]
    Signed,
}

impl FacilityStatus {
    /// All statuses, in display order.
    pub const ALL: [FacilityStatus; 2] = [FacilityStatus::Deployed, FacilityStatus::Signed];

    pub fn as_str(self) -> &'static str {
        match self {
            FacilityStatus::Deployed => "deployed",
            FacilityStatus::Signed => "signed",
        }
    }
}

impl fmt::Display for FacilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FacilityStatus {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deployed" => Ok(FacilityStatus::Deployed),
            "signed" => Ok(FacilityStatus::Signed),
            _ => Err(DatasetError::UnknownStatus(s.to_string())),
        }
    }
}

/// Geographic position of a facility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Descriptive fields carried through the engine untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FacilityDetails {
    /// Display name.
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Any other fields present in the source record.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A single facility on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    /// Opaque unique identifier.
    pub id: String,
    pub status: FacilityStatus,
    /// Deployment (or signing) day, UTC.
    #[serde(rename = "deploymentDate", alias = "deployment_date", with = "serde_date")]
    pub deployment_date: NaiveDate,
    #[serde(flatten)]
    pub details: FacilityDetails,
}

impl Facility {
    /// Create a facility with only a name as its description.
    pub fn new(
        id: impl Into<String>,
        status: FacilityStatus,
        deployment_date: NaiveDate,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            status,
            deployment_date,
            details: FacilityDetails {
                name: name.into(),
                ..Default::default()
            },
        }
    }
}

/// Dataset loading errors.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Failed to read dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid dataset JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Duplicate facility id '{0}'")]
    DuplicateId(String),
    #[error("Unknown facility status '{0}'")]
    UnknownStatus(String),
}

/// The full, unfiltered facility collection.
///
/// Immutable once built; a re-fetch produces a new store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacilityStore {
    facilities: Vec<Facility>,
}

impl FacilityStore {
    /// Build a store, rejecting duplicate ids.
    pub fn new(facilities: Vec<Facility>) -> Result<Self, DatasetError> {
        let mut seen = HashSet::with_capacity(facilities.len());
        for facility in &facilities {
            if !seen.insert(facility.id.as_str()) {
                return Err(DatasetError::DuplicateId(facility.id.clone()));
            }
        }
        Ok(Self { facilities })
    }

    /// Parse a JSON array of facility records.
    pub fn from_json(json: &str) -> Result<Self, DatasetError> {
        let facilities: Vec<Facility> = serde_json::from_str(json)?;
        Self::new(facilities)
    }

    /// Load a JSON dataset from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn facilities(&self) -> &[Facility] {
        &self.facilities
    }

    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Facility> {
        self.facilities.iter().find(|f| f.id == id)
    }

    /// Number of facilities per status, over the whole store.
    pub fn count_by_status(&self) -> BTreeMap<FacilityStatus, usize> {
        let mut counts: BTreeMap<FacilityStatus, usize> =
            FacilityStatus::ALL.iter().map(|&s| (s, 0)).collect();
        for facility in &self.facilities {
            *counts.entry(facility.status).or_default() += 1;
        }
        counts
    }
}

/// Provider of the facility dataset.
pub trait FacilitySource {
    fn load_facilities(&self) -> Result<Vec<Facility>, DatasetError>;
}

/// Reads facilities from a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    pub path: PathBuf,
}

impl JsonFileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl FacilitySource for JsonFileSource {
    fn load_facilities(&self) -> Result<Vec<Facility>, DatasetError> {
        FacilityStore::load(&self.path).map(|store| store.facilities)
    }
}

impl FacilitySource for Vec<Facility> {
    fn load_facilities(&self) -> Result<Vec<Facility>, DatasetError> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"[
        {
            "id": "h-1",
            "status": "signed",
            "deploymentDate": "2024-01-01",
            "name": "St. Mary",
            "address": "1 Main St",
            "coordinates": { "lat": 40.7, "lng": -74.0 },
            "website": "https://example.org",
            "beds": 120
        },
        {
            "id": "h-2",
            "status": "Deployed",
            "deploymentDate": "2024-06-01T18:00:00-08:00",
            "name": "General"
        }
    ]"#;

    #[test]
    fn test_parse_sample() {
        let store = FacilityStore::from_json(SAMPLE).unwrap();
        assert_eq!(store.len(), 2);

        let first = &store.facilities()[0];
        assert_eq!(first.status, FacilityStatus::Signed);
        assert_eq!(
            first.deployment_date,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert_eq!(first.details.name, "St. Mary");
        assert_eq!(first.details.extra.get("beds"), Some(&serde_json::json!(120)));

        // 18:00 at UTC-08:00 is the following day in UTC
        let second = &store.facilities()[1];
        assert_eq!(second.status, FacilityStatus::Deployed);
        assert_eq!(
            second.deployment_date,
            NaiveDate::from_ymd_opt(2024, 6, 2).unwrap()
        );
    }

    #[test]
    fn test_get_by_id() {
        let store = FacilityStore::from_json(SAMPLE).unwrap();
        let general = store.get("h-2").unwrap();
        assert_eq!(general.details.name, "General");
        assert_eq!(general.status, FacilityStatus::Deployed);
        assert!(store.get("h-3").is_none());
        assert!(FacilityStore::default().get("h-1").is_none());
    }

    #[test]
    fn test_extra_fields_survive_serialization() {
        let store = FacilityStore::from_json(SAMPLE).unwrap();
        let json = serde_json::to_value(&store.facilities()[0]).unwrap();
        assert_eq!(json["beds"], 120);
        assert_eq!(json["deploymentDate"], "2024-01-01");
        assert_eq!(json["status"], "signed");
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let result = FacilityStore::new(vec![
            Facility::new("a", FacilityStatus::Signed, date, "A"),
            Facility::new("a", FacilityStatus::Deployed, date, "A again"),
        ]);
        assert!(matches!(result, Err(DatasetError::DuplicateId(id)) if id == "a"));
    }

    #[test]
    fn test_bad_date_fails_whole_load() {
        let json = r#"[{ "id": "x", "status": "signed", "deploymentDate": "soon" }]"#;
        assert!(matches!(
            FacilityStore::from_json(json),
            Err(DatasetError::Json(_))
        ));
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("DEPLOYED".parse::<FacilityStatus>().unwrap(), FacilityStatus::Deployed);
        assert_eq!(" signed ".parse::<FacilityStatus>().unwrap(), FacilityStatus::Signed);
        assert!("pending".parse::<FacilityStatus>().is_err());
    }

    #[test]
    fn test_count_by_status() {
        let store = FacilityStore::from_json(SAMPLE).unwrap();
        let counts = store.count_by_status();
        assert_eq!(counts[&FacilityStatus::Deployed], 1);
        assert_eq!(counts[&FacilityStatus::Signed], 1);

        let empty = FacilityStore::default().count_by_status();
        assert_eq!(empty[&FacilityStatus::Deployed], 0);
    }

    #[test]
    fn test_json_file_source() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let source = JsonFileSource::new(file.path());
        let facilities = source.load_facilities().unwrap();
        assert_eq!(facilities.len(), 2);
        assert_eq!(facilities[1].id, "h-2");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = FacilityStore::load(dir.path().join("missing.json"));
        assert!(matches!(result, Err(DatasetError::Io { .. })));
    }
}
