//! Backend type definitions

use crate::label::Label;
use crate::projection::Column;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single address row.
///
/// Identifier and coordinates are always present; every other field is
/// filled only when its column was projected. `distance_m` and `score` are
/// computed per request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressRecord {
    pub id: String,
    pub longitude: f64,
    pub latitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub house_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_ar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district_ar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district_en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub governorate_ar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub governorate_en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_ar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_address_ar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_address_en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl AddressRecord {
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            latitude,
            longitude,
            ..Default::default()
        }
    }

    /// Builder-style setter for a text column. Coordinate columns are ignored.
    pub fn with(mut self, column: Column, value: impl Into<String>) -> Self {
        self.set_text(column, Some(value.into()));
        self
    }

    /// Text value of a column. Coordinate columns have no text form.
    pub fn text(&self, column: Column) -> Option<&str> {
        match column {
            Column::Id => Some(self.id.as_str()),
            Column::Longitude | Column::Latitude => None,
            _ => self.slot(column).and_then(|s| s.as_deref()),
        }
    }

    /// Sets a text column. `Id` replaces the identifier (empty when `None`);
    /// coordinate columns are ignored.
    pub fn set_text(&mut self, column: Column, value: Option<String>) {
        match column {
            Column::Id => self.id = value.unwrap_or_default(),
            Column::Longitude | Column::Latitude => {}
            _ => {
                if let Some(slot) = self.slot_mut(column) {
                    *slot = value;
                }
            }
        }
    }

    /// Clears every optional column not listed in `columns`.
    pub fn retain_columns(&mut self, columns: &[Column]) {
        for column in Column::ALL {
            if column.is_numeric() || column == Column::Id {
                continue;
            }
            if !columns.contains(&column) {
                if let Some(slot) = self.slot_mut(column) {
                    *slot = None;
                }
            }
        }
    }

    /// Names of the populated fields, in serialization order.
    pub fn fields(&self) -> Vec<&'static str> {
        let mut names = vec!["id", "longitude", "latitude"];
        for column in Column::ALL {
            if column.is_numeric() || column == Column::Id {
                continue;
            }
            if self.text(column).is_some() {
                names.push(column.name());
            }
        }
        if self.distance_m.is_some() {
            names.push("distance_m");
        }
        if self.score.is_some() {
            names.push("score");
        }
        names
    }

    fn slot(&self, column: Column) -> Option<&Option<String>> {
        Some(match column {
            Column::HouseNumber => &self.house_number,
            Column::StreetAr => &self.street_ar,
            Column::StreetEn => &self.street_en,
            Column::Postcode => &self.postcode,
            Column::DistrictAr => &self.district_ar,
            Column::DistrictEn => &self.district_en,
            Column::City => &self.city,
            Column::GovernorateAr => &self.governorate_ar,
            Column::GovernorateEn => &self.governorate_en,
            Column::RegionAr => &self.region_ar,
            Column::RegionEn => &self.region_en,
            Column::FullAddressAr => &self.full_address_ar,
            Column::FullAddressEn => &self.full_address_en,
            Column::Id | Column::Longitude | Column::Latitude => return None,
        })
    }

    fn slot_mut(&mut self, column: Column) -> Option<&mut Option<String>> {
        Some(match column {
            Column::HouseNumber => &mut self.house_number,
            Column::StreetAr => &mut self.street_ar,
            Column::StreetEn => &mut self.street_en,
            Column::Postcode => &mut self.postcode,
            Column::DistrictAr => &mut self.district_ar,
            Column::DistrictEn => &mut self.district_en,
            Column::City => &mut self.city,
            Column::GovernorateAr => &mut self.governorate_ar,
            Column::GovernorateEn => &mut self.governorate_en,
            Column::RegionAr => &mut self.region_ar,
            Column::RegionEn => &mut self.region_en,
            Column::FullAddressAr => &mut self.full_address_ar,
            Column::FullAddressEn => &mut self.full_address_en,
            Column::Id | Column::Longitude | Column::Latitude => return None,
        })
    }
}

/// Errors raised by a query backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Failed to decode partition data: {0}")]
    Decode(String),

    #[error("Missing required column '{0}'")]
    MissingColumn(String),

    #[error("Unknown partition: {0}")]
    UnknownPartition(String),

    #[error("Boundary lookup failed: {0}")]
    Boundary(String),
}

/// Errors from the ranked text-search extension.
///
/// Never surfaced to callers; the orchestrator answers every variant by
/// re-running the query through the fallback strategy.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    #[error("Ranked search unavailable: {0}")]
    CapabilityUnavailable(String),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// A remote partition addressed by id and URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartitionSource {
    pub id: String,
    pub url: String,
}

impl PartitionSource {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }
}

/// A partition that could not be read during a fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionFailure {
    pub partition: String,
    pub error: BackendError,
}

/// Result of a multi-partition fetch.
///
/// Per-partition failures are reported alongside the rows from the
/// partitions that succeeded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchOutcome {
    pub rows: Vec<AddressRecord>,
    /// Ids of the partitions that were read successfully.
    pub loaded: Vec<String>,
    pub failures: Vec<PartitionFailure>,
    /// Partitions served from the backend's local cache.
    pub cache_hits: usize,
}

impl FetchOutcome {
    /// True when at least one partition was requested and none succeeded.
    pub fn all_failed(&self) -> bool {
        self.loaded.is_empty() && !self.failures.is_empty()
    }
}

/// Handle of a per-query ranked-search index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexId(pub u64);

impl fmt::Display for IndexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "idx-{}", self.0)
    }
}

/// A built ephemeral index plus the partitions it could not cover.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltIndex {
    pub id: IndexId,
    pub documents: usize,
    pub failures: Vec<PartitionFailure>,
}

/// Administrative boundary datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundaryLayer {
    /// Country polygons for the whole world.
    World,
    /// First-level regions of the supported country.
    Regions,
    /// Districts of the supported country.
    Districts,
}

impl BoundaryLayer {
    pub const ALL: [BoundaryLayer; 3] = [
        BoundaryLayer::World,
        BoundaryLayer::Regions,
        BoundaryLayer::Districts,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BoundaryLayer::World => "world",
            BoundaryLayer::Regions => "regions",
            BoundaryLayer::Districts => "districts",
        }
    }
}

impl fmt::Display for BoundaryLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Attributes of the boundary polygon containing a point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundaryFeature {
    /// ISO 3166-1 alpha-2 code, set on country features.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iso_code: Option<String>,
    pub name: Label,
    /// Enclosing region, set on district features.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Label>,
}
