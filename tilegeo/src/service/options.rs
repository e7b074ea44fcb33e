//! Per-query options.

use super::error::GeocodeError;
use crate::geo::BoundingBox;
use crate::projection::{Column, DetailLevel};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Preferred language for language-dependent ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Ar,
    En,
}

impl Language {
    /// Street column in this language.
    pub fn street_column(self) -> Column {
        match self {
            Language::Ar => Column::StreetAr,
            Language::En => Column::StreetEn,
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ar" => Ok(Language::Ar),
            "en" => Ok(Language::En),
            other => Err(format!("unknown language '{}' (expected ar or en)", other)),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Language::Ar => "ar",
            Language::En => "en",
        })
    }
}

/// Options shared by the query operations.
///
/// Unset limits and radii take the operation's default.
///
/// # Example
///
/// ```
/// use tilegeo::projection::DetailLevel;
/// use tilegeo::service::QueryOptions;
///
/// let opts = QueryOptions::new()
///     .with_limit(5)
///     .with_radius_meters(250.0)
///     .with_detail_level(DetailLevel::Minimal);
///
/// assert_eq!(opts.limit, Some(5));
/// assert!(opts.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    pub limit: Option<usize>,
    /// Reverse geocoding search radius.
    pub radius_meters: Option<f64>,
    pub detail_level: DetailLevel,
    pub bbox: Option<BoundingBox>,
    /// Region label (Arabic or English) restricting partitions and rows.
    pub region: Option<String>,
    pub language: Language,
    /// Reverse geocoding also searches the ring of neighboring partitions.
    pub include_neighbors: bool,
    /// Postcode search narrowed to one house number.
    pub house_number: Option<String>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_radius_meters(mut self, radius: f64) -> Self {
        self.radius_meters = Some(radius);
        self
    }

    pub fn with_detail_level(mut self, level: DetailLevel) -> Self {
        self.detail_level = level;
        self
    }

    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_neighbors(mut self, include: bool) -> Self {
        self.include_neighbors = include;
        self
    }

    pub fn with_house_number(mut self, number: impl Into<String>) -> Self {
        self.house_number = Some(number.into());
        self
    }

    /// Checks that the limit and radius are positive.
    pub fn validate(&self) -> Result<(), GeocodeError> {
        if self.limit == Some(0) {
            return Err(GeocodeError::InvalidInput(
                "limit must be greater than zero".to_string(),
            ));
        }
        if let Some(radius) = self.radius_meters {
            if !radius.is_finite() || radius <= 0.0 {
                return Err(GeocodeError::InvalidInput(format!(
                    "radius must be a positive number of meters, got {}",
                    radius
                )));
            }
        }
        Ok(())
    }

    /// Region label with surrounding whitespace removed, if non-empty.
    pub(crate) fn region_name(&self) -> Option<&str> {
        self.region.as_deref().map(str::trim).filter(|r| !r.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = QueryOptions::default();
        assert_eq!(opts.limit, None);
        assert_eq!(opts.detail_level, DetailLevel::Full);
        assert_eq!(opts.language, Language::Ar);
        assert!(!opts.include_neighbors);
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_limit() {
        let err = QueryOptions::new().with_limit(0).validate().unwrap_err();
        assert!(matches!(err, GeocodeError::InvalidInput(_)));
    }

    #[test]
    fn test_validate_rejects_bad_radius() {
        assert!(QueryOptions::new().with_radius_meters(0.0).validate().is_err());
        assert!(QueryOptions::new().with_radius_meters(-5.0).validate().is_err());
        assert!(QueryOptions::new()
            .with_radius_meters(f64::NAN)
            .validate()
            .is_err());
    }

    #[test]
    fn test_blank_region_is_ignored() {
        assert_eq!(QueryOptions::new().with_region("  ").region_name(), None);
        assert_eq!(
            QueryOptions::new().with_region(" Riyadh ").region_name(),
            Some("Riyadh")
        );
    }

    #[test]
    fn test_language_street_column() {
        assert_eq!(Language::Ar.street_column(), Column::StreetAr);
        assert_eq!("EN".parse::<Language>().unwrap(), Language::En);
        assert!("fr".parse::<Language>().is_err());
    }
}
