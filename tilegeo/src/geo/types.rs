//! Geographic type definitions

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Valid latitude range
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Mean Earth radius in meters, used by the haversine distance.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Kilometers per degree of longitude at the equator.
pub const KM_PER_DEG_LON_EQUATOR: f64 = 111.32;

/// Kilometers per degree of latitude.
pub const KM_PER_DEG_LAT: f64 = 110.574;

/// Errors from coordinate validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    #[error("Invalid latitude: {0} (must be between -90 and 90)")]
    InvalidLatitude(f64),

    #[error("Invalid longitude: {0} (must be between -180 and 180)")]
    InvalidLongitude(f64),

    #[error("Invalid bounding box: {0}")]
    InvalidBoundingBox(String),
}

/// Axis-aligned geographic rectangle.
///
/// Field names match the partition index documents, so the same type is
/// used for stored partition extents and for caller-supplied query boxes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Creates a box, rejecting inverted or non-finite extents.
    pub fn new(min_lon: f64, max_lon: f64, min_lat: f64, max_lat: f64) -> Result<Self, CoordError> {
        let values = [min_lon, max_lon, min_lat, max_lat];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(CoordError::InvalidBoundingBox(
                "all bounds must be finite".to_string(),
            ));
        }
        if min_lon > max_lon || min_lat > max_lat {
            return Err(CoordError::InvalidBoundingBox(format!(
                "min must not exceed max (lon {}..{}, lat {}..{})",
                min_lon, max_lon, min_lat, max_lat
            )));
        }
        Ok(Self {
            min_lon,
            max_lon,
            min_lat,
            max_lat,
        })
    }

    /// Creates a box from the `[minLat, minLon, maxLat, maxLon]` order used
    /// by query options.
    pub fn from_lat_lon_array(values: [f64; 4]) -> Result<Self, CoordError> {
        let [min_lat, min_lon, max_lat, max_lon] = values;
        Self::new(min_lon, max_lon, min_lat, max_lat)
    }

    /// Rectangle intersection test. Touching edges count as overlap.
    #[inline]
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_lon <= other.max_lon
            && self.max_lon >= other.min_lon
            && self.min_lat <= other.max_lat
            && self.max_lat >= other.min_lat
    }

    /// Returns true if the point lies inside the box or on its boundary.
    #[inline]
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lon >= self.min_lon && lon <= self.max_lon
    }

    /// Center point as `(lat, lon)`.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }
}
