//! Geographic primitives
//!
//! Coordinate validation, bounding boxes, great-circle distance and the
//! radius-to-box approximation used by reverse geocoding.

mod types;


pub use types::{
    BoundingBox, CoordError, EARTH_RADIUS_M, KM_PER_DEG_LAT, KM_PER_DEG_LON_EQUATOR, MAX_LAT,
    MAX_LON, MIN_LAT, MIN_LON,
};

/// Validates a latitude/longitude pair.
#[inline]
pub fn validate_point(lat: f64, lon: f64) -> Result<(), CoordError> {
    if !lat.is_finite() || !(MIN_LAT..=MAX_LAT).contains(&lat) {
        return Err(CoordError::InvalidLatitude(lat));
    }
    if !lon.is_finite() || !(MIN_LON..=MAX_LON).contains(&lon) {
        return Err(CoordError::InvalidLongitude(lon));
    }
    Ok(())
}

/// Great-circle distance between two points in meters (haversine).
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Computes the box around a point covering `radius_m` meters using a local
/// equirectangular approximation.
///
/// `lon_delta = radius_km / (111.32 * cos(lat))`, `lat_delta = radius_km / 110.574`.
/// The result is clamped to valid coordinate ranges.
pub fn bbox_around(lat: f64, lon: f64, radius_m: f64) -> BoundingBox {
    let radius_km = radius_m / 1000.0;
    let lat_delta = radius_km / KM_PER_DEG_LAT;

    // cos(lat) collapses to zero at the poles
    let cos_lat = lat.to_radians().cos().abs().max(1e-6);
    let lon_delta = (radius_km / (KM_PER_DEG_LON_EQUATOR * cos_lat)).min(180.0);

    BoundingBox {
        min_lon: (lon - lon_delta).max(MIN_LON),
        max_lon: (lon + lon_delta).min(MAX_LON),
        min_lat: (lat - lat_delta).max(MIN_LAT),
        max_lat: (lat + lat_delta).min(MAX_LAT),
    }
}

/// Largest distance from the center to any point of the box produced by
/// [`bbox_around`], i.e. the corner distance.
pub fn effective_radius_m(lat: f64, lon: f64, radius_m: f64) -> f64 {
    let bbox = bbox_around(lat, lon, radius_m);
    [
        (bbox.min_lat, bbox.min_lon),
        (bbox.min_lat, bbox.max_lon),
        (bbox.max_lat, bbox.min_lon),
        (bbox.max_lat, bbox.max_lon),
    ]
    .iter()
    .map(|(clat, clon)| haversine_m(lat, lon, *clat, *clon))
    .fold(0.0, f64::max)
}
