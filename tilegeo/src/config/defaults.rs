//! Default values and constants for all configuration settings.

use super::settings::*;
use crate::geo::BoundingBox;

// =============================================================================
// [data]
// =============================================================================

/// Hosted dataset location; also the fallback when a custom base fails.
pub const DEFAULT_DATA_URL: &str = "https://data.tilegeo.dev/v1";
pub const DEFAULT_TILE_EXTENSION: &str = "parquet";
pub const DEFAULT_PARTITION_INDEX: &str = "tile_index.json";
pub const DEFAULT_POSTCODE_INDEX: &str = "postcode_index.json";
pub const DEFAULT_WORLD_BOUNDARIES: &str = "boundaries/world.geojson";
pub const DEFAULT_REGION_BOUNDARIES: &str = "boundaries/regions.geojson";
pub const DEFAULT_DISTRICT_BOUNDARIES: &str = "boundaries/districts.geojson";

// =============================================================================
// [grid] / [country]
// =============================================================================

pub const DEFAULT_GRID_RESOLUTION: u8 = crate::grid::DEFAULT_RESOLUTION;
pub const DEFAULT_COUNTRY_ISO: &str = "SA";

/// Saudi Arabia extent as `[minLat, minLon, maxLat, maxLon]`.
pub const DEFAULT_COUNTRY_BBOX: [f64; 4] = [16.0, 34.5, 32.5, 55.7];

// =============================================================================
// [search]
// =============================================================================

pub const DEFAULT_MAX_FORWARD_PARTITIONS: usize = 50;
pub const DEFAULT_MAX_NUMBER_PARTITIONS: usize = 20;
pub const DEFAULT_LIMIT: usize = 10;
pub const DEFAULT_POSTCODE_LIMIT: usize = 50;
pub const DEFAULT_NUMBER_LIMIT: usize = 20;
pub const DEFAULT_RADIUS_M: f64 = 1000.0;

// =============================================================================
// [http] / [cache] / [logging]
// =============================================================================

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = crate::backend::DEFAULT_TIMEOUT_SECS;
pub const DEFAULT_INIT_DEADLINE_SECS: u64 = 60;
pub const DEFAULT_PARTITION_CACHE_SIZE: usize = 256 * 1024 * 1024;
pub const DEFAULT_LOG_LEVEL: &str = "info";

fn default_country_bbox() -> BoundingBox {
    let [min_lat, min_lon, max_lat, max_lon] = DEFAULT_COUNTRY_BBOX;
    BoundingBox {
        min_lon,
        max_lon,
        min_lat,
        max_lat,
    }
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_DATA_URL.to_string(),
            fallback_url: DEFAULT_DATA_URL.to_string(),
            tile_extension: DEFAULT_TILE_EXTENSION.to_string(),
            partition_index: DEFAULT_PARTITION_INDEX.to_string(),
            postcode_index: DEFAULT_POSTCODE_INDEX.to_string(),
            world_boundaries: DEFAULT_WORLD_BOUNDARIES.to_string(),
            region_boundaries: DEFAULT_REGION_BOUNDARIES.to_string(),
            district_boundaries: DEFAULT_DISTRICT_BOUNDARIES.to_string(),
        }
    }
}

impl Default for CountrySettings {
    fn default() -> Self {
        Self {
            iso_code: DEFAULT_COUNTRY_ISO.to_string(),
            bbox: default_country_bbox(),
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_forward_partitions: DEFAULT_MAX_FORWARD_PARTITIONS,
            max_number_partitions: DEFAULT_MAX_NUMBER_PARTITIONS,
            default_limit: DEFAULT_LIMIT,
            default_radius_m: DEFAULT_RADIUS_M,
            unscoped_forward: UnscopedForward::default(),
            ranked: RankedSearch::default(),
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            data: DataSettings::default(),
            grid: GridSettings {
                resolution: DEFAULT_GRID_RESOLUTION,
            },
            country: CountrySettings::default(),
            search: SearchSettings::default(),
            http: HttpSettings {
                timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
                init_deadline_secs: DEFAULT_INIT_DEADLINE_SECS,
            },
            cache: CacheSettings {
                partition_cache_size: DEFAULT_PARTITION_CACHE_SIZE,
            },
            logging: LoggingSettings {
                level: DEFAULT_LOG_LEVEL.to_string(),
                file: None,
            },
        }
    }
}
