//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing logic.

use crate::geo::BoundingBox;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Data locations
    pub data: DataSettings,
    /// Partition grid
    pub grid: GridSettings,
    /// Supported country
    pub country: CountrySettings,
    /// Query defaults and caps
    pub search: SearchSettings,
    /// HTTP client and initialization deadline
    pub http: HttpSettings,
    /// Partition cache
    pub cache: CacheSettings,
    /// Logging
    pub logging: LoggingSettings,
}

/// Where the index, boundary and partition files live.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSettings {
    /// Custom base location tried first
    pub base_url: String,
    /// Default location used when the custom one cannot serve the index
    pub fallback_url: String,
    /// Partition file extension (without the dot)
    pub tile_extension: String,
    /// Partition index file, relative to the base
    pub partition_index: String,
    /// Postcode index file, relative to the base
    pub postcode_index: String,
    pub world_boundaries: String,
    pub region_boundaries: String,
    pub district_boundaries: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridSettings {
    /// H3 resolution of the partitions (0-15)
    pub resolution: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountrySettings {
    /// ISO 3166-1 alpha-2 code
    pub iso_code: String,
    /// Bounding box used as a cheap pre-gate
    pub bbox: BoundingBox,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    pub max_forward_partitions: usize,
    pub max_number_partitions: usize,
    pub default_limit: usize,
    pub default_radius_m: f64,
    pub unscoped_forward: UnscopedForward,
    pub ranked: RankedSearch,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub init_deadline_secs: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    /// Partition cache budget in bytes
    pub partition_cache_size: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Default filter directive when RUST_LOG is unset
    pub level: String,
    /// Optional log file
    pub file: Option<PathBuf>,
}

/// Behavior of forward geocoding when neither bbox nor region is given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnscopedForward {
    /// Stride-sample the catalog and attach a warning to the result.
    #[default]
    Sample,
    /// Refuse with an invalid-input error.
    Reject,
}

impl FromStr for UnscopedForward {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sample" => Ok(Self::Sample),
            "reject" => Ok(Self::Reject),
            other => Err(format!("unknown policy '{}'", other)),
        }
    }
}

impl fmt::Display for UnscopedForward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sample => "sample",
            Self::Reject => "reject",
        })
    }
}

/// Whether to probe the backend for ranked search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RankedSearch {
    #[default]
    Auto,
    Off,
}

impl FromStr for RankedSearch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "off" => Ok(Self::Off),
            other => Err(format!("unknown mode '{}'", other)),
        }
    }
}

impl fmt::Display for RankedSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Auto => "auto",
            Self::Off => "off",
        })
    }
}
