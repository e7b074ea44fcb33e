//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This is the single place where INI key names are mapped to struct fields.
//! Every key is optional; absent keys keep their defaults.

use ini::{Ini, Properties};
use std::path::PathBuf;
use std::str::FromStr;

use super::file::ConfigFileError;
use super::settings::ConfigFile;
use super::size::parse_size;
use crate::geo::BoundingBox;

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Non-empty trimmed string value.
fn get_string(section: &Properties, key: &str) -> Option<String> {
    section
        .get(key)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Parses a strictly positive number.
fn get_positive<T>(
    props: &Properties,
    section: &str,
    key: &str,
    reason: &str,
) -> Result<Option<T>, ConfigFileError>
where
    T: FromStr + PartialOrd + Default,
{
    let Some(v) = props.get(key) else {
        return Ok(None);
    };
    match v.trim().parse::<T>() {
        Ok(n) if n > T::default() => Ok(Some(n)),
        _ => Err(invalid(section, key, v, reason)),
    }
}

/// Base URLs are stored without a trailing slash.
fn normalize_url(v: &str) -> String {
    v.trim().trim_end_matches('/').to_string()
}

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [data] section
    if let Some(section) = ini.section(Some("data")) {
        if let Some(v) = get_string(section, "base_url") {
            config.data.base_url = normalize_url(&v);
        }
        if let Some(v) = get_string(section, "fallback_url") {
            config.data.fallback_url = normalize_url(&v);
        }
        if let Some(v) = get_string(section, "tile_extension") {
            config.data.tile_extension = v.trim_start_matches('.').to_string();
        }
        if let Some(v) = get_string(section, "partition_index") {
            config.data.partition_index = v;
        }
        if let Some(v) = get_string(section, "postcode_index") {
            config.data.postcode_index = v;
        }
        if let Some(v) = get_string(section, "world_boundaries") {
            config.data.world_boundaries = v;
        }
        if let Some(v) = get_string(section, "region_boundaries") {
            config.data.region_boundaries = v;
        }
        if let Some(v) = get_string(section, "district_boundaries") {
            config.data.district_boundaries = v;
        }
    }

    // [grid] section
    if let Some(section) = ini.section(Some("grid")) {
        if let Some(v) = section.get("resolution") {
            config.grid.resolution = match v.trim().parse::<u8>() {
                Ok(r) if r <= 15 => r,
                _ => {
                    return Err(invalid(
                        "grid",
                        "resolution",
                        v,
                        "must be an integer between 0 and 15",
                    ))
                }
            };
        }
    }

    // [country] section
    if let Some(section) = ini.section(Some("country")) {
        if let Some(v) = get_string(section, "iso_code") {
            if v.len() != 2 || !v.chars().all(|c| c.is_ascii_alphabetic()) {
                return Err(invalid(
                    "country",
                    "iso_code",
                    &v,
                    "must be a two-letter ISO 3166-1 code",
                ));
            }
            config.country.iso_code = v.to_ascii_uppercase();
        }
        if let Some(v) = section.get("bbox") {
            config.country.bbox = parse_bbox(v).ok_or_else(|| {
                invalid(
                    "country",
                    "bbox",
                    v,
                    "expected 'minLat,minLon,maxLat,maxLon' with min <= max",
                )
            })?;
        }
    }

    // [search] section
    if let Some(section) = ini.section(Some("search")) {
        if let Some(n) = get_positive(
            section,
            "search",
            "max_forward_partitions",
            "must be a positive integer",
        )? {
            config.search.max_forward_partitions = n;
        }
        if let Some(n) = get_positive(
            section,
            "search",
            "max_number_partitions",
            "must be a positive integer",
        )? {
            config.search.max_number_partitions = n;
        }
        if let Some(n) = get_positive(
            section,
            "search",
            "default_limit",
            "must be a positive integer",
        )? {
            config.search.default_limit = n;
        }
        if let Some(r) = get_positive(
            section,
            "search",
            "default_radius_m",
            "must be a positive number (meters)",
        )? {
            config.search.default_radius_m = r;
        }
        if let Some(v) = section.get("unscoped_forward") {
            config.search.unscoped_forward = v
                .parse()
                .map_err(|_| invalid("search", "unscoped_forward", v, "must be 'sample' or 'reject'"))?;
        }
        if let Some(v) = section.get("ranked") {
            config.search.ranked = v
                .parse()
                .map_err(|_| invalid("search", "ranked", v, "must be 'auto' or 'off'"))?;
        }
    }

    // [http] section
    if let Some(section) = ini.section(Some("http")) {
        if let Some(n) = get_positive(
            section,
            "http",
            "timeout_secs",
            "must be a positive integer (seconds)",
        )? {
            config.http.timeout_secs = n;
        }
        if let Some(n) = get_positive(
            section,
            "http",
            "init_deadline_secs",
            "must be a positive integer (seconds)",
        )? {
            config.http.init_deadline_secs = n;
        }
    }

    // [cache] section
    if let Some(section) = ini.section(Some("cache")) {
        if let Some(v) = section.get("partition_cache_size") {
            config.cache.partition_cache_size = parse_size(v).map_err(|_| {
                invalid(
                    "cache",
                    "partition_cache_size",
                    v,
                    "expected format like '256MB', '1GB', or '1024KB'",
                )
            })?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = get_string(section, "level") {
            config.logging.level = v;
        }
        if let Some(v) = get_string(section, "file") {
            config.logging.file = Some(expand_tilde(&v));
        }
    }

    Ok(config)
}

/// Parses `minLat,minLon,maxLat,maxLon`.
fn parse_bbox(v: &str) -> Option<BoundingBox> {
    let parts: Vec<f64> = v
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .ok()?;
    let arr: [f64; 4] = parts.try_into().ok()?;
    BoundingBox::from_lat_lon_array(arr).ok()
}

/// Expand a leading `~` to the home directory.
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
