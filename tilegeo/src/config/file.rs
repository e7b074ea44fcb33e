//! Locating and loading `~/.tilegeo/config.ini`.
//!
//! The structs live in [`super::settings`]; key-by-key parsing is in
//! [`super::parser`].

use ini::Ini;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use super::settings::*;

const CONFIG_DIR_NAME: &str = ".tilegeo";
const CONFIG_FILE_NAME: &str = "config.ini";

#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// The file exists but is not readable INI.
    #[error("cannot read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// A key holds a value the geocoder cannot use.
    #[error("bad value for [{section}] {key} = '{value}': {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigFile {
    /// Loads from [`config_file_path`].
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Loads from `path`. A missing file yields the built-in defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        match path.try_exists() {
            Ok(true) => super::parser::parse_ini(&Ini::load_from_file(path)?),
            _ => Ok(Self::default()),
        }
    }
}

/// `~/.tilegeo`, or `./.tilegeo` when no home directory is known.
pub fn config_directory() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(CONFIG_DIR_NAME)
}

pub fn config_file_path() -> PathBuf {
    config_directory().join(CONFIG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_COUNTRY_ISO, DEFAULT_DATA_URL, DEFAULT_PARTITION_CACHE_SIZE};
    use std::io::Write;

    #[test]
    fn defaults_cover_every_section() {
        let config = ConfigFile::default();

        assert_eq!(config.data.base_url, DEFAULT_DATA_URL);
        assert_eq!(config.data.tile_extension, "parquet");
        assert_eq!(config.grid.resolution, 5);
        assert_eq!(config.country.iso_code, DEFAULT_COUNTRY_ISO);
        assert_eq!(config.country.bbox.min_lat, 16.0);
        assert_eq!(config.country.bbox.max_lon, 55.7);
        assert_eq!(config.search.max_forward_partitions, 50);
        assert_eq!(config.search.max_number_partitions, 20);
        assert_eq!(config.cache.partition_cache_size, DEFAULT_PARTITION_CACHE_SIZE);
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = ConfigFile::load_from(&dir.path().join("absent.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn values_on_disk_override_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[grid]\nresolution = 6").unwrap();
        drop(file);

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.grid.resolution, 6);
        assert_eq!(config.data.base_url, DEFAULT_DATA_URL);
    }

    #[test]
    fn path_is_under_home() {
        assert!(config_file_path().ends_with(".tilegeo/config.ini"));
    }
}
