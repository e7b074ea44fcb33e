//! CLI runner for common setup.
//!
//! Loads configuration, initializes logging and builds the geocoder so
//! command handlers only deal with queries and output.

use crate::error::CliError;
use std::path::Path;
use tilegeo::backend::{AsyncReqwestClient, RemoteBackend};
use tilegeo::config::{format_size, ConfigFile};
use tilegeo::grid::H3Grid;
use tilegeo::logging::{init_logging, LoggingGuard};
use tilegeo::service::{Geocoder, GeocoderConfig};
use tracing::info;

/// Geocoder type used by every command.
pub type CliGeocoder = Geocoder<RemoteBackend<AsyncReqwestClient>, H3Grid>;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps file logging active while runner exists
    _logging_guard: LoggingGuard,
    config: ConfigFile,
}

impl CliRunner {
    /// Loads the configuration file (defaults when absent) and starts logging.
    pub fn new(config_path: Option<&Path>) -> Result<Self, CliError> {
        let config = match config_path {
            Some(path) => ConfigFile::load_from(path)?,
            None => ConfigFile::load()?,
        };

        let logging_guard =
            init_logging(&config.logging).map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            _logging_guard: logging_guard,
            config,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn log_startup(&self) {
        info!(version = tilegeo::VERSION, "tilegeo starting");
        info!(
            base_url = %self.config.data.base_url,
            cache = %format_size(self.config.cache.partition_cache_size),
            "Data location"
        );
    }

    /// Builds a remote-backed geocoder from the loaded configuration.
    pub async fn create_geocoder(&self) -> Result<CliGeocoder, CliError> {
        let timeout = self.config.http.timeout_secs;
        let index_client =
            AsyncReqwestClient::with_timeout(timeout).map_err(|e| CliError::Setup(e.to_string()))?;
        let partition_client =
            AsyncReqwestClient::with_timeout(timeout).map_err(|e| CliError::Setup(e.to_string()))?;

        let backend = RemoteBackend::new(partition_client, self.config.cache.partition_cache_size);
        let config = GeocoderConfig::from(self.config());

        Geocoder::initialize(config, backend, H3Grid::new(), &index_client)
            .await
            .map_err(CliError::Initialization)
            .inspect(|g| {
                info!(
                    base_url = %g.base_url(),
                    ranked = g.is_ranked_search_available(),
                    "Geocoder ready"
                )
            })
    }
}
