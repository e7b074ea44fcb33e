//! Geocoder configuration.

use crate::config::{
    ConfigFile, CountrySettings, DataSettings, RankedSearch, SearchSettings, UnscopedForward,
    DEFAULT_GRID_RESOLUTION, DEFAULT_INIT_DEADLINE_SECS,
};
use crate::geo::BoundingBox;
use std::time::Duration;

/// Everything [`Geocoder::initialize`](super::Geocoder::initialize) needs
/// besides its collaborators.
///
/// # Example
///
/// ```
/// use tilegeo::service::GeocoderConfig;
///
/// let config = GeocoderConfig::builder()
///     .base_url("https://mirror.example.com/geo")
///     .init_deadline_secs(10)
///     .build();
///
/// assert_eq!(config.data().base_url, "https://mirror.example.com/geo");
/// assert_eq!(config.init_deadline().as_secs(), 10);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GeocoderConfig {
    data: DataSettings,
    country: CountrySettings,
    search: SearchSettings,
    grid_resolution: u8,
    init_deadline: Duration,
}

impl GeocoderConfig {
    pub fn builder() -> GeocoderConfigBuilder {
        GeocoderConfigBuilder::default()
    }

    /// Data locations; `base_url` is the location tried first.
    pub fn data(&self) -> &DataSettings {
        &self.data
    }

    pub fn country(&self) -> &CountrySettings {
        &self.country
    }

    pub fn search(&self) -> &SearchSettings {
        &self.search
    }

    pub fn grid_resolution(&self) -> u8 {
        self.grid_resolution
    }

    /// Deadline on the whole initialization sequence.
    pub fn init_deadline(&self) -> Duration {
        self.init_deadline
    }
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl From<&ConfigFile> for GeocoderConfig {
    fn from(file: &ConfigFile) -> Self {
        Self::builder()
            .data(file.data.clone())
            .country(file.country.clone())
            .search(file.search.clone())
            .grid_resolution(file.grid.resolution)
            .init_deadline_secs(file.http.init_deadline_secs)
            .build()
    }
}

/// Builder for [`GeocoderConfig`].
#[derive(Debug, Clone, Default)]
pub struct GeocoderConfigBuilder {
    data: Option<DataSettings>,
    base_url: Option<String>,
    fallback_url: Option<String>,
    country: Option<CountrySettings>,
    search: Option<SearchSettings>,
    unscoped_forward: Option<UnscopedForward>,
    ranked: Option<RankedSearch>,
    grid_resolution: Option<u8>,
    init_deadline_secs: Option<u64>,
}

impl GeocoderConfigBuilder {
    pub fn data(mut self, data: DataSettings) -> Self {
        self.data = Some(data);
        self
    }

    /// Overrides the custom base location.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Overrides the default location used when the base fails.
    pub fn fallback_url(mut self, url: impl Into<String>) -> Self {
        self.fallback_url = Some(url.into());
        self
    }

    pub fn country(mut self, country: CountrySettings) -> Self {
        self.country = Some(country);
        self
    }

    /// Supported country by ISO code and bounding box.
    pub fn country_bounds(self, iso_code: impl Into<String>, bbox: BoundingBox) -> Self {
        self.country(CountrySettings {
            iso_code: iso_code.into(),
            bbox,
        })
    }

    pub fn search(mut self, search: SearchSettings) -> Self {
        self.search = Some(search);
        self
    }

    pub fn unscoped_forward(mut self, policy: UnscopedForward) -> Self {
        self.unscoped_forward = Some(policy);
        self
    }

    pub fn ranked(mut self, ranked: RankedSearch) -> Self {
        self.ranked = Some(ranked);
        self
    }

    pub fn grid_resolution(mut self, resolution: u8) -> Self {
        self.grid_resolution = Some(resolution);
        self
    }

    pub fn init_deadline_secs(mut self, secs: u64) -> Self {
        self.init_deadline_secs = Some(secs);
        self
    }

    pub fn build(self) -> GeocoderConfig {
        let mut data = self.data.unwrap_or_default();
        if let Some(url) = self.base_url {
            data.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = self.fallback_url {
            data.fallback_url = url.trim_end_matches('/').to_string();
        }

        let mut search = self.search.unwrap_or_default();
        if let Some(policy) = self.unscoped_forward {
            search.unscoped_forward = policy;
        }
        if let Some(ranked) = self.ranked {
            search.ranked = ranked;
        }

        GeocoderConfig {
            data,
            country: self.country.unwrap_or_default(),
            search,
            grid_resolution: self.grid_resolution.unwrap_or(DEFAULT_GRID_RESOLUTION),
            init_deadline: Duration::from_secs(
                self.init_deadline_secs
                    .unwrap_or(DEFAULT_INIT_DEADLINE_SECS),
            ),
        }
    }
}
