//! Geocoder facade.

use super::config::GeocoderConfig;
use super::context::OrchestratorContext;
use super::error::GeocodeError;
use super::options::QueryOptions;
use super::results::GeocodeResult;
use super::stats::GeocoderStats;
use crate::backend::{AsyncHttpClient, BoundaryLayer, QueryBackend};
use crate::boundary::{AdminHierarchy, BoundaryGate, CountryInfo};
use crate::catalog::{PartitionCatalog, PartitionDescriptor, PostcodeCatalog, PostcodeEntry};
use crate::config::{DataSettings, RankedSearch};
use crate::grid::{SpatialGrid, SpatialGridAdapter};
use crate::search::TextSearchStrategy;
use crate::text::normalize_digits;
use dashmap::DashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

/// Joins a base location and a relative path. Absolute URLs pass through.
fn join_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Geocoding over remotely hosted partitions.
///
/// Owns the catalogs and collaborators for its whole lifetime. All query
/// methods take `&self` and may run concurrently.
///
/// # Example
///
/// ```ignore
/// use tilegeo::backend::{AsyncReqwestClient, RemoteBackend};
/// use tilegeo::grid::H3Grid;
/// use tilegeo::service::{Geocoder, GeocoderConfig, QueryOptions};
///
/// let http = AsyncReqwestClient::new()?;
/// let backend = RemoteBackend::new(AsyncReqwestClient::new()?, 256 * 1024 * 1024);
/// let geocoder = Geocoder::initialize(GeocoderConfig::default(), backend, H3Grid::new(), &http).await?;
///
/// let nearby = geocoder.reverse_geocode(24.7136, 46.6753, &QueryOptions::default()).await?;
/// ```
pub struct Geocoder<B: QueryBackend, G: SpatialGrid> {
    context: OrchestratorContext<B, G>,
    closed: AtomicBool,
}

impl<B: QueryBackend, G: SpatialGrid> Geocoder<B, G> {
    /// Loads the indexes and boundary layers and probes ranked search.
    ///
    /// The partition index is read from the configured base location; if
    /// that fails it is retried once from the fallback location, which then
    /// serves every later fetch. The whole sequence runs under the
    /// configured deadline.
    pub async fn initialize<H: AsyncHttpClient>(
        config: GeocoderConfig,
        backend: B,
        grid: G,
        http: &H,
    ) -> Result<Self, GeocodeError> {
        let deadline = config.init_deadline();
        let base_url = config.data().base_url.clone();

        match tokio::time::timeout(deadline, Self::load(config, backend, grid, http)).await {
            Ok(result) => result,
            Err(_) => Err(GeocodeError::CatalogUnavailable {
                stage: "initialization",
                source_url: base_url,
                reason: format!("not finished within {}s", deadline.as_secs_f64()),
            }),
        }
    }

    async fn load<H: AsyncHttpClient>(
        config: GeocoderConfig,
        backend: B,
        grid: G,
        http: &H,
    ) -> Result<Self, GeocodeError> {
        let mut data = config.data().clone();

        let partitions = Self::load_partition_index(&mut data, http).await?;
        info!(
            partitions = partitions.len(),
            addresses = partitions.total_addresses(),
            base_url = %data.base_url,
            "Partition index loaded"
        );

        let postcode_url = join_url(&data.base_url, &data.postcode_index);
        let body = http
            .get(&postcode_url)
            .await
            .map_err(|e| GeocodeError::CatalogUnavailable {
                stage: "postcode index",
                source_url: postcode_url.clone(),
                reason: e.to_string(),
            })?;
        let postcodes = PostcodeCatalog::from_json(&body, &partitions).map_err(|e| {
            GeocodeError::CatalogUnavailable {
                stage: "postcode index",
                source_url: postcode_url.clone(),
                reason: e.to_string(),
            }
        })?;
        info!(postcodes = postcodes.len(), "Postcode index loaded");

        for layer in BoundaryLayer::ALL {
            let path = match layer {
                BoundaryLayer::World => &data.world_boundaries,
                BoundaryLayer::Regions => &data.region_boundaries,
                BoundaryLayer::Districts => &data.district_boundaries,
            };
            let url = join_url(&data.base_url, path);
            backend
                .load_boundaries(layer, &url)
                .await
                .map_err(|e| GeocodeError::CatalogUnavailable {
                    stage: "boundaries",
                    source_url: url.clone(),
                    reason: e.to_string(),
                })?;
        }

        let text_search = match config.search().ranked {
            RankedSearch::Auto => TextSearchStrategy::probe(&backend).await,
            RankedSearch::Off => {
                info!("Ranked search disabled by configuration");
                TextSearchStrategy::fallback_only()
            }
        };

        let country = config.country();
        Ok(Self {
            context: OrchestratorContext {
                partitions,
                postcodes,
                backend,
                grid: SpatialGridAdapter::new(grid, config.grid_resolution()),
                gate: BoundaryGate::new(country.iso_code.clone(), country.bbox),
                text_search,
                search: config.search().clone(),
                data,
                loaded: DashSet::new(),
            },
            closed: AtomicBool::new(false),
        })
    }

    /// Reads the partition index, switching `data.base_url` to the fallback
    /// location when the base cannot serve it.
    async fn load_partition_index<H: AsyncHttpClient>(
        data: &mut DataSettings,
        http: &H,
    ) -> Result<PartitionCatalog, GeocodeError> {
        let primary_url = join_url(&data.base_url, &data.partition_index);
        let primary_err = match fetch_partition_index(http, &primary_url).await {
            Ok(catalog) => return Ok(catalog),
            Err(reason) => reason,
        };

        if data.fallback_url == data.base_url {
            return Err(GeocodeError::CatalogUnavailable {
                stage: "partition index",
                source_url: primary_url,
                reason: primary_err,
            });
        }

        info!(
            from = %data.base_url,
            to = %data.fallback_url,
            reason = %primary_err,
            "Partition index unavailable, falling back to default data location"
        );
        let fallback_url = join_url(&data.fallback_url, &data.partition_index);
        match fetch_partition_index(http, &fallback_url).await {
            Ok(catalog) => {
                data.base_url = data.fallback_url.clone();
                Ok(catalog)
            }
            Err(reason) => Err(GeocodeError::CatalogUnavailable {
                stage: "partition index",
                source_url: fallback_url,
                reason: format!("{} (custom location: {})", reason, primary_err),
            }),
        }
    }

    fn ensure_open(&self) -> Result<&OrchestratorContext<B, G>, GeocodeError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(GeocodeError::Closed);
        }
        Ok(&self.context)
    }

    /// Ranks addresses against free text.
    pub async fn geocode(
        &self,
        text: &str,
        opts: &QueryOptions,
    ) -> Result<GeocodeResult, GeocodeError> {
        self.ensure_open()?.geocode(text, opts).await
    }

    /// Nearest addresses to a point, ascending by distance.
    pub async fn reverse_geocode(
        &self,
        lat: f64,
        lon: f64,
        opts: &QueryOptions,
    ) -> Result<GeocodeResult, GeocodeError> {
        self.ensure_open()?.reverse_geocode(lat, lon, opts).await
    }

    pub async fn search_by_postcode(
        &self,
        postcode: &str,
        opts: &QueryOptions,
    ) -> Result<GeocodeResult, GeocodeError> {
        self.ensure_open()?.search_by_postcode(postcode, opts).await
    }

    pub async fn search_by_number(
        &self,
        number: &str,
        opts: &QueryOptions,
    ) -> Result<GeocodeResult, GeocodeError> {
        self.ensure_open()?.search_by_number(number, opts).await
    }

    pub async fn detect_country(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<Option<CountryInfo>, GeocodeError> {
        self.ensure_open()?.detect_country(lat, lon).await
    }

    /// True if the point lies in the supported country.
    pub async fn is_in_country(&self, lat: f64, lon: f64) -> Result<bool, GeocodeError> {
        self.ensure_open()?.is_in_country(lat, lon).await
    }

    pub async fn get_admin_hierarchy(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<AdminHierarchy, GeocodeError> {
        self.ensure_open()?.admin_hierarchy(lat, lon).await
    }

    /// Postcodes starting with `prefix` (all when `None`), ascending.
    pub fn get_postcodes(
        &self,
        prefix: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<PostcodeEntry>, GeocodeError> {
        let context = self.ensure_open()?;
        let prefix = prefix.map(|p| normalize_digits(p.trim())).unwrap_or_default();
        Ok(context
            .postcodes
            .prefix_search(&prefix, limit)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Partitions whose primary region label equals `region`.
    pub fn get_partitions_by_region(
        &self,
        region: &str,
    ) -> Result<Vec<PartitionDescriptor>, GeocodeError> {
        let context = self.ensure_open()?;
        Ok(context
            .partitions
            .by_region(region.trim())
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn get_stats(&self) -> Result<GeocoderStats, GeocodeError> {
        let context = self.ensure_open()?;
        let postcode_stats = context.postcodes.stats();
        Ok(GeocoderStats {
            partitions: context.partitions.len(),
            total_addresses: context.partitions.total_addresses(),
            total_size_kb: context.partitions.total_size_kb(),
            postcodes: postcode_stats.postcodes,
            avg_partitions_per_postcode: postcode_stats.avg_partitions_per_postcode,
            loaded_partitions: context.loaded_partition_count(),
            ranked_search_available: context.text_search.is_ranked_available(),
            base_url: context.data.base_url.clone(),
        })
    }

    /// Whether forward queries are ranked by the backend's ranked search.
    pub fn is_ranked_search_available(&self) -> bool {
        self.context.text_search.is_ranked_available()
    }

    /// Location serving partition files, after any fallback.
    pub fn base_url(&self) -> &str {
        &self.context.data.base_url
    }

    /// Releases backend state. Later calls fail with [`GeocodeError::Closed`].
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.context.backend.shutdown().await;
        debug!("Geocoder closed");
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

async fn fetch_partition_index<H: AsyncHttpClient>(
    http: &H,
    url: &str,
) -> Result<PartitionCatalog, String> {
    let body = http.get(url).await.map_err(|e| e.to_string())?;
    PartitionCatalog::from_json(&body).map_err(|e| e.to_string())
}
