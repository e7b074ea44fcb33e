//! Remote backend over HTTP-hosted Parquet partitions.

use super::cache::{PartitionCache, PartitionCacheStats};
use super::decode::decode_partition;
use super::eval::{evaluate, evaluate_scored};
use super::geometry::BoundarySet;
use super::http::AsyncHttpClient;
use super::rank::{Bm25Index, IndexRegistry};
use super::types::{
    AddressRecord, BackendError, BoundaryFeature, BoundaryLayer, BuiltIndex, FetchOutcome,
    IndexId, PartitionFailure, PartitionSource, SearchError,
};
use super::{QueryBackend, QueryRequest};
use crate::projection::Column;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// Backend that fetches partition files over HTTP and evaluates requests
/// locally.
///
/// Partition bodies are kept in a [`PartitionCache`]; each request decodes
/// only the columns it references. Partitions are fetched one after another
/// so that a request never holds more than one in-flight body.
pub struct RemoteBackend<C: AsyncHttpClient> {
    client: C,
    cache: PartitionCache,
    boundaries: RwLock<HashMap<BoundaryLayer, Arc<BoundarySet>>>,
    indexes: IndexRegistry,
    ranked_enabled: bool,
    closed: AtomicBool,
}

impl<C: AsyncHttpClient> RemoteBackend<C> {
    /// Creates a backend with a partition cache of `cache_size_bytes`.
    pub fn new(client: C, cache_size_bytes: usize) -> Self {
        Self {
            client,
            cache: PartitionCache::new(cache_size_bytes),
            boundaries: RwLock::new(HashMap::new()),
            indexes: IndexRegistry::new(),
            ranked_enabled: true,
            closed: AtomicBool::new(false),
        }
    }

    /// Disables ranked search, so the capability probe fails.
    pub fn without_ranked_search(mut self) -> Self {
        self.ranked_enabled = false;
        self
    }

    pub fn cache_stats(&self) -> PartitionCacheStats {
        self.cache.stats()
    }

    /// Returns the raw partition body and whether it came from the cache.
    async fn partition_bytes(&self, source: &PartitionSource) -> Result<(Bytes, bool), BackendError> {
        if let Some(data) = self.cache.get(&source.id) {
            return Ok((data, true));
        }
        let data = self.client.get(&source.url).await?;
        self.cache.put(source.id.clone(), data.clone());
        Ok((data, false))
    }

    /// Fetches and decodes every source, collecting failures.
    async fn collect(
        &self,
        sources: &[PartitionSource],
        columns: &[Column],
    ) -> Result<(Vec<AddressRecord>, FetchOutcome), BackendError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(BackendError::Http("backend is shut down".to_string()));
        }

        let mut rows = Vec::new();
        let mut outcome = FetchOutcome::default();

        for source in sources {
            let result = match self.partition_bytes(source).await {
                Ok((data, hit)) => decode_partition(data, columns).map(|decoded| (decoded, hit)),
                Err(e) => Err(e),
            };
            match result {
                Ok((decoded, hit)) => {
                    if hit {
                        outcome.cache_hits += 1;
                    }
                    rows.extend(decoded);
                    outcome.loaded.push(source.id.clone());
                }
                Err(error) => {
                    warn!(partition = %source.id, url = %source.url, error = %error, "Skipping partition");
                    outcome.failures.push(PartitionFailure {
                        partition: source.id.clone(),
                        error,
                    });
                }
            }
        }

        debug!(
            partitions = sources.len(),
            rows = rows.len(),
            cache_hits = outcome.cache_hits,
            "Remote fetch complete"
        );
        Ok((rows, outcome))
    }
}

impl<C: AsyncHttpClient> QueryBackend for RemoteBackend<C> {
    async fn fetch(&self, request: &QueryRequest) -> Result<FetchOutcome, BackendError> {
        let columns = request.referenced_columns();
        let (rows, mut outcome) = self.collect(&request.sources, &columns).await?;
        outcome.rows = evaluate(rows, request);
        Ok(outcome)
    }

    async fn enable_ranked_search(&self) -> Result<(), SearchError> {
        if self.ranked_enabled {
            Ok(())
        } else {
            Err(SearchError::CapabilityUnavailable(
                "ranked search disabled".to_string(),
            ))
        }
    }

    async fn build_ephemeral_index(
        &self,
        sources: &[PartitionSource],
        field: Column,
    ) -> Result<BuiltIndex, SearchError> {
        if !self.ranked_enabled {
            return Err(SearchError::CapabilityUnavailable(
                "ranked search disabled".to_string(),
            ));
        }

        let (rows, outcome) = self.collect(sources, &[field]).await?;
        if outcome.all_failed() {
            return Err(SearchError::Backend(BackendError::Http(format!(
                "no partition readable for index ({} failed)",
                outcome.failures.len()
            ))));
        }

        let index = Bm25Index::build(
            rows.iter()
                .filter_map(|row| row.text(field).map(|text| (row.id.as_str(), text))),
        )?;
        let documents = index.len();
        let id = self.indexes.insert(index);
        debug!(index = %id, documents, field = %field, "Built ephemeral index");

        Ok(BuiltIndex {
            id,
            documents,
            failures: outcome.failures,
        })
    }

    async fn ranked_search(
        &self,
        index: IndexId,
        query: &str,
        request: &QueryRequest,
    ) -> Result<FetchOutcome, SearchError> {
        let text_index = self.indexes.get(index).ok_or_else(|| {
            SearchError::CapabilityUnavailable(format!("unknown index {}", index))
        })?;

        let scores = text_index.scores(query)?;
        let columns = request.referenced_columns();
        let (rows, mut outcome) = self.collect(&request.sources, &columns).await?;
        outcome.rows = evaluate_scored(rows, request, |row| scores.get(&row.id).copied());
        Ok(outcome)
    }

    fn drop_ephemeral_index(&self, index: IndexId) {
        if self.indexes.remove(index) {
            debug!(index = %index, "Dropped ephemeral index");
        }
    }

    async fn load_boundaries(&self, layer: BoundaryLayer, url: &str) -> Result<(), BackendError> {
        let data = self.client.get(url).await?;
        let set = BoundarySet::from_geojson(&data)?;
        info!(layer = %layer, features = set.len(), "Loaded boundary layer");

        let mut boundaries = self
            .boundaries
            .write()
            .map_err(|_| BackendError::Boundary("boundary store poisoned".to_string()))?;
        boundaries.insert(layer, Arc::new(set));
        Ok(())
    }

    async fn boundary_lookup(
        &self,
        layer: BoundaryLayer,
        lat: f64,
        lon: f64,
    ) -> Result<Option<BoundaryFeature>, BackendError> {
        let set = {
            let boundaries = self
                .boundaries
                .read()
                .map_err(|_| BackendError::Boundary("boundary store poisoned".to_string()))?;
            boundaries
                .get(&layer)
                .cloned()
                .ok_or_else(|| BackendError::Boundary(format!("{} layer not loaded", layer)))?
        };
        Ok(set.lookup(lat, lon).cloned())
    }

    async fn shutdown(&self) {
        self.closed.store(true, Ordering::Release);
        self.cache.clear();
        self.indexes.clear();
        if let Ok(mut boundaries) = self.boundaries.write() {
            boundaries.clear();
        }
    }
}
