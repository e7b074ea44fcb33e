//! In-memory query backend.

use super::eval::{evaluate, evaluate_scored};
use super::geometry::BoundarySet;
use super::rank::{Bm25Index, IndexRegistry};
use super::types::{
    AddressRecord, BackendError, BoundaryFeature, BoundaryLayer, BuiltIndex, FetchOutcome,
    IndexId, PartitionFailure, PartitionSource, SearchError,
};
use super::{QueryBackend, QueryRequest};
use crate::projection::Column;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use tracing::debug;

/// Backend holding partitions and boundary layers in memory.
///
/// Partitions are addressed by id; source URLs are ignored. Useful for
/// tests and for embedding small datasets.
///
/// # Example
///
/// ```
/// use tilegeo::backend::{AddressRecord, InMemoryBackend};
///
/// let backend = InMemoryBackend::builder()
///     .partition("8553b1a7fffffff", vec![AddressRecord::new("a1", 24.7136, 46.6753)])
///     .without_ranked_search()
///     .build();
///
/// assert_eq!(backend.partition_count(), 1);
/// ```
pub struct InMemoryBackend {
    partitions: HashMap<String, Vec<AddressRecord>>,
    preloaded: HashMap<BoundaryLayer, BoundarySet>,
    boundaries: RwLock<HashMap<BoundaryLayer, BoundarySet>>,
    ranked_available: bool,
    ranked_failing: bool,
    failing: HashSet<String>,
    indexes: IndexRegistry,
    fetch_calls: AtomicUsize,
    boundary_calls: AtomicUsize,
}

/// Builder for [`InMemoryBackend`].
#[derive(Default)]
pub struct InMemoryBackendBuilder {
    partitions: HashMap<String, Vec<AddressRecord>>,
    boundaries: HashMap<BoundaryLayer, BoundarySet>,
    without_ranked: bool,
    ranked_failing: bool,
    failing: HashSet<String>,
}

impl InMemoryBackendBuilder {
    /// Adds rows to a partition.
    pub fn partition(mut self, id: impl Into<String>, rows: Vec<AddressRecord>) -> Self {
        self.partitions.entry(id.into()).or_default().extend(rows);
        self
    }

    /// Preloads a boundary layer. `load_boundaries` for this layer then
    /// succeeds without reading its URL.
    pub fn boundary(mut self, layer: BoundaryLayer, set: BoundarySet) -> Self {
        self.boundaries.insert(layer, set);
        self
    }

    /// Makes the capability probe fail.
    pub fn without_ranked_search(mut self) -> Self {
        self.without_ranked = true;
        self
    }

    /// Lets the probe succeed but makes every ranked query fail.
    pub fn failing_ranked_search(mut self) -> Self {
        self.ranked_failing = true;
        self
    }

    /// Makes every read of a partition fail.
    pub fn failing_partition(mut self, id: impl Into<String>) -> Self {
        self.failing.insert(id.into());
        self
    }

    pub fn build(self) -> InMemoryBackend {
        InMemoryBackend {
            partitions: self.partitions,
            preloaded: self.boundaries,
            boundaries: RwLock::new(HashMap::new()),
            ranked_available: !self.without_ranked,
            ranked_failing: self.ranked_failing,
            failing: self.failing,
            indexes: IndexRegistry::new(),
            fetch_calls: AtomicUsize::new(0),
            boundary_calls: AtomicUsize::new(0),
        }
    }
}

impl InMemoryBackend {
    pub fn builder() -> InMemoryBackendBuilder {
        InMemoryBackendBuilder::default()
    }

    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    /// Number of `fetch` and `ranked_search` calls served.
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::Relaxed)
    }

    /// Number of `boundary_lookup` calls served.
    pub fn boundary_calls(&self) -> usize {
        self.boundary_calls.load(Ordering::Relaxed)
    }

    /// Number of ephemeral indexes not yet dropped.
    pub fn live_indexes(&self) -> usize {
        self.indexes.live()
    }

    fn read(&self, source: &PartitionSource) -> Result<&[AddressRecord], BackendError> {
        if self.failing.contains(&source.id) {
            return Err(BackendError::Http(format!(
                "HTTP 503 Service Unavailable from {}",
                source.url
            )));
        }
        self.partitions
            .get(&source.id)
            .map(Vec::as_slice)
            .ok_or_else(|| BackendError::UnknownPartition(source.id.clone()))
    }

    /// Gathers rows from every readable source.
    fn collect(&self, sources: &[PartitionSource]) -> (Vec<AddressRecord>, FetchOutcome) {
        let mut rows = Vec::new();
        let mut outcome = FetchOutcome::default();
        for source in sources {
            match self.read(source) {
                Ok(partition) => {
                    rows.extend(partition.iter().cloned());
                    outcome.loaded.push(source.id.clone());
                }
                Err(error) => outcome.failures.push(PartitionFailure {
                    partition: source.id.clone(),
                    error,
                }),
            }
        }
        (rows, outcome)
    }
}

impl QueryBackend for InMemoryBackend {
    async fn fetch(&self, request: &QueryRequest) -> Result<FetchOutcome, BackendError> {
        self.fetch_calls.fetch_add(1, Ordering::Relaxed);
        let (rows, mut outcome) = self.collect(&request.sources);
        debug!(
            partitions = request.sources.len(),
            rows = rows.len(),
            "In-memory fetch"
        );
        outcome.rows = evaluate(rows, request);
        Ok(outcome)
    }

    async fn enable_ranked_search(&self) -> Result<(), SearchError> {
        if self.ranked_available {
            Ok(())
        } else {
            Err(SearchError::CapabilityUnavailable(
                "ranked search extension not installed".to_string(),
            ))
        }
    }

    async fn build_ephemeral_index(
        &self,
        sources: &[PartitionSource],
        field: Column,
    ) -> Result<BuiltIndex, SearchError> {
        if !self.ranked_available || self.ranked_failing {
            return Err(SearchError::CapabilityUnavailable(
                "ranked index build failed".to_string(),
            ));
        }

        let (rows, outcome) = self.collect(sources);
        let index = Bm25Index::build(
            rows.iter()
                .filter_map(|row| row.text(field).map(|text| (row.id.as_str(), text))),
        )?;
        let documents = index.len();
        Ok(BuiltIndex {
            id: self.indexes.insert(index),
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

        self.fetch_calls.fetch_add(1, Ordering::Relaxed);
        let scores = text_index.scores(query)?;
        let (rows, mut outcome) = self.collect(&request.sources);
        outcome.rows = evaluate_scored(rows, request, |row| scores.get(&row.id).copied());
        Ok(outcome)
    }

    fn drop_ephemeral_index(&self, index: IndexId) {
        self.indexes.remove(index);
    }

    async fn load_boundaries(&self, layer: BoundaryLayer, _url: &str) -> Result<(), BackendError> {
        let set = self.preloaded.get(&layer).cloned().unwrap_or_default();
        let mut boundaries = self
            .boundaries
            .write()
            .map_err(|_| BackendError::Boundary("boundary store poisoned".to_string()))?;
        boundaries.insert(layer, set);
        Ok(())
    }

    async fn boundary_lookup(
        &self,
        layer: BoundaryLayer,
        lat: f64,
        lon: f64,
    ) -> Result<Option<BoundaryFeature>, BackendError> {
        self.boundary_calls.fetch_add(1, Ordering::Relaxed);
        let boundaries = self
            .boundaries
            .read()
            .map_err(|_| BackendError::Boundary("boundary store poisoned".to_string()))?;
        let set = boundaries
            .get(&layer)
            .ok_or_else(|| BackendError::Boundary(format!("{} layer not loaded", layer)))?;
        Ok(set.lookup(lat, lon).cloned())
    }

    async fn shutdown(&self) {
        self.indexes.clear();
        if let Ok(mut boundaries) = self.boundaries.write() {
            boundaries.clear();
        }
    }
}
