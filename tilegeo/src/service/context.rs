//! State shared by every query operation.

use super::error::GeocodeError;
use super::results::{GeocodeResult, QueryWarning};
use crate::backend::{FetchOutcome, PartitionSource, Predicate, QueryBackend};
use crate::boundary::BoundaryGate;
use crate::catalog::{PartitionCatalog, PartitionDescriptor, PostcodeCatalog};
use crate::config::{DataSettings, SearchSettings};
use crate::grid::{SpatialGrid, SpatialGridAdapter};
use crate::projection::Column;
use crate::search::TextSearchStrategy;
use dashmap::DashSet;
use tracing::{debug, warn};

/// Catalogs, collaborators and settings owned by one geocoder instance.
///
/// Built once by initialization; read-only afterwards except for the
/// append-only set of partitions that have been read.
pub struct OrchestratorContext<B: QueryBackend, G: SpatialGrid> {
    pub(crate) partitions: PartitionCatalog,
    pub(crate) postcodes: PostcodeCatalog,
    pub(crate) backend: B,
    pub(crate) grid: SpatialGridAdapter<G>,
    pub(crate) gate: BoundaryGate,
    pub(crate) text_search: TextSearchStrategy,
    pub(crate) search: SearchSettings,
    /// Data settings with `base_url` set to the location that served the
    /// partition index.
    pub(crate) data: DataSettings,
    pub(crate) loaded: DashSet<String>,
}

impl<B: QueryBackend, G: SpatialGrid> OrchestratorContext<B, G> {
    /// `{base}/tiles/{id}.{ext}`
    pub(crate) fn partition_url(&self, id: &str) -> String {
        format!(
            "{}/tiles/{}.{}",
            self.data.base_url, id, self.data.tile_extension
        )
    }

    pub(crate) fn sources<'a, I>(&self, ids: I) -> Vec<PartitionSource>
    where
        I: IntoIterator<Item = &'a str>,
    {
        ids.into_iter()
            .map(|id| PartitionSource::new(id, self.partition_url(id)))
            .collect()
    }

    pub(crate) fn sources_for(&self, partitions: &[&PartitionDescriptor]) -> Vec<PartitionSource> {
        self.sources(partitions.iter().map(|p| p.id.as_str()))
    }

    /// Turns a fetch outcome into a result.
    ///
    /// Fails only when every partition failed. Otherwise failed partitions
    /// become a [`QueryWarning::PartialFailure`].
    pub(crate) fn settle(
        &self,
        stage: &'static str,
        outcome: FetchOutcome,
    ) -> Result<GeocodeResult, GeocodeError> {
        if outcome.all_failed() {
            let reason = outcome
                .failures
                .iter()
                .map(|f| format!("{}: {}", f.partition, f.error))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(GeocodeError::BackendUnavailable {
                stage,
                failed: outcome.failures.len(),
                reason,
            });
        }

        for id in &outcome.loaded {
            self.loaded.insert(id.clone());
        }
        debug!(
            stage,
            partitions = outcome.loaded.len(),
            cache_hits = outcome.cache_hits,
            rows = outcome.rows.len(),
            "Fetch complete"
        );

        let mut warnings = Vec::new();
        if !outcome.failures.is_empty() {
            warn!(
                stage,
                failed = outcome.failures.len(),
                succeeded = outcome.loaded.len(),
                "Returning partial results"
            );
            warnings.push(QueryWarning::PartialFailure {
                failed: outcome
                    .failures
                    .iter()
                    .map(|f| f.partition.clone())
                    .collect(),
            });
        }

        Ok(GeocodeResult {
            records: outcome.rows,
            warnings,
            search_mode: None,
        })
    }

    /// Row filter matching `region` in either language.
    pub(crate) fn region_predicate(region: &str) -> Predicate {
        Predicate::Or(vec![
            Predicate::Eq(Column::RegionAr, region.to_string()),
            Predicate::Eq(Column::RegionEn, region.to_string()),
        ])
    }

    pub(crate) fn loaded_partition_count(&self) -> usize {
        self.loaded.len()
    }
}
