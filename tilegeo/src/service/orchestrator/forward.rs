//! Forward geocoding: free text to addresses.

use crate::backend::{Predicate, QueryBackend};
use crate::catalog::sample_evenly;
use crate::config::UnscopedForward;
use crate::grid::SpatialGrid;
use crate::projection::project;
use crate::search::TextQuery;
use crate::service::context::OrchestratorContext;
use crate::service::error::GeocodeError;
use crate::service::options::QueryOptions;
use crate::service::results::{GeocodeResult, QueryWarning};
use tracing::{debug, warn};

impl<B: QueryBackend, G: SpatialGrid> OrchestratorContext<B, G> {
    /// Ranks addresses against `text`.
    ///
    /// Candidate partitions come from the bbox when given, else from the
    /// region, else from the whole catalog. Scoped sets keep the smallest
    /// files up to the cap; the whole catalog is stride-sampled.
    pub(crate) async fn geocode(
        &self,
        text: &str,
        opts: &QueryOptions,
    ) -> Result<GeocodeResult, GeocodeError> {
        opts.validate()?;
        let cap = self.search.max_forward_partitions;
        let region = opts.region_name();

        let mut warnings = Vec::new();
        let mut filter = Predicate::True;
        let (candidates, scoped) = if let Some(bbox) = &opts.bbox {
            filter = filter.and(Predicate::WithinBox(*bbox));
            (self.partitions.by_bounding_box_overlap(bbox), true)
        } else if let Some(region) = region {
            (self.partitions.by_region(region), true)
        } else {
            let total = self.partitions.len();
            match self.search.unscoped_forward {
                UnscopedForward::Reject => {
                    return Err(GeocodeError::InvalidInput(
                        "forward geocoding needs a bbox or region".to_string(),
                    ));
                }
                UnscopedForward::Sample => {
                    warn!(
                        total,
                        cap, "Forward geocoding without bbox or region, sampling the catalog"
                    );
                }
            }
            (self.partitions.all().iter().collect(), false)
        };
        if let Some(region) = region {
            filter = filter.and(Self::region_predicate(region));
        }

        let considered = candidates.len();
        let selected = sample_evenly(candidates, cap, scoped);
        if !scoped {
            warnings.push(QueryWarning::UnscopedForwardSearch {
                sampled: selected.len(),
                total: considered,
            });
        }
        if selected.is_empty() {
            debug!("No partitions match forward geocoding scope");
            return Ok(GeocodeResult::empty().with_warnings(warnings));
        }
        debug!(
            considered,
            selected = selected.len(),
            scoped,
            "Forward geocode candidates"
        );

        let sources = self.sources_for(&selected);
        let query = TextQuery {
            sources: &sources,
            text,
            columns: project(opts.detail_level, &[]),
            filter,
            limit: opts.limit.unwrap_or(self.search.default_limit),
        };

        let searched = self
            .text_search
            .search(&self.backend, query)
            .await
            .map_err(|e| GeocodeError::BackendUnavailable {
                stage: "forward geocode",
                failed: sources.len(),
                reason: e.to_string(),
            })?;

        let mut result = self.settle("forward geocode", searched.outcome)?;
        result.search_mode = Some(searched.mode);
        Ok(result.with_warnings(warnings))
    }
}
