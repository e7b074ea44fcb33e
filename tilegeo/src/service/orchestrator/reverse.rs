//! Reverse geocoding: nearest addresses to a point.

use crate::backend::{Direction, Predicate, QueryBackend, QueryRequest, SortKey};
use crate::geo::{bbox_around, validate_point};
use crate::grid::SpatialGrid;
use crate::projection::{project, Column};
use crate::service::context::OrchestratorContext;
use crate::service::error::GeocodeError;
use crate::service::options::QueryOptions;
use crate::service::results::GeocodeResult;
use tracing::debug;

impl<B: QueryBackend, G: SpatialGrid> OrchestratorContext<B, G> {
    /// Addresses inside the radius box around the point, nearest first.
    ///
    /// Points outside the supported country, or in a cell with no
    /// partition, give an empty result.
    pub(crate) async fn reverse_geocode(
        &self,
        lat: f64,
        lon: f64,
        opts: &QueryOptions,
    ) -> Result<GeocodeResult, GeocodeError> {
        opts.validate()?;
        validate_point(lat, lon)?;

        let inside = self
            .gate
            .country_contains(&self.backend, lat, lon, self.gate.iso_code())
            .await
            .map_err(|e| GeocodeError::backend("country check", &e))?;
        if !inside {
            debug!(lat, lon, "Point outside supported country");
            return Ok(GeocodeResult::empty());
        }

        let ring = u32::from(opts.include_neighbors);
        let ids = self
            .grid
            .candidate_partitions(lat, lon, ring, &self.partitions)?;
        if ids.is_empty() {
            debug!(lat, lon, "No partition covers point");
            return Ok(GeocodeResult::empty());
        }

        let radius = opts.radius_meters.unwrap_or(self.search.default_radius_m);
        let bbox = bbox_around(lat, lon, radius);
        let limit = opts.limit.unwrap_or(self.search.default_limit);
        debug!(partitions = ?ids, radius, limit, "Reverse geocode candidates");

        let request = QueryRequest::builder()
            .sources(self.sources(ids.iter().map(String::as_str)))
            .columns(project(opts.detail_level, &[]))
            .filter(Predicate::WithinBox(bbox))
            .distance_from(lat, lon)
            .order_by(SortKey::Distance, Direction::Asc)
            .order_by(SortKey::Column(Column::Id), Direction::Asc)
            .limit(limit)
            .build();

        let outcome = self
            .backend
            .fetch(&request)
            .await
            .map_err(|e| GeocodeError::BackendUnavailable {
                stage: "reverse geocode",
                failed: ids.len(),
                reason: e.to_string(),
            })?;
        self.settle("reverse geocode", outcome)
    }
}
