//! Exact-match lookups (postcode, house number) and boundary pass-throughs.

use crate::backend::{Direction, Predicate, QueryBackend, QueryRequest, SortKey};
use crate::boundary::{AdminHierarchy, CountryInfo};
use crate::config::{DEFAULT_NUMBER_LIMIT, DEFAULT_POSTCODE_LIMIT};
use crate::geo::validate_point;
use crate::grid::SpatialGrid;
use crate::projection::{project, Column};
use crate::service::context::OrchestratorContext;
use crate::service::error::GeocodeError;
use crate::service::options::QueryOptions;
use crate::service::results::{GeocodeResult, QueryWarning};
use crate::text::normalize_digits;
use tracing::{debug, warn};

impl<B: QueryBackend, G: SpatialGrid> OrchestratorContext<B, G> {
    /// Addresses with exactly this postcode, by house number.
    ///
    /// Only the postcode's own partitions are read; an unknown postcode
    /// gives an empty result.
    pub(crate) async fn search_by_postcode(
        &self,
        postcode: &str,
        opts: &QueryOptions,
    ) -> Result<GeocodeResult, GeocodeError> {
        opts.validate()?;
        let code = normalize_digits(postcode.trim());
        let Some(entry) = self.postcodes.get(&code) else {
            debug!(postcode = %code, "Unknown postcode");
            return Ok(GeocodeResult::empty());
        };

        let mut filter = Predicate::Eq(Column::Postcode, code.clone());
        if let Some(number) = opts.house_number.as_deref().map(str::trim) {
            if !number.is_empty() {
                filter = filter.and(Predicate::Eq(Column::HouseNumber, normalize_digits(number)));
            }
        }
        if let Some(region) = opts.region_name() {
            filter = filter.and(Self::region_predicate(region));
        }
        debug!(postcode = %code, partitions = ?entry.partition_ids, "Postcode candidates");

        let request = QueryRequest::builder()
            .sources(self.sources(entry.partition_ids.iter().map(String::as_str)))
            .columns(project(opts.detail_level, &[]))
            .filter(filter)
            .order_by(SortKey::Column(Column::HouseNumber), Direction::Asc)
            .order_by(SortKey::Column(Column::Id), Direction::Asc)
            .limit(opts.limit.unwrap_or(DEFAULT_POSTCODE_LIMIT))
            .build();

        let outcome = self
            .backend
            .fetch(&request)
            .await
            .map_err(|e| GeocodeError::BackendUnavailable {
                stage: "postcode search",
                failed: entry.partition_ids.len(),
                reason: e.to_string(),
            })?;
        self.settle("postcode search", outcome)
    }

    /// Addresses with exactly this house number, by postcode then street.
    ///
    /// A region or bbox scope reads every partition in scope. House numbers
    /// repeat across the country, so without a scope only the first catalog
    /// partitions are searched and the result carries a
    /// [`QueryWarning::UnscopedNumberSearch`].
    pub(crate) async fn search_by_number(
        &self,
        number: &str,
        opts: &QueryOptions,
    ) -> Result<GeocodeResult, GeocodeError> {
        opts.validate()?;
        let number = normalize_digits(number.trim());
        if number.is_empty() {
            return Err(GeocodeError::InvalidInput(
                "house number must not be empty".to_string(),
            ));
        }

        let mut filter = Predicate::Eq(Column::HouseNumber, number.clone());
        let mut warnings = Vec::new();

        let candidates = if let Some(region) = opts.region_name() {
            filter = filter.and(Self::region_predicate(region));
            self.partitions.by_region(region)
        } else if let Some(bbox) = &opts.bbox {
            filter = filter.and(Predicate::WithinBox(*bbox));
            self.partitions.by_bounding_box_overlap(bbox)
        } else {
            let total = self.partitions.len();
            let cap = self.search.max_number_partitions;
            let first: Vec<_> = self.partitions.all().iter().take(cap).collect();
            warn!(
                number = %number,
                searched = first.len(),
                total,
                "House-number search without region or bbox, results are not scoped"
            );
            warnings.push(QueryWarning::UnscopedNumberSearch {
                searched: first.len(),
                total,
            });
            first
        };

        if candidates.is_empty() {
            debug!(number = %number, "No partitions match house-number scope");
            return Ok(GeocodeResult::empty().with_warnings(warnings));
        }

        let request = QueryRequest::builder()
            .sources(self.sources_for(&candidates))
            .columns(project(opts.detail_level, &[]))
            .filter(filter)
            .order_by(SortKey::Column(Column::Postcode), Direction::Asc)
            .order_by(
                SortKey::Column(opts.language.street_column()),
                Direction::Asc,
            )
            .order_by(SortKey::Column(Column::Id), Direction::Asc)
            .limit(opts.limit.unwrap_or(DEFAULT_NUMBER_LIMIT))
            .build();

        let outcome = self
            .backend
            .fetch(&request)
            .await
            .map_err(|e| GeocodeError::BackendUnavailable {
                stage: "house-number search",
                failed: candidates.len(),
                reason: e.to_string(),
            })?;
        Ok(self
            .settle("house-number search", outcome)?
            .with_warnings(warnings))
    }

    pub(crate) async fn detect_country(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<Option<CountryInfo>, GeocodeError> {
        validate_point(lat, lon)?;
        self.gate
            .country_of(&self.backend, lat, lon)
            .await
            .map_err(|e| GeocodeError::backend("country detection", &e))
    }

    pub(crate) async fn is_in_country(&self, lat: f64, lon: f64) -> Result<bool, GeocodeError> {
        validate_point(lat, lon)?;
        self.gate
            .country_contains(&self.backend, lat, lon, self.gate.iso_code())
            .await
            .map_err(|e| GeocodeError::backend("country check", &e))
    }

    pub(crate) async fn admin_hierarchy(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<AdminHierarchy, GeocodeError> {
        validate_point(lat, lon)?;
        self.gate
            .hierarchy(&self.backend, lat, lon)
            .await
            .map_err(|e| GeocodeError::backend("admin hierarchy", &e))
    }
}
