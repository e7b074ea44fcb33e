//! Query orchestration.
//!
//! Each operation resolves the smallest candidate partition set it can
//! (grid cell, postcode entry, bbox overlap or region), builds one
//! structured [`QueryRequest`](crate::backend::QueryRequest) over those
//! partitions and settles the backend outcome into a [`GeocodeResult`].
//!
//! | operation | candidates | order |
//! |---|---|---|
//! | reverse | containing cell (+ ring) | distance, id |
//! | forward | bbox, region or catalog sample | relevance, id |
//! | postcode | postcode entry | house number, id |
//! | house number | region, bbox or first partitions | postcode, street, id |
//!
//! [`GeocodeResult`]: crate::service::GeocodeResult

mod forward;
mod lookup;
mod reverse;

#[cfg(test)]
mod tests {
    use crate::backend::{
        AddressRecord, BoundaryFeature, BoundaryLayer, BoundarySet, BoundaryShape,
        InMemoryBackend, QueryBackend,
    };
    use crate::boundary::BoundaryGate;
    use crate::catalog::{PartitionCatalog, PartitionDescriptor, PostcodeCatalog, PostcodeEntry};
    use crate::config::{DataSettings, SearchSettings, UnscopedForward};
    use crate::geo::BoundingBox;
    use crate::grid::{GridError, SpatialGrid, SpatialGridAdapter};
    use crate::label::Label;
    use crate::projection::{Column, DetailLevel};
    use crate::search::{SearchMode, TextSearchStrategy};
    use crate::service::context::OrchestratorContext;
    use crate::service::error::GeocodeError;
    use crate::service::options::QueryOptions;
    use crate::service::results::QueryWarning;
    use dashmap::DashSet;

    /// One-degree square cells named `c{lat}_{lon}`.
    struct DegreeGrid;

    fn parse_cell(cell: &str) -> Option<(i32, i32)> {
        let (lat, lon) = cell.strip_prefix('c')?.split_once('_')?;
        Some((lat.parse().ok()?, lon.parse().ok()?))
    }

    impl SpatialGrid for DegreeGrid {
        fn cell_for_point(&self, lat: f64, lon: f64, _resolution: u8) -> Result<String, GridError> {
            Ok(format!("c{}_{}", lat.floor() as i32, lon.floor() as i32))
        }

        fn neighbors(&self, cell: &str, ring: u32) -> Result<Vec<String>, GridError> {
            let (lat, lon) = parse_cell(cell).ok_or_else(|| GridError::InvalidCell(cell.into()))?;
            let r = ring as i32;
            let mut out = Vec::new();
            for dlat in -r..=r {
                for dlon in -r..=r {
                    if dlat != 0 || dlon != 0 {
                        out.push(format!("c{}_{}", lat + dlat, lon + dlon));
                    }
                }
            }
            Ok(out)
        }
    }

    fn cell_partition(lat: i32, lon: i32, size_kb: u64, region: &str) -> PartitionDescriptor {
        PartitionDescriptor {
            id: format!("c{}_{}", lat, lon),
            address_count: 2,
            bbox: BoundingBox {
                min_lon: lon as f64,
                max_lon: lon as f64 + 1.0,
                min_lat: lat as f64,
                max_lat: lat as f64 + 1.0,
            },
            file_size_kb: size_kb,
            primary_region: Some(Label::new(format!("منطقة {}", region), region)),
        }
    }

    fn addr(id: &str, lat: f64, lon: f64, postcode: &str, number: &str, en: &str) -> AddressRecord {
        AddressRecord::new(id, lat, lon)
            .with(Column::Postcode, postcode)
            .with(Column::HouseNumber, number)
            .with(Column::StreetEn, en.split(',').next().unwrap_or(en))
            .with(Column::FullAddressEn, en)
            .with(Column::RegionEn, "Riyadh")
    }

    fn country() -> BoundingBox {
        BoundingBox::from_lat_lon_array([16.0, 34.5, 32.5, 55.7]).unwrap()
    }

    struct Fixture {
        backend: InMemoryBackend,
        partitions: Vec<PartitionDescriptor>,
        postcodes: Vec<PostcodeEntry>,
        search: SearchSettings,
        ranked: bool,
    }

    impl Fixture {
        fn new() -> Self {
            Self::with_backend(
                InMemoryBackend::builder()
                    .partition(
                        "c24_46",
                        vec![
                            addr("r2", 24.7140, 46.6760, "12211", "12", "Olaya Street, Riyadh"),
                            addr("r1", 24.7137, 46.6754, "12211", "7", "King Fahd Road, Riyadh"),
                            addr("r3", 24.9000, 46.9000, "12244", "7", "Far Road, Riyadh"),
                        ],
                    )
                    .partition(
                        "c21_39",
                        vec![addr("j1", 21.5, 39.2, "23423", "7", "Tahlia Street, Jeddah")
                            .with(Column::RegionEn, "Makkah")],
                    ),
            )
        }

        fn with_backend(builder: crate::backend::InMemoryBackendBuilder) -> Self {
            let world = BoundarySet::new(vec![BoundaryShape::rectangle(
                BoundaryFeature {
                    iso_code: Some("SA".to_string()),
                    name: Label::new("السعودية", "Saudi Arabia"),
                    parent: None,
                },
                country(),
            )]);
            Self {
                backend: builder.boundary(BoundaryLayer::World, world).build(),
                partitions: vec![
                    cell_partition(24, 46, 900, "Riyadh"),
                    cell_partition(21, 39, 300, "Makkah"),
                ],
                postcodes: vec![
                    PostcodeEntry {
                        postcode: "12211".to_string(),
                        partition_ids: vec!["c24_46".to_string()],
                        address_count: 2,
                        region: None,
                    },
                    PostcodeEntry {
                        postcode: "23423".to_string(),
                        partition_ids: vec!["c21_39".to_string()],
                        address_count: 1,
                        region: None,
                    },
                ],
                search: SearchSettings::default(),
                ranked: false,
            }
        }

        async fn build(self) -> OrchestratorContext<InMemoryBackend, DegreeGrid> {
            for layer in BoundaryLayer::ALL {
                self.backend.load_boundaries(layer, "mem://").await.unwrap();
            }
            let text_search = if self.ranked {
                TextSearchStrategy::probe(&self.backend).await
            } else {
                TextSearchStrategy::fallback_only()
            };
            let partitions = PartitionCatalog::new(self.partitions);
            OrchestratorContext {
                postcodes: PostcodeCatalog::new(self.postcodes),
                partitions,
                backend: self.backend,
                grid: SpatialGridAdapter::new(DegreeGrid, 5),
                gate: BoundaryGate::new("SA", country()),
                text_search,
                search: self.search,
                data: DataSettings {
                    base_url: "https://data.test".to_string(),
                    ..DataSettings::default()
                },
                loaded: DashSet::new(),
            }
        }
    }

    fn ids(records: &[AddressRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_partition_url_layout() {
        let ctx = Fixture::new().build().await;
        assert_eq!(
            ctx.partition_url("c24_46"),
            "https://data.test/tiles/c24_46.parquet"
        );
    }

    #[tokio::test]
    async fn test_reverse_minimal_sorted_by_distance() {
        let ctx = Fixture::new().build().await;
        let opts = QueryOptions::new()
            .with_radius_meters(1000.0)
            .with_detail_level(DetailLevel::Minimal);

        let result = ctx.reverse_geocode(24.7136, 46.6753, &opts).await.unwrap();

        assert_eq!(ids(&result.records), vec!["r1", "r2"]);
        for record in &result.records {
            assert_eq!(
                record.fields(),
                vec!["id", "longitude", "latitude", "distance_m"]
            );
        }
        assert!(result.records[0].distance_m <= result.records[1].distance_m);
        assert_eq!(ctx.loaded_partition_count(), 1);
    }

    #[tokio::test]
    async fn test_reverse_outside_country_is_empty() {
        let ctx = Fixture::new().build().await;
        let result = ctx
            .reverse_geocode(0.0, 0.0, &QueryOptions::default())
            .await
            .unwrap();
        assert!(result.is_empty());
        assert_eq!(ctx.backend.fetch_calls(), 0);
        assert_eq!(ctx.backend.boundary_calls(), 0);
    }

    #[tokio::test]
    async fn test_reverse_uncovered_cell_is_empty() {
        let ctx = Fixture::new().build().await;
        let result = ctx
            .reverse_geocode(26.3, 50.1, &QueryOptions::default())
            .await
            .unwrap();
        assert!(result.is_empty());
        assert_eq!(ctx.backend.fetch_calls(), 0);
    }

    #[tokio::test]
    async fn test_reverse_rejects_invalid_coordinates() {
        let ctx = Fixture::new().build().await;
        let err = ctx
            .reverse_geocode(95.0, 46.0, &QueryOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GeocodeError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_postcode_exact_match_by_house_number() {
        let ctx = Fixture::new().build().await;
        let result = ctx
            .search_by_postcode("١٢٢١١", &QueryOptions::default())
            .await
            .unwrap();
        // "7" sorts before "12" numerically
        assert_eq!(ids(&result.records), vec!["r1", "r2"]);
        assert!(result
            .records
            .iter()
            .all(|r| r.postcode.as_deref() == Some("12211")));
    }

    #[tokio::test]
    async fn test_postcode_with_house_number() {
        let ctx = Fixture::new().build().await;
        let opts = QueryOptions::new().with_house_number("12");
        let result = ctx.search_by_postcode("12211", &opts).await.unwrap();
        assert_eq!(ids(&result.records), vec!["r2"]);
    }

    #[tokio::test]
    async fn test_unknown_postcode_is_empty() {
        let ctx = Fixture::new().build().await;
        let result = ctx
            .search_by_postcode("00000", &QueryOptions::default())
            .await
            .unwrap();
        assert!(result.is_empty());
        assert_eq!(ctx.backend.fetch_calls(), 0);
    }

    #[tokio::test]
    async fn test_number_unscoped_warns() {
        let ctx = Fixture::new().build().await;
        let result = ctx
            .search_by_number("7", &QueryOptions::default())
            .await
            .unwrap();
        assert_eq!(ids(&result.records), vec!["r1", "r3", "j1"]);
        assert_eq!(
            result.warnings,
            vec![QueryWarning::UnscopedNumberSearch {
                searched: 2,
                total: 2
            }]
        );
    }

    #[tokio::test]
    async fn test_number_scoped_by_region() {
        let ctx = Fixture::new().build().await;
        let opts = QueryOptions::new().with_region("Makkah");
        let result = ctx.search_by_number("٧", &opts).await.unwrap();
        assert_eq!(ids(&result.records), vec!["j1"]);
        assert!(result.warnings.is_empty());
    }

    /// 25 Riyadh cells stacked along lon 46, one house "99" in each.
    fn many_partitions() -> Fixture {
        let mut builder = InMemoryBackend::builder();
        let mut partitions = Vec::new();
        for (i, lat) in (10..35).enumerate() {
            let id = format!("c{}_46", lat);
            builder = builder.partition(
                &id,
                vec![addr(
                    &format!("h{:02}", i),
                    lat as f64 + 0.5,
                    46.5,
                    &format!("{}", 11000 + i),
                    "99",
                    "Any Street, Riyadh",
                )],
            );
            partitions.push(cell_partition(lat, 46, 100 + i as u64, "Riyadh"));
        }
        let mut fixture = Fixture::with_backend(builder);
        fixture.partitions = partitions;
        fixture.postcodes.clear();
        fixture
    }

    #[tokio::test]
    async fn test_number_region_scope_reads_every_partition() {
        let ctx = many_partitions().build().await;
        assert_eq!(ctx.search.max_number_partitions, 20);

        let opts = QueryOptions::new().with_region("Riyadh").with_limit(100);
        let result = ctx.search_by_number("99", &opts).await.unwrap();

        assert_eq!(result.len(), 25);
        assert!(result.warnings.is_empty());
        assert_eq!(ctx.loaded_partition_count(), 25);
    }

    #[tokio::test]
    async fn test_number_bbox_scope_reads_every_partition() {
        let ctx = many_partitions().build().await;
        let bbox = BoundingBox::from_lat_lon_array([10.0, 46.0, 35.0, 47.0]).unwrap();

        let opts = QueryOptions::new().with_bbox(bbox).with_limit(100);
        let result = ctx.search_by_number("99", &opts).await.unwrap();

        assert_eq!(result.len(), 25);
        assert!(result.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_number_unscoped_still_capped() {
        let ctx = many_partitions().build().await;
        let opts = QueryOptions::new().with_limit(100);
        let result = ctx.search_by_number("99", &opts).await.unwrap();

        assert_eq!(result.len(), 20);
        assert_eq!(
            result.warnings,
            vec![QueryWarning::UnscopedNumberSearch {
                searched: 20,
                total: 25
            }]
        );
    }

    #[tokio::test]
    async fn test_forward_bbox_restricts_partitions() {
        let ctx = Fixture::new().build().await;
        let bbox = BoundingBox::from_lat_lon_array([24.5, 46.5, 24.9, 47.0]).unwrap();
        let result = ctx
            .geocode("", &QueryOptions::new().with_bbox(bbox))
            .await
            .unwrap();
        // Every row in the box passes the empty-token gate; ties order by id
        assert_eq!(ids(&result.records), vec!["r1", "r2", "r3"]);
        assert_eq!(result.search_mode, Some(SearchMode::Fallback));
        assert!(!ctx.loaded.contains("c21_39"));
    }

    #[tokio::test]
    async fn test_forward_unscoped_sample_warns() {
        let ctx = Fixture::new().build().await;
        let result = ctx
            .geocode("Tahlia", &QueryOptions::default())
            .await
            .unwrap();
        assert_eq!(ids(&result.records), vec!["j1"]);
        assert!(matches!(
            result.warnings[0],
            QueryWarning::UnscopedForwardSearch { sampled: 2, total: 2 }
        ));
    }

    #[tokio::test]
    async fn test_forward_unscoped_reject() {
        let mut fixture = Fixture::new();
        fixture.search.unscoped_forward = UnscopedForward::Reject;
        let ctx = fixture.build().await;
        let err = ctx
            .geocode("Tahlia", &QueryOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GeocodeError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_forward_ranked_mode() {
        let mut fixture = Fixture::new();
        fixture.ranked = true;
        let ctx = fixture.build().await;
        let result = ctx
            .geocode("king fahd", &QueryOptions::new().with_region("Riyadh"))
            .await
            .unwrap();
        assert_eq!(result.search_mode, Some(SearchMode::Ranked));
        assert_eq!(result.records[0].id, "r1");
        assert_eq!(ctx.backend.live_indexes(), 0);
    }

    #[tokio::test]
    async fn test_partial_failure_warns() {
        let fixture = Fixture::with_backend(
            InMemoryBackend::builder()
                .partition(
                    "c24_46",
                    vec![addr("r1", 24.7137, 46.6754, "12211", "7", "King Fahd Road")],
                )
                .failing_partition("c21_39"),
        );
        let ctx = fixture.build().await;
        let result = ctx
            .search_by_number("7", &QueryOptions::default())
            .await
            .unwrap();
        assert_eq!(ids(&result.records), vec!["r1"]);
        assert!(result.warnings.contains(&QueryWarning::PartialFailure {
            failed: vec!["c21_39".to_string()]
        }));
    }

    #[tokio::test]
    async fn test_all_partitions_failed_is_error() {
        let fixture = Fixture::with_backend(
            InMemoryBackend::builder()
                .failing_partition("c24_46")
                .failing_partition("c21_39"),
        );
        let ctx = fixture.build().await;
        let err = ctx
            .search_by_postcode("12211", &QueryOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GeocodeError::BackendUnavailable { failed: 1, .. }
        ));
        assert_eq!(ctx.loaded_partition_count(), 0);
    }

    #[tokio::test]
    async fn test_country_pass_throughs() {
        let ctx = Fixture::new().build().await;
        assert!(ctx.is_in_country(24.7, 46.7).await.unwrap());
        assert!(!ctx.is_in_country(48.85, 2.35).await.unwrap());
        let country = ctx.detect_country(24.7, 46.7).await.unwrap().unwrap();
        assert_eq!(country.iso_code, "SA");
        let hierarchy = ctx.admin_hierarchy(24.7, 46.7).await.unwrap();
        assert_eq!(hierarchy.country.map(|c| c.iso_code), Some("SA".to_string()));
        assert!(hierarchy.region.is_none());
    }
}
