//! Shared fixtures for integration tests.
//!
//! A small three-city dataset partitioned by real H3 cells, index documents
//! served by a static HTTP client, and an in-memory backend holding the
//! partitions and boundary layers.

#![allow(dead_code)]

use bytes::Bytes;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tilegeo::backend::{
    AddressRecord, AsyncHttpClient, BackendError, BoundaryFeature, BoundaryLayer, BoundarySet,
    BoundaryShape, InMemoryBackend, InMemoryBackendBuilder,
};
use tilegeo::geo::BoundingBox;
use tilegeo::grid::{H3Grid, SpatialGrid};
use tilegeo::label::Label;
use tilegeo::projection::Column;
use tilegeo::service::{Geocoder, GeocoderConfig};

// =============================================================================
// Locations
// =============================================================================

pub const CUSTOM_BASE: &str = "https://custom.test/geo";
pub const DEFAULT_BASE: &str = "https://default.test/v1";
pub const RESOLUTION: u8 = 5;

pub const RIYADH: (f64, f64) = (24.7136, 46.6753);
pub const JEDDAH: (f64, f64) = (21.5433, 39.1728);
pub const DAMMAM: (f64, f64) = (26.4207, 50.0888);

pub fn cell(point: (f64, f64)) -> String {
    H3Grid::new()
        .cell_for_point(point.0, point.1, RESOLUTION)
        .expect("valid test point")
}

/// First ring neighbor of the Riyadh cell, used as a partition that only
/// the neighbor-ring expansion reaches.
pub fn riyadh_neighbor() -> String {
    let mut ring = H3Grid::new()
        .neighbors(&cell(RIYADH), 1)
        .expect("valid cell");
    ring.sort();
    ring.remove(0)
}

fn around(point: (f64, f64), half: f64) -> BoundingBox {
    BoundingBox::new(
        point.1 - half,
        point.1 + half,
        point.0 - half,
        point.0 + half,
    )
    .expect("valid box")
}

/// Extent recorded for the neighbor partition, clear of the Riyadh box.
const NEIGHBOR_EXTENT: BoundingBox = BoundingBox {
    min_lon: 46.40,
    max_lon: 46.50,
    min_lat: 24.85,
    max_lat: 24.95,
};

pub fn country_bbox() -> BoundingBox {
    BoundingBox::from_lat_lon_array([16.0, 34.5, 32.5, 55.7]).expect("valid box")
}

// =============================================================================
// Rows
// =============================================================================

#[allow(clippy::too_many_arguments)]
fn address(
    id: &str,
    point: (f64, f64),
    postcode: &str,
    number: &str,
    street_en: &str,
    full_en: &str,
    full_ar: &str,
    region: (&str, &str),
) -> AddressRecord {
    AddressRecord::new(id, point.0, point.1)
        .with(Column::HouseNumber, number)
        .with(Column::StreetEn, street_en)
        .with(Column::Postcode, postcode)
        .with(Column::DistrictEn, "Olaya")
        .with(Column::DistrictAr, "العليا")
        .with(Column::City, region.1)
        .with(Column::RegionAr, region.0)
        .with(Column::RegionEn, region.1)
        .with(Column::FullAddressEn, full_en)
        .with(Column::FullAddressAr, full_ar)
}

const RIYADH_REGION: (&str, &str) = ("الرياض", "Riyadh");
const MAKKAH_REGION: (&str, &str) = ("مكة المكرمة", "Makkah");
const EASTERN_REGION: (&str, &str) = ("الشرقية", "Eastern Province");

pub fn riyadh_rows() -> Vec<AddressRecord> {
    vec![
        address(
            "r1",
            (24.7137, 46.6754),
            "12211",
            "7",
            "King Fahd Road",
            "7 King Fahd Road, Olaya, Riyadh 12211",
            "٧ طريق الملك فهد، العليا، الرياض",
            RIYADH_REGION,
        ),
        address(
            "r2",
            (24.7140, 46.6760),
            "12211",
            "12",
            "Olaya Street",
            "12 Olaya Street, Olaya, Riyadh 12211",
            "١٢ شارع العليا، العليا، الرياض",
            RIYADH_REGION,
        ),
        address(
            "r3",
            (24.7200, 46.6800),
            "12244",
            "7",
            "Tahlia Street",
            "7 Tahlia Street, Sulaimaniyah, Riyadh 12244",
            "٧ شارع التحلية، السليمانية، الرياض",
            RIYADH_REGION,
        ),
        address(
            "r4",
            (24.7600, 46.7100),
            "12244",
            "3",
            "Prince Sultan Road",
            "3 Prince Sultan Road, Riyadh 12244",
            "٣ طريق الأمير سلطان، الرياض",
            RIYADH_REGION,
        ),
    ]
}

pub fn jeddah_rows() -> Vec<AddressRecord> {
    vec![
        address(
            "j1",
            JEDDAH,
            "23423",
            "7",
            "Tahlia Street",
            "7 Tahlia Street, Al Andalus, Jeddah 23423",
            "٧ شارع التحلية، الأندلس، جدة",
            MAKKAH_REGION,
        ),
        address(
            "j2",
            (21.5500, 39.1800),
            "23423",
            "15",
            "Prince Sultan Road",
            "15 Prince Sultan Road, Jeddah 23423",
            "١٥ طريق الأمير سلطان، جدة",
            MAKKAH_REGION,
        ),
    ]
}

pub fn dammam_rows() -> Vec<AddressRecord> {
    vec![address(
        "d1",
        DAMMAM,
        "32241",
        "7",
        "King Saud Street",
        "7 King Saud Street, Dammam 32241",
        "٧ شارع الملك سعود، الدمام",
        EASTERN_REGION,
    )]
}

/// Row stored in the neighbor partition but only a few meters from
/// [`RIYADH`].
pub fn neighbor_row() -> AddressRecord {
    AddressRecord::new("n1", 24.7138, 46.6752)
        .with(Column::Postcode, "12212")
        .with(Column::FullAddressEn, "Edge Lane, Riyadh")
}

// =============================================================================
// Index documents
// =============================================================================

pub fn partition_index() -> Bytes {
    let tile = |id: String, b: BoundingBox, count: u64, size: u64, region: (&str, &str)| {
        json!({
            "id": id,
            "address_count": count,
            "bbox": {
                "min_lon": b.min_lon, "max_lon": b.max_lon,
                "min_lat": b.min_lat, "max_lat": b.max_lat
            },
            "file_size_kb": size,
            "primary_region": { "ar": region.0, "en": region.1 }
        })
    };
    let doc = json!({
        "tiles": [
            tile(cell(RIYADH), around(RIYADH, 0.1), 4, 900, RIYADH_REGION),
            tile(cell(JEDDAH), around(JEDDAH, 0.1), 2, 400, MAKKAH_REGION),
            tile(cell(DAMMAM), around(DAMMAM, 0.1), 1, 200, EASTERN_REGION),
            tile(riyadh_neighbor(), NEIGHBOR_EXTENT, 1, 100, RIYADH_REGION),
        ]
    });
    Bytes::from(doc.to_string())
}

pub fn postcode_index() -> Bytes {
    let doc = json!({
        "postcodes": {
            "12211": { "tiles": [cell(RIYADH)], "count": 2 },
            "12244": { "tiles": [cell(RIYADH)], "count": 2 },
            "12212": { "tiles": [riyadh_neighbor()], "count": 1 },
            "23423": { "tiles": [cell(JEDDAH)], "count": 2,
                       "region": { "ar": "مكة المكرمة", "en": "Makkah" } },
            "32241": { "tiles": [cell(DAMMAM), "85ffffffffffffff"], "count": 1 }
        }
    });
    Bytes::from(doc.to_string())
}

// =============================================================================
// HTTP client
// =============================================================================

/// HTTP client serving fixed bodies; unknown URLs return 404.
///
/// Clones share the request log.
#[derive(Clone, Default)]
pub struct StaticHttpClient {
    routes: HashMap<String, Bytes>,
    delay: Option<Duration>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StaticHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, url: impl Into<String>, body: Bytes) -> Self {
        self.routes.insert(url.into(), body);
        self
    }

    /// Serves both index documents from `base`.
    pub fn serving_indexes(self, base: &str) -> Self {
        self.route(format!("{}/tile_index.json", base), partition_index())
            .route(format!("{}/postcode_index.json", base), postcode_index())
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requested(&self, url: &str) -> bool {
        self.request_count(url) > 0
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.requests
            .lock()
            .map(|r| r.iter().filter(|u| *u == url).count())
            .unwrap_or(0)
    }
}

impl AsyncHttpClient for StaticHttpClient {
    async fn get(&self, url: &str) -> Result<Bytes, BackendError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }
        self.routes
            .get(url)
            .cloned()
            .ok_or_else(|| BackendError::Http(format!("HTTP 404 Not Found from {}", url)))
    }
}

// =============================================================================
// Backend and geocoder
// =============================================================================

fn feature(iso: Option<&str>, name: (&str, &str), parent: Option<(&str, &str)>) -> BoundaryFeature {
    BoundaryFeature {
        iso_code: iso.map(str::to_string),
        name: Label::new(name.0, name.1),
        parent: parent.map(|p| Label::new(p.0, p.1)),
    }
}

/// Backend holding all fixture partitions and boundary layers.
pub fn backend_builder() -> InMemoryBackendBuilder {
    let world = BoundarySet::new(vec![BoundaryShape::rectangle(
        feature(Some("SA"), ("السعودية", "Saudi Arabia"), None),
        country_bbox(),
    )]);
    let regions = BoundarySet::new(vec![
        BoundaryShape::rectangle(feature(None, RIYADH_REGION, None), around(RIYADH, 2.0)),
        BoundaryShape::rectangle(feature(None, MAKKAH_REGION, None), around(JEDDAH, 2.0)),
    ]);
    let districts = BoundarySet::new(vec![BoundaryShape::rectangle(
        feature(None, ("العليا", "Olaya"), Some(RIYADH_REGION)),
        around(RIYADH, 0.05),
    )]);

    InMemoryBackend::builder()
        .partition(cell(RIYADH), riyadh_rows())
        .partition(cell(JEDDAH), jeddah_rows())
        .partition(cell(DAMMAM), dammam_rows())
        .partition(riyadh_neighbor(), vec![neighbor_row()])
        .boundary(BoundaryLayer::World, world)
        .boundary(BoundaryLayer::Regions, regions)
        .boundary(BoundaryLayer::Districts, districts)
}

pub fn config() -> GeocoderConfig {
    GeocoderConfig::builder()
        .base_url(CUSTOM_BASE)
        .fallback_url(DEFAULT_BASE)
        .grid_resolution(RESOLUTION)
        .init_deadline_secs(5)
        .build()
}

pub async fn geocoder_with(backend: InMemoryBackend) -> Geocoder<InMemoryBackend, H3Grid> {
    let http = StaticHttpClient::new().serving_indexes(CUSTOM_BASE);
    Geocoder::initialize(config(), backend, H3Grid::new(), &http)
        .await
        .expect("initialization")
}

pub async fn geocoder() -> Geocoder<InMemoryBackend, H3Grid> {
    geocoder_with(backend_builder().build()).await
}
