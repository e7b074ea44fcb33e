//! Boundary polygons loaded from GeoJSON.
//!
//! Supports `Polygon` and `MultiPolygon` geometries. Containment uses the
//! even-odd rule, so interior rings act as holes.

use super::types::{BackendError, BoundaryFeature};
use crate::geo::BoundingBox;
use crate::label::Label;
use serde_json::Value;

/// A closed ring of `[lon, lat]` positions.
pub type Ring = Vec<[f64; 2]>;

/// Outer ring followed by optional holes.
pub type Polygon = Vec<Ring>;

/// One boundary with its attributes and geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryShape {
    pub feature: BoundaryFeature,
    pub polygons: Vec<Polygon>,
    bbox: BoundingBox,
}

impl BoundaryShape {
    pub fn new(feature: BoundaryFeature, polygons: Vec<Polygon>) -> Self {
        let bbox = polygons_bbox(&polygons);
        Self {
            feature,
            polygons,
            bbox,
        }
    }

    /// Axis-aligned rectangle shape.
    pub fn rectangle(feature: BoundaryFeature, bbox: BoundingBox) -> Self {
        let ring = vec![
            [bbox.min_lon, bbox.min_lat],
            [bbox.max_lon, bbox.min_lat],
            [bbox.max_lon, bbox.max_lat],
            [bbox.min_lon, bbox.max_lat],
            [bbox.min_lon, bbox.min_lat],
        ];
        Self::new(feature, vec![vec![ring]])
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        if !self.bbox.contains(lat, lon) {
            return false;
        }
        self.polygons.iter().any(|p| polygon_contains(p, lat, lon))
    }
}

/// All shapes of one boundary layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundarySet {
    shapes: Vec<BoundaryShape>,
}

impl BoundarySet {
    pub fn new(shapes: Vec<BoundaryShape>) -> Self {
        Self { shapes }
    }

    /// Parses a GeoJSON `FeatureCollection`.
    ///
    /// Features with unsupported or empty geometry are skipped.
    pub fn from_geojson(data: &[u8]) -> Result<Self, BackendError> {
        let doc: Value = serde_json::from_slice(data)
            .map_err(|e| BackendError::Decode(format!("invalid GeoJSON: {}", e)))?;

        let features = doc
            .get("features")
            .and_then(Value::as_array)
            .ok_or_else(|| BackendError::Decode("GeoJSON has no features array".to_string()))?;

        let mut shapes = Vec::with_capacity(features.len());
        for feature in features {
            let Some(geometry) = feature.get("geometry") else {
                continue;
            };
            let polygons = parse_geometry(geometry)?;
            if polygons.is_empty() {
                continue;
            }
            let props = feature.get("properties").unwrap_or(&Value::Null);
            shapes.push(BoundaryShape::new(feature_attributes(props), polygons));
        }

        Ok(Self { shapes })
    }

    /// First shape containing the point.
    pub fn lookup(&self, lat: f64, lon: f64) -> Option<&BoundaryFeature> {
        self.shapes
            .iter()
            .find(|s| s.contains(lat, lon))
            .map(|s| &s.feature)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

fn parse_geometry(geometry: &Value) -> Result<Vec<Polygon>, BackendError> {
    let kind = geometry.get("type").and_then(Value::as_str).unwrap_or("");
    let coords = geometry.get("coordinates");

    match (kind, coords) {
        ("Polygon", Some(c)) => Ok(vec![parse_polygon(c)?]),
        ("MultiPolygon", Some(Value::Array(parts))) => parts.iter().map(parse_polygon).collect(),
        _ => Ok(Vec::new()),
    }
}

fn parse_polygon(value: &Value) -> Result<Polygon, BackendError> {
    let rings = value
        .as_array()
        .ok_or_else(|| BackendError::Decode("polygon is not an array of rings".to_string()))?;
    rings.iter().map(parse_ring).collect()
}

fn parse_ring(value: &Value) -> Result<Ring, BackendError> {
    let positions = value
        .as_array()
        .ok_or_else(|| BackendError::Decode("ring is not an array of positions".to_string()))?;

    positions
        .iter()
        .map(|p| {
            let lon = p.get(0).and_then(Value::as_f64);
            let lat = p.get(1).and_then(Value::as_f64);
            match (lon, lat) {
                (Some(lon), Some(lat)) => Ok([lon, lat]),
                _ => Err(BackendError::Decode(format!("invalid position: {}", p))),
            }
        })
        .collect()
}

fn first_str<'a>(props: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| props.get(*k).and_then(Value::as_str))
        .find(|s| !s.is_empty())
}

fn feature_attributes(props: &Value) -> BoundaryFeature {
    let iso_code = first_str(props, &["iso_a2", "ISO_A2", "iso_code", "ISO"]).map(str::to_string);
    let name = Label::new(
        first_str(props, &["name_ar", "NAME_AR"]).unwrap_or(""),
        first_str(props, &["name_en", "name", "NAME", "ADMIN"]).unwrap_or(""),
    );
    let parent = Label::new(
        first_str(props, &["region_ar"]).unwrap_or(""),
        first_str(props, &["region_en", "region"]).unwrap_or(""),
    );

    BoundaryFeature {
        iso_code,
        name,
        parent: (!parent.is_empty()).then_some(parent),
    }
}

fn polygons_bbox(polygons: &[Polygon]) -> BoundingBox {
    let mut bbox = BoundingBox {
        min_lon: f64::INFINITY,
        max_lon: f64::NEG_INFINITY,
        min_lat: f64::INFINITY,
        max_lat: f64::NEG_INFINITY,
    };
    for [lon, lat] in polygons.iter().filter_map(|p| p.first()).flatten() {
        bbox.min_lon = bbox.min_lon.min(*lon);
        bbox.max_lon = bbox.max_lon.max(*lon);
        bbox.min_lat = bbox.min_lat.min(*lat);
        bbox.max_lat = bbox.max_lat.max(*lat);
    }
    bbox
}

fn polygon_contains(polygon: &Polygon, lat: f64, lon: f64) -> bool {
    let mut inside = false;
    for ring in polygon {
        if ring_contains(ring, lat, lon) {
            inside = !inside;
        }
    }
    inside
}

/// Ray casting toward +lon.
fn ring_contains(ring: &Ring, lat: f64, lon: f64) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let [xi, yi] = ring[i];
        let [xj, yj] = ring[j];
        if (yi > lat) != (yj > lat) {
            let x_cross = (xj - xi) * (lat - yi) / (yj - yi) + xi;
            if lon < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGIONS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "name_en": "Riyadh", "name_ar": "الرياض" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [
                        [[46.0, 24.0], [47.0, 24.0], [47.0, 25.0], [46.0, 25.0], [46.0, 24.0]],
                        [[46.4, 24.4], [46.6, 24.4], [46.6, 24.6], [46.4, 24.6], [46.4, 24.4]]
                    ]
                }
            },
            {
                "type": "Feature",
                "properties": { "NAME": "Makkah", "ISO_A2": "SA" },
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[39.0, 21.0], [40.0, 21.0], [40.0, 22.0], [39.0, 22.0], [39.0, 21.0]]],
                        [[[41.0, 21.0], [42.0, 21.0], [42.0, 22.0], [41.0, 22.0], [41.0, 21.0]]]
                    ]
                }
            },
            { "type": "Feature", "properties": {}, "geometry": { "type": "Point", "coordinates": [1.0, 1.0] } }
        ]
    }"#;

    #[test]
    fn test_parse_feature_collection() {
        let set = BoundarySet::from_geojson(REGIONS.as_bytes()).unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_polygon_lookup_and_labels() {
        let set = BoundarySet::from_geojson(REGIONS.as_bytes()).unwrap();
        let feature = set.lookup(24.8, 46.8).unwrap();
        assert_eq!(feature.name, Label::new("الرياض", "Riyadh"));
        assert_eq!(feature.iso_code, None);
    }

    #[test]
    fn test_hole_excluded() {
        let set = BoundarySet::from_geojson(REGIONS.as_bytes()).unwrap();
        assert!(set.lookup(24.5, 46.5).is_none());
    }

    #[test]
    fn test_multipolygon_second_part() {
        let set = BoundarySet::from_geojson(REGIONS.as_bytes()).unwrap();
        let feature = set.lookup(21.5, 41.5).unwrap();
        assert_eq!(feature.name.en, "Makkah");
        assert_eq!(feature.iso_code.as_deref(), Some("SA"));
        assert!(set.lookup(21.5, 40.5).is_none());
    }

    #[test]
    fn test_rectangle_shape() {
        let bbox = BoundingBox::new(46.0, 47.0, 24.0, 25.0).unwrap();
        let shape = BoundaryShape::rectangle(BoundaryFeature::default(), bbox);
        assert!(shape.contains(24.5, 46.5));
        assert!(!shape.contains(25.5, 46.5));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            BoundarySet::from_geojson(b"not json"),
            Err(BackendError::Decode(_))
        ));
        assert!(BoundarySet::from_geojson(b"{}").is_err());
    }
}
