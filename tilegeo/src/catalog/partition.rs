//! Partition catalog.

use super::CatalogError;
use crate::geo::BoundingBox;
use crate::label::Label;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata of one remote partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionDescriptor {
    /// Grid cell identifier.
    #[serde(alias = "h3_index", alias = "tile_id")]
    pub id: String,
    #[serde(default)]
    pub address_count: u64,
    pub bbox: BoundingBox,
    #[serde(default)]
    pub file_size_kb: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_region: Option<Label>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IndexDocument {
    Wrapped { tiles: Vec<PartitionDescriptor> },
    Bare(Vec<PartitionDescriptor>),
}

/// Immutable table of partition metadata.
///
/// Keeps index order; lookups by id go through a side map.
#[derive(Debug, Clone, Default)]
pub struct PartitionCatalog {
    partitions: Vec<PartitionDescriptor>,
    by_id: HashMap<String, usize>,
}

impl PartitionCatalog {
    /// Builds a catalog. Later duplicates of an id are dropped.
    pub fn new(partitions: Vec<PartitionDescriptor>) -> Self {
        let mut by_id = HashMap::with_capacity(partitions.len());
        let mut kept = Vec::with_capacity(partitions.len());
        for partition in partitions {
            if by_id.contains_key(&partition.id) {
                tracing::warn!(partition = %partition.id, "Duplicate partition id in index");
                continue;
            }
            by_id.insert(partition.id.clone(), kept.len());
            kept.push(partition);
        }
        Self {
            partitions: kept,
            by_id,
        }
    }

    /// Parses a partition index document.
    ///
    /// Accepts `{"tiles": [...]}` or a bare array of descriptors.
    pub fn from_json(data: &[u8]) -> Result<Self, CatalogError> {
        let doc: IndexDocument =
            serde_json::from_slice(data).map_err(|e| CatalogError::Parse(e.to_string()))?;
        let partitions = match doc {
            IndexDocument::Wrapped { tiles } => tiles,
            IndexDocument::Bare(tiles) => tiles,
        };
        Ok(Self::new(partitions))
    }

    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    pub fn all(&self) -> &[PartitionDescriptor] {
        &self.partitions
    }

    pub fn by_id(&self, id: &str) -> Option<&PartitionDescriptor> {
        self.by_id.get(id).map(|&i| &self.partitions[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Partitions whose stored box intersects `bbox`.
    pub fn by_bounding_box_overlap(&self, bbox: &BoundingBox) -> Vec<&PartitionDescriptor> {
        self.partitions
            .iter()
            .filter(|p| p.bbox.intersects(bbox))
            .collect()
    }

    /// Partitions whose primary region label equals `name` in either
    /// language.
    pub fn by_region(&self, name: &str) -> Vec<&PartitionDescriptor> {
        self.partitions
            .iter()
            .filter(|p| p.primary_region.as_ref().is_some_and(|r| r.matches(name)))
            .collect()
    }

    pub fn total_addresses(&self) -> u64 {
        self.partitions.iter().map(|p| p.address_count).sum()
    }

    pub fn total_size_kb(&self) -> u64 {
        self.partitions.iter().map(|p| p.file_size_kb).sum()
    }
}

/// Caps a candidate list at `max_count`.
///
/// Unfiltered lists take every `ceil(len / max_count)`-th element so the
/// sample spreads across the whole catalog. Filtered lists are already
/// geographically scoped and keep the `max_count` smallest files, ties
/// broken by id, in their original order.
pub fn sample_evenly<'a>(
    list: Vec<&'a PartitionDescriptor>,
    max_count: usize,
    filtered: bool,
) -> Vec<&'a PartitionDescriptor> {
    if list.len() <= max_count {
        return list;
    }
    if max_count == 0 {
        return Vec::new();
    }

    if filtered {
        let mut ranked: Vec<(usize, &PartitionDescriptor)> = list.into_iter().enumerate().collect();
        ranked.sort_by(|(_, a), (_, b)| {
            a.file_size_kb
                .cmp(&b.file_size_kb)
                .then_with(|| a.id.cmp(&b.id))
        });
        ranked.truncate(max_count);
        ranked.sort_by_key(|(i, _)| *i);
        return ranked.into_iter().map(|(_, p)| p).collect();
    }

    let stride = list.len().div_ceil(max_count);
    list.into_iter().step_by(stride).take(max_count).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn descriptor(id: &str, min_lon: f64, min_lat: f64, size: u64, region: Option<&str>) -> PartitionDescriptor {
        PartitionDescriptor {
            id: id.to_string(),
            address_count: 100,
            bbox: BoundingBox {
                min_lon,
                max_lon: min_lon + 0.5,
                min_lat,
                max_lat: min_lat + 0.5,
            },
            file_size_kb: size,
            primary_region: region.map(|r| Label::new(format!("{}-ar", r), r)),
        }
    }

    fn catalog() -> PartitionCatalog {
        PartitionCatalog::new(vec![
            descriptor("p1", 46.0, 24.0, 300, Some("Riyadh")),
            descriptor("p2", 46.5, 24.5, 100, Some("Riyadh")),
            descriptor("p3", 39.0, 21.0, 200, Some("Makkah")),
            descriptor("p4", 50.0, 26.0, 50, None),
        ])
    }

    #[test]
    fn test_from_json_wrapped_and_bare() {
        let wrapped = r#"{"tiles":[{"h3_index":"851f","address_count":5,"file_size_kb":12,
            "bbox":{"min_lon":46.0,"max_lon":46.5,"min_lat":24.0,"max_lat":24.5},
            "primary_region":{"ar":"الرياض","en":"Riyadh"}}]}"#;
        let bare = r#"[{"id":"851f","bbox":{"min_lon":46.0,"max_lon":46.5,"min_lat":24.0,"max_lat":24.5}}]"#;

        let a = PartitionCatalog::from_json(wrapped.as_bytes()).unwrap();
        let b = PartitionCatalog::from_json(bare.as_bytes()).unwrap();
        assert_eq!(
            a.by_id("851f").unwrap().primary_region,
            Some(Label::new("الرياض", "Riyadh"))
        );
        assert_eq!(a.len(), 1);
        assert_eq!(a.by_id("851f").unwrap().address_count, 5);
        assert_eq!(b.by_id("851f").unwrap().primary_region, None);
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(matches!(
            PartitionCatalog::from_json(b"{\"nope\":1}"),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn test_duplicate_ids_dropped() {
        let cat = PartitionCatalog::new(vec![
            descriptor("p1", 46.0, 24.0, 1, None),
            descriptor("p1", 40.0, 20.0, 1, None),
        ]);
        assert_eq!(cat.len(), 1);
        assert_eq!(cat.by_id("p1").unwrap().bbox.min_lon, 46.0);
    }

    #[test]
    fn test_by_region_either_language() {
        let cat = catalog();
        assert_eq!(cat.by_region("Riyadh").len(), 2);
        assert_eq!(cat.by_region("Makkah-ar").len(), 1);
        assert!(cat.by_region("riyadh").is_empty());
    }

    #[test]
    fn test_by_bounding_box_overlap() {
        let cat = catalog();
        let q = BoundingBox::new(46.4, 46.6, 24.4, 24.6).unwrap();
        let ids: Vec<&str> = cat.by_bounding_box_overlap(&q).iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2"]);
    }

    #[test]
    fn test_sample_evenly_stride() {
        let parts: Vec<PartitionDescriptor> = (0..10)
            .map(|i| descriptor(&format!("p{}", i), 40.0 + i as f64, 20.0, 10, None))
            .collect();
        let refs: Vec<&PartitionDescriptor> = parts.iter().collect();
        let ids: Vec<&str> = sample_evenly(refs, 4, false)
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        // stride ceil(10/4) = 3
        assert_eq!(ids, vec!["p0", "p3", "p6", "p9"]);
    }

    #[test]
    fn test_sample_evenly_smallest_when_filtered() {
        let cat = catalog();
        let refs: Vec<&PartitionDescriptor> = cat.all().iter().collect();
        let ids: Vec<&str> = sample_evenly(refs, 2, true)
            .iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ids, vec!["p2", "p4"]);
    }

    #[test]
    fn test_sample_evenly_under_cap_unchanged() {
        let cat = catalog();
        let refs: Vec<&PartitionDescriptor> = cat.all().iter().collect();
        assert_eq!(sample_evenly(refs, 50, false).len(), 4);
    }

    #[test]
    fn test_totals() {
        let cat = catalog();
        assert_eq!(cat.total_addresses(), 400);
        assert_eq!(cat.total_size_kb(), 650);
    }

    fn arb_bbox() -> impl Strategy<Value = BoundingBox> {
        (-10.0f64..10.0, 0.0f64..5.0, -10.0f64..10.0, 0.0f64..5.0).prop_map(|(lon, w, lat, h)| {
            BoundingBox {
                min_lon: lon,
                max_lon: lon + w,
                min_lat: lat,
                max_lat: lat + h,
            }
        })
    }

    proptest! {
        #[test]
        fn prop_overlap_is_exact(boxes in proptest::collection::vec(arb_bbox(), 0..30), query in arb_bbox()) {
            let cat = PartitionCatalog::new(
                boxes
                    .iter()
                    .enumerate()
                    .map(|(i, b)| PartitionDescriptor {
                        id: format!("p{}", i),
                        address_count: 0,
                        bbox: *b,
                        file_size_kb: 0,
                        primary_region: None,
                    })
                    .collect(),
            );

            let hits: Vec<&str> = cat.by_bounding_box_overlap(&query).iter().map(|p| p.id.as_str()).collect();
            for p in cat.all() {
                let overlaps = p.bbox.min_lon <= query.max_lon
                    && p.bbox.max_lon >= query.min_lon
                    && p.bbox.min_lat <= query.max_lat
                    && p.bbox.max_lat >= query.min_lat;
                prop_assert_eq!(overlaps, hits.contains(&p.id.as_str()));
            }
        }

        #[test]
        fn prop_sample_never_exceeds_cap(len in 0usize..200, cap in 1usize..60, filtered in any::<bool>()) {
            let parts: Vec<PartitionDescriptor> = (0..len)
                .map(|i| descriptor(&format!("p{}", i), 0.0, 0.0, (i * 7 % 13) as u64, None))
                .collect();
            let refs: Vec<&PartitionDescriptor> = parts.iter().collect();
            let out = sample_evenly(refs, cap, filtered);
            prop_assert!(out.len() <= cap);
            if filtered || len <= cap {
                prop_assert_eq!(out.len(), len.min(cap));
            } else {
                prop_assert!(!out.is_empty());
            }
        }
    }
}
