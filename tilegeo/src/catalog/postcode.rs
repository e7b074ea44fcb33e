//! Postcode-to-partition index.

use super::{CatalogError, PartitionCatalog};
use crate::label::Label;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Partitions holding one postcode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostcodeEntry {
    pub postcode: String,
    /// Ordered, duplicate-free partition ids.
    pub partition_ids: Vec<String>,
    pub address_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<Label>,
}

#[derive(Deserialize)]
struct RawEntry {
    #[serde(alias = "tiles", alias = "h3_tiles")]
    partition_ids: Vec<String>,
    #[serde(default, alias = "count")]
    address_count: u64,
    #[serde(default)]
    region: Option<Label>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PostcodeDocument {
    Wrapped { postcodes: BTreeMap<String, RawEntry> },
    Bare(BTreeMap<String, RawEntry>),
}

/// Aggregate numbers over the postcode index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PostcodeStats {
    pub postcodes: usize,
    pub addresses: u64,
    pub avg_partitions_per_postcode: f64,
}

/// Postcode lookup table. Keys are kept sorted so prefix scans return
/// postcodes in ascending order.
#[derive(Debug, Clone, Default)]
pub struct PostcodeCatalog {
    entries: BTreeMap<String, PostcodeEntry>,
}

impl PostcodeCatalog {
    pub fn new(entries: impl IntoIterator<Item = PostcodeEntry>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|e| (e.postcode.clone(), e))
                .collect(),
        }
    }

    /// Parses a postcode index document and checks its partition ids
    /// against `partitions`.
    ///
    /// Ids unknown to the partition catalog are dropped with a warning, and
    /// entries left without partitions are skipped.
    pub fn from_json(data: &[u8], partitions: &PartitionCatalog) -> Result<Self, CatalogError> {
        let doc: PostcodeDocument =
            serde_json::from_slice(data).map_err(|e| CatalogError::Parse(e.to_string()))?;
        let raw = match doc {
            PostcodeDocument::Wrapped { postcodes } => postcodes,
            PostcodeDocument::Bare(map) => map,
        };

        let mut entries = BTreeMap::new();
        let mut dropped = 0usize;
        for (code, entry) in raw {
            let mut ids: Vec<String> = Vec::with_capacity(entry.partition_ids.len());
            for id in entry.partition_ids {
                if !partitions.contains(&id) {
                    dropped += 1;
                    continue;
                }
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
            if ids.is_empty() {
                continue;
            }
            entries.insert(
                code.clone(),
                PostcodeEntry {
                    postcode: code,
                    partition_ids: ids,
                    address_count: entry.address_count,
                    region: entry.region,
                },
            );
        }

        if dropped > 0 {
            warn!(dropped, "Postcode index references unknown partitions");
        }
        Ok(Self { entries })
    }

    pub fn get(&self, postcode: &str) -> Option<&PostcodeEntry> {
        self.entries.get(postcode)
    }

    /// Entries whose postcode starts with `prefix`, in ascending order.
    /// An empty prefix matches every entry.
    pub fn prefix_search(&self, prefix: &str, limit: Option<usize>) -> Vec<&PostcodeEntry> {
        let matches = self
            .entries
            .range(prefix.to_string()..)
            .take_while(|(code, _)| code.starts_with(prefix))
            .map(|(_, e)| e);
        match limit {
            Some(n) => matches.take(n).collect(),
            None => matches.collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> PostcodeStats {
        let postcodes = self.entries.len();
        let addresses = self.entries.values().map(|e| e.address_count).sum();
        let links: usize = self.entries.values().map(|e| e.partition_ids.len()).sum();
        PostcodeStats {
            postcodes,
            addresses,
            avg_partitions_per_postcode: if postcodes == 0 {
                0.0
            } else {
                links as f64 / postcodes as f64
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PartitionDescriptor;
    use crate::geo::BoundingBox;

    fn partitions() -> PartitionCatalog {
        let bbox = BoundingBox {
            min_lon: 46.0,
            max_lon: 46.5,
            min_lat: 24.0,
            max_lat: 24.5,
        };
        PartitionCatalog::new(
            ["t1", "t2", "t3"]
                .iter()
                .map(|id| PartitionDescriptor {
                    id: id.to_string(),
                    address_count: 0,
                    bbox,
                    file_size_kb: 0,
                    primary_region: None,
                })
                .collect(),
        )
    }

    const INDEX: &str = r#"{"postcodes":{
        "12211":{"tiles":["t1","t2"],"address_count":40,"region":{"ar":"الرياض","en":"Riyadh"}},
        "12241":{"tiles":["t2","t2"],"address_count":10},
        "12345":{"tiles":["t3","tX"],"address_count":5},
        "99999":{"tiles":["tX"],"address_count":1},
        "21577":{"partition_ids":["t3"],"count":7}
    }}"#;

    #[test]
    fn test_load_filters_unknown_partitions() {
        let cat = PostcodeCatalog::from_json(INDEX.as_bytes(), &partitions()).unwrap();
        assert_eq!(cat.len(), 4);
        assert_eq!(cat.get("12345").unwrap().partition_ids, vec!["t3"]);
        assert!(cat.get("99999").is_none());
    }

    #[test]
    fn test_load_dedups_and_aliases() {
        let cat = PostcodeCatalog::from_json(INDEX.as_bytes(), &partitions()).unwrap();
        assert_eq!(cat.get("12241").unwrap().partition_ids, vec!["t2"]);
        assert_eq!(cat.get("21577").unwrap().address_count, 7);
        assert_eq!(
            cat.get("12211").unwrap().region.as_ref().unwrap().en,
            "Riyadh"
        );
    }

    #[test]
    fn test_bare_map_document() {
        let doc = br#"{"11111":{"tiles":["t1"],"address_count":2}}"#;
        let cat = PostcodeCatalog::from_json(doc, &partitions()).unwrap();
        assert_eq!(cat.len(), 1);
    }

    #[test]
    fn test_prefix_search() {
        let cat = PostcodeCatalog::from_json(INDEX.as_bytes(), &partitions()).unwrap();
        let codes: Vec<&str> = cat
            .prefix_search("122", None)
            .iter()
            .map(|e| e.postcode.as_str())
            .collect();
        assert_eq!(codes, vec!["12211", "12241"]);
        assert_eq!(cat.prefix_search("1", Some(1)).len(), 1);
        assert_eq!(cat.prefix_search("", None).len(), 4);
        assert!(cat.prefix_search("3", None).is_empty());
    }

    #[test]
    fn test_stats() {
        let cat = PostcodeCatalog::from_json(INDEX.as_bytes(), &partitions()).unwrap();
        let stats = cat.stats();
        assert_eq!(stats.postcodes, 4);
        assert_eq!(stats.addresses, 62);
        assert_eq!(stats.avg_partitions_per_postcode, 5.0 / 4.0);
    }
}
