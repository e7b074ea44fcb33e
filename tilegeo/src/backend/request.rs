//! Structured backend requests.
//!
//! A [`QueryRequest`] carries sources, projected columns, a predicate tree,
//! an optional distance origin, scoring and ordering. User-supplied values
//! travel as typed parameters inside [`Predicate`] nodes and are never
//! spliced into query text.
//!
//! # Example
//!
//! ```
//! use tilegeo::backend::{Direction, PartitionSource, Predicate, QueryRequest, SortKey};
//! use tilegeo::projection::Column;
//!
//! let request = QueryRequest::builder()
//!     .source(PartitionSource::new("8553b1a7fffffff", "https://host/tiles/8553b1a7fffffff.parquet"))
//!     .columns(vec![Column::Id, Column::Longitude, Column::Latitude])
//!     .filter(Predicate::Eq(Column::Postcode, "12345".to_string()))
//!     .order_by(SortKey::Column(Column::HouseNumber), Direction::Asc)
//!     .limit(50)
//!     .build();
//!
//! assert_eq!(request.limit, Some(50));
//! ```

use super::types::{AddressRecord, PartitionSource};
use crate::geo::BoundingBox;
use crate::projection::Column;

/// Row filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches every row.
    True,
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    /// Exact match on a text column, after trimming the stored value.
    Eq(Column, String),
    /// Row coordinates inside the box (edges inclusive).
    WithinBox(BoundingBox),
    /// Substring match on a text column.
    ContainsText {
        column: Column,
        needle: String,
        case_insensitive: bool,
    },
}

impl Predicate {
    /// Evaluates the predicate against a row. Missing values never match.
    pub fn matches(&self, row: &AddressRecord) -> bool {
        match self {
            Predicate::True => true,
            Predicate::And(parts) => parts.iter().all(|p| p.matches(row)),
            Predicate::Or(parts) => parts.iter().any(|p| p.matches(row)),
            Predicate::Eq(column, value) => row
                .text(*column)
                .map(|v| v.trim() == value)
                .unwrap_or(false),
            Predicate::WithinBox(bbox) => bbox.contains(row.latitude, row.longitude),
            Predicate::ContainsText {
                column,
                needle,
                case_insensitive,
            } => match row.text(*column) {
                Some(haystack) if *case_insensitive => {
                    haystack.to_lowercase().contains(&needle.to_lowercase())
                }
                Some(haystack) => haystack.contains(needle.as_str()),
                None => false,
            },
        }
    }

    /// Combines two predicates with AND, flattening trivial nodes.
    pub fn and(self, other: Predicate) -> Predicate {
        match (self, other) {
            (Predicate::True, p) | (p, Predicate::True) => p,
            (Predicate::And(mut parts), Predicate::And(more)) => {
                parts.extend(more);
                Predicate::And(parts)
            }
            (Predicate::And(mut parts), p) => {
                parts.push(p);
                Predicate::And(parts)
            }
            (p, q) => Predicate::And(vec![p, q]),
        }
    }

    fn collect_columns(&self, out: &mut Vec<Column>) {
        match self {
            Predicate::True => {}
            Predicate::And(parts) | Predicate::Or(parts) => {
                parts.iter().for_each(|p| p.collect_columns(out))
            }
            Predicate::Eq(column, _) | Predicate::ContainsText { column, .. } => out.push(*column),
            Predicate::WithinBox(_) => {
                out.push(Column::Latitude);
                out.push(Column::Longitude);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Computed great-circle distance.
    Distance,
    /// Computed relevance score.
    Score,
    /// Stored text column. Digit-only values compare numerically.
    Column(Column),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderKey {
    pub key: SortKey,
    pub direction: Direction,
}

/// Per-row relevance computed by the shared evaluator.
#[derive(Debug, Clone, PartialEq)]
pub enum Scoring {
    /// Token-set intersection-over-union between `query` and `column`.
    Similarity { column: Column, query: String },
}

/// A bounded request over a list of partitions.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub sources: Vec<PartitionSource>,
    /// Columns kept in the returned rows.
    pub columns: Vec<Column>,
    pub predicate: Predicate,
    /// `(lat, lon)` origin for the `distance_m` column.
    pub distance_from: Option<(f64, f64)>,
    pub scoring: Option<Scoring>,
    pub order: Vec<OrderKey>,
    pub limit: Option<usize>,
}

impl QueryRequest {
    pub fn builder() -> QueryRequestBuilder {
        QueryRequestBuilder::default()
    }

    /// Every column the backend must read: projected, filtered, scored and
    /// ordered columns plus coordinates. Returned in storage order.
    pub fn referenced_columns(&self) -> Vec<Column> {
        let mut cols = self.columns.clone();
        cols.extend([Column::Id, Column::Longitude, Column::Latitude]);
        self.predicate.collect_columns(&mut cols);
        if let Some(Scoring::Similarity { column, .. }) = &self.scoring {
            cols.push(*column);
        }
        for key in &self.order {
            if let SortKey::Column(column) = key.key {
                cols.push(column);
            }
        }
        Column::ALL
            .iter()
            .copied()
            .filter(|c| cols.contains(c))
            .collect()
    }

    /// Ids of the requested partitions.
    pub fn partition_ids(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.id.as_str()).collect()
    }
}

/// Builder for [`QueryRequest`].
#[derive(Debug, Clone)]
pub struct QueryRequestBuilder {
    request: QueryRequest,
}

impl Default for QueryRequestBuilder {
    fn default() -> Self {
        Self {
            request: QueryRequest {
                sources: Vec::new(),
                columns: Column::ALL.to_vec(),
                predicate: Predicate::True,
                distance_from: None,
                scoring: None,
                order: Vec::new(),
                limit: None,
            },
        }
    }
}

impl QueryRequestBuilder {
    pub fn source(mut self, source: PartitionSource) -> Self {
        self.request.sources.push(source);
        self
    }

    pub fn sources(mut self, sources: impl IntoIterator<Item = PartitionSource>) -> Self {
        self.request.sources.extend(sources);
        self
    }

    pub fn columns(mut self, columns: Vec<Column>) -> Self {
        self.request.columns = columns;
        self
    }

    /// Adds a predicate, AND-ed with any already present.
    pub fn filter(mut self, predicate: Predicate) -> Self {
        let current = std::mem::replace(&mut self.request.predicate, Predicate::True);
        self.request.predicate = current.and(predicate);
        self
    }

    pub fn distance_from(mut self, lat: f64, lon: f64) -> Self {
        self.request.distance_from = Some((lat, lon));
        self
    }

    pub fn similarity(mut self, column: Column, query: impl Into<String>) -> Self {
        self.request.scoring = Some(Scoring::Similarity {
            column,
            query: query.into(),
        });
        self
    }

    pub fn order_by(mut self, key: SortKey, direction: Direction) -> Self {
        self.request.order.push(OrderKey { key, direction });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.request.limit = Some(limit);
        self
    }

    pub fn build(self) -> QueryRequest {
        self.request
    }
}
