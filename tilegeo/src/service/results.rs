//! Query results and caller-visible warnings.

use crate::backend::AddressRecord;
use crate::search::SearchMode;
use serde::Serialize;
use std::fmt;

/// Condition that degraded a result without failing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryWarning {
    /// House-number search had no region or bbox and only looked at the
    /// first partitions of the catalog.
    UnscopedNumberSearch { searched: usize, total: usize },
    /// Forward geocoding had no region or bbox and searched a sample of
    /// the catalog.
    UnscopedForwardSearch { sampled: usize, total: usize },
    /// Some partitions could not be read; results come from the rest.
    PartialFailure { failed: Vec<String> },
}

impl fmt::Display for QueryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryWarning::UnscopedNumberSearch { searched, total } => write!(
                f,
                "house numbers are not unique nationally; searched {} of {} partitions, add a region or bbox",
                searched, total
            ),
            QueryWarning::UnscopedForwardSearch { sampled, total } => write!(
                f,
                "no region or bbox given; searched a sample of {} of {} partitions",
                sampled, total
            ),
            QueryWarning::PartialFailure { failed } => {
                write!(f, "{} partition(s) could not be read: {}", failed.len(), failed.join(", "))
            }
        }
    }
}

/// Records returned by a query, best first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GeocodeResult {
    pub records: Vec<AddressRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<QueryWarning>,
    /// Strategy that ranked a forward query.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_mode: Option<SearchMode>,
}

impl GeocodeResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub(crate) fn with_warnings(mut self, warnings: Vec<QueryWarning>) -> Self {
        // Prepend so scoping warnings come before fetch failures
        let mut all = warnings;
        all.append(&mut self.warnings);
        self.warnings = all;
        self
    }
}
