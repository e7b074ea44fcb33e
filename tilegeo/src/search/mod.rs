//! Text search strategies.
//!
//! Forward geocoding ranks candidate rows with one of two strategies:
//!
//! - **Ranked**: a per-query BM25 index over the address field, scored by
//!   the backend's ranked-search extension.
//! - **Fallback**: a substring gate on query tokens, ranked by token-set
//!   similarity.
//!
//! The mode is fixed by a single capability probe at initialization. A
//! ranked attempt that fails at query time is re-run through the fallback
//! before returning, so the fallback path must always be able to answer
//! on its own.

mod fallback;
mod ranked;

pub use fallback::token_gate;
pub use ranked::EphemeralIndex;

use crate::backend::{BackendError, FetchOutcome, PartitionSource, Predicate, QueryBackend};
use crate::projection::Column;
use crate::text::{clean_query, has_arabic};
use serde::Serialize;
use tracing::{info, warn};

/// Which strategy answers text queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Ranked,
    Fallback,
}

/// A text query over a set of candidate partitions.
#[derive(Debug, Clone)]
pub struct TextQuery<'a> {
    pub sources: &'a [PartitionSource],
    pub text: &'a str,
    /// Columns kept in the returned rows.
    pub columns: Vec<Column>,
    /// Row filter applied before ranking.
    pub filter: Predicate,
    pub limit: usize,
}

/// Rows from a text query and the strategy that produced them.
#[derive(Debug, Clone)]
pub struct TextSearchResult {
    pub outcome: FetchOutcome,
    pub mode: SearchMode,
}

/// Ranked/fallback state machine.
#[derive(Debug, Clone, Copy)]
pub struct TextSearchStrategy {
    mode: SearchMode,
}

impl TextSearchStrategy {
    /// Probes the backend once. Failure pins the strategy to fallback.
    pub async fn probe<B: QueryBackend>(backend: &B) -> Self {
        match backend.enable_ranked_search().await {
            Ok(()) => {
                info!("Ranked search available");
                Self {
                    mode: SearchMode::Ranked,
                }
            }
            Err(e) => {
                info!(reason = %e, "Ranked search unavailable, using fallback text search");
                Self::fallback_only()
            }
        }
    }

    /// Strategy that never attempts ranked search.
    pub fn fallback_only() -> Self {
        Self {
            mode: SearchMode::Fallback,
        }
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn is_ranked_available(&self) -> bool {
        self.mode == SearchMode::Ranked
    }

    /// Address field searched for `cleaned`: Arabic when the query contains
    /// any Arabic character, English otherwise.
    pub fn field_for(cleaned: &str) -> Column {
        if has_arabic(cleaned) {
            Column::FullAddressAr
        } else {
            Column::FullAddressEn
        }
    }

    /// Runs a text query.
    ///
    /// An empty query skips ranking and returns fallback results, which are
    /// then ordered by id only.
    pub async fn search<B: QueryBackend>(
        &self,
        backend: &B,
        query: TextQuery<'_>,
    ) -> Result<TextSearchResult, BackendError> {
        let cleaned = clean_query(query.text);
        let field = Self::field_for(&cleaned);

        if self.mode == SearchMode::Ranked && !cleaned.is_empty() {
            let attempt = ranked::search(
                backend,
                query.sources,
                &cleaned,
                field,
                query.columns.clone(),
                query.filter.clone(),
                query.limit,
            )
            .await;
            match attempt {
                Ok(outcome) => {
                    return Ok(TextSearchResult {
                        outcome,
                        mode: SearchMode::Ranked,
                    })
                }
                Err(e) => warn!(error = %e, "Ranked search failed, retrying with fallback"),
            }
        }

        let outcome = fallback::search(
            backend,
            query.sources,
            &cleaned,
            field,
            query.columns,
            query.filter,
            query.limit,
        )
        .await?;
        Ok(TextSearchResult {
            outcome,
            mode: SearchMode::Fallback,
        })
    }
}
