//! Substring-gate plus token-similarity strategy.

use crate::backend::{
    BackendError, Direction, FetchOutcome, PartitionSource, Predicate, QueryBackend, QueryRequest,
    SortKey,
};
use crate::projection::Column;
use crate::text::{has_arabic, query_tokens};

/// Relevance gate: at least one query token must occur in `field`.
///
/// Latin tokens match case-insensitively. With no usable tokens every row
/// passes.
pub fn token_gate(cleaned: &str, field: Column) -> Predicate {
    let tokens = query_tokens(cleaned);
    if tokens.is_empty() {
        return Predicate::True;
    }
    Predicate::Or(
        tokens
            .into_iter()
            .map(|token| Predicate::ContainsText {
                column: field,
                case_insensitive: !has_arabic(&token),
                needle: token,
            })
            .collect(),
    )
}

/// Runs the fallback query: similarity descending, then id ascending.
pub async fn search<B: QueryBackend>(
    backend: &B,
    sources: &[PartitionSource],
    cleaned: &str,
    field: Column,
    columns: Vec<Column>,
    filter: Predicate,
    limit: usize,
) -> Result<FetchOutcome, BackendError> {
    let request = QueryRequest::builder()
        .sources(sources.iter().cloned())
        .columns(columns)
        .filter(filter)
        .filter(token_gate(cleaned, field))
        .similarity(field, cleaned)
        .order_by(SortKey::Score, Direction::Desc)
        .order_by(SortKey::Column(Column::Id), Direction::Asc)
        .limit(limit)
        .build();

    backend.fetch(&request).await
}
