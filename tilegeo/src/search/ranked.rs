//! Ranked full-text strategy.

use crate::backend::{
    Direction, FetchOutcome, IndexId, PartitionSource, Predicate, QueryBackend, QueryRequest,
    SearchError, SortKey,
};
use crate::projection::Column;
use tracing::debug;

/// Ephemeral index that is released when dropped, including on early
/// return and error paths.
pub struct EphemeralIndex<'a, B: QueryBackend> {
    backend: &'a B,
    id: IndexId,
}

impl<'a, B: QueryBackend> EphemeralIndex<'a, B> {
    /// Builds an index over `field` of `sources`.
    pub async fn build(
        backend: &'a B,
        sources: &[PartitionSource],
        field: Column,
    ) -> Result<EphemeralIndex<'a, B>, SearchError> {
        let built = backend.build_ephemeral_index(sources, field).await?;
        debug!(
            index = %built.id,
            documents = built.documents,
            failed = built.failures.len(),
            "Ephemeral index ready"
        );
        Ok(Self {
            backend,
            id: built.id,
        })
    }

    pub fn id(&self) -> IndexId {
        self.id
    }
}

impl<B: QueryBackend> Drop for EphemeralIndex<'_, B> {
    fn drop(&mut self) {
        self.backend.drop_ephemeral_index(self.id);
    }
}

/// Runs a ranked query: relevance descending, then id ascending.
pub async fn search<B: QueryBackend>(
    backend: &B,
    sources: &[PartitionSource],
    query: &str,
    field: Column,
    columns: Vec<Column>,
    filter: Predicate,
    limit: usize,
) -> Result<FetchOutcome, SearchError> {
    let index = EphemeralIndex::build(backend, sources, field).await?;

    let request = QueryRequest::builder()
        .sources(sources.iter().cloned())
        .columns(columns)
        .filter(filter)
        .order_by(SortKey::Score, Direction::Desc)
        .order_by(SortKey::Column(Column::Id), Direction::Asc)
        .limit(limit)
        .build();

    backend.ranked_search(index.id(), query, &request).await
}
