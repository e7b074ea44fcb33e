//! Query backends.
//!
//! The orchestrator never evaluates predicates itself. It builds a
//! [`QueryRequest`] and hands it to a [`QueryBackend`], which reads the
//! requested partitions, evaluates the request and reports per-partition
//! failures alongside the rows.
//!
//! Two implementations are provided:
//!
//! - [`RemoteBackend`] fetches Parquet partition files over HTTP and keeps
//!   them in a byte-bounded cache.
//! - [`InMemoryBackend`] holds partitions in memory, with switches for
//!   simulating a missing ranked-search extension and failing partitions.

mod cache;
mod decode;
mod eval;
mod geometry;
mod http;
mod memory;
mod rank;
mod remote;
mod request;
mod types;

pub use cache::{PartitionCache, PartitionCacheStats};
pub use decode::decode_partition;
pub use eval::{compare_rows, compare_text, evaluate, evaluate_scored};
pub use geometry::{BoundarySet, BoundaryShape, Polygon, Ring};
pub use http::{AsyncHttpClient, AsyncReqwestClient, DEFAULT_TIMEOUT_SECS};
pub use memory::{InMemoryBackend, InMemoryBackendBuilder};
pub use rank::{Bm25Index, IndexRegistry};
pub use remote::RemoteBackend;
pub use request::{
    Direction, OrderKey, Predicate, QueryRequest, QueryRequestBuilder, Scoring, SortKey,
};
pub use types::{
    AddressRecord, BackendError, BoundaryFeature, BoundaryLayer, BuiltIndex, FetchOutcome, IndexId,
    PartitionFailure, PartitionSource, SearchError,
};

use crate::projection::Column;
use std::future::Future;

/// Executes structured requests over partitioned address data.
///
/// Implementations must be safe to share between concurrent operations.
pub trait QueryBackend: Send + Sync {
    /// Reads the request's partitions and evaluates it.
    ///
    /// A partition that cannot be read is reported in
    /// [`FetchOutcome::failures`] and does not abort the others.
    fn fetch(
        &self,
        request: &QueryRequest,
    ) -> impl Future<Output = Result<FetchOutcome, BackendError>> + Send;

    /// Capability probe for ranked full-text search.
    fn enable_ranked_search(&self) -> impl Future<Output = Result<(), SearchError>> + Send;

    /// Builds a per-query ranked index over `field` of the given partitions.
    fn build_ephemeral_index(
        &self,
        sources: &[PartitionSource],
        field: Column,
    ) -> impl Future<Output = Result<BuiltIndex, SearchError>> + Send;

    /// Evaluates `request`, scoring each row against `query` with the index.
    /// Rows that match no query term are excluded.
    fn ranked_search(
        &self,
        index: IndexId,
        query: &str,
        request: &QueryRequest,
    ) -> impl Future<Output = Result<FetchOutcome, SearchError>> + Send;

    /// Releases an ephemeral index. Unknown ids are ignored.
    fn drop_ephemeral_index(&self, index: IndexId);

    /// Loads a boundary layer from `url`.
    fn load_boundaries(
        &self,
        layer: BoundaryLayer,
        url: &str,
    ) -> impl Future<Output = Result<(), BackendError>> + Send;

    /// Finds the feature of `layer` whose polygon contains the point.
    fn boundary_lookup(
        &self,
        layer: BoundaryLayer,
        lat: f64,
        lon: f64,
    ) -> impl Future<Output = Result<Option<BoundaryFeature>, BackendError>> + Send;

    /// Releases cached data and live indexes.
    fn shutdown(&self) -> impl Future<Output = ()> + Send;
}
