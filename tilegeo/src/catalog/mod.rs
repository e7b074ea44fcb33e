//! Partition and postcode catalogs.
//!
//! Both are loaded once from small JSON index documents during
//! initialization and are read-only afterwards.

mod partition;
mod postcode;

pub use partition::{sample_evenly, PartitionCatalog, PartitionDescriptor};
pub use postcode::{PostcodeCatalog, PostcodeEntry, PostcodeStats};

use thiserror::Error;

/// Errors from parsing an index document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error("Failed to parse index: {0}")]
    Parse(String),
}
