//! Geocoder error types.

use crate::backend::BackendError;
use crate::geo::CoordError;
use crate::grid::GridError;
use thiserror::Error;

/// Errors surfaced by [`Geocoder`](super::Geocoder) operations.
///
/// Most "nothing found" conditions are not errors: unknown postcodes,
/// points outside the supported country and empty candidate sets all
/// produce empty results.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeocodeError {
    /// An index file could not be fetched or parsed during initialization.
    #[error("Catalog unavailable during {stage} ({source_url}): {reason}")]
    CatalogUnavailable {
        stage: &'static str,
        source_url: String,
        reason: String,
    },

    /// No partition (or boundary layer) involved in a request could be read.
    #[error("Backend unavailable during {stage}: {failed} source(s) failed: {reason}")]
    BackendUnavailable {
        stage: &'static str,
        failed: usize,
        reason: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Geocoder is closed")]
    Closed,
}

impl GeocodeError {
    /// A single failed backend call, such as a boundary lookup.
    pub(crate) fn backend(stage: &'static str, error: &BackendError) -> Self {
        Self::BackendUnavailable {
            stage,
            failed: 1,
            reason: error.to_string(),
        }
    }
}

impl From<CoordError> for GeocodeError {
    fn from(e: CoordError) -> Self {
        Self::InvalidInput(e.to_string())
    }
}

impl From<GridError> for GeocodeError {
    fn from(e: GridError) -> Self {
        Self::InvalidInput(e.to_string())
    }
}
