//! High-level geocoding service.
//!
//! [`Geocoder`] is the public surface: it is built by
//! [`Geocoder::initialize`] from a [`GeocoderConfig`], a
//! [`QueryBackend`](crate::backend::QueryBackend) and a
//! [`SpatialGrid`](crate::grid::SpatialGrid), and torn down by
//! [`Geocoder::close`].
//!
//! ```ignore
//! use tilegeo::service::{Geocoder, GeocoderConfig, QueryOptions};
//! use tilegeo::projection::DetailLevel;
//!
//! let geocoder = Geocoder::initialize(GeocoderConfig::default(), backend, grid, &http).await?;
//!
//! let opts = QueryOptions::new().with_detail_level(DetailLevel::Minimal);
//! let nearby = geocoder.reverse_geocode(24.7136, 46.6753, &opts).await?;
//! let by_code = geocoder.search_by_postcode("12211", &QueryOptions::default()).await?;
//! ```

mod config;
mod context;
mod error;
mod facade;
mod options;
mod orchestrator;
mod results;
mod stats;

pub use config::{GeocoderConfig, GeocoderConfigBuilder};
pub use error::GeocodeError;
pub use facade::Geocoder;
pub use options::{Language, QueryOptions};
pub use results::{GeocodeResult, QueryWarning};
pub use stats::GeocoderStats;
