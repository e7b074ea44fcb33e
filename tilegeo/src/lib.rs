//! tilegeo - serverless geocoding over tile-partitioned address data
//!
//! Addresses live in remotely hosted, H3-partitioned Parquet files. This
//! library decides, per request, which partitions to read and which
//! columns to project, merges and ranks the rows, and degrades to a
//! fallback text strategy when ranked search is unavailable.
//!
//! # High-Level API
//!
//! The [`service`] module provides the facade:
//!
//! ```ignore
//! use tilegeo::backend::{AsyncReqwestClient, RemoteBackend};
//! use tilegeo::grid::H3Grid;
//! use tilegeo::service::{Geocoder, GeocoderConfig, QueryOptions};
//!
//! let http = AsyncReqwestClient::new()?;
//! let backend = RemoteBackend::new(AsyncReqwestClient::new()?, 256 * 1024 * 1024);
//! let geocoder = Geocoder::initialize(GeocoderConfig::default(), backend, H3Grid::new(), &http).await?;
//!
//! let hits = geocoder.geocode("King Fahd Road", &QueryOptions::new().with_region("Riyadh")).await?;
//! ```

pub mod backend;
pub mod boundary;
pub mod catalog;
pub mod config;
pub mod geo;
pub mod grid;
pub mod label;
pub mod logging;
pub mod projection;
pub mod search;
pub mod service;
pub mod text;

/// Version of the tilegeo library and CLI.
///
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
