//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`admin`] - Country and administrative hierarchy of a point
//! - [`catalog`] - Postcode and partition listings, statistics
//! - [`config`] - Configuration inspection (path, show)
//! - [`lookup`] - Exact postcode and house-number lookups
//! - [`query`] - Forward and reverse geocoding

pub mod admin;
pub mod catalog;
pub mod common;
pub mod config;
pub mod lookup;
pub mod query;
