//! Geocoder statistics.

use crate::config::format_size;
use serde::Serialize;
use std::fmt;

/// Snapshot of catalog sizes and runtime state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeocoderStats {
    pub partitions: usize,
    pub total_addresses: u64,
    pub total_size_kb: u64,
    pub postcodes: usize,
    /// Average partitions per postcode.
    pub avg_partitions_per_postcode: f64,
    /// Distinct partitions read since initialization.
    pub loaded_partitions: usize,
    pub ranked_search_available: bool,
    /// Location serving partition files, after any fallback.
    pub base_url: String,
}

impl fmt::Display for GeocoderStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_bytes = usize::try_from(self.total_size_kb.saturating_mul(1024)).unwrap_or(usize::MAX);
        writeln!(f, "Partitions:          {}", self.partitions)?;
        writeln!(f, "Addresses:           {}", self.total_addresses)?;
        writeln!(f, "Total size:          {}", format_size(total_bytes))?;
        writeln!(f, "Postcodes:           {}", self.postcodes)?;
        writeln!(
            f,
            "Partitions/postcode: {:.2}",
            self.avg_partitions_per_postcode
        )?;
        writeln!(f, "Loaded partitions:   {}", self.loaded_partitions)?;
        writeln!(
            f,
            "Ranked search:       {}",
            if self.ranked_search_available {
                "available"
            } else {
                "fallback"
            }
        )?;
        write!(f, "Data location:       {}", self.base_url)
    }
}
