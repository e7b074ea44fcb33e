//! Spatial grid: point-to-partition hashing and neighbor rings.
//!
//! Partitions are H3 cells at a fixed resolution. [`SpatialGrid`] is the
//! seam to the grid library; [`SpatialGridAdapter`] binds it to the
//! configured resolution and to the partitions that actually exist.

use crate::catalog::PartitionCatalog;
use h3o::{CellIndex, LatLng, Resolution};
use std::str::FromStr;
use thiserror::Error;

/// Default partition resolution (cells of roughly 250 km²).
pub const DEFAULT_RESOLUTION: u8 = 5;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Invalid resolution: {0}")]
    InvalidResolution(u8),

    #[error("Invalid cell id: {0}")]
    InvalidCell(String),
}

/// Deterministic hexagonal grid.
pub trait SpatialGrid: Send + Sync {
    /// Cell containing the point at `resolution`.
    fn cell_for_point(&self, lat: f64, lon: f64, resolution: u8) -> Result<String, GridError>;

    /// Cells within `ring` steps of `cell`, excluding `cell` itself.
    fn neighbors(&self, cell: &str, ring: u32) -> Result<Vec<String>, GridError>;
}

/// H3 grid backed by `h3o`. Cell ids are lowercase hex strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct H3Grid;

impl H3Grid {
    pub fn new() -> Self {
        Self
    }
}

impl SpatialGrid for H3Grid {
    fn cell_for_point(&self, lat: f64, lon: f64, resolution: u8) -> Result<String, GridError> {
        let res = Resolution::try_from(resolution)
            .map_err(|_| GridError::InvalidResolution(resolution))?;
        let point =
            LatLng::new(lat, lon).map_err(|e| GridError::InvalidCoordinate(e.to_string()))?;
        Ok(point.to_cell(res).to_string())
    }

    fn neighbors(&self, cell: &str, ring: u32) -> Result<Vec<String>, GridError> {
        let origin =
            CellIndex::from_str(cell).map_err(|_| GridError::InvalidCell(cell.to_string()))?;
        let disk: Vec<CellIndex> = origin.grid_disk(ring);
        Ok(disk
            .into_iter()
            .filter(|c| *c != origin)
            .map(|c| c.to_string())
            .collect())
    }
}

/// Grid bound to a resolution, filtering cells to known partitions.
pub struct SpatialGridAdapter<G: SpatialGrid> {
    grid: G,
    resolution: u8,
}

impl<G: SpatialGrid> SpatialGridAdapter<G> {
    pub fn new(grid: G, resolution: u8) -> Self {
        Self { grid, resolution }
    }

    pub fn resolution(&self) -> u8 {
        self.resolution
    }

    pub fn cell_for_point(&self, lat: f64, lon: f64) -> Result<String, GridError> {
        self.grid.cell_for_point(lat, lon, self.resolution)
    }

    pub fn neighbors(&self, cell: &str, ring: u32) -> Result<Vec<String>, GridError> {
        self.grid.neighbors(cell, ring)
    }

    /// Partition ids covering the point: the containing cell, then, when
    /// `ring > 0`, its neighbors, keeping only ids present in `catalog`.
    ///
    /// Returns an empty list when the containing cell is not a partition.
    pub fn candidate_partitions(
        &self,
        lat: f64,
        lon: f64,
        ring: u32,
        catalog: &PartitionCatalog,
    ) -> Result<Vec<String>, GridError> {
        let origin = self.cell_for_point(lat, lon)?;
        if !catalog.contains(&origin) {
            return Ok(Vec::new());
        }

        let mut ids = vec![origin.clone()];
        if ring > 0 {
            let mut ring_ids: Vec<String> = self
                .neighbors(&origin, ring)?
                .into_iter()
                .filter(|id| catalog.contains(id))
                .collect();
            ring_ids.sort();
            ids.extend(ring_ids);
        }
        Ok(ids)
    }
}
