//! Region-parallel collision pass
//!
//! The occupied cell bounds are tiled with `region_cells` x `region_cells`
//! rectangles. Each rectangle gets a wave from the parity of its tile
//! coordinate, `(bx % 2) + 2 * (by % 2)`, giving four waves:
//!
//! ```text
//!   +---+---+---+---+
//!   | 0 | 1 | 0 | 1 |   two tiles of the same wave are always separated
//!   +---+---+---+---+   by a full tile (>= 2 cells), so their halos
//!   | 2 | 3 | 2 | 3 |   (tile grown by 1 cell) never touch
//!   +---+---+---+---+
//! ```
//!
//! A worker only reads and writes bodies binned in its halo, so all regions
//! of one wave can run at once without locks. Waves run one after another;
//! each wave is joined and its corrections written back before the next.
//!
//! Ownership of a body is decided by the hash snapshot, not by its current
//! position, so the guarantee holds between rebuilds as well.

use rayon::prelude::*;

use super::collision::{resolve_cell_neighborhood, Patch, Stencil};
use super::error::{SimError, SimResult};
use super::params::Execution;
use super::spatial_hash::{CellBounds, SpatialHash};
use super::states::Vec2;

pub const WAVES: usize = 4;

/// A rectangle of cells handled by one worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub cells: CellBounds,
    pub wave: usize,
}

impl Region {
    /// Every cell the worker may touch
    pub fn halo(&self) -> CellBounds {
        self.cells.grow(1)
    }
}

/// Outcome of one collision pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    pub regions: usize,
    pub waves: usize,
    pub corrections: usize,
}

/// Result of one worker
struct RegionOutput {
    corrections: usize,
    positions: Vec<(usize, Vec2)>,
}

#[derive(Debug, Clone)]
pub struct RegionScheduler {
    region_cells: i32,
    waves: [Vec<Region>; WAVES],
}

impl RegionScheduler {
    pub fn new(region_cells: i32) -> SimResult<Self> {
        if region_cells < 2 {
            return Err(SimError::InvalidRegionSize(region_cells));
        }
        Ok(Self {
            region_cells,
            waves: Default::default(),
        })
    }

    pub fn region_cells(&self) -> i32 {
        self.region_cells
    }

    /// Tile `bounds` completely, no gaps, no overlaps
    pub fn partition(&self, bounds: CellBounds) -> Vec<Region> {
        let side = self.region_cells as i64;
        let tiles_x = (bounds.width() + side - 1) / side;
        let tiles_y = (bounds.height() + side - 1) / side;

        let mut regions = Vec::with_capacity((tiles_x * tiles_y) as usize);
        for by in 0..tiles_y {
            for bx in 0..tiles_x {
                regions.push(self.tile(bounds, bx, by));
            }
        }
        regions
    }

    fn tile(&self, bounds: CellBounds, bx: i64, by: i64) -> Region {
        let side = self.region_cells as i64;
        let x0 = bounds.min.0 as i64 + bx * side;
        let y0 = bounds.min.1 as i64 + by * side;
        let x1 = (x0 + side - 1).min(bounds.max.0 as i64);
        let y1 = (y0 + side - 1).min(bounds.max.1 as i64);

        Region {
            cells: CellBounds {
                min: (x0 as i32, y0 as i32),
                max: (x1 as i32, y1 as i32),
            },
            wave: ((bx & 1) + 2 * (by & 1)) as usize,
        }
    }

    /// Rebuild the wave lists for the current hash
    ///
    /// Only tiles holding at least one body get a region; the empty ones of
    /// the tiling have nothing to resolve.
    pub fn plan(&mut self, hash: &SpatialHash) {
        for wave in self.waves.iter_mut() {
            wave.clear();
        }
        let Some(bounds) = hash.bounds() else {
            return;
        };

        let side = self.region_cells as i64;
        let mut tiles: Vec<(i64, i64)> = Vec::with_capacity(hash.occupied_cells());

        for cell in hash.occupied_keys() {
            let bx = (cell.0 as i64 - bounds.min.0 as i64) / side;
            let by = (cell.1 as i64 - bounds.min.1 as i64) / side;
            tiles.push((by, bx));
        }
        tiles.sort_unstable();
        tiles.dedup();

        for (by, bx) in tiles {
            let region = self.tile(bounds, bx, by);
            self.waves[region.wave].push(region);
        }
    }

    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.waves.iter().flatten()
    }

    pub fn wave(&self, wave: usize) -> &[Region] {
        &self.waves[wave]
    }

    /// Resolve every collision in `hash`, wave by wave
    ///
    /// `positions` is both the input snapshot and the output; `radii` is
    /// indexed the same way. In parallel mode the regions of a wave run on
    /// the current rayon pool and the `collect` joins them before the
    /// corrections are written back.
    pub fn resolve(
        &self,
        hash: &SpatialHash,
        positions: &mut [Vec2],
        radii: &[f32],
        execution: Execution,
    ) -> PassStats {
        let mut stats = PassStats::default();

        for wave in self.waves.iter().filter(|w| !w.is_empty()) {
            let snapshot: &[Vec2] = positions;
            let outputs: Vec<RegionOutput> = match execution {
                Execution::Parallel => wave
                    .par_iter()
                    .map(|r| resolve_region(r, hash, snapshot, radii))
                    .collect(),
                Execution::Sequential => wave
                    .iter()
                    .map(|r| resolve_region(r, hash, snapshot, radii))
                    .collect(),
            };

            // halos of one wave are disjoint, so each body appears at most once
            for out in outputs {
                stats.corrections += out.corrections;
                for (i, p) in out.positions {
                    positions[i] = p;
                }
            }

            stats.regions += wave.len();
            stats.waves += 1;
        }

        stats
    }
}

fn resolve_region(region: &Region, hash: &SpatialHash, positions: &[Vec2], radii: &[f32]) -> RegionOutput {
    let mut patch = Patch::gather(region.halo(), hash, positions, radii);
    let mut corrections = 0;

    for cell in region.cells.cells() {
        corrections += resolve_cell_neighborhood(cell, hash, &mut patch, Stencil::Forward);
    }

    RegionOutput {
        corrections,
        positions: patch.into_corrections(),
    }
}
