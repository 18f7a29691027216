//! Uniform-grid spatial hash
//!
//! Bodies are binned by the cell containing their centre:
//! `cx = floor(x / cell_size)`, `cy = floor(y / cell_size)`.
//! With `cell_size` >= the largest diameter, every overlapping pair lives in
//! the same cell or in one of the 8 neighbours, so a 3x3 lookup is enough.
//!
//! The hash is a snapshot. It stores body indices, is rebuilt wholesale and
//! is never edited while a collision pass reads it.

use std::collections::HashMap;

use super::error::{SimError, SimResult};
use super::states::Vec2;

/// Integer cell coordinate `(cx, cy)`
pub type CellKey = (i32, i32);

/// Inclusive rectangle of cell coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellBounds {
    pub min: CellKey,
    pub max: CellKey,
}

impl CellBounds {
    pub fn single(cell: CellKey) -> Self {
        Self { min: cell, max: cell }
    }

    pub fn include(&mut self, (cx, cy): CellKey) {
        self.min = (self.min.0.min(cx), self.min.1.min(cy));
        self.max = (self.max.0.max(cx), self.max.1.max(cy));
    }

    pub fn contains(&self, (cx, cy): CellKey) -> bool {
        cx >= self.min.0 && cx <= self.max.0 && cy >= self.min.1 && cy <= self.max.1
    }

    /// Grow by `by` cells on every side
    pub fn grow(&self, by: i32) -> Self {
        Self {
            min: (self.min.0.saturating_sub(by), self.min.1.saturating_sub(by)),
            max: (self.max.0.saturating_add(by), self.max.1.saturating_add(by)),
        }
    }

    pub fn intersects(&self, other: &CellBounds) -> bool {
        self.min.0 <= other.max.0
            && other.min.0 <= self.max.0
            && self.min.1 <= other.max.1
            && other.min.1 <= self.max.1
    }

    pub fn width(&self) -> i64 {
        self.max.0 as i64 - self.min.0 as i64 + 1
    }

    pub fn height(&self) -> i64 {
        self.max.1 as i64 - self.min.1 as i64 + 1
    }

    /// Cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = CellKey> {
        let (x0, x1) = (self.min.0, self.max.0);
        (self.min.1..=self.max.1).flat_map(move |cy| (x0..=x1).map(move |cx| (cx, cy)))
    }
}

#[derive(Debug, Clone)]
pub struct SpatialHash {
    cell_size: f32,
    inv_cell_size: f32,
    cells: HashMap<CellKey, Vec<usize>>,
    bounds: Option<CellBounds>,
    len: usize,
}

impl SpatialHash {
    pub fn new(cell_size: f32) -> SimResult<Self> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(SimError::InvalidCellSize(cell_size));
        }
        Ok(Self {
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            cells: HashMap::new(),
            bounds: None,
            len: 0,
        })
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Cell containing `p`
    #[inline]
    pub fn cell_of(&self, p: &Vec2) -> CellKey {
        (
            (p.x * self.inv_cell_size).floor() as i32,
            (p.y * self.inv_cell_size).floor() as i32,
        )
    }

    /// Rebuild from scratch; index `i` of `positions` is stored as body `i`
    pub fn build<'a, I>(&mut self, positions: I)
    where
        I: IntoIterator<Item = &'a Vec2>,
    {
        // keep the per-cell allocations around between rebuilds
        for list in self.cells.values_mut() {
            list.clear();
        }
        self.bounds = None;
        self.len = 0;

        for (i, p) in positions.into_iter().enumerate() {
            let key = self.cell_of(p);
            self.cells.entry(key).or_default().push(i);

            match self.bounds.as_mut() {
                Some(b) => b.include(key),
                None => self.bounds = Some(CellBounds::single(key)),
            }
            self.len += 1;
        }

        self.cells.retain(|_, list| !list.is_empty());
    }

    /// Body indices binned in `key` (empty if none)
    #[inline]
    pub fn cell(&self, key: CellKey) -> &[usize] {
        self.cells.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Bounds of all occupied cells, `None` when empty
    pub fn bounds(&self) -> Option<CellBounds> {
        self.bounds
    }

    /// Keys of all non-empty cells, in no particular order
    pub fn occupied_keys(&self) -> impl Iterator<Item = CellKey> + '_ {
        self.cells.keys().copied()
    }

    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Number of bodies stored
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
