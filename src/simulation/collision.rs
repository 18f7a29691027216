//! Pairwise circle collision resolution
//!
//! Position based: overlapping pairs are pushed apart along the line between
//! their centres, each by half the overlap. No impulses, no momentum
//! transfer; the implicit Verlet velocity picks the correction up on the
//! next integration step.
//!
//! Workers resolve pairs inside a [`Patch`], a private copy of the bodies
//! binned in a rectangle of cells, so nothing is shared mutably between
//! threads.

use std::collections::HashMap;

use super::spatial_hash::{CellBounds, CellKey, SpatialHash};
use super::states::Vec2;

/// Which neighbour cells a cell pairs its bodies with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stencil {
    /// All 8 neighbours: every pair with at least one body in the cell
    Full,
    /// Right, lower-left, lower and lower-right neighbours only. Running it
    /// over every cell visits each unordered pair exactly once.
    Forward,
}

const FULL: [CellKey; 8] = [(-1, -1), (0, -1), (1, -1), (-1, 0), (1, 0), (-1, 1), (0, 1), (1, 1)];
const FORWARD: [CellKey; 4] = [(1, 0), (-1, 1), (0, 1), (1, 1)];

impl Stencil {
    fn offsets(self) -> &'static [CellKey] {
        match self {
            Stencil::Full => &FULL,
            Stencil::Forward => &FORWARD,
        }
    }
}

/// True iff the circles overlap: `|a - b| < ra + rb`
#[inline]
pub fn is_colliding(a: &Vec2, ra: f32, b: &Vec2, rb: f32) -> bool {
    let r = ra + rb;
    (a - b).norm_squared() < r * r
}

/// Push an overlapping pair apart, half the overlap each
///
/// Returns false (and leaves both untouched) when they do not overlap.
/// Coincident centres are separated along +x.
pub fn collide(a: &mut Vec2, ra: f32, b: &mut Vec2, rb: f32) -> bool {
    if !is_colliding(a, ra, b, rb) {
        return false;
    }

    let axis = *a - *b;
    let distance = axis.norm();
    let n = if distance > f32::EPSILON {
        axis / distance
    } else {
        Vec2::x()
    };

    let delta = ra + rb - distance;
    *a += n * (0.5 * delta);
    *b -= n * (0.5 * delta);
    true
}

/// Worker-local copy of the bodies binned in a rectangle of cells
#[derive(Debug, Default)]
pub struct Patch {
    bodies: Vec<usize>,             // global body index per slot
    positions: Vec<Vec2>,           // working positions per slot
    radii: Vec<f32>,                // radius per slot
    slots: HashMap<usize, usize>,   // global body index -> slot
}

impl Patch {
    /// Copy every body binned in `area` out of the snapshot
    pub fn gather(area: CellBounds, hash: &SpatialHash, positions: &[Vec2], radii: &[f32]) -> Self {
        let mut patch = Self::default();
        for cell in area.cells() {
            for &i in hash.cell(cell) {
                patch.insert(i, positions[i], radii[i]);
            }
        }
        patch
    }

    fn insert(&mut self, body: usize, position: Vec2, radius: f32) {
        let slot = self.bodies.len();
        self.slots.insert(body, slot);
        self.bodies.push(body);
        self.positions.push(position);
        self.radii.push(radius);
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Working position of global body `body`, if gathered
    pub fn position(&self, body: usize) -> Option<Vec2> {
        self.slots.get(&body).map(|&s| self.positions[s])
    }

    /// Test and resolve one pair of global body indices
    fn resolve_pair(&mut self, i: usize, j: usize) -> bool {
        let (Some(&si), Some(&sj)) = (self.slots.get(&i), self.slots.get(&j)) else {
            return false;
        };
        if si == sj {
            return false;
        }

        let (ra, rb) = (self.radii[si], self.radii[sj]);
        let mut a = self.positions[si];
        let mut b = self.positions[sj];
        if collide(&mut a, ra, &mut b, rb) {
            self.positions[si] = a;
            self.positions[sj] = b;
            true
        } else {
            false
        }
    }

    /// Final positions as `(global index, position)`
    pub fn into_corrections(self) -> Vec<(usize, Vec2)> {
        self.bodies.into_iter().zip(self.positions).collect()
    }
}

/// Resolve every pair between `cell` and its neighbourhood
///
/// Same-cell pairs are visited once each (by position in the cell list);
/// cross-cell pairs follow `stencil`. Returns the number of corrections.
/// Bodies that were not gathered into `patch` are skipped.
pub fn resolve_cell_neighborhood(cell: CellKey, hash: &SpatialHash, patch: &mut Patch, stencil: Stencil) -> usize {
    let here = hash.cell(cell);
    if here.is_empty() {
        return 0;
    }

    let mut corrections = 0;

    for (k, &i) in here.iter().enumerate() {
        for &j in &here[k + 1..] {
            if patch.resolve_pair(i, j) {
                corrections += 1;
            }
        }
    }

    for &(dx, dy) in stencil.offsets() {
        let neighbour = hash.cell((cell.0.wrapping_add(dx), cell.1.wrapping_add(dy)));
        for &i in here {
            for &j in neighbour {
                if patch.resolve_pair(i, j) {
                    corrections += 1;
                }
            }
        }
    }

    corrections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colliding_is_strict() {
        let a = Vec2::new(0.0, 0.0);
        assert!(is_colliding(&a, 3.0, &Vec2::new(5.9, 0.0), 3.0));
        assert!(!is_colliding(&a, 3.0, &Vec2::new(6.0, 0.0), 3.0));
    }

    #[test]
    fn collide_splits_overlap_evenly() {
        let mut a = Vec2::new(0.0, 0.0);
        let mut b = Vec2::new(4.0, 0.0);
        let (a0, b0) = (a, b);

        assert!(collide(&mut a, 3.0, &mut b, 3.0));
        assert!(((a - b).norm() - 6.0).abs() < 1e-5);

        let moved = (a - a0).norm() + (b - b0).norm();
        assert!((moved - 2.0).abs() < 1e-5);
        assert!(((a - a0).norm() - (b - b0).norm()).abs() < 1e-6);
    }

    #[test]
    fn collide_ignores_separated_pair() {
        let mut a = Vec2::new(0.0, 0.0);
        let mut b = Vec2::new(10.0, 0.0);
        assert!(!collide(&mut a, 3.0, &mut b, 3.0));
        assert_eq!(a, Vec2::new(0.0, 0.0));
        assert_eq!(b, Vec2::new(10.0, 0.0));
    }

    #[test]
    fn coincident_centres_get_a_fallback_normal() {
        let mut a = Vec2::new(5.0, 5.0);
        let mut b = Vec2::new(5.0, 5.0);
        assert!(collide(&mut a, 2.0, &mut b, 2.0));
        assert!(a.x.is_finite() && a.y.is_finite());
        assert!(((a - b).norm() - 4.0).abs() < 1e-5);
    }

    fn patch_for(positions: &[Vec2], radii: &[f32], cell_size: f32) -> (SpatialHash, Patch) {
        let mut hash = SpatialHash::new(cell_size).unwrap();
        hash.build(positions);
        let area = hash.bounds().unwrap().grow(1);
        let patch = Patch::gather(area, &hash, positions, radii);
        (hash, patch)
    }

    #[test]
    fn full_stencil_resolves_neighbour_cells() {
        // straddles the cell border at x = 8
        let positions = [Vec2::new(6.0, 4.0), Vec2::new(10.0, 4.0)];
        let radii = [3.0, 3.0];
        let (hash, mut patch) = patch_for(&positions, &radii, 8.0);

        let n = resolve_cell_neighborhood((0, 0), &hash, &mut patch, Stencil::Full);
        assert_eq!(n, 1);

        let a = patch.position(0).unwrap();
        let b = patch.position(1).unwrap();
        assert!(((a - b).norm() - 6.0).abs() < 1e-5);
    }

    #[test]
    fn forward_stencil_from_right_cell_skips_left_neighbour() {
        let positions = [Vec2::new(6.0, 4.0), Vec2::new(10.0, 4.0)];
        let radii = [3.0, 3.0];
        let (hash, mut patch) = patch_for(&positions, &radii, 8.0);

        assert_eq!(resolve_cell_neighborhood((1, 0), &hash, &mut patch, Stencil::Forward), 0);
        assert_eq!(resolve_cell_neighborhood((0, 0), &hash, &mut patch, Stencil::Forward), 1);
    }

    #[test]
    fn forward_stencil_covers_every_neighbour_once() {
        let mut seen: Vec<CellKey> = Vec::new();
        for &(dx, dy) in &FORWARD {
            seen.push((dx, dy));
            seen.push((-dx, -dy));
        }
        seen.sort();
        let mut full = FULL.to_vec();
        full.sort();
        assert_eq!(seen, full);
    }

    #[test]
    fn into_corrections_reports_every_slot() {
        let positions = [Vec2::new(1.0, 1.0), Vec2::new(30.0, 30.0)];
        let radii = [1.0, 1.0];
        let (_, patch) = patch_for(&positions, &radii, 8.0);
        let mut out = patch.into_corrections();
        out.sort_by_key(|(i, _)| *i);
        assert_eq!(out, vec![(0, positions[0]), (1, positions[1])]);
    }
}
