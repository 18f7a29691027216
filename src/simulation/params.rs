//! Numerical and physical parameters for the solver
//!
//! `Parameters` holds the construction-time settings:
//! - gravity, substep count and speed cap for integration,
//! - container centre and radius for the boundary constraint,
//! - cell size and rebuild cadence for the spatial hash,
//! - region size, execution mode and pool size for the collision pass
//!
//! Values are checked once by [`Parameters::validate`] when a `Solver` is
//! built; they cannot be changed on a live solver.

use super::error::{SimError, SimResult};
use super::states::Vec2;

/// What `Body::update_position` does when the implicit velocity exceeds the cap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpeedLimit {
    /// Apply the velocity of the previous integration step instead
    #[default]
    ReusePrevious,
    /// Keep the direction, shorten to the cap
    Clamp,
}

/// How the region scheduler runs the regions of one wave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Execution {
    /// Regions of a wave run concurrently on rayon workers
    #[default]
    Parallel,
    /// Same regions, same order, on the calling thread
    Sequential,
}

#[derive(Debug, Clone)]
pub struct Parameters {
    pub gravity: Vec2,               // constant acceleration applied every substep
    pub substeps: u32,               // integration substeps per update
    pub container_center: Vec2,      // centre of the circular arena
    pub container_radius: f32,       // radius of the circular arena
    pub cell_size: f32,              // spatial hash cell side, >= largest diameter
    pub rehash_interval: u32,        // rebuild the hash every k substeps
    pub region_cells: i32,           // side of a scheduler region in cells
    pub max_speed: f32,              // velocity cap per integration step
    pub speed_limit: SpeedLimit,     // policy when the cap is exceeded
    pub execution: Execution,        // parallel or sequential collision pass
    pub worker_threads: Option<usize>, // dedicated pool size, None = global rayon pool
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, 1000.0),
            substeps: 8,
            container_center: Vec2::new(400.0, 300.0),
            container_radius: 300.0,
            cell_size: 8.0,
            rehash_interval: 3,
            region_cells: 8,
            max_speed: 4.0,
            speed_limit: SpeedLimit::ReusePrevious,
            execution: Execution::Parallel,
            worker_threads: None,
        }
    }
}

impl Parameters {
    /// Reject configurations the solver cannot run with
    pub fn validate(&self) -> SimResult<()> {
        check_finite("gravity", &self.gravity)?;
        check_finite("container center", &self.container_center)?;

        if self.substeps == 0 {
            return Err(SimError::InvalidSubsteps);
        }
        if !(self.container_radius.is_finite() && self.container_radius > 0.0) {
            return Err(SimError::InvalidContainerRadius(self.container_radius));
        }
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(SimError::InvalidCellSize(self.cell_size));
        }
        if self.rehash_interval == 0 {
            return Err(SimError::InvalidRehashInterval);
        }
        if self.region_cells < 2 {
            return Err(SimError::InvalidRegionSize(self.region_cells));
        }
        if !(self.max_speed.is_finite() && self.max_speed > 0.0) {
            return Err(SimError::InvalidMaxSpeed(self.max_speed));
        }
        if self.worker_threads == Some(0) {
            return Err(SimError::InvalidWorkerThreads);
        }
        Ok(())
    }
}

fn check_finite(field: &'static str, v: &Vec2) -> SimResult<()> {
    if v.x.is_finite() && v.y.is_finite() {
        Ok(())
    } else {
        Err(SimError::NonFiniteVector { field, x: v.x, y: v.y })
    }
}
