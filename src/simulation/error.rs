//! Construction-time errors for the solver
//!
//! Everything that can go wrong is caught when `Parameters`, `Body` or
//! `Solver` values are built. Once a solver exists, `update` cannot fail.

use thiserror::Error;

/// Result alias used across the simulation module
pub type SimResult<T> = Result<T, SimError>;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid body radius {0}: radius must be a finite value > 0")]
    InvalidRadius(f32),

    #[error("invalid cell size {0}: cell size must be a finite value > 0")]
    InvalidCellSize(f32),

    #[error("invalid substep count: at least one substep is required")]
    InvalidSubsteps,

    #[error("invalid container radius {0}: radius must be a finite value > 0")]
    InvalidContainerRadius(f32),

    #[error("invalid rehash interval: the spatial hash must be rebuilt at least every substep count >= 1")]
    InvalidRehashInterval,

    #[error("invalid region size {0}: regions must be at least 2 cells wide so same-wave halos stay disjoint")]
    InvalidRegionSize(i32),

    #[error("invalid max speed {0}: speed cap must be a finite value > 0")]
    InvalidMaxSpeed(f32),

    #[error("invalid {field}: value must be finite, got ({x}, {y})")]
    NonFiniteVector { field: &'static str, x: f32, y: f32 },

    #[error("invalid worker thread count: a dedicated pool needs at least one thread")]
    InvalidWorkerThreads,

    #[error("invalid emitter interval: emitters must fire every >= 1 ticks")]
    InvalidEmitterInterval,

    #[error("invalid time step {0}: dt must be a finite value > 0")]
    InvalidTimeStep(f32),

    #[error("failed to build collision thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
