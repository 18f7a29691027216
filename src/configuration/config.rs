//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! scenario. A scenario consists of:
//!
//! - [`SolverConfig`]   – solver parameters; every field is optional
//! - [`EmitterConfig`]  – a spawner that adds one body every few ticks
//! - [`BodyConfig`]     – a body present from the first tick
//! - [`ScenarioConfig`] – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! ```yaml
//! solver:
//!   gravity: [0.0, 1000.0]
//!   substeps: 8
//!   container_center: [400.0, 300.0]
//!   container_radius: 300.0
//!   cell_size: 8.0
//!   rehash_interval: 3
//!   region_cells: 8
//!   max_speed: 4.0
//!   speed_limit: "reuse_previous"   # or "clamp"
//!   execution: "parallel"           # or "sequential"
//!   worker_threads: 4               # omit for the global rayon pool
//!
//! dt: 0.0166
//! ticks: 600
//! cull_bounds: [0.0, 0.0, 800.0, 600.0]
//! max_bodies: 3000
//!
//! emitters:
//!   - position: [300.0, 150.0]
//!     velocity: [1.0, -0.5]
//!     radius: 3.0
//!     color: { r: 40, g: 200, b: 230, a: 255 }
//!     interval: 4
//!
//! bodies:
//!   - x: [400.0, 100.0]
//!     v: [0.5, 0.0]
//!     radius: 3.0
//! ```
//!
//! `Scenario::build_scenario` maps this into runtime `Parameters`, `Body`
//! and `Emitter` values and validates them.

use serde::Deserialize;

use crate::simulation::params::{Execution, Parameters, SpeedLimit};
use crate::simulation::states::{Rgba, Vec2};

#[derive(Deserialize, Debug, Clone, Copy)]
pub enum SpeedLimitConfig {
    #[serde(rename = "reuse_previous")] // apply the previous step's velocity
    ReusePrevious,

    #[serde(rename = "clamp")] // shorten the velocity to the cap
    Clamp,
}

#[derive(Deserialize, Debug, Clone, Copy)]
pub enum ExecutionConfig {
    #[serde(rename = "parallel")] // regions of a wave on rayon workers
    Parallel,

    #[serde(rename = "sequential")] // same regions on the calling thread
    Sequential,
}

/// Solver parameters; missing fields take the `Parameters` defaults
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct SolverConfig {
    pub gravity: Option<[f32; 2]>,          // constant acceleration
    pub substeps: Option<u32>,              // substeps per tick
    pub container_center: Option<[f32; 2]>, // arena centre
    pub container_radius: Option<f32>,      // arena radius
    pub cell_size: Option<f32>,             // >= largest body diameter
    pub rehash_interval: Option<u32>,       // rebuild hash every k substeps
    pub region_cells: Option<i32>,          // scheduler region side, >= 2
    pub max_speed: Option<f32>,             // velocity cap per step
    pub speed_limit: Option<SpeedLimitConfig>,
    pub execution: Option<ExecutionConfig>,
    pub worker_threads: Option<usize>,      // dedicated pool size
}

impl SolverConfig {
    /// Overlay the configured fields on the defaults
    pub fn to_parameters(&self) -> Parameters {
        let d = Parameters::default();
        Parameters {
            gravity: self.gravity.map(vec2).unwrap_or(d.gravity),
            substeps: self.substeps.unwrap_or(d.substeps),
            container_center: self.container_center.map(vec2).unwrap_or(d.container_center),
            container_radius: self.container_radius.unwrap_or(d.container_radius),
            cell_size: self.cell_size.unwrap_or(d.cell_size),
            rehash_interval: self.rehash_interval.unwrap_or(d.rehash_interval),
            region_cells: self.region_cells.unwrap_or(d.region_cells),
            max_speed: self.max_speed.unwrap_or(d.max_speed),
            speed_limit: match self.speed_limit {
                Some(SpeedLimitConfig::ReusePrevious) => SpeedLimit::ReusePrevious,
                Some(SpeedLimitConfig::Clamp) => SpeedLimit::Clamp,
                None => d.speed_limit,
            },
            execution: match self.execution {
                Some(ExecutionConfig::Parallel) => Execution::Parallel,
                Some(ExecutionConfig::Sequential) => Execution::Sequential,
                None => d.execution,
            },
            worker_threads: self.worker_threads.or(d.worker_threads),
        }
    }
}

/// A spawner: one new body every `interval` ticks
#[derive(Deserialize, Debug, Clone)]
pub struct EmitterConfig {
    pub position: [f32; 2], // spawn point
    pub velocity: [f32; 2], // initial per-step displacement
    pub radius: f32,        // radius of spawned bodies
    #[serde(default = "default_color")]
    pub color: Rgba,
    #[serde(default = "default_interval")]
    pub interval: u32,      // ticks between spawns
}

/// Initial state of a single body
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    pub x: [f32; 2], // initial position
    #[serde(default)]
    pub v: [f32; 2], // initial per-step displacement
    pub radius: f32, // radius, > 0
    #[serde(default = "default_color")]
    pub color: Rgba,
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub solver: SolverConfig,             // solver parameters
    #[serde(default = "default_dt")]
    pub dt: f32,                          // time per tick
    #[serde(default = "default_ticks")]
    pub ticks: u64,                       // ticks the binary runs
    #[serde(default)]
    pub cull_bounds: Option<[f32; 4]>,    // [min_x, min_y, max_x, max_y]; bodies drawn outside are removed
    #[serde(default)]
    pub max_bodies: Option<usize>,        // emitters stop at this population
    #[serde(default)]
    pub emitters: Vec<EmitterConfig>,
    #[serde(default)]
    pub bodies: Vec<BodyConfig>,
}

pub fn vec2(v: [f32; 2]) -> Vec2 {
    Vec2::new(v[0], v[1])
}

fn default_color() -> Rgba {
    Rgba::new(255, 255, 255, 255)
}

fn default_interval() -> u32 {
    4
}

fn default_dt() -> f32 {
    0.0166
}

fn default_ticks() -> u64 {
    600
}
