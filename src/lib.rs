pub mod simulation;
pub mod configuration;
pub mod benchmark;

pub use simulation::states::{Body, Rgba, Vec2};
pub use simulation::params::{Parameters, SpeedLimit, Execution};
pub use simulation::error::{SimError, SimResult};
pub use simulation::forces::{Acceleration, AccelSet, UniformGravity};
pub use simulation::spatial_hash::{SpatialHash, CellKey, CellBounds};
pub use simulation::constraint::Container;
pub use simulation::collision::{collide, is_colliding, resolve_cell_neighborhood, Patch, Stencil};
pub use simulation::regions::{Region, RegionScheduler, PassStats};
pub use simulation::solver::{Solver, SolverStats};
pub use simulation::scenario::{Scenario, Emitter, DrawCircle};

pub use configuration::config::{ScenarioConfig, SolverConfig, EmitterConfig, BodyConfig};

pub use benchmark::benchmark::{bench_update, bench_update_curve};
