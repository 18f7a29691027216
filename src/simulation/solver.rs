//! Substep orchestration
//!
//! One `update` call advances the caller's bodies by `dt`, split into
//! `substeps` equal substeps. Each substep runs, in this order:
//! 1. spatial hash rebuild (substep 0, then every `rehash_interval`)
//! 2. forces (gravity) on every body
//! 3. container constraint on every body
//! 4. region-parallel collision pass, joined before going on
//! 5. position Verlet integration of every body
//!
//! The phases are sequential, so gravity and the constraint are done for all
//! bodies before any collision is checked, and no body is integrated while a
//! collision worker is still running.

use log::{debug, trace, warn};

use super::constraint::Container;
use super::error::SimResult;
use super::forces::{AccelSet, Acceleration, UniformGravity};
use super::params::{Execution, Parameters};
use super::regions::RegionScheduler;
use super::spatial_hash::SpatialHash;
use super::states::{Body, Vec2};

/// Counters from the most recent `update`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolverStats {
    pub bodies: usize,
    pub substeps: u32,
    pub rebuilds: u32,
    pub regions: usize,     // regions resolved, summed over substeps
    pub waves: usize,       // non-empty waves run, summed over substeps
    pub corrections: usize, // pair corrections, summed over substeps
}

pub struct Solver {
    params: Parameters,
    forces: AccelSet,
    container: Container,
    hash: SpatialHash,
    scheduler: RegionScheduler,
    pool: Option<rayon::ThreadPool>,
    positions: Vec<Vec2>, // per-substep position snapshot for the collision pass
    radii: Vec<f32>,
    stats: SolverStats,
    warned_cell_size: bool,
}

impl Solver {
    /// Validate `params` and set up hash, scheduler and worker pool
    pub fn new(params: Parameters) -> SimResult<Self> {
        params.validate()?;

        let pool = match params.worker_threads {
            Some(n) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .thread_name(|i| format!("vsim-collide-{i}"))
                    .build()?,
            ),
            None => None,
        };

        debug!(
            "solver: {} substeps, cell size {}, regions of {} cells, {:?} on {} workers",
            params.substeps,
            params.cell_size,
            params.region_cells,
            params.execution,
            pool.as_ref().map_or_else(rayon::current_num_threads, |p| p.current_num_threads()),
        );

        Ok(Self {
            forces: AccelSet::new().with(UniformGravity { g: params.gravity }),
            container: Container::new(params.container_center, params.container_radius),
            hash: SpatialHash::new(params.cell_size)?,
            scheduler: RegionScheduler::new(params.region_cells)?,
            pool,
            positions: Vec::new(),
            radii: Vec::new(),
            stats: SolverStats::default(),
            warned_cell_size: false,
            params,
        })
    }

    /// Register an extra acceleration term next to gravity
    pub fn add_force<T>(&mut self, term: T)
    where
        T: Acceleration + Send + Sync + 'static,
    {
        let forces = std::mem::take(&mut self.forces);
        self.forces = forces.with(term);
    }

    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn stats(&self) -> SolverStats {
        self.stats
    }

    /// Hash as of the last rebuild
    pub fn spatial_hash(&self) -> &SpatialHash {
        &self.hash
    }

    /// Advance every body by `dt`
    ///
    /// The collection may be empty and may change size between calls; the
    /// solver keeps no per-body state of its own across calls.
    pub fn update<C>(&mut self, bodies: &mut [Body<C>], dt: f32) {
        debug_assert!(dt.is_finite(), "non-finite dt {dt}");

        let substeps = self.params.substeps;
        let sub_dt = dt / substeps as f32;

        self.stats = SolverStats {
            bodies: bodies.len(),
            ..Default::default()
        };
        self.radii.clear();
        self.radii.extend(bodies.iter().map(|b| b.radius()));
        self.check_cell_size();

        for substep in 0..substeps {
            if substep % self.params.rehash_interval == 0 {
                self.rebuild(bodies);
            }

            self.forces.apply(bodies);
            self.container.apply_all(bodies);
            self.collide(bodies);

            for b in bodies.iter_mut() {
                b.update_position(sub_dt, self.params.max_speed, self.params.speed_limit);
            }
            self.stats.substeps += 1;
        }

        trace!("solver update: {:?}", self.stats);
    }

    fn rebuild<C>(&mut self, bodies: &[Body<C>]) {
        self.hash.build(bodies.iter().map(|b| &b.current_position));
        self.scheduler.plan(&self.hash);
        self.stats.rebuilds += 1;
    }

    /// Collision pass over the current hash; returns after every worker joined
    fn collide<C>(&mut self, bodies: &mut [Body<C>]) {
        self.positions.clear();
        self.positions.extend(bodies.iter().map(|b| b.current_position));

        let execution = self.params.execution;
        let Self { scheduler, hash, positions, radii, pool, .. } = self;

        let pass = match (pool.as_ref(), execution) {
            (Some(pool), Execution::Parallel) => {
                pool.install(|| scheduler.resolve(hash, positions, radii, execution))
            }
            _ => scheduler.resolve(hash, positions, radii, execution),
        };

        for (b, p) in bodies.iter_mut().zip(self.positions.iter()) {
            b.current_position = *p;
        }

        self.stats.regions += pass.regions;
        self.stats.waves += pass.waves;
        self.stats.corrections += pass.corrections;
    }

    fn check_cell_size(&mut self) {
        if self.warned_cell_size {
            return;
        }
        let largest = self.radii.iter().copied().fold(0.0_f32, f32::max);
        if 2.0 * largest > self.params.cell_size {
            warn!(
                "body diameter {} exceeds cell size {}; some collisions will be missed",
                2.0 * largest,
                self.params.cell_size
            );
            self.warned_cell_size = true;
        }
    }
}
