//! Build runnable, headless simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a `Scenario`
//! containing:
//! - the solver (`Solver`) built from validated `Parameters`
//! - the body set (`Vec<Body<Rgba>>`), owned here, not by the solver
//! - emitters that add bodies every few ticks
//! - optional cull bounds that remove bodies drawn outside them
//!
//! A scenario plays the caller's role around the solver: it adds and
//! removes bodies between ticks and reads the render extract afterwards.

use log::debug;

use crate::configuration::config::{vec2, BodyConfig, EmitterConfig, ScenarioConfig};
use crate::simulation::error::{SimError, SimResult};
use crate::simulation::solver::Solver;
use crate::simulation::states::{Body, Rgba, Vec2};

/// Spawns one body every `interval` ticks
#[derive(Debug, Clone)]
pub struct Emitter {
    pub position: Vec2,
    pub velocity: Vec2, // initial per-step displacement of spawned bodies
    pub radius: f32,
    pub color: Rgba,
    pub interval: u32,
}

impl Emitter {
    fn from_config(ec: &EmitterConfig) -> SimResult<Self> {
        if ec.interval == 0 {
            return Err(SimError::InvalidEmitterInterval);
        }
        if !(ec.radius.is_finite() && ec.radius > 0.0) {
            return Err(SimError::InvalidRadius(ec.radius));
        }
        Ok(Self {
            position: vec2(ec.position),
            velocity: vec2(ec.velocity),
            radius: ec.radius,
            color: ec.color,
            interval: ec.interval,
        })
    }

    /// A new body if this emitter fires on `tick`
    pub fn emit(&self, tick: u64) -> SimResult<Option<Body<Rgba>>> {
        if tick % self.interval as u64 != 0 {
            return Ok(None);
        }
        Body::new(self.position, self.velocity, self.radius, self.color).map(Some)
    }
}

/// What the renderer needs to draw one body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCircle {
    pub x: i32,
    pub y: i32,
    pub radius: f32,
    pub color: Rgba,
}

pub struct Scenario {
    pub solver: Solver,
    pub bodies: Vec<Body<Rgba>>,
    pub emitters: Vec<Emitter>,
    pub dt: f32,                       // time per tick
    pub ticks: u64,                    // ticks to run from the binary
    pub cull_bounds: Option<[f32; 4]>, // [min_x, min_y, max_x, max_y]
    pub max_bodies: Option<usize>,
    tick: u64,
    spawned: usize,
    culled: usize,
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> SimResult<Self> {
        if !(cfg.dt.is_finite() && cfg.dt > 0.0) {
            return Err(SimError::InvalidTimeStep(cfg.dt));
        }

        // Solver from the overlaid parameters
        let solver = Solver::new(cfg.solver.to_parameters())?;

        // Bodies: map `BodyConfig` -> runtime `Body`
        let bodies = cfg
            .bodies
            .iter()
            .map(|bc: &BodyConfig| Body::new(vec2(bc.x), vec2(bc.v), bc.radius, bc.color))
            .collect::<SimResult<Vec<_>>>()?;

        let emitters = cfg
            .emitters
            .iter()
            .map(Emitter::from_config)
            .collect::<SimResult<Vec<_>>>()?;

        debug!(
            "scenario: {} bodies, {} emitters, dt {}, {} ticks",
            bodies.len(),
            emitters.len(),
            cfg.dt,
            cfg.ticks
        );

        Ok(Self {
            solver,
            bodies,
            emitters,
            dt: cfg.dt,
            ticks: cfg.ticks,
            cull_bounds: cfg.cull_bounds,
            max_bodies: cfg.max_bodies,
            tick: 0,
            spawned: 0,
            culled: 0,
        })
    }

    /// Ticks run so far
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Bodies spawned by emitters so far
    pub fn spawned(&self) -> usize {
        self.spawned
    }

    /// Bodies removed by culling so far
    pub fn culled(&self) -> usize {
        self.culled
    }

    /// One tick: spawn, solve, cull
    pub fn step(&mut self) -> SimResult<()> {
        self.tick += 1;
        self.spawn()?;
        self.solver.update(&mut self.bodies, self.dt);
        self.cull();
        Ok(())
    }

    pub fn run(&mut self, ticks: u64) -> SimResult<()> {
        for _ in 0..ticks {
            self.step()?;
        }
        Ok(())
    }

    fn spawn(&mut self) -> SimResult<()> {
        for emitter in &self.emitters {
            if self.max_bodies.is_some_and(|max| self.bodies.len() >= max) {
                break;
            }
            if let Some(body) = emitter.emit(self.tick)? {
                self.bodies.push(body);
                self.spawned += 1;
            }
        }
        Ok(())
    }

    fn cull(&mut self) {
        let Some([x0, y0, x1, y1]) = self.cull_bounds else {
            return;
        };

        let before = self.bodies.len();
        self.bodies.retain(|b| {
            let (x, y) = b.draw_position();
            (x as f32) >= x0 && (x as f32) <= x1 && (y as f32) >= y0 && (y as f32) <= y1
        });

        let removed = before - self.bodies.len();
        if removed > 0 {
            debug!("tick {}: culled {} bodies", self.tick, removed);
            self.culled += removed;
        }
    }

    /// Integer-rounded position, radius and colour of every body
    pub fn render_frame(&self) -> Vec<DrawCircle> {
        self.bodies
            .iter()
            .map(|b| {
                let (x, y) = b.draw_position();
                DrawCircle {
                    x,
                    y,
                    radius: b.radius(),
                    color: *b.payload(),
                }
            })
            .collect()
    }
}
