//! Core state types for the circle simulation.
//!
//! Defines the per-particle state used by the solver:
//! - `Vec2`  2D float vector (nalgebra)
//! - `Body`  position history, acceleration, radius and an opaque payload
//! - `Rgba`  the colour payload used by scenarios and the render extract
//!
//! Velocity is implicit: it is the displacement between `current_position`
//! and `previous_position` (position Verlet).

use nalgebra::Vector2;
use serde::Deserialize;

use super::error::{SimError, SimResult};
use super::params::SpeedLimit;

pub type Vec2 = Vector2<f32>;

/// A single circular body
///
/// `C` is the caller's payload (colour, id, ...). The solver carries it
/// through untouched.
#[derive(Debug, Clone)]
pub struct Body<C> {
    pub current_position: Vec2,  // position at the current step
    pub previous_position: Vec2, // position at the previous step
    pub acceleration: Vec2,      // accumulated for the current substep
    velocity: Vec2,              // velocity applied by the last integration
    radius: f32,                 // immutable after construction
    payload: C,
}

impl<C> Body<C> {
    /// Create a body at `position` moving by `initial_velocity` per step
    ///
    /// The velocity is encoded as position history:
    /// `previous_position = position - initial_velocity`.
    pub fn new(position: Vec2, initial_velocity: Vec2, radius: f32, payload: C) -> SimResult<Self> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(SimError::InvalidRadius(radius));
        }

        Ok(Self {
            current_position: position,
            previous_position: position - initial_velocity,
            acceleration: Vec2::zeros(),
            velocity: Vec2::zeros(),
            radius,
            payload,
        })
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Velocity used by the most recent `update_position` call
    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    #[inline]
    pub fn payload(&self) -> &C {
        &self.payload
    }

    #[inline]
    pub fn payload_mut(&mut self) -> &mut C {
        &mut self.payload
    }

    /// Integer-rounded position for drawing
    pub fn draw_position(&self) -> (i32, i32) {
        (
            self.current_position.x.round() as i32,
            self.current_position.y.round() as i32,
        )
    }

    /// Add `force` to the acceleration of the current substep
    #[inline]
    pub fn accelerate(&mut self, force: Vec2) {
        self.acceleration += force;
    }

    /// Advance one substep of position Verlet
    ///
    /// x_n+1 = x_n + (x_n - x_n-1) + a * dt^2
    ///
    /// When the implicit velocity is longer than `max_speed` the
    /// `speed_limit` policy decides what is applied instead. Acceleration
    /// is zero afterwards.
    pub fn update_position(&mut self, dt: f32, max_speed: f32, speed_limit: SpeedLimit) {
        let mut velocity = self.current_position - self.previous_position;

        if velocity.norm() > max_speed {
            velocity = match speed_limit {
                SpeedLimit::ReusePrevious => self.velocity,
                SpeedLimit::Clamp => velocity.normalize() * max_speed,
            };
        }
        self.velocity = velocity;

        self.previous_position = self.current_position;
        self.current_position += velocity + self.acceleration * dt * dt;

        self.acceleration = Vec2::zeros();
    }

    /// True if this body overlaps `other`
    pub fn is_colliding<D>(&self, other: &Body<D>) -> bool {
        super::collision::is_colliding(
            &self.current_position,
            self.radius,
            &other.current_position,
            other.radius,
        )
    }
}

/// 8-bit RGBA colour carried as a body payload
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}
