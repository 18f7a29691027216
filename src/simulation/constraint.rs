//! Circular container constraint
//!
//! A hard position constraint: bodies outside the allowed circle are
//! projected back onto it. Applied once per substep, before collisions.

use super::states::{Body, Vec2};

#[derive(Debug, Clone, Copy)]
pub struct Container {
    pub center: Vec2,
    pub radius: f32,
}

impl Container {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Largest centre distance allowed for a body of `body_radius`
    #[inline]
    pub fn limit(&self, body_radius: f32) -> f32 {
        (self.radius - body_radius).max(0.0)
    }

    /// Project `body` back inside the container if it left it
    pub fn apply<C>(&self, body: &mut Body<C>) {
        let to_body = body.current_position - self.center;
        let distance = to_body.norm();
        let limit = self.limit(body.radius());

        // at the exact centre there is no direction to project along, and
        // the body is inside anyway unless it is larger than the container
        if distance > limit && distance > f32::EPSILON {
            let n = to_body / distance;
            body.current_position = self.center + n * limit;
        }
    }

    pub fn apply_all<C>(&self, bodies: &mut [Body<C>]) {
        for b in bodies.iter_mut() {
            self.apply(b);
        }
    }

    /// True if `body` is within the allowed circle plus `epsilon`
    pub fn contains<C>(&self, body: &Body<C>, epsilon: f32) -> bool {
        (body.current_position - self.center).norm() <= self.limit(body.radius()) + epsilon
    }
}
