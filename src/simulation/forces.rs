//! Force / acceleration contributors for the solver
//!
//! Each term implements [`Acceleration`]; an [`AccelSet`] sums every term
//! into `Body::accelerate` once per substep. The solver registers
//! [`UniformGravity`] from `Parameters::gravity`.

use crate::simulation::states::{Body, Vec2};

/// Collection of acceleration terms (gravity, attractors, etc.)
pub struct AccelSet {
    terms: Vec<Box<dyn Acceleration + Send + Sync>>,
}

impl AccelSet {
    /// Create an empty acceleration set
    pub fn new() -> Self {
        Self {
            terms: Vec::new()
        }
    }

    /// Add an acceleration term
    pub fn with<T>(mut self, term: T) -> Self
    where
        T: Acceleration + Send + Sync + 'static,
    {
        self.terms.push(Box::new(term));
        self
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Sum of all terms at `position`
    pub fn total_at(&self, position: &Vec2) -> Vec2 {
        self.terms
            .iter()
            .fold(Vec2::zeros(), |acc, term| acc + term.acceleration(position))
    }

    /// Accumulate every term into every body
    pub fn apply<C>(&self, bodies: &mut [Body<C>]) {
        if self.terms.is_empty() {
            return;
        }
        for b in bodies.iter_mut() {
            let a = self.total_at(&b.current_position);
            b.accelerate(a);
        }
    }
}

impl Default for AccelSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait for acceleration sources
/// Implementations return their contribution at a position
pub trait Acceleration {
    fn acceleration(&self, position: &Vec2) -> Vec2;
}

/// Constant acceleration, independent of position
pub struct UniformGravity {
    pub g: Vec2,
}

impl Acceleration for UniformGravity {
    fn acceleration(&self, _position: &Vec2) -> Vec2 {
        self.g
    }
}
