//! Force contributors for the ensemble engine
//!
//! A force law maps one particle (and the time) to a force vector. The
//! accelerator sums every registered law per particle and divides by the
//! particle's mass. Laws run concurrently on many particles, so they must be
//! `Send + Sync` and must not rely on evaluation order.

use crate::simulation::ensemble::Particle;
use crate::simulation::states::{Force, NVec3};

/// Trait for force sources acting on a single particle
/// Any `Fn(&Particle, f64) -> Force` closure is a force law
pub trait ForceLaw {
    fn force(&self, p: &Particle<'_>, t: f64) -> Force;
}

impl<F> ForceLaw for F
where
    F: Fn(&Particle<'_>, f64) -> Force,
{
    fn force(&self, p: &Particle<'_>, t: f64) -> Force {
        self(p, t)
    }
}

/// Collection of force terms (gravity, damping, traps, ...)
/// Each term implements [`ForceLaw`] and their contributions are summed
/// into a single force vector per particle
#[derive(Default)]
pub struct ForceSet {
    terms: Vec<Box<dyn ForceLaw + Send + Sync>>,
}

impl ForceSet {
    /// Create an empty force set
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    /// Add a force term
    pub fn with<T>(mut self, term: T) -> Self
    where
        T: ForceLaw + Send + Sync + 'static,
    {
        self.push(term);
        self
    }

    pub fn push<T>(&mut self, term: T)
    where
        T: ForceLaw + Send + Sync + 'static,
    {
        self.terms.push(Box::new(term));
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Vector sum of every term on `p` at time `t`
    pub fn total(&self, p: &Particle<'_>, t: f64) -> Force {
        self.terms
            .iter()
            .fold(Force::zeros(), |acc, term| acc + term.force(p, t))
    }
}

/// Uniform gravitational field: F = m g
pub struct UniformGravity {
    pub g: NVec3, // field, m/s^2
}

impl UniformGravity {
    /// Standard gravity along -y
    pub fn earth() -> Self {
        Self {
            g: NVec3::new(0.0, -9.80665, 0.0),
        }
    }
}

impl ForceLaw for UniformGravity {
    fn force(&self, p: &Particle<'_>, _t: f64) -> Force {
        p.mass() * self.g
    }
}

/// Velocity-proportional drag: F = -c v
pub struct LinearDamping {
    pub coefficient: f64,
}

impl ForceLaw for LinearDamping {
    fn force(&self, p: &Particle<'_>, _t: f64) -> Force {
        -self.coefficient * p.velocity()
    }
}

/// Isotropic harmonic trap: F = -k (x - center)
pub struct HarmonicTrap {
    pub k: f64,
    pub center: NVec3,
}

impl ForceLaw for HarmonicTrap {
    fn force(&self, p: &Particle<'_>, _t: f64) -> Force {
        -self.k * (p.position() - self.center)
    }
}
