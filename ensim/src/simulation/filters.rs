//! Loss filters: predicates that take a particle out of the dynamics
//!
//! A filter returning `true` flags the particle as lost for this step; the
//! accelerator then winds it down and deactivates it. Like force laws,
//! filters are evaluated concurrently across particles.

use crate::simulation::ensemble::Particle;
use crate::simulation::states::Axis;

pub trait LossFilter {
    fn is_lost(&self, p: &Particle<'_>, t: f64) -> bool;
}

impl<F> LossFilter for F
where
    F: Fn(&Particle<'_>, f64) -> bool,
{
    fn is_lost(&self, p: &Particle<'_>, t: f64) -> bool {
        self(p, t)
    }
}

/// Ordered list of filters; a particle is lost if any of them says so
#[derive(Default)]
pub struct FilterSet {
    filters: Vec<Box<dyn LossFilter + Send + Sync>>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    pub fn with<T>(mut self, filter: T) -> Self
    where
        T: LossFilter + Send + Sync + 'static,
    {
        self.push(filter);
        self
    }

    pub fn push<T>(&mut self, filter: T)
    where
        T: LossFilter + Send + Sync + 'static,
    {
        self.filters.push(Box::new(filter));
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Registration order, stopping at the first match
    pub fn any(&self, p: &Particle<'_>, t: f64) -> bool {
        self.filters.iter().any(|f| f.is_lost(p, t))
    }
}

/// Lost once coordinate `axis` passes `limit`, from time `after` onwards
pub struct PlaneBarrier {
    pub axis: Axis,
    pub limit: f64,
    pub after: f64,
}

impl LossFilter for PlaneBarrier {
    fn is_lost(&self, p: &Particle<'_>, t: f64) -> bool {
        t > self.after && p.position()[self.axis.index()] > self.limit
    }
}

/// Lost once the particle leaves a sphere of `radius` about the origin
pub struct SphericalBoundary {
    pub radius: f64,
}

impl LossFilter for SphericalBoundary {
    fn is_lost(&self, p: &Particle<'_>, _t: f64) -> bool {
        p.position().norm_squared() > self.radius * self.radius
    }
}

/// Loses one particle by index once `t > after`
pub struct IndexAfterTime {
    pub index: usize,
    pub after: f64,
}

impl LossFilter for IndexAfterTime {
    fn is_lost(&self, p: &Particle<'_>, t: f64) -> bool {
        p.index() == self.index && t > self.after
    }
}
