//! The accelerator: per-step force evaluation, loss filtering and deactivation
//!
//! For each active particle, in parallel:
//! - if any filter flags it for the first time, its velocity and
//!   acceleration are zeroed and it is marked pending; it stays active
//! - if a filter flags it while pending and its previous acceleration is
//!   exactly zero, it is deactivated
//! - otherwise its acceleration is the sum of all force laws over its mass,
//!   and any pending mark is cleared
//!
//! Inactive particles are not touched at all. A lost particle therefore
//! spends exactly one step at rest, whatever the forces on it, and stays
//! where it was flagged.
//!
//! Each particle's slice of `x`, `v`, `a` and its flags are touched by one
//! worker only; the number of deactivations is summed after the parallel
//! region and subtracted from the active count once.

use log::{debug, trace};
use rayon::prelude::*;

use crate::error::RegistrationError;
use crate::simulation::ensemble::{Particle, Roster};
use crate::simulation::filters::{FilterSet, LossFilter};
use crate::simulation::forces::{ForceLaw, ForceSet};
use crate::simulation::integrator::SecondOrderSystem;
use crate::simulation::states::DIMS;

#[derive(Default)]
pub struct Accelerator {
    forces: ForceSet,
    filters: FilterSet,
    sealed: bool,
}

impl Accelerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_force<T>(&mut self, force: T) -> Result<(), RegistrationError>
    where
        T: ForceLaw + Send + Sync + 'static,
    {
        if self.sealed {
            return Err(RegistrationError::Sealed { what: "force" });
        }
        self.forces.push(force);
        Ok(())
    }

    pub fn add_filter<T>(&mut self, filter: T) -> Result<(), RegistrationError>
    where
        T: LossFilter + Send + Sync + 'static,
    {
        if self.sealed {
            return Err(RegistrationError::Sealed { what: "filter" });
        }
        self.filters.push(filter);
        Ok(())
    }

    /// Freeze the force and filter lists
    pub fn seal(&mut self) {
        if !self.sealed {
            debug!(
                "accelerator sealed with {} forces and {} filters",
                self.forces.len(),
                self.filters.len()
            );
        }
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn forces(&self) -> &ForceSet {
        &self.forces
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    /// Attach to an ensemble's bookkeeping for use as a stepper callback
    pub fn bind<'a>(&'a self, roster: Roster<'a>) -> AcceleratorCall<'a> {
        AcceleratorCall {
            accelerator: self,
            roster,
            deactivated: 0,
        }
    }

    /// One pass over every particle. Returns how many were deactivated.
    pub fn evaluate(
        &self,
        x: &[f64],
        v: &mut [f64],
        a: &mut [f64],
        roster: &mut Roster<'_>,
        t: f64,
    ) -> usize {
        debug_assert_eq!(x.len(), DIMS * roster.population());
        debug_assert_eq!(v.len(), x.len());
        debug_assert_eq!(a.len(), x.len());

        let species = roster.species;
        let deactivated: usize = a
            .par_chunks_mut(DIMS)
            .zip(v.par_chunks_mut(DIMS))
            .zip(x.par_chunks(DIMS))
            .zip(roster.active.par_iter_mut())
            .zip(roster.pending.par_iter_mut())
            .zip(species.par_iter())
            .enumerate()
            .map(|(i, (((((a, v), x), active), pending), &species))| {
                if !*active {
                    return 0;
                }

                let lost = self.filters.any(&Particle::new(i, x, v, species, true), t);
                if lost {
                    v.fill(0.0);
                    if *pending && a.iter().all(|&c| c == 0.0) {
                        *active = false;
                        *pending = false;
                        trace!("particle {i} lost at ({}, {}, {}), t = {t}", x[0], x[1], x[2]);
                        return 1;
                    }
                    a.fill(0.0);
                    *pending = true;
                    return 0;
                }
                *pending = false;

                let p = Particle::new(i, x, v, species, true);
                let accel = self.forces.total(&p, t) / p.mass();
                a.copy_from_slice(accel.as_slice());
                0
            })
            .sum();

        *roster.active_count -= deactivated;
        deactivated
    }
}

/// An [`Accelerator`] bound to one ensemble's bookkeeping, usable as the
/// stepper's system function
pub struct AcceleratorCall<'a> {
    accelerator: &'a Accelerator,
    roster: Roster<'a>,
    deactivated: usize,
}

impl AcceleratorCall<'_> {
    /// Particles deactivated by this binding so far
    pub fn deactivated(&self) -> usize {
        self.deactivated
    }

    pub fn active_population(&self) -> usize {
        self.roster.active_population()
    }
}

impl SecondOrderSystem for AcceleratorCall<'_> {
    fn accelerations(&mut self, x: &[f64], v: &mut [f64], a: &mut [f64], t: f64) {
        self.deactivated += self.accelerator.evaluate(x, v, a, &mut self.roster, t);
    }
}
