//! Phase-space storage for every particle in a run
//!
//! Positions and velocities are flat `Vec<f64>`s in particle-major order
//! (`x0,y0,z0,x1,y1,z1,...`), so particle `i` always owns
//! `[3i, 3i+3)`. Particles are only ever appended; loss flips the `active`
//! flag and never moves storage, so an index is a stable handle for the whole
//! run.
//!
//! Growth draws each of the six phase-space coordinates from its own random
//! stream in parallel, pins the first new particle to the distribution modes,
//! and transposes the dimension-major scratch buffer into the interleaved
//! layout.

use std::ops::Range;

use log::{debug, error, info, trace, warn};
use rayon::prelude::*;
use serde::Deserialize;

use crate::error::{EnsembleError, SinkError};
use crate::simulation::distribution::{Distribution, DistributionPair, PeakConvention};
use crate::simulation::random::{RandomStream, StreamAllocator};
use crate::simulation::snapshot::{PhaseSpaceRecord, SnapshotSink};
use crate::simulation::states::{vec3, NVec3, Species, DIMS};

/// What to do when the sampler rejects a request while growing the ensemble
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SamplerPolicy {
    /// log a warning and keep whatever the buffer holds
    #[default]
    #[serde(rename = "warn")]
    Warn,
    /// fail the whole `add_particles` call, leaving the ensemble untouched
    #[serde(rename = "strict")]
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnsembleOptions {
    pub peak: PeakConvention,
    pub sampler_policy: SamplerPolicy,
}

#[derive(Debug, Clone, Default)]
pub struct Ensemble {
    positions: Vec<f64>,  // 3 * population, particle-major
    velocities: Vec<f64>, // 3 * population, particle-major
    species: Vec<Species>,
    active: Vec<bool>,
    pending: Vec<bool>, // flagged and zeroed, deactivated on the next flagged call
    active_count: usize,
    options: EnsembleOptions,
}

/// Read-only view of one particle
///
/// Borrowed from the ensemble (or from the buffers the stepper is currently
/// working on); it cannot outlive them, and any growth of the ensemble
/// requires a fresh view.
#[derive(Debug, Clone, Copy)]
pub struct Particle<'a> {
    index: usize,
    position: &'a [f64],
    velocity: &'a [f64],
    species: Species,
    active: bool,
}

impl<'a> Particle<'a> {
    pub(crate) fn new(
        index: usize,
        position: &'a [f64],
        velocity: &'a [f64],
        species: Species,
        active: bool,
    ) -> Self {
        Self {
            index,
            position,
            velocity,
            species,
            active,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn position(&self) -> NVec3 {
        vec3(self.position)
    }

    pub fn velocity(&self) -> NVec3 {
        vec3(self.velocity)
    }

    pub fn x(&self) -> f64 {
        self.position[0]
    }

    pub fn y(&self) -> f64 {
        self.position[1]
    }

    pub fn z(&self) -> f64 {
        self.position[2]
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn mass(&self) -> f64 {
        self.species.mass()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// Population bookkeeping split off from the phase-space buffers, so the
/// stepper can hold `&mut positions` / `&mut velocities` while the
/// accelerator flips activity flags.
pub struct Roster<'a> {
    pub(crate) species: &'a [Species],
    pub(crate) active: &'a mut [bool],
    pub(crate) pending: &'a mut [bool],
    pub(crate) active_count: &'a mut usize,
}

impl Roster<'_> {
    pub fn population(&self) -> usize {
        self.active.len()
    }

    pub fn active_population(&self) -> usize {
        *self.active_count
    }
}

impl Ensemble {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: EnsembleOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> EnsembleOptions {
        self.options
    }

    /// Sample `n` new particles of `species` and append them.
    ///
    /// `dists[d]` gives the (position, velocity) distributions along
    /// dimension `d`. Six streams are taken from `streams`, one per
    /// coordinate, and sampled concurrently. Particle `population()` (before
    /// the call) sits exactly at the distribution modes.
    ///
    /// Returns the index range of the new particles.
    pub fn add_particles(
        &mut self,
        n: usize,
        species: Species,
        dists: &[DistributionPair; DIMS],
        streams: &mut StreamAllocator,
    ) -> Result<Range<usize>, EnsembleError> {
        let first = self.population();
        if n == 0 {
            return Ok(first..first);
        }
        info!("adding {n} {} particles to an ensemble of {first}", species.name());

        // one job per phase-space coordinate: x, y, z, vx, vy, vz
        let jobs: Vec<(usize, &'static str, Distribution)> = (0..DIMS)
            .map(|d| (d, "position", dists[d].position))
            .chain((0..DIMS).map(|d| (d, "velocity", dists[d].velocity)))
            .collect();
        let mut job_streams: [RandomStream; 2 * DIMS] = streams.take()?;

        let mut scratch: Vec<f64> = Vec::new();
        reserve_or_abort(&mut scratch, 2 * DIMS * n, "sampling buffer");
        scratch.resize(2 * DIMS * n, 0.0);

        trace!("sampling {} variates on {} streams", 2 * DIMS * n, jobs.len());
        let peak = self.options.peak;
        let outcomes: Vec<_> = scratch
            .par_chunks_mut(n)
            .zip(job_streams[..].par_iter_mut())
            .zip(jobs.par_iter())
            .map(|((column, stream), &(dim, kind, dist))| {
                let outcome = dist.sample(stream, column);
                column[0] = dist.peak_with(peak);
                outcome.map_err(|source| EnsembleError::Sampling { dim, kind, source })
            })
            .collect();

        for outcome in outcomes {
            if let Err(err) = outcome {
                match self.options.sampler_policy {
                    SamplerPolicy::Warn => warn!("{err}; continuing with the buffer as produced"),
                    SamplerPolicy::Strict => return Err(err),
                }
            }
        }

        reserve_or_abort(&mut self.positions, DIMS * n, "position storage");
        reserve_or_abort(&mut self.velocities, DIMS * n, "velocity storage");
        reserve_or_abort(&mut self.species, n, "species tags");
        reserve_or_abort(&mut self.active, n, "activity flags");
        reserve_or_abort(&mut self.pending, n, "loss marks");

        let (pos_columns, vel_columns) = scratch.split_at(DIMS * n);
        interleave(&mut self.positions, pos_columns, n);
        interleave(&mut self.velocities, vel_columns, n);
        self.species.extend(std::iter::repeat(species).take(n));
        self.active.extend(std::iter::repeat(true).take(n));
        self.pending.extend(std::iter::repeat(false).take(n));
        self.active_count += n;

        debug!(
            "ensemble now holds {} particles ({} active)",
            self.population(),
            self.active_count
        );
        Ok(first..first + n)
    }

    /// Permanently exclude particle `i` from force evaluation.
    /// Returns `false` if it was already inactive.
    pub fn deactivate_particle(&mut self, i: usize) -> bool {
        if !self.active[i] {
            return false;
        }
        self.active[i] = false;
        self.pending[i] = false;
        self.active_count -= 1;
        true
    }

    /// Particles ever added
    pub fn population(&self) -> usize {
        self.active.len()
    }

    pub fn active_population(&self) -> usize {
        self.active_count
    }

    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    pub fn velocities(&self) -> &[f64] {
        &self.velocities
    }

    pub fn particle(&self, i: usize) -> Particle<'_> {
        let span = DIMS * i..DIMS * i + DIMS;
        Particle::new(
            i,
            &self.positions[span.clone()],
            &self.velocities[span],
            self.species[i],
            self.active[i],
        )
    }

    pub fn particles(&self) -> impl Iterator<Item = Particle<'_>> + '_ {
        (0..self.population()).map(move |i| self.particle(i))
    }

    pub fn position(&self, i: usize) -> NVec3 {
        vec3(&self.positions[DIMS * i..])
    }

    pub fn velocity(&self, i: usize) -> NVec3 {
        vec3(&self.velocities[DIMS * i..])
    }

    pub fn species(&self, i: usize) -> Species {
        self.species[i]
    }

    pub fn mass(&self, i: usize) -> f64 {
        self.species[i].mass()
    }

    pub fn is_active(&self, i: usize) -> bool {
        self.active[i]
    }

    pub fn set_position(&mut self, i: usize, x: NVec3) {
        self.positions[DIMS * i..DIMS * i + DIMS].copy_from_slice(x.as_slice());
    }

    pub fn set_velocity(&mut self, i: usize, v: NVec3) {
        self.velocities[DIMS * i..DIMS * i + DIMS].copy_from_slice(v.as_slice());
    }

    /// Borrow positions, velocities and bookkeeping separately for one step
    pub fn split_mut(&mut self) -> (&mut [f64], &mut [f64], Roster<'_>) {
        (
            self.positions.as_mut_slice(),
            self.velocities.as_mut_slice(),
            Roster {
                species: &self.species,
                active: self.active.as_mut_slice(),
                pending: self.pending.as_mut_slice(),
                active_count: &mut self.active_count,
            },
        )
    }

    /// Every particle's phase-space coordinates, inactive ones included
    pub fn snapshot(&self) -> Vec<PhaseSpaceRecord> {
        self.particles().map(PhaseSpaceRecord::from).collect()
    }

    /// Hand a snapshot labelled `tag` to `sink`
    pub fn save(&self, tag: &str, sink: &mut dyn SnapshotSink) -> Result<(), SinkError> {
        debug!("saving '{tag}' snapshot of {} particles", self.population());
        sink.write_snapshot(tag, &self.snapshot())
    }
}

/// Append `n` particles from dimension-major `columns` (`[c0..cn, c0..cn, c0..cn]`)
/// to the particle-major `store`
fn interleave(store: &mut Vec<f64>, columns: &[f64], n: usize) {
    let start = store.len();
    store.resize(start + DIMS * n, 0.0);
    store[start..]
        .par_chunks_mut(DIMS)
        .enumerate()
        .for_each(|(i, particle)| {
            for (d, coord) in particle.iter_mut().enumerate() {
                *coord = columns[d * n + i];
            }
        });
}

/// A partly grown ensemble breaks the index invariants, so there is no
/// recovery path here.
fn reserve_or_abort<T>(store: &mut Vec<T>, additional: usize, what: &str) {
    if let Err(err) = store.try_reserve(additional) {
        error!("unable to grow {what} by {additional} entries ({err}); aborting");
        std::process::abort();
    }
}
