//! Simulation driver
//!
//! A [`Simulation`] owns one ensemble, one accelerator and one watcher, and
//! runs the fixed-step loop exactly once:
//!
//! `Idle -> Initialized -> Propagating -> Finished`
//!
//! Particles, forces, filters and observers are added while `Idle` or
//! `Initialized`. `run` saves an "initials" snapshot, observes `t_start`,
//! then alternates stepper and observers until `t_end` or until no particle
//! is active, and finally saves "finals".

use std::ops::Range;

use log::{debug, info};
use rayon::ThreadPool;

use crate::configuration::config::IntegratorConfig;
use crate::error::{RegistrationError, SimulationError};
use crate::simulation::accelerator::Accelerator;
use crate::simulation::distribution::DistributionPair;
use crate::simulation::ensemble::{Ensemble, EnsembleOptions};
use crate::simulation::filters::LossFilter;
use crate::simulation::forces::ForceLaw;
use crate::simulation::integrator::{stepper_for, Stepper};
use crate::simulation::params::Parameters;
use crate::simulation::random::{StreamAllocator, DEFAULT_MAX_STREAMS};
use crate::simulation::snapshot::SnapshotSink;
use crate::simulation::states::{Species, DIMS};
use crate::simulation::watcher::{Observer, ObserverReport, Watcher};

/// Runtime engine settings
#[derive(Debug, Clone)]
pub struct Engine {
    pub integrator: IntegratorConfig, // stepper used for propagation
    pub threads: Option<usize>,       // worker count, None = one per hardware thread
    pub seed: Option<u64>,            // master seed, None = wall clock
    pub max_streams: usize,           // random stream budget for the run
    pub ensemble: EnsembleOptions,    // peak convention, sampler policy
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            integrator: IntegratorConfig::VelocityVerlet,
            threads: None,
            seed: None,
            max_streams: DEFAULT_MAX_STREAMS,
            ensemble: EnsembleOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Initialized,
    Propagating,
    Finished,
}

/// What a finished run looked like
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub steps_taken: usize,
    pub steps_planned: usize,
    pub final_time: f64,
    pub population: usize,
    pub active_population: usize,
    pub reports: Vec<ObserverReport>,
}

impl RunSummary {
    /// The loop stopped because every particle was lost
    pub fn ended_early(&self) -> bool {
        self.steps_taken < self.steps_planned
    }
}

pub struct Simulation {
    parameters: Parameters,
    engine: Engine,
    ensemble: Ensemble,
    accelerator: Accelerator,
    watcher: Watcher,
    streams: StreamAllocator,
    stepper: Box<dyn Stepper>,
    sink: Option<Box<dyn SnapshotSink>>,
    phase: Phase,
}

impl Simulation {
    pub fn new(parameters: Parameters, engine: Engine) -> Result<Self, SimulationError> {
        parameters.validate()?;
        let streams = match engine.seed {
            Some(seed) => StreamAllocator::new(seed, engine.max_streams),
            None => StreamAllocator::from_clock(engine.max_streams),
        };
        Ok(Self {
            parameters,
            ensemble: Ensemble::with_options(engine.ensemble),
            accelerator: Accelerator::new(),
            watcher: Watcher::new(),
            streams,
            stepper: stepper_for(&engine.integrator),
            sink: None,
            phase: Phase::Idle,
            engine,
        })
    }

    /// Where "initials" and "finals" snapshots go
    pub fn with_sink<S>(mut self, sink: S) -> Self
    where
        S: SnapshotSink + 'static,
    {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Replace the stepper selected by the engine settings
    pub fn with_stepper<S>(mut self, stepper: S) -> Self
    where
        S: Stepper + 'static,
    {
        self.stepper = Box::new(stepper);
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn ensemble(&self) -> &Ensemble {
        &self.ensemble
    }

    pub fn accelerator(&self) -> &Accelerator {
        &self.accelerator
    }

    pub fn add_particles(
        &mut self,
        n: usize,
        species: Species,
        dists: &[DistributionPair; DIMS],
    ) -> Result<Range<usize>, SimulationError> {
        self.expect_configurable("idle or initialized")?;
        let added = self
            .ensemble
            .add_particles(n, species, dists, &mut self.streams)?;
        if self.ensemble.population() > 0 {
            self.phase = Phase::Initialized;
        }
        Ok(added)
    }

    pub fn add_force<T>(&mut self, force: T) -> Result<(), SimulationError>
    where
        T: ForceLaw + Send + Sync + 'static,
    {
        self.accelerator.add_force(force)?;
        Ok(())
    }

    pub fn add_filter<T>(&mut self, filter: T) -> Result<(), SimulationError>
    where
        T: LossFilter + Send + Sync + 'static,
    {
        self.accelerator.add_filter(filter)?;
        Ok(())
    }

    pub fn add_observer<T>(&mut self, observer: T) -> Result<(), SimulationError>
    where
        T: Observer + 'static,
    {
        if !matches!(self.phase, Phase::Idle | Phase::Initialized) {
            return Err(RegistrationError::Sealed { what: "observer" }.into());
        }
        self.watcher.add_observer(observer);
        Ok(())
    }

    /// Save initials, propagate, save finals, collect observer reports
    pub fn run(&mut self) -> Result<RunSummary, SimulationError> {
        if self.phase != Phase::Initialized {
            return Err(SimulationError::WrongPhase {
                found: self.phase,
                expected: "initialized",
            });
        }
        let steps_planned = self.parameters.steps()?;
        let pool = self.worker_pool()?;

        self.save("initials")?;
        let (steps_taken, final_time) = self.propagate(steps_planned, pool.as_ref());
        self.save("finals")?;

        let reports = self.watcher.finish();
        Ok(RunSummary {
            steps_taken,
            steps_planned,
            final_time,
            population: self.ensemble.population(),
            active_population: self.ensemble.active_population(),
            reports,
        })
    }

    fn propagate(&mut self, steps: usize, pool: Option<&ThreadPool>) -> (usize, f64) {
        self.phase = Phase::Propagating;
        self.accelerator.seal();
        self.stepper.reset();

        let dt = self.parameters.dt;
        let mut t = self.parameters.time_at(0);
        info!(
            "propagating {} particles from t = {t} over {steps} steps of {dt} ({})",
            self.ensemble.active_population(),
            self.stepper.name()
        );

        self.watcher.deploy_observers(&self.ensemble, t);
        let mut taken = 0;
        while taken < steps && self.ensemble.active_population() > 0 {
            {
                let (x, v, roster) = self.ensemble.split_mut();
                let mut system = self.accelerator.bind(roster);
                let stepper = &mut self.stepper;
                match pool {
                    Some(pool) => pool.install(|| stepper.do_step(&mut system, x, v, t, dt)),
                    None => stepper.do_step(&mut system, x, v, t, dt),
                }
            }
            taken += 1;
            t = self.parameters.time_at(taken);
            self.watcher.deploy_observers(&self.ensemble, t);
        }

        info!(
            "propagation complete after {taken} steps, {} of {} particles still active",
            self.ensemble.active_population(),
            self.ensemble.population()
        );
        self.phase = Phase::Finished;
        (taken, t)
    }

    fn save(&mut self, tag: &str) -> Result<(), SimulationError> {
        if let Some(sink) = self.sink.as_deref_mut() {
            self.ensemble.save(tag, sink)?;
        }
        Ok(())
    }

    fn worker_pool(&self) -> Result<Option<ThreadPool>, SimulationError> {
        match self.engine.threads {
            Some(n) => {
                debug!("building a worker pool of {n} threads");
                Ok(Some(rayon::ThreadPoolBuilder::new().num_threads(n).build()?))
            }
            None => Ok(None),
        }
    }

    fn expect_configurable(&self, expected: &'static str) -> Result<(), SimulationError> {
        match self.phase {
            Phase::Idle | Phase::Initialized => Ok(()),
            found => Err(SimulationError::WrongPhase { found, expected }),
        }
    }
}
