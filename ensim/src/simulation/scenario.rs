//! Build fully-initialized simulations from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a runtime bundle
//! (`Scenario`) containing:
//! - a `Simulation` with its time grid and engine settings
//! - every configured ensemble batch, already sampled
//! - the registered force laws, loss filters and observers
//! - where output should go, if anywhere

use std::path::PathBuf;

use log::info;

use crate::configuration::config::{
    to_vec3, EngineConfig, FilterConfig, ForceConfig, ObserverConfig, ScenarioConfig,
};
use crate::error::SimulationError;
use crate::simulation::engine::{Engine, Simulation};
use crate::simulation::ensemble::EnsembleOptions;
use crate::simulation::filters::{IndexAfterTime, PlaneBarrier, SphericalBoundary};
use crate::simulation::forces::{HarmonicTrap, LinearDamping, UniformGravity};
use crate::simulation::observers::{PopulationRecorder, TrajectoryRecorder};
use crate::simulation::params::Parameters;
use crate::simulation::random::DEFAULT_MAX_STREAMS;

/// A simulation ready to `run`, plus the output directory it was configured with
pub struct Scenario {
    pub simulation: Simulation,
    pub output: Option<PathBuf>,
}

impl Scenario {
    pub fn build(cfg: ScenarioConfig) -> Result<Self, SimulationError> {
        let (parameters, engine) = runtime_settings(&cfg.engine);
        let mut simulation = Simulation::new(parameters, engine)?;

        // Ensembles: sampled in file order, so indices follow the file
        for ens in &cfg.ensembles {
            let added =
                simulation.add_particles(ens.population, ens.species, &ens.distribution_pairs())?;
            info!("particles {added:?} are {}", ens.species.name());
        }

        for force in &cfg.forces {
            match *force {
                ForceConfig::Gravity { g } => {
                    simulation.add_force(UniformGravity { g: to_vec3(g) })?
                }
                ForceConfig::Damping { coefficient } => {
                    simulation.add_force(LinearDamping { coefficient })?
                }
                ForceConfig::Harmonic { k, center } => simulation.add_force(HarmonicTrap {
                    k,
                    center: to_vec3(center),
                })?,
            }
        }

        for filter in &cfg.filters {
            match *filter {
                FilterConfig::Plane { axis, limit, after } => simulation.add_filter(PlaneBarrier {
                    axis,
                    limit,
                    after,
                })?,
                FilterConfig::Sphere { radius } => {
                    simulation.add_filter(SphericalBoundary { radius })?
                }
                FilterConfig::IndexAfter { index, after } => {
                    simulation.add_filter(IndexAfterTime { index, after })?
                }
            }
        }

        for observer in &cfg.observers {
            match *observer {
                ObserverConfig::Trajectory { particles } => {
                    simulation.add_observer(TrajectoryRecorder::new(particles))?
                }
                ObserverConfig::Statistics => simulation.add_observer(PopulationRecorder::new())?,
            }
        }

        info!(
            "scenario built: {} particles, {} forces, {} filters, {} observers",
            simulation.ensemble().population(),
            cfg.forces.len(),
            cfg.filters.len(),
            cfg.observers.len()
        );

        Ok(Self {
            simulation,
            output: cfg.output,
        })
    }
}

/// Split the engine section into the time grid and the engine settings
fn runtime_settings(e_cfg: &EngineConfig) -> (Parameters, Engine) {
    let parameters = Parameters::new(e_cfg.t_start, e_cfg.t_end, e_cfg.dt);
    let engine = Engine {
        integrator: e_cfg.integrator,
        threads: e_cfg.threads,
        seed: e_cfg.seed,
        max_streams: e_cfg.max_streams.unwrap_or(DEFAULT_MAX_STREAMS),
        ensemble: EnsembleOptions {
            peak: e_cfg.peak_convention,
            sampler_policy: e_cfg.sampler_policy,
        },
    };
    (parameters, engine)
}
