//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – time grid, integrator, threading and sampling options
//! - [`EnsembleConfig`]   – one batch of particles and its phase-space distributions
//! - [`ForceConfig`]      – named force laws
//! - [`FilterConfig`]     – named loss filters
//! - [`ObserverConfig`]   – named observers
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//!
//! ```yaml
//! engine:
//!   t_start: 0.0
//!   t_end: 1.0
//!   dt: 0.01
//!   integrator: "velocity_verlet"   # or "position_verlet"
//!   seed: 42                        # omit for a clock seed
//!   threads: 8                      # omit for one per hardware thread
//!   sampler_policy: "warn"          # or "strict"
//!   peak_convention: "midpoint"     # or "legacy_half_width"
//!
//! ensembles:
//!   - population: 10000
//!     species: "CaF"
//!     x:  { pdf: gaussian, center: 0.0, width: 1.0e-3 }
//!     vx: { pdf: gaussian, center: 0.0, width: 0.1 }
//!     y:  { pdf: flat, min: -1.0e-3, max: 1.0e-3 }
//!     vy: { pdf: delta, center: 0.0 }
//!     z:  { pdf: delta, center: 0.0 }
//!     vz: { pdf: rayleigh, displacement: 0.0, scalefactor: 1.0 }
//!
//! forces:
//!   - type: gravity
//!     g: [0.0, -9.81, 0.0]
//!   - type: damping
//!     coefficient: 1.0e-27
//!
//! filters:
//!   - type: plane
//!     axis: y
//!     limit: 0.01
//!   - type: index_after
//!     index: 0
//!     after: 0.5
//!
//! observers:
//!   - type: trajectory
//!     particles: 2
//!   - type: statistics
//!
//! output: "output"
//! ```
//!
//! Distributions, species and coordinates left out default to a delta at zero.

use std::path::PathBuf;

use serde::Deserialize;

use crate::simulation::distribution::{Distribution, DistributionPair, PeakConvention};
use crate::simulation::ensemble::SamplerPolicy;
use crate::simulation::states::{Axis, NVec3, Species};

/// Which integrator the engine uses
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegratorConfig {
    #[default]
    #[serde(rename = "velocity_verlet")] // kick-drift-kick, keeps the last acceleration between steps
    VelocityVerlet,

    #[serde(rename = "position_verlet")] // drift-kick-drift, one mid-step force evaluation
    PositionVerlet,
}

/// Engine-level configuration
#[derive(Deserialize, Debug, Clone)]
pub struct EngineConfig {
    #[serde(default)]
    pub t_start: f64, // time start
    pub t_end: f64, // time end
    pub dt: f64,    // fixed step size
    #[serde(default)]
    pub integrator: IntegratorConfig,
    pub threads: Option<usize>,     // worker threads for propagation
    pub seed: Option<u64>,          // master seed for all random streams
    pub max_streams: Option<usize>, // random stream budget
    #[serde(default)]
    pub sampler_policy: SamplerPolicy,
    #[serde(default)]
    pub peak_convention: PeakConvention,
}

/// One distribution, tagged by `pdf`, with the parameter names used in scenario files
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(tag = "pdf")]
pub enum DistributionConfig {
    #[serde(rename = "delta")]
    Delta { center: f64 },
    #[serde(rename = "flat")]
    Flat { min: f64, max: f64 },
    #[serde(rename = "gaussian")]
    Gaussian { center: f64, width: f64 },
    #[serde(rename = "exponential")]
    Exponential { displacement: f64, scalefactor: f64 },
    #[serde(rename = "laplace")]
    Laplace { displacement: f64, scalefactor: f64 },
    #[serde(rename = "cauchy")]
    Cauchy { displacement: f64, scalefactor: f64 },
    #[serde(rename = "rayleigh")]
    Rayleigh { displacement: f64, scalefactor: f64 },
}

impl Default for DistributionConfig {
    fn default() -> Self {
        DistributionConfig::Delta { center: 0.0 }
    }
}

impl From<DistributionConfig> for Distribution {
    fn from(cfg: DistributionConfig) -> Self {
        match cfg {
            DistributionConfig::Delta { center } => Distribution::delta(center),
            DistributionConfig::Flat { min, max } => Distribution::flat(min, max),
            DistributionConfig::Gaussian { center, width } => Distribution::gaussian(center, width),
            DistributionConfig::Exponential { displacement, scalefactor } => {
                Distribution::exponential(displacement, scalefactor)
            }
            DistributionConfig::Laplace { displacement, scalefactor } => {
                Distribution::laplace(displacement, scalefactor)
            }
            DistributionConfig::Cauchy { displacement, scalefactor } => {
                Distribution::cauchy(displacement, scalefactor)
            }
            DistributionConfig::Rayleigh { displacement, scalefactor } => {
                Distribution::rayleigh(displacement, scalefactor)
            }
        }
    }
}

/// A batch of particles sharing species and initial distributions
#[derive(Deserialize, Debug, Clone)]
pub struct EnsembleConfig {
    pub population: usize,
    #[serde(default)]
    pub species: Species,
    #[serde(default)]
    pub x: DistributionConfig,
    #[serde(default)]
    pub vx: DistributionConfig,
    #[serde(default)]
    pub y: DistributionConfig,
    #[serde(default)]
    pub vy: DistributionConfig,
    #[serde(default)]
    pub z: DistributionConfig,
    #[serde(default)]
    pub vz: DistributionConfig,
}

impl EnsembleConfig {
    /// (position, velocity) distribution pairs for x, y, z
    pub fn distribution_pairs(&self) -> [DistributionPair; 3] {
        [
            DistributionPair::new(self.x.into(), self.vx.into()),
            DistributionPair::new(self.y.into(), self.vy.into()),
            DistributionPair::new(self.z.into(), self.vz.into()),
        ]
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum ForceConfig {
    #[serde(rename = "gravity")]
    Gravity { g: [f64; 3] }, // field in m/s^2
    #[serde(rename = "damping")]
    Damping { coefficient: f64 },
    #[serde(rename = "harmonic")]
    Harmonic {
        k: f64,
        #[serde(default)]
        center: [f64; 3],
    },
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum FilterConfig {
    #[serde(rename = "plane")]
    Plane {
        axis: Axis,
        limit: f64,
        #[serde(default = "always")]
        after: f64,
    },
    #[serde(rename = "sphere")]
    Sphere { radius: f64 },
    #[serde(rename = "index_after")]
    IndexAfter { index: usize, after: f64 },
}

fn always() -> f64 {
    f64::NEG_INFINITY
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum ObserverConfig {
    #[serde(rename = "trajectory")]
    Trajectory { particles: usize },
    #[serde(rename = "statistics")]
    Statistics,
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    pub engine: EngineConfig,           // time grid and engine options
    pub ensembles: Vec<EnsembleConfig>, // particle batches, added in order
    #[serde(default)]
    pub forces: Vec<ForceConfig>,
    #[serde(default)]
    pub filters: Vec<FilterConfig>,
    #[serde(default)]
    pub observers: Vec<ObserverConfig>,
    pub output: Option<PathBuf>, // directory for snapshots and reports
}

impl ScenarioConfig {
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }
}

pub(crate) fn to_vec3(v: [f64; 3]) -> NVec3 {
    NVec3::new(v[0], v[1], v[2])
}
