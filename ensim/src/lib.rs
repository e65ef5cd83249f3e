pub mod simulation;
pub mod configuration;
pub mod benchmark;
pub mod error;

pub use simulation::states::{Axis, Species, NVec3, Force, DIMS};
pub use simulation::random::{RandomStream, StreamAllocator, DEFAULT_MAX_STREAMS};
pub use simulation::distribution::{Distribution, DistributionPair, Shape, PeakConvention};
pub use simulation::ensemble::{Ensemble, EnsembleOptions, Particle, Roster, SamplerPolicy};
pub use simulation::snapshot::{PhaseSpaceRecord, SnapshotSink, MemorySink, CsvSink};
pub use simulation::forces::{ForceLaw, ForceSet, UniformGravity, LinearDamping, HarmonicTrap};
pub use simulation::filters::{LossFilter, FilterSet, PlaneBarrier, SphericalBoundary, IndexAfterTime};
pub use simulation::accelerator::{Accelerator, AcceleratorCall};
pub use simulation::integrator::{SecondOrderSystem, Stepper, VelocityVerlet, PositionVerlet, stepper_for};
pub use simulation::watcher::{Observer, ObserverReport, Watcher};
pub use simulation::observers::{TrajectoryRecorder, PopulationRecorder};
pub use simulation::params::Parameters;
pub use simulation::engine::{Engine, Phase, RunSummary, Simulation};
pub use simulation::scenario::Scenario;

pub use configuration::config::{IntegratorConfig, EngineConfig, DistributionConfig, EnsembleConfig, ForceConfig, FilterConfig, ObserverConfig, ScenarioConfig};

pub use error::{SamplerError, StreamError, EnsembleError, RegistrationError, SimulationError, SinkError};

pub use benchmark::benchmark::{bench_initialization, bench_accelerator, bench_propagation};
