pub mod states;
pub mod params;
pub mod random;
pub mod sampler;
pub mod distribution;
pub mod ensemble;
pub mod snapshot;
pub mod forces;
pub mod filters;
pub mod accelerator;
pub mod integrator;
pub mod watcher;
pub mod observers;
pub mod engine;
pub mod scenario;
