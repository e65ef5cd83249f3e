//! Error types for the ensemble engine.
//!
//! Each stage owns a small `thiserror` enum; `SimulationError` wraps the ones
//! that can surface from a run so callers only need to match one type.

use thiserror::Error;

use crate::simulation::distribution::Shape;

/// The sampler rejected a request (bad shape parameters, empty stream, ...)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SamplerError {
    #[error("invalid parameters for {shape:?} distribution: p1={p1}, p2={p2} ({reason})")]
    InvalidParameters {
        shape: Shape,
        p1: f64,
        p2: f64,
        reason: String,
    },
}

/// Random stream allocation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    #[error("random stream allocator exhausted (limit {limit} streams)")]
    Exhausted { limit: usize },
}

/// Failures while growing an ensemble
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnsembleError {
    #[error("sampling {kind} distribution for dimension {dim} failed: {source}")]
    Sampling {
        dim: usize,
        kind: &'static str,
        #[source]
        source: SamplerError,
    },
    #[error(transparent)]
    Stream(#[from] StreamError),
}

/// Forces, filters and observers are frozen once propagation begins
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("cannot register a {what} after propagation has started")]
    Sealed { what: &'static str },
}

/// Anything that can go wrong driving a simulation
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("invalid time grid: {0}")]
    TimeGrid(String),
    #[error("simulation is {found:?}, expected {expected}")]
    WrongPhase {
        found: crate::simulation::engine::Phase,
        expected: &'static str,
    },
    #[error(transparent)]
    Ensemble(#[from] EnsembleError),
    #[error(transparent)]
    Registration(#[from] RegistrationError),
    #[error("snapshot sink failed: {0}")]
    Sink(#[from] SinkError),
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Snapshot output failures
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("i/o error writing snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error writing snapshot: {0}")]
    Csv(#[from] csv::Error),
}
