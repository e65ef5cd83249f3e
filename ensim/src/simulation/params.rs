//! Time grid for a run
//!
//! `Parameters` holds the fixed-step schedule. Step times are computed as
//! `t_start + k * dt` rather than accumulated, so the last step lands on
//! `t_end` without drift.

use crate::error::SimulationError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parameters {
    pub t_start: f64, // time start
    pub t_end: f64,   // time end
    pub dt: f64,      // fixed step size
}

impl Parameters {
    pub fn new(t_start: f64, t_end: f64, dt: f64) -> Self {
        Self { t_start, t_end, dt }
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if !(self.t_start.is_finite() && self.t_end.is_finite() && self.dt.is_finite()) {
            return Err(SimulationError::TimeGrid("times must be finite".into()));
        }
        if self.dt <= 0.0 {
            return Err(SimulationError::TimeGrid(format!("dt must be positive (got {})", self.dt)));
        }
        if self.t_end < self.t_start {
            return Err(SimulationError::TimeGrid(format!(
                "t_end {} is before t_start {}",
                self.t_end, self.t_start
            )));
        }
        Ok(())
    }

    /// Number of whole steps between `t_start` and `t_end`
    pub fn steps(&self) -> Result<usize, SimulationError> {
        self.validate()?;
        Ok(((self.t_end - self.t_start) / self.dt).round() as usize)
    }

    /// Time after `k` steps
    pub fn time_at(&self, k: usize) -> f64 {
        self.t_start + k as f64 * self.dt
    }
}
