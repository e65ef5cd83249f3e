//! Built-in observers

use log::trace;
use serde::Serialize;
use serde_json::json;

use crate::simulation::ensemble::Ensemble;
use crate::simulation::watcher::{Observer, ObserverReport};

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryPoint {
    pub time: f64,
    pub position: [f64; 3],
}

/// Records the position of the first `k` particles at every step.
/// `k` is clipped to the population seen on the first call.
#[derive(Debug, Clone)]
pub struct TrajectoryRecorder {
    requested: usize,
    trajectories: Option<Vec<Vec<TrajectoryPoint>>>,
}

impl TrajectoryRecorder {
    pub fn new(particles: usize) -> Self {
        Self {
            requested: particles,
            trajectories: None,
        }
    }

    pub fn trajectories(&self) -> &[Vec<TrajectoryPoint>] {
        self.trajectories.as_deref().unwrap_or(&[])
    }
}

impl Observer for TrajectoryRecorder {
    fn observe(&mut self, ensemble: &Ensemble, t: f64) {
        let requested = self.requested;
        let trajectories = self.trajectories.get_or_insert_with(|| {
            let k = requested.min(ensemble.population());
            trace!("tracking the first {k} trajectories");
            vec![Vec::new(); k]
        });
        for (i, trajectory) in trajectories.iter_mut().enumerate() {
            let x = ensemble.position(i);
            trajectory.push(TrajectoryPoint {
                time: t,
                position: [x.x, x.y, x.z],
            });
        }
    }

    fn finish(&mut self) -> Option<ObserverReport> {
        let trajectories: Vec<_> = self
            .trajectories()
            .iter()
            .map(|trajectory| json!({ "trajectory": trajectory }))
            .collect();
        Some(ObserverReport {
            name: "trajectories".to_string(),
            body: json!({ "trajectories": trajectories }),
        })
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
pub struct PopulationPoint {
    pub t: f64,
    pub pop: usize,
}

/// Records the active population at every step
#[derive(Debug, Clone, Default)]
pub struct PopulationRecorder {
    lifetime: Vec<PopulationPoint>,
}

impl PopulationRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lifetime(&self) -> &[PopulationPoint] {
        &self.lifetime
    }
}

impl Observer for PopulationRecorder {
    fn observe(&mut self, ensemble: &Ensemble, t: f64) {
        self.lifetime.push(PopulationPoint {
            t,
            pop: ensemble.active_population(),
        });
    }

    fn finish(&mut self) -> Option<ObserverReport> {
        Some(ObserverReport {
            name: "statistics".to_string(),
            body: json!({ "statistics": [ { "lifetime": self.lifetime } ] }),
        })
    }
}
