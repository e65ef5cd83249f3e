//! Observer pipeline
//!
//! Observers are called once per accepted step with a shared borrow of the
//! ensemble, so they can record but never steer the dynamics. At teardown
//! each may hand back a structured report.

use log::debug;
use serde_json::Value;

use crate::simulation::ensemble::Ensemble;

/// Structured output of an observer, written out as `<name>.json` by the CLI
#[derive(Debug, Clone, PartialEq)]
pub struct ObserverReport {
    pub name: String,
    pub body: Value,
}

pub trait Observer {
    fn observe(&mut self, ensemble: &Ensemble, t: f64);

    /// Called once after the last step
    fn finish(&mut self) -> Option<ObserverReport> {
        None
    }
}

impl<F> Observer for F
where
    F: FnMut(&Ensemble, f64),
{
    fn observe(&mut self, ensemble: &Ensemble, t: f64) {
        self(ensemble, t)
    }
}

#[derive(Default)]
pub struct Watcher {
    observers: Vec<Box<dyn Observer>>,
}

impl Watcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_observer<T>(&mut self, observer: T)
    where
        T: Observer + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Run every observer, in registration order
    pub fn deploy_observers(&mut self, ensemble: &Ensemble, t: f64) {
        for observer in self.observers.iter_mut() {
            observer.observe(ensemble, t);
        }
    }

    /// Collect teardown reports
    pub fn finish(&mut self) -> Vec<ObserverReport> {
        let reports: Vec<_> = self
            .observers
            .iter_mut()
            .filter_map(|observer| observer.finish())
            .collect();
        debug!("{} of {} observers produced reports", reports.len(), self.observers.len());
        reports
    }
}
