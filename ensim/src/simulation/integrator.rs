//! Fixed-step symplectic integrators over flat phase-space buffers
//!
//! Both steppers drive a [`SecondOrderSystem`] and keep their acceleration
//! buffer between steps, so on every call the system sees the acceleration
//! it wrote last time. The loss protocol in the accelerator relies on this.

use rayon::prelude::*;

use crate::configuration::config::IntegratorConfig;

/// Callback contract for second-order systems `x'' = a(x, v, t)`.
///
/// `x`, `v` and `a` are particle-major with equal lengths. On entry `a`
/// holds the previous call's output (zeros before the first call).
/// Implementations may set entries of `v` to zero to bring a particle to
/// rest; any other change to `v` is outside the contract.
pub trait SecondOrderSystem {
    fn accelerations(&mut self, x: &[f64], v: &mut [f64], a: &mut [f64], t: f64);
}

/// A fixed-step stepper advancing `(x, v)` from `t` to `t + dt`
pub trait Stepper: Send {
    fn do_step(
        &mut self,
        system: &mut dyn SecondOrderSystem,
        x: &mut [f64],
        v: &mut [f64],
        t: f64,
        dt: f64,
    );

    /// Forget retained state (the next step re-evaluates from scratch)
    fn reset(&mut self);

    fn name(&self) -> &'static str;
}

/// Build the stepper selected in a scenario
pub fn stepper_for(cfg: &IntegratorConfig) -> Box<dyn Stepper> {
    match cfg {
        IntegratorConfig::VelocityVerlet => Box::new(VelocityVerlet::new()),
        IntegratorConfig::PositionVerlet => Box::new(PositionVerlet::new()),
    }
}

/// Velocity-Verlet (kick-drift-kick)
///
/// One force evaluation per step: the acceleration computed at the end of a
/// step is reused for the first kick of the next one. The very first step
/// evaluates `a(x_0, t_0)` to prime that buffer.
#[derive(Debug, Default, Clone)]
pub struct VelocityVerlet {
    acc: Vec<f64>,
    primed: bool,
}

impl VelocityVerlet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accelerations retained from the last step
    pub fn accelerations(&self) -> &[f64] {
        &self.acc
    }
}

impl Stepper for VelocityVerlet {
    fn do_step(
        &mut self,
        system: &mut dyn SecondOrderSystem,
        x: &mut [f64],
        v: &mut [f64],
        t: f64,
        dt: f64,
    ) {
        let n = x.len();
        if n == 0 {
            return;
        }
        if self.acc.len() != n {
            // population changed since the last step
            self.acc.clear();
            self.acc.resize(n, 0.0);
            self.primed = false;
        }
        if !self.primed {
            system.accelerations(x, v, &mut self.acc, t);
            self.primed = true;
        }

        let half_dt = 0.5 * dt;

        // Kick + drift: v_n+1/2 = v_n + dt/2 a_n, x_n+1 = x_n + dt v_n+1/2
        x.par_iter_mut()
            .zip(v.par_iter_mut())
            .zip(self.acc.par_iter())
            .for_each(|((x, v), a)| {
                *v += half_dt * a;
                *x += dt * *v;
            });

        // a_n+1 from x_n+1 at t_n+1
        system.accelerations(x, v, &mut self.acc, t + dt);

        // Second kick: v_n+1 = v_n+1/2 + dt/2 a_n+1
        v.par_iter_mut()
            .zip(self.acc.par_iter())
            .for_each(|(v, a)| *v += half_dt * a);
    }

    fn reset(&mut self) {
        self.acc.clear();
        self.primed = false;
    }

    fn name(&self) -> &'static str {
        "velocity_verlet"
    }
}

/// Position-Verlet (drift-kick-drift), one force evaluation at mid-step
#[derive(Debug, Default, Clone)]
pub struct PositionVerlet {
    acc: Vec<f64>,
}

impl PositionVerlet {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Stepper for PositionVerlet {
    fn do_step(
        &mut self,
        system: &mut dyn SecondOrderSystem,
        x: &mut [f64],
        v: &mut [f64],
        t: f64,
        dt: f64,
    ) {
        let n = x.len();
        if n == 0 {
            return;
        }
        if self.acc.len() != n {
            self.acc.clear();
            self.acc.resize(n, 0.0);
        }
        let half_dt = 0.5 * dt;

        // Drift: x_n+1/2 = x_n + dt/2 v_n
        x.par_iter_mut()
            .zip(v.par_iter())
            .for_each(|(x, v)| *x += half_dt * v);

        // a_mid from x_n+1/2 at t_n + dt/2
        system.accelerations(x, v, &mut self.acc, t + half_dt);

        // Kick, then second drift: v_n+1 = v_n + dt a_mid, x_n+1 = x_n+1/2 + dt/2 v_n+1
        x.par_iter_mut()
            .zip(v.par_iter_mut())
            .zip(self.acc.par_iter())
            .for_each(|((x, v), a)| {
                *v += dt * a;
                *x += half_dt * *v;
            });
    }

    fn reset(&mut self) {
        self.acc.clear();
    }

    fn name(&self) -> &'static str {
        "position_verlet"
    }
}
