//! Variate generation for the supported distribution shapes
//!
//! The rest of the engine treats this as an opaque sampler: give it a stream,
//! a shape and two shape parameters, and it fills a buffer. Parameters follow
//! the two-parameter (displacement, scale) convention throughout:
//!
//! | shape        | p1           | p2         |
//! |--------------|--------------|------------|
//! | delta        | value        | unused     |
//! | flat         | min          | max (open) |
//! | gaussian     | mean         | sigma      |
//! | exponential  | displacement | scale      |
//! | laplace      | mean         | scale      |
//! | cauchy       | displacement | scale      |
//! | rayleigh     | displacement | scale      |

use rand::distributions::{Open01, Uniform};
use rand::Rng;
use rand_distr::{Cauchy, Distribution as _, Exp, Normal, Weibull};

use crate::error::SamplerError;
use crate::simulation::distribution::Shape;
use crate::simulation::random::RandomStream;

/// Fill `target` with independent variates of `shape(p1, p2)` drawn from `stream`
pub fn fill(
    stream: &mut RandomStream,
    shape: Shape,
    p1: f64,
    p2: f64,
    target: &mut [f64],
) -> Result<(), SamplerError> {
    let invalid = |reason: &str| SamplerError::InvalidParameters {
        shape,
        p1,
        p2,
        reason: reason.to_string(),
    };

    if !p1.is_finite() || !p2.is_finite() {
        return Err(invalid("parameters must be finite"));
    }

    let rng = stream.rng_mut();
    match shape {
        Shape::Delta => {
            target.fill(p1);
        }
        Shape::Flat => {
            if p1 >= p2 {
                return Err(invalid("min must be below max"));
            }
            if !(p2 - p1).is_finite() {
                return Err(invalid("range overflows"));
            }
            let dist = Uniform::new(p1, p2);
            target.iter_mut().for_each(|x| *x = dist.sample(rng));
        }
        Shape::Gaussian => {
            if p2 <= 0.0 {
                return Err(invalid("sigma must be positive"));
            }
            let dist = Normal::new(p1, p2).map_err(|e| invalid(&e.to_string()))?;
            target.iter_mut().for_each(|x| *x = dist.sample(rng));
        }
        Shape::Exponential => {
            if p2 <= 0.0 {
                return Err(invalid("scale must be positive"));
            }
            let dist = Exp::new(1.0 / p2).map_err(|e| invalid(&e.to_string()))?;
            target.iter_mut().for_each(|x| *x = p1 + dist.sample(rng));
        }
        Shape::Laplace => {
            if p2 <= 0.0 {
                return Err(invalid("scale must be positive"));
            }
            // inverse cdf on the open interval, so ln never sees zero
            for x in target.iter_mut() {
                let u: f64 = rng.sample::<f64, _>(Open01) - 0.5;
                *x = p1 - p2 * u.signum() * (1.0 - 2.0 * u.abs()).ln();
            }
        }
        Shape::Cauchy => {
            if p2 <= 0.0 {
                return Err(invalid("scale must be positive"));
            }
            let dist = Cauchy::new(p1, p2).map_err(|e| invalid(&e.to_string()))?;
            target.iter_mut().for_each(|x| *x = dist.sample(rng));
        }
        Shape::Rayleigh => {
            if p2 <= 0.0 {
                return Err(invalid("scale must be positive"));
            }
            // density 2(x-a)/b^2 exp(-((x-a)/b)^2) is a shape-2 Weibull shifted by a
            let dist = Weibull::new(p2, 2.0).map_err(|e| invalid(&e.to_string()))?;
            target.iter_mut().for_each(|x| *x = p1 + dist.sample(rng));
        }
    }
    Ok(())
}
