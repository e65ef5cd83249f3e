//! One-dimensional distributions used to initialize phase-space coordinates
//!
//! A [`Distribution`] is a plain value: a [`Shape`] plus two shape parameters.
//! It owns no random state; a [`RandomStream`] is passed to every call.
//!
//! ```
//! use ensim::{Distribution, StreamAllocator};
//!
//! let mut streams = StreamAllocator::new(42, 4);
//! let mut stream = streams.next_stream().unwrap();
//!
//! // fixed parameters
//! let dist = Distribution::gaussian(0.0, 1.0);
//! let mut xs = vec![0.0; 16];
//! dist.sample(&mut stream, &mut xs).unwrap();
//!
//! // parameters chosen per call
//! dist.sample_with(&mut stream, &mut xs, 5.0, 0.1).unwrap();
//! ```

use serde::Deserialize;

use crate::error::SamplerError;
use crate::simulation::random::RandomStream;
use crate::simulation::sampler;

/// Supported distribution shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Shape {
    #[default]
    Delta, // every variate equals p1
    Flat,        // [p1, p2)
    Gaussian,    // mean, sigma
    Exponential, // displacement, scale
    Laplace,     // mean, scale
    Cauchy,      // displacement, scale
    Rayleigh,    // displacement, scale
}

/// How the mode of a flat distribution is reported.
///
/// `Midpoint` is `(min + max) / 2`. `LegacyHalfWidth` is `(max - min) / 2`,
/// which earlier runs used; keep it only to reproduce those outputs.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeakConvention {
    #[default]
    #[serde(rename = "midpoint")]
    Midpoint,
    #[serde(rename = "legacy_half_width")]
    LegacyHalfWidth,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Distribution {
    shape: Shape,
    p1: f64,
    p2: f64,
}

impl Distribution {
    pub fn new(shape: Shape, p1: f64, p2: f64) -> Self {
        Self { shape, p1, p2 }
    }

    pub fn delta(value: f64) -> Self {
        Self::new(Shape::Delta, value, 0.0)
    }

    pub fn flat(min: f64, max: f64) -> Self {
        Self::new(Shape::Flat, min, max)
    }

    pub fn gaussian(mean: f64, sigma: f64) -> Self {
        Self::new(Shape::Gaussian, mean, sigma)
    }

    pub fn exponential(displacement: f64, scale: f64) -> Self {
        Self::new(Shape::Exponential, displacement, scale)
    }

    pub fn laplace(mean: f64, scale: f64) -> Self {
        Self::new(Shape::Laplace, mean, scale)
    }

    pub fn cauchy(displacement: f64, scale: f64) -> Self {
        Self::new(Shape::Cauchy, displacement, scale)
    }

    pub fn rayleigh(displacement: f64, scale: f64) -> Self {
        Self::new(Shape::Rayleigh, displacement, scale)
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn params(&self) -> (f64, f64) {
        (self.p1, self.p2)
    }

    /// Fill `target` using the stored parameters
    pub fn sample(&self, stream: &mut RandomStream, target: &mut [f64]) -> Result<(), SamplerError> {
        self.sample_with(stream, target, self.p1, self.p2)
    }

    /// Fill `target` using `p1`, `p2` instead of the stored parameters
    pub fn sample_with(
        &self,
        stream: &mut RandomStream,
        target: &mut [f64],
        p1: f64,
        p2: f64,
    ) -> Result<(), SamplerError> {
        if self.shape == Shape::Delta {
            target.fill(p1);
            return Ok(());
        }
        sampler::fill(stream, self.shape, p1, p2, target)
    }

    /// Mode of the distribution, with flat distributions reported as midpoints
    pub fn peak(&self) -> f64 {
        self.peak_with(PeakConvention::Midpoint)
    }

    pub fn peak_with(&self, convention: PeakConvention) -> f64 {
        match self.shape {
            Shape::Flat => match convention {
                PeakConvention::Midpoint => 0.5 * (self.p1 + self.p2),
                PeakConvention::LegacyHalfWidth => 0.5 * (self.p2 - self.p1),
            },
            Shape::Rayleigh => self.p1 + self.p2,
            Shape::Delta
            | Shape::Gaussian
            | Shape::Exponential
            | Shape::Laplace
            | Shape::Cauchy => self.p1,
        }
    }
}

/// Position and velocity distributions for one spatial dimension
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DistributionPair {
    pub position: Distribution,
    pub velocity: Distribution,
}

impl DistributionPair {
    pub fn new(position: Distribution, velocity: Distribution) -> Self {
        Self { position, velocity }
    }

    /// Every particle at `x` with velocity `v` along this dimension
    pub fn fixed(x: f64, v: f64) -> Self {
        Self::new(Distribution::delta(x), Distribution::delta(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::random::StreamAllocator;

    fn stream() -> RandomStream {
        StreamAllocator::new(99, 8).next_stream().unwrap()
    }

    #[test]
    fn flat_peak_conventions() {
        let d = Distribution::flat(2.0, 6.0);
        assert_eq!(d.peak(), 4.0);
        assert_eq!(d.peak_with(PeakConvention::LegacyHalfWidth), 2.0);
    }

    #[test]
    fn rayleigh_peak_is_displacement_plus_scale() {
        assert_eq!(Distribution::rayleigh(1.0, 0.5).peak(), 1.5);
    }

    #[test]
    fn delta_fills_constant() {
        let mut s = stream();
        let mut xs = vec![1.0; 8];
        Distribution::delta(-3.5).sample(&mut s, &mut xs).unwrap();
        assert!(xs.iter().all(|&x| x == -3.5));
    }

    #[test]
    fn flat_variates_stay_in_range() {
        let mut s = stream();
        let mut xs = vec![0.0; 1000];
        Distribution::flat(-1.0, 1.0).sample(&mut s, &mut xs).unwrap();
        assert!(xs.iter().all(|&x| (-1.0..1.0).contains(&x)));
    }

    #[test]
    fn one_sided_shapes_respect_displacement() {
        let mut s = stream();
        let mut xs = vec![0.0; 1000];
        Distribution::exponential(2.0, 0.5).sample(&mut s, &mut xs).unwrap();
        assert!(xs.iter().all(|&x| x >= 2.0));
        Distribution::rayleigh(-1.0, 0.5).sample(&mut s, &mut xs).unwrap();
        assert!(xs.iter().all(|&x| x >= -1.0));
    }

    #[test]
    fn gaussian_sample_mean_is_close() {
        let mut s = stream();
        let mut xs = vec![0.0; 20_000];
        Distribution::gaussian(3.0, 0.2).sample(&mut s, &mut xs).unwrap();
        let mean = xs.iter().sum::<f64>() / xs.len() as f64;
        assert!((mean - 3.0).abs() < 0.01, "mean = {mean}");
    }

    #[test]
    fn laplace_is_finite_and_centered() {
        let mut s = stream();
        let mut xs = vec![0.0; 20_000];
        Distribution::laplace(1.0, 0.1).sample(&mut s, &mut xs).unwrap();
        assert!(xs.iter().all(|x| x.is_finite()));
        let mean = xs.iter().sum::<f64>() / xs.len() as f64;
        assert!((mean - 1.0).abs() < 0.01, "mean = {mean}");
    }

    #[test]
    fn override_parameters_win() {
        let mut s = stream();
        let mut xs = vec![0.0; 100];
        Distribution::flat(0.0, 1.0).sample_with(&mut s, &mut xs, 10.0, 11.0).unwrap();
        assert!(xs.iter().all(|&x| (10.0..11.0).contains(&x)));
    }

    #[test]
    fn bad_parameters_are_rejected() {
        let mut s = stream();
        let mut xs = vec![0.0; 4];
        assert!(Distribution::flat(1.0, 1.0).sample(&mut s, &mut xs).is_err());
        assert!(Distribution::gaussian(0.0, -1.0).sample(&mut s, &mut xs).is_err());
        assert!(Distribution::cauchy(0.0, f64::NAN).sample(&mut s, &mut xs).is_err());
    }
}
