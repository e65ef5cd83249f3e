use std::time::Instant;

use crate::error::RegistrationError;
use crate::simulation::accelerator::Accelerator;
use crate::simulation::distribution::{Distribution, DistributionPair};
use crate::simulation::engine::{Engine, Simulation};
use crate::simulation::ensemble::Ensemble;
use crate::simulation::filters::SphericalBoundary;
use crate::simulation::forces::{HarmonicTrap, UniformGravity};
use crate::simulation::params::Parameters;
use crate::simulation::random::StreamAllocator;
use crate::simulation::states::{NVec3, Species, DIMS};

/// Gaussian cloud in every dimension, the usual benchmark load
fn cloud() -> [DistributionPair; DIMS] {
    let pair = DistributionPair::new(
        Distribution::gaussian(0.0, 1.0e-3),
        Distribution::gaussian(0.0, 0.1),
    );
    [pair; DIMS]
}

/// Helper to build an ensemble of size `n` with a fixed seed
fn make_ensemble(n: usize) -> Ensemble {
    let mut streams = StreamAllocator::new(42, 2 * DIMS);
    let mut ensemble = Ensemble::new();
    if let Err(err) = ensemble.add_particles(n, Species::CaF, &cloud(), &mut streams) {
        println!("N = {n:8}, failed to build ensemble: {err}");
    }
    ensemble
}

/// Gravity, a weak trap and a spherical boundary, sealed
fn make_accelerator() -> Result<Accelerator, RegistrationError> {
    let mut accelerator = Accelerator::new();
    accelerator.add_force(UniformGravity::earth())?;
    accelerator.add_force(HarmonicTrap {
        k: 1.0e-24,
        center: NVec3::zeros(),
    })?;
    accelerator.add_filter(SphericalBoundary { radius: 1.0 })?;
    accelerator.seal();
    Ok(accelerator)
}

/// Time `add_particles` (parallel sampling + transpose) for a range of n
pub fn bench_initialization() {
    let ns = [1_000, 10_000, 100_000, 1_000_000, 4_000_000];

    for n in ns {
        // Warm up
        let _ = make_ensemble(n);

        let t0 = Instant::now();
        let ensemble = make_ensemble(n);
        let elapsed = t0.elapsed().as_secs_f64();

        println!(
            "N = {n:8}, add_particles = {elapsed:8.6} s, {:6.1} ns/particle (pop {})",
            elapsed * 1.0e9 / n as f64,
            ensemble.population()
        );
    }
}

/// Time one accelerator pass (two forces, one filter) for a range of n
pub fn bench_accelerator() {
    let ns = [1_000, 10_000, 100_000, 1_000_000];
    let passes = 10;

    for n in ns {
        let mut ensemble = make_ensemble(n);

        let accelerator = match make_accelerator() {
            Ok(accelerator) => accelerator,
            Err(err) => {
                println!("N = {n:8}, {err}");
                continue;
            }
        };

        let mut acc = vec![0.0; DIMS * n];
        let (x, v, mut roster) = ensemble.split_mut();

        // Warm up
        accelerator.evaluate(x, v, &mut acc, &mut roster, 0.0);

        let t0 = Instant::now();
        for k in 0..passes {
            accelerator.evaluate(x, v, &mut acc, &mut roster, k as f64 * 1.0e-3);
        }
        let per_pass = t0.elapsed().as_secs_f64() / passes as f64;

        println!("N = {n:8}, accelerator pass = {per_pass:8.6} s");
    }
}

/// Full runs through the driver, varying the worker count
/// Paste output directly into excel to graph
pub fn bench_propagation() {
    println!("threads,N,steps,ms");

    let n = 200_000;
    let max_threads = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);

    for threads in 1..=max_threads {
        let parameters = Parameters::new(0.0, 0.1, 1.0e-3);
        let engine = Engine {
            threads: Some(threads),
            seed: Some(42),
            ..Engine::default()
        };

        let outcome = Simulation::new(parameters, engine).and_then(|mut sim| {
            sim.add_particles(n, Species::CaF, &cloud())?;
            sim.add_force(UniformGravity::earth())?;

            let t0 = Instant::now();
            let summary = sim.run()?;
            Ok((summary, t0.elapsed().as_secs_f64() * 1000.0))
        });

        match outcome {
            Ok((summary, ms)) => println!("{threads},{n},{},{ms:.3}", summary.steps_taken),
            Err(err) => println!("{threads},{n},error: {err}"),
        }
    }
}
