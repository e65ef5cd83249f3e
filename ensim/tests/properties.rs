use ensim::simulation::distribution::{Distribution, DistributionPair};
use ensim::simulation::ensemble::Ensemble;
use ensim::simulation::params::Parameters;
use ensim::simulation::random::StreamAllocator;
use ensim::simulation::states::{Species, DIMS};
use proptest::prelude::*;

fn check_layout(ens: &Ensemble) {
    assert_eq!(ens.positions().len(), DIMS * ens.population());
    assert_eq!(ens.velocities().len(), DIMS * ens.population());
    let active = ens.particles().filter(|p| p.is_active()).count();
    assert_eq!(active, ens.active_population());
}

/// Batch `b` gets its own shape and parameters in every coordinate
fn mixed_batch(b: usize) -> [DistributionPair; DIMS] {
    let shift = b as f64;
    [
        DistributionPair::new(Distribution::gaussian(shift, 0.5), Distribution::laplace(-shift, 0.2)),
        DistributionPair::new(Distribution::flat(shift, shift + 2.0), Distribution::exponential(shift, 1.5)),
        DistributionPair::new(Distribution::rayleigh(-shift, 0.7), Distribution::cauchy(2.0 * shift, 0.1)),
    ]
}

proptest! {
    #[test]
    fn batches_append_contiguously(seed in any::<u64>(), sizes in prop::collection::vec(0usize..40, 1..6)) {
        let dists = [DistributionPair::new(Distribution::gaussian(0.0, 1.0), Distribution::flat(-1.0, 1.0)); DIMS];
        let mut streams = StreamAllocator::new(seed, 2 * DIMS * sizes.len());
        let mut ens = Ensemble::new();

        let mut expected_start = 0;
        for n in sizes {
            let added = ens.add_particles(n, Species::CaF, &dists, &mut streams).unwrap();
            prop_assert_eq!(added.start, expected_start);
            prop_assert_eq!(added.len(), n);
            expected_start += n;
            check_layout(&ens);
        }
        prop_assert_eq!(ens.population(), expected_start);
    }

    #[test]
    fn particle_view_matches_flat_slices(seed in any::<u64>(), sizes in prop::collection::vec(0usize..40, 1..5)) {
        let mut streams = StreamAllocator::new(seed, 2 * DIMS * sizes.len());
        let mut ens = Ensemble::new();
        for (b, &n) in sizes.iter().enumerate() {
            ens.add_particles(n, Species::Rb87, &mixed_batch(b), &mut streams).unwrap();
        }

        for i in 0..ens.population() {
            let span = DIMS * i..DIMS * i + DIMS;
            let (x, v) = (ens.particle(i).position(), ens.particle(i).velocity());
            prop_assert_eq!(x.as_slice(), &ens.positions()[span.clone()]);
            prop_assert_eq!(v.as_slice(), &ens.velocities()[span.clone()]);
            prop_assert_eq!(ens.position(i), x);
            prop_assert_eq!(ens.velocity(i), v);
        }
    }

    #[test]
    fn flat_samples_stay_in_bounds(seed in any::<u64>(), min in -1.0e3..1.0e3f64, width in 1.0e-6..1.0e3f64) {
        let max = min + width;
        let dists = [DistributionPair::new(Distribution::flat(min, max), Distribution::delta(0.0)); DIMS];
        let mut streams = StreamAllocator::new(seed, 2 * DIMS);
        let mut ens = Ensemble::new();
        ens.add_particles(64, Species::CaF, &dists, &mut streams).unwrap();

        for &x in ens.positions() {
            prop_assert!(x >= min && x <= max, "{} outside [{}, {}]", x, min, max);
        }
        prop_assert!(ens.velocities().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn deactivation_keeps_counts_consistent(n in 1usize..50, picks in prop::collection::vec(0usize..50, 0..80)) {
        let mut streams = StreamAllocator::new(9, 2 * DIMS);
        let mut ens = Ensemble::new();
        ens.add_particles(n, Species::Li7, &[DistributionPair::fixed(0.0, 0.0); DIMS], &mut streams).unwrap();

        for i in picks.into_iter().filter(|&i| i < n) {
            let was_active = ens.is_active(i);
            prop_assert_eq!(ens.deactivate_particle(i), was_active);
            check_layout(&ens);
        }
        prop_assert_eq!(ens.population(), n);
    }

    #[test]
    fn step_count_covers_the_interval(t_start in -10.0..10.0f64, span in 0.0..10.0f64, dt in 1.0e-3..1.0f64) {
        let params = Parameters::new(t_start, t_start + span, dt);
        let steps = params.steps().unwrap();
        let t_last = params.time_at(steps);
        prop_assert!((t_last - params.t_end).abs() <= 0.5 * dt + 1e-9);
    }
}
