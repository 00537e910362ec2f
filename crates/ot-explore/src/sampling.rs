//! Design-point generation.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use crate::space::ParamRange;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SamplingMethod {
    /// Independent uniform draws; sample `i` depends only on `(seed, i)`.
    #[default]
    Random,
    /// One point per stratum in every dimension.
    LatinHypercube,
}

/// Random stream of sample `index`.
fn sample_rng(seed: u64, index: usize) -> Pcg64 {
    Pcg64::new(
        0xcafe_f00d_d15e_a5e5_u128 ^ ((u128::from(seed) << 64) | u128::from(seed)),
        index as u128,
    )
}

/// Design point `index` of a random design.
pub fn random_point(ranges: &[ParamRange], seed: u64, index: usize) -> Vec<f64> {
    let mut rng = sample_rng(seed, index);
    ranges.iter().map(|r| r.at(rng.r#gen())).collect()
}

/// `n` points with every range split into `n` strata, each stratum used once.
pub fn latin_hypercube(ranges: &[ParamRange], seed: u64, n: usize) -> Vec<Vec<f64>> {
    let mut rng = Pcg64::seed_from_u64(seed);
    let mut points = vec![Vec::with_capacity(ranges.len()); n];
    for range in ranges {
        let mut strata: Vec<usize> = (0..n).collect();
        strata.shuffle(&mut rng);
        for (point, stratum) in points.iter_mut().zip(strata) {
            let u = (stratum as f64 + rng.r#gen::<f64>()) / n as f64;
            point.push(range.at(u));
        }
    }
    points
}

/// All `n` design points of `method`, in sample order.
pub fn design_points(
    ranges: &[ParamRange],
    method: SamplingMethod,
    seed: u64,
    n: usize,
) -> Vec<Vec<f64>> {
    match method {
        SamplingMethod::Random => (0..n).map(|i| random_point(ranges, seed, i)).collect(),
        SamplingMethod::LatinHypercube => latin_hypercube(ranges, seed, n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ot_network::ParamRef;
    use proptest::prelude::*;

    fn ranges() -> Vec<ParamRange> {
        vec![
            ParamRange::new(ParamRef::heat_load("q", "value"), 0.0, 100.0),
            ParamRange::new(ParamRef::conductor("g", "conductance"), 1.0, 2.0),
        ]
    }

    #[test]
    fn random_point_does_not_depend_on_batch_size() {
        let small = design_points(&ranges(), SamplingMethod::Random, 7, 3);
        let large = design_points(&ranges(), SamplingMethod::Random, 7, 50);
        assert_eq!(small[..], large[..3]);
        assert_eq!(random_point(&ranges(), 7, 42), large[42]);
        assert_ne!(large[0], large[1]);
    }

    #[test]
    fn latin_hypercube_fills_every_stratum() {
        let n = 20;
        let points = latin_hypercube(&ranges(), 3, n);
        assert_eq!(points.len(), n);
        for (k, r) in ranges().iter().enumerate() {
            let mut strata: Vec<usize> = points
                .iter()
                .map(|p| ((p[k] - r.min) / (r.max - r.min) * n as f64) as usize)
                .collect();
            strata.sort_unstable();
            assert_eq!(strata, (0..n).collect::<Vec<_>>());
        }
    }

    proptest! {
        #[test]
        fn points_stay_in_range(seed in any::<u64>(), index in 0usize..10_000) {
            let p = random_point(&ranges(), seed, index);
            prop_assert!((0.0..=100.0).contains(&p[0]));
            prop_assert!((1.0..=2.0).contains(&p[1]));
        }
    }
}
