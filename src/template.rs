//! The perfected unit-Gaussian sample template used by ensembles.
//!
//! A template of size `n` starts from the normal quantiles at evenly
//! spaced probabilities, is made exactly antisymmetric, and is then
//! "perfected": standardised and bent by a cubic nudge `x + c·x³` until its
//! excess kurtosis vanishes. Antisymmetry keeps the mean, skewness and
//! fifth moment at zero throughout.
//!
//! # Algorithm
//!
//! For each of [`OUTER_PASSES`] passes the samples are standardised and
//! `c` is found by [`INNER_STEPS`] chord iterations
//! `c ← c − κ(x + c·x³) / 4(μ₆ − μ₄²)`, where the denominator is the
//! derivative of the kurtosis with respect to `c` at `c = 0`.

use crate::special::inverse_normal_cdf;
use crate::stats;

/// Number of standardise-and-nudge passes.
pub const OUTER_PASSES: usize = 3;

/// Chord iterations per pass.
pub const INNER_STEPS: usize = 5;

/// Sub-quantiles averaged per bin for even sizes.
const SUB_QUANTILES: usize = 100;

/// Builds the perfected unit-Gaussian template of `n` samples, sorted
/// ascending.
///
/// # Examples
/// ```
/// use u_uncertain::stats::sample_moments;
/// use u_uncertain::template::unit_gaussian_template;
///
/// let t = unit_gaussian_template(32);
/// let m = sample_moments(&t).unwrap();
/// assert!(m.mean.abs() < 1e-15);
/// assert!((m.deviation - 1.0).abs() < 1e-14);
/// assert!(m.kurtosis.abs() < 1e-12);
/// ```
pub fn unit_gaussian_template(n: usize) -> Vec<f64> {
    let mut samples = quantile_samples(n);
    let before = excess_kurtosis(&samples);
    perfect(&mut samples);
    tracing::debug!(
        size = n,
        kurtosis_before = before,
        kurtosis_after = excess_kurtosis(&samples),
        "built unit gaussian template"
    );
    samples
}

/// Antisymmetric normal quantiles.
///
/// Odd sizes sample the bin centres `(i + ½)/n`; even sizes average
/// [`SUB_QUANTILES`] evenly spaced quantiles inside each bin.
pub fn quantile_samples(n: usize) -> Vec<f64> {
    let bins = n as f64;
    let mut x: Vec<f64> = if n % 2 == 1 {
        (0..n)
            .map(|i| inverse_normal_cdf((i as f64 + 0.5) / bins))
            .collect()
    } else {
        let sub = SUB_QUANTILES as f64;
        (0..n)
            .map(|i| {
                let total: f64 = (0..SUB_QUANTILES)
                    .map(|j| inverse_normal_cdf((i as f64 + (j as f64 + 0.5) / sub) / bins))
                    .sum();
                total / sub
            })
            .collect()
    };

    for i in 0..n / 2 {
        let half = (x[i] - x[n - 1 - i]) / 2.0;
        x[i] = half;
        x[n - 1 - i] = -half;
    }
    if n % 2 == 1 {
        x[n / 2] = 0.0;
    }
    x
}

/// Corrects the kurtosis of antisymmetric `samples` in place and leaves
/// them standardised.
pub fn perfect(samples: &mut [f64]) {
    for _ in 0..OUTER_PASSES {
        standardise(samples);
        let n = samples.len() as f64;
        let m4 = samples.iter().map(|x| x.powi(4)).sum::<f64>() / n;
        let m6 = samples.iter().map(|x| x.powi(6)).sum::<f64>() / n;
        let chord = 4.0 * (m6 - m4 * m4);
        if !(chord > 0.0 && chord.is_finite()) {
            break;
        }

        let mut c = 0.0;
        let mut trial = samples.to_vec();
        for _ in 0..INNER_STEPS {
            for (t, &x) in trial.iter_mut().zip(samples.iter()) {
                *t = x + c * x * x * x;
            }
            c -= excess_kurtosis(&trial) / chord;
        }
        for x in samples.iter_mut() {
            *x += c * *x * *x * *x;
        }
    }
    standardise(samples);
}

fn standardise(samples: &mut [f64]) {
    let (Some(mean), Some(sd)) = (stats::mean(samples), stats::deviation(samples)) else {
        return;
    };
    if sd == 0.0 {
        return;
    }
    for x in samples.iter_mut() {
        *x = (*x - mean) / sd;
    }
}

fn excess_kurtosis(samples: &[f64]) -> f64 {
    stats::sample_moments(samples).map_or(f64::NAN, |m| m.kurtosis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::sample_moments;

    #[test]
    fn test_quantiles_are_antisymmetric() {
        for n in [8, 9, 32, 33] {
            let x = quantile_samples(n);
            assert_eq!(x.len(), n);
            for i in 0..n {
                assert_eq!(x[i], -x[n - 1 - i]);
            }
            assert!(x.windows(2).all(|w| w[0] < w[1]));
        }
        assert_eq!(quantile_samples(9)[4], 0.0);
    }

    #[test]
    fn test_raw_quantiles_are_light_tailed() {
        let m = sample_moments(&quantile_samples(32)).unwrap();
        assert!(m.kurtosis < -0.1);
    }

    #[test]
    fn test_perfected_moments() {
        for n in [8, 9, 10, 16, 32, 33, 1024] {
            let t = unit_gaussian_template(n);
            let m = sample_moments(&t).unwrap();
            assert!(m.mean.abs() < 1e-15, "n={n} mean={}", m.mean);
            assert!((m.deviation - 1.0).abs() < 1e-14, "n={n} sd={}", m.deviation);
            assert!(m.skewness.abs() < 1e-14, "n={n} skew={}", m.skewness);
            assert!(m.kurtosis.abs() < 1e-12, "n={n} kurt={}", m.kurtosis);
            assert!(m.fifth.abs() < 1e-13, "n={n} m5={}", m.fifth);
        }
    }

    #[test]
    fn test_perfect_leaves_degenerate_input() {
        let mut x = vec![0.0; 8];
        perfect(&mut x);
        assert_eq!(x, vec![0.0; 8]);
    }
}
