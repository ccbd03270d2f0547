//! Empirical moments of sample populations.
//!
//! Used by the ensemble representation to read mean, deviation and the
//! higher standardised moments back out of its samples, and to measure
//! how strongly two sample vectors move together.
//!
//! # Algorithms
//!
//! - **Mean**: Neumaier compensated summation, refined by the sum of the
//!   residuals.
//! - **Central moments**: deviations from the mean are sorted by magnitude
//!   before their powers are accumulated, so small terms are added before
//!   large ones and are not absorbed by a large running sum.
//! - **Population normalisation**: all moments divide by `n`, matching the
//!   moment targets the ensemble template is perfected against.
//!
//! Non-finite samples are not filtered: an ensemble pushed outside a
//! function's domain reports NaN moments rather than silently dropping
//! samples.

/// Population moments of a sample vector.
///
/// `skewness`, `kurtosis` (excess) and `fifth` are standardised by the
/// deviation. All three are 0 when the deviation is 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleMoments {
    /// Arithmetic mean.
    pub mean: f64,
    /// Population standard deviation.
    pub deviation: f64,
    /// Standardised third central moment.
    pub skewness: f64,
    /// Standardised fourth central moment minus 3.
    pub kurtosis: f64,
    /// Standardised fifth central moment.
    pub fifth: f64,
}

impl SampleMoments {
    /// Moments of an empty population.
    pub const UNDEFINED: Self = Self {
        mean: f64::NAN,
        deviation: f64::NAN,
        skewness: f64::NAN,
        kurtosis: f64::NAN,
        fifth: f64::NAN,
    };
}

/// Computes the arithmetic mean.
///
/// # Returns
/// - `None` if `data` is empty.
///
/// # Examples
/// ```
/// use u_uncertain::stats::mean;
/// let v = [1.0, 2.0, 3.0, 4.0, 5.0];
/// assert!((mean(&v).unwrap() - 3.0).abs() < 1e-15);
/// ```
pub fn mean(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    let n = data.len() as f64;
    let rough = kahan_sum(data) / n;
    let residuals = sorted_deviations(data, rough);
    Some(rough + residuals.iter().sum::<f64>() / n)
}

/// Computes the population standard deviation (denominator `n`).
///
/// # Returns
/// - `None` if `data` is empty.
///
/// # Examples
/// ```
/// use u_uncertain::stats::deviation;
/// let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
/// assert!((deviation(&v).unwrap() - 2.0).abs() < 1e-15);
/// ```
pub fn deviation(data: &[f64]) -> Option<f64> {
    let m = mean(data)?;
    let devs = sorted_deviations(data, m);
    Some((power_sum(&devs, 2) / data.len() as f64).sqrt())
}

/// Computes mean, deviation, skewness, excess kurtosis and the fifth
/// standardised moment in one pass over the sorted deviations.
///
/// # Returns
/// - `None` if `data` is empty.
///
/// # Examples
/// ```
/// use u_uncertain::stats::sample_moments;
/// let m = sample_moments(&[-1.0, 1.0]).unwrap();
/// assert_eq!(m.mean, 0.0);
/// assert_eq!(m.deviation, 1.0);
/// assert_eq!(m.skewness, 0.0);
/// assert_eq!(m.kurtosis, -2.0);
/// ```
pub fn sample_moments(data: &[f64]) -> Option<SampleMoments> {
    let m = mean(data)?;
    let n = data.len() as f64;
    let devs = sorted_deviations(data, m);

    let m2 = power_sum(&devs, 2) / n;
    let deviation = m2.sqrt();
    if m2 == 0.0 {
        return Some(SampleMoments {
            mean: m,
            deviation,
            skewness: 0.0,
            kurtosis: 0.0,
            fifth: 0.0,
        });
    }
    let m3 = power_sum(&devs, 3) / n;
    let m4 = power_sum(&devs, 4) / n;
    let m5 = power_sum(&devs, 5) / n;

    Some(SampleMoments {
        mean: m,
        deviation,
        skewness: m3 / (m2 * deviation),
        kurtosis: m4 / (m2 * m2) - 3.0,
        fifth: m5 / (m2 * m2 * deviation),
    })
}

/// Pearson correlation between `x` and `y` rotated left by `offset`
/// positions, i.e. pairing `x[i]` with `y[(i + offset) % n]`.
///
/// A non-zero offset probes for alignment artifacts between sample
/// vectors that share an origin.
///
/// # Returns
/// - `None` if the lengths differ or the data is empty.
/// - `Some(0.0)` if either series has zero variance or the covariance is
///   exactly zero.
///
/// # Examples
/// ```
/// use u_uncertain::stats::correlation;
/// let x = [1.0, 2.0, 3.0, 4.0];
/// let y = [2.0, 4.0, 6.0, 8.0];
/// assert!((correlation(&x, &y, 0).unwrap() - 1.0).abs() < 1e-15);
/// assert_eq!(correlation(&x, &[5.0; 4], 0), Some(0.0));
/// ```
pub fn correlation(x: &[f64], y: &[f64], offset: usize) -> Option<f64> {
    let n = x.len();
    if n == 0 || n != y.len() {
        return None;
    }
    let mean_x = mean(x)?;
    let mean_y = mean(y)?;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (i, &xi) in x.iter().enumerate() {
        let dx = xi - mean_x;
        let dy = y[(i + offset) % n] - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 || cov == 0.0 {
        return Some(0.0);
    }
    Some(cov / (var_x * var_y).sqrt())
}

// ---------------------------------------------------------------------------
// Kahan compensated summation
// ---------------------------------------------------------------------------

/// Compensated (Neumaier) sum.
///
/// Ensemble means must come back exact to the last bit or two for a
/// leaf of 1024 samples; plain summation drifts by `n·ε`.
pub fn kahan_sum(data: &[f64]) -> f64 {
    let mut sum = 0.0_f64;
    let mut c = 0.0_f64;
    for &x in data {
        let t = sum + x;
        if sum.abs() >= x.abs() {
            c += (sum - t) + x;
        } else {
            c += (x - t) + sum;
        }
        sum = t;
    }
    sum + c
}

// ---------------------------------------------------------------------------
// Sorted power sums
// ---------------------------------------------------------------------------

/// Deviations from `center`, ordered by increasing magnitude.
fn sorted_deviations(data: &[f64], center: f64) -> Vec<f64> {
    let mut devs: Vec<f64> = data.iter().map(|&x| x - center).collect();
    devs.sort_unstable_by(|a, b| a.abs().total_cmp(&b.abs()));
    devs
}

fn power_sum(sorted_devs: &[f64], k: i32) -> f64 {
    sorted_devs.iter().map(|d| d.powi(k)).sum()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy for generating finite f64 vectors of reasonable size.
    fn finite_vec(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
        proptest::collection::vec(-1e6_f64..1e6, min_len..=max_len)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn deviation_non_negative(data in finite_vec(1, 100)) {
            let sd = deviation(&data).unwrap();
            prop_assert!(sd >= 0.0, "deviation must be >= 0, got {}", sd);
        }

        #[test]
        fn moments_agree_with_accessors(data in finite_vec(1, 100)) {
            let m = sample_moments(&data).unwrap();
            prop_assert_eq!(m.mean, mean(&data).unwrap());
            prop_assert_eq!(m.deviation, deviation(&data).unwrap());
        }

        #[test]
        fn mean_linearity(
            data in finite_vec(1, 100),
            a in -100.0_f64..100.0,
            b in -100.0_f64..100.0,
        ) {
            let m = mean(&data).unwrap();
            let transformed: Vec<f64> = data.iter().map(|&x| a * x + b).collect();
            let mt = mean(&transformed).unwrap();
            let expected = a * m + b;
            let tol = 1e-8 * (a.abs() * 1e6).max(1.0);
            prop_assert!(
                (mt - expected).abs() < tol,
                "mean(a*x+b)={} != a*mean(x)+b={}",
                mt, expected
            );
        }

        #[test]
        fn skewness_of_symmetric_is_zero(
            half in proptest::collection::vec(-1e6_f64..1e6, 2..=50),
        ) {
            let mut data: Vec<f64> = half.clone();
            data.extend(half.iter().map(|x| -x));
            let m = sample_moments(&data).unwrap();
            prop_assert!(
                m.skewness.abs() < 1e-8,
                "symmetric data should have ~0 skewness, got {}",
                m.skewness
            );
        }

        #[test]
        fn correlation_bounded(
            x in finite_vec(2, 50),
            y in finite_vec(2, 50),
            offset in 0_usize..100,
        ) {
            let n = x.len().min(y.len());
            let r = correlation(&x[..n], &y[..n], offset).unwrap();
            prop_assert!(r.abs() <= 1.0 + 1e-12, "|r| = {} > 1", r.abs());
        }

        #[test]
        fn correlation_with_self_is_one(data in finite_vec(2, 50)) {
            prop_assume!(deviation(&data).unwrap() > 1e-3);
            let r = correlation(&data, &data, 0).unwrap();
            prop_assert!((r - 1.0).abs() < 1e-12, "Corr(x,x) = {}", r);
        }
    }
}
