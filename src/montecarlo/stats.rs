//! Cross-path statistics

use serde::{Deserialize, Serialize};

/// Linearly interpolated percentile of ascending-sorted values.
///
/// The rank is `p / 100 * (n - 1)`; values between neighbouring ranks are
/// interpolated. Returns NaN for an empty slice.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    let Some(&last) = sorted.last() else {
        return f64::NAN;
    };
    if sorted.len() == 1 {
        return last;
    }

    let rank = (p / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;

    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// Sort `values` in place and take several percentiles from it
pub fn percentiles<const N: usize>(values: &mut [f64], ps: [f64; N]) -> [f64; N] {
    values.sort_unstable_by(f64::total_cmp);
    ps.map(|p| percentile_sorted(values, p))
}

/// Population mean and standard deviation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Moments {
    pub mean: f64,
    pub std: f64,
}

impl Moments {
    /// Moments with the population (n) denominator. Empty input gives zeros.
    pub fn population(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;

        Self {
            mean,
            std: variance.sqrt(),
        }
    }
}
