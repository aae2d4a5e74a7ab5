//! Seasonality detection at a declared cycle length.

use crate::stats;

/// Default cycle length in periods (months of a year).
pub const DEFAULT_CYCLE: usize = 12;

/// Floor of the autocorrelation significance threshold; the effective
/// threshold is `max(0.3, 2 / sqrt(n))`.
pub const ACF_THRESHOLD_FLOOR: f64 = 0.3;

/// Seasonality measurements for one series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalityProfile {
    pub has_seasonality: bool,
    /// The detected cycle length; `None` when no seasonality was found.
    pub period: Option<usize>,
    /// |autocorrelation| at the cycle lag, clamped to [0, 1].
    pub strength: f64,
    /// One multiplicative index per sub-period of the cycle, normalized to
    /// mean 1.0. Empty when no seasonality was found.
    pub indices: Vec<f64>,
}

impl SeasonalityProfile {
    fn none() -> Self {
        Self {
            has_seasonality: false,
            period: None,
            strength: 0.0,
            indices: Vec::new(),
        }
    }
}

/// Detects seasonality at the given cycle length.
///
/// Needs at least two full cycles of history. The autocorrelation at the
/// cycle lag is compared against `max(0.3, 2/sqrt(n))`; the formula already
/// centers and scales the series, so no separate standardization pass is
/// needed. Indices assign each observation to sub-period `i % cycle`.
pub fn assess(values: &[f64], cycle: usize) -> SeasonalityProfile {
    let n = values.len();
    if cycle < 2 || n < 2 * cycle {
        return SeasonalityProfile::none();
    }

    let acf = stats::autocorrelation(values, cycle);
    if !acf.is_finite() {
        return SeasonalityProfile::none();
    }

    let threshold = ACF_THRESHOLD_FLOOR.max(2.0 / (n as f64).sqrt());
    let strength = acf.abs().clamp(0.0, 1.0);
    if acf.abs() <= threshold {
        return SeasonalityProfile {
            has_seasonality: false,
            period: None,
            strength,
            indices: Vec::new(),
        };
    }

    let indices = seasonal_indices(values, cycle).unwrap_or_default();
    SeasonalityProfile {
        has_seasonality: true,
        period: Some(cycle),
        strength,
        indices,
    }
}

/// Multiplicative seasonal indices: mean of each sub-period over the grand
/// mean, renormalized so the indices average exactly 1.0.
///
/// Returns `None` when the grand mean degenerates to zero.
pub fn seasonal_indices(values: &[f64], cycle: usize) -> Option<Vec<f64>> {
    let grand_mean = stats::mean(values);
    if !grand_mean.is_finite() || grand_mean.abs() < 1e-10 {
        return None;
    }

    let mut sums = vec![0.0; cycle];
    let mut counts = vec![0usize; cycle];
    for (i, &v) in values.iter().enumerate() {
        sums[i % cycle] += v;
        counts[i % cycle] += 1;
    }

    let mut indices: Vec<f64> = sums
        .iter()
        .zip(counts.iter())
        .map(|(&sum, &count)| {
            if count == 0 {
                1.0
            } else {
                (sum / count as f64) / grand_mean
            }
        })
        .collect();

    // Ragged cycles leave the raw indices off unit mean; renormalize.
    let index_mean = stats::mean(&indices);
    if index_mean.abs() < 1e-10 {
        return None;
    }
    for index in &mut indices {
        *index /= index_mean;
    }
    Some(indices)
}
