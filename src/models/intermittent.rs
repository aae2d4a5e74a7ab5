//! Methods for intermittent demand, where most periods sell nothing.

use crate::error::{DemandError, Result};
use crate::selection::MethodId;
use crate::stats;

use super::{DemandModel, ModelFit};

/// Smoothing constant for the TSB occurrence probability.
const TSB_ALPHA_PROBABILITY: f64 = 0.1;
/// Smoothing constant for the TSB demand size.
const TSB_ALPHA_SIZE: f64 = 0.1;
/// Smoothing constant shared by Croston and its bias-corrected variant.
const CROSTON_ALPHA: f64 = 0.1;

/// Final level of single exponential smoothing seeded with the first value.
fn ses_level(values: &[f64], alpha: f64) -> f64 {
    match values.first() {
        None => 0.0,
        Some(&first) => values
            .iter()
            .skip(1)
            .fold(first, |level, &v| alpha * v + (1.0 - alpha) * level),
    }
}

/// Per-period variance of a demand that occurs with probability `p` and has
/// size moments `(mu, sigma)` when it does:
/// `p * (sigma^2 + mu^2) - (p * mu)^2`.
fn occurrence_variance(p: f64, mu: f64, sigma: f64) -> f64 {
    (p * (sigma * sigma + mu * mu) - (p * mu) * (p * mu)).max(0.0)
}

/// Teunter-Syntetos-Babai: separate smoothing of the occurrence
/// probability and the demand size, updated every period.
///
/// The probability is seeded with the overall occurrence share and the size
/// with the mean non-zero demand; both then follow their recurrences across
/// the series. The forecast is flat at `probability * size`. An all-zero
/// series legitimately forecasts zero with zero dispersion.
#[derive(Debug, Clone)]
pub struct Tsb {
    alpha_probability: f64,
    alpha_size: f64,
}

impl Default for Tsb {
    fn default() -> Self {
        Self {
            alpha_probability: TSB_ALPHA_PROBABILITY,
            alpha_size: TSB_ALPHA_SIZE,
        }
    }
}

impl Tsb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(mut self, alpha_probability: f64, alpha_size: f64) -> Self {
        self.alpha_probability = alpha_probability.clamp(0.01, 0.99);
        self.alpha_size = alpha_size.clamp(0.01, 0.99);
        self
    }
}

impl DemandModel for Tsb {
    fn min_observations(&self) -> usize {
        2
    }

    fn fit_and_predict(&self, series: &[f64], horizon: usize) -> Result<ModelFit> {
        let n = series.len();
        if n < self.min_observations() {
            return Err(DemandError::InsufficientData {
                needed: self.min_observations(),
                got: n,
            });
        }

        let sizes: Vec<f64> = series.iter().copied().filter(|&v| v > 0.0).collect();
        if sizes.is_empty() {
            return Ok(ModelFit::flat(0.0, 0.0, horizon, n));
        }

        let mut probability = sizes.len() as f64 / n as f64;
        let mut size_level = stats::mean(&sizes);
        for &v in series {
            let occurred = if v > 0.0 { 1.0 } else { 0.0 };
            probability = self.alpha_probability * occurred
                + (1.0 - self.alpha_probability) * probability;
            if v > 0.0 {
                size_level = self.alpha_size * v + (1.0 - self.alpha_size) * size_level;
            }
        }

        let size_spread = if sizes.len() >= 2 {
            stats::std_dev(&sizes)
        } else {
            0.0
        };
        let dispersion = occurrence_variance(probability, size_level, size_spread).sqrt();
        Ok(ModelFit::flat(probability * size_level, dispersion, horizon, n))
    }

    fn method(&self) -> MethodId {
        MethodId::Tsb
    }
}

/// Which flavor of Croston's method to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrostonVariant {
    #[default]
    Classic,
    /// Syntetos-Boylan approximation: the classic estimate scaled by
    /// `1 - alpha / 2` to undo the known positive bias.
    Sba,
}

/// Croston's method: smooth the non-zero demand sizes and the intervals
/// between them separately, then forecast their ratio.
#[derive(Debug, Clone)]
pub struct Croston {
    alpha: f64,
    variant: CrostonVariant,
}

impl Default for Croston {
    fn default() -> Self {
        Self {
            alpha: CROSTON_ALPHA,
            variant: CrostonVariant::Classic,
        }
    }
}

impl Croston {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha.clamp(0.01, 0.99);
        self
    }

    /// Switches to the bias-corrected Syntetos-Boylan variant.
    pub fn sba(mut self) -> Self {
        self.variant = CrostonVariant::Sba;
        self
    }
}

impl DemandModel for Croston {
    fn min_observations(&self) -> usize {
        2
    }

    fn fit_and_predict(&self, series: &[f64], horizon: usize) -> Result<ModelFit> {
        let n = series.len();
        if n < self.min_observations() {
            return Err(DemandError::InsufficientData {
                needed: self.min_observations(),
                got: n,
            });
        }

        let mut demands = Vec::new();
        let mut intervals = Vec::new();
        let mut gap = 0usize;
        for &v in series {
            gap += 1;
            if v > 0.0 {
                demands.push(v);
                intervals.push(gap as f64);
                gap = 0;
            }
        }
        if demands.len() < 2 {
            return Err(DemandError::ComputationError(
                "croston needs at least two demand occurrences".into(),
            ));
        }

        let size_level = ses_level(&demands, self.alpha);
        let interval_level = ses_level(&intervals, self.alpha).max(1.0);
        let mut estimate = size_level / interval_level;
        if self.variant == CrostonVariant::Sba {
            estimate *= 1.0 - self.alpha / 2.0;
        }

        let implied_probability = (1.0 / interval_level).min(1.0);
        let size_spread = stats::std_dev(&demands);
        let dispersion =
            occurrence_variance(implied_probability, size_level, size_spread).sqrt();
        Ok(ModelFit::flat(estimate, dispersion, horizon, n))
    }

    fn method(&self) -> MethodId {
        match self.variant {
            CrostonVariant::Classic => MethodId::Croston,
            CrostonVariant::Sba => MethodId::Sba,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sparse_quarterly() -> Vec<f64> {
        vec![0.0, 0.0, 0.0, 25.0, 0.0, 0.0, 0.0, 30.0, 0.0, 0.0, 0.0, 28.0]
    }

    #[test]
    fn tsb_all_zero_series_forecasts_zero() {
        let fit = Tsb::new().fit_and_predict(&[0.0; 12], 4).unwrap();
        assert!(fit.estimates.iter().all(|&e| e == 0.0));
        assert!(fit.dispersions.iter().all(|&d| d == 0.0));
    }

    #[test]
    fn tsb_recurrence_matches_hand_computation() {
        // Seed: p = 0.5, z = 10. After [10, 0]:
        // p -> 0.1 * 1 + 0.9 * 0.5 = 0.55, z stays 10
        // p -> 0.9 * 0.55 = 0.495
        let fit = Tsb::new().fit_and_predict(&[10.0, 0.0], 1).unwrap();
        assert_relative_eq!(fit.estimates[0], 4.95, epsilon = 1e-10);
    }

    #[test]
    fn tsb_estimate_sits_below_the_mean_demand_size() {
        let fit = Tsb::new().fit_and_predict(&sparse_quarterly(), 3).unwrap();
        let estimate = fit.estimates[0];
        assert!(estimate > 0.0);
        assert!(estimate < 27.0);
        assert!(fit.dispersions[0] > 0.0);
        // Flat forecast across the horizon.
        assert_relative_eq!(fit.estimates[2], estimate);
    }

    #[test]
    fn croston_matches_hand_computation() {
        // Demands [25, 30, 28] with alpha 0.1 smooth to 25.75; intervals
        // are all 4, so the per-period rate is 25.75 / 4.
        let fit = Croston::new()
            .fit_and_predict(&sparse_quarterly(), 2)
            .unwrap();
        assert_relative_eq!(fit.estimates[0], 6.4375, epsilon = 1e-10);
        assert!(fit.dispersions[0] > 0.0);
    }

    #[test]
    fn sba_shrinks_the_croston_estimate() {
        let croston = Croston::new()
            .fit_and_predict(&sparse_quarterly(), 1)
            .unwrap();
        let sba = Croston::new()
            .sba()
            .fit_and_predict(&sparse_quarterly(), 1)
            .unwrap();
        assert!(sba.estimates[0] < croston.estimates[0]);
        assert_relative_eq!(
            sba.estimates[0],
            croston.estimates[0] * 0.95,
            epsilon = 1e-10
        );
    }

    #[test]
    fn croston_rejects_a_single_occurrence() {
        let series = vec![0.0, 0.0, 5.0, 0.0];
        assert!(Croston::new().fit_and_predict(&series, 1).is_err());
    }

    #[test]
    fn estimates_stay_positive_for_sparse_series() {
        let series = vec![0.0, 3.0, 0.0, 0.0, 7.0, 0.0, 2.0, 0.0, 0.0, 0.0, 4.0, 0.0];
        for fit in [
            Tsb::new().fit_and_predict(&series, 3).unwrap(),
            Croston::new().fit_and_predict(&series, 3).unwrap(),
            Croston::new().sba().fit_and_predict(&series, 3).unwrap(),
        ] {
            assert!(fit.estimates[0] > 0.0);
            assert!(fit.dispersions[0] >= 0.0);
        }
    }
}
