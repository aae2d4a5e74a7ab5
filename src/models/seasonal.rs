//! Seasonal methods built on multiplicative sub-period indices.

use crate::classify::{seasonal_indices, TREND_P_VALUE_MAX, TREND_R_SQUARED_MIN};
use crate::error::{DemandError, Result};
use crate::selection::MethodId;
use crate::stats::{self, LinearFit};

use super::{DemandModel, ModelFit};

/// Floor applied to an index before dividing by it, so a near-dead
/// sub-period cannot blow up the de-seasonalized values.
pub const MIN_SEASONAL_INDEX: f64 = 0.05;

/// How the de-seasonalized base level projects into the future.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrendHandling {
    /// Repeat the recent de-seasonalized level.
    Level,
    /// Always extrapolate the fitted trend.
    Extrapolate,
    /// Extrapolate only when the fitted trend is statistically credible.
    #[default]
    Auto,
}

/// Full seasonal decomposition: de-seasonalize, follow the recent base
/// level (optionally with its trend), then re-apply the index of each
/// target sub-period.
///
/// Dispersion per step is the historical spread of the target sub-period;
/// a sub-period seen fewer than twice falls back to the de-seasonalized
/// residual spread scaled back by the index.
#[derive(Debug, Clone)]
pub struct SeasonalDecomposition {
    cycle: usize,
    trend: TrendHandling,
}

impl SeasonalDecomposition {
    pub fn new(cycle: usize) -> Self {
        Self {
            cycle: cycle.max(2),
            trend: TrendHandling::default(),
        }
    }

    pub fn with_trend(mut self, trend: TrendHandling) -> Self {
        self.trend = trend;
        self
    }

    /// Recent-history window the base level is estimated over.
    fn base_window(n: usize) -> usize {
        (n / 2).clamp(6, 12).min(n)
    }

    fn should_extrapolate(&self, fit: Option<&LinearFit>) -> bool {
        let Some(fit) = fit else { return false };
        match self.trend {
            TrendHandling::Level => false,
            TrendHandling::Extrapolate => true,
            TrendHandling::Auto => {
                fit.p_value < TREND_P_VALUE_MAX
                    && fit.r_squared > TREND_R_SQUARED_MIN
                    && fit.slope.abs() > 1e-12
            }
        }
    }
}

impl DemandModel for SeasonalDecomposition {
    fn min_observations(&self) -> usize {
        2 * self.cycle
    }

    fn fit_and_predict(&self, series: &[f64], horizon: usize) -> Result<ModelFit> {
        let n = series.len();
        if n < self.min_observations() {
            return Err(DemandError::InsufficientData {
                needed: self.min_observations(),
                got: n,
            });
        }
        let indices = seasonal_indices(series, self.cycle).ok_or_else(|| {
            DemandError::ComputationError("seasonal indices are undefined for a zero-mean series".into())
        })?;

        let deseasonalized: Vec<f64> = series
            .iter()
            .enumerate()
            .map(|(i, &v)| v / indices[i % self.cycle].max(MIN_SEASONAL_INDEX))
            .collect();

        let window = Self::base_window(n);
        let recent = &deseasonalized[n - window..];
        let level = stats::mean(recent);
        let fit = stats::linear_fit(recent);
        let extrapolate = self.should_extrapolate(fit.as_ref());

        // Spread of the base: trend residuals when extrapolating, plain
        // deviation from the level otherwise.
        let base_spread = if extrapolate {
            let fit = fit.as_ref().ok_or_else(|| {
                DemandError::ComputationError("trend fit missing for extrapolation".into())
            })?;
            if window >= 3 {
                let residual_sq: f64 = recent
                    .iter()
                    .enumerate()
                    .map(|(i, &v)| {
                        let r = v - fit.predict(i as f64);
                        r * r
                    })
                    .sum();
                (residual_sq / (window - 2) as f64).sqrt()
            } else {
                0.0
            }
        } else if window >= 2 {
            stats::std_dev(recent)
        } else {
            0.0
        };

        let mut estimates = Vec::with_capacity(horizon);
        let mut dispersions = Vec::with_capacity(horizon);
        let mut factors = Vec::with_capacity(horizon);
        for h in 0..horizon {
            let sub = (n + h) % self.cycle;
            let factor = indices[sub];
            let base = if extrapolate {
                match fit.as_ref() {
                    Some(fit) => fit.predict((window + h) as f64),
                    None => level,
                }
            } else {
                level
            };
            estimates.push(base * factor);
            dispersions.push(sub_period_spread(series, self.cycle, sub).unwrap_or(base_spread * factor.abs()));
            factors.push(factor);
        }

        let mut result = ModelFit::new(estimates, dispersions, n).with_seasonal_factors(factors);
        if extrapolate {
            if let Some(fit) = fit {
                result = result.with_trend_slope(fit.slope);
            }
        }
        Ok(result)
    }

    fn method(&self) -> MethodId {
        match self.trend {
            TrendHandling::Extrapolate => MethodId::SeasonalTrend,
            _ => MethodId::SeasonalDecomposition,
        }
    }
}

/// Spread of the raw values observed in one sub-period, when it was seen
/// at least twice.
fn sub_period_spread(series: &[f64], cycle: usize, sub: usize) -> Option<f64> {
    let values: Vec<f64> = series
        .iter()
        .enumerate()
        .filter(|(i, _)| i % cycle == sub)
        .map(|(_, &v)| v)
        .collect();
    if values.len() >= 2 {
        Some(stats::std_dev(&values))
    } else {
        None
    }
}

/// Lightweight seasonal method: overall de-seasonalized level times the
/// target sub-period index. Used when history is too thin for the full
/// decomposition to be trustworthy.
#[derive(Debug, Clone)]
pub struct SeasonalIndexModel {
    cycle: usize,
}

impl SeasonalIndexModel {
    pub fn new(cycle: usize) -> Self {
        Self { cycle: cycle.max(2) }
    }
}

impl DemandModel for SeasonalIndexModel {
    fn min_observations(&self) -> usize {
        2 * self.cycle
    }

    fn fit_and_predict(&self, series: &[f64], horizon: usize) -> Result<ModelFit> {
        let n = series.len();
        if n < self.min_observations() {
            return Err(DemandError::InsufficientData {
                needed: self.min_observations(),
                got: n,
            });
        }
        let indices = seasonal_indices(series, self.cycle).ok_or_else(|| {
            DemandError::ComputationError("seasonal indices are undefined for a zero-mean series".into())
        })?;

        let deseasonalized: Vec<f64> = series
            .iter()
            .enumerate()
            .map(|(i, &v)| v / indices[i % self.cycle].max(MIN_SEASONAL_INDEX))
            .collect();
        let level = stats::mean(&deseasonalized);
        let spread = stats::std_dev(&deseasonalized);

        let mut estimates = Vec::with_capacity(horizon);
        let mut dispersions = Vec::with_capacity(horizon);
        let mut factors = Vec::with_capacity(horizon);
        for h in 0..horizon {
            let factor = indices[(n + h) % self.cycle];
            estimates.push(level * factor);
            dispersions.push(spread * factor.abs());
            factors.push(factor);
        }
        Ok(ModelFit::new(estimates, dispersions, n).with_seasonal_factors(factors))
    }

    fn method(&self) -> MethodId {
        MethodId::SeasonalIndex
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Six repeats of a flat base with a fixed quarterly pattern.
    fn flat_quarterly() -> Vec<f64> {
        let pattern = [120.0, 80.0, 100.0, 100.0];
        (0..24).map(|i| pattern[i % 4]).collect()
    }

    /// The same quarterly pattern riding on a rising base.
    fn trending_quarterly() -> Vec<f64> {
        let pattern = [1.2, 0.8, 1.0, 1.0];
        (0..24)
            .map(|i| (100.0 + 5.0 * i as f64) * pattern[i % 4])
            .collect()
    }

    #[test]
    fn flat_pattern_is_reproduced_exactly() {
        let series = flat_quarterly();
        let fit = SeasonalDecomposition::new(4)
            .fit_and_predict(&series, 4)
            .unwrap();
        assert_relative_eq!(fit.estimates[0], 120.0, epsilon = 1e-9);
        assert_relative_eq!(fit.estimates[1], 80.0, epsilon = 1e-9);
        assert_relative_eq!(fit.estimates[2], 100.0, epsilon = 1e-9);
        assert_relative_eq!(fit.estimates[3], 100.0, epsilon = 1e-9);
        // Every sub-period repeats exactly, so its spread is zero.
        for &d in &fit.dispersions {
            assert_relative_eq!(d, 0.0, epsilon = 1e-9);
        }
        let factors = fit.seasonal_factors.unwrap();
        assert_relative_eq!(factors[0], 1.2, epsilon = 1e-9);
        assert_relative_eq!(factors[1], 0.8, epsilon = 1e-9);
    }

    #[test]
    fn auto_mode_extrapolates_a_strong_base_trend() {
        let series = trending_quarterly();
        let fit = SeasonalDecomposition::new(4)
            .fit_and_predict(&series, 8)
            .unwrap();
        assert!(fit.trend_slope.is_some());
        // One full cycle apart, same sub-period: the trend keeps it rising.
        assert!(fit.estimates[4] > fit.estimates[0]);
    }

    #[test]
    fn level_mode_repeats_the_pattern_without_growth() {
        let series = trending_quarterly();
        let fit = SeasonalDecomposition::new(4)
            .with_trend(TrendHandling::Level)
            .fit_and_predict(&series, 8)
            .unwrap();
        assert!(fit.trend_slope.is_none());
        // The same sub-period one cycle later repeats the estimate.
        assert_relative_eq!(fit.estimates[4], fit.estimates[0], epsilon = 1e-9);
    }

    #[test]
    fn extrapolate_mode_projects_higher_than_level_mode() {
        let series = trending_quarterly();
        let level = SeasonalDecomposition::new(4)
            .with_trend(TrendHandling::Level)
            .fit_and_predict(&series, 4)
            .unwrap();
        let trended = SeasonalDecomposition::new(4)
            .with_trend(TrendHandling::Extrapolate)
            .fit_and_predict(&series, 4)
            .unwrap();
        assert!(trended.estimates[0] > level.estimates[0]);
    }

    #[test]
    fn needs_two_full_cycles() {
        let series = vec![10.0; 20];
        let err = SeasonalDecomposition::new(12).fit_and_predict(&series, 1);
        assert!(err.is_err());
    }

    #[test]
    fn index_model_recovers_a_flat_pattern() {
        let series = flat_quarterly();
        let fit = SeasonalIndexModel::new(4).fit_and_predict(&series, 4).unwrap();
        assert_relative_eq!(fit.estimates[0], 120.0, epsilon = 1e-9);
        assert_relative_eq!(fit.estimates[1], 80.0, epsilon = 1e-9);
        assert_relative_eq!(fit.dispersions[0], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn forecast_continues_from_the_next_sub_period() {
        // 26 points: the series ends two steps into a cycle, so the first
        // forecast lands on the third sub-period.
        let pattern = [120.0, 80.0, 100.0, 100.0];
        let series: Vec<f64> = (0..26).map(|i| pattern[i % 4]).collect();
        let fit = SeasonalDecomposition::new(4)
            .fit_and_predict(&series, 2)
            .unwrap();
        assert_relative_eq!(fit.estimates[0], 100.0, epsilon = 1e-9);
        assert_relative_eq!(fit.estimates[1], 100.0, epsilon = 1e-9);
    }
}
