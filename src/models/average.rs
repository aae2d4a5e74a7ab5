//! Moving-average methods for stable demand.

use crate::error::{DemandError, Result};
use crate::selection::MethodId;
use crate::stats;

use super::{DemandModel, ModelFit};

/// Window used when none is configured: half the series, never fewer than
/// three points.
pub fn default_window(n: usize) -> usize {
    (n / 2).max(3)
}

/// Simple moving average over the most recent window.
///
/// The estimate is the unweighted mean of the window and the dispersion is
/// the window's standard deviation. Doubles as the degradation target for
/// every other method.
#[derive(Debug, Clone, Default)]
pub struct SimpleMovingAverage {
    window: Option<usize>,
}

impl SimpleMovingAverage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the data-driven window size.
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = Some(window.max(1));
        self
    }

    fn effective_window(&self, n: usize) -> usize {
        self.window.unwrap_or_else(|| default_window(n)).min(n)
    }
}

impl DemandModel for SimpleMovingAverage {
    fn min_observations(&self) -> usize {
        1
    }

    fn fit_and_predict(&self, series: &[f64], horizon: usize) -> Result<ModelFit> {
        if series.is_empty() {
            return Err(DemandError::InsufficientData { needed: 1, got: 0 });
        }
        let window = self.effective_window(series.len());
        let tail = &series[series.len() - window..];
        let estimate = stats::mean(tail);
        let dispersion = if tail.len() >= 2 {
            stats::std_dev(tail)
        } else {
            0.0
        };
        Ok(ModelFit::flat(estimate, dispersion, horizon, window))
    }

    fn method(&self) -> MethodId {
        MethodId::SimpleMovingAverage
    }
}

/// Weighted moving average with linearly increasing weights, so the most
/// recent point in the window counts the most.
#[derive(Debug, Clone, Default)]
pub struct WeightedMovingAverage {
    window: Option<usize>,
}

impl WeightedMovingAverage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = Some(window.max(1));
        self
    }

    fn effective_window(&self, n: usize) -> usize {
        self.window.unwrap_or_else(|| default_window(n)).min(n)
    }
}

impl DemandModel for WeightedMovingAverage {
    fn min_observations(&self) -> usize {
        1
    }

    fn fit_and_predict(&self, series: &[f64], horizon: usize) -> Result<ModelFit> {
        if series.is_empty() {
            return Err(DemandError::InsufficientData { needed: 1, got: 0 });
        }
        let window = self.effective_window(series.len());
        let tail = &series[series.len() - window..];
        let weights: Vec<f64> = (1..=window).map(|w| w as f64).collect();
        let estimate = stats::weighted_mean(tail, &weights);
        let dispersion = if tail.len() >= 2 {
            stats::weighted_std(tail, &weights)
        } else {
            0.0
        };
        Ok(ModelFit::flat(estimate, dispersion, horizon, window))
    }

    fn method(&self) -> MethodId {
        MethodId::WeightedMovingAverage
    }
}
