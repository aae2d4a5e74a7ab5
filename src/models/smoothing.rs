//! Exponential smoothing methods.

use crate::error::{DemandError, Result};
use crate::selection::MethodId;

use super::{DemandModel, ModelFit};

/// Level smoothing constant shared by the smoothing methods.
pub const DEFAULT_SMOOTHING_ALPHA: f64 = 0.3;

/// Trend smoothing constant for [`TrendSmoothing`].
const DEFAULT_TREND_BETA: f64 = 0.1;

/// Damping applied when extrapolating the smoothed trend.
const DEFAULT_DAMPING: f64 = 0.9;

fn clamp_smoothing(value: f64) -> f64 {
    value.clamp(0.01, 0.99)
}

/// Single exponential smoothing of the demand level.
///
/// The level follows `s_t = alpha * x_t + (1 - alpha) * s_(t-1)` seeded with
/// the first observation; the dispersion is an exponentially weighted
/// standard deviation of the one-step errors, so old surprises fade at the
/// same rate as old demand.
#[derive(Debug, Clone)]
pub struct ExponentialSmoothing {
    alpha: f64,
}

impl Default for ExponentialSmoothing {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_SMOOTHING_ALPHA,
        }
    }
}

impl ExponentialSmoothing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = clamp_smoothing(alpha);
        self
    }
}

impl DemandModel for ExponentialSmoothing {
    fn min_observations(&self) -> usize {
        1
    }

    fn fit_and_predict(&self, series: &[f64], horizon: usize) -> Result<ModelFit> {
        if series.is_empty() {
            return Err(DemandError::InsufficientData { needed: 1, got: 0 });
        }
        let mut level = series[0];
        let mut ew_variance = 0.0;
        for &x in &series[1..] {
            let error = x - level;
            ew_variance = self.alpha * error * error + (1.0 - self.alpha) * ew_variance;
            level = self.alpha * x + (1.0 - self.alpha) * level;
        }
        Ok(ModelFit::flat(
            level,
            ew_variance.sqrt(),
            horizon,
            series.len(),
        ))
    }

    fn method(&self) -> MethodId {
        MethodId::ExponentialSmoothing
    }
}

/// Double (Holt-style) smoothing with a damped trend component.
///
/// Level and trend update as
/// `l_t = alpha * x_t + (1 - alpha) * (l_(t-1) + phi * b_(t-1))` and
/// `b_t = beta * (l_t - l_(t-1)) + (1 - beta) * phi * b_(t-1)`; the h-step
/// forecast adds the geometrically damped trend sum to the level.
#[derive(Debug, Clone)]
pub struct TrendSmoothing {
    alpha: f64,
    beta: f64,
    phi: f64,
}

impl Default for TrendSmoothing {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_SMOOTHING_ALPHA,
            beta: DEFAULT_TREND_BETA,
            phi: DEFAULT_DAMPING,
        }
    }
}

impl TrendSmoothing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(mut self, alpha: f64, beta: f64) -> Self {
        self.alpha = clamp_smoothing(alpha);
        self.beta = clamp_smoothing(beta);
        self
    }

    pub fn with_damping(mut self, phi: f64) -> Self {
        self.phi = phi.clamp(0.1, 1.0);
        self
    }
}

impl DemandModel for TrendSmoothing {
    fn min_observations(&self) -> usize {
        3
    }

    fn fit_and_predict(&self, series: &[f64], horizon: usize) -> Result<ModelFit> {
        if series.len() < self.min_observations() {
            return Err(DemandError::InsufficientData {
                needed: self.min_observations(),
                got: series.len(),
            });
        }

        let mut level = series[0];
        let mut trend = series[1] - series[0];
        let mut squared_errors = 0.0;
        let mut error_count = 0usize;
        for &x in &series[1..] {
            let one_step = level + self.phi * trend;
            let error = x - one_step;
            squared_errors += error * error;
            error_count += 1;

            let previous_level = level;
            level = self.alpha * x + (1.0 - self.alpha) * one_step;
            trend = self.beta * (level - previous_level) + (1.0 - self.beta) * self.phi * trend;
        }
        let residual_std = if error_count >= 2 {
            (squared_errors / (error_count - 1) as f64).sqrt()
        } else {
            0.0
        };

        let mut estimates = Vec::with_capacity(horizon);
        let mut damped_sum = 0.0;
        let mut damp = self.phi;
        for _ in 0..horizon {
            damped_sum += damp;
            damp *= self.phi;
            estimates.push(level + damped_sum * trend);
        }

        Ok(
            ModelFit::new(estimates, vec![residual_std; horizon], series.len())
                .with_trend_slope(trend),
        )
    }

    fn method(&self) -> MethodId {
        MethodId::TrendSmoothing
    }
}
