//! Ordinary least squares trend projection.

use crate::error::{DemandError, Result};
use crate::selection::MethodId;
use crate::stats;

use super::{DemandModel, ModelFit};

/// Straight-line fit over the whole series, extrapolated into the horizon.
///
/// The dispersion is the residual standard deviation with two degrees of
/// freedom consumed by the slope and intercept. Negative extrapolations are
/// clamped to zero, so a steep decline bottoms out instead of predicting
/// negative demand.
#[derive(Debug, Clone, Default)]
pub struct LinearTrendModel;

impl LinearTrendModel {
    pub fn new() -> Self {
        Self
    }
}

impl DemandModel for LinearTrendModel {
    fn min_observations(&self) -> usize {
        3
    }

    fn fit_and_predict(&self, series: &[f64], horizon: usize) -> Result<ModelFit> {
        let n = series.len();
        if n < self.min_observations() {
            return Err(DemandError::InsufficientData {
                needed: self.min_observations(),
                got: n,
            });
        }
        let fit = stats::linear_fit(series).ok_or_else(|| {
            DemandError::ComputationError("linear fit is undefined for this series".into())
        })?;

        let residual_sq: f64 = series
            .iter()
            .enumerate()
            .map(|(i, &y)| {
                let r = y - fit.predict(i as f64);
                r * r
            })
            .sum();
        let residual_std = (residual_sq / (n - 2) as f64).sqrt();

        let estimates: Vec<f64> = (0..horizon).map(|h| fit.predict((n + h) as f64)).collect();

        Ok(
            ModelFit::new(estimates, vec![residual_std; horizon], n)
                .with_trend_slope(fit.slope),
        )
    }

    fn method(&self) -> MethodId {
        MethodId::LinearTrend
    }
}
