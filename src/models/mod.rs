//! The forecasting method library.
//!
//! One struct per method, all implementing [`DemandModel`]. Methods are
//! pure: `fit_and_predict` reads a series and a horizon and returns
//! per-step estimates with dispersions, holding no state between calls.
//! [`execute`] dispatches a [`MethodId`] exhaustively and degrades to a
//! simple moving average when a method cannot run, recording the
//! substitution instead of failing.

mod average;
mod intermittent;
mod seasonal;
mod smoothing;
mod trend;

pub use average::{default_window, SimpleMovingAverage, WeightedMovingAverage};
pub use intermittent::{Croston, CrostonVariant, Tsb};
pub use seasonal::{SeasonalDecomposition, SeasonalIndexModel, TrendHandling, MIN_SEASONAL_INDEX};
pub use smoothing::{ExponentialSmoothing, TrendSmoothing, DEFAULT_SMOOTHING_ALPHA};
pub use trend::LinearTrendModel;

use crate::core::Fallback;
use crate::error::Result;
use crate::selection::MethodId;
use tracing::{debug, warn};

/// Per-step estimates plus shared diagnostics from one model run.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelFit {
    /// Point estimates, one per future period, clamped non-negative.
    pub estimates: Vec<f64>,
    /// Dispersion (standard-deviation-like) estimates, one per period.
    pub dispersions: Vec<f64>,
    /// Historical periods the fit was computed from.
    pub periods_used: usize,
    /// Per-step multiplicative seasonal factors, when the method applied
    /// any.
    pub seasonal_factors: Option<Vec<f64>>,
    /// Fitted slope per period, when the method fit a trend.
    pub trend_slope: Option<f64>,
}

impl ModelFit {
    /// Builds a fit, clamping estimates and dispersions to be non-negative
    /// and finite.
    pub fn new(estimates: Vec<f64>, dispersions: Vec<f64>, periods_used: usize) -> Self {
        let sanitize = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
        Self {
            estimates: estimates.into_iter().map(sanitize).collect(),
            dispersions: dispersions.into_iter().map(sanitize).collect(),
            periods_used,
            seasonal_factors: None,
            trend_slope: None,
        }
    }

    /// A flat forecast repeating one estimate across the horizon.
    pub fn flat(estimate: f64, dispersion: f64, horizon: usize, periods_used: usize) -> Self {
        Self::new(
            vec![estimate; horizon],
            vec![dispersion; horizon],
            periods_used,
        )
    }

    /// All-zero estimates and dispersions.
    pub fn zeros(horizon: usize) -> Self {
        Self::new(vec![0.0; horizon], vec![0.0; horizon], 0)
    }

    pub fn with_seasonal_factors(mut self, factors: Vec<f64>) -> Self {
        self.seasonal_factors = Some(factors);
        self
    }

    pub fn with_trend_slope(mut self, slope: f64) -> Self {
        self.trend_slope = Some(slope);
        self
    }
}

/// Common interface for all forecasting methods.
pub trait DemandModel {
    /// Fewest observations the method can fit on.
    fn min_observations(&self) -> usize;

    /// Fits the series and predicts `horizon` future periods.
    fn fit_and_predict(&self, series: &[f64], horizon: usize) -> Result<ModelFit>;

    /// Which method this is.
    fn method(&self) -> MethodId;
}

/// Builds the default configuration of a method. Seasonal methods take the
/// cycle length; the rest ignore it.
pub fn build(method: MethodId, cycle: usize) -> Box<dyn DemandModel> {
    match method {
        MethodId::SimpleMovingAverage => Box::new(SimpleMovingAverage::new()),
        MethodId::WeightedMovingAverage => Box::new(WeightedMovingAverage::new()),
        MethodId::ExponentialSmoothing => Box::new(ExponentialSmoothing::new()),
        MethodId::TrendSmoothing => Box::new(TrendSmoothing::new()),
        MethodId::LinearTrend => Box::new(LinearTrendModel::new()),
        MethodId::SeasonalDecomposition => Box::new(SeasonalDecomposition::new(cycle)),
        MethodId::SeasonalIndex => Box::new(SeasonalIndexModel::new(cycle)),
        MethodId::SeasonalTrend => {
            Box::new(SeasonalDecomposition::new(cycle).with_trend(TrendHandling::Extrapolate))
        }
        MethodId::Tsb => Box::new(Tsb::new()),
        MethodId::Croston => Box::new(Croston::new()),
        MethodId::Sba => Box::new(Croston::new().sba()),
    }
}

/// Runs a method over a series, substituting a simple moving average when
/// the method cannot run. The substitution (or data shortfall) is returned
/// alongside the fit; nothing here is a fatal error.
pub fn execute(
    method: MethodId,
    series: &[f64],
    horizon: usize,
    cycle: usize,
) -> (ModelFit, Option<Fallback>) {
    let model = build(method, cycle);

    if series.len() < model.min_observations() {
        warn!(
            method = %method,
            needed = model.min_observations(),
            got = series.len(),
            "minimum data requirement not met; substituting simple moving average"
        );
        return (
            moving_average_fallback(series, horizon),
            Some(Fallback::MinimumDataNotMet { method }),
        );
    }

    match model.fit_and_predict(series, horizon) {
        Ok(fit) => {
            debug!(method = %method, horizon = horizon, periods = series.len(), "method executed");
            (fit, None)
        }
        Err(err) => {
            warn!(method = %method, error = %err, "method failed; substituting simple moving average");
            (
                moving_average_fallback(series, horizon),
                Some(Fallback::ExecutionFailed {
                    method,
                    reason: err.to_string(),
                }),
            )
        }
    }
}

/// The degradation target: a simple moving average, or zeros when even that
/// cannot run.
fn moving_average_fallback(series: &[f64], horizon: usize) -> ModelFit {
    SimpleMovingAverage::new()
        .fit_and_predict(series, horizon)
        .unwrap_or_else(|_| ModelFit::zeros(horizon))
}
