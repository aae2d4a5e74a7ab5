//! The end-to-end forecast computation.
//!
//! One call wires the stages together: validate, correct for stock-outs,
//! classify, pick a method (or intercept a short history), run it, and
//! align the result to the requested granularity. Only malformed input is
//! a hard error; every data-quality problem downstream of validation
//! degrades to a simpler estimate and says so in the metadata.

use tracing::{debug, info};

use crate::classify;
use crate::core::{
    validate_observations, Fallback, ForecastMetadata, ForecastOutcome, ForecastResult,
    Granularity, PeriodObservation,
};
use crate::correction::{correct_stockouts, ImputationMode};
use crate::error::{DemandError, Result};
use crate::granularity::{align_forecast, infer_native, mean_period_days};
use crate::models::{self, ModelFit};
use crate::selection::{select, MethodId, MethodRecommendation};
use crate::short_series::{forecast_short_series, HistoryTier};

/// Tunable knobs of [`compute_forecast`]. The defaults match how the
/// pipeline is normally run; builders override one knob at a time.
#[derive(Debug, Clone, Default)]
pub struct ForecastConfig {
    imputation: ImputationMode,
    peer_prior: Option<f64>,
    cycle: Option<usize>,
}

impl ForecastConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// How fully stocked-out periods are imputed.
    pub fn with_imputation(mut self, mode: ImputationMode) -> Self {
        self.imputation = mode;
        self
    }

    /// Per-period demand estimate from similar products, used to anchor
    /// short histories.
    pub fn with_peer_prior(mut self, prior: f64) -> Self {
        self.peer_prior = Some(prior);
        self
    }

    /// Overrides the seasonal cycle length implied by the data's cadence.
    pub fn with_cycle(mut self, cycle: usize) -> Self {
        self.cycle = Some(cycle);
        self
    }

    fn validate(&self) -> Result<()> {
        if let Some(prior) = self.peer_prior {
            if !prior.is_finite() || prior < 0.0 {
                return Err(DemandError::InvalidParameter(format!(
                    "peer prior must be finite and non-negative, got {prior}"
                )));
            }
        }
        if let Some(cycle) = self.cycle {
            if cycle < 2 {
                return Err(DemandError::InvalidParameter(format!(
                    "seasonal cycle must be at least 2 periods, got {cycle}"
                )));
            }
        }
        Ok(())
    }
}

/// Forecasts demand for `horizon` future periods at the requested
/// granularity.
///
/// Observations are corrected for stock-outs, classified, and routed either
/// through the method selector or, for short histories, the tiered
/// short-series strategy. The computation runs at the cadence the data was
/// recorded at and is rescaled to `granularity` through the daily demand
/// rate.
///
/// Errors only on malformed input: an invalid observation or a zero
/// horizon. An empty history is valid and forecasts zero demand.
pub fn compute_forecast(
    observations: &[PeriodObservation],
    horizon: usize,
    granularity: Granularity,
    config: &ForecastConfig,
) -> Result<ForecastOutcome> {
    if horizon == 0 {
        return Err(DemandError::InvalidParameter(
            "horizon must be at least 1 period".into(),
        ));
    }
    config.validate()?;
    validate_observations(observations)?;

    let native = infer_native(observations);
    let native_days = mean_period_days(observations);
    let cycle = config.cycle.unwrap_or_else(|| native.cycle());
    info!(
        periods = observations.len(),
        native = %native,
        requested = %granularity,
        horizon,
        "computing forecast"
    );

    if observations.is_empty() {
        return Ok(no_data_outcome(horizon, cycle));
    }

    let corrected = correct_stockouts(observations, config.imputation);
    let values = corrected.values();
    let classification = classify::classify(&values, Some(cycle));
    debug!(
        intermittency = %classification.intermittency,
        volatility = %classification.volatility,
        has_trend = classification.has_trend,
        has_seasonality = classification.has_seasonality,
        "series classified"
    );

    let tier = HistoryTier::for_series(values.len(), native);
    let (fit, recommendation, fallback, safety_factor) = if tier.intercepts() {
        let short = forecast_short_series(&values, horizon, tier, config.peer_prior);
        let recommendation = MethodRecommendation {
            method: short.method,
            confidence: tier.confidence(),
            rationale: short.rationale,
            alternatives: Vec::new(),
        };
        (short.fit, recommendation, None, tier.safety_factor())
    } else {
        let recommendation = select(&classification);
        let (fit, fallback) = models::execute(recommendation.method, &values, horizon, cycle);
        (fit, recommendation, fallback, 1.0)
    };

    let aligned = align_forecast(&fit, native, native_days, granularity);
    let method_used = match &fallback {
        Some(_) => MethodId::SimpleMovingAverage,
        None => recommendation.method,
    };
    let forecasts = assemble(
        &aligned,
        method_used,
        fallback,
        safety_factor,
        classification.degenerate_stats,
    );
    info!(
        method = %method_used,
        confidence = recommendation.confidence,
        total = forecasts.iter().map(|f| f.point_estimate).sum::<f64>(),
        "forecast computed"
    );

    Ok(ForecastOutcome {
        forecasts,
        classification,
        recommendation,
    })
}

/// Outcome for an empty history: zero demand, flagged per step.
fn no_data_outcome(horizon: usize, cycle: usize) -> ForecastOutcome {
    let classification = classify::classify(&[], Some(cycle));
    let recommendation = select(&classification);
    let forecasts = (0..horizon)
        .map(|_| {
            ForecastResult::new(0.0, 0.0, MethodId::SimpleMovingAverage).with_metadata(
                ForecastMetadata {
                    fallback: Some(Fallback::NoData),
                    ..ForecastMetadata::default()
                },
            )
        })
        .collect();
    ForecastOutcome {
        forecasts,
        classification,
        recommendation,
    }
}

/// Expands a model fit into per-step results carrying shared metadata.
fn assemble(
    fit: &ModelFit,
    method: MethodId,
    fallback: Option<Fallback>,
    safety_factor: f64,
    degenerate_stats: bool,
) -> Vec<ForecastResult> {
    fit.estimates
        .iter()
        .zip(fit.dispersions.iter())
        .enumerate()
        .map(|(step, (&estimate, &dispersion))| {
            let metadata = ForecastMetadata {
                periods_used: fit.periods_used,
                fallback: fallback.clone(),
                seasonal_factor: fit.seasonal_factors.as_ref().map(|f| f[step]),
                trend_slope: fit.trend_slope,
                safety_factor,
                degenerate_stats,
            };
            ForecastResult::new(estimate, dispersion, method).with_metadata(metadata)
        })
        .collect()
}
