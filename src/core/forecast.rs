//! Forecast result types returned by the pipeline.

use crate::classify::SeriesClassification;
use crate::selection::{MethodId, MethodRecommendation};
use std::fmt;

/// Why a forecast step was produced by something other than the selected
/// method.
#[derive(Debug, Clone, PartialEq)]
pub enum Fallback {
    /// No usable observations; the horizon is filled with zeros.
    NoData,
    /// The selected method's minimum data requirement was not met; a simple
    /// moving average was substituted.
    MinimumDataNotMet { method: MethodId },
    /// The selected method failed numerically; a simple moving average was
    /// substituted.
    ExecutionFailed { method: MethodId, reason: String },
}

impl fmt::Display for Fallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fallback::NoData => write!(f, "no_data"),
            Fallback::MinimumDataNotMet { method } => {
                write!(f, "minimum_data_not_met({method})")
            }
            Fallback::ExecutionFailed { method, reason } => {
                write!(f, "execution_failed({method}: {reason})")
            }
        }
    }
}

/// Diagnostic fields attached to every forecast step.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastMetadata {
    /// Number of historical periods the estimate was computed from.
    pub periods_used: usize,
    /// Present when the estimate did not come from the selected method.
    pub fallback: Option<Fallback>,
    /// Multiplicative seasonal index applied to this step, if any.
    pub seasonal_factor: Option<f64>,
    /// Fitted trend slope per period, if a trend was used.
    pub trend_slope: Option<f64>,
    /// Safety-margin multiplier (>= 1) for downstream safety-stock sizing.
    pub safety_factor: f64,
    /// Set when a ratio or CV computation degenerated to zero.
    pub degenerate_stats: bool,
}

impl Default for ForecastMetadata {
    fn default() -> Self {
        Self {
            periods_used: 0,
            fallback: None,
            seasonal_factor: None,
            trend_slope: None,
            safety_factor: 1.0,
            degenerate_stats: false,
        }
    }
}

/// One future period's forecast.
///
/// The point estimate is clamped to be non-negative at construction; demand
/// below zero is not meaningful.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    /// Expected demand for the period.
    pub point_estimate: f64,
    /// Standard-deviation-like uncertainty of the estimate.
    pub dispersion_estimate: f64,
    /// Method that produced the estimate.
    pub method_used: MethodId,
    /// Diagnostics for downstream consumers.
    pub metadata: ForecastMetadata,
}

impl ForecastResult {
    /// Creates a result with default metadata, clamping the estimates to be
    /// non-negative.
    pub fn new(point_estimate: f64, dispersion_estimate: f64, method_used: MethodId) -> Self {
        let point = if point_estimate.is_finite() {
            point_estimate.max(0.0)
        } else {
            0.0
        };
        let dispersion = if dispersion_estimate.is_finite() {
            dispersion_estimate.max(0.0)
        } else {
            0.0
        };
        Self {
            point_estimate: point,
            dispersion_estimate: dispersion,
            method_used,
            metadata: ForecastMetadata::default(),
        }
    }

    /// Replaces the metadata, builder style.
    pub fn with_metadata(mut self, metadata: ForecastMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Everything one pipeline run produces: the per-step forecasts plus the
/// classification and method recommendation they were derived from.
#[derive(Debug, Clone)]
pub struct ForecastOutcome {
    /// One entry per future period, in order.
    pub forecasts: Vec<ForecastResult>,
    /// Statistical characterization of the corrected history.
    pub classification: SeriesClassification,
    /// The method decision, with confidence, rationale, and alternatives.
    pub recommendation: MethodRecommendation,
}

impl ForecastOutcome {
    /// Total expected demand across the horizon.
    pub fn total_demand(&self) -> f64 {
        self.forecasts.iter().map(|f| f.point_estimate).sum()
    }
}
