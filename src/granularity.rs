//! Aligning forecasts across period granularities.
//!
//! Observations arrive at whatever cadence the sales history was bucketed
//! at; the caller may want the forecast at another one. Everything routes
//! through a per-day demand rate: the native estimate divided by the
//! observed mean period length, multiplied back up by the nominal length
//! of the target period. Dispersions scale with the square root of the
//! day ratio, treating days as independent contributions.

use tracing::warn;

use crate::core::{Granularity, PeriodObservation};
use crate::models::ModelFit;

/// Mean period length at or below which a series is natively daily.
const DAILY_MEAN_DAYS_MAX: f64 = 1.5;
/// Mean period length at or below which a series is natively weekly.
const WEEKLY_MEAN_DAYS_MAX: f64 = 10.0;

/// Default relative tolerance for the cross-granularity consistency check.
pub const DEFAULT_RATE_TOLERANCE: f64 = 0.10;

/// Mean observed period length in days, or the monthly nominal length when
/// there are no observations.
pub fn mean_period_days(observations: &[PeriodObservation]) -> f64 {
    if observations.is_empty() {
        return Granularity::Monthly.approx_days();
    }
    let total: f64 = observations.iter().map(|o| o.days_in_period).sum();
    total / observations.len() as f64
}

/// Infers the cadence the observations were bucketed at from their mean
/// period length.
pub fn infer_native(observations: &[PeriodObservation]) -> Granularity {
    let mean_days = mean_period_days(observations);
    if mean_days <= DAILY_MEAN_DAYS_MAX {
        Granularity::Daily
    } else if mean_days <= WEEKLY_MEAN_DAYS_MAX {
        Granularity::Weekly
    } else {
        Granularity::Monthly
    }
}

/// Rescales a fit from the native cadence to the requested one.
///
/// A fit already at the target granularity passes through unchanged; the
/// observed mean period length is never reinterpreted as the nominal one.
pub fn align_forecast(
    fit: &ModelFit,
    native: Granularity,
    native_mean_days: f64,
    target: Granularity,
) -> ModelFit {
    if native == target {
        return fit.clone();
    }
    let per_native_days = if native_mean_days > 0.0 {
        native_mean_days
    } else {
        native.approx_days()
    };
    let day_ratio = target.approx_days() / per_native_days;

    let estimates = fit.estimates.iter().map(|&e| e * day_ratio).collect();
    let dispersions = fit
        .dispersions
        .iter()
        .map(|&d| d * day_ratio.sqrt())
        .collect();
    let mut aligned = ModelFit::new(estimates, dispersions, fit.periods_used);
    if let Some(factors) = &fit.seasonal_factors {
        aligned = aligned.with_seasonal_factors(factors.clone());
    }
    if let Some(slope) = fit.trend_slope {
        aligned = aligned.with_trend_slope(slope * day_ratio);
    }
    aligned
}

/// Outcome of comparing two per-period estimates through their daily rates.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsistencyReport {
    pub first_daily_rate: f64,
    pub second_daily_rate: f64,
    /// Gap between the rates relative to the larger of the two.
    pub relative_difference: f64,
    pub within_tolerance: bool,
}

/// Compares two estimates of the same demand made at different
/// granularities. A violation is logged, never raised: granularity
/// disagreement is a data-quality signal, not a failure.
pub fn check_consistency(
    first_estimate: f64,
    first: Granularity,
    second_estimate: f64,
    second: Granularity,
    tolerance: f64,
) -> ConsistencyReport {
    let first_daily_rate = first_estimate / first.approx_days();
    let second_daily_rate = second_estimate / second.approx_days();
    let scale = first_daily_rate.abs().max(second_daily_rate.abs());
    let relative_difference = if scale > 1e-10 {
        (first_daily_rate - second_daily_rate).abs() / scale
    } else {
        0.0
    };
    let within_tolerance = relative_difference <= tolerance;
    if !within_tolerance {
        warn!(
            first_rate = first_daily_rate,
            second_rate = second_daily_rate,
            relative_difference,
            tolerance,
            "cross-granularity forecasts disagree on the daily demand rate"
        );
    }
    ConsistencyReport {
        first_daily_rate,
        second_daily_rate,
        relative_difference,
        within_tolerance,
    }
}
