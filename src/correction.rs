//! Stock-out-aware demand correction.
//!
//! Observed sales understate demand whenever the product was unavailable for
//! part of a period. Periods with partial availability are inflated
//! proportionally; fully stocked-out periods are imputed from comparable
//! periods because their true demand is unobservable.

use crate::core::PeriodObservation;
use crate::stats;
use chrono::{Datelike, NaiveDate};

/// Availability ratio a period needs before it can donate its demand
/// estimate to an imputation.
const RELIABLE_AVAILABILITY_MIN: f64 = 0.5;

/// How many recent well-stocked periods the moving-average imputation uses.
const RECENT_DONOR_COUNT: usize = 3;

/// Imputation preference for fully stocked-out periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImputationMode {
    /// Impute from the most recent well-stocked periods, falling back to the
    /// overall well-stocked mean.
    #[default]
    MovingAverage,
    /// Prefer the same calendar month across history before the
    /// moving-average chain.
    SeasonalAverage,
}

/// One period of the corrected series.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectedPeriod {
    /// Period start date.
    pub period: NaiveDate,
    /// Sales as observed.
    pub original_quantity: f64,
    /// Estimated demand absent stock-outs. Never below the original.
    pub corrected_quantity: f64,
    /// Fraction of the period with stock, in [0, 1].
    pub availability_ratio: f64,
}

/// Ordered sequence of corrected periods.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrectedSeries {
    periods: Vec<CorrectedPeriod>,
}

impl CorrectedSeries {
    /// The corrected periods in input order.
    pub fn periods(&self) -> &[CorrectedPeriod] {
        &self.periods
    }

    /// The corrected quantities as a plain series for classification and
    /// forecasting.
    pub fn values(&self) -> Vec<f64> {
        self.periods.iter().map(|p| p.corrected_quantity).collect()
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}

/// Corrects a sales history for stock-outs.
///
/// Where the availability ratio is positive the observed quantity is divided
/// by it. Where it is zero the demand is imputed: `MovingAverage` mode tries
/// the mean of up to three most recent well-stocked prior periods, then the
/// overall well-stocked mean, then zero; `SeasonalAverage` mode first tries
/// the mean of other well-stocked periods in the same calendar month.
/// Imputed values are floored at the observed quantity. An empty input
/// yields an empty series.
pub fn correct_stockouts(
    observations: &[PeriodObservation],
    mode: ImputationMode,
) -> CorrectedSeries {
    let periods = observations
        .iter()
        .enumerate()
        .map(|(idx, obs)| {
            let ratio = obs.availability_ratio();
            let corrected = if ratio > 0.0 {
                obs.quantity_sold / ratio
            } else {
                impute(observations, idx, mode).max(obs.quantity_sold)
            };
            CorrectedPeriod {
                period: obs.period,
                original_quantity: obs.quantity_sold,
                corrected_quantity: corrected,
                availability_ratio: ratio,
            }
        })
        .collect();
    CorrectedSeries { periods }
}

/// Demand estimate of a well-stocked donor period.
fn donor_estimate(obs: &PeriodObservation) -> f64 {
    obs.quantity_sold / obs.availability_ratio()
}

fn impute(observations: &[PeriodObservation], idx: usize, mode: ImputationMode) -> f64 {
    let chain = match mode {
        ImputationMode::MovingAverage => recent_mean(observations, idx)
            .or_else(|| reliable_mean(observations)),
        ImputationMode::SeasonalAverage => same_month_mean(observations, idx)
            .or_else(|| recent_mean(observations, idx))
            .or_else(|| reliable_mean(observations)),
    };
    chain.unwrap_or(0.0)
}

/// Mean demand of up to three most recent well-stocked periods strictly
/// before `idx`.
fn recent_mean(observations: &[PeriodObservation], idx: usize) -> Option<f64> {
    let donors: Vec<f64> = observations[..idx]
        .iter()
        .rev()
        .filter(|o| o.availability_ratio() > RELIABLE_AVAILABILITY_MIN)
        .take(RECENT_DONOR_COUNT)
        .map(donor_estimate)
        .collect();
    if donors.is_empty() {
        None
    } else {
        Some(stats::mean(&donors))
    }
}

/// Mean demand of well-stocked periods sharing the calendar month of `idx`.
fn same_month_mean(observations: &[PeriodObservation], idx: usize) -> Option<f64> {
    let month = observations[idx].period.month();
    let donors: Vec<f64> = observations
        .iter()
        .enumerate()
        .filter(|(i, o)| {
            *i != idx
                && o.period.month() == month
                && o.availability_ratio() > RELIABLE_AVAILABILITY_MIN
        })
        .map(|(_, o)| donor_estimate(o))
        .collect();
    if donors.is_empty() {
        None
    } else {
        Some(stats::mean(&donors))
    }
}

/// Mean demand of every well-stocked period in the history.
fn reliable_mean(observations: &[PeriodObservation]) -> Option<f64> {
    let donors: Vec<f64> = observations
        .iter()
        .filter(|o| o.availability_ratio() > RELIABLE_AVAILABILITY_MIN)
        .map(donor_estimate)
        .collect();
    if donors.is_empty() {
        None
    } else {
        Some(stats::mean(&donors))
    }
}
