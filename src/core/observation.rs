//! Period observations and reporting granularities.

use crate::error::{DemandError, Result};
use chrono::NaiveDate;

/// Reporting granularity of a demand series or forecast request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Granularity {
    /// One observation per day.
    Daily,
    /// One observation per week.
    Weekly,
    /// One observation per calendar month.
    #[default]
    Monthly,
}

impl Granularity {
    /// Nominal number of days covered by one period at this granularity.
    pub fn approx_days(&self) -> f64 {
        match self {
            Granularity::Daily => 1.0,
            Granularity::Weekly => 7.0,
            Granularity::Monthly => 30.0,
        }
    }

    /// Natural seasonal cycle length, in periods, at this granularity.
    pub fn cycle(&self) -> usize {
        match self {
            Granularity::Daily => 7,
            Granularity::Weekly => 52,
            Granularity::Monthly => 12,
        }
    }

    /// Lowercase label used in rationale strings and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Granularity::Daily => "daily",
            Granularity::Weekly => "weekly",
            Granularity::Monthly => "monthly",
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One reporting period of sales history for a product/location pair.
///
/// `days_with_stock` counts the days of the period during which the product
/// was available for sale; the gap to `days_in_period` is time lost to
/// stock-outs. Day counts are fractional to allow partial-day availability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodObservation {
    /// Start date identifying the period.
    pub period: NaiveDate,
    /// Units sold during the period.
    pub quantity_sold: f64,
    /// Days of the period with stock available.
    pub days_with_stock: f64,
    /// Total days in the period.
    pub days_in_period: f64,
}

impl PeriodObservation {
    /// Creates a validated observation.
    ///
    /// Requires `quantity_sold >= 0`, `days_in_period > 0`,
    /// `0 <= days_with_stock <= days_in_period`, and all values finite.
    pub fn new(
        period: NaiveDate,
        quantity_sold: f64,
        days_with_stock: f64,
        days_in_period: f64,
    ) -> Result<Self> {
        let obs = Self {
            period,
            quantity_sold,
            days_with_stock,
            days_in_period,
        };
        match obs.invariant_violation() {
            Some(reason) => Err(DemandError::InvalidObservation(reason)),
            None => Ok(obs),
        }
    }

    /// Returns the violated invariant, if any. Used for batch validation
    /// where the caller prefixes the observation index.
    pub fn invariant_violation(&self) -> Option<String> {
        if !self.quantity_sold.is_finite()
            || !self.days_with_stock.is_finite()
            || !self.days_in_period.is_finite()
        {
            return Some("non-finite value".to_string());
        }
        if self.quantity_sold < 0.0 {
            return Some(format!("quantity_sold is negative ({})", self.quantity_sold));
        }
        if self.days_in_period <= 0.0 {
            return Some(format!(
                "days_in_period must be positive ({})",
                self.days_in_period
            ));
        }
        if self.days_with_stock < 0.0 {
            return Some(format!(
                "days_with_stock is negative ({})",
                self.days_with_stock
            ));
        }
        if self.days_with_stock > self.days_in_period {
            return Some(format!(
                "days_with_stock ({}) exceeds days_in_period ({})",
                self.days_with_stock, self.days_in_period
            ));
        }
        None
    }

    /// Fraction of the period with stock available, clamped to [0, 1].
    pub fn availability_ratio(&self) -> f64 {
        (self.days_with_stock / self.days_in_period).clamp(0.0, 1.0)
    }
}

/// Validates a batch of observations, reporting the first violation with
/// its index.
pub fn validate_observations(observations: &[PeriodObservation]) -> Result<()> {
    for (index, obs) in observations.iter().enumerate() {
        if let Some(reason) = obs.invariant_violation() {
            return Err(DemandError::InvalidObservation(format!(
                "index {index}: {reason}"
            )));
        }
    }
    Ok(())
}
