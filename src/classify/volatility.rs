//! Volatility classification from the coefficient of variation.

use crate::stats;

/// CV below this is low volatility.
pub const CV_LOW_MAX: f64 = 0.3;

/// CV below this (and at least `CV_LOW_MAX`) is medium volatility.
pub const CV_MEDIUM_MAX: f64 = 0.7;

/// Volatility category of a demand series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VolatilityClass {
    #[default]
    Low,
    Medium,
    High,
}

impl VolatilityClass {
    pub fn label(&self) -> &'static str {
        match self {
            VolatilityClass::Low => "low",
            VolatilityClass::Medium => "medium",
            VolatilityClass::High => "high",
        }
    }

    fn from_cv(cv: f64) -> Self {
        if cv < CV_LOW_MAX {
            VolatilityClass::Low
        } else if cv < CV_MEDIUM_MAX {
            VolatilityClass::Medium
        } else {
            VolatilityClass::High
        }
    }
}

impl std::fmt::Display for VolatilityClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Volatility measurements for one series.
#[derive(Debug, Clone, PartialEq)]
pub struct VolatilityProfile {
    pub class: VolatilityClass,
    /// Coefficient of variation of the positive observations; 0 when it
    /// could not be computed.
    pub cv: f64,
    pub degenerate: bool,
}

/// Measures volatility as the CV of the positive observations.
pub fn assess(values: &[f64]) -> VolatilityProfile {
    let positives: Vec<f64> = values.iter().copied().filter(|&v| v > 0.0).collect();
    match stats::coefficient_of_variation(&positives) {
        Some(cv) => VolatilityProfile {
            class: VolatilityClass::from_cv(cv),
            cv,
            degenerate: false,
        },
        None => VolatilityProfile {
            class: VolatilityClass::Low,
            cv: 0.0,
            degenerate: true,
        },
    }
}
