//! Trend detection via least-squares regression on the period index.

use crate::stats::{self, LinearFit};

/// Maximum slope p-value for a trend to count as significant.
pub const TREND_P_VALUE_MAX: f64 = 0.1;

/// Minimum R² for a trend to count as significant.
pub const TREND_R_SQUARED_MIN: f64 = 0.3;

/// Fewer points than this and no trend is reported; a regression on two or
/// three points fits almost anything exactly.
pub const MIN_TREND_POINTS: usize = 4;

/// Direction of a detected trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    #[default]
    None,
}

impl TrendDirection {
    pub fn label(&self) -> &'static str {
        match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::None => "none",
        }
    }
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Trend measurements for one series.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendProfile {
    /// Significant per the p-value and R² thresholds.
    pub has_trend: bool,
    pub direction: TrendDirection,
    /// R² of the fit, reported whether or not the trend is significant.
    pub strength: f64,
    /// Slope per period.
    pub slope: f64,
}

impl TrendProfile {
    fn flat() -> Self {
        Self {
            has_trend: false,
            direction: TrendDirection::None,
            strength: 0.0,
            slope: 0.0,
        }
    }
}

/// Measures the linear trend of a series.
pub fn assess(values: &[f64]) -> TrendProfile {
    if values.len() < MIN_TREND_POINTS {
        return TrendProfile::flat();
    }
    let Some(fit) = stats::linear_fit(values) else {
        return TrendProfile::flat();
    };
    profile_from_fit(&fit)
}

fn profile_from_fit(fit: &LinearFit) -> TrendProfile {
    let has_trend = fit.p_value < TREND_P_VALUE_MAX
        && fit.r_squared > TREND_R_SQUARED_MIN
        && fit.slope.abs() > 1e-12;
    let direction = if !has_trend {
        TrendDirection::None
    } else if fit.slope > 0.0 {
        TrendDirection::Increasing
    } else {
        TrendDirection::Decreasing
    };
    TrendProfile {
        has_trend,
        direction,
        strength: fit.r_squared.clamp(0.0, 1.0),
        slope: fit.slope,
    }
}
