//! Forecasting for series too short for the standard method library.
//!
//! History is bucketed into tiers scaled to the granularity: roughly up to
//! two months of periods is very short, up to six months is short, up to
//! eleven months is medium, and a full year onward flows through the
//! standard selector. Each tier trades statistical rigor for robustness,
//! leaning on a peer prior when one is available and inflating the safety
//! factor to cover the remaining uncertainty.

use tracing::debug;

use crate::core::Granularity;
use crate::models::{
    DemandModel, ExponentialSmoothing, LinearTrendModel, ModelFit, Tsb, WeightedMovingAverage,
};
use crate::selection::MethodId;
use crate::stats;

/// Zero share above which a short series is treated as intermittent.
const SHORT_INTERMITTENT_ZERO_RATIO: f64 = 0.3;
/// Absolute correlation above which a medium series gets a trend fit.
const MEDIUM_TREND_CORRELATION_MIN: f64 = 0.5;
/// Coefficient of variation above which a medium series gets smoothing.
const MEDIUM_VOLATILE_CV_MIN: f64 = 0.5;

/// Observed-side weight per period when blending toward a peer prior.
const OBSERVED_WEIGHT_PER_PERIOD: f64 = 0.15;
/// Cap on the observed-side weight, keeping some prior influence.
const OBSERVED_WEIGHT_MAX: f64 = 0.8;

/// Weight of a single observation against the peer prior.
const SINGLE_POINT_OBSERVED_WEIGHT: f64 = 0.3;

/// Relative dispersion for a very short series anchored by a prior.
const VERY_SHORT_DISPERSION_ANCHORED: f64 = 0.3;
/// Relative dispersion for a very short series with no prior.
const VERY_SHORT_DISPERSION_UNANCHORED: f64 = 0.5;

/// Bounds on the recent-direction adjustment for short intermittent series.
const DIRECTION_DECAY_FLOOR: f64 = 0.1;
const DIRECTION_GROWTH_CAP: f64 = 1.5;
/// Half-over-half ratios inside this band are treated as noise.
const DIRECTION_DEAD_BAND: (f64, f64) = (0.85, 1.15);

/// How much history a series carries relative to its granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryTier {
    /// Around two months of periods or fewer.
    VeryShort,
    /// Up to roughly half a year.
    Short,
    /// Up to just under a full year.
    Medium,
    /// Enough history for the standard selector.
    Standard,
}

/// Upper bound of each short tier, in periods of the given granularity.
fn tier_bounds(granularity: Granularity) -> (usize, usize, usize) {
    match granularity {
        Granularity::Monthly => (2, 6, 11),
        Granularity::Weekly => (8, 26, 47),
        Granularity::Daily => (60, 180, 330),
    }
}

impl HistoryTier {
    /// Buckets a series length for its granularity.
    pub fn for_series(n: usize, granularity: Granularity) -> Self {
        let (very_short, short, medium) = tier_bounds(granularity);
        if n <= very_short {
            Self::VeryShort
        } else if n <= short {
            Self::Short
        } else if n <= medium {
            Self::Medium
        } else {
            Self::Standard
        }
    }

    /// Whether this tier bypasses the standard method selector.
    pub fn intercepts(self) -> bool {
        self != Self::Standard
    }

    /// Multiplier applied on top of the estimate when sizing buffers.
    /// Always at least 1.
    pub fn safety_factor(self) -> f64 {
        match self {
            Self::VeryShort => 1.5,
            Self::Short => 1.3,
            Self::Medium => 1.15,
            Self::Standard => 1.0,
        }
    }

    /// Confidence attached to forecasts made at this tier.
    pub fn confidence(self) -> f64 {
        match self {
            Self::VeryShort => 0.30,
            Self::Short => 0.45,
            Self::Medium => 0.55,
            Self::Standard => 1.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::VeryShort => "very_short",
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Standard => "standard",
        }
    }
}

impl std::fmt::Display for HistoryTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A forecast made below the standard-history threshold.
#[derive(Debug, Clone)]
pub struct ShortSeriesForecast {
    pub fit: ModelFit,
    /// Nearest named method to what actually ran.
    pub method: MethodId,
    pub tier: HistoryTier,
    pub rationale: String,
}

/// Forecasts a series that falls below the standard-history threshold.
///
/// Never fails: whatever the data looks like, some estimate comes back,
/// with the tier's confidence and safety factor signalling how much it
/// should be trusted.
pub fn forecast_short_series(
    series: &[f64],
    horizon: usize,
    tier: HistoryTier,
    prior: Option<f64>,
) -> ShortSeriesForecast {
    debug_assert!(tier.intercepts(), "standard-tier series take the selector path");
    let result = match tier {
        HistoryTier::VeryShort => very_short(series, horizon, prior),
        HistoryTier::Short => short(series, horizon, prior),
        _ => medium(series, horizon),
    };
    debug!(
        tier = %result.tier,
        method = %result.method,
        periods = series.len(),
        has_prior = prior.is_some(),
        "short-series forecast"
    );
    result
}

/// One or two periods: barely more than a guess, so the peer prior carries
/// most of the weight when present.
fn very_short(series: &[f64], horizon: usize, prior: Option<f64>) -> ShortSeriesForecast {
    let n = series.len();
    let observed = stats::mean(series);
    let observed = if observed.is_finite() { observed } else { 0.0 };

    let (estimate, relative_spread, rationale) = match prior {
        Some(prior) if n <= 1 => (
            SINGLE_POINT_OBSERVED_WEIGHT * observed + (1.0 - SINGLE_POINT_OBSERVED_WEIGHT) * prior,
            VERY_SHORT_DISPERSION_ANCHORED,
            format!("{n} observed period(s); peer prior carries most of the estimate"),
        ),
        Some(prior) => (
            0.5 * observed + 0.5 * prior,
            VERY_SHORT_DISPERSION_ANCHORED,
            format!("{n} observed periods blended evenly with the peer prior"),
        ),
        None => (
            observed,
            VERY_SHORT_DISPERSION_UNANCHORED,
            format!("{n} observed period(s) and no peer prior; wide dispersion"),
        ),
    };

    let fit = ModelFit::flat(estimate, estimate.max(0.0) * relative_spread, horizon, n);
    ShortSeriesForecast {
        fit,
        method: MethodId::SimpleMovingAverage,
        tier: HistoryTier::VeryShort,
        rationale,
    }
}

/// A few months of history: occurrence smoothing for intermittent series
/// with a half-over-half direction adjustment, weighted averaging blended
/// toward the prior otherwise.
fn short(series: &[f64], horizon: usize, prior: Option<f64>) -> ShortSeriesForecast {
    let n = series.len();
    let zero_ratio = zero_share(series);

    if zero_ratio > SHORT_INTERMITTENT_ZERO_RATIO {
        let base = Tsb::new()
            .fit_and_predict(series, horizon)
            .unwrap_or_else(|_| ModelFit::zeros(horizon));
        let factor = direction_factor(series);
        let estimates = base.estimates.iter().map(|&e| e * factor).collect();
        let dispersions = base.dispersions.iter().map(|&d| d * factor).collect();
        return ShortSeriesForecast {
            fit: ModelFit::new(estimates, dispersions, n),
            method: MethodId::Tsb,
            tier: HistoryTier::Short,
            rationale: format!(
                "{n} periods, {:.0}% zeros; occurrence smoothing with a {factor:.2}x recent-direction adjustment",
                zero_ratio * 100.0
            ),
        };
    }

    let base = WeightedMovingAverage::new()
        .fit_and_predict(series, horizon)
        .unwrap_or_else(|_| ModelFit::zeros(horizon));
    let (fit, rationale) = match prior {
        Some(prior) => {
            let observed_weight = (OBSERVED_WEIGHT_PER_PERIOD * n as f64).min(OBSERVED_WEIGHT_MAX);
            let estimates = base
                .estimates
                .iter()
                .map(|&e| observed_weight * e + (1.0 - observed_weight) * prior)
                .collect();
            (
                ModelFit::new(estimates, base.dispersions.clone(), n),
                format!(
                    "{n} periods; weighted average at {:.0}% observed weight against the peer prior",
                    observed_weight * 100.0
                ),
            )
        }
        None => (
            base,
            format!("{n} periods and no peer prior; weighted average of recent demand"),
        ),
    };
    ShortSeriesForecast {
        fit,
        method: MethodId::WeightedMovingAverage,
        tier: HistoryTier::Short,
        rationale,
    }
}

/// Most of a year: enough signal to pick between real methods, still too
/// little for seasonal work.
fn medium(series: &[f64], horizon: usize) -> ShortSeriesForecast {
    let n = series.len();
    let zero_ratio = zero_share(series);
    let correlation = stats::linear_fit(series)
        .map(|fit| fit.correlation())
        .unwrap_or(0.0);
    let cv = stats::coefficient_of_variation(series).unwrap_or(0.0);

    let (model, rationale): (Box<dyn DemandModel>, String) =
        if zero_ratio > SHORT_INTERMITTENT_ZERO_RATIO {
            (
                Box::new(Tsb::new()),
                format!("{n} periods, {:.0}% zeros; occurrence smoothing", zero_ratio * 100.0),
            )
        } else if correlation.abs() > MEDIUM_TREND_CORRELATION_MIN {
            (
                Box::new(LinearTrendModel::new()),
                format!("{n} periods with correlation {correlation:.2}; straight-line projection"),
            )
        } else if cv > MEDIUM_VOLATILE_CV_MIN {
            (
                Box::new(ExponentialSmoothing::new()),
                format!("{n} volatile periods (CV {cv:.2}); exponential smoothing"),
            )
        } else {
            (
                Box::new(WeightedMovingAverage::new()),
                format!("{n} steady periods; weighted average of recent demand"),
            )
        };

    let method = model.method();
    let fit = model
        .fit_and_predict(series, horizon)
        .or_else(|_| WeightedMovingAverage::new().fit_and_predict(series, horizon))
        .unwrap_or_else(|_| ModelFit::zeros(horizon));
    ShortSeriesForecast {
        fit,
        method,
        tier: HistoryTier::Medium,
        rationale,
    }
}

fn zero_share(series: &[f64]) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    series.iter().filter(|&&v| v == 0.0).count() as f64 / series.len() as f64
}

/// Ratio of the second half's mean to the first half's, mapped to a
/// multiplicative adjustment. Ratios near 1 are noise; clear decay or
/// growth is applied with conservative bounds.
fn direction_factor(series: &[f64]) -> f64 {
    let mid = series.len() / 2;
    let first = stats::mean(&series[..mid]);
    let second = stats::mean(&series[mid..]);
    if !(first.is_finite() && second.is_finite()) {
        return 1.0;
    }
    if first <= 1e-10 {
        return if second > 1e-10 {
            DIRECTION_GROWTH_CAP
        } else {
            1.0
        };
    }
    let ratio = second / first;
    if ratio >= DIRECTION_DEAD_BAND.0 && ratio <= DIRECTION_DEAD_BAND.1 {
        1.0
    } else {
        ratio.clamp(DIRECTION_DECAY_FLOOR, DIRECTION_GROWTH_CAP)
    }
}
