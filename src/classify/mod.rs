//! Statistical classification of demand series.
//!
//! Combines four independent assessments (intermittency, trend,
//! seasonality, volatility) plus a data-volume gate into one
//! [`SeriesClassification`] that drives method selection.

mod intermittency;
mod seasonality;
mod trend;
mod volatility;

pub use intermittency::{
    IntermittencyClass, IntermittencyProfile, ADI_SMOOTH_MAX, CV_SQUARED_SMOOTH_MAX,
    INTERMITTENT_ZERO_RATIO,
};
pub use seasonality::{seasonal_indices, SeasonalityProfile, ACF_THRESHOLD_FLOOR, DEFAULT_CYCLE};
pub use trend::{TrendDirection, TrendProfile, TREND_P_VALUE_MAX, TREND_R_SQUARED_MIN};
pub use volatility::{VolatilityClass, VolatilityProfile, CV_LOW_MAX, CV_MEDIUM_MAX};

/// Below this many periods the pipeline short-circuits to the short-series
/// strategies.
pub const VOLUME_MINIMAL_MIN: usize = 6;

/// At least this many periods counts as adequate history.
pub const VOLUME_ADEQUATE_MIN: usize = 12;

/// At least this many periods counts as abundant history.
pub const VOLUME_ABUNDANT_MIN: usize = 24;

/// How much history a series offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DataVolume {
    /// Fewer than 6 periods.
    Insufficient,
    /// 6 to 11 periods.
    Minimal,
    /// 12 to 23 periods.
    Adequate,
    /// 24 periods or more.
    Abundant,
}

impl DataVolume {
    pub fn from_len(n: usize) -> Self {
        if n < VOLUME_MINIMAL_MIN {
            DataVolume::Insufficient
        } else if n < VOLUME_ADEQUATE_MIN {
            DataVolume::Minimal
        } else if n < VOLUME_ABUNDANT_MIN {
            DataVolume::Adequate
        } else {
            DataVolume::Abundant
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DataVolume::Insufficient => "insufficient",
            DataVolume::Minimal => "minimal",
            DataVolume::Adequate => "adequate",
            DataVolume::Abundant => "abundant",
        }
    }
}

impl std::fmt::Display for DataVolume {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Statistical characterization of one demand series.
///
/// Computed fresh per forecast request and never cached; the fields are
/// plain values so the struct can travel into reports unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesClassification {
    pub n_periods: usize,
    pub data_volume: DataVolume,
    pub intermittency: IntermittencyClass,
    /// Share of periods with zero demand.
    pub zero_ratio: f64,
    /// Average demand interval.
    pub adi: f64,
    /// Squared CV of non-zero demand sizes.
    pub cv_squared: f64,
    pub is_intermittent: bool,
    pub has_trend: bool,
    pub trend_direction: TrendDirection,
    /// R² of the trend fit.
    pub trend_strength: f64,
    /// Trend slope per period.
    pub trend_slope: f64,
    pub has_seasonality: bool,
    pub seasonal_period: Option<usize>,
    /// |autocorrelation| at the cycle lag.
    pub seasonal_strength: f64,
    /// Multiplicative indices, mean 1.0; empty without seasonality.
    pub seasonal_indices: Vec<f64>,
    pub volatility: VolatilityClass,
    /// CV of the positive observations.
    pub coefficient_of_variation: f64,
    /// Set when any ratio or CV degenerated to zero during classification.
    pub degenerate_stats: bool,
}

/// Classifies a corrected demand series.
///
/// `cycle` declares the seasonal cycle length in periods and defaults to 12
/// (months of a year). Pure function; an empty series classifies as
/// insufficient volume with every statistic degenerate to zero.
pub fn classify(values: &[f64], cycle: Option<usize>) -> SeriesClassification {
    let cycle = cycle.unwrap_or(DEFAULT_CYCLE);
    let n = values.len();

    let intermittency = intermittency::assess(values);
    let trend = trend::assess(values);
    let seasonality = seasonality::assess(values, cycle);
    let volatility = volatility::assess(values);

    SeriesClassification {
        n_periods: n,
        data_volume: DataVolume::from_len(n),
        intermittency: intermittency.class,
        zero_ratio: intermittency.zero_ratio,
        adi: intermittency.adi,
        cv_squared: intermittency.cv_squared,
        is_intermittent: intermittency.is_intermittent,
        has_trend: trend.has_trend,
        trend_direction: trend.direction,
        trend_strength: trend.strength,
        trend_slope: trend.slope,
        has_seasonality: seasonality.has_seasonality,
        seasonal_period: seasonality.period,
        seasonal_strength: seasonality.strength,
        seasonal_indices: seasonality.indices,
        volatility: volatility.class,
        coefficient_of_variation: volatility.cv,
        degenerate_stats: intermittency.degenerate || volatility.degenerate,
    }
}
