//! Method selection: a deterministic decision table over classifications.
//!
//! Replaces string-keyed method lookup with a closed enum so every dispatch
//! is matched exhaustively at compile time.

use crate::classify::{DataVolume, IntermittencyClass, SeriesClassification, VolatilityClass};

/// Trend strength (R²) at or above which a plain linear regression is
/// preferred over trend-aware smoothing.
pub const TREND_STRONG_MIN: f64 = 0.6;

const CONFIDENCE_INSUFFICIENT: f64 = 0.40;
const CONFIDENCE_INTERMITTENT: f64 = 0.75;
const CONFIDENCE_SEASONAL_TREND: f64 = 0.85;
const CONFIDENCE_SEASONAL_FULL: f64 = 0.80;
const CONFIDENCE_SEASONAL_LIGHT: f64 = 0.65;
const CONFIDENCE_TREND_STRONG: f64 = 0.80;
const CONFIDENCE_TREND_SMOOTH: f64 = 0.70;
const CONFIDENCE_STABLE_LOW: f64 = 0.75;
const CONFIDENCE_STABLE_MEDIUM: f64 = 0.70;
const CONFIDENCE_STABLE_HIGH: f64 = 0.60;

/// Every forecasting method the library can execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodId {
    SimpleMovingAverage,
    WeightedMovingAverage,
    ExponentialSmoothing,
    /// Level-plus-trend smoothing with dampened extrapolation.
    TrendSmoothing,
    LinearTrend,
    SeasonalDecomposition,
    /// Lightweight seasonal indices over a level, for shorter histories.
    SeasonalIndex,
    /// Seasonal decomposition with the trend always extrapolated.
    SeasonalTrend,
    Tsb,
    Croston,
    Sba,
}

impl MethodId {
    /// Stable identifier used in metadata and logs.
    pub fn id(&self) -> &'static str {
        match self {
            MethodId::SimpleMovingAverage => "simple_moving_average",
            MethodId::WeightedMovingAverage => "weighted_moving_average",
            MethodId::ExponentialSmoothing => "exponential_smoothing",
            MethodId::TrendSmoothing => "trend_smoothing",
            MethodId::LinearTrend => "linear_trend",
            MethodId::SeasonalDecomposition => "seasonal_decomposition",
            MethodId::SeasonalIndex => "seasonal_index",
            MethodId::SeasonalTrend => "seasonal_trend",
            MethodId::Tsb => "tsb",
            MethodId::Croston => "croston",
            MethodId::Sba => "sba",
        }
    }
}

impl std::fmt::Display for MethodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// The selector's decision: a method, how sure it is, why, and what to try
/// instead.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodRecommendation {
    pub method: MethodId,
    /// In [0, 1].
    pub confidence: f64,
    /// One sentence built from the triggering classification fields.
    pub rationale: String,
    /// Ordered fallbacks, one to three entries.
    pub alternatives: Vec<MethodId>,
}

/// Maps a classification to a method recommendation.
///
/// Pure and infallible: the branches below are evaluated in fixed
/// precedence order and the last one always matches.
pub fn select(classification: &SeriesClassification) -> MethodRecommendation {
    if classification.data_volume == DataVolume::Insufficient {
        return MethodRecommendation {
            method: MethodId::SimpleMovingAverage,
            confidence: CONFIDENCE_INSUFFICIENT,
            rationale: format!(
                "insufficient history ({} periods); falling back to a simple moving average",
                classification.n_periods
            ),
            alternatives: vec![MethodId::WeightedMovingAverage],
        };
    }

    if classification.is_intermittent {
        let (method, alternatives) = match classification.intermittency {
            IntermittencyClass::Lumpy => {
                (MethodId::Tsb, vec![MethodId::Sba, MethodId::Croston])
            }
            IntermittencyClass::Intermittent => {
                (MethodId::Croston, vec![MethodId::Tsb, MethodId::Sba])
            }
            _ => (MethodId::Sba, vec![MethodId::Tsb, MethodId::Croston]),
        };
        return MethodRecommendation {
            method,
            confidence: CONFIDENCE_INTERMITTENT,
            rationale: format!(
                "{} demand with {:.0}% zero periods (ADI {:.2}, squared CV {:.2}) calls for an intermittent-demand model",
                classification.intermittency,
                classification.zero_ratio * 100.0,
                classification.adi,
                classification.cv_squared
            ),
            alternatives,
        };
    }

    if classification.has_seasonality && classification.has_trend {
        return MethodRecommendation {
            method: MethodId::SeasonalTrend,
            confidence: CONFIDENCE_SEASONAL_TREND,
            rationale: format!(
                "seasonality at period {} combined with a significant {} trend favors seasonal decomposition with trend extrapolation",
                classification.seasonal_period.unwrap_or_default(),
                classification.trend_direction
            ),
            alternatives: vec![MethodId::SeasonalDecomposition, MethodId::LinearTrend],
        };
    }

    if classification.has_seasonality {
        let period = classification.seasonal_period.unwrap_or_default();
        if classification.n_periods >= crate::classify::VOLUME_ABUNDANT_MIN {
            return MethodRecommendation {
                method: MethodId::SeasonalDecomposition,
                confidence: CONFIDENCE_SEASONAL_FULL,
                rationale: format!(
                    "seasonality at period {} with {} periods of history supports full seasonal decomposition",
                    period, classification.n_periods
                ),
                alternatives: vec![MethodId::SeasonalIndex, MethodId::SimpleMovingAverage],
            };
        }
        return MethodRecommendation {
            method: MethodId::SeasonalIndex,
            confidence: CONFIDENCE_SEASONAL_LIGHT,
            rationale: format!(
                "seasonality at period {} but only {} periods of history; using lightweight seasonal indices",
                period, classification.n_periods
            ),
            alternatives: vec![MethodId::WeightedMovingAverage, MethodId::SimpleMovingAverage],
        };
    }

    if classification.has_trend {
        if classification.trend_strength > TREND_STRONG_MIN {
            return MethodRecommendation {
                method: MethodId::LinearTrend,
                confidence: CONFIDENCE_TREND_STRONG,
                rationale: format!(
                    "strong {} trend (R-squared {:.2}) fits a linear regression",
                    classification.trend_direction, classification.trend_strength
                ),
                alternatives: vec![MethodId::TrendSmoothing, MethodId::WeightedMovingAverage],
            };
        }
        return MethodRecommendation {
            method: MethodId::TrendSmoothing,
            confidence: CONFIDENCE_TREND_SMOOTH,
            rationale: format!(
                "moderate {} trend (R-squared {:.2}) favors trend-aware smoothing",
                classification.trend_direction, classification.trend_strength
            ),
            alternatives: vec![MethodId::LinearTrend, MethodId::ExponentialSmoothing],
        };
    }

    match classification.volatility {
        VolatilityClass::Low => MethodRecommendation {
            method: MethodId::SimpleMovingAverage,
            confidence: CONFIDENCE_STABLE_LOW,
            rationale: format!(
                "stable series with low volatility (CV {:.2}); a simple moving average suffices",
                classification.coefficient_of_variation
            ),
            alternatives: vec![MethodId::WeightedMovingAverage, MethodId::ExponentialSmoothing],
        },
        VolatilityClass::Medium => MethodRecommendation {
            method: MethodId::WeightedMovingAverage,
            confidence: CONFIDENCE_STABLE_MEDIUM,
            rationale: format!(
                "stable series with medium volatility (CV {:.2}); recent periods deserve more weight",
                classification.coefficient_of_variation
            ),
            alternatives: vec![MethodId::ExponentialSmoothing, MethodId::SimpleMovingAverage],
        },
        VolatilityClass::High => MethodRecommendation {
            method: MethodId::ExponentialSmoothing,
            confidence: CONFIDENCE_STABLE_HIGH,
            rationale: format!(
                "high volatility without structure (CV {:.2}); exponential smoothing adapts fastest",
                classification.coefficient_of_variation
            ),
            alternatives: vec![MethodId::WeightedMovingAverage, MethodId::SimpleMovingAverage],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;

    fn classify_values(values: &[f64]) -> SeriesClassification {
        classify(values, None)
    }

    #[test]
    fn insufficient_history_picks_sma() {
        let rec = select(&classify_values(&[10.0, 12.0, 11.0]));
        assert_eq!(rec.method, MethodId::SimpleMovingAverage);
        assert_eq!(rec.confidence, 0.40);
        assert!(rec.rationale.contains("insufficient"));
    }

    #[test]
    fn lumpy_demand_picks_tsb() {
        let values = vec![0.0, 0.0, 200.0, 0.0, 0.0, 2.0, 0.0, 0.0, 150.0, 0.0, 1.0, 0.0];
        let rec = select(&classify_values(&values));
        assert_eq!(rec.method, MethodId::Tsb);
        assert_eq!(rec.confidence, 0.75);
    }

    #[test]
    fn intermittent_demand_picks_croston() {
        let values = vec![0.0, 0.0, 0.0, 25.0, 0.0, 0.0, 0.0, 30.0, 0.0, 0.0, 0.0, 28.0];
        let rec = select(&classify_values(&values));
        assert_eq!(rec.method, MethodId::Croston);
        assert!(rec.rationale.contains("intermittent"));
    }

    #[test]
    fn zero_heavy_but_smooth_series_picks_sba() {
        // Zero ratio drives the intermittent flag while the quadrant stays
        // smooth, which lands on the generic-intermittent arm.
        let values = vec![10.0, 0.0, 10.0, 10.0, 0.0, 10.0, 10.0, 0.0, 10.0, 10.0, 0.0, 10.0];
        let rec = select(&classify_values(&values));
        assert_eq!(rec.method, MethodId::Sba);
    }

    #[test]
    fn seasonal_and_trending_picks_seasonal_trend() {
        let values: Vec<f64> = (0..36)
            .map(|i| {
                100.0
                    + 3.0 * i as f64
                    + 40.0 * (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin()
            })
            .collect();
        let rec = select(&classify_values(&values));
        assert_eq!(rec.method, MethodId::SeasonalTrend);
        assert_eq!(rec.confidence, 0.85);
    }

    #[test]
    fn seasonal_with_abundant_history_picks_decomposition() {
        let values: Vec<f64> = (0..24)
            .map(|i| 100.0 + 30.0 * (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin())
            .collect();
        let rec = select(&classify_values(&values));
        assert_eq!(rec.method, MethodId::SeasonalDecomposition);
        assert!(rec.confidence >= 0.80);
    }

    #[test]
    fn seasonal_with_short_history_picks_index_method() {
        // A declared weekly cycle detected on 18 points: seasonal but below
        // the 24-period bar for full decomposition.
        let values: Vec<f64> = (0..18)
            .map(|i| 100.0 + 40.0 * (2.0 * std::f64::consts::PI * i as f64 / 7.0).sin())
            .collect();
        let classification = classify(&values, Some(7));
        assert!(classification.has_seasonality);
        let rec = select(&classification);
        assert_eq!(rec.method, MethodId::SeasonalIndex);
        assert_eq!(rec.confidence, 0.65);
    }

    #[test]
    fn strong_trend_picks_linear_regression() {
        let values: Vec<f64> = (0..18).map(|i| 50.0 + 5.0 * i as f64).collect();
        let rec = select(&classify_values(&values));
        assert_eq!(rec.method, MethodId::LinearTrend);
        assert_eq!(rec.confidence, 0.80);
    }

    #[test]
    fn weak_trend_picks_trend_smoothing() {
        // Enough noise to keep R² between 0.3 and 0.6.
        let values: Vec<f64> = (0..24)
            .map(|i| 100.0 + 2.0 * i as f64 + if i % 2 == 0 { 18.0 } else { -18.0 })
            .collect();
        let classification = classify_values(&values);
        assert!(classification.has_trend, "R-squared {}", classification.trend_strength);
        assert!(classification.trend_strength <= TREND_STRONG_MIN);
        let rec = select(&classification);
        assert_eq!(rec.method, MethodId::TrendSmoothing);
    }

    #[test]
    fn stable_series_picks_by_volatility() {
        let low: Vec<f64> = (0..12).map(|i| 100.0 + (i % 3) as f64).collect();
        assert_eq!(select(&classify_values(&low)).method, MethodId::SimpleMovingAverage);

        let medium = vec![
            100.0, 160.0, 60.0, 140.0, 70.0, 150.0, 80.0, 145.0, 65.0, 155.0, 75.0, 135.0,
        ];
        let classification = classify_values(&medium);
        assert_eq!(classification.volatility, VolatilityClass::Medium);
        assert_eq!(select(&classification).method, MethodId::WeightedMovingAverage);
    }

    #[test]
    fn intermittency_takes_precedence_over_seasonality() {
        // A sparse series that also autocorrelates at lag 12: the
        // intermittent branch must win.
        let mut values = vec![0.0; 36];
        for i in (0..36).step_by(12) {
            values[i] = 30.0;
            values[i + 1] = 28.0;
        }
        let classification = classify_values(&values);
        assert!(classification.is_intermittent);
        let rec = select(&classification);
        assert!(matches!(
            rec.method,
            MethodId::Tsb | MethodId::Croston | MethodId::Sba
        ));
    }

    #[test]
    fn every_recommendation_is_well_formed() {
        let cases: Vec<Vec<f64>> = vec![
            vec![],
            vec![5.0],
            vec![0.0; 12],
            (0..30).map(|i| i as f64).collect(),
            (0..24)
                .map(|i| 100.0 + 30.0 * (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin())
                .collect(),
            vec![0.0, 0.0, 0.0, 25.0, 0.0, 0.0, 0.0, 30.0, 0.0, 0.0, 0.0, 28.0],
        ];
        for values in cases {
            let rec = select(&classify_values(&values));
            assert!((0.0..=1.0).contains(&rec.confidence));
            assert!(!rec.rationale.is_empty());
            assert!(!rec.alternatives.is_empty() && rec.alternatives.len() <= 3);
            assert!(!rec.alternatives.contains(&rec.method));
        }
    }
}
