//! End-to-end scenarios for the forecast pipeline.

use approx::assert_relative_eq;
use chrono::NaiveDate;
use demandcast::prelude::*;
use demandcast::classify::IntermittencyClass;

fn month(i: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 1).unwrap() + chrono::Months::new(i)
}

fn monthly_full_stock(values: &[f64]) -> Vec<PeriodObservation> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| PeriodObservation::new(month(i as u32), v, 30.0, 30.0).unwrap())
        .collect()
}

#[test]
fn half_available_period_is_corrected_before_forecasting() {
    // January fully stocked, February on the shelf 14 of 28 days. The 100
    // units February sold imply ~200 of true demand.
    let observations = vec![
        PeriodObservation::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            100.0,
            30.0,
            31.0,
        )
        .unwrap(),
        PeriodObservation::new(
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            100.0,
            14.0,
            28.0,
        )
        .unwrap(),
    ];

    let corrected = correct_stockouts(&observations, ImputationMode::MovingAverage);
    assert_relative_eq!(corrected.values()[1], 200.0, epsilon = 1e-9);

    let outcome = compute_forecast(
        &observations,
        3,
        Granularity::Monthly,
        &ForecastConfig::default(),
    )
    .unwrap();

    // Two periods land in the very-short tier, not the method selector.
    assert!(!outcome.classification.is_intermittent);
    assert_relative_eq!(outcome.recommendation.confidence, 0.30);
    assert_relative_eq!(outcome.forecasts[0].metadata.safety_factor, 1.5);
    let estimate = outcome.forecasts[0].point_estimate;
    assert!(estimate > 100.0, "correction should lift the estimate, got {estimate}");
    assert!(estimate < 210.0);
}

#[test]
fn two_years_of_seasonal_demand_gets_a_seasonal_method() {
    let values: Vec<f64> = (0..24)
        .map(|i| 100.0 + 30.0 * (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin())
        .collect();
    let observations = monthly_full_stock(&values);
    let outcome = compute_forecast(
        &observations,
        6,
        Granularity::Monthly,
        &ForecastConfig::default(),
    )
    .unwrap();

    assert!(outcome.classification.has_seasonality);
    assert_eq!(outcome.classification.seasonal_period, Some(12));
    assert_eq!(outcome.recommendation.method, MethodId::SeasonalDecomposition);
    assert!(outcome.recommendation.confidence >= 0.80);

    // The forecast continues the seasonal shape: the cycle restarts at the
    // base level and peaks three months in.
    assert_relative_eq!(outcome.forecasts[0].point_estimate, 100.0, epsilon = 1e-6);
    assert_relative_eq!(outcome.forecasts[3].point_estimate, 130.0, epsilon = 1e-6);
    let first_factor = outcome.forecasts[0].metadata.seasonal_factor.unwrap();
    assert_relative_eq!(first_factor, 1.0, epsilon = 1e-6);
    // Half a seasonal cycle: 100 + 115 + ~126 + 130 + ~126 + 115.
    assert_relative_eq!(
        outcome.total_demand(),
        660.0 + 30.0 * 3f64.sqrt(),
        epsilon = 1e-6
    );
}

#[test]
fn noisy_seasonal_history_still_classifies_seasonal() {
    use rand::{rngs::StdRng, Rng, SeedableRng};
    let mut rng = StdRng::seed_from_u64(42);
    let values: Vec<f64> = (0..48)
        .map(|i| {
            100.0
                + 30.0 * (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin()
                + rng.gen_range(-5.0..5.0)
        })
        .collect();
    let observations = monthly_full_stock(&values);
    let outcome = compute_forecast(
        &observations,
        12,
        Granularity::Monthly,
        &ForecastConfig::default(),
    )
    .unwrap();

    assert!(outcome.classification.has_seasonality);
    assert_eq!(outcome.classification.seasonal_period, Some(12));
    assert!(matches!(
        outcome.recommendation.method,
        MethodId::SeasonalDecomposition | MethodId::SeasonalTrend
    ));
    assert!(outcome.recommendation.confidence >= 0.80);

    // Noise shifts the indices a little but the year still sums near the
    // 100/month base, and the trough stays well above zero.
    let total = outcome.total_demand();
    assert!(total > 1080.0, "12-month total too low: {total}");
    assert!(total < 1320.0, "12-month total too high: {total}");
    for forecast in &outcome.forecasts {
        assert!(forecast.point_estimate > 40.0);
        assert!(forecast.point_estimate < 160.0);
        assert!(forecast.dispersion_estimate.is_finite());
    }
    assert!(outcome.forecasts[0].metadata.fallback.is_none());
}

#[test]
fn sparse_demand_routes_to_an_intermittent_model() {
    let values = vec![0.0, 0.0, 0.0, 25.0, 0.0, 0.0, 0.0, 30.0, 0.0, 0.0, 0.0, 28.0];
    let observations = monthly_full_stock(&values);
    let outcome = compute_forecast(
        &observations,
        4,
        Granularity::Monthly,
        &ForecastConfig::default(),
    )
    .unwrap();

    assert!(outcome.classification.is_intermittent);
    assert!(matches!(
        outcome.classification.intermittency,
        IntermittencyClass::Intermittent | IntermittencyClass::Lumpy
    ));
    assert!(matches!(
        outcome.recommendation.method,
        MethodId::Tsb | MethodId::Croston | MethodId::Sba
    ));

    // A per-period rate, not a per-occurrence size: positive but well below
    // the largest observed sale.
    let estimate = outcome.forecasts[0].point_estimate;
    assert!(estimate > 0.0);
    assert!(estimate < 30.0 * 1.5);
    assert!(outcome.forecasts[0].metadata.fallback.is_none());
    assert_eq!(outcome.forecasts[0].metadata.periods_used, 12);
}

#[test]
fn flat_daily_series_scales_proportionally_across_views() {
    // Nearly a year of constant 12 units/day.
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let observations: Vec<PeriodObservation> = (0..340)
        .map(|i| {
            PeriodObservation::new(start + chrono::Days::new(i), 12.0, 1.0, 1.0).unwrap()
        })
        .collect();
    let config = ForecastConfig::default();

    let daily = compute_forecast(&observations, 1, Granularity::Daily, &config).unwrap();
    let weekly = compute_forecast(&observations, 1, Granularity::Weekly, &config).unwrap();
    let monthly = compute_forecast(&observations, 1, Granularity::Monthly, &config).unwrap();

    assert_relative_eq!(daily.forecasts[0].point_estimate, 12.0, max_relative = 0.01);
    assert_relative_eq!(weekly.forecasts[0].point_estimate, 84.0, max_relative = 0.01);
    assert_relative_eq!(monthly.forecasts[0].point_estimate, 360.0, max_relative = 0.01);
}

#[test]
fn steep_decline_bottoms_out_at_zero() {
    let values: Vec<f64> = (0..15).map(|i| 140.0 - 10.0 * i as f64).collect();
    let observations = monthly_full_stock(&values);
    let outcome = compute_forecast(
        &observations,
        6,
        Granularity::Monthly,
        &ForecastConfig::default(),
    )
    .unwrap();

    assert_eq!(outcome.recommendation.method, MethodId::LinearTrend);
    for forecast in &outcome.forecasts {
        assert!(forecast.point_estimate >= 0.0);
    }
    assert_relative_eq!(
        outcome.forecasts.last().unwrap().point_estimate,
        0.0,
        epsilon = 1e-9
    );
    assert!(outcome.forecasts[0].metadata.trend_slope.unwrap() < 0.0);
}

#[test]
fn new_product_with_peer_prior_anchors_on_the_prior() {
    let observations = monthly_full_stock(&[40.0]);
    let outcome = compute_forecast(
        &observations,
        2,
        Granularity::Monthly,
        &ForecastConfig::default().with_peer_prior(100.0),
    )
    .unwrap();

    // 0.3 observed + 0.7 prior.
    assert_relative_eq!(outcome.forecasts[0].point_estimate, 82.0, epsilon = 1e-9);
    assert!(outcome.forecasts[0].dispersion_estimate > 0.0);
    assert_relative_eq!(outcome.forecasts[0].metadata.safety_factor, 1.5);
}

#[test]
fn imputation_mode_changes_a_stocked_out_december() {
    // Two years of history where December sells six times the usual, and
    // the second December is fully stocked out.
    let mut observations = Vec::new();
    for i in 0..24 {
        let date = month(i);
        let is_december = (i % 12) == 11;
        let (sold, stocked) = if i == 23 {
            (0.0, 0.0)
        } else if is_december {
            (300.0, 30.0)
        } else {
            (50.0, 30.0)
        };
        observations.push(PeriodObservation::new(date, sold, stocked, 30.0).unwrap());
    }

    let seasonal = correct_stockouts(&observations, ImputationMode::SeasonalAverage);
    let moving = correct_stockouts(&observations, ImputationMode::MovingAverage);
    assert_relative_eq!(seasonal.values()[23], 300.0, epsilon = 1e-9);
    assert_relative_eq!(moving.values()[23], 50.0, epsilon = 1e-9);
}
