//! Statistical primitives shared by every pipeline stage.
//!
//! Mean, variance, coefficient of variation, weighted aggregates,
//! autocorrelation at a lag, and ordinary least-squares regression on the
//! period index. Everything above (correction, classification, the forecast
//! methods) is built from these functions.

use statrs::distribution::{ContinuousCDF, StudentsT};

/// Calculate the mean of a slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Calculate the variance of a slice (sample variance with n-1 denominator).
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|x| (x - m).powi(2)).sum();
    sum_sq / (values.len() - 1) as f64
}

/// Calculate the standard deviation of a slice.
pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Coefficient of variation (standard deviation over mean).
///
/// Returns `None` when there are fewer than two values or the mean is too
/// close to zero for the ratio to be meaningful. Callers map `None` to a
/// degenerate-statistic flag rather than propagating an error.
pub fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    if m.abs() < 1e-10 {
        return None;
    }
    Some(std_dev(values) / m.abs())
}

/// Weighted mean. Returns NaN when the inputs are empty or the weights sum
/// to zero.
pub fn weighted_mean(values: &[f64], weights: &[f64]) -> f64 {
    debug_assert_eq!(values.len(), weights.len());
    let total: f64 = weights.iter().sum();
    if values.is_empty() || total <= 0.0 {
        return f64::NAN;
    }
    values
        .iter()
        .zip(weights.iter())
        .map(|(v, w)| v * w)
        .sum::<f64>()
        / total
}

/// Weighted standard deviation around the weighted mean.
pub fn weighted_std(values: &[f64], weights: &[f64]) -> f64 {
    debug_assert_eq!(values.len(), weights.len());
    let total: f64 = weights.iter().sum();
    if values.len() < 2 || total <= 0.0 {
        return f64::NAN;
    }
    let wm = weighted_mean(values, weights);
    let var = values
        .iter()
        .zip(weights.iter())
        .map(|(v, w)| w * (v - wm).powi(2))
        .sum::<f64>()
        / total;
    var.sqrt()
}

/// Calculate the autocorrelation at a given lag.
pub fn autocorrelation(values: &[f64], lag: usize) -> f64 {
    if values.len() <= lag {
        return f64::NAN;
    }
    let m = mean(values);
    let n = values.len();

    let mut numerator = 0.0;
    let mut denominator = 0.0;

    for i in 0..n {
        denominator += (values[i] - m).powi(2);
        if i >= lag {
            numerator += (values[i] - m) * (values[i - lag] - m);
        }
    }

    if denominator == 0.0 {
        return 0.0;
    }
    numerator / denominator
}

/// Result of an ordinary least-squares fit of value on period index.
#[derive(Debug, Clone)]
pub struct LinearFit {
    /// Slope of the fitted line per period.
    pub slope: f64,
    /// Intercept at index 0.
    pub intercept: f64,
    /// Coefficient of determination.
    pub r_squared: f64,
    /// Standard error of the slope.
    pub stderr: f64,
    /// Two-tailed p-value for the slope.
    pub p_value: f64,
}

impl LinearFit {
    /// Value of the fitted line at index `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// Signed correlation coefficient recovered from R² and the slope sign.
    pub fn correlation(&self) -> f64 {
        let r = self.r_squared.max(0.0).sqrt();
        if self.slope < 0.0 {
            -r
        } else {
            r
        }
    }
}

/// Fits `y = slope * index + intercept` by ordinary least squares.
///
/// Returns `None` for fewer than two points. A constant series fits with
/// slope 0, R² 0, and p-value 1 so it never registers as trending.
pub fn linear_fit(series: &[f64]) -> Option<LinearFit> {
    if series.len() < 2 {
        return None;
    }

    let n = series.len() as f64;
    let sum_x: f64 = (0..series.len()).map(|i| i as f64).sum();
    let sum_y: f64 = series.iter().sum();
    let sum_xy: f64 = series.iter().enumerate().map(|(i, &y)| i as f64 * y).sum();
    let sum_x2: f64 = (0..series.len()).map(|i| (i * i) as f64).sum();

    let mean_x = sum_x / n;
    let mean_y = sum_y / n;

    let ss_xx = sum_x2 - n * mean_x * mean_x;
    let ss_xy = sum_xy - n * mean_x * mean_y;
    let ss_yy: f64 = series.iter().map(|&y| (y - mean_y).powi(2)).sum();

    if ss_yy.abs() < 1e-10 {
        return Some(LinearFit {
            slope: 0.0,
            intercept: mean_y,
            r_squared: 0.0,
            stderr: 0.0,
            p_value: 1.0,
        });
    }

    let slope = ss_xy / ss_xx;
    let intercept = mean_y - slope * mean_x;

    let ss_res: f64 = series
        .iter()
        .enumerate()
        .map(|(i, &y)| {
            let y_pred = slope * i as f64 + intercept;
            (y - y_pred).powi(2)
        })
        .sum();

    let r_squared = 1.0 - ss_res / ss_yy;

    let mse = if n > 2.0 { ss_res / (n - 2.0) } else { 0.0 };
    let stderr = (mse / ss_xx).sqrt();

    let p_value = slope_p_value(slope, stderr, series.len());

    Some(LinearFit {
        slope,
        intercept,
        r_squared,
        stderr,
        p_value,
    })
}

/// Two-tailed p-value for the slope via the t-distribution with n-2 degrees
/// of freedom.
fn slope_p_value(slope: f64, stderr: f64, n: usize) -> f64 {
    if stderr <= 1e-12 {
        // Exact fit: a non-zero slope is certain, a zero slope is absent.
        return if slope.abs() > 1e-12 { 0.0 } else { 1.0 };
    }
    let dof = n.saturating_sub(2) as f64;
    if dof < 1.0 {
        return 1.0;
    }
    let t_stat = (slope / stderr).abs();
    match StudentsT::new(0.0, 1.0, dof) {
        Ok(dist) => 2.0 * (1.0 - dist.cdf(t_stat)),
        Err(_) => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mean_calculates_correctly() {
        assert_relative_eq!(mean(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3.0, epsilon = 1e-10);
        assert_relative_eq!(mean(&[10.0]), 10.0, epsilon = 1e-10);
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn variance_calculates_correctly() {
        // Sample variance of [1, 2, 3, 4, 5] = 2.5
        assert_relative_eq!(variance(&[1.0, 2.0, 3.0, 4.0, 5.0]), 2.5, epsilon = 1e-10);
        assert!(variance(&[1.0]).is_nan());
        assert!(variance(&[]).is_nan());
    }

    #[test]
    fn std_dev_calculates_correctly() {
        assert_relative_eq!(
            std_dev(&[1.0, 2.0, 3.0, 4.0, 5.0]),
            2.5_f64.sqrt(),
            epsilon = 1e-10
        );
    }

    #[test]
    fn cv_of_stable_series_is_small() {
        let cv = coefficient_of_variation(&[100.0, 102.0, 98.0, 101.0, 99.0]).unwrap();
        assert!(cv < 0.05, "cv was {cv}");
    }

    #[test]
    fn cv_degenerate_cases_are_none() {
        assert!(coefficient_of_variation(&[]).is_none());
        assert!(coefficient_of_variation(&[5.0]).is_none());
        assert!(coefficient_of_variation(&[0.0, 0.0, 0.0]).is_none());
        assert!(coefficient_of_variation(&[1.0, -1.0]).is_none());
    }

    #[test]
    fn weighted_mean_favors_heavier_weights() {
        let values = [1.0, 2.0, 3.0];
        let weights = [1.0, 2.0, 3.0];
        // (1 + 4 + 9) / 6 = 2.333...
        assert_relative_eq!(weighted_mean(&values, &weights), 14.0 / 6.0, epsilon = 1e-10);
    }

    #[test]
    fn weighted_mean_equal_weights_matches_mean() {
        let values = [4.0, 8.0, 12.0];
        let weights = [1.0, 1.0, 1.0];
        assert_relative_eq!(weighted_mean(&values, &weights), mean(&values), epsilon = 1e-10);
    }

    #[test]
    fn weighted_std_of_constant_is_zero() {
        let values = [5.0, 5.0, 5.0];
        let weights = [1.0, 2.0, 3.0];
        assert_relative_eq!(weighted_std(&values, &weights), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn autocorrelation_lag_0_is_1() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(autocorrelation(&values, 0), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn autocorrelation_of_seasonal_pattern_peaks_at_cycle() {
        let values: Vec<f64> = (0..48)
            .map(|i| 100.0 + 30.0 * (2.0 * std::f64::consts::PI * i as f64 / 12.0).sin())
            .collect();
        let at_cycle = autocorrelation(&values, 12);
        let off_cycle = autocorrelation(&values, 5);
        assert!(at_cycle > 0.7, "cycle acf was {at_cycle}");
        assert!(at_cycle > off_cycle);
    }

    #[test]
    fn autocorrelation_constant_is_zero() {
        assert_relative_eq!(autocorrelation(&[3.0; 10], 1), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn linear_fit_perfect_line() {
        // y = 2x + 1
        let series: Vec<f64> = (0..10).map(|i| 2.0 * i as f64 + 1.0).collect();
        let fit = linear_fit(&series).unwrap();

        assert_relative_eq!(fit.slope, 2.0, epsilon = 1e-10);
        assert_relative_eq!(fit.intercept, 1.0, epsilon = 1e-10);
        assert_relative_eq!(fit.r_squared, 1.0, epsilon = 1e-10);
        assert_relative_eq!(fit.p_value, 0.0, epsilon = 1e-10);
    }

    #[test]
    fn linear_fit_constant_series_has_no_trend() {
        let fit = linear_fit(&[5.0; 10]).unwrap();
        assert_relative_eq!(fit.slope, 0.0, epsilon = 1e-10);
        assert_relative_eq!(fit.intercept, 5.0, epsilon = 1e-10);
        assert_relative_eq!(fit.r_squared, 0.0, epsilon = 1e-10);
        assert_relative_eq!(fit.p_value, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn linear_fit_negative_slope() {
        // y = -1.5x + 10
        let series: Vec<f64> = (0..10).map(|i| -1.5 * i as f64 + 10.0).collect();
        let fit = linear_fit(&series).unwrap();

        assert_relative_eq!(fit.slope, -1.5, epsilon = 1e-10);
        assert_relative_eq!(fit.intercept, 10.0, epsilon = 1e-10);
        assert!(fit.correlation() < -0.99);
    }

    #[test]
    fn linear_fit_with_noise_is_significant() {
        let series = vec![0.1, 1.2, 1.9, 3.1, 4.0, 5.2, 5.9, 7.1, 8.0, 9.1];
        let fit = linear_fit(&series).unwrap();

        assert!(fit.slope > 0.9 && fit.slope < 1.1);
        assert!(fit.r_squared > 0.99);
        assert!(fit.p_value < 0.01);
    }

    #[test]
    fn linear_fit_noise_without_trend_is_insignificant() {
        let series = vec![10.0, 12.0, 9.0, 11.0, 10.5, 9.5, 11.5, 10.0, 12.0, 9.0];
        let fit = linear_fit(&series).unwrap();
        assert!(fit.p_value > 0.1, "p-value was {}", fit.p_value);
    }

    #[test]
    fn linear_fit_too_short() {
        assert!(linear_fit(&[]).is_none());
        assert!(linear_fit(&[1.0]).is_none());
    }

    #[test]
    fn linear_fit_predict_extrapolates() {
        let series: Vec<f64> = (0..12).map(|i| 3.0 * i as f64).collect();
        let fit = linear_fit(&series).unwrap();
        assert_relative_eq!(fit.predict(12.0), 36.0, epsilon = 1e-8);
    }
}
