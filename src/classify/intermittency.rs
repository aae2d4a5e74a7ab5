//! Intermittency classification on the ADI / CV² plane.

use crate::stats;

/// ADI boundary between smooth/erratic and intermittent/lumpy demand.
pub const ADI_SMOOTH_MAX: f64 = 1.32;

/// CV² boundary between smooth/intermittent and erratic/lumpy demand.
pub const CV_SQUARED_SMOOTH_MAX: f64 = 0.49;

/// Zero-ratio above which a series is treated as intermittent regardless of
/// its ADI/CV² quadrant.
pub const INTERMITTENT_ZERO_RATIO: f64 = 0.3;

/// Quadrant of the ADI / CV² classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntermittencyClass {
    /// Regular demand with stable sizes.
    Smooth,
    /// Regular demand with highly variable sizes.
    Erratic,
    /// Sparse demand with stable sizes.
    Intermittent,
    /// Sparse demand with highly variable sizes.
    Lumpy,
}

impl IntermittencyClass {
    pub fn label(&self) -> &'static str {
        match self {
            IntermittencyClass::Smooth => "smooth",
            IntermittencyClass::Erratic => "erratic",
            IntermittencyClass::Intermittent => "intermittent",
            IntermittencyClass::Lumpy => "lumpy",
        }
    }
}

impl std::fmt::Display for IntermittencyClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Intermittency measurements for one series.
#[derive(Debug, Clone, PartialEq)]
pub struct IntermittencyProfile {
    pub class: IntermittencyClass,
    /// Share of periods with zero demand.
    pub zero_ratio: f64,
    /// Average demand interval: mean gap between non-zero observations.
    pub adi: f64,
    /// Squared coefficient of variation of non-zero demand sizes.
    pub cv_squared: f64,
    /// Zero-ratio override or sparse quadrant.
    pub is_intermittent: bool,
    /// Set when ADI or CV² could not be computed from the data.
    pub degenerate: bool,
}

/// Measures intermittency of a demand series.
///
/// ADI is the mean gap between successive non-zero observations. With fewer
/// than two non-zero points there are no gaps; the series length stands in
/// as the interval so a sparse series still lands in the sparse quadrants.
pub fn assess(values: &[f64]) -> IntermittencyProfile {
    let n = values.len();
    if n == 0 {
        return IntermittencyProfile {
            class: IntermittencyClass::Smooth,
            zero_ratio: 0.0,
            adi: 0.0,
            cv_squared: 0.0,
            is_intermittent: false,
            degenerate: true,
        };
    }

    let nonzero_indices: Vec<usize> = values
        .iter()
        .enumerate()
        .filter(|(_, &v)| v > 0.0)
        .map(|(i, _)| i)
        .collect();
    let demands: Vec<f64> = nonzero_indices.iter().map(|&i| values[i]).collect();

    let zero_ratio = (n - demands.len()) as f64 / n as f64;

    let mut degenerate = false;
    let adi = if nonzero_indices.len() >= 2 {
        let gaps: Vec<f64> = nonzero_indices
            .windows(2)
            .map(|w| (w[1] - w[0]) as f64)
            .collect();
        stats::mean(&gaps)
    } else {
        degenerate = true;
        n as f64
    };

    let cv_squared = match stats::coefficient_of_variation(&demands) {
        Some(cv) => cv * cv,
        None => {
            degenerate = true;
            0.0
        }
    };

    let class = match (adi < ADI_SMOOTH_MAX, cv_squared < CV_SQUARED_SMOOTH_MAX) {
        (true, true) => IntermittencyClass::Smooth,
        (true, false) => IntermittencyClass::Erratic,
        (false, true) => IntermittencyClass::Intermittent,
        (false, false) => IntermittencyClass::Lumpy,
    };

    let is_intermittent = zero_ratio > INTERMITTENT_ZERO_RATIO
        || matches!(
            class,
            IntermittencyClass::Intermittent | IntermittencyClass::Lumpy
        );

    IntermittencyProfile {
        class,
        zero_ratio,
        adi,
        cv_squared,
        is_intermittent,
        degenerate,
    }
}
