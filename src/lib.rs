//! # demandcast
//!
//! Demand characterization and forecast computation engine for retail
//! replenishment.
//!
//! Takes a raw per-period sales history (possibly affected by stock-outs)
//! for one product/location pair and produces a corrected series, a
//! statistical classification of its behavior, a recommended forecasting
//! method with confidence and rationale, and a forecast for N future
//! periods that is consistent across daily/weekly/monthly reporting
//! granularities.
//!
//! ```
//! use chrono::NaiveDate;
//! use demandcast::prelude::*;
//!
//! let observations: Vec<PeriodObservation> = (0..18)
//!     .map(|i| {
//!         let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
//!             + chrono::Months::new(i);
//!         PeriodObservation::new(date, 100.0 + i as f64, 30.0, 30.0).unwrap()
//!     })
//!     .collect();
//!
//! let outcome = compute_forecast(
//!     &observations,
//!     3,
//!     Granularity::Monthly,
//!     &ForecastConfig::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(outcome.forecasts.len(), 3);
//! assert!(outcome.forecasts[0].point_estimate >= 0.0);
//! ```

// Allow some clippy warnings for cleaner code in specific cases
#![allow(clippy::needless_range_loop)]

pub mod classify;
pub mod core;
pub mod correction;
pub mod error;
pub mod granularity;
pub mod models;
pub mod pipeline;
pub mod selection;
pub mod short_series;
pub mod stats;

pub use error::{DemandError, Result};

pub mod prelude {
    pub use crate::classify::{classify, IntermittencyClass, SeriesClassification, VolatilityClass};
    pub use crate::core::{
        Fallback, ForecastMetadata, ForecastOutcome, ForecastResult, Granularity,
        PeriodObservation,
    };
    pub use crate::correction::{correct_stockouts, CorrectedSeries, ImputationMode};
    pub use crate::error::{DemandError, Result};
    pub use crate::pipeline::{compute_forecast, ForecastConfig};
    pub use crate::selection::{select, MethodId, MethodRecommendation};
}
