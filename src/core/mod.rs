//! Core data structures for demand forecasting.

mod forecast;
mod observation;

pub use forecast::{Fallback, ForecastMetadata, ForecastOutcome, ForecastResult};
pub use observation::{validate_observations, Granularity, PeriodObservation};
