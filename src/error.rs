//! Error types for the demandcast library.
//!
//! The pipeline recovers from data problems internally (empty series,
//! degenerate statistics, failed fits) and records the fallback in the
//! forecast metadata instead of erroring. `DemandError` is reserved for
//! contract violations the caller must fix.

use thiserror::Error;

/// Result type alias for demand forecasting operations.
pub type Result<T> = std::result::Result<T, DemandError>;

/// Errors that can occur during forecast computation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DemandError {
    /// An observation violates the period invariants.
    #[error("invalid observation: {0}")]
    InvalidObservation(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Computation error (e.g., numerical issues).
    #[error("computation error: {0}")]
    ComputationError(String),
}
