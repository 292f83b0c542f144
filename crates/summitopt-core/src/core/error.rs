//! Error types for maximum search.
//!
//! This module defines the error type shared by the domain, the objective
//! adapter, the optimizer strategies and the search engine. Errors are split
//! into two families: configuration errors, raised before any evaluation
//! takes place, and oracle failures, raised while the search is running.
//! Neither is ever retried.

use thiserror::Error;

/// Errors that can occur while setting up or running a search.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    /// Invalid search configuration.
    ///
    /// This error occurs when the domain has non-positive or non-finite
    /// extents, when a strategy is configured with out-of-range parameters,
    /// or when an unknown strategy is requested.
    #[error("Invalid search configuration: {reason} ({parameter} = {value})")]
    InvalidConfiguration {
        /// Description of the configuration error
        reason: String,
        /// Name of the invalid parameter
        parameter: String,
        /// Value that was invalid
        value: String,
    },

    /// The height oracle failed at a point.
    ///
    /// This error occurs when the oracle reports an error or returns a
    /// non-finite height. A failed evaluation is never replaced by a
    /// default value.
    #[error("Height oracle failed at ({x}, {y}): {reason}")]
    OracleFailure {
        /// First coordinate of the queried point
        x: f64,
        /// Second coordinate of the queried point
        y: f64,
        /// Description of the failure
        reason: String,
    },

    /// Numerical breakdown inside a strategy.
    #[error("Numerical instability detected: {reason}")]
    NumericalError {
        /// Description of the numerical issue
        reason: String,
    },
}

impl SearchError {
    /// Create an InvalidConfiguration error.
    pub fn invalid_configuration<S1, S2, S3>(reason: S1, parameter: S2, value: S3) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self::InvalidConfiguration {
            reason: reason.into(),
            parameter: parameter.into(),
            value: value.into(),
        }
    }

    /// Create an OracleFailure error for the point `(x, y)`.
    pub fn oracle_failure<S: Into<String>>(x: f64, y: f64, reason: S) -> Self {
        Self::OracleFailure {
            x,
            y,
            reason: reason.into(),
        }
    }

    /// Create a NumericalError with a custom reason.
    pub fn numerical_error<S: Into<String>>(reason: S) -> Self {
        Self::NumericalError {
            reason: reason.into(),
        }
    }

    /// Returns `true` if the error was raised before any evaluation.
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, SearchError::InvalidConfiguration { .. })
    }

    /// Returns `true` if the height oracle failed during the run.
    pub fn is_oracle_failure(&self) -> bool {
        matches!(self, SearchError::OracleFailure { .. })
    }
}

/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;
