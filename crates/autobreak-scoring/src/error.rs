//! Scoring configuration errors

use thiserror::Error;

/// Failure while parsing a scoring-function description
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScoringError {
    /// Term name not in the term table
    #[error("unknown scoring term '{name}' (known: {known})")]
    UnknownTerm {
        /// Offending name
        name: String,
        /// Comma-separated list of accepted names
        known: String,
    },

    /// More parameters than the term accepts
    #[error("scoring term '{name}' takes at most {max} parameter(s), got {given}")]
    TooManyParameters {
        /// Term name
        name: String,
        /// Accepted parameter count
        max: usize,
        /// Supplied parameter count
        given: usize,
    },

    /// Parameter is not a finite number
    #[error("scoring term '{name}': invalid parameter '{value}'")]
    InvalidParameter {
        /// Term name
        name: String,
        /// Raw parameter text
        value: String,
    },

    /// Gaussian tolerance must be strictly positive
    #[error("scoring term '{name}': tolerance must be > 0, got {tolerance}")]
    NonPositiveTolerance {
        /// Term name
        name: String,
        /// Supplied tolerance
        tolerance: f64,
    },

    /// Reduction name not recognised
    #[error("unknown score reduction '{0}' (known: sum, product)")]
    UnknownReduction(String),

    /// No term configured
    #[error("scoring function needs at least one term")]
    EmptyTerms,

    /// No reduction configured
    #[error("scoring function needs at least one reduction")]
    EmptyReductions,
}
