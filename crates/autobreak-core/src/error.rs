//! Error types for the optimization controller
//!
//! Missing paths and incomplete clusters are not errors; they surface as
//! `Option`s and completeness flags on the solutions. Only configuration
//! problems, malformed designs and a sweep with no complete offset reach the
//! caller as [`BreakError`].

use autobreak_graph::DesignError;
use autobreak_scoring::ScoringError;
use thiserror::Error;

/// Configuration errors, reported before any graph is built
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Bad scoring term or reduction
    #[error("scoring: {0}")]
    Scoring(#[from] ScoringError),

    /// Length window with `min >= max`
    #[error("invalid length window: min {min} must be below max {max}")]
    InvalidWindow {
        /// Configured minimum
        min: usize,
        /// Configured maximum
        max: usize,
    },

    /// A solution count set to zero
    #[error("{field} must be at least 1")]
    ZeroSolutions {
        /// Offending field
        field: &'static str,
    },

    /// Offset sweep that selects nothing
    #[error("invalid offset sweep: {0}")]
    InvalidOffsets(String),

    /// TOML syntax or schema error
    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Config file could not be read
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that stop a break run
#[derive(Debug, Error)]
pub enum BreakError {
    /// Configuration rejected
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    /// Design rejected
    #[error("design: {0}")]
    Design(#[from] DesignError),

    /// No registration offset produced a complete solution
    #[error("no complete break solution across {offsets_tried} registration offset(s)")]
    NoSolution {
        /// Offsets evaluated
        offsets_tried: usize,
    },
}

impl BreakError {
    /// Nothing can be exported from this run
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::NoSolution { .. })
    }

    /// Fixable by editing the configuration
    #[inline]
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
