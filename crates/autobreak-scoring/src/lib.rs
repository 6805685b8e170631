//! Autobreak scoring
//!
//! Edge weights for the break graph. An [`EdgeProfile`] holds the derived
//! thermodynamic and structural numbers of one staple fragment; a
//! [`ScoringFunction`] turns it into a scalar weight.
//!
//! Terms form a closed set ([`ScoreTerm`]) resolved through [`TERM_TABLE`] at
//! configuration time, so a misspelt term fails before any graph is built.
//!
//! # Example
//!
//! ```
//! use autobreak_scoring::ScoringFunction;
//!
//! let scoring = ScoringFunction::from_terms("dG:45, glength:42:6").unwrap();
//! assert_eq!(scoring.terms().len(), 2);
//! assert_eq!(scoring.temperature_celsius(), 45.0);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod error;
mod function;
mod profile;
mod term;

pub use error::ScoringError;
pub use function::{ScoreReduction, ScoringFunction, DEFAULT_TEMPERATURE_CELSIUS};
pub use profile::{log_sigmoid_neg, EdgeProfile};
pub use term::{lookup, Quantity, ScoreTerm, TermDescriptor, TERM_TABLE};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
