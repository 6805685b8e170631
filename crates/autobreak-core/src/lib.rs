//! Autobreak Core - optimization controller
//!
//! Drives staple break optimisation over a whole design:
//! - Validates the run configuration ([`BreakConfig`])
//! - Combines per-strand candidates into conflict-aware cluster solutions
//! - Aggregates clusters into one [`CompleteBreakSolution`] per offset
//! - Sweeps scaffold registration offsets and keeps the best complete one
//! - Scores designs uncut (read-only mode) and builds export records
//!
//! # Example
//!
//! ```
//! use autobreak_core::{AutoBreak, BreakConfig, BreakReport};
//! use autobreak_graph::{DesignBuilder, Direction, DomainSpec, SiteKey, StrandSpec};
//! use autobreak_thermo::UniformThermodynamics;
//!
//! let key = |i| SiteKey::new(0, i, Direction::Forward);
//! let mut builder = DesignBuilder::new("ACGT".repeat(25), true);
//! builder
//!     .add_strand(
//!         StrandSpec::new(key(0), vec![DomainSpec::paired(80, 0)])
//!             .with_break(key(0), 0)
//!             .with_break(key(40), 40)
//!             .with_break(key(80), 80),
//!     )
//!     .unwrap();
//! let design = builder.build().unwrap();
//!
//! let thermo = UniformThermodynamics::new();
//! let config = BreakConfig::new().validate().unwrap();
//! let autobreak = AutoBreak::new(&design, &thermo, config);
//! let outcome = autobreak.run().unwrap();
//! let report = BreakReport::new(&outcome);
//! assert!(report.summary.complete);
//! assert_eq!(report.edges.len(), 2);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod complete;
pub mod config;
pub mod controller;
pub mod error;
pub mod group;
pub mod readonly;
pub mod report;

pub use complete::{select_best, CompleteBreakSolution};
pub use config::{BreakConfig, OffsetSweep, ValidatedConfig};
pub use controller::{unit_seed, AutoBreak, BreakOutcome, OffsetScore};
pub use error::{BreakError, ConfigError};
pub use group::{combine_cluster, GroupBreakSolution};
pub use readonly::{ReadOnlyScore, UnbrokenRecord};
pub use report::{BreakReport, EdgeRecord, SolutionSummary};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for running autobreak
    pub use crate::{
        AutoBreak, BreakConfig, BreakError, BreakReport, CompleteBreakSolution,
        GroupBreakSolution, OffsetSweep, ValidatedConfig,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
