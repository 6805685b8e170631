//! Autobreak graph layer
//!
//! Data model and search for staple break optimisation:
//!
//! - [`Design`]: immutable arena of scaffold, strands and break nodes, built
//!   through [`DesignBuilder`] or from a serialized [`DesignSpec`]
//! - [`BreakGraph`]: per-offset edges with their [`autobreak_scoring::EdgeProfile`]
//!   and weight
//! - [`PathSearch`]: best path and K diversified paths per strand, driven by
//!   explicit [`SearchConstraints`]
//! - [`OligoBreakSolution`]: one strand's chosen cuts
//! - [`clusters`]: strands joined by crossovers
//!
//! # Example
//!
//! ```
//! use autobreak_graph::{
//!     BreakGraph, DesignBuilder, Direction, DomainSpec, GraphOptions, PathSearch,
//!     SearchConstraints, SiteKey, StrandId, StrandSpec,
//! };
//! use autobreak_scoring::ScoringFunction;
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
//! let scoring = ScoringFunction::default();
//! let graph = BreakGraph::build(&design, &thermo, &scoring, GraphOptions::default(), 0);
//! let best = PathSearch::new(&graph)
//!     .best_path(StrandId(0), &SearchConstraints::new())
//!     .unwrap();
//! assert_eq!(best.edges.len(), 2);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod cluster;
mod construction;
mod design;
mod fragment;
mod graph;
mod search;
mod solution;
mod types;

pub use cluster::{clusters, Cluster};
pub use construction::{
    BreakSpec, DesignBuilder, DesignError, DesignSpec, DomainSpec, ScaffoldSpec, StrandSpec,
};
pub use design::{complement, BreakNode, Design, Domain, Nucleotide, Scaffold, ScaffoldSpan, Strand};
pub use fragment::{duplex_segments, sequence_text, DuplexSegment, ProfileContext};
pub use graph::{BreakEdge, BreakGraph, GraphOptions, UnbrokenScore};
pub use search::{PathSearch, PickPolicy, SearchConstraints, SearchScratch, SELF_CONFLICT_PENALTY};
pub use solution::{count_conflicts, filter_candidates, OligoBreakSolution};
pub use types::{BreakKind, ClusterId, Direction, EdgeId, LengthWindow, NodeId, SiteKey, StrandId};
