//! Validated design construction
//!
//! [`DesignSpec`] is the serde input format handed over by the design-file
//! collaborator; [`DesignBuilder`] checks it and produces the immutable
//! [`Design`] arena.

use crate::design::{BreakNode, Design, Domain, Nucleotide, Scaffold, ScaffoldSpan, Strand};
use crate::types::{BreakKind, NodeId, SiteKey, StrandId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for design construction
#[derive(Debug, Error)]
pub enum DesignError {
    /// Scaffold has no nucleotides
    #[error("scaffold sequence is empty")]
    EmptyScaffold,

    /// Strand has no nucleotides
    #[error("strand {0} has no nucleotides")]
    EmptyStrand(SiteKey),

    /// Two strands share a 5' key
    #[error("duplicate strand key {0}")]
    DuplicateStrand(SiteKey),

    /// Two break sites share a key
    #[error("duplicate break key {0}")]
    DuplicateBreak(SiteKey),

    /// Crossover refers to a site that does not exist
    #[error("unknown break key {0}")]
    UnknownBreak(SiteKey),

    /// Crossover joins a site to itself
    #[error("crossover joins {0} to itself")]
    SelfCrossover(SiteKey),

    /// Site already belongs to a crossover
    #[error("break {0} is already paired")]
    AlreadyPaired(SiteKey),

    /// Break position outside the strand
    #[error("break {key} at position {position} outside strand of length {length}")]
    PositionOutOfRange {
        /// Break key
        key: SiteKey,
        /// Offending position
        position: usize,
        /// Strand length
        length: usize,
    },

    /// Two breaks at the same position of one strand
    #[error("breaks {first} and {second} share position {position}")]
    DuplicatePosition {
        /// First break key
        first: SiteKey,
        /// Second break key
        second: SiteKey,
        /// Shared position
        position: usize,
    },

    /// Domain starts outside the scaffold
    #[error("scaffold position {position} outside scaffold of length {length}")]
    ScaffoldPositionOutOfRange {
        /// Offending position
        position: usize,
        /// Scaffold length
        length: usize,
    },

    /// Malformed JSON design
    #[error("invalid design document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialized design handed to the optimiser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignSpec {
    /// Scaffold sequence and topology
    pub scaffold: ScaffoldSpec,
    /// Staple strands
    pub strands: Vec<StrandSpec>,
    /// Reciprocal crossover site pairs
    #[serde(default)]
    pub crossovers: Vec<(SiteKey, SiteKey)>,
}

impl DesignSpec {
    /// Parse a JSON design document
    ///
    /// # Errors
    /// Malformed JSON.
    pub fn from_json(text: &str) -> Result<Self, DesignError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Scaffold part of a [`DesignSpec`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaffoldSpec {
    /// Scaffold sequence (5'→3')
    pub sequence: String,
    /// Circular scaffold
    #[serde(default = "default_true")]
    pub circular: bool,
}

fn default_true() -> bool {
    true
}

/// One staple strand of a [`DesignSpec`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrandSpec {
    /// 5' site key
    pub key: SiteKey,
    /// Strand closes on itself
    #[serde(default)]
    pub circular: bool,
    /// Never cut this strand
    #[serde(default)]
    pub dont_break: bool,
    /// Domains in 5'→3' order
    pub domains: Vec<DomainSpec>,
    /// Candidate cut sites
    #[serde(default)]
    pub breaks: Vec<BreakSpec>,
}

impl StrandSpec {
    /// Linear strand with the given domains and no break sites
    #[must_use]
    pub fn new(key: SiteKey, domains: Vec<DomainSpec>) -> Self {
        Self {
            key,
            circular: false,
            dont_break: false,
            domains,
            breaks: Vec::new(),
        }
    }

    /// Mark circular
    #[inline]
    #[must_use]
    pub fn circular(mut self) -> Self {
        self.circular = true;
        self
    }

    /// Mark exempt from breaking
    #[inline]
    #[must_use]
    pub fn dont_break(mut self) -> Self {
        self.dont_break = true;
        self
    }

    /// Add an internal break site
    #[inline]
    #[must_use]
    pub fn with_break(mut self, key: SiteKey, position: usize) -> Self {
        self.breaks.push(BreakSpec {
            key,
            position,
            kind: BreakKind::Internal,
            dont_break: false,
        });
        self
    }

    /// Add a crossover break site
    #[inline]
    #[must_use]
    pub fn with_crossover(mut self, key: SiteKey, position: usize) -> Self {
        self.breaks.push(BreakSpec {
            key,
            position,
            kind: BreakKind::Crossover,
            dont_break: false,
        });
        self
    }

    /// Total nucleotide count
    #[must_use]
    pub fn length(&self) -> usize {
        self.domains.iter().map(|d| d.length).sum()
    }
}

/// One domain of a [`StrandSpec`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainSpec {
    /// Nucleotide count
    pub length: usize,
    /// Scaffold position paired with the first nucleotide; absent for a gap
    #[serde(default)]
    pub scaffold_start: Option<usize>,
    /// Scaffold positions decrease along the staple
    #[serde(default)]
    pub descending: bool,
}

impl DomainSpec {
    /// Domain paired with ascending scaffold positions from `start`
    #[inline]
    #[must_use]
    pub fn paired(length: usize, start: usize) -> Self {
        Self {
            length,
            scaffold_start: Some(start),
            descending: false,
        }
    }

    /// Domain paired with descending scaffold positions from `start`
    #[inline]
    #[must_use]
    pub fn antiparallel(length: usize, start: usize) -> Self {
        Self {
            length,
            scaffold_start: Some(start),
            descending: true,
        }
    }

    /// Unpaired stretch
    #[inline]
    #[must_use]
    pub fn gap(length: usize) -> Self {
        Self {
            length,
            scaffold_start: None,
            descending: false,
        }
    }
}

/// One candidate cut site of a [`StrandSpec`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakSpec {
    /// Structural key
    pub key: SiteKey,
    /// Offset along the strand
    pub position: usize,
    /// Internal or crossover site
    #[serde(default)]
    pub kind: BreakKind,
    /// Never cut here
    #[serde(default)]
    pub dont_break: bool,
}

/// Builder for [`Design`]
///
/// ```
/// use autobreak_graph::{DesignBuilder, Direction, DomainSpec, SiteKey, StrandSpec};
///
/// let key = |i| SiteKey::new(0, i, Direction::Forward);
/// let mut builder = DesignBuilder::new("ACGT".repeat(20), true);
/// builder
///     .add_strand(
///         StrandSpec::new(key(0), vec![DomainSpec::paired(50, 0)])
///             .with_break(key(0), 0)
///             .with_break(key(25), 25)
///             .with_break(key(50), 50),
///     )
///     .unwrap();
/// let design = builder.build().unwrap();
/// assert_eq!(design.strands()[0].nodes().len(), 3);
/// ```
#[derive(Debug)]
pub struct DesignBuilder {
    scaffold: Scaffold,
    strands: Vec<Strand>,
    nodes: Vec<BreakNode>,
    node_keys: IndexMap<SiteKey, NodeId>,
    strand_keys: IndexMap<SiteKey, StrandId>,
}

impl DesignBuilder {
    /// Start a design on the given scaffold
    #[must_use]
    pub fn new(sequence: impl Into<String>, circular: bool) -> Self {
        let sequence = sequence
            .into()
            .bytes()
            .filter(|b| !b.is_ascii_whitespace())
            .map(|b| b.to_ascii_uppercase())
            .collect();
        Self {
            scaffold: Scaffold { sequence, circular },
            strands: Vec::new(),
            nodes: Vec::new(),
            node_keys: IndexMap::new(),
            strand_keys: IndexMap::new(),
        }
    }

    /// Number of strands added so far
    #[inline]
    #[must_use]
    pub fn strand_count(&self) -> usize {
        self.strands.len()
    }

    /// Add a strand and its break sites
    ///
    /// # Errors
    /// Empty scaffold or strand, duplicate keys, out-of-range positions.
    pub fn add_strand(&mut self, spec: StrandSpec) -> Result<StrandId, DesignError> {
        let scaffold_length = self.scaffold.len();
        if scaffold_length == 0 {
            return Err(DesignError::EmptyScaffold);
        }
        if self.strand_keys.contains_key(&spec.key) {
            return Err(DesignError::DuplicateStrand(spec.key));
        }

        let mut domains = Vec::with_capacity(spec.domains.len());
        let mut nucleotides = Vec::with_capacity(spec.length());
        for (index, domain) in spec.domains.iter().enumerate() {
            let span = match domain.scaffold_start {
                Some(start) if start >= scaffold_length => {
                    return Err(DesignError::ScaffoldPositionOutOfRange {
                        position: start,
                        length: scaffold_length,
                    });
                }
                Some(start) => Some(ScaffoldSpan {
                    start,
                    descending: domain.descending,
                }),
                None => None,
            };
            for i in 0..domain.length {
                let scaffold_position = span.map(|s| {
                    if s.descending {
                        (s.start + scaffold_length - i % scaffold_length) % scaffold_length
                    } else {
                        (s.start + i) % scaffold_length
                    }
                });
                nucleotides.push(Nucleotide {
                    domain: index,
                    scaffold_position,
                });
            }
            domains.push(Domain {
                length: domain.length,
                scaffold: span,
            });
        }

        let length = nucleotides.len();
        if length == 0 {
            return Err(DesignError::EmptyStrand(spec.key));
        }

        let mut breaks = spec.breaks.clone();
        breaks.sort_by_key(|b| b.position);
        for (i, b) in breaks.iter().enumerate() {
            let limit = if spec.circular { length } else { length + 1 };
            if b.position >= limit {
                return Err(DesignError::PositionOutOfRange {
                    key: b.key,
                    position: b.position,
                    length,
                });
            }
            if i > 0 && breaks[i - 1].position == b.position {
                return Err(DesignError::DuplicatePosition {
                    first: breaks[i - 1].key,
                    second: b.key,
                    position: b.position,
                });
            }
            if self.node_keys.contains_key(&b.key) || breaks[..i].iter().any(|o| o.key == b.key) {
                return Err(DesignError::DuplicateBreak(b.key));
            }
        }

        let strand_id = StrandId(self.strands.len());
        let mut node_ids = Vec::with_capacity(breaks.len());
        for (rank, b) in breaks.iter().enumerate() {
            let id = NodeId(self.nodes.len());
            self.nodes.push(BreakNode {
                id,
                key: b.key,
                kind: b.kind,
                strand: strand_id,
                position: b.position,
                rank,
                neighbor: None,
                dont_break: b.dont_break,
            });
            self.node_keys.insert(b.key, id);
            node_ids.push(id);
        }

        self.strand_keys.insert(spec.key, strand_id);
        self.strands.push(Strand {
            id: strand_id,
            key: spec.key,
            circular: spec.circular,
            dont_break: spec.dont_break,
            domains,
            nucleotides,
            nodes: node_ids,
        });
        Ok(strand_id)
    }

    /// Link two sites as the two sides of one crossover
    ///
    /// # Errors
    /// Unknown key, self link, or a site that is already paired.
    pub fn add_crossover(&mut self, a: SiteKey, b: SiteKey) -> Result<(), DesignError> {
        if a == b {
            return Err(DesignError::SelfCrossover(a));
        }
        let first = *self.node_keys.get(&a).ok_or(DesignError::UnknownBreak(a))?;
        let second = *self.node_keys.get(&b).ok_or(DesignError::UnknownBreak(b))?;
        for (id, key) in [(first, a), (second, b)] {
            if self.nodes[id.0].neighbor.is_some() {
                return Err(DesignError::AlreadyPaired(key));
            }
        }
        self.nodes[first.0].neighbor = Some(second);
        self.nodes[second.0].neighbor = Some(first);
        Ok(())
    }

    /// Finish the design
    ///
    /// # Errors
    /// Empty scaffold.
    pub fn build(self) -> Result<Design, DesignError> {
        if self.scaffold.is_empty() {
            return Err(DesignError::EmptyScaffold);
        }
        tracing::debug!(
            strands = self.strands.len(),
            nodes = self.nodes.len(),
            scaffold = self.scaffold.len(),
            "design built"
        );
        Ok(Design {
            scaffold: self.scaffold,
            strands: self.strands,
            nodes: self.nodes,
            node_keys: self.node_keys,
            strand_keys: self.strand_keys,
        })
    }
}

impl Design {
    /// Build a design from its serialized form
    ///
    /// # Errors
    /// Any [`DesignError`] raised while adding strands or crossovers.
    pub fn from_spec(spec: &DesignSpec) -> Result<Self, DesignError> {
        let mut builder = DesignBuilder::new(spec.scaffold.sequence.as_str(), spec.scaffold.circular);
        for strand in &spec.strands {
            builder.add_strand(strand.clone())?;
        }
        for (a, b) in &spec.crossovers {
            builder.add_crossover(*a, *b)?;
        }
        builder.build()
    }

    /// Parse and build a JSON design document
    ///
    /// # Errors
    /// Malformed JSON or an invalid design.
    pub fn from_json(text: &str) -> Result<Self, DesignError> {
        Self::from_spec(&DesignSpec::from_json(text)?)
    }
}
