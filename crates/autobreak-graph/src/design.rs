//! Design arena: scaffold, strands and break nodes
//!
//! A [`Design`] is immutable once built (see [`crate::DesignBuilder`]). All
//! transient search state lives outside it, so one design can be shared by
//! every registration offset and every thread.

use crate::types::{BreakKind, NodeId, SiteKey, StrandId};
use indexmap::IndexMap;

/// Scaffold sequence and topology
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scaffold {
    pub(crate) sequence: Vec<u8>,
    pub(crate) circular: bool,
}

impl Scaffold {
    /// Scaffold length in nucleotides
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Always false for a built design
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Whether the scaffold is circular
    #[inline]
    #[must_use]
    pub fn is_circular(&self) -> bool {
        self.circular
    }

    /// Scaffold base sitting at `position` under registration `offset`
    #[must_use]
    pub fn base(&self, position: usize, offset: usize) -> u8 {
        self.sequence[(position + offset) % self.sequence.len()]
    }

    /// Staple base paired with `position` under registration `offset`
    #[must_use]
    pub fn staple_base(&self, position: usize, offset: usize) -> u8 {
        complement(self.base(position, offset))
    }
}

/// Watson–Crick complement; anything else maps to `N`
#[must_use]
pub fn complement(base: u8) -> u8 {
    match base.to_ascii_uppercase() {
        b'A' => b'T',
        b'T' | b'U' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        _ => b'N',
    }
}

/// Contiguous scaffold stretch a domain pairs with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaffoldSpan {
    /// Scaffold position paired with the domain's first nucleotide
    pub start: usize,
    /// Scaffold positions decrease along the staple (antiparallel pairing)
    pub descending: bool,
}

/// Stretch of a strand that is either paired or single-stranded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Domain {
    /// Nucleotide count
    pub length: usize,
    /// Paired scaffold stretch, `None` for an unpaired gap
    pub scaffold: Option<ScaffoldSpan>,
}

/// One nucleotide of a flattened strand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nucleotide {
    /// Owning domain index within the strand
    pub domain: usize,
    /// Paired scaffold position
    pub scaffold_position: Option<usize>,
}

/// Staple strand (oligo)
#[derive(Debug, Clone, PartialEq)]
pub struct Strand {
    pub(crate) id: StrandId,
    pub(crate) key: SiteKey,
    pub(crate) circular: bool,
    pub(crate) dont_break: bool,
    pub(crate) domains: Vec<Domain>,
    pub(crate) nucleotides: Vec<Nucleotide>,
    pub(crate) nodes: Vec<NodeId>,
}

impl Strand {
    /// Arena id
    #[inline]
    #[must_use]
    pub fn id(&self) -> StrandId {
        self.id
    }

    /// 5' site key
    #[inline]
    #[must_use]
    pub fn key(&self) -> SiteKey {
        self.key
    }

    /// Nucleotide count
    #[inline]
    #[must_use]
    pub fn length(&self) -> usize {
        self.nucleotides.len()
    }

    /// Whether the strand closes on itself
    #[inline]
    #[must_use]
    pub fn is_circular(&self) -> bool {
        self.circular
    }

    /// Design-level "don't break" flag
    #[inline]
    #[must_use]
    pub fn dont_break(&self) -> bool {
        self.dont_break
    }

    /// Domains in 5'→3' order
    #[inline]
    #[must_use]
    pub fn domains(&self) -> &[Domain] {
        &self.domains
    }

    /// Flattened nucleotides in 5'→3' order
    #[inline]
    #[must_use]
    pub fn nucleotides(&self) -> &[Nucleotide] {
        &self.nucleotides
    }

    /// Break nodes in position order
    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }
}

/// Candidate cut site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakNode {
    /// Arena id
    pub id: NodeId,
    /// Structural key
    pub key: SiteKey,
    /// Internal site or crossover
    pub kind: BreakKind,
    /// Owning strand
    pub strand: StrandId,
    /// Offset along the strand; the cut sits before this nucleotide
    pub position: usize,
    /// Index in the strand's position-ordered node list
    pub rank: usize,
    /// Reciprocal site across a crossover
    pub neighbor: Option<NodeId>,
    /// Permanently excluded from cutting
    pub dont_break: bool,
}

/// Immutable design: scaffold, strands, break nodes and their links
#[derive(Debug, Clone)]
pub struct Design {
    pub(crate) scaffold: Scaffold,
    pub(crate) strands: Vec<Strand>,
    pub(crate) nodes: Vec<BreakNode>,
    pub(crate) node_keys: IndexMap<SiteKey, NodeId>,
    pub(crate) strand_keys: IndexMap<SiteKey, StrandId>,
}

impl Design {
    /// Scaffold
    #[inline]
    #[must_use]
    pub fn scaffold(&self) -> &Scaffold {
        &self.scaffold
    }

    /// All strands
    #[inline]
    #[must_use]
    pub fn strands(&self) -> &[Strand] {
        &self.strands
    }

    /// All break nodes
    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[BreakNode] {
        &self.nodes
    }

    /// Strand by id
    #[inline]
    #[must_use]
    pub fn strand(&self, id: StrandId) -> &Strand {
        &self.strands[id.0]
    }

    /// Node by id
    #[inline]
    #[must_use]
    pub fn node(&self, id: NodeId) -> &BreakNode {
        &self.nodes[id.0]
    }

    /// Node by structural key
    #[must_use]
    pub fn node_by_key(&self, key: &SiteKey) -> Option<NodeId> {
        self.node_keys.get(key).copied()
    }

    /// Strand by its 5' key
    #[must_use]
    pub fn strand_by_key(&self, key: &SiteKey) -> Option<StrandId> {
        self.strand_keys.get(key).copied()
    }

    /// Next node along the strand, wrapping on circular strands
    #[must_use]
    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        let node = self.node(id);
        let nodes = &self.strand(node.strand).nodes;
        match nodes.get(node.rank + 1) {
            Some(next) => Some(*next),
            None if self.strand(node.strand).circular && nodes.len() > 1 => Some(nodes[0]),
            None => None,
        }
    }

    /// Previous node along the strand, wrapping on circular strands
    #[must_use]
    pub fn previous(&self, id: NodeId) -> Option<NodeId> {
        let node = self.node(id);
        let strand = self.strand(node.strand);
        if node.rank > 0 {
            Some(strand.nodes[node.rank - 1])
        } else if strand.circular && strand.nodes.len() > 1 {
            strand.nodes.last().copied()
        } else {
            None
        }
    }

    /// Reciprocal crossover site
    #[inline]
    #[must_use]
    pub fn neighbor(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).neighbor
    }

    /// Every crossover pair once, lower node id first
    pub fn crossover_pairs(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.nodes.iter().filter_map(|n| match n.neighbor {
            Some(m) if n.id < m => Some((n.id, m)),
            _ => None,
        })
    }

    /// Geometric distance from `from` to `to` along their strand
    ///
    /// On a circular strand a non-positive difference wraps once round.
    #[must_use]
    pub fn distance(&self, from: NodeId, to: NodeId) -> usize {
        let a = self.node(from);
        let b = self.node(to);
        let strand = self.strand(a.strand);
        if strand.circular && b.position <= a.position {
            b.position + strand.length() - a.position
        } else {
            b.position.saturating_sub(a.position)
        }
    }
}
