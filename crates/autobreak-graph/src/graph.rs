//! Break graph construction
//!
//! For every breakable strand, each node gets an edge to every downstream node
//! whose distance lies inside the length window. Circular strands additionally
//! get one loop edge per node covering the whole circle.

use crate::design::{Design, Strand};
use crate::fragment::{sequence_text, ProfileContext};
use crate::types::{EdgeId, LengthWindow, NodeId, StrandId};
use autobreak_scoring::{EdgeProfile, ScoringFunction};
use autobreak_thermo::Thermodynamics;
use serde::{Deserialize, Serialize};

/// Graph build options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GraphOptions {
    /// Admissible fragment lengths
    pub window: LengthWindow,
    /// Strands shorter than this are left unbroken
    pub dont_break_below: usize,
}

impl GraphOptions {
    /// Strand is left in one piece: flagged, or too short to cut
    #[inline]
    #[must_use]
    pub fn exempts(&self, strand: &Strand) -> bool {
        strand.dont_break()
            || strand.length() < self.window.min
            || strand.length() < self.dont_break_below
    }
}

/// Directed fragment between two break nodes of one strand
#[derive(Debug, Clone, PartialEq)]
pub struct BreakEdge {
    /// Graph id
    pub id: EdgeId,
    /// Owning strand
    pub strand: StrandId,
    /// Upstream cut
    pub from: NodeId,
    /// Downstream cut
    pub to: NodeId,
    /// First covered strand position
    pub start: usize,
    /// Geometric length
    pub length: usize,
    /// Whole-circle edge from a node back to itself
    pub is_loop: bool,
    /// Thermodynamic and structural profile
    pub profile: EdgeProfile,
    /// Scoring function value
    pub weight: f64,
}

impl BreakEdge {
    /// Usable in a search: has at least one duplex segment
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.profile.is_valid()
    }
}

/// Score of a strand left in one piece
#[derive(Debug, Clone, PartialEq)]
pub struct UnbrokenScore {
    /// Strand
    pub strand: StrandId,
    /// Whole-strand profile
    pub profile: EdgeProfile,
    /// Scoring function value
    pub weight: f64,
}

/// Edges of every strand under one registration offset
#[derive(Debug)]
pub struct BreakGraph<'a> {
    context: ProfileContext<'a>,
    scoring: &'a ScoringFunction,
    options: GraphOptions,
    edges: Vec<BreakEdge>,
    outgoing: Vec<Vec<EdgeId>>,
    loop_edges: Vec<Option<EdgeId>>,
    exempt: Vec<bool>,
}

impl<'a> BreakGraph<'a> {
    /// Build the graph for `offset`
    #[must_use]
    pub fn build(
        design: &'a Design,
        thermo: &'a dyn Thermodynamics,
        scoring: &'a ScoringFunction,
        options: GraphOptions,
        offset: usize,
    ) -> Self {
        let context = ProfileContext {
            design,
            thermo,
            temperature_celsius: scoring.temperature_celsius(),
            offset,
        };
        let mut graph = Self {
            context,
            scoring,
            options,
            edges: Vec::new(),
            outgoing: vec![Vec::new(); design.nodes().len()],
            loop_edges: vec![None; design.nodes().len()],
            exempt: Vec::with_capacity(design.strands().len()),
        };

        for strand in design.strands() {
            let exempt = options.exempts(strand);
            graph.exempt.push(exempt);
            if !exempt {
                graph.add_strand_edges(strand.id());
            }
        }

        let invalid = graph.edges.iter().filter(|e| !e.is_valid()).count();
        tracing::debug!(
            offset,
            edges = graph.edges.len(),
            invalid,
            exempt = graph.exempt.iter().filter(|e| **e).count(),
            "break graph built"
        );
        graph
    }

    fn add_strand_edges(&mut self, strand_id: StrandId) {
        let design = self.context.design;
        let strand = design.strand(strand_id);
        let nodes = strand.nodes();
        let n = nodes.len();
        let window = self.options.window;

        for (rank, &from) in nodes.iter().enumerate() {
            let steps = if strand.is_circular() {
                n.saturating_sub(1)
            } else {
                n - 1 - rank
            };
            for step in 1..=steps {
                let to = nodes[(rank + step) % n];
                let length = design.distance(from, to);
                if length > window.max {
                    break;
                }
                if length >= window.min {
                    let id = self.push_edge(strand_id, from, to, length, false);
                    self.outgoing[from.0].push(id);
                }
            }
            if strand.is_circular() && window.contains(strand.length()) {
                let id = self.push_edge(strand_id, from, from, strand.length(), true);
                self.loop_edges[from.0] = Some(id);
            }
        }
    }

    fn push_edge(
        &mut self,
        strand: StrandId,
        from: NodeId,
        to: NodeId,
        length: usize,
        is_loop: bool,
    ) -> EdgeId {
        let start = self.context.design.node(from).position;
        let profile = self.context.profile(strand, start, length);
        let weight = self.scoring.evaluate(&profile);
        let id = EdgeId(self.edges.len());
        tracing::trace!(%from, %to, length, weight, "edge");
        self.edges.push(BreakEdge {
            id,
            strand,
            from,
            to,
            start,
            length,
            is_loop,
            profile,
            weight,
        });
        id
    }

    /// Design the graph was built from
    #[inline]
    #[must_use]
    pub fn design(&self) -> &'a Design {
        self.context.design
    }

    /// Registration offset
    #[inline]
    #[must_use]
    pub fn offset(&self) -> usize {
        self.context.offset
    }

    /// Scoring function behind the edge weights
    #[inline]
    #[must_use]
    pub fn scoring(&self) -> &'a ScoringFunction {
        self.scoring
    }

    /// Build options
    #[inline]
    #[must_use]
    pub fn options(&self) -> GraphOptions {
        self.options
    }

    /// Optimisation temperature (°C)
    #[inline]
    #[must_use]
    pub fn temperature_celsius(&self) -> f64 {
        self.context.temperature_celsius
    }

    /// All edges
    #[inline]
    #[must_use]
    pub fn edges(&self) -> &[BreakEdge] {
        &self.edges
    }

    /// Edge by id
    #[inline]
    #[must_use]
    pub fn edge(&self, id: EdgeId) -> &BreakEdge {
        &self.edges[id.0]
    }

    /// Forward edges leaving `node` (loop edge excluded)
    #[inline]
    #[must_use]
    pub fn outgoing(&self, node: NodeId) -> &[EdgeId] {
        &self.outgoing[node.0]
    }

    /// Loop edge registered on `node`
    #[inline]
    #[must_use]
    pub fn loop_edge(&self, node: NodeId) -> Option<EdgeId> {
        self.loop_edges[node.0]
    }

    /// Strand is never cut
    #[inline]
    #[must_use]
    pub fn is_exempt(&self, strand: StrandId) -> bool {
        self.exempt[strand.0]
    }

    /// Strands that take part in the search
    pub fn breakable_strands(&self) -> impl Iterator<Item = StrandId> + '_ {
        self.exempt
            .iter()
            .enumerate()
            .filter(|(_, exempt)| !**exempt)
            .map(|(i, _)| StrandId(i))
    }

    /// Staple sequence of an edge, `?` for unpaired nucleotides
    #[must_use]
    pub fn sequence(&self, edge: EdgeId) -> String {
        let e = self.edge(edge);
        sequence_text(self.context.design, e.strand, e.start, e.length, self.context.offset)
    }

    /// Score a strand as one uncut fragment, ignoring the length window
    #[must_use]
    pub fn score_unbroken(&self, strand: StrandId) -> UnbrokenScore {
        let profile = self.context.whole_strand(strand);
        let weight = self.scoring.evaluate(&profile);
        UnbrokenScore {
            strand,
            profile,
            weight,
        }
    }
}
