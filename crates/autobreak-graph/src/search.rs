//! Best-path and K-best-path search over one strand's break graph
//!
//! The forward edges of a strand form a DAG once nodes are ordered by their
//! rank relative to the start node, so the sweep relaxes nodes in that order.
//! A circular request ends on a virtual slot standing for the start node
//! reached again; the loop edge is compared against that slot last.
//!
//! All per-search state lives in [`SearchScratch`] and exclusions arrive as a
//! [`SearchConstraints`] value, so the graph itself is never mutated.

use crate::graph::BreakGraph;
use crate::solution::OligoBreakSolution;
use crate::types::{EdgeId, NodeId, StrandId};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Added when a path cuts both sides of one of its own crossovers
pub const SELF_CONFLICT_PENALTY: f64 = -1e9;

/// How the next accepted alternative is picked from the candidate pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickPolicy {
    /// Highest score
    #[default]
    Best,
    /// Uniformly random
    Random,
}

/// Nodes and edges a search must avoid
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchConstraints {
    /// Sites that may not be cut
    pub forbidden_nodes: HashSet<NodeId>,
    /// Edges that may not be used
    pub inactive_edges: HashSet<EdgeId>,
}

impl SearchConstraints {
    /// No exclusions
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forbid the given sites
    #[must_use]
    pub fn with_forbidden(mut self, nodes: impl IntoIterator<Item = NodeId>) -> Self {
        self.forbidden_nodes.extend(nodes);
        self
    }

    /// Deactivate the given edges
    #[must_use]
    pub fn with_inactive(mut self, edges: impl IntoIterator<Item = EdgeId>) -> Self {
        self.inactive_edges.extend(edges);
        self
    }
}

/// Per-search state, indexed by order slot
#[derive(Debug, Clone, Default)]
pub struct SearchScratch {
    score: Vec<f64>,
    predecessor: Vec<Option<EdgeId>>,
    reached: Vec<bool>,
}

impl SearchScratch {
    /// Clear and resize for `slots` order slots
    pub fn reset(&mut self, slots: usize) {
        self.score.clear();
        self.score.resize(slots, f64::NEG_INFINITY);
        self.predecessor.clear();
        self.predecessor.resize(slots, None);
        self.reached.clear();
        self.reached.resize(slots, false);
    }
}

/// Start node and topology of one search
#[derive(Debug, Clone, Copy)]
struct Request {
    strand: StrandId,
    start_rank: usize,
    nodes: usize,
    circular: bool,
}

impl Request {
    #[inline]
    fn end_slot(&self) -> usize {
        if self.circular {
            self.nodes
        } else {
            self.nodes - 1
        }
    }
}

/// Path search engine bound to one graph
#[derive(Debug)]
pub struct PathSearch<'g, 'a> {
    graph: &'g BreakGraph<'a>,
    scratch: SearchScratch,
}

impl<'g, 'a> PathSearch<'g, 'a> {
    /// Create a search engine with its own scratch state
    #[must_use]
    pub fn new(graph: &'g BreakGraph<'a>) -> Self {
        Self {
            graph,
            scratch: SearchScratch::default(),
        }
    }

    /// Graph being searched
    #[inline]
    #[must_use]
    pub fn graph(&self) -> &'g BreakGraph<'a> {
        self.graph
    }

    fn request(&self, strand: StrandId, constraints: &SearchConstraints) -> Option<Request> {
        if self.graph.is_exempt(strand) {
            return None;
        }
        let design = self.graph.design();
        let s = design.strand(strand);
        let nodes = s.nodes().len();
        if s.is_circular() {
            let start_rank = s.nodes().iter().position(|n| {
                !design.node(*n).dont_break && !constraints.forbidden_nodes.contains(n)
            })?;
            Some(Request {
                strand,
                start_rank,
                nodes,
                circular: true,
            })
        } else {
            (nodes >= 2).then_some(Request {
                strand,
                start_rank: 0,
                nodes,
                circular: false,
            })
        }
    }

    #[inline]
    fn node_at(&self, request: &Request, slot: usize) -> NodeId {
        let nodes = self.graph.design().strand(request.strand).nodes();
        nodes[(request.start_rank + slot) % request.nodes]
    }

    #[inline]
    fn order_of(&self, request: &Request, node: NodeId) -> usize {
        let rank = self.graph.design().node(node).rank;
        (rank + request.nodes - request.start_rank) % request.nodes
    }

    fn blocked(&self, request: &Request, node: NodeId, constraints: &SearchConstraints) -> bool {
        let order = self.order_of(request, node);
        if !request.circular && (order == 0 || order == request.end_slot()) {
            return false;
        }
        self.graph.design().node(node).dont_break || constraints.forbidden_nodes.contains(&node)
    }

    fn usable(&self, request: &Request, edge: EdgeId, constraints: &SearchConstraints) -> bool {
        let e = self.graph.edge(edge);
        e.is_valid()
            && !constraints.inactive_edges.contains(&edge)
            && !self.blocked(request, e.from, constraints)
            && !self.blocked(request, e.to, constraints)
    }

    /// Whether `node` lies on the best path currently stored for `slot`
    fn on_path(&self, request: &Request, mut slot: usize, node: NodeId) -> bool {
        while let Some(edge) = self.scratch.predecessor[slot] {
            let from = self.graph.edge(edge).from;
            if from == node {
                return true;
            }
            slot = self.order_of(request, from);
            if slot == 0 {
                break;
            }
        }
        false
    }

    /// Highest-scoring path for `strand`, or `None` when no path exists
    pub fn best_path(
        &mut self,
        strand: StrandId,
        constraints: &SearchConstraints,
    ) -> Option<OligoBreakSolution> {
        let request = self.request(strand, constraints)?;
        let design = self.graph.design();
        let end = request.end_slot();
        self.scratch.reset(end + 1);
        self.scratch.score[0] = 0.0;
        self.scratch.reached[0] = true;

        for slot in 0..request.nodes {
            if !self.scratch.reached[slot] || (!request.circular && slot == end) {
                continue;
            }
            let node = self.node_at(&request, slot);
            let penalty = match design.neighbor(node) {
                Some(m) if design.node(m).strand == strand && self.on_path(&request, slot, m) => {
                    SELF_CONFLICT_PENALTY
                }
                _ => 0.0,
            };

            for &edge in self.graph.outgoing(node) {
                if !self.usable(&request, edge, constraints) {
                    continue;
                }
                let e = self.graph.edge(edge);
                let target = match self.order_of(&request, e.to) {
                    t if t > slot => t,
                    0 if request.circular => end,
                    _ => continue,
                };
                let candidate = self.scratch.score[slot] + e.weight + penalty;
                if candidate > self.scratch.score[target] {
                    self.scratch.score[target] = candidate;
                    self.scratch.predecessor[target] = Some(edge);
                    self.scratch.reached[target] = true;
                }
            }
        }

        if request.circular {
            let start = self.node_at(&request, 0);
            if let Some(edge) = self.graph.loop_edge(start) {
                let weight = self.graph.edge(edge).weight;
                if self.usable(&request, edge, constraints) && weight > self.scratch.score[end] {
                    tracing::trace!(%strand, weight, "loop edge wins");
                    self.scratch.score[end] = weight;
                    self.scratch.predecessor[end] = Some(edge);
                }
            }
        }

        self.reconstruct(&request)
    }

    fn reconstruct(&self, request: &Request) -> Option<OligoBreakSolution> {
        let end = request.end_slot();
        self.scratch.predecessor[end]?;

        let mut nodes = vec![self.node_at(request, end % request.nodes)];
        let mut edges = Vec::new();
        let mut scores = vec![self.scratch.score[end]];
        let mut slot = end;
        while let Some(edge) = self.scratch.predecessor[slot] {
            let e = self.graph.edge(edge);
            edges.push(edge);
            nodes.push(e.from);
            if e.is_loop {
                scores.push(0.0);
                break;
            }
            slot = self.order_of(request, e.from);
            scores.push(if slot == 0 { 0.0 } else { self.scratch.score[slot] });
            if slot == 0 {
                break;
            }
        }
        nodes.reverse();
        edges.reverse();
        scores.reverse();
        Some(OligoBreakSolution::new(
            self.graph,
            request.strand,
            nodes,
            edges,
            scores,
        ))
    }

    /// Up to `k` distinct high-scoring paths, best path first
    ///
    /// Each round takes the newest accepted path and, for every edge index
    /// `i` but the last, reruns the search with edge `i` of each accepted path sharing its
    /// first `i + 1` nodes switched off. New distinct paths join a pool that
    /// persists across rounds; one is accepted per round according to `pick`.
    pub fn k_best_paths<R: Rng + ?Sized>(
        &mut self,
        strand: StrandId,
        k: usize,
        pick: PickPolicy,
        rng: &mut R,
        constraints: &SearchConstraints,
    ) -> Vec<OligoBreakSolution> {
        if k == 0 {
            return Vec::new();
        }
        let Some(best) = self.best_path(strand, constraints) else {
            return Vec::new();
        };
        let mut accepted = vec![best];
        let mut pool: Vec<OligoBreakSolution> = Vec::new();

        while accepted.len() < k {
            let newest = accepted[accepted.len() - 1].clone();
            for i in 0..newest.edges.len().saturating_sub(1) {
                let excluded = accepted
                    .iter()
                    .filter(|p| p.edges.len() > i && p.is_identical(&newest, Some(i + 1)))
                    .map(|p| p.edges[i]);
                let local = constraints.clone().with_inactive(excluded);
                let Some(candidate) = self.best_path(strand, &local) else {
                    continue;
                };
                let seen = accepted
                    .iter()
                    .chain(pool.iter())
                    .any(|p| p.is_identical(&candidate, None));
                if !seen {
                    pool.push(candidate);
                }
            }

            if pool.is_empty() {
                break;
            }
            let index = match pick {
                PickPolicy::Best => pool
                    .iter()
                    .enumerate()
                    .fold(0, |best, (i, c)| if c.score > pool[best].score { i } else { best }),
                PickPolicy::Random => rng.random_range(0..pool.len()),
            };
            accepted.push(pool.remove(index));
        }

        tracing::trace!(%strand, found = accepted.len(), k, "k-best search done");
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        DesignBuilder, Direction, DomainSpec, GraphOptions, LengthWindow, SiteKey, StrandSpec,
    };
    use autobreak_scoring::ScoringFunction;
    use autobreak_thermo::UniformThermodynamics;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn key(index: i32) -> SiteKey {
        SiteKey::new(0, index, Direction::Forward)
    }

    fn options(min: usize, max: usize) -> GraphOptions {
        GraphOptions {
            window: LengthWindow::new(min, max).unwrap(),
            dont_break_below: 0,
        }
    }

    fn strand(positions: &[usize], length: usize, circular: bool) -> crate::Design {
        let mut spec = StrandSpec::new(key(-1), vec![DomainSpec::paired(length, 0)]);
        if circular {
            spec = spec.circular();
        }
        for &p in positions {
            spec = spec.with_break(key(p as i32), p);
        }
        let mut builder = DesignBuilder::new("ACGT".repeat(100), true);
        builder.add_strand(spec).unwrap();
        builder.build().unwrap()
    }

    fn positions(design: &crate::Design, solution: &OligoBreakSolution) -> Vec<usize> {
        solution
            .nodes
            .iter()
            .map(|n| design.node(*n).position)
            .collect()
    }

    #[test]
    fn best_path_prefers_target_length() {
        let design = strand(&[0, 20, 40, 45, 60, 90], 90, false);
        let thermo = UniformThermodynamics::new();
        let scoring = ScoringFunction::from_terms("glength:45:5").unwrap();
        let graph = BreakGraph::build(&design, &thermo, &scoring, options(15, 60), 0);
        let mut search = PathSearch::new(&graph);
        let best = search.best_path(StrandId(0), &SearchConstraints::new()).unwrap();
        assert_eq!(positions(&design, &best), vec![0, 45, 90]);
        assert!((best.score - 2.0).abs() < 1e-12);
        assert_eq!(best.scores.len(), best.nodes.len());
        assert_eq!(best.scores[0], 0.0);
    }

    #[test]
    fn forbidden_node_is_avoided() {
        let design = strand(&[0, 20, 40, 45, 60, 90], 90, false);
        let thermo = UniformThermodynamics::new();
        let scoring = ScoringFunction::from_terms("glength:45:5").unwrap();
        let graph = BreakGraph::build(&design, &thermo, &scoring, options(15, 60), 0);
        let mut search = PathSearch::new(&graph);
        let forbidden = design.node_by_key(&key(45)).unwrap();
        let constraints = SearchConstraints::new().with_forbidden([forbidden]);
        let best = search.best_path(StrandId(0), &constraints).unwrap();
        assert!(!best.nodes.contains(&forbidden));
        assert_eq!(best.nodes.first(), Some(&design.node_by_key(&key(0)).unwrap()));
        assert_eq!(best.nodes.last(), Some(&design.node_by_key(&key(90)).unwrap()));
    }

    #[test]
    fn no_path_when_gap_exceeds_window() {
        let design = strand(&[0, 10, 90], 90, false);
        let thermo = UniformThermodynamics::new();
        let scoring = ScoringFunction::default();
        let graph = BreakGraph::build(&design, &thermo, &scoring, options(21, 60), 0);
        let mut search = PathSearch::new(&graph);
        assert!(search.best_path(StrandId(0), &SearchConstraints::new()).is_none());
    }

    #[test]
    fn circular_loop_edge_wins_when_heavier() {
        let design = strand(&[0, 20], 40, true);
        let thermo = UniformThermodynamics::new();
        let scoring = ScoringFunction::from_terms("glength:40:5").unwrap();
        let graph = BreakGraph::build(&design, &thermo, &scoring, options(10, 60), 0);
        let mut search = PathSearch::new(&graph);
        let best = search.best_path(StrandId(0), &SearchConstraints::new()).unwrap();
        assert_eq!(best.edges.len(), 1);
        assert!(graph.edge(best.edges[0]).is_loop);
        assert_eq!(best.nodes[0], best.nodes[1]);
    }

    #[test]
    fn circular_forward_path_wins_when_heavier() {
        let design = strand(&[0, 20], 40, true);
        let thermo = UniformThermodynamics::new();
        let scoring = ScoringFunction::from_terms("glength:20:5").unwrap();
        let graph = BreakGraph::build(&design, &thermo, &scoring, options(10, 60), 0);
        let mut search = PathSearch::new(&graph);
        let best = search.best_path(StrandId(0), &SearchConstraints::new()).unwrap();
        assert_eq!(positions(&design, &best), vec![0, 20, 0]);
        assert!((best.score - 2.0).abs() < 1e-12);
    }

    #[test]
    fn inactive_edges_force_alternatives() {
        let design = strand(&[0, 20, 40, 45, 60, 90], 90, false);
        let thermo = UniformThermodynamics::new();
        let scoring = ScoringFunction::from_terms("glength:45:5").unwrap();
        let graph = BreakGraph::build(&design, &thermo, &scoring, options(15, 60), 0);
        let mut search = PathSearch::new(&graph);
        let best = search.best_path(StrandId(0), &SearchConstraints::new()).unwrap();
        let constraints = SearchConstraints::new().with_inactive([best.edges[0]]);
        let second = search.best_path(StrandId(0), &constraints).unwrap();
        assert_ne!(second.nodes, best.nodes);
    }

    #[test]
    fn k_best_is_distinct_and_bounded() {
        let design = strand(&[0, 20, 30, 40, 45, 50, 60, 70, 90], 90, false);
        let thermo = UniformThermodynamics::new();
        let scoring = ScoringFunction::from_terms("glength:45:5").unwrap();
        let graph = BreakGraph::build(&design, &thermo, &scoring, options(15, 60), 0);
        let mut search = PathSearch::new(&graph);
        let mut rng = StdRng::seed_from_u64(7);
        for pick in [PickPolicy::Best, PickPolicy::Random] {
            let paths =
                search.k_best_paths(StrandId(0), 5, pick, &mut rng, &SearchConstraints::new());
            assert!(!paths.is_empty() && paths.len() <= 5);
            for (i, a) in paths.iter().enumerate() {
                for b in &paths[i + 1..] {
                    assert!(!a.is_identical(b, None));
                }
            }
            assert_eq!(positions(&design, &paths[0]), vec![0, 45, 90]);
        }
    }

    #[test]
    fn k_best_keeps_last_edge_of_each_path() {
        let design = strand(&[0, 30, 60], 60, false);
        let thermo = UniformThermodynamics::new();
        let scoring = ScoringFunction::from_terms("glength:60:5").unwrap();
        let graph = BreakGraph::build(&design, &thermo, &scoring, options(15, 60), 0);
        let mut search = PathSearch::new(&graph);
        let mut rng = StdRng::seed_from_u64(3);

        let paths =
            search.k_best_paths(StrandId(0), 5, PickPolicy::Best, &mut rng, &SearchConstraints::new());
        assert_eq!(paths.len(), 1);
        assert_eq!(positions(&design, &paths[0]), vec![0, 60]);
    }
}
