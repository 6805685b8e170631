//! Oligo break solution and candidate filtering

use crate::design::Design;
use crate::graph::BreakGraph;
use crate::types::{EdgeId, NodeId, StrandId};
use std::cmp::Ordering;
use std::collections::HashSet;

/// One concrete cut sequence for one strand
#[derive(Debug, Clone, PartialEq)]
pub struct OligoBreakSolution {
    /// Strand
    pub strand: StrandId,
    /// Path nodes in traversal order; a circular path ends on its start node
    pub nodes: Vec<NodeId>,
    /// Path edges; `edges.len() + 1 == nodes.len()`
    pub edges: Vec<EdgeId>,
    /// Cumulative score at each node
    pub scores: Vec<f64>,
    /// Total path score
    pub score: f64,
    /// Paired nucleotides over all fragments
    pub duplex_length: usize,
    /// Crossover pairs cut on both sides by this path alone
    pub self_penalty: usize,
}

impl OligoBreakSolution {
    /// Assemble a solution from a reconstructed path
    #[must_use]
    pub fn new(
        graph: &BreakGraph<'_>,
        strand: StrandId,
        nodes: Vec<NodeId>,
        edges: Vec<EdgeId>,
        scores: Vec<f64>,
    ) -> Self {
        debug_assert_eq!(nodes.len(), edges.len() + 1);
        let score = scores.last().copied().unwrap_or_default();
        let duplex_length = edges
            .iter()
            .map(|e| graph.edge(*e).profile.duplex_length)
            .sum();
        let mut solution = Self {
            strand,
            nodes,
            edges,
            scores,
            score,
            duplex_length,
            self_penalty: 0,
        };
        let cuts: HashSet<NodeId> = solution.cut_nodes().iter().copied().collect();
        solution.self_penalty = count_conflicts(graph.design(), &cuts);
        solution
    }

    /// Nodes where the strand is cut: every path node but the last
    #[inline]
    #[must_use]
    pub fn cut_nodes(&self) -> &[NodeId] {
        &self.nodes[..self.nodes.len().saturating_sub(1)]
    }

    /// Same node sequence over the first `prefix` nodes, or entirely for `None`
    #[must_use]
    pub fn is_identical(&self, other: &Self, prefix: Option<usize>) -> bool {
        match prefix {
            None => self.strand == other.strand && self.nodes == other.nodes,
            Some(k) => {
                self.strand == other.strand
                    && self.nodes.iter().take(k).eq(other.nodes.iter().take(k))
            }
        }
    }

    /// Neighbor sites of this path's cuts
    pub fn neighbor_sites<'d>(&'d self, design: &'d Design) -> impl Iterator<Item = NodeId> + 'd {
        self.cut_nodes()
            .iter()
            .filter_map(move |n| design.neighbor(*n))
    }

    /// Fragment count
    #[inline]
    #[must_use]
    pub fn fragment_count(&self) -> usize {
        self.edges.len()
    }
}

/// Crossover pairs with both sides in `cuts`, each pair counted once
#[must_use]
pub fn count_conflicts(design: &Design, cuts: &HashSet<NodeId>) -> usize {
    cuts.iter()
        .filter(|n| matches!(design.neighbor(**n), Some(m) if **n < m && cuts.contains(&m)))
        .count()
}

fn by_score_then_penalty(a: &OligoBreakSolution, b: &OligoBreakSolution) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then(a.self_penalty.cmp(&b.self_penalty))
}

/// Keep the best `limit` candidates
///
/// Penalised candidates are dropped when a penalty-free one exists; the rest
/// are ranked by score, ties broken by lower self-penalty.
#[must_use]
pub fn filter_candidates(
    mut candidates: Vec<OligoBreakSolution>,
    limit: usize,
) -> Vec<OligoBreakSolution> {
    if candidates.iter().any(|c| c.self_penalty == 0) {
        candidates.retain(|c| c.self_penalty == 0);
    }
    candidates.sort_by(by_score_then_penalty);
    candidates.truncate(limit);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solution(nodes: &[usize], score: f64, self_penalty: usize) -> OligoBreakSolution {
        OligoBreakSolution {
            strand: StrandId(0),
            nodes: nodes.iter().map(|n| NodeId(*n)).collect(),
            edges: (1..nodes.len()).map(EdgeId).collect(),
            scores: vec![score; nodes.len()],
            score,
            duplex_length: 0,
            self_penalty,
        }
    }

    #[test]
    fn identical_on_prefix_and_full() {
        let a = solution(&[0, 1, 2, 3], 1.0, 0);
        let b = solution(&[0, 1, 4, 3], 1.0, 0);
        assert!(a.is_identical(&a, None));
        assert!(a.is_identical(&b, Some(2)));
        assert!(!a.is_identical(&b, Some(3)));
        assert!(!a.is_identical(&b, None));
    }

    #[test]
    fn cut_nodes_drop_the_last() {
        let a = solution(&[4, 5, 4], 1.0, 0);
        assert_eq!(a.cut_nodes(), &[NodeId(4), NodeId(5)]);
    }

    #[test]
    fn filter_prefers_penalty_free() {
        let kept = filter_candidates(
            vec![
                solution(&[0, 1], 5.0, 1),
                solution(&[0, 2], 2.0, 0),
                solution(&[0, 3], 3.0, 0),
            ],
            10,
        );
        let scores: Vec<f64> = kept.iter().map(|c| c.score).collect();
        assert_eq!(scores, vec![3.0, 2.0]);
    }

    #[test]
    fn filter_ranks_ties_by_penalty_and_truncates() {
        let kept = filter_candidates(
            vec![
                solution(&[0, 1], 1.0, 2),
                solution(&[0, 2], 1.0, 1),
                solution(&[0, 3], 4.0, 3),
            ],
            2,
        );
        let penalties: Vec<usize> = kept.iter().map(|c| c.self_penalty).collect();
        assert_eq!(penalties, vec![3, 1]);
    }
}
