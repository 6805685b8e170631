//! Complete break solution: one group solution per cluster under one offset

use crate::group::GroupBreakSolution;
use autobreak_graph::{BreakGraph, OligoBreakSolution};
use std::cmp::Ordering;

/// Design-wide totals for one registration offset
#[derive(Debug, Clone, PartialEq)]
pub struct CompleteBreakSolution {
    /// Registration offset
    pub offset: usize,
    /// Group solutions in cluster order
    pub groups: Vec<GroupBreakSolution>,
    /// Sum of group scores
    pub score: f64,
    /// Sum of group penalties
    pub penalty: usize,
    /// Sum of group duplex lengths
    pub duplex_length: usize,
    /// Product over groups of `exp(score)`
    pub probability: f64,
    /// Every group is complete
    pub complete: bool,
}

impl CompleteBreakSolution {
    /// Aggregate group solutions
    #[must_use]
    pub fn new(offset: usize, groups: Vec<GroupBreakSolution>) -> Self {
        Self {
            offset,
            score: groups.iter().map(|g| g.score).sum(),
            penalty: groups.iter().map(|g| g.penalty).sum(),
            duplex_length: groups.iter().map(|g| g.duplex_length).sum(),
            probability: groups.iter().map(|g| g.score.exp()).product(),
            complete: groups.iter().all(|g| g.complete),
            groups,
        }
    }

    /// Score per paired nucleotide; `None` without any duplex
    #[inline]
    #[must_use]
    pub fn normalized_score(&self) -> Option<f64> {
        (self.duplex_length > 0).then(|| self.score / self.duplex_length as f64)
    }

    /// Every chosen strand path
    pub fn solutions(&self) -> impl Iterator<Item = &OligoBreakSolution> {
        self.groups.iter().flat_map(GroupBreakSolution::chosen)
    }

    /// Sum of `dG_total` over every chosen fragment
    ///
    /// `graph` must be the graph built for [`Self::offset`].
    #[must_use]
    pub fn total_free_energy(&self, graph: &BreakGraph<'_>) -> f64 {
        debug_assert_eq!(graph.offset(), self.offset);
        self.solutions()
            .flat_map(|s| s.edges.iter())
            .map(|e| graph.edge(*e).profile.dg_total)
            .sum()
    }

    /// Ordering used to pick the final offset: higher score, then lower offset
    #[must_use]
    pub fn rank(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then(other.offset.cmp(&self.offset))
    }
}

/// Best complete solution of a sweep, independent of input order
#[must_use]
pub fn select_best(solutions: &[CompleteBreakSolution]) -> Option<&CompleteBreakSolution> {
    solutions
        .iter()
        .filter(|s| s.complete)
        .max_by(|a, b| a.rank(b))
}
