//! Cluster combination
//!
//! Strands of one cluster are solved one after another. Each committed path
//! forbids the neighbor sites of its cuts for the strands that follow, which
//! steers later searches away from shared crossovers. The forbids live in a
//! [`SearchConstraints`] owned by a single attempt, so nothing outlives it.
//! This is a greedy heuristic: conflicts that survive it are counted in the
//! group penalty rather than ruled out.

use autobreak_graph::{
    count_conflicts, filter_candidates, Cluster, ClusterId, Design, OligoBreakSolution,
    PathSearch, PickPolicy, SearchConstraints, StrandId,
};
use indexmap::IndexMap;
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::config::BreakConfig;

/// One candidate (or none) per breakable strand of a cluster
#[derive(Debug, Clone, PartialEq)]
pub struct GroupBreakSolution {
    /// Cluster
    pub cluster: ClusterId,
    /// Chosen path per strand in strand id order; `None` when no path was found
    pub solutions: IndexMap<StrandId, Option<OligoBreakSolution>>,
    /// Sum of chosen path scores
    pub score: f64,
    /// Crossover pairs cut on both sides across all chosen paths
    pub penalty: usize,
    /// Paired nucleotides over all chosen paths
    pub duplex_length: usize,
    /// Every strand has a path
    pub complete: bool,
}

impl GroupBreakSolution {
    /// Aggregate per-strand choices; the penalty is recounted on the union of cuts
    #[must_use]
    pub fn new(
        design: &Design,
        cluster: ClusterId,
        mut solutions: IndexMap<StrandId, Option<OligoBreakSolution>>,
    ) -> Self {
        solutions.sort_keys();
        let chosen = || solutions.values().flatten();
        let cuts: HashSet<_> = chosen().flat_map(|s| s.cut_nodes().iter().copied()).collect();
        let penalty = count_conflicts(design, &cuts);
        let score = chosen().map(|s| s.score).sum();
        let duplex_length = chosen().map(|s| s.duplex_length).sum();
        let complete = solutions.values().all(Option::is_some);
        Self {
            cluster,
            solutions,
            score,
            penalty,
            duplex_length,
            complete,
        }
    }

    /// Chosen paths
    pub fn chosen(&self) -> impl Iterator<Item = &OligoBreakSolution> {
        self.solutions.values().flatten()
    }

    /// Strands left without a path
    pub fn missing(&self) -> impl Iterator<Item = StrandId> + '_ {
        self.solutions
            .iter()
            .filter(|(_, s)| s.is_none())
            .map(|(id, _)| *id)
    }

    /// Complete beats incomplete, then lower penalty, then higher score
    #[must_use]
    pub fn rank(&self, other: &Self) -> Ordering {
        self.complete
            .cmp(&other.complete)
            .then(other.penalty.cmp(&self.penalty))
            .then(self.score.total_cmp(&other.score))
    }
}

/// Breakable strands of `cluster`, longest first, ties by id
fn initial_order(search: &PathSearch<'_, '_>, cluster: &Cluster) -> Vec<StrandId> {
    let graph = search.graph();
    let mut order: Vec<StrandId> = cluster
        .strands
        .iter()
        .copied()
        .filter(|s| !graph.is_exempt(*s))
        .collect();
    order.sort_by(|a, b| {
        let length = |s: &StrandId| graph.design().strand(*s).length();
        length(b).cmp(&length(a)).then(a.cmp(b))
    });
    order
}

fn attempt<R: Rng + ?Sized>(
    search: &mut PathSearch<'_, '_>,
    cluster: ClusterId,
    order: &[StrandId],
    pick: PickPolicy,
    config: &BreakConfig,
    rng: &mut R,
) -> GroupBreakSolution {
    let design = search.graph().design();
    let k = config.solutions_per_strand;
    let mut constraints = SearchConstraints::new();
    let mut solutions = IndexMap::with_capacity(order.len());

    for &strand in order {
        let mut candidates =
            filter_candidates(search.k_best_paths(strand, k, config.k_select, rng, &constraints), k);
        let chosen = match pick {
            _ if candidates.is_empty() => None,
            PickPolicy::Best => Some(candidates.swap_remove(0)),
            PickPolicy::Random => Some(candidates.swap_remove(rng.random_range(0..candidates.len()))),
        };
        match &chosen {
            Some(solution) => {
                constraints
                    .forbidden_nodes
                    .extend(solution.neighbor_sites(design));
            }
            None => tracing::debug!(%cluster, %strand, "no path for strand"),
        }
        solutions.insert(strand, chosen);
    }
    GroupBreakSolution::new(design, cluster, solutions)
}

/// Best of up to `group_solutions` attempts at solving `cluster`
///
/// The first attempt walks strands longest first and commits each strand's
/// best candidate. Later attempts, run only when shuffling is enabled, walk a
/// shuffled order and commit per `group_pick`.
pub fn combine_cluster<R: Rng + ?Sized>(
    search: &mut PathSearch<'_, '_>,
    cluster: &Cluster,
    config: &BreakConfig,
    rng: &mut R,
) -> GroupBreakSolution {
    let mut order = initial_order(search, cluster);
    let mut best = attempt(search, cluster.id, &order, PickPolicy::Best, config, rng);

    if config.shuffle_strands && order.len() > 1 {
        for _ in 1..config.group_solutions {
            order.shuffle(rng);
            let next = attempt(search, cluster.id, &order, config.group_pick, config, rng);
            if next.rank(&best) == Ordering::Greater {
                best = next;
            }
        }
    }

    if best.complete {
        tracing::debug!(
            cluster = %cluster.id,
            strands = best.solutions.len(),
            score = best.score,
            penalty = best.penalty,
            "cluster combined"
        );
    } else {
        tracing::warn!(
            cluster = %cluster.id,
            missing = best.missing().count(),
            "cluster left incomplete"
        );
    }
    best
}
