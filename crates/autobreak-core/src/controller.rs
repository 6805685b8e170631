//! Optimization controller
//!
//! Runs graph construction, cluster combination and global aggregation for
//! every registration offset of the configured sweep, then keeps the best
//! complete result.
//!
//! Offsets and clusters are independent units of work. With `parallel` set
//! they run on the rayon pool; each unit owns its search scratch and an RNG
//! seeded from `(seed, offset, cluster index)`, so results do not depend on
//! thread scheduling.

use crate::complete::{select_best, CompleteBreakSolution};
use crate::config::ValidatedConfig;
use crate::error::BreakError;
use crate::group::combine_cluster;
use autobreak_graph::{clusters, BreakGraph, Cluster, Design, PathSearch};
use autobreak_thermo::Thermodynamics;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::Serialize;

/// Seed for one (offset, cluster) unit
#[must_use]
pub fn unit_seed(seed: u64, offset: usize, cluster: usize) -> u64 {
    let mix = |x: u64| {
        let x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        let x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        x ^ (x >> 31)
    };
    mix(seed ^ mix(offset as u64 ^ mix(cluster as u64)))
}

/// Headline numbers of one offset
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OffsetScore {
    /// Registration offset
    pub offset: usize,
    /// Total score
    pub score: f64,
    /// Total penalty
    pub penalty: usize,
    /// Every cluster complete
    pub complete: bool,
}

impl From<&CompleteBreakSolution> for OffsetScore {
    fn from(solution: &CompleteBreakSolution) -> Self {
        Self {
            offset: solution.offset,
            score: solution.score,
            penalty: solution.penalty,
            complete: solution.complete,
        }
    }
}

/// Result of a successful run
#[derive(Debug)]
pub struct BreakOutcome<'a> {
    /// Graph of the selected offset
    pub graph: BreakGraph<'a>,
    /// Selected solution
    pub best: CompleteBreakSolution,
    /// Every offset tried, in sweep order
    pub offsets: Vec<OffsetScore>,
}

/// Break optimizer over one design
#[derive(Debug)]
pub struct AutoBreak<'d> {
    design: &'d Design,
    thermo: &'d dyn Thermodynamics,
    config: ValidatedConfig,
    clusters: Vec<Cluster>,
}

impl<'d> AutoBreak<'d> {
    /// Create an optimizer; clusters are computed once for all offsets
    #[must_use]
    pub fn new(design: &'d Design, thermo: &'d dyn Thermodynamics, config: ValidatedConfig) -> Self {
        let clusters = clusters(design);
        Self {
            design,
            thermo,
            config,
            clusters,
        }
    }

    /// Design
    #[inline]
    #[must_use]
    pub fn design(&self) -> &'d Design {
        self.design
    }

    /// Thermodynamics provider
    #[inline]
    #[must_use]
    pub fn thermo(&self) -> &'d dyn Thermodynamics {
        self.thermo
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ValidatedConfig {
        &self.config
    }

    /// Strand clusters
    #[inline]
    #[must_use]
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// Offsets of the configured sweep
    #[must_use]
    pub fn offsets(&self) -> Vec<usize> {
        let config = self.config.config();
        config
            .offsets
            .resolve(self.design.scaffold().len(), config.seed)
    }

    /// Break graph for `offset`
    #[must_use]
    pub fn graph(&self, offset: usize) -> BreakGraph<'_> {
        BreakGraph::build(
            self.design,
            self.thermo,
            self.config.scoring(),
            self.config.graph_options(),
            offset,
        )
    }

    /// Combine every cluster under one offset
    #[must_use]
    pub fn solve_offset(&self, offset: usize) -> CompleteBreakSolution {
        let graph = self.graph(offset);
        let config = self.config.config();
        let solve = |(index, cluster): (usize, &Cluster)| {
            let mut rng = StdRng::seed_from_u64(unit_seed(config.seed, offset, index));
            let mut search = PathSearch::new(&graph);
            combine_cluster(&mut search, cluster, config, &mut rng)
        };
        let groups = if config.parallel {
            self.clusters.par_iter().enumerate().map(solve).collect()
        } else {
            self.clusters.iter().enumerate().map(solve).collect()
        };

        let solution = CompleteBreakSolution::new(offset, groups);
        if solution.complete {
            tracing::info!(
                offset,
                score = solution.score,
                penalty = solution.penalty,
                "offset solved"
            );
        } else {
            tracing::warn!(
                offset,
                incomplete = solution.groups.iter().filter(|g| !g.complete).count(),
                "offset solved with incomplete clusters"
            );
        }
        solution
    }

    /// Solve every offset of the sweep, in sweep order
    #[must_use]
    pub fn sweep(&self) -> Vec<CompleteBreakSolution> {
        let offsets = self.offsets();
        tracing::info!(
            offsets = offsets.len(),
            clusters = self.clusters.len(),
            strands = self.design.strands().len(),
            scoring = %self.config.scoring(),
            "registration sweep started"
        );
        if self.config.config().parallel {
            offsets.par_iter().map(|o| self.solve_offset(*o)).collect()
        } else {
            offsets.iter().map(|o| self.solve_offset(*o)).collect()
        }
    }

    /// Sweep and keep the best complete offset
    ///
    /// # Errors
    /// [`BreakError::NoSolution`] when no offset is complete.
    pub fn run(&self) -> Result<BreakOutcome<'_>, BreakError> {
        let solutions = self.sweep();
        let best = select_best(&solutions)
            .cloned()
            .ok_or(BreakError::NoSolution {
                offsets_tried: solutions.len(),
            })?;
        tracing::info!(
            offset = best.offset,
            score = best.score,
            penalty = best.penalty,
            duplex_length = best.duplex_length,
            "best offset selected"
        );
        Ok(BreakOutcome {
            graph: self.graph(best.offset),
            offsets: solutions.iter().map(OffsetScore::from).collect(),
            best,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BreakConfig, OffsetSweep};
    use autobreak_test_utils::{crossover_pair, FixedThermodynamics};

    #[test]
    fn unit_seeds_differ() {
        assert_ne!(unit_seed(0, 0, 1), unit_seed(0, 1, 0));
        assert_ne!(unit_seed(1, 0, 0), unit_seed(0, 0, 0));
        assert_eq!(unit_seed(3, 4, 5), unit_seed(3, 4, 5));
    }

    #[test]
    fn offsets_follow_sweep() {
        let design = crossover_pair(60, 30);
        let thermo = FixedThermodynamics::default();
        let config = BreakConfig::new()
            .with_offsets(OffsetSweep::Sequential { start: 2, count: 3 })
            .validate()
            .unwrap();
        let autobreak = AutoBreak::new(&design, &thermo, config);
        assert_eq!(autobreak.offsets(), vec![2, 3, 4]);
        assert_eq!(autobreak.clusters().len(), 1);
    }
}
