//! Strand clusters: strands connected through crossover neighbor links

use crate::design::Design;
use crate::types::{ClusterId, StrandId};
use petgraph::unionfind::UnionFind;
use serde::{Deserialize, Serialize};

/// Maximal set of strands joined by neighbor links
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    /// Cluster id, ordered by lowest member strand
    pub id: ClusterId,
    /// Member strands in id order
    pub strands: Vec<StrandId>,
}

/// Partition the design's strands into clusters
///
/// Next/previous links stay within one strand, so only neighbor links join
/// strands. Clusters are numbered by their lowest strand id.
#[must_use]
pub fn clusters(design: &Design) -> Vec<Cluster> {
    let count = design.strands().len();
    let mut sets = UnionFind::<usize>::new(count);
    for (a, b) in design.crossover_pairs() {
        sets.union(design.node(a).strand.0, design.node(b).strand.0);
    }

    let mut by_root: Vec<Option<usize>> = vec![None; count];
    let mut result: Vec<Cluster> = Vec::new();
    for strand in 0..count {
        let root = sets.find(strand);
        let slot = *by_root[root].get_or_insert_with(|| {
            result.push(Cluster {
                id: ClusterId(result.len()),
                strands: Vec::new(),
            });
            result.len() - 1
        });
        result[slot].strands.push(StrandId(strand));
    }
    tracing::debug!(strands = count, clusters = result.len(), "strands clustered");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DesignBuilder, Direction, DomainSpec, SiteKey, StrandSpec};

    fn key(helix: i32, index: i32) -> SiteKey {
        SiteKey::new(helix, index, Direction::Forward)
    }

    #[test]
    fn crossovers_join_strands() {
        let mut builder = DesignBuilder::new("ACGT".repeat(50), true);
        for helix in 0..4 {
            builder
                .add_strand(
                    StrandSpec::new(key(helix, 0), vec![DomainSpec::paired(30, 0)])
                        .with_crossover(key(helix, 10), 10)
                        .with_crossover(key(helix, 20), 20),
                )
                .unwrap();
        }
        builder.add_crossover(key(0, 10), key(2, 10)).unwrap();
        builder.add_crossover(key(2, 20), key(3, 20)).unwrap();
        let design = builder.build().unwrap();

        let found = clusters(&design);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].strands, vec![StrandId(0), StrandId(2), StrandId(3)]);
        assert_eq!(found[1].id, ClusterId(1));
        assert_eq!(found[1].strands, vec![StrandId(1)]);
    }
}
