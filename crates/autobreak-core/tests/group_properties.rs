use autobreak_core::{BreakConfig, GroupBreakSolution, OffsetSweep};
use autobreak_graph::{
    clusters, BreakGraph, ClusterId, Design, NodeId, OligoBreakSolution, PathSearch,
    SearchConstraints, StrandId,
};
use autobreak_test_utils::{helix_bundle, GcThermodynamics};
use indexmap::IndexMap;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashSet};

fn best_paths(helices: usize, spacing: usize) -> (Design, Vec<OligoBreakSolution>) {
    let design = helix_bundle(helices, 84, spacing);
    let thermo = GcThermodynamics;
    let config = BreakConfig::new().validate().unwrap();
    let paths = {
        let graph = BreakGraph::build(
            &design,
            &thermo,
            config.scoring(),
            config.graph_options(),
            0,
        );
        let mut search = PathSearch::new(&graph);
        let paths: Vec<_> = (0..helices)
            .filter_map(|s| search.best_path(StrandId(s), &SearchConstraints::new()))
            .collect();
        paths
    };
    (design, paths)
}

proptest! {
    #[test]
    fn prop_group_penalty_is_order_free(
        helices in 2..5usize,
        spacing in 6..12usize,
        order in Just((0..5usize).collect::<Vec<_>>()).prop_shuffle(),
    ) {
        let (design, paths) = best_paths(helices, spacing);
        let forward: IndexMap<_, _> = paths.iter().map(|p| (p.strand, Some(p.clone()))).collect();
        let shuffled: IndexMap<_, _> = order
            .iter()
            .filter_map(|i| paths.get(*i))
            .map(|p| (p.strand, Some(p.clone())))
            .collect();
        let a = GroupBreakSolution::new(&design, ClusterId(0), forward);
        let b = GroupBreakSolution::new(&design, ClusterId(0), shuffled);
        prop_assert_eq!(a.penalty, b.penalty);
        prop_assert_eq!(&a.solutions, &b.solutions);

        let cuts: HashSet<NodeId> = paths.iter().flat_map(|p| p.cut_nodes().iter().copied()).collect();
        let expected = design
            .crossover_pairs()
            .filter(|(n, m)| cuts.contains(n) && cuts.contains(m))
            .count();
        prop_assert_eq!(a.penalty, expected);
    }

    #[test]
    fn prop_crossover_free_clusters_have_no_penalty(
        length in 30..120usize,
        seed in any::<u64>(),
        offset in 0..50usize,
    ) {
        let positions: BTreeSet<usize> = (0..=length).step_by(9).chain([length]).collect();
        let design = autobreak_test_utils::linear_strand(
            length,
            &positions.into_iter().collect::<Vec<_>>(),
        );
        let thermo = GcThermodynamics;
        let config = BreakConfig::new()
            .with_seed(seed)
            .with_offsets(OffsetSweep::Fixed { offset })
            .validate()
            .unwrap();
        let autobreak = autobreak_core::AutoBreak::new(&design, &thermo, config);
        prop_assert_eq!(clusters(&design).len(), 1);
        let solution = autobreak.solve_offset(offset);
        prop_assert_eq!(solution.penalty, 0);
    }
}
