use autobreak_core::{
    AutoBreak, BreakConfig, BreakError, BreakReport, GroupBreakSolution, OffsetSweep,
};
use autobreak_graph::{
    ClusterId, DesignBuilder, DomainSpec, PathSearch, PickPolicy, SearchConstraints, StrandId,
    StrandSpec,
};
use autobreak_test_utils::{
    crossover_pair, helix_bundle, linear_strand, scaffold_sequence, site, FixedThermodynamics,
    GcThermodynamics,
};
use indexmap::IndexMap;
use pretty_assertions::assert_eq;
use std::io::Write;

fn shared_crossover_config() -> BreakConfig {
    BreakConfig::new()
        .with_score_terms(["glength:30:5"])
        .with_shuffle(false)
}

#[test]
fn shared_crossover_is_used_once() {
    let design = crossover_pair(60, 30);
    let thermo = FixedThermodynamics::default();
    let config = shared_crossover_config().validate().unwrap();
    let autobreak = AutoBreak::new(&design, &thermo, config);
    let outcome = autobreak.run().unwrap();

    let group = &outcome.best.groups[0];
    assert!(group.complete);
    assert_eq!(group.penalty, 0);
    let fragments: Vec<usize> = group.chosen().map(|s| s.fragment_count()).collect();
    assert_eq!(fragments, vec![2, 1]);

    let report = BreakReport::new(&outcome);
    assert_eq!(report.edges.len(), 3);
    assert_eq!(report.summary.penalty, 0);
    assert_eq!(report.summary.strands, 2);
    assert!(report.edges.iter().all(|e| e.cluster == ClusterId(0)));
    assert!(report.edges.iter().all(|e| e.sequence.len() == e.length));
}

#[test]
fn both_sides_on_shared_crossover_cost_one() {
    let design = crossover_pair(60, 30);
    let thermo = FixedThermodynamics::default();
    let config = shared_crossover_config().validate().unwrap();
    let autobreak = AutoBreak::new(&design, &thermo, config);
    let graph = autobreak.graph(0);
    let mut search = PathSearch::new(&graph);

    let unconstrained: IndexMap<_, _> = [StrandId(0), StrandId(1)]
        .into_iter()
        .map(|s| (s, search.best_path(s, &SearchConstraints::new())))
        .collect();
    let group = GroupBreakSolution::new(&design, ClusterId(0), unconstrained);
    assert!(group.complete);
    assert_eq!(group.penalty, 1);
}

#[test]
fn blocked_strand_means_no_solution() {
    let design = crossover_pair(60, 30);
    let thermo = FixedThermodynamics::default();
    let config = BreakConfig::new()
        .with_window(21, 40)
        .with_group_solutions(4)
        .validate()
        .unwrap();
    let autobreak = AutoBreak::new(&design, &thermo, config);

    let solution = autobreak.solve_offset(0);
    assert!(!solution.complete);
    assert_eq!(solution.groups[0].missing().count(), 1);

    let err = autobreak.run().unwrap_err();
    assert!(err.is_terminal());
    assert!(matches!(err, BreakError::NoSolution { offsets_tried: 1 }));
}

#[test]
fn offset_selection_ignores_sweep_order() {
    let design = linear_strand(80, &[0, 20, 40, 60, 80]);
    let thermo = GcThermodynamics;
    let run = |offsets: Vec<usize>| {
        let config = BreakConfig::new()
            .with_offsets(OffsetSweep::List { offsets })
            .validate()
            .unwrap();
        let autobreak = AutoBreak::new(&design, &thermo, config);
        let outcome = autobreak.run().unwrap();
        let expected = outcome
            .offsets
            .iter()
            .max_by(|a, b| a.score.total_cmp(&b.score).then(b.offset.cmp(&a.offset)))
            .map(|o| o.offset);
        assert_eq!(Some(outcome.best.offset), expected);
        (outcome.best.offset, outcome.best.score)
    };
    let forward = run(vec![0, 1, 2]);
    assert_eq!(run(vec![2, 0, 1]), forward);
    assert_eq!(run(vec![1, 2, 0]), forward);
}

#[test]
fn parallel_and_sequential_runs_agree() {
    let design = helix_bundle(3, 84, 7);
    let thermo = GcThermodynamics;
    let base = BreakConfig::new()
        .with_score_terms(["dG", "glength:35:8"])
        .with_pick(PickPolicy::Random, PickPolicy::Random)
        .with_group_solutions(4)
        .with_seed(11)
        .with_offsets(OffsetSweep::Sequential { start: 0, count: 3 });

    let solve = |parallel: bool| {
        let config = base.clone().with_parallel(parallel).validate().unwrap();
        AutoBreak::new(&design, &thermo, config).sweep()
    };
    assert_eq!(solve(true), solve(false));
}

#[test]
fn exempt_strands_leave_normalized_score_undefined() {
    let design = linear_strand(15, &[0, 15]);
    let thermo = FixedThermodynamics::default();
    let config = BreakConfig::new().validate().unwrap();
    let autobreak = AutoBreak::new(&design, &thermo, config);
    let outcome = autobreak.run().unwrap();

    assert!(outcome.best.complete);
    assert_eq!(outcome.best.duplex_length, 0);
    assert_eq!(outcome.best.normalized_score(), None);
    assert!(BreakReport::new(&outcome).edges.is_empty());
}

#[test]
fn dont_break_strand_stays_whole() {
    let mut builder = DesignBuilder::new(scaffold_sequence(400, 8), true);
    builder
        .add_strand(
            StrandSpec::new(site(0, -1), vec![DomainSpec::paired(80, 0)])
                .with_break(site(0, 0), 0)
                .with_break(site(0, 40), 40)
                .with_break(site(0, 80), 80),
        )
        .unwrap();
    builder
        .add_strand(
            StrandSpec::new(site(1, -1), vec![DomainSpec::paired(80, 100)])
                .dont_break()
                .with_break(site(1, 0), 0)
                .with_break(site(1, 40), 40)
                .with_break(site(1, 80), 80),
        )
        .unwrap();
    let design = builder.build().unwrap();
    let thermo = FixedThermodynamics::default();
    let autobreak = AutoBreak::new(&design, &thermo, BreakConfig::new().validate().unwrap());

    let outcome = autobreak.run().unwrap();
    let broken: Vec<StrandId> = outcome.best.solutions().map(|s| s.strand).collect();
    assert_eq!(broken, vec![StrandId(0)]);

    let (scores, best) = autobreak.score_unbroken();
    let unbroken = &scores[best.unwrap()];
    assert_eq!(unbroken.strands.len(), 2);
    assert!(unbroken.strands[1].exempt);
}

#[test]
fn config_file_drives_run() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
min_length = 20
max_length = 45
score_terms = ["dG:55, glength:40:5"]
shuffle_strands = false
parallel = false

[offsets]
mode = "sequential"
start = 0
count = 2
"#
    )
    .unwrap();

    let config = BreakConfig::load(file.path()).unwrap().validate().unwrap();
    assert_eq!(config.scoring().terms().len(), 2);
    assert!((config.scoring().temperature_celsius() - 55.0).abs() < 1e-12);

    let design = linear_strand(80, &[0, 20, 40, 60, 80]);
    let thermo = GcThermodynamics;
    let autobreak = AutoBreak::new(&design, &thermo, config);
    let outcome = autobreak.run().unwrap();
    assert_eq!(outcome.offsets.len(), 2);
    assert!(outcome
        .best
        .solutions()
        .flat_map(|s| s.edges.iter())
        .all(|e| (20..=45).contains(&outcome.graph.edge(*e).length)));
}

#[test]
fn missing_config_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = BreakConfig::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, autobreak_core::ConfigError::Io(_)));
}
