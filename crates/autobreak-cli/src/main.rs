//! `autobreak` command line front end

use anyhow::{Context, Result};
use autobreak_core::{AutoBreak, BreakConfig, BreakReport, ValidatedConfig};
use autobreak_graph::Design;
use autobreak_thermo::UniformThermodynamics;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    let design = Arg::new("design")
        .long("design")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Design document (JSON)");
    let config = Arg::new("config")
        .long("config")
        .value_parser(value_parser!(PathBuf))
        .help("Run configuration (TOML); defaults apply when absent");
    let json = Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON");

    Command::new("autobreak")
        .version(autobreak_core::VERSION)
        .about("Staple break-point optimisation for DNA origami designs")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("Raise log level (-v debug, -vv trace)"),
        )
        .subcommand(
            Command::new("run")
                .about("Optimise break points and report the best registration offset")
                .arg(design.clone())
                .arg(config.clone())
                .arg(json.clone())
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .value_parser(value_parser!(PathBuf))
                        .help("Write the JSON report to this file"),
                ),
        )
        .subcommand(
            Command::new("score")
                .about("Score the design without breaking any strand")
                .arg(design)
                .arg(config.clone())
                .arg(json),
        )
        .subcommand(
            Command::new("check-config")
                .about("Validate a configuration and print its scoring function")
                .arg(config.required(true)),
        )
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = if verbosity == 0 {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &ArgMatches) -> Result<ValidatedConfig> {
    let config = match args.get_one::<PathBuf>("config") {
        Some(path) => BreakConfig::load(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => BreakConfig::default(),
    };
    Ok(config.validate()?)
}

fn load_design(args: &ArgMatches) -> Result<Design> {
    let path = args
        .get_one::<PathBuf>("design")
        .context("--design is required")?;
    read_design(path)
}

fn read_design(path: &Path) -> Result<Design> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading design {}", path.display()))?;
    let design =
        Design::from_json(&text).with_context(|| format!("parsing design {}", path.display()))?;
    tracing::info!(
        strands = design.strands().len(),
        nodes = design.nodes().len(),
        scaffold = design.scaffold().len(),
        "design loaded"
    );
    Ok(design)
}

fn run(args: &ArgMatches) -> Result<()> {
    let config = load_config(args)?;
    let design = load_design(args)?;
    let thermo = UniformThermodynamics::new();
    let autobreak = AutoBreak::new(&design, &thermo, config);

    let outcome = autobreak.run()?;
    let report = BreakReport::new(&outcome);

    if let Some(path) = args.get_one::<PathBuf>("output") {
        std::fs::write(path, report.to_json()?)
            .with_context(|| format!("writing report {}", path.display()))?;
        tracing::info!(path = %path.display(), edges = report.edges.len(), "report written");
    }
    if args.get_flag("json") {
        println!("{}", report.to_json()?);
    } else {
        println!("{}", report.summary);
    }
    Ok(())
}

fn score(args: &ArgMatches) -> Result<()> {
    let config = load_config(args)?;
    let design = load_design(args)?;
    let thermo = UniformThermodynamics::new();
    let autobreak = AutoBreak::new(&design, &thermo, config);

    let (scores, best) = autobreak.score_unbroken();
    let best = best
        .and_then(|i| scores.get(i))
        .context("no registration offset to score")?;
    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(best)?);
    } else {
        println!("offset:        {}", best.offset);
        println!("score:         {:.4}", best.score);
        match best.normalized_score() {
            Some(n) => println!("normalized:    {n:.6}"),
            None => println!("normalized:    undefined"),
        }
        println!("probability:   {:.6e}", best.probability);
        println!("duplex length: {}", best.duplex_length);
        println!("strands:       {}", best.strands.len());
    }
    Ok(())
}

fn check_config(args: &ArgMatches) -> Result<()> {
    let config = load_config(args)?;
    let settings = config.config();
    println!("scoring:     {}", config.scoring());
    println!("temperature: {:.1} °C", config.scoring().temperature_celsius());
    println!(
        "window:      [{}, {}]",
        settings.min_length, settings.max_length
    );
    println!(
        "candidates:  {} per strand, {} group attempt(s)",
        settings.solutions_per_strand, settings.group_solutions
    );
    println!("offsets:     {:?}", settings.offsets);
    Ok(())
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_count("verbose"));

    match matches.subcommand() {
        Some(("run", args)) => run(args),
        Some(("score", args)) => score(args),
        Some(("check-config", args)) => check_config(args),
        _ => unreachable!("subcommand_required"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DESIGN: &str = r#"{
        "scaffold": { "sequence": "ACGTTGCAAGCTTCGAACGTTGCAAGCTTCGAACGTTGCAAGCTTCGAACGTTGCAAGCTTCGAACGTTGCAAGCTTCGAACGTTGCAAGCTTCGAA" },
        "strands": [
            {
                "key": { "helix": 0, "index": 0, "direction": 1 },
                "domains": [{ "length": 80, "scaffold_start": 0 }],
                "breaks": [
                    { "key": { "helix": 0, "index": 0, "direction": 1 }, "position": 0 },
                    { "key": { "helix": 0, "index": 40, "direction": 1 }, "position": 40 },
                    { "key": { "helix": 0, "index": 80, "direction": 1 }, "position": 80 }
                ]
            }
        ]
    }"#;

    #[test]
    fn command_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn parses_run_arguments() {
        let matches = cli()
            .try_get_matches_from(["autobreak", "-vv", "run", "--design", "d.json", "--json"])
            .unwrap();
        assert_eq!(matches.get_count("verbose"), 2);
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "run");
        assert!(args.get_flag("json"));
        assert_eq!(
            args.get_one::<PathBuf>("design").unwrap(),
            &PathBuf::from("d.json")
        );
    }

    #[test]
    fn check_config_requires_config() {
        assert!(cli()
            .try_get_matches_from(["autobreak", "check-config"])
            .is_err());
    }

    #[test]
    fn reads_design_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DESIGN.as_bytes()).unwrap();
        let design = read_design(file.path()).unwrap();
        assert_eq!(design.strands().len(), 1);
        assert_eq!(design.nodes().len(), 3);
    }

    #[test]
    fn demo_files_load() {
        let demos = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos");
        let design = read_design(&demos.join("two_helix.json")).unwrap();
        assert_eq!(design.strands().len(), 3);
        assert_eq!(design.crossover_pairs().count(), 2);

        let config = BreakConfig::load(demos.join("autobreak.toml"))
            .unwrap()
            .validate()
            .unwrap();
        assert_eq!(config.scoring().terms().len(), 2);
    }
}
