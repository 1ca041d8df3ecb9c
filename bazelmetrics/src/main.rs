//! # bazelmetrics
//!
//! Measures how far a polyglot repository has migrated to Bazel and writes the
//! numbers as a JSON report.
//!
//! ## Overview
//!
//! bazelmetrics is built on top of bazelmetricslib. It scans a repository for Go,
//! Python and Rust packages, checks which of them carry a `BUILD`/`BUILD.bazel`
//! file and test targets, prints a short summary and writes the full report.
//!
//! ## Usage
//!
//! ```bash
//! # Scan the current directory, write metrics.json
//! bazelmetrics
//!
//! # Scan another repository and write compact JSON elsewhere
//! bazelmetrics --repo ~/src/monorepo --output /tmp/m.json --pretty=false
//!
//! # Skip directories matching a glob
//! bazelmetrics --exclude "third_party/**"
//!
//! # Time go test against bazel test for a few small packages
//! bazelmetrics --benchmark --max-benchmarks 3
//! ```

mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use bazelmetricslib::{
    scan_repository_with, BenchmarkOptions, BenchmarkRunner, CommandToolchain, Language, Report,
    ScanOptions,
};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::{debug, info, warn};

/// Build the clap Command structure
fn build_command() -> Command {
    Command::new("bazelmetrics")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Report Bazel adoption metrics for a polyglot repository")
        .arg(
            Arg::new("repo")
                .long("repo")
                .default_value(".")
                .help("Path to the repository to analyze"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .default_value("metrics.json")
                .help("Output JSON file"),
        )
        .arg(
            Arg::new("benchmark")
                .long("benchmark")
                .action(ArgAction::SetTrue)
                .help("Run go test vs bazel test speed comparisons"),
        )
        .arg(
            Arg::new("max-benchmarks")
                .long("max-benchmarks")
                .value_parser(value_parser!(i64))
                .allow_negative_numbers(true)
                .default_value("5")
                .help("Maximum number of packages to benchmark"),
        )
        .arg(
            Arg::new("pretty")
                .long("pretty")
                .value_parser(value_parser!(bool))
                .num_args(0..=1)
                .require_equals(true)
                .default_value("true")
                .default_missing_value("true")
                .help("Pretty-print the JSON output"),
        )
        .arg(
            Arg::new("exclude")
                .short('e')
                .long("exclude")
                .action(ArgAction::Append)
                .help("Skip directories matching glob pattern (repeatable)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Increase log verbosity (-v info, -vv debug)"),
        )
}

/// Log to stderr. `RUST_LOG` wins over `-v`.
fn init_logging(verbosity: u8) {
    let default_filter = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();
}

/// Build scan options from `--exclude` values
fn build_scan_options(matches: &ArgMatches) -> anyhow::Result<ScanOptions> {
    let mut options = ScanOptions::new();
    if let Some(excludes) = matches.get_many::<String>("exclude") {
        for pattern in excludes {
            options = options.exclude(pattern)?;
        }
    }
    Ok(options)
}

/// Absolute form of `repo` as given. Symlinks are kept, not resolved.
fn resolve_repo(repo: &str) -> anyhow::Result<PathBuf> {
    let repo_path = PathBuf::from(repo);
    if !repo_path.exists() {
        bail!("repository path does not exist: {}", repo_path.display());
    }
    std::path::absolute(&repo_path)
        .with_context(|| format!("cannot resolve {}", repo_path.display()))
}

fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    let repo = matches
        .get_one::<String>("repo")
        .map(String::as_str)
        .unwrap_or(".");
    let output = matches
        .get_one::<String>("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("metrics.json"));
    let pretty = matches.get_one::<bool>("pretty").copied().unwrap_or(true);
    let max_benchmarks = matches
        .get_one::<i64>("max-benchmarks")
        .copied()
        .unwrap_or(0);

    let repo_path = resolve_repo(repo)?;

    let options = build_scan_options(matches)?;

    println!("Analyzing repository: {}", repo_path.display());
    println!("Scanning for Go, Python, and Rust packages and BUILD files...");

    let scan = scan_repository_with(&repo_path, options)?;
    print!("{}", render::render_scan_counts(&scan));
    debug!("scan covered {} packages", scan.package_count());

    let mut report = Report::new(&scan);
    print!("{}", render::render_summary(&report));

    let primary = scan.packages(Language::PRIMARY);
    if matches.get_flag("benchmark") && primary.is_empty() {
        warn!("no {} packages to benchmark", Language::PRIMARY);
    } else if matches.get_flag("benchmark") {
        println!("\nRunning benchmarks (this may take a while)...");
        let max = usize::try_from(max_benchmarks).unwrap_or(0);
        let options = BenchmarkOptions::new().max_packages(max);
        let runner = BenchmarkRunner::new(
            CommandToolchain::with_options(&repo_path, &options),
            options,
        );
        let speed = runner.run(primary);
        info!("benchmarked {} packages", speed.packages.len());
        print!("{}", render::render_benchmarks(&speed));
        report.set_speed_comparison(speed);
    }

    report.write(&output, pretty)?;
    println!("\nMetrics written to: {}", output.display());
    println!("Done!");

    Ok(())
}

fn main() -> ExitCode {
    let matches = build_command().get_matches();
    init_logging(matches.get_count("verbose"));

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_is_well_formed() {
        build_command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let matches = build_command().get_matches_from(["bazelmetrics"]);
        assert_eq!(matches.get_one::<String>("repo").unwrap(), ".");
        assert_eq!(matches.get_one::<String>("output").unwrap(), "metrics.json");
        assert_eq!(*matches.get_one::<i64>("max-benchmarks").unwrap(), 5);
        assert!(*matches.get_one::<bool>("pretty").unwrap());
        assert!(!matches.get_flag("benchmark"));
        assert_eq!(matches.get_count("verbose"), 0);
    }

    #[test]
    fn test_pretty_flag_forms() {
        let bare = build_command().get_matches_from(["bazelmetrics", "--pretty"]);
        assert!(*bare.get_one::<bool>("pretty").unwrap());

        let off = build_command().get_matches_from(["bazelmetrics", "--pretty=false"]);
        assert!(!*off.get_one::<bool>("pretty").unwrap());
    }

    #[test]
    fn test_repeatable_exclude() {
        let matches = build_command().get_matches_from([
            "bazelmetrics",
            "--exclude",
            "third_party",
            "-e",
            "gen*",
        ]);
        let excludes: Vec<&String> = matches.get_many::<String>("exclude").unwrap().collect();
        assert_eq!(excludes, vec!["third_party", "gen*"]);
        assert!(build_scan_options(&matches).is_ok());
    }

    #[test]
    fn test_invalid_exclude_is_error() {
        let matches = build_command().get_matches_from(["bazelmetrics", "--exclude", "[oops"]);
        assert!(build_scan_options(&matches).is_err());
    }

    #[test]
    fn test_non_positive_max_benchmarks_parses() {
        let matches =
            build_command().get_matches_from(["bazelmetrics", "--max-benchmarks", "-1"]);
        assert_eq!(*matches.get_one::<i64>("max-benchmarks").unwrap(), -1);
    }

    #[test]
    fn test_resolve_repo_is_absolute() {
        let resolved = resolve_repo(".").unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.starts_with(std::env::current_dir().unwrap()));

        let err = resolve_repo("/definitely/not/a/real/path").unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_repo_keeps_symlinks() {
        let temp = tempfile::tempdir().unwrap();
        let real = temp.path().join("real");
        let link = temp.path().join("link");
        std::fs::create_dir(&real).unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let resolved = resolve_repo(link.to_str().unwrap()).unwrap();
        assert_eq!(resolved, link);
    }
}
