//! Speed comparison between `go test` and `bazel test`.
//!
//! A handful of small, fully bazelized primary-language packages are timed
//! three ways: a native `go test` run, a cold `bazel test` run right after
//! `bazel clean`, and a warm `bazel test` rerun. External commands sit
//! behind the [`Toolchain`] trait; [`CommandToolchain`] is the real one.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::data::package::Package;
use crate::error::BazelMetricsError;
use crate::source::filter::relative_label;
use crate::Result;

/// Packages benchmarked when no positive maximum is given.
pub const DEFAULT_MAX_BENCHMARKS: usize = 5;

/// Packages with more test files than this are too slow to benchmark.
pub const MAX_CANDIDATE_TEST_FILES: usize = 20;

/// Upper bound for any single test command.
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Upper bound for `bazel clean`.
pub const CLEAN_TIMEOUT: Duration = Duration::from_secs(2 * 60);

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Benchmark results attached to the report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeedReport {
    pub packages: Vec<PackageBenchmark>,
}

/// Timings for one package, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageBenchmark {
    pub path: String,
    pub go_test_ms: u64,
    pub bazel_test_cold_ms: u64,
    pub bazel_test_warm_ms: u64,
}

/// Outcome of one timed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub elapsed: Duration,
    /// The command exited with status zero.
    pub success: bool,
    /// The command was killed after exceeding its timeout.
    pub timed_out: bool,
}

impl Timing {
    pub fn millis(&self) -> u64 {
        u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX)
    }
}

/// The external tools a benchmark drives.
pub trait Toolchain {
    /// Time the native test runner on one package.
    ///
    /// A failing test run is still a timing; only a command that cannot be
    /// started is an error.
    fn native_test(&self, package: &Package) -> Result<Timing>;

    /// Drop build-tool caches so the next test run is cold. Best effort.
    fn clean(&self);

    /// Time the build tool's test runner on one package.
    fn build_test(&self, package: &Package) -> Result<Timing>;
}

/// Options for a benchmark run.
#[derive(Debug, Clone)]
pub struct BenchmarkOptions {
    /// Maximum number of packages to benchmark
    pub max_packages: usize,
    /// Upper bound for each test command
    pub command_timeout: Duration,
}

impl Default for BenchmarkOptions {
    fn default() -> Self {
        Self {
            max_packages: DEFAULT_MAX_BENCHMARKS,
            command_timeout: COMMAND_TIMEOUT,
        }
    }
}

impl BenchmarkOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum package count; zero keeps the default.
    pub fn max_packages(mut self, max: usize) -> Self {
        self.max_packages = if max == 0 {
            DEFAULT_MAX_BENCHMARKS
        } else {
            max
        };
        self
    }

    /// Set the per-command timeout; zero keeps the default.
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = if timeout.is_zero() {
            COMMAND_TIMEOUT
        } else {
            timeout
        };
        self
    }
}

/// Pick the packages worth benchmarking.
///
/// Candidates have test files, at most [`MAX_CANDIDATE_TEST_FILES`] of them,
/// and at least one test target. Smaller packages come first; ties keep
/// path order.
pub fn select_candidates(packages: &[Package], max: usize) -> Vec<&Package> {
    let mut candidates: Vec<&Package> = packages
        .iter()
        .filter(|p| {
            p.has_test_files
                && p.test_target_count > 0
                && p.test_file_count > 0
                && p.test_file_count <= MAX_CANDIDATE_TEST_FILES
        })
        .collect();

    candidates.sort_by_key(|p| p.test_file_count);
    candidates.truncate(max);
    candidates
}

/// Runs benchmarks over a package list.
pub struct BenchmarkRunner<T: Toolchain> {
    toolchain: T,
    options: BenchmarkOptions,
}

impl<T: Toolchain> BenchmarkRunner<T> {
    pub fn new(toolchain: T, options: BenchmarkOptions) -> Self {
        Self { toolchain, options }
    }

    /// Benchmark the selected candidates among `packages`.
    ///
    /// Packages whose native test command cannot be run are left out of the
    /// report with a warning.
    pub fn run(&self, packages: &[Package]) -> SpeedReport {
        let candidates = select_candidates(packages, self.options.max_packages);
        log::info!("Benchmarking {} packages", candidates.len());

        let mut report = SpeedReport::default();
        for package in candidates {
            match self.benchmark_package(package) {
                Ok(benchmark) => report.packages.push(benchmark),
                Err(e) => log::warn!("failed to benchmark {}: {e}", package.rel_path),
            }
        }
        report
    }

    fn benchmark_package(&self, package: &Package) -> Result<PackageBenchmark> {
        let native = self.toolchain.native_test(package)?;

        self.toolchain.clean();
        let cold = self.timed_build_test(package, "cold");
        let warm = self.timed_build_test(package, "warm");

        Ok(PackageBenchmark {
            path: package.rel_path.clone(),
            go_test_ms: native.millis(),
            bazel_test_cold_ms: cold,
            bazel_test_warm_ms: warm,
        })
    }

    /// Elapsed milliseconds of a build-tool test run, kept even when it fails.
    fn timed_build_test(&self, package: &Package, run: &str) -> u64 {
        match self.toolchain.build_test(package) {
            Ok(timing) => {
                if timing.timed_out {
                    log::warn!("bazel test ({run}) timed out for {}", package.rel_path);
                } else if !timing.success {
                    log::warn!("bazel test ({run}) had issues for {}", package.rel_path);
                }
                timing.millis()
            }
            Err(e) => {
                log::warn!("bazel test ({run}) could not run for {}: {e}", package.rel_path);
                0
            }
        }
    }
}

/// Runs the real `go` and `bazel` binaries.
#[derive(Debug, Clone)]
pub struct CommandToolchain {
    root: PathBuf,
    timeout: Duration,
    clean_timeout: Duration,
}

impl CommandToolchain {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_options(root, &BenchmarkOptions::default())
    }

    /// Toolchain whose test commands are bounded by `options.command_timeout`.
    pub fn with_options(root: impl Into<PathBuf>, options: &BenchmarkOptions) -> Self {
        Self {
            root: root.into(),
            timeout: options.command_timeout,
            clean_timeout: CLEAN_TIMEOUT,
        }
    }
}

impl Toolchain for CommandToolchain {
    fn native_test(&self, package: &Package) -> Result<Timing> {
        let module_dir = find_go_mod_dir(&self.root, &package.path).unwrap_or(self.root.as_path());
        let import_path = format!("./{}", relative_label(&package.path, module_dir));

        let mut command = Command::new("go");
        command
            .args(["test", "-count=1", import_path.as_str()])
            .current_dir(module_dir)
            .env("CGO_ENABLED", "0");
        run_timed(command, self.timeout)
    }

    fn clean(&self) {
        let mut command = Command::new("bazel");
        command.arg("clean").current_dir(&self.root);
        if let Err(e) = run_timed(command, self.clean_timeout) {
            log::debug!("bazel clean failed: {e}");
        }
    }

    fn build_test(&self, package: &Package) -> Result<Timing> {
        let target = bazel_target(&package.rel_path);
        let mut command = Command::new("bazel");
        command
            .args(["test", target.as_str(), "--test_output=errors"])
            .current_dir(&self.root);
        run_timed(command, self.timeout)
    }
}

/// All targets of the package at `rel_path`, e.g. `//svc/api:all`.
pub fn bazel_target(rel_path: &str) -> String {
    if rel_path == "." {
        "//:all".to_string()
    } else {
        format!("//{rel_path}:all")
    }
}

/// Nearest directory at or above `dir`, and inside `root`, holding a `go.mod`.
pub fn find_go_mod_dir<'a>(root: &Path, dir: &'a Path) -> Option<&'a Path> {
    let mut current = dir;
    loop {
        if current.join("go.mod").is_file() {
            return Some(current);
        }
        match current.parent() {
            Some(parent) if parent != current && parent.starts_with(root) => current = parent,
            _ => return None,
        }
    }
}

fn describe(command: &Command) -> String {
    let mut parts = vec![command.get_program().to_string_lossy().into_owned()];
    parts.extend(command.get_args().map(|a| a.to_string_lossy().into_owned()));
    parts.join(" ")
}

/// Run a command to completion or until `timeout`, discarding its output.
pub fn run_timed(mut command: Command, timeout: Duration) -> Result<Timing> {
    command.stdout(Stdio::null()).stderr(Stdio::null());

    let start = Instant::now();
    let mut child = command
        .spawn()
        .map_err(|source| BazelMetricsError::CommandSpawn {
            command: describe(&command),
            source,
        })?;

    loop {
        let status = match child.try_wait() {
            Ok(status) => status,
            Err(e) => {
                stop(&mut child);
                return Err(e.into());
            }
        };
        if let Some(status) = status {
            return Ok(Timing {
                elapsed: start.elapsed(),
                success: status.success(),
                timed_out: false,
            });
        }
        if start.elapsed() >= timeout {
            stop(&mut child);
            return Ok(Timing {
                elapsed: start.elapsed(),
                success: false,
                timed_out: true,
            });
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Kill a child and reap it.
fn stop(child: &mut Child) {
    if let Err(e) = child.kill() {
        log::debug!("could not kill pid {}: {e}", child.id());
    }
    if let Err(e) = child.wait() {
        log::debug!("could not reap pid {}: {e}", child.id());
    }
}
