//! # bazelmetricslib
//!
//! Measures how far a polyglot repository has been migrated to Bazel.
//!
//! ## Overview
//!
//! A single walk over the repository classifies every Go, Python and Rust
//! file, notes which directories hold a `BUILD`/`BUILD.bazel` manifest, and
//! counts the `*_test`, `*_library` and `*_binary` rules each manifest
//! declares. Each (directory, language) pair with at least one file becomes
//! a **package**. From the package lists the library derives:
//!
//! - **Bazelization**: share of packages with a BUILD file
//! - **Test coverage**: share of packages with test files
//! - **Bazelized tests**: share of test-having packages with a test target
//! - **Directory breakdown**: the primary language grouped by top-level directory
//!
//! An optional benchmark compares `go test` with cold and warm `bazel test`
//! runs for a few small packages.
//!
//! ## Pipeline
//!
//! 1. [`source`]: exclusion rules and scan options
//! 2. [`data`]: manifest counting, the walk, package lists
//! 3. [`query`]: summaries and percentages
//! 4. [`output`]: the JSON report
//!
//! ## Example
//!
//! ```rust
//! use bazelmetricslib::{scan_repository, Language, Report};
//! use std::fs;
//! use tempfile::tempdir;
//!
//! let dir = tempdir().unwrap();
//! let root = dir.path();
//! fs::create_dir_all(root.join("a")).unwrap();
//! fs::create_dir_all(root.join("b")).unwrap();
//! fs::write(root.join("a/a.go"), "package a\n").unwrap();
//! fs::write(root.join("a/a_test.go"), "package a\n").unwrap();
//! fs::write(root.join("a/BUILD.bazel"), "go_library(name = \"a\")\ngo_test(name = \"a_test\")\n").unwrap();
//! fs::write(root.join("b/b.go"), "package b\n").unwrap();
//!
//! let scan = scan_repository(root).unwrap();
//! let report = Report::new(&scan);
//!
//! let go = report.language_summaries.get(Language::Go).unwrap();
//! assert_eq!(go.total_packages, 2);
//! assert_eq!(go.bazelization_pct, 50.0);
//! assert_eq!(go.test_coverage_pct, 50.0);
//! assert_eq!(go.bazelized_tests_pct, 100.0);
//! ```

pub mod benchmark;
pub mod data;
pub mod error;
pub mod language;
pub mod output;
pub mod query;
pub mod source;

pub use benchmark::{
    BenchmarkOptions, BenchmarkRunner, CommandToolchain, PackageBenchmark, SpeedReport, Toolchain,
};
pub use data::{scan_repository, scan_repository_with, LanguageTotals, Package, ScanResult};
pub use error::BazelMetricsError;
pub use language::{Language, LanguageSpec, PerLanguage, TestDetection};
pub use output::{PackageInfo, Report, Summary};
pub use query::{directory_breakdown, DirectoryMetrics, LanguageSummary};
pub use source::ScanOptions;

/// Result type for bazelmetricslib operations
pub type Result<T> = std::result::Result<T, BazelMetricsError>;
