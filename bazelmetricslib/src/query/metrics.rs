//! Percentage metrics over finalized package lists.
//!
//! All percentages are plain `f64` in `[0, 100]`, unrounded. A zero
//! denominator yields `0.0`, never NaN.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::data::package::Package;
use crate::language::Language;

/// Label used for packages at the repository root in the directory breakdown.
pub const ROOT_DIRECTORY_LABEL: &str = "(root)";

/// `100 * part / whole`, or `0.0` when `whole` is zero.
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Per-language rollup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageSummary {
    pub language: Language,
    /// Packages with a BUILD file, over all packages.
    pub bazelization_pct: f64,
    /// Packages with test files, over all packages.
    pub test_coverage_pct: f64,
    /// Packages with test files *and* a test target, over packages with test files.
    pub bazelized_tests_pct: f64,
    pub total_packages: usize,
    pub total_source_files: usize,
    pub total_test_files: usize,
    pub packages_with_build: usize,
    pub packages_with_tests: usize,
    pub total_test_targets: usize,
}

impl LanguageSummary {
    /// Summarize one language's packages.
    pub fn from_packages(language: Language, packages: &[Package]) -> Self {
        let mut total_source_files = 0;
        let mut total_test_files = 0;
        let mut total_test_targets = 0;
        let mut packages_with_build = 0;
        let mut packages_with_tests = 0;
        let mut packages_with_bazelized_tests = 0;

        for pkg in packages {
            total_source_files += pkg.source_file_count;
            total_test_files += pkg.test_file_count;
            total_test_targets += pkg.test_target_count;

            if pkg.has_build_file {
                packages_with_build += 1;
            }
            if pkg.has_test_files {
                packages_with_tests += 1;
            }
            if pkg.has_bazelized_tests() {
                packages_with_bazelized_tests += 1;
            }
        }

        let total_packages = packages.len();

        Self {
            language,
            bazelization_pct: percentage(packages_with_build, total_packages),
            test_coverage_pct: percentage(packages_with_tests, total_packages),
            bazelized_tests_pct: percentage(packages_with_bazelized_tests, packages_with_tests),
            total_packages,
            total_source_files,
            total_test_files,
            packages_with_build,
            packages_with_tests,
            total_test_targets,
        }
    }
}

/// Rollup for one top-level directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryMetrics {
    pub name: String,
    pub total_packages: usize,
    pub bazelized_packages: usize,
    pub packages_with_tests: usize,
    pub bazelization_pct: f64,
    pub test_coverage_pct: f64,
}

impl DirectoryMetrics {
    fn new(name: String) -> Self {
        Self {
            name,
            total_packages: 0,
            bazelized_packages: 0,
            packages_with_tests: 0,
            bazelization_pct: 0.0,
            test_coverage_pct: 0.0,
        }
    }
}

/// First segment of a relative package path, or the root label.
pub fn top_level_dir(rel_path: &str) -> &str {
    match rel_path.split('/').find(|s| !s.is_empty() && *s != ".") {
        Some(first) => first,
        None => ROOT_DIRECTORY_LABEL,
    }
}

/// Group packages by top-level directory.
///
/// Sorted by package count, largest first; equal counts are ordered by name.
pub fn directory_breakdown(packages: &[Package]) -> Vec<DirectoryMetrics> {
    let mut by_name: HashMap<&str, DirectoryMetrics> = HashMap::new();

    for pkg in packages {
        let name = top_level_dir(&pkg.rel_path);
        let dm = by_name
            .entry(name)
            .or_insert_with(|| DirectoryMetrics::new(name.to_string()));

        dm.total_packages += 1;
        if pkg.has_build_file {
            dm.bazelized_packages += 1;
        }
        if pkg.has_test_files {
            dm.packages_with_tests += 1;
        }
    }

    let mut result: Vec<DirectoryMetrics> = by_name
        .into_values()
        .map(|mut dm| {
            dm.bazelization_pct = percentage(dm.bazelized_packages, dm.total_packages);
            dm.test_coverage_pct = percentage(dm.packages_with_tests, dm.total_packages);
            dm
        })
        .collect();

    result.sort_by(|a, b| {
        b.total_packages
            .cmp(&a.total_packages)
            .then_with(|| a.name.cmp(&b.name))
    });

    result
}
