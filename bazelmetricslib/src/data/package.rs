//! Package records and the finalized scan result.
//!
//! A package is one (directory, language) pair with at least one file of
//! that language directly in the directory. Subdirectories are independent
//! packages.

use std::path::PathBuf;

use serde::Serialize;

use crate::language::{Language, PerLanguage};

/// A finalized package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    /// Absolute directory path.
    pub path: PathBuf,
    /// Directory path relative to the repository root (`"."` for the root).
    pub rel_path: String,
    pub language: Language,
    /// A BUILD or BUILD.bazel file sits in the directory, whether or not it
    /// could be read.
    pub has_build_file: bool,
    pub has_test_files: bool,
    pub source_file_count: usize,
    pub test_file_count: usize,
    /// Test rules declared for this language in the directory's manifest.
    pub test_target_count: usize,
    pub library_target_count: usize,
    pub binary_target_count: usize,
}

impl Package {
    /// Create an empty package for a directory.
    pub fn new(path: PathBuf, rel_path: String, language: Language) -> Self {
        Self {
            path,
            rel_path,
            language,
            has_build_file: false,
            has_test_files: false,
            source_file_count: 0,
            test_file_count: 0,
            test_target_count: 0,
            library_target_count: 0,
            binary_target_count: 0,
        }
    }

    /// Whether the package has test files and a manifest test target.
    pub fn has_bazelized_tests(&self) -> bool {
        self.has_test_files && self.test_target_count > 0
    }
}

/// Repository-wide counters for one language, accumulated during the walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageTotals {
    pub source_files: usize,
    pub test_files: usize,
    pub test_targets: usize,
}

/// Result of scanning a repository.
///
/// Package lists are sorted by relative path (plain string order).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    /// Repository root as given to the scan.
    pub root: PathBuf,
    /// Number of manifest files found.
    pub build_file_count: usize,
    /// Per-language totals.
    pub totals: PerLanguage<LanguageTotals>,
    /// Per-language package lists.
    pub packages: PerLanguage<Vec<Package>>,
}

impl ScanResult {
    /// Flatten per-directory packages into sorted per-language lists.
    ///
    /// The totals are taken as computed during the walk, not recomputed.
    pub fn materialize<I>(
        root: PathBuf,
        build_file_count: usize,
        totals: PerLanguage<LanguageTotals>,
        directories: I,
    ) -> Self
    where
        I: IntoIterator<Item = PerLanguage<Option<Package>>>,
    {
        let mut packages: PerLanguage<Vec<Package>> = PerLanguage::default();

        for directory in directories {
            for (language, package) in directory {
                if let Some(package) = package {
                    packages[language].push(package);
                }
            }
        }

        for (_, list) in packages.iter_mut() {
            list.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
        }

        Self {
            root,
            build_file_count,
            totals,
            packages,
        }
    }

    /// Packages for one language.
    pub fn packages(&self, language: Language) -> &[Package] {
        &self.packages[language]
    }

    /// Languages with at least one package, in registration order.
    pub fn languages(&self) -> Vec<Language> {
        self.packages
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(language, _)| language)
            .collect()
    }

    /// Total number of packages across languages.
    pub fn package_count(&self) -> usize {
        self.packages.iter().map(|(_, list)| list.len()).sum()
    }
}
