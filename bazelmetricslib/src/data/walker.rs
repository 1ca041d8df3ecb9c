//! Single-pass repository walk.
//!
//! The walk visits every non-excluded file once and folds it into the
//! aggregate of its containing directory. Aggregates live in a map owned by
//! one [`Walker`] for the duration of one scan; they are finalized into
//! packages and handed to [`ScanResult::materialize`] when the walk ends.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::BazelMetricsError;
use crate::language::{FileKind, Language, PerLanguage};
use crate::source::filter::{relative_label, ScanOptions};
use crate::Result;

use super::manifest::{is_manifest, ManifestCounter, ManifestTargets};
use super::package::{LanguageTotals, Package, ScanResult};

/// Everything learned about one directory during the walk.
#[derive(Debug)]
struct DirectoryAggregate {
    has_manifest: bool,
    targets: Option<ManifestTargets>,
    packages: PerLanguage<Option<Package>>,
}

impl DirectoryAggregate {
    fn new() -> Self {
        Self {
            has_manifest: false,
            targets: None,
            packages: PerLanguage::default(),
        }
    }

    /// Copy manifest data onto this directory's packages.
    fn finalize(self, totals: &mut PerLanguage<LanguageTotals>) -> PerLanguage<Option<Package>> {
        let mut packages = self.packages;

        for (language, slot) in packages.iter_mut() {
            let Some(package) = slot else {
                continue;
            };

            package.has_build_file = self.has_manifest;

            if let Some(targets) = &self.targets {
                let counts = targets[language];
                package.test_target_count = counts.tests;
                package.library_target_count = counts.libraries;
                package.binary_target_count = counts.binaries;
                totals[language].test_targets += counts.tests;

                if language.spec().infers_tests_from_manifest() && counts.tests > 0 {
                    package.has_test_files = true;
                    package.test_file_count = counts.tests;
                    totals[language].test_files += counts.tests;
                }
            }
        }

        packages
    }
}

/// Walks a repository and builds a [`ScanResult`].
pub struct Walker {
    root: PathBuf,
    options: ScanOptions,
    counter: ManifestCounter,
    directories: HashMap<PathBuf, DirectoryAggregate>,
    totals: PerLanguage<LanguageTotals>,
    build_file_count: usize,
}

impl Walker {
    /// Create a walker for one scan of `root`.
    pub fn new(root: impl AsRef<Path>, options: ScanOptions) -> Result<Self> {
        Ok(Self {
            root: root.as_ref().to_path_buf(),
            options,
            counter: ManifestCounter::new()?,
            directories: HashMap::new(),
            totals: PerLanguage::default(),
            build_file_count: 0,
        })
    }

    /// Walk the tree and return the finalized result.
    ///
    /// Only a missing or unreadable root is an error; problems with
    /// individual entries are logged and skipped.
    pub fn run(mut self) -> Result<ScanResult> {
        if !self.root.exists() {
            return Err(BazelMetricsError::PathNotFound(self.root));
        }

        let root = self.root.clone();
        let options = self.options.clone();
        let walker = WalkDir::new(&root)
            .follow_links(false)
            .follow_root_links(true)
            .into_iter();

        for entry in walker.filter_entry(|e| {
            // Always include the root directory
            if e.depth() == 0 {
                return true;
            }
            if e.file_type().is_dir() {
                let name = e.file_name().to_string_lossy();
                let rel = relative_label(e.path(), &root);
                return !options.excludes_dir(&name, &rel);
            }
            true
        }) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) if e.depth() == 0 => {
                    return Err(BazelMetricsError::Walk {
                        path: self.root.clone(),
                        source: e,
                    });
                }
                Err(e) => {
                    log::debug!("Skipping unreadable entry: {e}");
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                continue;
            }

            self.visit_file(entry.path());
        }

        let directories = std::mem::take(&mut self.directories);
        let mut totals = self.totals;
        let finalized: Vec<_> = directories
            .into_values()
            .map(|aggregate| aggregate.finalize(&mut totals))
            .collect();

        let result =
            ScanResult::materialize(self.root, self.build_file_count, totals, finalized);

        log::info!(
            "Scanned {}: {} packages, {} BUILD files",
            result.root.display(),
            result.package_count(),
            result.build_file_count
        );

        Ok(result)
    }

    fn visit_file(&mut self, path: &Path) {
        let (Some(dir), Some(file_name)) = (path.parent(), path.file_name()) else {
            return;
        };
        let file_name = file_name.to_string_lossy();

        let aggregate = self
            .directories
            .entry(dir.to_path_buf())
            .or_insert_with(DirectoryAggregate::new);

        if is_manifest(&file_name) {
            aggregate.has_manifest = true;
            self.build_file_count += 1;
            // Last manifest read wins if both spellings are present.
            if let Some(targets) = self.counter.count_file(path) {
                aggregate.targets = Some(targets);
            }
        }

        for language in Language::ALL {
            let Some(kind) = language.spec().classify(&file_name) else {
                continue;
            };

            let package = aggregate.packages[language].get_or_insert_with(|| {
                Package::new(
                    dir.to_path_buf(),
                    relative_label(dir, &self.root),
                    language,
                )
            });

            match kind {
                FileKind::Test => {
                    package.has_test_files = true;
                    package.test_file_count += 1;
                    self.totals[language].test_files += 1;
                }
                FileKind::Source => {
                    package.source_file_count += 1;
                    self.totals[language].source_files += 1;
                }
            }
        }
    }
}

/// Scan a repository with default options.
///
/// # Example
///
/// ```rust
/// use bazelmetricslib::{scan_repository, Language};
/// use std::fs;
/// use tempfile::tempdir;
///
/// let dir = tempdir().unwrap();
/// fs::create_dir(dir.path().join("server")).unwrap();
/// fs::write(dir.path().join("server/main.go"), "package main\n").unwrap();
/// fs::write(dir.path().join("server/BUILD.bazel"), "go_binary(name = \"server\")\n").unwrap();
///
/// let result = scan_repository(dir.path()).unwrap();
/// let go = result.packages(Language::Go);
/// assert_eq!(go.len(), 1);
/// assert_eq!(go[0].rel_path, "server");
/// assert!(go[0].has_build_file);
/// assert_eq!(go[0].binary_target_count, 1);
/// ```
pub fn scan_repository(root: impl AsRef<Path>) -> Result<ScanResult> {
    scan_repository_with(root, ScanOptions::new())
}

/// Scan a repository with explicit options.
pub fn scan_repository_with(root: impl AsRef<Path>, options: ScanOptions) -> Result<ScanResult> {
    Walker::new(root, options)?.run()
}
