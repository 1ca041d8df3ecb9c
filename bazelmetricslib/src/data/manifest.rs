//! BUILD file target counting.
//!
//! This is deliberately not a Starlark parser. A target is any line that,
//! after optional leading whitespace, starts with a known rule name followed
//! by `(`. Comment markers in that leading run are skipped too, so a
//! commented-out rule still counts, and macros wrapping a rule are not seen
//! through.

use std::fs;
use std::path::Path;

use regex::Regex;

use crate::error::BazelMetricsError;
use crate::language::{Language, PerLanguage};
use crate::Result;

/// File names recognized as Bazel build manifests.
pub const MANIFEST_FILE_NAMES: &[&str] = &["BUILD", "BUILD.bazel"];

/// Whether a file name is a build manifest.
pub fn is_manifest(file_name: &str) -> bool {
    MANIFEST_FILE_NAMES.contains(&file_name)
}

/// Target counts for one language within one manifest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetCounts {
    /// `<prefix>_test` invocations
    pub tests: usize,
    /// `<prefix>_library` invocations
    pub libraries: usize,
    /// `<prefix>_binary` invocations
    pub binaries: usize,
}

/// Target counts for every language, parsed from one manifest file.
pub type ManifestTargets = PerLanguage<TargetCounts>;

struct RulePatterns {
    test: Regex,
    library: Regex,
    binary: Regex,
}

/// Counts rule invocations in manifest text.
///
/// Patterns are compiled once and reused for every manifest of a scan.
pub struct ManifestCounter {
    patterns: Vec<(Language, RulePatterns)>,
}

fn rule_pattern(rule: &str) -> Result<Regex> {
    Regex::new(&format!(r"(?m)^[\s#]*{}\s*\(", regex::escape(rule))).map_err(|source| {
        BazelMetricsError::Pattern {
            rule: rule.to_string(),
            source,
        }
    })
}

impl ManifestCounter {
    /// Compile the rule patterns for every registered language.
    pub fn new() -> Result<Self> {
        let mut patterns = Vec::with_capacity(Language::COUNT);
        for language in Language::ALL {
            let spec = language.spec();
            patterns.push((
                language,
                RulePatterns {
                    test: rule_pattern(&spec.test_rule())?,
                    library: rule_pattern(&spec.library_rule())?,
                    binary: rule_pattern(&spec.binary_rule())?,
                },
            ));
        }
        Ok(Self { patterns })
    }

    /// Count rule invocations in manifest text.
    pub fn count(&self, text: &str) -> ManifestTargets {
        let mut targets = ManifestTargets::default();
        for (language, rules) in &self.patterns {
            targets[*language] = TargetCounts {
                tests: rules.test.find_iter(text).count(),
                libraries: rules.library.find_iter(text).count(),
                binaries: rules.binary.find_iter(text).count(),
            };
        }
        targets
    }

    /// Read and count a manifest file.
    ///
    /// Returns `None` when the file cannot be read; callers treat that as
    /// "no target data" rather than a failed scan.
    pub fn count_file(&self, path: &Path) -> Option<ManifestTargets> {
        match fs::read(path) {
            Ok(bytes) => Some(self.count(&String::from_utf8_lossy(&bytes))),
            Err(e) => {
                log::debug!("Could not read manifest {}: {e}", path.display());
                None
            }
        }
    }
}
