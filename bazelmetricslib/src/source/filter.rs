//! Directory exclusion rules with glob pattern support.
//!
//! Excluded directories are pruned before the walker descends into them, so
//! nothing beneath them contributes to any count.

use std::path::Path;

use glob::Pattern;

use crate::error::BazelMetricsError;
use crate::Result;

/// Directory names that are never scanned.
pub const SKIP_DIRS: &[&str] = &[
    ".git",
    "bazel-bin",
    "bazel-out",
    "bazel-testlogs",
    "node_modules",
    ".cache",
    "vendor",
    "__pycache__",
    "target",
    ".venv",
    "venv",
];

/// Prefix of Bazel's convenience symlinks (`bazel-<workspace>`, `bazel-bin`, ...).
pub const BUILD_OUTPUT_PREFIX: &str = "bazel-";

/// Check if a directory should be skipped during traversal.
pub fn should_skip_dir(name: &str) -> bool {
    name.starts_with('.') || name.starts_with(BUILD_OUTPUT_PREFIX) || SKIP_DIRS.contains(&name)
}

/// Options controlling a repository scan.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Extra glob patterns matched against a directory's path relative to
    /// the repository root; matching directories are pruned.
    pub exclude: Vec<Pattern>,
}

impl ScanOptions {
    /// Create default options (built-in exclusions only).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an exclude pattern.
    pub fn exclude(mut self, pattern: &str) -> Result<Self> {
        let pat = Pattern::new(pattern).map_err(|e| BazelMetricsError::InvalidGlob {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        self.exclude.push(pat);
        Ok(self)
    }

    /// Add multiple exclude patterns.
    pub fn exclude_many(mut self, patterns: &[&str]) -> Result<Self> {
        for pattern in patterns {
            self = self.exclude(pattern)?;
        }
        Ok(self)
    }

    /// Whether the walker should prune this directory.
    ///
    /// `name` is the directory's base name and `rel_path` its `/`-separated
    /// path relative to the repository root.
    pub fn excludes_dir(&self, name: &str, rel_path: &str) -> bool {
        should_skip_dir(name) || self.exclude.iter().any(|p| p.matches(rel_path))
    }
}

/// Render a path relative to `root` with `/` separators, `"."` for the root.
pub fn relative_label(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}
