//! Language registry.
//!
//! Every language the scanner understands is described by one [`LanguageSpec`]
//! record: how its source files are named, how its test files are recognized,
//! and which Bazel rule prefix its manifest targets use. The walker and the
//! manifest counter only ever consult these records, so supporting another
//! language means adding a [`Language`] variant and its spec.

use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// A language tracked by the scanner.
///
/// Variants are listed in registration order. The first registered language
/// is the primary one: it gets the directory breakdown, the legacy summary
/// and benchmarking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Go,
    Python,
    Rust,
}

impl Language {
    /// Number of registered languages.
    pub const COUNT: usize = 3;

    /// All languages in registration order.
    pub const ALL: [Language; Language::COUNT] = [Language::Go, Language::Python, Language::Rust];

    /// The primary language.
    pub const PRIMARY: Language = Language::ALL[0];

    /// Position of this language in registration order.
    pub const fn index(self) -> usize {
        match self {
            Language::Go => 0,
            Language::Python => 1,
            Language::Rust => 2,
        }
    }

    /// The capability record for this language.
    pub fn spec(self) -> &'static LanguageSpec {
        &SPECS[self.index()]
    }

    /// Lowercase identifier used on the wire.
    pub fn id(self) -> &'static str {
        self.spec().id
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spec().display_name)
    }
}

/// How test files are told apart from source files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestDetection {
    /// A file is a test if its name ends with any suffix or starts with any prefix.
    FileName {
        suffixes: &'static [&'static str],
        prefixes: &'static [&'static str],
    },
    /// Tests live inline in source files; every file counts as source and
    /// test presence is inferred from the manifest's test targets.
    ManifestTargets,
}

/// Static description of one language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageSpec {
    /// Wire identifier ("go", "python", "rust")
    pub id: &'static str,
    /// Human-readable name for console output
    pub display_name: &'static str,
    /// Suffix every source or test file carries
    pub source_suffix: &'static str,
    /// Test file recognition
    pub test_detection: TestDetection,
    /// Bazel rule prefix (`go` gives `go_test`, `go_library`, `go_binary`)
    pub rule_prefix: &'static str,
    /// Report key holding this language's package list
    pub packages_key: &'static str,
}

static SPECS: [LanguageSpec; Language::COUNT] = [
    LanguageSpec {
        id: "go",
        display_name: "Go",
        source_suffix: ".go",
        test_detection: TestDetection::FileName {
            suffixes: &["_test.go"],
            prefixes: &[],
        },
        rule_prefix: "go",
        packages_key: "goPackages",
    },
    LanguageSpec {
        id: "python",
        display_name: "Python",
        source_suffix: ".py",
        test_detection: TestDetection::FileName {
            suffixes: &["_test.py", "_tests.py"],
            prefixes: &["test_"],
        },
        rule_prefix: "py",
        packages_key: "pythonPackages",
    },
    LanguageSpec {
        id: "rust",
        display_name: "Rust",
        source_suffix: ".rs",
        test_detection: TestDetection::ManifestTargets,
        rule_prefix: "rust",
        packages_key: "rustPackages",
    },
];

/// What a file name means for a given language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Source,
    Test,
}

impl LanguageSpec {
    /// Classify a file name, or `None` if it is not a file of this language.
    pub fn classify(&self, file_name: &str) -> Option<FileKind> {
        if !file_name.ends_with(self.source_suffix) {
            return None;
        }
        match self.test_detection {
            TestDetection::FileName { suffixes, prefixes } => {
                let is_test = suffixes.iter().any(|s| file_name.ends_with(s))
                    || prefixes.iter().any(|p| file_name.starts_with(p));
                Some(if is_test {
                    FileKind::Test
                } else {
                    FileKind::Source
                })
            }
            TestDetection::ManifestTargets => Some(FileKind::Source),
        }
    }

    /// Rule name for test targets, e.g. `go_test`.
    pub fn test_rule(&self) -> String {
        format!("{}_test", self.rule_prefix)
    }

    /// Rule name for library targets, e.g. `py_library`.
    pub fn library_rule(&self) -> String {
        format!("{}_library", self.rule_prefix)
    }

    /// Rule name for binary targets, e.g. `rust_binary`.
    pub fn binary_rule(&self) -> String {
        format!("{}_binary", self.rule_prefix)
    }

    /// Whether test presence comes from manifest targets rather than file names.
    pub fn infers_tests_from_manifest(&self) -> bool {
        matches!(self.test_detection, TestDetection::ManifestTargets)
    }
}

/// One value per registered language, indexed by [`Language`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerLanguage<T> {
    slots: [T; Language::COUNT],
}

impl<T: Default> Default for PerLanguage<T> {
    fn default() -> Self {
        Self {
            slots: Default::default(),
        }
    }
}

impl<T> PerLanguage<T> {
    /// Iterate `(language, value)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (Language, &T)> {
        Language::ALL.into_iter().zip(self.slots.iter())
    }

    /// Mutable variant of [`PerLanguage::iter`].
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Language, &mut T)> {
        Language::ALL.into_iter().zip(self.slots.iter_mut())
    }
}

impl<T> IntoIterator for PerLanguage<T> {
    type Item = (Language, T);
    type IntoIter = std::iter::Zip<
        std::array::IntoIter<Language, { Language::COUNT }>,
        std::array::IntoIter<T, { Language::COUNT }>,
    >;

    fn into_iter(self) -> Self::IntoIter {
        Language::ALL.into_iter().zip(self.slots)
    }
}

impl<T> Index<Language> for PerLanguage<T> {
    type Output = T;

    fn index(&self, language: Language) -> &T {
        &self.slots[language.index()]
    }
}

impl<T> IndexMut<Language> for PerLanguage<T> {
    fn index_mut(&mut self, language: Language) -> &mut T {
        &mut self.slots[language.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_order() {
        assert_eq!(Language::PRIMARY, Language::Go);
        for (i, lang) in Language::ALL.iter().enumerate() {
            assert_eq!(lang.index(), i);
        }
    }

    #[test]
    fn test_go_classification() {
        let go = Language::Go.spec();
        assert_eq!(go.classify("main.go"), Some(FileKind::Source));
        assert_eq!(go.classify("main_test.go"), Some(FileKind::Test));
        // Go has no prefix convention
        assert_eq!(go.classify("test_main.go"), Some(FileKind::Source));
        assert_eq!(go.classify("main.py"), None);
        assert_eq!(go.classify("go.mod"), None);
    }

    #[test]
    fn test_python_classification() {
        let py = Language::Python.spec();
        assert_eq!(py.classify("app.py"), Some(FileKind::Source));
        assert_eq!(py.classify("app_test.py"), Some(FileKind::Test));
        assert_eq!(py.classify("app_tests.py"), Some(FileKind::Test));
        assert_eq!(py.classify("test_app.py"), Some(FileKind::Test));
        assert_eq!(py.classify("testing.py"), Some(FileKind::Source));
        assert_eq!(py.classify("app.pyc"), None);
    }

    #[test]
    fn test_rust_files_are_always_source() {
        let rust = Language::Rust.spec();
        assert_eq!(rust.classify("lib.rs"), Some(FileKind::Source));
        assert_eq!(rust.classify("lib_test.rs"), Some(FileKind::Source));
        assert_eq!(rust.classify("test_lib.rs"), Some(FileKind::Source));
        assert!(rust.infers_tests_from_manifest());
    }

    #[test]
    fn test_rule_names() {
        assert_eq!(Language::Go.spec().test_rule(), "go_test");
        assert_eq!(Language::Python.spec().library_rule(), "py_library");
        assert_eq!(Language::Rust.spec().binary_rule(), "rust_binary");
    }

    #[test]
    fn test_serde_ids() {
        let json = serde_json::to_string(&Language::ALL).unwrap();
        assert_eq!(json, r#"["go","python","rust"]"#);
        assert_eq!(Language::Python.id(), "python");
        assert_eq!(Language::Rust.to_string(), "Rust");
    }

    #[test]
    fn test_per_language_indexing() {
        let mut counts: PerLanguage<usize> = PerLanguage::default();
        counts[Language::Python] += 2;
        counts[Language::Rust] += 1;

        let collected: Vec<_> = counts.iter().map(|(l, c)| (l, *c)).collect();
        assert_eq!(
            collected,
            vec![(Language::Go, 0), (Language::Python, 2), (Language::Rust, 1)]
        );
    }
}
