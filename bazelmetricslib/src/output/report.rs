//! The metrics report consumed by the dashboard.
//!
//! The JSON field names are a wire contract. Some of them (`summary`,
//! `packages`, `goTestTargetCount`, `goFileCount`) predate multi-language
//! support and keep their names for older consumers.

use std::fs;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::benchmark::SpeedReport;
use crate::data::package::{Package, ScanResult};
use crate::error::BazelMetricsError;
use crate::language::{Language, PerLanguage};
use crate::query::metrics::{directory_breakdown, DirectoryMetrics, LanguageSummary};
use crate::Result;

/// Package as it appears in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageInfo {
    /// Path relative to the repository root.
    pub path: String,
    pub language: Language,
    pub has_build_file: bool,
    pub has_test_files: bool,
    pub test_file_count: usize,
    #[serde(rename = "goTestTargetCount")]
    pub test_target_count: usize,
    #[serde(rename = "goFileCount")]
    pub source_file_count: usize,
}

impl From<&Package> for PackageInfo {
    fn from(pkg: &Package) -> Self {
        Self {
            path: pkg.rel_path.clone(),
            language: pkg.language,
            has_build_file: pkg.has_build_file,
            has_test_files: pkg.has_test_files,
            test_file_count: pkg.test_file_count,
            test_target_count: pkg.test_target_count,
            source_file_count: pkg.source_file_count,
        }
    }
}

/// Primary-language summary in its original single-language shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub bazelization_pct: f64,
    pub test_coverage_pct: f64,
    pub bazelized_tests_pct: f64,
    pub total_packages: usize,
    pub total_build_files: usize,
    pub total_test_files: usize,
    pub total_go_files: usize,
    pub packages_with_build: usize,
    pub packages_with_tests: usize,
    pub total_go_test_targets: usize,
}

impl Summary {
    fn from_language(summary: &LanguageSummary, build_file_count: usize) -> Self {
        Self {
            bazelization_pct: summary.bazelization_pct,
            test_coverage_pct: summary.test_coverage_pct,
            bazelized_tests_pct: summary.bazelized_tests_pct,
            total_packages: summary.total_packages,
            total_build_files: build_file_count,
            total_test_files: summary.total_test_files,
            total_go_files: summary.total_source_files,
            packages_with_build: summary.packages_with_build,
            packages_with_tests: summary.packages_with_tests,
            total_go_test_targets: summary.total_test_targets,
        }
    }
}

/// Language summaries keyed by language id, in registration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LanguageSummaries(Vec<LanguageSummary>);

impl LanguageSummaries {
    /// Look up one language's summary.
    pub fn get(&self, language: Language) -> Option<&LanguageSummary> {
        self.0.iter().find(|s| s.language == language)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LanguageSummary> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for LanguageSummaries {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for summary in &self.0 {
            map.serialize_entry(summary.language.id(), summary)?;
        }
        map.end()
    }
}

/// Per-language package arrays, each under its own top-level key
/// (`goPackages`, ...). Languages without packages are omitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LanguagePackages(PerLanguage<Vec<PackageInfo>>);

impl LanguagePackages {
    pub fn get(&self, language: Language) -> &[PackageInfo] {
        &self.0[language]
    }
}

impl Serialize for LanguagePackages {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let present = self.0.iter().filter(|(_, list)| !list.is_empty());
        let mut map = serializer.serialize_map(None)?;
        for (language, list) in present {
            map.serialize_entry(language.spec().packages_key, list)?;
        }
        map.end()
    }
}

/// The complete metrics report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// RFC 3339 UTC generation time.
    pub timestamp: String,
    pub repo_path: String,
    pub summary: Summary,
    /// Primary language only.
    pub directory_breakdown: Vec<DirectoryMetrics>,
    /// Primary-language packages.
    pub packages: Vec<PackageInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_comparison: Option<SpeedReport>,
    /// Languages with at least one package.
    pub languages: Vec<Language>,
    pub language_summaries: LanguageSummaries,
    #[serde(flatten)]
    pub language_packages: LanguagePackages,
}

impl Report {
    /// Build a report stamped with the current time.
    pub fn new(scan: &ScanResult) -> Self {
        Self::assemble(scan, Utc::now())
    }

    /// Build a report with an explicit timestamp.
    ///
    /// # Example
    ///
    /// ```rust
    /// use bazelmetricslib::{scan_repository, Report};
    /// use chrono::{TimeZone, Utc};
    /// use tempfile::tempdir;
    ///
    /// let dir = tempdir().unwrap();
    /// let scan = scan_repository(dir.path()).unwrap();
    /// let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    ///
    /// let report = Report::assemble(&scan, at);
    /// assert_eq!(report.timestamp, "2024-05-01T12:00:00Z");
    /// assert!(report.languages.is_empty());
    /// assert_eq!(report.summary.total_packages, 0);
    /// ```
    pub fn assemble(scan: &ScanResult, at: DateTime<Utc>) -> Self {
        let mut languages = Vec::new();
        let mut summaries = Vec::new();
        let mut language_packages: PerLanguage<Vec<PackageInfo>> = PerLanguage::default();
        let mut summary = Summary::default();

        for language in Language::ALL {
            let packages = scan.packages(language);
            if packages.is_empty() {
                continue;
            }

            let language_summary = LanguageSummary::from_packages(language, packages);
            if language == Language::PRIMARY {
                summary = Summary::from_language(&language_summary, scan.build_file_count);
            }

            languages.push(language);
            summaries.push(language_summary);
            language_packages[language] = packages.iter().map(PackageInfo::from).collect();
        }

        Self {
            timestamp: at.to_rfc3339_opts(SecondsFormat::Secs, true),
            repo_path: scan.root.display().to_string(),
            summary,
            directory_breakdown: directory_breakdown(scan.packages(Language::PRIMARY)),
            packages: language_packages[Language::PRIMARY].clone(),
            speed_comparison: None,
            languages,
            language_summaries: LanguageSummaries(summaries),
            language_packages: LanguagePackages(language_packages),
        }
    }

    /// Attach benchmark results as-is.
    pub fn set_speed_comparison(&mut self, speed: SpeedReport) {
        self.speed_comparison = Some(speed);
    }

    /// Serialize to JSON.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    /// Serialize and write to a file.
    pub fn write(&self, path: impl AsRef<Path>, pretty: bool) -> Result<()> {
        let path = path.as_ref();
        let json = self.to_json(pretty)?;
        fs::write(path, json).map_err(|source| BazelMetricsError::WriteReport {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::PackageBenchmark;
    use crate::data::walker::scan_repository;
    use chrono::TimeZone;
    use serde_json::Value;
    use std::path::Path;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 15, 9, 26).unwrap()
    }

    fn report_json(root: &Path) -> Value {
        let scan = scan_repository(root).unwrap();
        let report = Report::assemble(&scan, fixed_time());
        serde_json::from_str(&report.to_json(false).unwrap()).unwrap()
    }

    #[test]
    fn test_two_directory_scenario() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write(root, "a/a.go", "package a");
        write(root, "a/a_test.go", "package a");
        write(root, "a/BUILD.bazel", "go_library(\n    name = \"a\",\n)\ngo_test(\n    name = \"a_test\",\n)\n");
        write(root, "b/b.go", "package b");

        let json = report_json(root);
        let summary = &json["summary"];

        assert_eq!(summary["totalPackages"], 2);
        assert_eq!(summary["packagesWithBuild"], 1);
        assert_eq!(summary["packagesWithTests"], 1);
        assert_eq!(summary["bazelizationPct"], 50.0);
        assert_eq!(summary["testCoveragePct"], 50.0);
        assert_eq!(summary["bazelizedTestsPct"], 100.0);
        assert_eq!(summary["totalBuildFiles"], 1);
        assert_eq!(summary["totalGoFiles"], 2);
        assert_eq!(summary["totalTestFiles"], 1);
        assert_eq!(summary["totalGoTestTargets"], 1);

        assert_eq!(json["languages"], serde_json::json!(["go"]));
        assert_eq!(json["languageSummaries"]["go"]["bazelizationPct"], 50.0);
        assert_eq!(json["goPackages"].as_array().unwrap().len(), 2);
        assert_eq!(json["packages"], json["goPackages"]);
        assert!(json.get("pythonPackages").is_none());
        assert!(json.get("rustPackages").is_none());
        assert!(json.get("speedComparison").is_none());
    }

    #[test]
    fn test_package_info_wire_names() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write(root, "a/a.go", "");
        write(root, "a/a_test.go", "");
        write(root, "a/BUILD", "go_test(\n");

        let json = report_json(root);
        let pkg = &json["packages"][0];

        assert_eq!(pkg["path"], "a");
        assert_eq!(pkg["language"], "go");
        assert_eq!(pkg["hasBuildFile"], true);
        assert_eq!(pkg["hasTestFiles"], true);
        assert_eq!(pkg["testFileCount"], 1);
        assert_eq!(pkg["goTestTargetCount"], 1);
        assert_eq!(pkg["goFileCount"], 1);
    }

    #[test]
    fn test_empty_repository() {
        let temp = tempdir().unwrap();
        write(temp.path(), "README.md", "# nothing here");

        let json = report_json(temp.path());

        assert_eq!(json["timestamp"], "2025-03-14T15:09:26Z");
        assert_eq!(json["languages"], serde_json::json!([]));
        assert_eq!(json["languageSummaries"], serde_json::json!({}));
        assert_eq!(json["packages"], serde_json::json!([]));
        assert_eq!(json["directoryBreakdown"], serde_json::json!([]));
        assert_eq!(json["summary"]["totalPackages"], 0);
        assert_eq!(json["summary"]["bazelizationPct"], 0.0);
        assert_eq!(json["summary"]["bazelizedTestsPct"], 0.0);
        assert!(json.get("goPackages").is_none());
    }

    #[test]
    fn test_language_order_is_registration_order() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write(root, "z/lib.rs", "");
        write(root, "y/app.py", "");
        write(root, "x/main.go", "");

        let scan = scan_repository(root).unwrap();
        let report = Report::assemble(&scan, fixed_time());
        let json = report.to_json(false).unwrap();

        let go = json.find("\"go\":{").unwrap();
        let py = json.find("\"python\":{").unwrap();
        let rs = json.find("\"rust\":{").unwrap();
        assert!(go < py && py < rs);

        assert_eq!(
            report.languages,
            vec![Language::Go, Language::Python, Language::Rust]
        );
        assert_eq!(report.language_summaries.len(), 3);
        assert_eq!(
            report
                .language_summaries
                .get(Language::Python)
                .unwrap()
                .total_packages,
            1
        );
    }

    #[test]
    fn test_non_primary_languages_only() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write(root, "tools/gen.py", "");
        write(root, "tools/BUILD", "py_binary(\n");

        let json = report_json(root);

        assert_eq!(json["languages"], serde_json::json!(["python"]));
        assert_eq!(json["packages"], serde_json::json!([]));
        assert_eq!(json["directoryBreakdown"], serde_json::json!([]));
        // The legacy summary mirrors the primary language only.
        assert_eq!(json["summary"]["totalPackages"], 0);
        assert_eq!(json["summary"]["totalBuildFiles"], 0);
        assert_eq!(json["pythonPackages"][0]["path"], "tools");
    }

    #[test]
    fn test_directory_breakdown_covers_all_primary_packages() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        for dir in ["svc/a", "svc/b", "svc", "lib/x", "tools"] {
            write(root, &format!("{dir}/f.go"), "");
        }
        write(root, "main.go", "");

        let scan = scan_repository(root).unwrap();
        let report = Report::assemble(&scan, fixed_time());

        let total: usize = report
            .directory_breakdown
            .iter()
            .map(|d| d.total_packages)
            .sum();
        assert_eq!(total, report.summary.total_packages);
        assert_eq!(report.directory_breakdown[0].name, "svc");
        assert!(report
            .directory_breakdown
            .iter()
            .any(|d| d.name == "(root)"));
    }

    #[test]
    fn test_speed_comparison_attached_verbatim() {
        let temp = tempdir().unwrap();
        write(temp.path(), "a/a.go", "");
        let scan = scan_repository(temp.path()).unwrap();
        let mut report = Report::assemble(&scan, fixed_time());

        report.set_speed_comparison(SpeedReport {
            packages: vec![PackageBenchmark {
                path: "a".to_string(),
                go_test_ms: 120,
                bazel_test_cold_ms: 9000,
                bazel_test_warm_ms: 300,
            }],
        });

        let json: Value = serde_json::from_str(&report.to_json(true).unwrap()).unwrap();
        let bench = &json["speedComparison"]["packages"][0];
        assert_eq!(bench["path"], "a");
        assert_eq!(bench["goTestMs"], 120);
        assert_eq!(bench["bazelTestColdMs"], 9000);
        assert_eq!(bench["bazelTestWarmMs"], 300);
    }

    #[test]
    fn test_idempotent_except_timestamp() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        write(root, "a/a.go", "");
        write(root, "a/BUILD", "go_library(\n");
        write(root, "b/test_b.py", "");

        let first = Report::new(&scan_repository(root).unwrap());
        let mut second = Report::new(&scan_repository(root).unwrap());
        second.timestamp = first.timestamp.clone();

        assert_eq!(first, second);
    }

    #[test]
    fn test_write_report() {
        let temp = tempdir().unwrap();
        write(temp.path(), "a/a.go", "");
        let scan = scan_repository(temp.path()).unwrap();
        let report = Report::assemble(&scan, fixed_time());

        let out = temp.path().join("metrics.json");
        report.write(&out, true).unwrap();

        let written = fs::read_to_string(&out).unwrap();
        assert!(written.contains("\n  \"timestamp\""));
    }

    #[test]
    fn test_write_report_failure() {
        let temp = tempdir().unwrap();
        let scan = scan_repository(temp.path()).unwrap();
        let report = Report::assemble(&scan, fixed_time());

        let result = report.write(temp.path().join("missing/dir/metrics.json"), false);
        assert!(matches!(result, Err(BazelMetricsError::WriteReport { .. })));
    }
}
