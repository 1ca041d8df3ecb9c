//! Console rendering of scan results and reports.

use std::fmt::Write;

use bazelmetricslib::{DirectoryMetrics, Language, LanguageSummary, Report, ScanResult, SpeedReport};
use console::Style;

/// Number of directories shown in the breakdown.
const TOP_DIRECTORIES: usize = 10;

fn heading(text: &str) -> String {
    Style::new().bold().apply_to(text).to_string()
}

/// One-line package/BUILD file count after a scan.
pub fn render_scan_counts(scan: &ScanResult) -> String {
    let counts: Vec<String> = Language::ALL
        .iter()
        .map(|&language| format!("{} {language} packages", scan.packages(language).len()))
        .collect();
    format!(
        "Found: {}, {} BUILD files\n",
        counts.join(", "),
        scan.build_file_count
    )
}

fn render_language(out: &mut String, summary: &LanguageSummary) {
    let spec = summary.language.spec();
    let _ = writeln!(out, "\n{}", heading(&format!("--- {} ---", summary.language)));
    let _ = writeln!(out, "Packages:        {}", summary.total_packages);
    let _ = writeln!(
        out,
        "Bazelization:    {:.1}% ({}/{} packages have BUILD files)",
        summary.bazelization_pct, summary.packages_with_build, summary.total_packages
    );

    if spec.infers_tests_from_manifest() {
        let _ = writeln!(
            out,
            "Test Coverage:   {:.1}% ({}/{} packages have {} targets)",
            summary.test_coverage_pct,
            summary.packages_with_tests,
            summary.total_packages,
            spec.test_rule()
        );
        let _ = writeln!(out, "Source Files:    {}", summary.total_source_files);
    } else {
        let _ = writeln!(
            out,
            "Test Coverage:   {:.1}% ({}/{} packages have tests)",
            summary.test_coverage_pct, summary.packages_with_tests, summary.total_packages
        );
        let _ = writeln!(
            out,
            "Bazelized Tests: {:.1}% (packages with tests that have {} targets)",
            summary.bazelized_tests_pct,
            spec.test_rule()
        );
        let _ = writeln!(out, "Source Files:    {}", summary.total_source_files);
        let _ = writeln!(out, "Test Files:      {}", summary.total_test_files);
    }
    let _ = writeln!(out, "Test Targets:    {}", summary.total_test_targets);
}

fn render_directories(out: &mut String, directories: &[DirectoryMetrics]) {
    if directories.is_empty() {
        return;
    }
    let _ = writeln!(
        out,
        "\n{}",
        heading(&format!("=== Top {} Directories ===", Language::PRIMARY))
    );
    for dir in directories.iter().take(TOP_DIRECTORIES) {
        let _ = writeln!(
            out,
            "  {:<20} {:>4} pkgs, {:.1}% bazelized, {:.1}% with tests",
            dir.name, dir.total_packages, dir.bazelization_pct, dir.test_coverage_pct
        );
    }
}

/// Per-language summary blocks and the top directories of the primary language.
pub fn render_summary(report: &Report) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", heading("=== Summary ==="));

    for summary in report.language_summaries.iter() {
        render_language(&mut out, summary);
    }

    render_directories(&mut out, &report.directory_breakdown);
    out
}

/// Benchmark timings per package.
pub fn render_benchmarks(speed: &SpeedReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", heading("Benchmark Results:"));
    if speed.packages.is_empty() {
        let _ = writeln!(out, "  (no packages with both test files and go_test targets)");
    }
    for pkg in &speed.packages {
        let _ = writeln!(out, "  {}:", pkg.path);
        let _ = writeln!(out, "    go test:           {}ms", pkg.go_test_ms);
        let _ = writeln!(out, "    bazel test (cold): {}ms", pkg.bazel_test_cold_ms);
        let _ = writeln!(out, "    bazel test (warm): {}ms", pkg.bazel_test_warm_ms);
    }
    out
}
