//! Output: assemble the report the dashboard consumes.
//!
//! This module handles the fourth and final stage of the pipeline. It
//! merges language summaries, the directory breakdown, package lists and
//! optional benchmark results into one serializable [`Report`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use bazelmetricslib::output::Report;
//!
//! let report = Report::new(&scan);
//! report.write("metrics.json", true)?;
//! ```

pub mod report;

pub use report::{LanguagePackages, LanguageSummaries, PackageInfo, Report, Summary};
