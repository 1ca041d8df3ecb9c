//! Query processing: derive metrics from package lists.
//!
//! This module handles the third stage of the pipeline. It provides:
//!
//! - **LanguageSummary**: per-language counts and percentages
//! - **DirectoryMetrics**: the primary language broken down by top-level directory
//!
//! ## Example
//!
//! ```rust,ignore
//! use bazelmetricslib::query::{directory_breakdown, LanguageSummary};
//!
//! let summary = LanguageSummary::from_packages(Language::Go, result.packages(Language::Go));
//! let dirs = directory_breakdown(result.packages(Language::Go));
//! ```

pub mod metrics;

pub use metrics::{
    directory_breakdown, percentage, top_level_dir, DirectoryMetrics, LanguageSummary,
    ROOT_DIRECTORY_LABEL,
};
