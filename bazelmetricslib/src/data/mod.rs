//! Data collection: walk the tree and build package records.
//!
//! This module handles the second stage of the pipeline. It provides:
//!
//! - **Manifest counting**: rule invocations per language in BUILD files
//! - **Walking**: one pass over the tree, aggregating files per directory
//! - **Packages**: finalized per-language package lists (`ScanResult`)
//!
//! ## Example
//!
//! ```rust,ignore
//! use bazelmetricslib::data::scan_repository;
//!
//! let result = scan_repository(".")?;
//! println!("{} BUILD files", result.build_file_count);
//! ```

pub mod manifest;
pub mod package;
pub mod walker;

pub use manifest::{is_manifest, ManifestCounter, ManifestTargets, TargetCounts, MANIFEST_FILE_NAMES};
pub use package::{LanguageTotals, Package, ScanResult};
pub use walker::{scan_repository, scan_repository_with, Walker};
