//! Source discovery: decide which parts of the tree are scanned.
//!
//! This module handles the first stage of the pipeline. It provides:
//!
//! - **Exclusion rules**: VCS metadata, Bazel output trees, vendored and
//!   virtual-environment directories are never descended into
//! - **Scan options**: extra glob patterns for directories to prune
//!
//! ## Example
//!
//! ```rust
//! use bazelmetricslib::source::{should_skip_dir, ScanOptions};
//!
//! assert!(should_skip_dir("bazel-out"));
//!
//! let options = ScanOptions::new().exclude("third_party/**").unwrap();
//! assert!(options.excludes_dir("grpc", "third_party/grpc"));
//! ```

pub mod filter;

pub use filter::{relative_label, should_skip_dir, ScanOptions, BUILD_OUTPUT_PREFIX, SKIP_DIRS};
