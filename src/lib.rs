//! Theme Patcher: automated white-color migration for Flutter source trees
//!
//! Walks a directory of Dart files and rewrites hardcoded `Colors.white`
//! variants to `AppTheme` references using an ordered table of regex rules,
//! skipping theme definitions and generated files.
//!
//! # Architecture
//!
//! The core is a pure rule engine: [`RuleSet::apply`] takes content in and
//! returns content plus a dirty bit out, with no I/O. Everything around it
//! is thin plumbing: [`dart_files`] discovers candidates, [`process_file`]
//! runs one file through skip check, read, rewrite, and atomic write-back,
//! and [`RunSummary`] keeps the run accounting honest.
//!
//! # Safety
//!
//! - Protected paths (`theme.dart`, generated files) are skipped before any read
//! - Atomic file writes (tempfile + fsync + rename)
//! - Files are written only when content actually changed
//! - Idempotent: re-running over a migrated tree changes nothing
//! - Per-file failures are reported and never abort the run
//!
//! # Example
//!
//! ```
//! use theme_patcher::RuleSet;
//!
//! let rules = RuleSet::white_to_theme().unwrap();
//! let rewrite = rules.apply("color: Colors.white,").unwrap();
//!
//! assert!(rewrite.changed);
//! assert_eq!(rewrite.content, "color: AppTheme.textColor,");
//! ```

pub mod process;
pub mod rules;
pub mod skip;
pub mod walk;

// Re-exports
pub use process::{process_file, FileError, FileOutcome, RunSummary};
pub use rules::{Rewrite, Rule, RuleError, RuleSet};
pub use skip::{protected_marker, PROTECTED_MARKERS};
pub use walk::dart_files;
