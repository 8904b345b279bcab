//! Per-file processing pipeline: skip check, read, rewrite, write-back.
//!
//! Each file moves through exactly one of these paths:
//! skipped (protected path, never opened), unchanged (rules matched
//! nothing), fixed (content rewritten and atomically replaced), or a
//! recovered read/write failure. Callers log failures and keep going; a
//! broken file must never abort the run.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::rules::{RuleError, RuleSet};
use crate::skip;

/// Terminal state of one processed file.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "FileOutcome carries the run accounting"]
pub enum FileOutcome {
    /// Path matched a protected marker; the file was never opened.
    Skipped { marker: &'static str },
    /// No rule changed the content; nothing was written.
    Unchanged,
    /// Content was rewritten. Carries the before/after text so callers can
    /// render a diff without re-reading the file.
    Fixed { old: String, new: String },
}

#[derive(Error, Debug)]
pub enum FileError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Rewrite failed for {path}: {source}")]
    Rewrite { path: PathBuf, source: RuleError },
}

/// Run one file through the pipeline.
///
/// Reads the full content as UTF-8, applies the rule set, and writes the
/// result back atomically when (and only when) the dirty bit is set. With
/// `dry_run` the write step is skipped entirely; the outcome still reports
/// `Fixed` so callers can preview the run.
pub fn process_file(
    path: &Path,
    rules: &RuleSet,
    dry_run: bool,
) -> Result<FileOutcome, FileError> {
    if let Some(marker) = skip::protected_marker(path) {
        return Ok(FileOutcome::Skipped { marker });
    }

    let original = fs::read_to_string(path).map_err(|source| FileError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let rewrite = rules.apply(&original).map_err(|source| FileError::Rewrite {
        path: path.to_path_buf(),
        source,
    })?;

    if !rewrite.changed {
        return Ok(FileOutcome::Unchanged);
    }

    if !dry_run {
        atomic_write(path, rewrite.content.as_bytes()).map_err(|source| FileError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }

    Ok(FileOutcome::Fixed {
        old: original,
        new: rewrite.content,
    })
}

/// Atomic file write: tempfile + fsync + rename.
///
/// Either the full replacement lands or the original survives untouched.
/// A symlink path is resolved first so the target file is replaced and the
/// link stays a link.
fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    // Renaming onto a symlink would replace the link itself, not its target
    let path = if path.is_symlink() {
        path.canonicalize()?
    } else {
        path.to_path_buf()
    };

    // Tempfile in the same directory to stay on the same filesystem
    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Path has no parent directory",
        )
    })?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(&path).map_err(|e| e.error)?;

    Ok(())
}

/// Run counters, fed one record per candidate file.
///
/// `unchanged` is derived rather than tallied, so
/// `fixed + unchanged == scanned` holds for every run. Skipped and errored
/// files land in the unchanged bucket.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub scanned: usize,
    pub fixed: usize,
}

impl RunSummary {
    pub fn record(&mut self, result: &Result<FileOutcome, FileError>) {
        self.scanned += 1;
        if let Ok(FileOutcome::Fixed { .. }) = result {
            self.fixed += 1;
        }
    }

    pub fn unchanged(&self) -> usize {
        self.scanned - self.fixed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::walk::dart_files;

    fn rules() -> RuleSet {
        RuleSet::white_to_theme().unwrap()
    }

    #[test]
    fn test_matching_file_rewritten_on_disk() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = temp_dir.path().join("login_screen.dart");
        fs::write(&file, "Text('hi', style: TextStyle(color: Colors.white))\n").unwrap();

        let outcome = process_file(&file, &rules(), false).unwrap();

        match outcome {
            FileOutcome::Fixed { old, new } => {
                assert!(old.contains("Colors.white"));
                assert!(new.contains("AppTheme.textColor"));
            }
            other => panic!("expected Fixed, got {other:?}"),
        }
        let on_disk = fs::read_to_string(&file).unwrap();
        assert_eq!(
            on_disk,
            "Text('hi', style: TextStyle(color: AppTheme.textColor))\n"
        );
    }

    #[test]
    fn test_clean_file_unchanged() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = temp_dir.path().join("clean.dart");
        let content = "final accent = Theme.of(context).colorScheme.primary;\n";
        fs::write(&file, content).unwrap();

        let outcome = process_file(&file, &rules(), false).unwrap();

        assert_eq!(outcome, FileOutcome::Unchanged);
        assert_eq!(fs::read_to_string(&file).unwrap(), content);
    }

    #[test]
    fn test_protected_file_never_opened() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = temp_dir.path().join("app_theme.dart");
        // Invalid UTF-8: reading this file would fail, so a Skipped outcome
        // proves the skip check runs before the read.
        fs::write(&file, [0xff, 0xfe, 0x80]).unwrap();

        let outcome = process_file(&file, &rules(), false).unwrap();

        assert_eq!(
            outcome,
            FileOutcome::Skipped {
                marker: "theme.dart"
            }
        );
        assert_eq!(fs::read(&file).unwrap(), vec![0xff, 0xfe, 0x80]);
    }

    #[test]
    fn test_generated_file_with_matching_content_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = temp_dir.path().join("model.g.dart");
        let content = "color: Colors.white,\n";
        fs::write(&file, content).unwrap();

        let outcome = process_file(&file, &rules(), false).unwrap();

        assert_eq!(outcome, FileOutcome::Skipped { marker: ".g.dart" });
        assert_eq!(fs::read_to_string(&file).unwrap(), content);
    }

    #[test]
    fn test_invalid_utf8_is_read_failure() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = temp_dir.path().join("binary.dart");
        fs::write(&file, [0xff, 0xfe, 0x80]).unwrap();

        let err = process_file(&file, &rules(), false).unwrap_err();

        assert!(matches!(err, FileError::Read { .. }));
    }

    #[test]
    fn test_missing_file_is_read_failure() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = temp_dir.path().join("gone.dart");

        let err = process_file(&file, &rules(), false).unwrap_err();

        assert!(matches!(err, FileError::Read { .. }));
    }

    #[test]
    fn test_dry_run_reports_fix_without_writing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = temp_dir.path().join("screen.dart");
        let content = "color: Colors.white70,\n";
        fs::write(&file, content).unwrap();

        let outcome = process_file(&file, &rules(), true).unwrap();

        assert!(matches!(outcome, FileOutcome::Fixed { .. }));
        assert_eq!(fs::read_to_string(&file).unwrap(), content);
    }

    #[test]
    #[cfg(unix)]
    fn test_unwritable_directory_is_write_failure() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("locked");
        fs::create_dir_all(&root).unwrap();
        let file = root.join("palette.dart");
        let content = "color: Colors.white,\n";
        fs::write(&file, content).unwrap();

        fs::set_permissions(&root, fs::Permissions::from_mode(0o555)).unwrap();
        // Mode bits do not bind a root user; bail out when the directory
        // accepts writes anyway.
        if fs::write(root.join("mode_check"), "").is_ok() {
            fs::set_permissions(&root, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = process_file(&file, &rules(), false);
        match &result {
            Err(FileError::Write { path, .. }) => assert_eq!(path, &file),
            other => panic!("expected write failure, got {other:?}"),
        }

        let mut summary = RunSummary::default();
        summary.record(&result);
        assert_eq!(summary.scanned, 1);
        assert_eq!(summary.fixed, 0);
        assert_eq!(summary.unchanged(), 1);

        fs::set_permissions(&root, fs::Permissions::from_mode(0o755)).unwrap();
        assert_eq!(fs::read_to_string(&file).unwrap(), content);
    }

    #[test]
    #[cfg(unix)]
    fn test_rewrite_through_symlink_replaces_target() {
        use std::os::unix::fs::symlink;

        let temp_dir = tempfile::tempdir().unwrap();
        let target = temp_dir.path().join("shared_button.dart");
        fs::write(&target, "color: Colors.white,\n").unwrap();
        let link = temp_dir.path().join("button.dart");
        symlink(&target, &link).unwrap();

        let outcome = process_file(&link, &rules(), false).unwrap();

        assert!(matches!(outcome, FileOutcome::Fixed { .. }));
        assert!(link.symlink_metadata().unwrap().file_type().is_symlink());
        assert_eq!(
            fs::read_to_string(&target).unwrap(),
            "color: AppTheme.textColor,\n"
        );
    }

    #[test]
    fn test_summary_accounting_over_mixed_tree() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("lib")).unwrap();
        fs::write(root.join("lib/a.dart"), "color: Colors.white,\n").unwrap();
        fs::write(root.join("lib/b.dart"), "color: Colors.white70,\n").unwrap();
        fs::write(root.join("lib/clean.dart"), "void main() {}\n").unwrap();
        fs::write(root.join("lib/app_theme.dart"), "color: Colors.white,\n").unwrap();
        fs::write(root.join("lib/broken.dart"), [0xff, 0xfe]).unwrap();

        let rules = rules();
        let mut summary = RunSummary::default();
        for path in dart_files(root) {
            let result = process_file(&path, &rules, false);
            summary.record(&result);
        }

        assert_eq!(summary.scanned, 5);
        assert_eq!(summary.fixed, 2);
        assert_eq!(summary.unchanged(), 3);
        assert_eq!(summary.fixed + summary.unchanged(), summary.scanned);
        // The protected file kept its content even though it matched
        assert_eq!(
            fs::read_to_string(root.join("lib/app_theme.dart")).unwrap(),
            "color: Colors.white,\n"
        );
    }

    #[test]
    fn test_record_counts_errors_as_scanned_not_fixed() {
        let mut summary = RunSummary::default();
        summary.record(&Ok(FileOutcome::Fixed {
            old: String::new(),
            new: String::new(),
        }));
        summary.record(&Ok(FileOutcome::Unchanged));
        summary.record(&Ok(FileOutcome::Skipped {
            marker: "theme.dart",
        }));
        summary.record(&Err(FileError::Write {
            path: PathBuf::from("lib/a.dart"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        }));

        assert_eq!(summary.scanned, 4);
        assert_eq!(summary.fixed, 1);
        assert_eq!(summary.unchanged(), 3);
    }

    #[test]
    fn test_second_pass_reports_unchanged() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = temp_dir.path().join("widget.dart");
        fs::write(&file, "Icon(Icons.add, color: Colors.white)\n").unwrap();

        let rules = rules();
        let first = process_file(&file, &rules, false).unwrap();
        assert!(matches!(first, FileOutcome::Fixed { .. }));

        let second = process_file(&file, &rules, false).unwrap();
        assert_eq!(second, FileOutcome::Unchanged);
    }
}
