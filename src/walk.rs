//! Candidate discovery: recursive collection of Dart files under a root.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Collect every file under `root` whose name ends in `.dart`.
///
/// A symlink counts as a candidate when its target is a file; symlinked
/// directories are not descended. Traversal order is not guaranteed.
/// Unreadable entries are skipped rather than aborting the walk, and
/// `min_depth(1)` restricts the walk to entries under the root, so a root
/// that is itself a file yields nothing.
pub fn dart_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            let file_type = e.file_type();
            file_type.is_file() || (file_type.is_symlink() && e.path().is_file())
        })
        .filter(|e| e.file_name().to_string_lossy().ends_with(".dart"))
        .map(|e| e.into_path())
        .collect()
}
