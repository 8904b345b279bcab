use std::path::Path;

/// Path markers identifying files the migration must never touch.
///
/// Theme definition files are the migration target, not a migration source,
/// and generated files (`.g.dart`, `.freezed.dart`) are overwritten by their
/// generators anyway. Matching is a plain substring test against the full
/// path, so `app_theme.dart` is protected via the `theme.dart` marker.
pub const PROTECTED_MARKERS: [&str; 3] = ["theme.dart", ".g.dart", ".freezed.dart"];

/// Return the marker protecting `path`, if any.
///
/// A `Some` result means the file must be skipped before it is even opened.
pub fn protected_marker(path: &Path) -> Option<&'static str> {
    let haystack = path.to_string_lossy();
    PROTECTED_MARKERS
        .into_iter()
        .find(|marker| haystack.contains(marker))
}
