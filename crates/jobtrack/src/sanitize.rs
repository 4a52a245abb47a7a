//! Helpers for keeping file-system details out of logs and file names.

use std::path::Path;

/// Returns only the filename component of a path (no directory).
///
/// Safe for log fields: keeps the file name, drops the directories.
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

/// Replaces every character outside `[A-Za-z0-9._-]` with `_` and drops any
/// directory components a client may have sent.
///
/// - `my cv (final).pdf` → `my_cv__final_.pdf`
/// - `../../etc/passwd` → `passwd`
pub fn safe_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches('.').is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}
