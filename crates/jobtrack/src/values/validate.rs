//! Input normalisation for field values.

use std::sync::OnceLock;

use regex::Regex;

use super::PriorityGroup;
use crate::error::StoreError;

fn hex_color_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^#?[0-9a-fA-F]{6}$").expect("valid hex color regex"))
}

/// Derives a machine-safe key from a label.
///
/// `"Phone Screen!"` → `"phone_screen"`
pub fn slugify(label: &str) -> String {
    let lowered = label.trim().to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut in_whitespace = false;
    for c in lowered.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
        }
    }
    out
}

pub fn is_hex_color(s: &str) -> bool {
    hex_color_regex().is_match(s)
}

/// Validates a six-digit hex color and returns it with a leading `#`.
pub fn normalize_color(s: &str) -> Result<String, StoreError> {
    let s = s.trim();
    if !is_hex_color(s) {
        return Err(StoreError::InvalidArgument(format!(
            "invalid color '{}' (expected six hex digits, optionally prefixed with #)",
            s
        )));
    }
    if s.starts_with('#') {
        Ok(s.to_string())
    } else {
        Ok(format!("#{}", s))
    }
}

/// Parses an optional color field. Empty input means "no color".
pub fn optional_color(s: Option<&str>) -> Result<Option<String>, StoreError> {
    match s.map(str::trim) {
        None | Some("") => Ok(None),
        Some(color) => normalize_color(color).map(Some),
    }
}

/// Parses an optional priority group. Empty input means "no group".
pub fn optional_priority_group(s: Option<&str>) -> Result<Option<PriorityGroup>, StoreError> {
    match s.map(str::trim) {
        None | Some("") => Ok(None),
        Some(group) => group.parse().map(Some),
    }
}

/// Trims a label and rejects it when empty.
pub fn require_label(label: &str) -> Result<String, StoreError> {
    let label = label.trim();
    if label.is_empty() {
        return Err(StoreError::InvalidArgument("label is required".to_string()));
    }
    Ok(label.to_string())
}
