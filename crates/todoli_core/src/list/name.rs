//! List name validation for callers.
//!
//! The list engine does not re-validate names; presentation layers call
//! [`validate_list_name`] before creating or renaming a list.

use once_cell::sync::Lazy;
use regex::Regex;

// Characters rejected by at least one common host file system.
static ILLEGAL_NAME_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[<>:"/\\|?*\x00-\x1F]"#).expect("valid illegal-char regex"));

/// Returns `Ok(())` when `name` can be used as a list file name.
///
/// # Errors
/// Returns a human-readable reason for empty names, dot-only names, and
/// names containing characters that are illegal in file names.
pub fn validate_list_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("list name cannot be empty".to_string());
    }
    if name == "." || name == ".." {
        return Err(format!("`{name}` is not a valid list name"));
    }
    if let Some(found) = ILLEGAL_NAME_CHARS_RE.find(name) {
        return Err(format!(
            "list name contains illegal character {:?}",
            found.as_str()
        ));
    }
    Ok(())
}
