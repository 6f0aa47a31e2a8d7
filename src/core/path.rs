use crate::error::{DbxError, Result};

pub const ROOT: &str = "/";

/// Validate a user supplied remote path and normalize it to an absolute
/// path within the account namespace.
/// Examples: "docs/a.txt" -> "/docs/a.txt", "/docs/./x/../a.txt/" -> "/docs/a.txt"
pub fn validate_path(raw: &str) -> Result<String> {
    if raw.trim().is_empty() {
        return Err(DbxError::invalid_path(raw, "path is empty"));
    }

    if raw.chars().any(|c| c.is_control()) {
        return Err(DbxError::invalid_path(raw, "path contains control characters"));
    }

    if raw.contains('\\') {
        return Err(DbxError::invalid_path(raw, "path contains a backslash"));
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in raw.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                if segments.pop().is_none() {
                    return Err(DbxError::invalid_path(raw, "path escapes the account root"));
                }
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        return Ok(ROOT.to_string());
    }

    Ok(format!("/{}", segments.join("/")))
}

/// Last segment of a normalized remote path; empty for the root.
pub fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or_default()
}

pub fn is_root(path: &str) -> bool {
    path == ROOT
}
