//! Shared text and repository-path normalization helpers.

use crate::constants::MARKDOWN_EXTENSION;

/// Trim an optional string and drop empty values.
///
/// # Returns
/// `None` when the input is missing or whitespace-only; otherwise the trimmed
/// string.
pub fn normalize_optional_nonempty(value: Option<String>) -> Option<String> {
    value.and_then(|raw| {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Normalize a repository-relative path.
///
/// Leading/trailing slashes and surrounding whitespace are removed so
/// `/data/md/` and `data/md` address the same folder.
pub fn normalize_repo_path(path: &str) -> String {
    path.trim().trim_matches('/').to_string()
}

/// Join a repository folder and an entry name with a single `/`.
pub fn join_repo_path(dir: &str, name: &str) -> String {
    let dir = normalize_repo_path(dir);
    let name = name.trim_matches('/');
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

/// Return `true` when `name` looks like a Markdown article file.
pub fn is_markdown_name(name: &str) -> bool {
    name.len() > MARKDOWN_EXTENSION.len() && name.ends_with(MARKDOWN_EXTENSION)
}
