//! Read-only local mirror of the repository content.
//!
//! The mirror is a fallback for reads when the remote store is unreachable.
//! Nothing in this crate writes to it.

use crate::AppError;
use serde::de::DeserializeOwned;
use std::path::{Component, Path, PathBuf};

/// Local directory mirroring the repository layout.
#[derive(Debug, Clone)]
pub struct LocalMirror {
    root: PathBuf,
}

impl LocalMirror {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a repository-relative path inside the mirror root.
    ///
    /// # Errors
    /// Returns [`AppError::BadRequest`] for empty or absolute paths and for
    /// paths containing `..`, so lookups never leave the root.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, AppError> {
        let trimmed = relative.trim();
        if trimmed.is_empty() {
            return Err(AppError::BadRequest("empty mirror path".to_string()));
        }
        let mut resolved = self.root.clone();
        for component in Path::new(trimmed).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(AppError::BadRequest(format!(
                        "mirror path escapes content root: {}",
                        relative
                    )));
                }
            }
        }
        Ok(resolved)
    }

    /// Read a mirrored file as UTF-8 text.
    pub async fn read_text(&self, relative: &str) -> Result<String, AppError> {
        let path = self.resolve(relative)?;
        Ok(tokio::fs::read_to_string(&path).await?)
    }

    /// Read and deserialize a mirrored JSON file.
    pub async fn read_json<T: DeserializeOwned>(&self, relative: &str) -> Result<T, AppError> {
        let raw = self.read_text(relative).await?;
        Ok(serde_json::from_str(&raw)?)
    }
}
