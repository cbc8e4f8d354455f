//! Remote content store abstraction.
//!
//! The store is the source of truth for articles and the generated index.
//! Every write is guarded by the target's current version token (its blob
//! sha): a stale or missing token fails with [`AppError::Conflict`].

use crate::AppError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// GitHub REST implementation.
pub mod github;
/// In-process implementation for tests and local development.
pub mod memory;

pub use github::GithubStore;
pub use memory::MemoryStore;

/// A file fetched from the store together with its version token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub path: String,
    pub sha: String,
    pub content: String,
}

/// Kind of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    #[serde(other)]
    Other,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    pub name: String,
    pub path: String,
    pub sha: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

/// A create-or-update request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileWrite {
    pub path: String,
    pub content: String,
    pub message: String,
    /// Version token of the file being replaced; `None` creates a new file.
    pub sha: Option<String>,
}

impl FileWrite {
    pub fn new(path: impl Into<String>, content: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            message: message.into(),
            sha: None,
        }
    }

    pub fn with_sha(mut self, sha: impl Into<String>) -> Self {
        self.sha = Some(sha.into());
        self
    }

    pub fn with_optional_sha(mut self, sha: Option<String>) -> Self {
        self.sha = sha;
        self
    }
}

/// Remote source-control content store.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Fetch a file's decoded content and version token.
    ///
    /// # Errors
    /// [`AppError::NotFound`] when the path does not exist,
    /// [`AppError::RemoteUnavailable`] on transport/API failures and
    /// [`AppError::Decode`] when the payload is not a UTF-8 file.
    async fn get_file(&self, path: &str) -> Result<RemoteFile, AppError>;

    /// List a directory's immediate entries in store order.
    ///
    /// # Errors
    /// [`AppError::NotFound`] when the directory does not exist.
    async fn list_dir(&self, path: &str) -> Result<Vec<DirEntry>, AppError>;

    /// Committer date of the most recent commit touching `path`.
    ///
    /// # Returns
    /// `None` when the path has no commit history.
    async fn last_commit_date(&self, path: &str) -> Result<Option<String>, AppError>;

    /// Create or overwrite a file.
    ///
    /// # Returns
    /// The new version token.
    ///
    /// # Errors
    /// [`AppError::Conflict`] when `write.sha` does not match the current
    /// token (or is missing for an existing file).
    async fn put_file(&self, write: FileWrite) -> Result<String, AppError>;
}
