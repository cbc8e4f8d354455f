//! In-process content store.

use super::{ContentStore, DirEntry, EntryKind, FileWrite, RemoteFile};
use crate::text::normalize_repo_path;
use crate::AppError;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A commit recorded by [`MemoryStore::put_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub path: String,
    pub message: String,
    pub date: String,
}

struct StoredFile {
    content: String,
    sha: String,
    last_commit: Option<String>,
}

#[derive(Default)]
struct Inner {
    files: BTreeMap<String, StoredFile>,
    commits: Vec<Commit>,
}

/// Content store kept in memory, with the same token rules as GitHub.
///
/// Listing order is lexicographic by path. Version tokens are content
/// hashes, so rewriting identical content yields the same token.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    offline: AtomicBool,
}

fn content_sha(content: &str) -> String {
    let mut hex = blake3::hash(content.as_bytes()).to_hex().to_string();
    hex.truncate(40);
    hex
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, AppError> {
        self.inner.lock().map_err(|_| AppError::Internal)
    }

    fn ensure_online(&self) -> Result<(), AppError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(AppError::RemoteUnavailable(
                "memory store is offline".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    /// Lock for the seeding and inspection helpers; a poisoned lock is
    /// recovered so a seeded file is always stored.
    fn lock_recovered(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn seed(&self, path: &str, content: &str, last_commit: Option<String>) -> String {
        let sha = content_sha(content);
        self.lock_recovered().files.insert(
            normalize_repo_path(path),
            StoredFile {
                content: content.to_string(),
                sha: sha.clone(),
                last_commit,
            },
        );
        sha
    }

    /// Seed a file without commit history.
    ///
    /// # Returns
    /// The file's version token.
    pub fn insert(&self, path: &str, content: &str) -> String {
        self.seed(path, content, None)
    }

    /// Seed a file whose last commit happened at `date`.
    pub fn insert_with_commit(&self, path: &str, content: &str, date: &str) -> String {
        self.seed(path, content, Some(date.to_string()))
    }

    /// Make every subsequent call fail with [`AppError::RemoteUnavailable`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn content(&self, path: &str) -> Option<String> {
        self.lock_recovered()
            .files
            .get(&normalize_repo_path(path))
            .map(|file| file.content.clone())
    }

    pub fn sha(&self, path: &str) -> Option<String> {
        self.lock_recovered()
            .files
            .get(&normalize_repo_path(path))
            .map(|file| file.sha.clone())
    }

    /// Commits made through [`ContentStore::put_file`], oldest first.
    pub fn commits(&self) -> Vec<Commit> {
        self.lock_recovered().commits.clone()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn get_file(&self, path: &str) -> Result<RemoteFile, AppError> {
        self.ensure_online()?;
        let key = normalize_repo_path(path);
        let inner = self.lock()?;
        inner
            .files
            .get(&key)
            .map(|file| RemoteFile {
                path: key.clone(),
                sha: file.sha.clone(),
                content: file.content.clone(),
            })
            .ok_or(AppError::NotFound(key))
    }

    async fn list_dir(&self, path: &str) -> Result<Vec<DirEntry>, AppError> {
        self.ensure_online()?;
        let dir = normalize_repo_path(path);
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{}/", dir)
        };

        let inner = self.lock()?;
        let mut entries: Vec<DirEntry> = Vec::new();
        for (key, file) in inner.files.range(prefix.clone()..) {
            let Some(rest) = key.strip_prefix(prefix.as_str()) else {
                break;
            };
            match rest.split_once('/') {
                Some((child, _)) => {
                    let seen = entries
                        .last()
                        .is_some_and(|last| last.kind == EntryKind::Dir && last.name == child);
                    if !seen {
                        entries.push(DirEntry {
                            name: child.to_string(),
                            path: format!("{}{}", prefix, child),
                            sha: String::new(),
                            kind: EntryKind::Dir,
                        });
                    }
                }
                None => entries.push(DirEntry {
                    name: rest.to_string(),
                    path: key.clone(),
                    sha: file.sha.clone(),
                    kind: EntryKind::File,
                }),
            }
        }

        if entries.is_empty() {
            return Err(AppError::NotFound(dir));
        }
        Ok(entries)
    }

    async fn last_commit_date(&self, path: &str) -> Result<Option<String>, AppError> {
        self.ensure_online()?;
        let inner = self.lock()?;
        Ok(inner
            .files
            .get(&normalize_repo_path(path))
            .and_then(|file| file.last_commit.clone()))
    }

    async fn put_file(&self, write: FileWrite) -> Result<String, AppError> {
        self.ensure_online()?;
        let key = normalize_repo_path(&write.path);
        let mut inner = self.lock()?;

        let current = inner.files.get(&key).map(|file| file.sha.as_str());
        let token_matches = match (current, write.sha.as_deref()) {
            (Some(current), Some(expected)) => current == expected,
            (None, None) => true,
            _ => false,
        };
        if !token_matches {
            return Err(AppError::Conflict(key));
        }

        let sha = content_sha(&write.content);
        let date = now_rfc3339();
        inner.files.insert(
            key.clone(),
            StoredFile {
                content: write.content,
                sha: sha.clone(),
                last_commit: Some(date.clone()),
            },
        );
        inner.commits.push(Commit {
            path: key,
            message: write.message,
            date,
        });
        Ok(sha)
    }
}
