//! Full index rebuild.

use super::ArticleService;
use crate::frontmatter;
use crate::models::article::ArticleRecord;
use crate::store::{EntryKind, FileWrite, RemoteFile};
use crate::text::{is_markdown_name, join_repo_path, normalize_repo_path};
use crate::AppError;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;

const SYNC_COMMIT_MESSAGE: &str = "Sync articles";

impl ArticleService {
    /// Rebuild the index from every Markdown file in the articles folder.
    ///
    /// Records keep the store's listing order. Per-article reads run
    /// concurrently up to `sync_concurrency`; the index is written once,
    /// guarded by its current version token.
    ///
    /// # Returns
    /// The records that were written.
    ///
    /// # Errors
    /// Any listing, fetch or decode failure aborts before the write.
    /// A stale index token fails with [`AppError::Conflict`].
    pub async fn sync_index(&self) -> Result<Vec<ArticleRecord>, AppError> {
        let dir = normalize_repo_path(&self.settings.articles_dir);
        let entries = self.store.list_dir(&dir).await.map_err(|err| {
            tracing::error!(operation = "sync", path = %dir, error = %err, "Failed to list article folder");
            err
        })?;

        let paths: Vec<String> = entries
            .into_iter()
            .filter(|entry| entry.kind == EntryKind::File && is_markdown_name(&entry.name))
            .map(|entry| {
                if entry.path.is_empty() {
                    join_repo_path(&dir, &entry.name)
                } else {
                    entry.path
                }
            })
            .collect();

        let records: Vec<ArticleRecord> = stream::iter(paths)
            .map(|path| {
                let service = self.clone();
                async move { service.build_record(&path).await }
            })
            .buffered(self.settings.sync_concurrency.max(1))
            .try_collect()
            .await?;

        let current = self.current_index().await?;
        self.write_index(&records, current.map(|file| file.sha), SYNC_COMMIT_MESSAGE.to_string())
            .await
            .map_err(|err| {
                tracing::error!(operation = "sync", path = %self.settings.index_path, error = %err, "Failed to write article index");
                err
            })?;

        tracing::info!(count = records.len(), "Article index synced");
        Ok(records)
    }

    /// Fetch one article and its last commit date and derive its record.
    pub(crate) async fn build_record(&self, path: &str) -> Result<ArticleRecord, AppError> {
        let result = async {
            let (file, commit_date) = futures::try_join!(
                self.store.get_file(path),
                self.store.last_commit_date(path)
            )?;
            let parsed = frontmatter::parse(&file.content)?;
            // Files without reachable history fall back to their content sha.
            let last_modified = commit_date.unwrap_or(file.sha);
            ArticleRecord::from_front_matter(&parsed.front_matter, last_modified, path)
        }
        .await;

        result.map_err(|err| {
            tracing::error!(operation = "sync", path = %path, error = %err, "Failed to index article");
            err
        })
    }

    /// Current index file, or `None` when it has never been written.
    pub(crate) async fn current_index(&self) -> Result<Option<RemoteFile>, AppError> {
        match self.store.get_file(&self.settings.index_path).await {
            Ok(file) => Ok(Some(file)),
            Err(AppError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub(crate) async fn write_index<T: Serialize>(
        &self,
        records: &[T],
        sha: Option<String>,
        message: String,
    ) -> Result<String, AppError> {
        let body = serde_json::to_string_pretty(records)?;
        let write = FileWrite::new(self.settings.index_path.as_str(), body, message)
            .with_optional_sha(sha);
        self.store.put_file(write).await
    }
}
