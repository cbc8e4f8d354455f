//! Degrading reads: remote store, then local mirror.

use super::ArticleService;
use crate::frontmatter;
use crate::models::article::{sort_newest_first, ArticleDocument, ArticleRecord, IndexEntry};
use crate::AppError;

impl ArticleService {
    /// Fetch one article, falling back to the local mirror.
    ///
    /// # Returns
    /// The document with the store's path on remote success, or the requested
    /// path when served from the mirror.
    ///
    /// # Errors
    /// [`AppError::FetchFailed`] when both sources fail.
    pub async fn read_article(&self, path: &str) -> Result<ArticleDocument, AppError> {
        let requested = path.trim();
        match self.fetch_remote_article(requested).await {
            Ok(document) => return Ok(document),
            Err(err) => tracing::warn!(
                operation = "read_article",
                path = %requested,
                error = %err,
                "Remote article fetch failed; trying local mirror"
            ),
        }

        match self.read_local_article(requested).await {
            Ok(document) => Ok(document),
            Err(err) => {
                tracing::error!(
                    operation = "read_article",
                    path = %requested,
                    error = %err,
                    "Local article read failed"
                );
                Err(AppError::FetchFailed(requested.to_string()))
            }
        }
    }

    async fn fetch_remote_article(&self, path: &str) -> Result<ArticleDocument, AppError> {
        let file = self.store.get_file(path).await?;
        let parsed = frontmatter::parse(&file.content)?;
        Ok(ArticleDocument {
            front_matter: parsed.front_matter,
            content: parsed.body,
            path: file.path,
        })
    }

    async fn read_local_article(&self, path: &str) -> Result<ArticleDocument, AppError> {
        let raw = self.mirror.read_text(path).await?;
        let parsed = frontmatter::parse(&raw)?;
        Ok(ArticleDocument {
            front_matter: parsed.front_matter,
            content: parsed.body,
            path: path.to_string(),
        })
    }

    /// Read the article index without ever failing.
    ///
    /// With `sync`, the index is rebuilt first and the rebuilt records are
    /// returned directly. Otherwise (or if the rebuild fails) the remote index
    /// is read, then the local mirror, and finally an empty list. Stored
    /// indexes are returned element for element as they were written.
    pub async fn read_index(&self, sync: bool) -> Vec<IndexEntry> {
        if sync {
            match self.sync_index().await {
                Ok(records) => return records.iter().map(ArticleRecord::to_index_entry).collect(),
                Err(err) => tracing::error!(
                    operation = "read_index",
                    error = %err,
                    "Sync before read failed; serving last stored index"
                ),
            }
        }

        match self.fetch_remote_index().await {
            Ok(records) => return records,
            Err(err) => tracing::warn!(
                operation = "read_index",
                path = %self.settings.index_path,
                error = %err,
                "Remote index fetch failed; using local mirror"
            ),
        }

        self.read_local_index().await
    }

    /// Fetch the remote index; any JSON array is accepted.
    pub async fn fetch_remote_index(&self) -> Result<Vec<IndexEntry>, AppError> {
        let file = self.store.get_file(&self.settings.index_path).await?;
        Ok(serde_json::from_str(&file.content)?)
    }

    /// Read the mirrored index, or an empty list when it is unreadable.
    pub async fn read_local_index(&self) -> Vec<IndexEntry> {
        match self.mirror.read_json::<Vec<IndexEntry>>(&self.settings.index_path).await {
            Ok(records) => records,
            Err(err) => {
                tracing::error!(
                    operation = "read_index",
                    path = %self.settings.index_path,
                    error = %err,
                    "Local index read failed; returning empty list"
                );
                Vec::new()
            }
        }
    }

    /// Newest articles by `date`, read through the degrading index path.
    pub async fn latest(&self, limit: usize) -> Vec<IndexEntry> {
        let mut records = self.read_index(false).await;
        sort_newest_first(&mut records);
        records.truncate(limit);
        records
    }
}
