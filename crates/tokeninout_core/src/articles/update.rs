//! Single-article edits.

use super::ArticleService;
use crate::frontmatter::{self, FrontMatter};
use crate::models::article::{entry_str, ArticleRecord, ArticleUpdate, IndexEntry};
use crate::store::FileWrite;
use crate::text::{is_markdown_name, normalize_repo_path};
use crate::AppError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

/// Overwrite the editable metadata and stamp the edit time.
///
/// Other keys, and the position of existing keys, are left untouched.
pub(crate) fn apply_update(front_matter: &mut FrontMatter, update: &ArticleUpdate, now: DateTime<Utc>) {
    front_matter.set("title", update.title.as_str());
    front_matter.set("description", update.description.as_str());
    front_matter.set(
        "lastModified",
        now.to_rfc3339_opts(SecondsFormat::Millis, true),
    );
}

/// Merge the record into the element with the same `path`, or append it.
///
/// Keys of the existing element that the record does not carry are kept.
pub(crate) fn upsert_record(entries: &mut Vec<IndexEntry>, record: &ArticleRecord) {
    let fresh = record.to_index_entry();
    match entries
        .iter()
        .position(|entry| entry_str(entry, "path") == record.path)
    {
        Some(index) => match (&mut entries[index], fresh) {
            (Value::Object(current), Value::Object(fields)) => current.extend(fields),
            (existing, fresh) => *existing = fresh,
        },
        None => entries.push(fresh),
    }
}

impl ArticleService {
    /// Apply an edit to an existing article and refresh the index.
    ///
    /// The document is written with the version token read in the same call;
    /// on [`AppError::Conflict`] the caller must retry the whole operation.
    ///
    /// # Returns
    /// The article's index record after the edit.
    ///
    /// # Errors
    /// - [`AppError::NotFound`] when no document exists at `update.path`.
    /// - [`AppError::Decode`] when the existing front matter cannot be parsed
    ///   or lacks a `date`; nothing is written in that case.
    /// - [`AppError::Conflict`] when the document or index changed concurrently.
    pub async fn update_article(&self, update: &ArticleUpdate) -> Result<ArticleRecord, AppError> {
        let path = normalize_repo_path(&update.path);
        if path.is_empty() {
            return Err(AppError::BadRequest("article path is required".to_string()));
        }

        let current = self.store.get_file(&path).await?;
        let mut front_matter = frontmatter::parse(&current.content)?.front_matter;
        apply_update(&mut front_matter, update, Utc::now());
        // Validate before writing so an unindexable article is never committed.
        ArticleRecord::from_front_matter(&front_matter, String::new(), &path)?;

        let document = frontmatter::render(&front_matter, &update.content)?;
        let write = FileWrite::new(
            path.as_str(),
            document,
            format!("Update article: {}", update.title),
        )
        .with_sha(current.sha);
        let new_sha = self.store.put_file(write).await?;
        tracing::info!(operation = "update", path = %path, "Article updated");

        if !self.is_indexed_path(&path) {
            tracing::warn!(
                operation = "update",
                path = %path,
                articles_dir = %self.settings.articles_dir,
                "Updated document is outside the articles folder; index left unchanged"
            );
            let last_modified = front_matter.get_string("lastModified").unwrap_or(new_sha);
            return ArticleRecord::from_front_matter(&front_matter, last_modified, &path);
        }

        if self.settings.full_resync_on_update {
            let records = self.sync_index().await?;
            return match records.into_iter().find(|record| record.path == path) {
                Some(record) => Ok(record),
                None => self.build_record(&path).await,
            };
        }

        let last_modified = self
            .store
            .last_commit_date(&path)
            .await?
            .unwrap_or(new_sha);
        let record = ArticleRecord::from_front_matter(&front_matter, last_modified, &path)?;
        self.merge_into_index(&record).await?;
        Ok(record)
    }

    /// Merge one record into the stored index.
    ///
    /// # Errors
    /// [`AppError::Decode`] if the stored index is not a JSON array and
    /// [`AppError::Conflict`] if it changed since it was read.
    pub async fn merge_into_index(&self, record: &ArticleRecord) -> Result<(), AppError> {
        let (mut entries, sha) = match self.current_index().await? {
            Some(file) => (
                serde_json::from_str::<Vec<IndexEntry>>(&file.content)?,
                Some(file.sha),
            ),
            None => (Vec::new(), None),
        };
        upsert_record(&mut entries, record);
        self.write_index(&entries, sha, format!("Update index for {}", record.path))
            .await
            .map_err(|err| {
                tracing::error!(operation = "update", path = %self.settings.index_path, error = %err, "Failed to merge article into index");
                err
            })?;
        Ok(())
    }

    /// `true` for Markdown files directly inside the articles folder.
    fn is_indexed_path(&self, path: &str) -> bool {
        let dir = normalize_repo_path(&self.settings.articles_dir);
        let name = if dir.is_empty() {
            Some(path)
        } else {
            path.strip_prefix(dir.as_str())
                .and_then(|rest| rest.strip_prefix('/'))
        };
        name.is_some_and(|name| !name.contains('/') && is_markdown_name(name))
    }
}
