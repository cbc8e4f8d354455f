//! Shared test-only helpers for tokeninout_core.

use crate::articles::{ArticleService, ArticleSettings};
use crate::mirror::LocalMirror;
use crate::models::article::ArticleRecord;
use crate::store::MemoryStore;
use std::path::Path;
use std::sync::Arc;

/// Markdown source with the three required front matter keys.
pub(crate) fn article_markdown(title: &str, description: &str, date: &str, body: &str) -> String {
    format!(
        "---\ntitle: {}\ndescription: {}\ndate: {}\n---\n{}",
        title, description, date, body
    )
}

/// Index record for `data/md/<title>.md` with a fixed description.
pub(crate) fn record(title: &str, date: &str) -> ArticleRecord {
    ArticleRecord {
        title: title.to_string(),
        description: format!("about {}", title),
        date: date.to_string(),
        last_modified: format!("{}T00:00:00Z", date),
        path: format!("data/md/{}.md", title),
    }
}

/// Pretty JSON for an index file.
///
/// # Panics
/// Panics if the records cannot be serialized.
pub(crate) fn index_json(records: &[ArticleRecord]) -> String {
    serde_json::to_string_pretty(records).expect("serialize index")
}

/// Service over `store` with default settings and a mirror rooted at `root`.
pub(crate) fn service(store: &Arc<MemoryStore>, root: &Path) -> ArticleService {
    service_with(store, root, ArticleSettings::default())
}

pub(crate) fn service_with(
    store: &Arc<MemoryStore>,
    root: &Path,
    settings: ArticleSettings,
) -> ArticleService {
    ArticleService::new(store.clone(), LocalMirror::new(root), settings)
}
