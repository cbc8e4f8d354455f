//! Article index maintenance and reads over the remote store.
//!
//! Writes (sync, update) propagate every failure and never commit a partial
//! index. Reads degrade: remote store first, then the local mirror, and for
//! the index finally an empty list.

mod read;
mod sync;
mod update;

#[cfg(test)]
mod tests;

use crate::config::Config;
use crate::constants::{DEFAULT_ARTICLES_DIR, DEFAULT_ARTICLES_INDEX_PATH, DEFAULT_SYNC_CONCURRENCY};
use crate::mirror::LocalMirror;
use crate::store::ContentStore;
use std::sync::Arc;

/// Knobs for index maintenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleSettings {
    /// Repository path of the JSON index.
    pub index_path: String,
    /// Repository folder holding the Markdown articles.
    pub articles_dir: String,
    /// Maximum concurrent per-article reads during a sync.
    pub sync_concurrency: usize,
    /// Rebuild the whole index after each update instead of merging one record.
    pub full_resync_on_update: bool,
}

impl Default for ArticleSettings {
    fn default() -> Self {
        Self {
            index_path: DEFAULT_ARTICLES_INDEX_PATH.to_string(),
            articles_dir: DEFAULT_ARTICLES_DIR.to_string(),
            sync_concurrency: DEFAULT_SYNC_CONCURRENCY,
            full_resync_on_update: false,
        }
    }
}

impl ArticleSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            index_path: config.articles_index_path.clone(),
            articles_dir: config.articles_dir.clone(),
            sync_concurrency: config.sync_concurrency.max(1),
            full_resync_on_update: config.full_resync_on_update,
        }
    }
}

/// Article operations over an injected content store and local mirror.
#[derive(Clone)]
pub struct ArticleService {
    store: Arc<dyn ContentStore>,
    mirror: LocalMirror,
    settings: ArticleSettings,
}

impl ArticleService {
    /// Construct the service.
    ///
    /// # Arguments
    /// - `store`: Remote content store (source of truth).
    /// - `mirror`: Read-only local fallback.
    /// - `settings`: Index locations and sync behavior.
    pub fn new(store: Arc<dyn ContentStore>, mirror: LocalMirror, settings: ArticleSettings) -> Self {
        Self {
            store,
            mirror,
            settings,
        }
    }

    pub fn settings(&self) -> &ArticleSettings {
        &self.settings
    }

    pub fn mirror(&self) -> &LocalMirror {
        &self.mirror
    }
}
