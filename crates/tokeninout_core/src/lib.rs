//! Core domain library for TokenInout (config, content store, article index).

/// Article reads, edits and index sync.
pub mod articles;
/// Configuration loading and defaults.
pub mod config;
/// Shared constants.
pub mod constants;
/// Scoped environment overrides for tests.
pub mod env;
/// Application error types (store/domain).
pub mod error;
/// YAML front matter parsing and rendering.
pub mod frontmatter;
/// Read-only local copy of the content repository.
pub mod mirror;
/// Data models for API requests and the index.
pub mod models;
/// Home page assembly.
pub mod site;
/// Remote content store abstraction and backends.
pub mod store;
/// Path and string helpers.
pub mod text;

#[cfg(test)]
mod test_support;

pub use articles::{ArticleService, ArticleSettings};
pub use config::Config;
pub use constants::{DEFAULT_CLI_SERVER_URL, DEFAULT_PORT};
pub use error::AppError;
pub use mirror::LocalMirror;
pub use store::{ContentStore, GithubStore, MemoryStore};
