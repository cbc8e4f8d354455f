//! Shared constants used across TokenInout crates.

/// Default API port for the content server.
pub const DEFAULT_PORT: u16 = 3000;

/// Default base URL for CLI/API clients.
pub const DEFAULT_CLI_SERVER_URL: &str = "http://localhost:3000";

/// Remote location of the generated article index.
pub const DEFAULT_ARTICLES_INDEX_PATH: &str = "data/json/articles.json";

/// Remote folder holding the Markdown articles.
pub const DEFAULT_ARTICLES_DIR: &str = "data/md";

/// Local location of the home page resource list.
pub const DEFAULT_RESOURCES_PATH: &str = "data/json/resources.json";

/// GitHub REST API base URL.
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Repository owner holding the site content.
pub const DEFAULT_GITHUB_OWNER: &str = "businesszh";

/// Repository holding the site content.
pub const DEFAULT_GITHUB_REPO: &str = "tokeninout";

/// Upper bound on concurrent per-article reads during a sync.
pub const DEFAULT_SYNC_CONCURRENCY: usize = 8;

/// Transport timeout applied to every remote store request.
pub const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 30;

/// Default maximum request body accepted by the API layer.
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Number of articles shown on the home feed.
pub const HOME_ARTICLE_LIMIT: usize = 6;

/// File extension that marks a document as an article.
pub const MARKDOWN_EXTENSION: &str = ".md";
