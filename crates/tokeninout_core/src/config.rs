//! Configuration loading from environment variables.

use crate::constants::{
    DEFAULT_ARTICLES_DIR, DEFAULT_ARTICLES_INDEX_PATH, DEFAULT_GITHUB_API_URL,
    DEFAULT_GITHUB_OWNER, DEFAULT_GITHUB_REPO, DEFAULT_MAX_BODY_SIZE, DEFAULT_PORT,
    DEFAULT_REMOTE_TIMEOUT_SECS, DEFAULT_RESOURCES_PATH, DEFAULT_SYNC_CONCURRENCY,
};
use crate::text::{normalize_optional_nonempty, normalize_repo_path};
use serde::Deserialize;
use std::env;
use std::fmt;
use std::path::PathBuf;

/// Connection settings for the GitHub-backed content store.
#[derive(Clone, Deserialize)]
pub struct GithubConfig {
    pub api_url: String,
    pub owner: String,
    pub repo: String,
    pub branch: Option<String>,
    pub token: Option<String>,
}

impl fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GithubConfig")
            .field("api_url", &self.api_url)
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_GITHUB_API_URL.to_string(),
            owner: DEFAULT_GITHUB_OWNER.to_string(),
            repo: DEFAULT_GITHUB_REPO.to_string(),
            branch: None,
            token: None,
        }
    }
}

/// Runtime configuration for the content server.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// Root directory of the read-only local mirror.
    pub content_root: String,
    pub github: GithubConfig,
    pub articles_index_path: String,
    pub articles_dir: String,
    pub resources_path: String,
    pub sync_concurrency: usize,
    pub full_resync_on_update: bool,
    pub remote_timeout_secs: u64,
    pub max_body_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            content_root: ".".to_string(),
            github: GithubConfig::default(),
            articles_index_path: DEFAULT_ARTICLES_INDEX_PATH.to_string(),
            articles_dir: DEFAULT_ARTICLES_DIR.to_string(),
            resources_path: DEFAULT_RESOURCES_PATH.to_string(),
            sync_concurrency: DEFAULT_SYNC_CONCURRENCY,
            full_resync_on_update: false,
            remote_timeout_secs: DEFAULT_REMOTE_TIMEOUT_SECS,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: String) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path
}

fn resolve_home_dir() -> Option<PathBuf> {
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    // Windows USERPROFILE (standard)
    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.trim().is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    None
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

fn env_string(name: &str) -> Option<String> {
    normalize_optional_nonempty(env::var(name).ok())
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    env_string(name).and_then(|raw| match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid {}='{}'", name, raw);
            None
        }
    })
}

fn env_repo_path(name: &str, default: &str) -> String {
    env_string(name)
        .map(|raw| normalize_repo_path(&raw))
        .unwrap_or_else(|| default.to_string())
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env_parsed("PORT").unwrap_or(defaults.port),
            content_root: env_string("CONTENT_ROOT")
                .map(expand_tilde)
                .unwrap_or(defaults.content_root),
            github: GithubConfig {
                api_url: env_string("GITHUB_API_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or(defaults.github.api_url),
                owner: env_string("GITHUB_OWNER").unwrap_or(defaults.github.owner),
                repo: env_string("GITHUB_REPO").unwrap_or(defaults.github.repo),
                branch: env_string("GITHUB_BRANCH"),
                token: env_string("GITHUB_TOKEN"),
            },
            articles_index_path: env_repo_path("ARTICLES_INDEX_PATH", DEFAULT_ARTICLES_INDEX_PATH),
            articles_dir: env_repo_path("ARTICLES_DIR", DEFAULT_ARTICLES_DIR),
            resources_path: env_repo_path("RESOURCES_PATH", DEFAULT_RESOURCES_PATH),
            sync_concurrency: env_parsed::<usize>("SYNC_CONCURRENCY")
                .unwrap_or(defaults.sync_concurrency)
                .max(1),
            full_resync_on_update: env_flag_enabled("FULL_RESYNC_ON_UPDATE"),
            remote_timeout_secs: env_parsed("REMOTE_TIMEOUT_SECS")
                .unwrap_or(defaults.remote_timeout_secs),
            max_body_size: env_parsed("MAX_BODY_SIZE").unwrap_or(defaults.max_body_size),
        }
    }
}
