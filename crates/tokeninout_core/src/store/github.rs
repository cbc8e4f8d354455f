//! GitHub contents/commits REST client.

use super::{ContentStore, DirEntry, EntryKind, FileWrite, RemoteFile};
use crate::config::GithubConfig;
use crate::text::normalize_repo_path;
use crate::AppError;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const USER_AGENT: &str = concat!("tokeninout/", env!("CARGO_PKG_VERSION"));
const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "x-github-api-version";
const API_VERSION: &str = "2022-11-28";

/// Content store backed by a GitHub repository.
pub struct GithubStore {
    client: reqwest::Client,
    api_url: Url,
    owner: String,
    repo: String,
    branch: Option<String>,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentsFile {
    path: String,
    sha: String,
    #[serde(rename = "type")]
    kind: EntryKind,
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: String,
}

/// `GET /contents/{path}` answers with an array for directories.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContentsResponse {
    Dir(Vec<DirEntry>),
    File(ContentsFile),
}

#[derive(Debug, Deserialize)]
struct CommitItem {
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    committer: Option<CommitSignature>,
}

#[derive(Debug, Deserialize)]
struct CommitSignature {
    date: Option<String>,
}

#[derive(Debug, Serialize)]
struct PutBody<'a> {
    message: &'a str,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct PutResponse {
    content: PutContent,
}

#[derive(Debug, Deserialize)]
struct PutContent {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Read,
    Write,
}

/// Map a non-success GitHub status to an error kind.
fn classify_status(status: StatusCode, access: Access, path: &str, message: &str) -> AppError {
    match status {
        StatusCode::NOT_FOUND => AppError::NotFound(path.to_string()),
        StatusCode::CONFLICT if access == Access::Write => AppError::Conflict(path.to_string()),
        // GitHub reports a missing `sha` for an existing file as a validation error.
        StatusCode::UNPROCESSABLE_ENTITY if access == Access::Write => {
            if message.contains("sha") {
                AppError::Conflict(path.to_string())
            } else {
                AppError::BadRequest(format!("{}: {}", path, message))
            }
        }
        _ => AppError::RemoteUnavailable(format!(
            "GitHub API returned {} for {}: {}",
            status, path, message
        )),
    }
}

fn decode_file(file: ContentsFile) -> Result<RemoteFile, AppError> {
    if file.kind != EntryKind::File {
        return Err(AppError::Decode(format!("{} is not a file", file.path)));
    }
    if file.encoding != "base64" {
        return Err(AppError::Decode(format!(
            "{}: unsupported content encoding '{}'",
            file.path, file.encoding
        )));
    }
    // GitHub wraps base64 payloads at 60 columns.
    let compact: String = file
        .content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let content = String::from_utf8(STANDARD.decode(compact)?)?;
    Ok(RemoteFile {
        path: file.path,
        sha: file.sha,
        content,
    })
}

impl GithubStore {
    /// Build a client for the configured repository.
    ///
    /// # Arguments
    /// - `config`: Repository coordinates and optional token.
    /// - `timeout`: Transport timeout applied to every request.
    ///
    /// # Errors
    /// Returns [`AppError::BadRequest`] for an unusable API URL and
    /// [`AppError::RemoteUnavailable`] if the HTTP client cannot be built.
    pub fn new(config: &GithubConfig, timeout: Duration) -> Result<Self, AppError> {
        let api_url = Url::parse(&config.api_url).map_err(|err| {
            AppError::BadRequest(format!("Invalid GitHub API URL '{}': {}", config.api_url, err))
        })?;
        if api_url.cannot_be_a_base() {
            return Err(AppError::BadRequest(format!(
                "GitHub API URL '{}' cannot be used as a base",
                config.api_url
            )));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            api_url,
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            branch: config.branch.clone(),
            token: config.token.clone(),
        })
    }

    fn repo_url(&self, segments: &[&str]) -> Url {
        let mut url = self.api_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .push("repos")
                .push(&self.owner)
                .push(&self.repo);
            for segment in segments {
                path.push(segment);
            }
        }
        url
    }

    fn contents_url(&self, path: &str) -> Url {
        let path = normalize_repo_path(path);
        let mut segments = vec!["contents"];
        segments.extend(path.split('/').filter(|segment| !segment.is_empty()));
        self.repo_url(&segments)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, ACCEPT)
            .header(API_VERSION_HEADER, API_VERSION);
        match self.token.as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(
        &self,
        builder: RequestBuilder,
        access: Access,
        path: &str,
    ) -> Result<reqwest::Response, AppError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = match response.json::<ApiErrorBody>().await {
            Ok(body) => body.message,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
        };
        Err(classify_status(status, access, path, &message))
    }

    async fn get_contents(&self, path: &str) -> Result<ContentsResponse, AppError> {
        let mut builder = self.request(Method::GET, self.contents_url(path));
        if let Some(branch) = self.branch.as_deref() {
            builder = builder.query(&[("ref", branch)]);
        }
        tracing::debug!(path = %path, "GitHub contents request");
        let response = self.send(builder, Access::Read, path).await?;
        Ok(response.json::<ContentsResponse>().await?)
    }
}

#[async_trait]
impl ContentStore for GithubStore {
    async fn get_file(&self, path: &str) -> Result<RemoteFile, AppError> {
        match self.get_contents(path).await? {
            ContentsResponse::File(file) => decode_file(file),
            ContentsResponse::Dir(_) => Err(AppError::Decode(format!("{} is a directory", path))),
        }
    }

    async fn list_dir(&self, path: &str) -> Result<Vec<DirEntry>, AppError> {
        match self.get_contents(path).await? {
            ContentsResponse::Dir(entries) => Ok(entries),
            ContentsResponse::File(_) => Err(AppError::Decode(format!("{} is not a directory", path))),
        }
    }

    async fn last_commit_date(&self, path: &str) -> Result<Option<String>, AppError> {
        let normalized = normalize_repo_path(path);
        let mut query = vec![("path", normalized.as_str()), ("per_page", "1")];
        if let Some(branch) = self.branch.as_deref() {
            query.push(("sha", branch));
        }
        let builder = self
            .request(Method::GET, self.repo_url(&["commits"]))
            .query(&query);
        tracing::debug!(path = %path, "GitHub commits request");
        let response = self.send(builder, Access::Read, path).await?;
        let commits: Vec<CommitItem> = response.json().await?;
        Ok(commits
            .into_iter()
            .next()
            .and_then(|item| item.commit.committer)
            .and_then(|committer| committer.date))
    }

    async fn put_file(&self, write: FileWrite) -> Result<String, AppError> {
        let body = PutBody {
            message: &write.message,
            content: STANDARD.encode(write.content.as_bytes()),
            sha: write.sha.as_deref(),
            branch: self.branch.as_deref(),
        };
        let builder = self
            .request(Method::PUT, self.contents_url(&write.path))
            .json(&body);
        tracing::debug!(path = %write.path, has_sha = write.sha.is_some(), "GitHub contents write");
        let response = self.send(builder, Access::Write, &write.path).await?;
        let created: PutResponse = response.json().await?;
        Ok(created.content.sha)
    }
}
