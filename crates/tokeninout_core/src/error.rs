//! Application error types for the content store and article logic.
use thiserror::Error;

/// Top-level application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Network, authentication or API failure talking to the remote store.
    #[error("Remote store unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A write carried a stale (or missing) version token.
    #[error("Version conflict writing {0}")]
    Conflict(String),

    /// Malformed front matter, JSON or encoded content.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Neither the remote store nor the local mirror produced the document.
    #[error("Failed to fetch {0}")]
    FetchFailed(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    /// Stable machine-readable name for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::RemoteUnavailable(_) => "remote_unavailable",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::Decode(_) => "decode",
            AppError::FetchFailed(_) => "fetch_failed",
            AppError::BadRequest(_) => "bad_request",
            AppError::Io(_) => "io",
            AppError::Internal => "internal",
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Decode(value.to_string())
        } else {
            Self::RemoteUnavailable(value.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(format!("json: {}", value))
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(value: serde_yaml::Error) -> Self {
        Self::Decode(format!("front matter: {}", value))
    }
}

impl From<base64::DecodeError> for AppError {
    fn from(value: base64::DecodeError) -> Self {
        Self::Decode(format!("base64: {}", value))
    }
}

impl From<std::string::FromUtf8Error> for AppError {
    fn from(value: std::string::FromUtf8Error) -> Self {
        Self::Decode(format!("utf-8: {}", value))
    }
}
