//! HTTP error mapping for API handlers.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tokeninout_core::AppError;

/// Error returned by handlers, rendered as `{ "error": ... }`.
///
/// Failures are logged where they happen; the body carries a fixed message
/// and, for writes, the error kind.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    message: &'static str,
    kind: Option<&'static str>,
}

impl HttpError {
    /// Single-article read failure after the local fallback.
    pub fn fetch_failed() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Failed to fetch article",
            kind: None,
        }
    }

    /// Update failure, tagged with the underlying kind.
    pub fn update_failed(err: &AppError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Failed to update article",
            kind: Some(err.kind()),
        }
    }

    /// Request body that could not be decoded; keeps the rejection's status.
    pub fn bad_request(rejection: &JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            message: "Invalid request body",
            kind: Some("bad_request"),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body = match self.kind {
            Some(kind) => json!({ "error": self.message, "kind": kind }),
            None => json!({ "error": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::HttpError;
    use axum::http::StatusCode;
    use tokeninout_core::AppError;

    #[test]
    fn update_failures_carry_kind() {
        let err = HttpError::update_failed(&AppError::Conflict("data/md/a.md".to_string()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.kind, Some("conflict"));
    }

    #[test]
    fn fetch_failures_omit_kind() {
        let err = HttpError::fetch_failed();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.kind, None);
    }
}
