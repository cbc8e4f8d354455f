//! Article HTTP handlers.

use crate::{error::HttpError, AppState};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tokeninout_core::models::article::{ArticlesQuery, UpdateArticleRequest};
use tokeninout_core::text::normalize_optional_nonempty;

/// Fetch one article or the article index.
///
/// # Arguments
/// - `state`: Application state.
/// - `query`: `path` selects a single article; `sync=true` rebuilds the index
///   before returning it.
///
/// # Returns
/// The article document, or the index as a JSON array. Index reads always
/// succeed, degrading to the local mirror and then to `[]`.
///
/// # Errors
/// Returns 500 when a single article can be read from neither the remote
/// store nor the local mirror.
pub async fn get_articles(
    State(state): State<AppState>,
    Query(query): Query<ArticlesQuery>,
) -> Result<Response, HttpError> {
    let sync = query.sync_requested();
    if let Some(path) = normalize_optional_nonempty(query.path) {
        let document = state.articles.read_article(&path).await.map_err(|err| {
            tracing::error!(operation = "read_article", path = %path, error = %err, "Error fetching article");
            HttpError::fetch_failed()
        })?;
        return Ok(Json(document).into_response());
    }

    let records = state.articles.read_index(sync).await;
    Ok(Json(records).into_response())
}

/// Apply an edit to an existing article.
///
/// # Arguments
/// - `state`: Application state.
/// - `req`: `{ "article": { path, title, description, content } }`.
///
/// # Returns
/// A confirmation message once the document and index are written.
///
/// # Errors
/// Returns the rejection's 4xx status with kind `bad_request` for a body that
/// does not decode, and 500 with the failure kind (`not_found`, `conflict`,
/// ...) when the update cannot be applied.
pub async fn post_article(
    State(state): State<AppState>,
    payload: Result<Json<UpdateArticleRequest>, JsonRejection>,
) -> Result<Response, HttpError> {
    let Json(req) = payload.map_err(|rejection| {
        tracing::warn!(operation = "update", error = %rejection, "Rejected update payload");
        HttpError::bad_request(&rejection)
    })?;
    let update = req.article;
    match state.articles.update_article(&update).await {
        Ok(record) => {
            tracing::debug!(path = %record.path, "Update request completed");
            Ok(Json(json!({ "message": "Article updated successfully" })).into_response())
        }
        Err(err) => {
            tracing::error!(
                operation = "update",
                path = %update.path,
                kind = err.kind(),
                error = %err,
                "Error updating article"
            );
            Err(HttpError::update_failed(&err))
        }
    }
}
