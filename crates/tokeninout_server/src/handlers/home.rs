//! Home page HTTP handlers.

use crate::AppState;
use axum::{extract::State, Json};
use tokeninout_core::models::home::{HomeFeed, Resource};
use tokeninout_core::site;

/// List curated resources from the local mirror (`[]` when unavailable).
pub async fn get_resources(State(state): State<AppState>) -> Json<Vec<Resource>> {
    Json(site::load_resources(state.articles.mirror(), &state.config.resources_path).await)
}

/// Resources plus the newest articles.
pub async fn get_home(State(state): State<AppState>) -> Json<HomeFeed> {
    Json(site::home_feed(&state.articles, &state.config.resources_path).await)
}
