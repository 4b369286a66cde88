use std::path::Path as FsPath;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::article::{Article, ScoredArticle};
use crate::fetcher::Fetcher;
use crate::query::{self, DEFAULT_LIMIT};
use crate::store::ArticleStore;

pub struct AppState {
    pub store: Arc<ArticleStore>,
    pub fetcher: Arc<Fetcher>,
}

pub fn router(state: Arc<AppState>, static_dir: &FsPath) -> Router {
    Router::new()
        .route("/top", get(top))
        .route("/latest", get(latest))
        .route("/category/:tag", get(category))
        .route("/refresh", post(refresh))
        .route("/health", get(health))
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Deserialize)]
pub struct LimitQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub message: String,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub articles: usize,
    pub refreshed_at: Option<DateTime<Utc>>,
}

// Route handlers
pub async fn top(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> Json<Vec<ScoredArticle>> {
    let snapshot = state.store.snapshot().await;
    Json(query::top_by_score(&snapshot.articles, query.limit))
}

pub async fn latest(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LimitQuery>,
) -> Json<Vec<Article>> {
    let snapshot = state.store.snapshot().await;
    Json(query::latest(&snapshot.articles, query.limit))
}

pub async fn category(
    State(state): State<Arc<AppState>>,
    Path(tag): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Json<Vec<ScoredArticle>> {
    let snapshot = state.store.snapshot().await;
    Json(query::by_tag(&snapshot.articles, &tag, query.limit))
}

/// Re-fetch every source before answering.
pub async fn refresh(State(state): State<Arc<AppState>>) -> Json<RefreshResponse> {
    let count = state.fetcher.refresh().await;

    Json(RefreshResponse {
        message: "Feeds refreshed".to_string(),
        count,
    })
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let snapshot = state.store.snapshot().await;

    Json(HealthResponse {
        status: "ok".to_string(),
        articles: snapshot.articles.len(),
        refreshed_at: snapshot.refreshed_at,
    })
}
