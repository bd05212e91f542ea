// HTTP layer: router, shared state, and request handlers

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::debug;

use crate::article::{Article, ArticleStore, ArticleUpdate, NewArticle};
use crate::error::RestError;
use crate::recent::RecencyTracker;

#[derive(Clone)]
pub struct AppState {
    pub store: ArticleStore,
    pub recent: RecencyTracker,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/articles/", get(list_articles).post(create_article))
        .route(
            "/articles/{article_id}",
            get(get_article).put(update_article).delete(delete_article),
        )
        .route("/users/{user_id}/recently-viewed", get(recently_viewed))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct Pagination {
    #[serde(default)]
    skip: i64,
    #[serde(default = "default_limit")]
    limit: i64,
}

fn default_limit() -> i64 {
    10
}

/// Optional viewer identity on article fetches. No `user_id`, no tracking.
#[derive(Debug, Deserialize)]
struct Viewer {
    user_id: Option<i64>,
}

async fn root() -> impl IntoResponse {
    Json(json!({"message": "Welcome to CMS Backend"}))
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn create_article(
    State(state): State<AppState>,
    Json(new): Json<NewArticle>,
) -> Result<Json<Article>, RestError> {
    let article = state.store.create(new).await?;
    debug!("created article {}", article.id);
    Ok(Json(article))
}

async fn get_article(
    Path(article_id): Path<i64>,
    Query(viewer): Query<Viewer>,
    State(state): State<AppState>,
) -> Result<Json<Article>, RestError> {
    let article = state
        .store
        .fetch(article_id)
        .await?
        .ok_or(RestError::ArticleNotFound)?;

    // Best-effort view tracking, only when the caller identified themselves.
    if let Some(user_id) = viewer.user_id {
        state.recent.record_view(user_id, article_id).await;
    }

    Ok(Json(article))
}

async fn list_articles(
    Query(page): Query<Pagination>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Article>>, RestError> {
    let articles = state.store.list(page.skip, page.limit).await?;
    Ok(Json(articles))
}

async fn update_article(
    Path(article_id): Path<i64>,
    State(state): State<AppState>,
    Json(update): Json<ArticleUpdate>,
) -> Result<Json<Article>, RestError> {
    let article = state
        .store
        .update(article_id, update)
        .await?
        .ok_or(RestError::ArticleNotFound)?;

    Ok(Json(article))
}

async fn delete_article(
    Path(article_id): Path<i64>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, RestError> {
    if !state.store.delete(article_id).await? {
        return Err(RestError::ArticleNotFound);
    }

    Ok(Json(json!({"detail": "Article deleted successfully"})))
}

/// Resolve a user's recency list to full records, preserving view order.
///
/// The id-set lookup returns rows in arbitrary order, so rows are re-sorted
/// by each id's index in the tracked sequence. Ids whose article has since
/// been deleted resolve to nothing and drop out of the response; the stored
/// list keeps them until they age out.
async fn recently_viewed(
    Path(user_id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Article>>, RestError> {
    let ids = state.recent.get_recent(user_id).await;
    let mut articles = state.store.fetch_many(&ids).await?;
    articles.sort_by_key(|article| ids.iter().position(|&id| id == article.id));

    Ok(Json(articles))
}
