//! Route handlers.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::{GatewayError, GatewayResult};
use crate::models::{Paper, SearchParams, SearchResponse, Source};
use crate::sources::SourceRegistry;

/// Shared state for HTTP handlers.
pub type AppState = Arc<SourceRegistry>;

/// Create the HTTP router.
pub fn create_router(sources: AppState) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        // `{*id}` so old-style arXiv ids (`hep-th/9901001`) route too
        .route("/paper/{source}/{*id}", get(get_paper))
        .route("/pubmed/search", get(search_pubmed))
        .route("/arxiv/search", get(search_arxiv))
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(sources)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "paper-proxy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn not_found() -> GatewayError {
    GatewayError::not_found("Route")
}

async fn get_paper(
    State(sources): State<AppState>,
    Path((source, id)): Path<(String, String)>,
) -> GatewayResult<Json<Paper>> {
    let source: Source = source.parse()?;
    let id = id.trim_start_matches('/');
    source.validate_id(id)?;

    tracing::debug!(%source, id, "Fetching paper");
    let paper = sources.get(source).fetch_paper(id).await?;
    Ok(Json(paper))
}

async fn search_pubmed(
    State(sources): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> GatewayResult<Json<SearchResponse>> {
    search(&sources, Source::Pubmed, params).await
}

async fn search_arxiv(
    State(sources): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> GatewayResult<Json<SearchResponse>> {
    search(&sources, Source::Arxiv, params).await
}

async fn search(
    sources: &SourceRegistry,
    source: Source,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> GatewayResult<Json<SearchResponse>> {
    let Query(params) =
        params.map_err(|rejection| GatewayError::invalid_input("query string", rejection.body_text()))?;
    let query = params.validate()?;

    tracing::debug!(%source, query = %query.query, max_results = query.max_results, "Searching");
    let papers = sources.get(source).search(&query).await?;
    Ok(Json(SearchResponse { papers }))
}
