//! Gallery media routes.
//!
//! Every listing route runs the same aggregation pipeline; they differ only
//! in media kind and whether the query text is honored. Handlers are plain
//! futures, so a client disconnect drops any in-flight catalog or provider
//! call along with the handler and nothing is written back.

use crate::server::error::AppError;
use crate::server::AppContext;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tidepool_common::{AggregatedResponse, CanonicalMediaItem, MediaKind, SearchQuery};

pub fn media_routes() -> Router<AppContext> {
    Router::new()
        .route("/photos/search", get(search_photos))
        .route("/photos/curated", get(curated_photos))
        .route("/photos/:id", get(photo_detail))
        .route("/videos/search", get(search_videos))
        .route("/videos/popular", get(popular_videos))
        .route("/videos/videos/:id", get(video_detail))
        .route("/collections/featured", get(featured_collections))
        .route("/collections/:id", get(collection_media))
}

/// Raw query-string parameters.
///
/// Pagination arrives as strings so a non-numeric value falls back to its
/// default instead of failing extraction.
#[derive(Debug, Default, Deserialize)]
pub struct MediaParams {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    page: Option<String>,
    #[serde(default, alias = "perPage")]
    per_page: Option<String>,
}

impl MediaParams {
    fn to_query(&self) -> SearchQuery {
        SearchQuery::from_raw(
            self.query.as_deref(),
            self.page.as_deref(),
            self.per_page.as_deref(),
        )
    }
}

type PageResult = Result<Json<AggregatedResponse>, AppError>;

async fn search_photos(State(ctx): State<AppContext>, Query(params): Query<MediaParams>) -> PageResult {
    let response = ctx.aggregator.search(MediaKind::Photos, &params.to_query()).await?;
    Ok(Json(response))
}

async fn curated_photos(State(ctx): State<AppContext>, Query(params): Query<MediaParams>) -> PageResult {
    let response = ctx.aggregator.featured(MediaKind::Photos, &params.to_query()).await?;
    Ok(Json(response))
}

async fn search_videos(State(ctx): State<AppContext>, Query(params): Query<MediaParams>) -> PageResult {
    let response = ctx.aggregator.search(MediaKind::Videos, &params.to_query()).await?;
    Ok(Json(response))
}

async fn popular_videos(State(ctx): State<AppContext>, Query(params): Query<MediaParams>) -> PageResult {
    let response = ctx.aggregator.featured(MediaKind::Videos, &params.to_query()).await?;
    Ok(Json(response))
}

async fn featured_collections(
    State(ctx): State<AppContext>,
    Query(params): Query<MediaParams>,
) -> PageResult {
    let response = ctx
        .aggregator
        .featured(MediaKind::Collections, &params.to_query())
        .await?;
    Ok(Json(response))
}

async fn collection_media(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Query(params): Query<MediaParams>,
) -> PageResult {
    let response = ctx.aggregator.collection(&id, &params.to_query()).await?;
    Ok(Json(response))
}

async fn photo_detail(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<CanonicalMediaItem>, AppError> {
    let item = ctx.aggregator.detail(MediaKind::Photos, &id).await?;
    Ok(Json(item))
}

async fn video_detail(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<CanonicalMediaItem>, AppError> {
    let item = ctx.aggregator.detail(MediaKind::Videos, &id).await?;
    Ok(Json(item))
}
