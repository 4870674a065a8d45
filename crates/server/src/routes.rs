use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use pith_core::id::CompositeId;
use pith_core::{
    ChannelDescriptor, ChannelError, Item, PlayState, StreamDescriptor, StreamOptions,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/rest", rest_router())
        .route("/stream/{*path}", get(crate::streaming::stream_file))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn rest_router() -> Router<AppState> {
    Router::new()
        .route("/channels", get(list_channels))
        .route("/channel/{cid}/list", get(list_root))
        .route("/channel/{cid}/list/{*container}", get(list_container))
        .route("/channel/{cid}/detail/{*item}", get(get_item))
        .route("/channel/{cid}/stream/{*item}", get(get_stream))
        .route(
            "/channel/{cid}/playstate/{*item}",
            get(get_play_state).put(put_play_state),
        )
        // Composite ids: `channel:<cid>[:<item>]`
        .route("/item/{*composite}", get(get_composite_item))
        .route("/list/{*composite}", get(list_composite))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    channels: usize,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        channels: state.registry.list().len(),
    })
}

// ---------------------------------------------------------------------------
// Channels
// ---------------------------------------------------------------------------

async fn list_channels(State(state): State<AppState>) -> Json<Vec<ChannelDescriptor>> {
    Json(state.registry.list())
}

async fn list_root(
    State(state): State<AppState>,
    Path(cid): Path<String>,
) -> Result<Json<Vec<Item>>, AppError> {
    let channel = state.registry.require(&cid)?;
    Ok(Json(channel.list_contents(None).await?))
}

async fn list_container(
    State(state): State<AppState>,
    Path((cid, container)): Path<(String, String)>,
) -> Result<Json<Vec<Item>>, AppError> {
    let channel = state.registry.require(&cid)?;
    Ok(Json(channel.list_contents(Some(&container)).await?))
}

async fn get_item(
    State(state): State<AppState>,
    Path((cid, item)): Path<(String, String)>,
) -> Result<Json<Item>, AppError> {
    let channel = state.registry.require(&cid)?;
    Ok(Json(channel.get_item(&item, true).await?))
}

#[derive(Debug, Deserialize)]
struct StreamQuery {
    /// Comma-separated transcode profile names.
    target: Option<String>,
}

async fn get_stream(
    State(state): State<AppState>,
    Path((cid, item)): Path<(String, String)>,
    Query(query): Query<StreamQuery>,
) -> Result<Json<StreamDescriptor>, AppError> {
    let channel = state.registry.require(&cid)?;
    let item = channel.get_item(&item, false).await?;
    let options = StreamOptions {
        target: query.target,
    };
    debug!(channel = %cid, item = %item.id, ?options, "negotiating stream");
    Ok(Json(channel.get_stream(&item, &options).await?))
}

// ---------------------------------------------------------------------------
// Play state
// ---------------------------------------------------------------------------

async fn get_play_state(
    State(state): State<AppState>,
    Path((cid, item)): Path<(String, String)>,
) -> Result<Json<Option<PlayState>>, AppError> {
    let channel = state.registry.require(&cid)?;
    Ok(Json(channel.get_last_play_state(&item).await?))
}

async fn put_play_state(
    State(state): State<AppState>,
    Path((cid, item)): Path<(String, String)>,
    Json(body): Json<PlayState>,
) -> Result<StatusCode, AppError> {
    let channel = state.registry.require(&cid)?;
    channel.put_play_state(&item, body).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Composite ids
// ---------------------------------------------------------------------------

async fn get_composite_item(
    State(state): State<AppState>,
    Path(composite): Path<String>,
) -> Result<Json<Item>, AppError> {
    let id = CompositeId::parse(&composite)?;
    let item_id = id
        .item_id
        .ok_or_else(|| ChannelError::InvalidId(format!("{composite} names no item")))?;
    let channel = state.registry.require(&id.channel_id)?;
    Ok(Json(channel.get_item(&item_id, true).await?))
}

async fn list_composite(
    State(state): State<AppState>,
    Path(composite): Path<String>,
) -> Result<Json<Vec<Item>>, AppError> {
    let id = CompositeId::parse(&composite)?;
    let channel = state.registry.require(&id.channel_id)?;
    Ok(Json(channel.list_contents(id.item_id.as_deref()).await?))
}
