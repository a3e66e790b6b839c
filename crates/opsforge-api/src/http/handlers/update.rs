//! Update log handlers: post to and read the capped audit channels.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Body for posting an update.
#[derive(Debug, Deserialize)]
pub struct PostUpdateBody {
    pub author: String,
    pub message: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Query parameters for listing updates.
#[derive(Debug, Deserialize)]
pub struct ListUpdatesQuery {
    /// Maximum number of entries to return (default 20).
    #[serde(default = "default_update_limit")]
    pub limit: usize,
}

fn default_update_limit() -> usize {
    20
}

/// POST /api/v1/updates/{channel} - append an entry.
pub async fn post_update(
    State(state): State<AppState>,
    Path(channel): Path<String>,
    Json(body): Json<PostUpdateBody>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let start = Instant::now();
    let channel = super::parse_channel(&channel)?;
    if body.message.trim().is_empty() {
        return Err(AppError::Validation("message must not be empty".to_string()));
    }

    let entry = state.updates(channel).push(body.author, body.message, body.tags);

    let elapsed = start.elapsed().as_millis() as u64;
    let data = serde_json::to_value(&entry).map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Json(ApiResponse::success(
        data,
        Uuid::now_v7().to_string(),
        elapsed,
    )))
}

/// GET /api/v1/updates/{channel} - newest-first entries.
pub async fn list_updates(
    State(state): State<AppState>,
    Path(channel): Path<String>,
    Query(query): Query<ListUpdatesQuery>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let start = Instant::now();
    let channel = super::parse_channel(&channel)?;
    let entries = state.updates(channel).recent(query.limit);

    let data = json!({
        "channel": channel,
        "count": entries.len(),
        "updates": entries,
    });
    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(
        data,
        Uuid::now_v7().to_string(),
        elapsed,
    )))
}
