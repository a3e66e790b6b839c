//! Session retrieval and approval handlers.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use opsforge_core::provision::terraform;
use opsforge_core::session::approve_session;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Query parameters for listing sessions.
#[derive(Debug, Deserialize)]
pub struct ListSessionsQuery {
    /// Maximum number of sessions to return (default 20).
    #[serde(default = "default_session_limit")]
    pub limit: usize,
}

fn default_session_limit() -> usize {
    20
}

/// Approval decision body.
#[derive(Debug, Deserialize)]
pub struct ApprovalBody {
    pub approved: bool,
}

/// GET /api/v1/{domain}/sessions/{id} - fetch one session.
pub async fn get_session(
    State(state): State<AppState>,
    Path((domain, id)): Path<(String, Uuid)>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let start = Instant::now();
    let domain = super::parse_domain(&domain)?;
    let session = state.sessions.get(id)?;

    let data = serde_json::to_value(&session)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(data, Uuid::now_v7().to_string(), elapsed)
        .with_link("self", &format!("/api/v1/{domain}/sessions/{id}"));
    Ok(Json(resp))
}

/// GET /api/v1/{domain}/sessions - list recent sessions for a domain.
pub async fn list_sessions(
    State(state): State<AppState>,
    Path(domain): Path<String>,
    Query(query): Query<ListSessionsQuery>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let start = Instant::now();
    let domain = super::parse_domain(&domain)?;
    let sessions = state.sessions.list(domain, query.limit);

    let data = json!({
        "domain": domain,
        "count": sessions.len(),
        "sessions": sessions,
    });
    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(
        data,
        Uuid::now_v7().to_string(),
        elapsed,
    )))
}

/// POST /api/v1/{domain}/sessions/{id}/approve - approve or reject a
/// completed analysis. Approval renders the Terraform artifact for
/// provisioning domains.
pub async fn approve(
    State(state): State<AppState>,
    Path((domain, id)): Path<(String, Uuid)>,
    Json(body): Json<ApprovalBody>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let start = Instant::now();
    let domain = super::parse_domain(&domain)?;

    let (status, recommendation) = approve_session(state.sessions.as_ref(), id, body.approved)?;
    let rendered = recommendation
        .as_ref()
        .and_then(|rec| terraform::render(domain, rec));

    state.automation_updates.push(
        "opsforge",
        format!("session {id} {status}"),
        vec![domain.to_string()],
    );

    let data = json!({
        "session_id": id,
        "status": status,
        "terraform": rendered,
    });
    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(data, Uuid::now_v7().to_string(), elapsed)
        .with_link("self", &format!("/api/v1/{domain}/sessions/{id}"));
    Ok(Json(resp))
}
