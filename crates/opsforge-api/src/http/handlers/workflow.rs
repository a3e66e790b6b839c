//! Task-decomposition workflow handlers.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use opsforge_types::task::WorkflowState;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Body for creating a workflow.
#[derive(Debug, Deserialize)]
pub struct CreateWorkflowBody {
    pub goal: String,
}

/// Body for approving a paused workflow.
#[derive(Debug, Deserialize)]
pub struct ApproveWorkflowBody {
    pub approver: String,
}

fn to_data(record: &impl serde::Serialize) -> Result<Value, AppError> {
    serde_json::to_value(record).map_err(|e| AppError::Internal(e.to_string()))
}

/// POST /api/v1/workflows - decompose a goal and run it. Workflows with a
/// critical task stay paused in `waiting_approval` instead of running.
pub async fn create_workflow(
    State(state): State<AppState>,
    Json(body): Json<CreateWorkflowBody>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let start = Instant::now();
    if body.goal.trim().is_empty() {
        return Err(AppError::Validation("goal must not be empty".to_string()));
    }

    let record = state.workflows.create_workflow(&body.goal);
    let record = if record.state == WorkflowState::Pending {
        state.workflows.execute(record.id).await?
    } else {
        record
    };

    state.automation_updates.push(
        "opsforge",
        format!("workflow {} {}", record.id, record.state),
        vec![record.classification.primary_action.clone()],
    );

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(to_data(&record)?, Uuid::now_v7().to_string(), elapsed)
        .with_link("self", &format!("/api/v1/workflows/{}", record.id));
    Ok(Json(resp))
}

/// GET /api/v1/workflows/{id} - fetch one workflow.
pub async fn get_workflow(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let start = Instant::now();
    let record = state.workflows.get(id)?;

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(to_data(&record)?, Uuid::now_v7().to_string(), elapsed)
        .with_link("self", &format!("/api/v1/workflows/{id}"));
    Ok(Json(resp))
}

/// POST /api/v1/workflows/{id}/approve - approve a paused workflow and
/// resume execution.
pub async fn approve_workflow(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ApproveWorkflowBody>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let start = Instant::now();
    if body.approver.trim().is_empty() {
        return Err(AppError::Validation("approver must not be empty".to_string()));
    }

    let record = state.workflows.approve(id, &body.approver).await?;

    state.automation_updates.push(
        &body.approver,
        format!("workflow {} approved, finished {}", record.id, record.state),
        vec![record.classification.primary_action.clone()],
    );

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(to_data(&record)?, Uuid::now_v7().to_string(), elapsed)
        .with_link("self", &format!("/api/v1/workflows/{id}"));
    Ok(Json(resp))
}
