//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use opsforge_types::error::{OrchestratorError, SessionError, WorkflowError};

/// Short operator-facing guide returned alongside credential failures.
const SETUP_GUIDE: &str = "Set AWS_BEDROCK_API_KEY to a Bedrock bearer token \
     (Amazon Bedrock console > API keys), then restart the server. \
     Optionally set OPSFORGE_BEDROCK_REGION and OPSFORGE_BEDROCK_MODEL.";

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Session store errors.
    Session(SessionError),
    /// Orchestrator errors (credential probe, task join).
    Orchestrator(OrchestratorError),
    /// Workflow engine errors.
    Workflow(WorkflowError),
    /// Validation error.
    Validation(String),
    /// Generic internal error.
    Internal(String),
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        AppError::Session(e)
    }
}

impl From<OrchestratorError> for AppError {
    fn from(e: OrchestratorError) -> Self {
        AppError::Orchestrator(e)
    }
}

impl From<WorkflowError> for AppError {
    fn from(e: WorkflowError) -> Self {
        AppError::Workflow(e)
    }
}

impl AppError {
    /// (status, machine code, message, extra details) for the envelope.
    fn parts(&self) -> (StatusCode, &'static str, String, Option<serde_json::Value>) {
        match self {
            AppError::Session(SessionError::NotFound) => (
                StatusCode::NOT_FOUND,
                "SESSION_NOT_FOUND",
                "Session not found".to_string(),
                None,
            ),
            AppError::Session(e @ SessionError::NotCompleted(_)) => {
                (StatusCode::CONFLICT, "SESSION_NOT_COMPLETED", e.to_string(), None)
            }
            AppError::Session(e @ SessionError::NotProvisionable(_)) => {
                (StatusCode::CONFLICT, "SESSION_NOT_PROVISIONABLE", e.to_string(), None)
            }
            AppError::Orchestrator(e @ OrchestratorError::Credentials(_)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "CREDENTIALS_MISSING",
                e.to_string(),
                Some(json!({"setup_guide": SETUP_GUIDE})),
            ),
            AppError::Orchestrator(e @ OrchestratorError::Join(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "ORCHESTRATOR_ERROR",
                e.to_string(),
                None,
            ),
            AppError::Workflow(WorkflowError::NotFound) => (
                StatusCode::NOT_FOUND,
                "WORKFLOW_NOT_FOUND",
                "Workflow not found".to_string(),
                None,
            ),
            AppError::Workflow(e @ WorkflowError::NotWaitingApproval(_)) => {
                (StatusCode::CONFLICT, "WORKFLOW_NOT_WAITING_APPROVAL", e.to_string(), None)
            }
            AppError::Workflow(e @ WorkflowError::NotExecutable(_)) => {
                (StatusCode::CONFLICT, "WORKFLOW_NOT_EXECUTABLE", e.to_string(), None)
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
            }
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone(), None)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = self.parts();

        let body = json!({
            "data": null,
            "meta": {
                "request_id": "",
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "response_time_ms": 0
            },
            "errors": [{
                "code": code,
                "message": message,
                "details": details,
            }]
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
