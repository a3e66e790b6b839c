//! Analysis handlers: run a domain's phase plan and persist the session.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use serde_json::{Value, json};

use opsforge_types::request::{AnalysisRequest, Domain};
use opsforge_types::session::{SessionRecord, SessionStatus};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Validate a free-form request body into the domain's typed request.
/// The path segment is authoritative; a `domain` field in the body is
/// overwritten rather than trusted.
pub(crate) fn validate_request(domain: Domain, body: Value) -> Result<AnalysisRequest, AppError> {
    let mut object = match body {
        Value::Object(map) => map,
        other => {
            return Err(AppError::Validation(format!(
                "request body must be a JSON object, got {}",
                value_kind(&other)
            )));
        }
    };
    object.insert("domain".to_string(), json!(domain.to_string()));
    serde_json::from_value(Value::Object(object))
        .map_err(|e| AppError::Validation(format!("invalid {domain} request: {e}")))
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// POST /api/v1/{domain}/analyze - run the full phase plan.
pub async fn analyze(
    State(state): State<AppState>,
    Path(domain): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<ApiResponse<Value>>, AppError> {
    let start = Instant::now();
    let domain = super::parse_domain(&domain)?;
    let request = validate_request(domain, body)?;

    let outcome = state.orchestrator(domain).analyze(&request).await?;
    let session_id = outcome.session_id;

    let mut record = SessionRecord::new(
        session_id,
        domain,
        serde_json::to_value(&request).unwrap_or(Value::Null),
    );
    record.status = SessionStatus::Completed;
    record.agent_results = outcome.agent_results.clone();
    record.recommendation = Some(outcome.final_recommendation.clone());
    record.degraded = outcome.degraded;
    record.completed_at = Some(chrono::Utc::now());
    state.sessions.create(record);

    let data = json!({
        "session_id": session_id,
        "domain": domain,
        "status": SessionStatus::Completed,
        "steps": outcome.steps,
        "agent_results": outcome.agent_results,
        "recommendation": outcome.final_recommendation,
        "execution_summary": outcome.execution_summary,
        "degraded": outcome.degraded,
    });

    let elapsed = start.elapsed().as_millis() as u64;
    let resp = ApiResponse::success(data, session_id.to_string(), elapsed)
        .with_link("self", &format!("/api/v1/{domain}/sessions/{session_id}"))
        .with_link("approve", &format!("/api/v1/{domain}/sessions/{session_id}/approve"));
    Ok(Json(resp))
}
