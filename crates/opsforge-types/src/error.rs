//! Error enums shared across the workspace, one per domain concern.
//!
//! Gateway errors live next to their types in [`crate::llm`].

use thiserror::Error;

/// Errors from session store operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session not found")]
    NotFound,

    #[error("session is not completed (current status: '{0}')")]
    NotCompleted(String),

    #[error("sessions in the '{0}' domain have no provisioning step")]
    NotProvisionable(String),
}

/// Errors from phase-plan orchestration.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Upfront credential probe failed; no phase has run.
    #[error("gateway credentials unavailable: {0}")]
    Credentials(String),

    /// A spawned agent task panicked. Agents degrade instead of erroring,
    /// so this only surfaces programmer mistakes.
    #[error("agent task failed to join: {0}")]
    Join(String),
}

/// Errors from the task-decomposition workflow engine.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("workflow not found")]
    NotFound,

    #[error("workflow is not awaiting approval (current state: '{0}')")]
    NotWaitingApproval(String),

    #[error("workflow is not executable (current state: '{0}')")]
    NotExecutable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_error_display() {
        let err = SessionError::NotProvisionable("incident".into());
        assert!(err.to_string().contains("incident"));
    }

    #[test]
    fn test_orchestrator_error_display() {
        let err = OrchestratorError::Credentials("AWS_BEDROCK_API_KEY not set".into());
        assert!(err.to_string().contains("AWS_BEDROCK_API_KEY"));
    }

    #[test]
    fn test_workflow_error_display() {
        let err = WorkflowError::NotWaitingApproval("running".into());
        assert_eq!(
            err.to_string(),
            "workflow is not awaiting approval (current state: 'running')"
        );
    }
}
