//! Task-decomposition workflow types.
//!
//! A workflow is a free-text goal classified into an action tuple, expanded
//! into dependency-ordered tasks, and dispatched to registered worker
//! agents by capability and historical success rate.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declared task priority. Ordering matters: ties in the dependency sort
/// break by priority, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskPriority::Low => write!(f, "low"),
            TaskPriority::Medium => write!(f, "medium"),
            TaskPriority::High => write!(f, "high"),
            TaskPriority::Critical => write!(f, "critical"),
        }
    }
}

/// Lifecycle of a single task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Executing,
    Completed,
    Failed,
}

/// One unit of work inside a workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentTask {
    pub id: String,
    /// Capability name used for agent selection (e.g. "design_schema").
    pub task_type: String,
    pub description: String,
    pub priority: TaskPriority,
    /// Task ids that must complete before this one starts.
    #[serde(default)]
    pub dependencies: Vec<String>,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
}

impl AgentTask {
    pub fn new(
        id: impl Into<String>,
        task_type: impl Into<String>,
        description: impl Into<String>,
        priority: TaskPriority,
        dependencies: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            task_type: task_type.into(),
            description: description.into(),
            priority,
            dependencies,
            status: TaskStatus::Pending,
            assigned_to: None,
            output: None,
        }
    }
}

/// Classification of a free-text goal via keyword containment. No NLP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalClassification {
    pub primary_action: String,
    pub target: String,
    pub urgency: String,
    pub scope: String,
}

/// Lifecycle of a whole workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    Pending,
    WaitingApproval,
    Running,
    Completed,
    Failed,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowState::Pending => write!(f, "pending"),
            WorkflowState::WaitingApproval => write!(f, "waiting_approval"),
            WorkflowState::Running => write!(f, "running"),
            WorkflowState::Completed => write!(f, "completed"),
            WorkflowState::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for WorkflowState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(WorkflowState::Pending),
            "waiting_approval" => Ok(WorkflowState::WaitingApproval),
            "running" => Ok(WorkflowState::Running),
            "completed" => Ok(WorkflowState::Completed),
            "failed" => Ok(WorkflowState::Failed),
            other => Err(format!("invalid workflow state: '{other}'")),
        }
    }
}

/// One decomposed workflow, keyed by a generated v7 UUID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRecord {
    pub id: Uuid,
    pub goal: String,
    pub classification: GoalClassification,
    pub tasks: Vec<AgentTask>,
    pub state: WorkflowState,
    /// Set when any task carries `Critical` priority; the workflow pauses
    /// in `WaitingApproval` until explicitly approved.
    pub requires_approval: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_ordering() {
        assert!(TaskPriority::Critical > TaskPriority::High);
        assert!(TaskPriority::High > TaskPriority::Medium);
        assert!(TaskPriority::Medium > TaskPriority::Low);
    }

    #[test]
    fn test_workflow_state_roundtrip() {
        for state in [
            WorkflowState::Pending,
            WorkflowState::WaitingApproval,
            WorkflowState::Running,
            WorkflowState::Completed,
            WorkflowState::Failed,
        ] {
            let parsed: WorkflowState = state.to_string().parse().unwrap();
            assert_eq!(state, parsed);
        }
    }

    #[test]
    fn test_new_task_is_pending() {
        let task = AgentTask::new(
            "t1",
            "design_schema",
            "Design the table schema",
            TaskPriority::Medium,
            vec!["t0".into()],
        );
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.dependencies, vec!["t0"]);
        assert!(task.assigned_to.is_none());
    }

    #[test]
    fn test_task_serde_defaults() {
        let task: AgentTask = serde_json::from_str(
            r#"{"id":"a","task_type":"analyze","description":"x","priority":"low","status":"pending"}"#,
        )
        .unwrap();
        assert!(task.dependencies.is_empty());
    }
}
