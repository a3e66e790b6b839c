//! Workflow engine: decompose a goal, gate on approval, dispatch tasks.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use serde_json::{Value, json};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use opsforge_types::error::WorkflowError;
use opsforge_types::llm::InvokeOptions;
use opsforge_types::task::{
    AgentTask, TaskPriority, TaskStatus, WorkflowRecord, WorkflowState,
};

use crate::gateway::BoxGateway;
use crate::tasks::registry::AgentRegistry;
use crate::tasks::{classify_goal, expand_tasks, sort::execution_order};

pub struct WorkflowEngine {
    gateway: Arc<BoxGateway>,
    registry: AgentRegistry,
    workflows: DashMap<Uuid, WorkflowRecord>,
    options: InvokeOptions,
}

impl WorkflowEngine {
    pub fn new(gateway: Arc<BoxGateway>, registry: AgentRegistry, options: InvokeOptions) -> Self {
        Self {
            gateway,
            registry,
            workflows: DashMap::new(),
            options,
        }
    }

    /// Classify a goal and expand it into a stored workflow. A workflow
    /// containing any critical-priority task pauses for approval instead
    /// of becoming immediately executable.
    pub fn create_workflow(&self, goal: &str) -> WorkflowRecord {
        let classification = classify_goal(goal);
        let tasks = expand_tasks(&classification, goal);
        let requires_approval = tasks.iter().any(|t| t.priority == TaskPriority::Critical);

        let record = WorkflowRecord {
            id: Uuid::now_v7(),
            goal: goal.to_string(),
            classification,
            tasks,
            state: if requires_approval {
                WorkflowState::WaitingApproval
            } else {
                WorkflowState::Pending
            },
            requires_approval,
            approved_by: None,
            created_at: Utc::now(),
            completed_at: None,
        };

        info!(
            workflow_id = %record.id,
            action = %record.classification.primary_action,
            tasks = record.tasks.len(),
            requires_approval,
            "workflow created"
        );
        self.workflows.insert(record.id, record.clone());
        record
    }

    pub fn get(&self, id: Uuid) -> Result<WorkflowRecord, WorkflowError> {
        self.workflows
            .get(&id)
            .map(|r| r.clone())
            .ok_or(WorkflowError::NotFound)
    }

    /// Approve a paused workflow and resume execution.
    pub async fn approve(
        &self,
        id: Uuid,
        approver: &str,
    ) -> Result<WorkflowRecord, WorkflowError> {
        {
            let mut record = self.workflows.get_mut(&id).ok_or(WorkflowError::NotFound)?;
            if record.state != WorkflowState::WaitingApproval {
                return Err(WorkflowError::NotWaitingApproval(record.state.to_string()));
            }
            record.approved_by = Some(approver.to_string());
            record.state = WorkflowState::Pending;
        }
        self.execute(id).await
    }

    /// Run every task of a pending workflow in dependency order.
    #[instrument(skip(self), fields(workflow_id = %id))]
    pub async fn execute(&self, id: Uuid) -> Result<WorkflowRecord, WorkflowError> {
        let ordered = {
            let mut record = self.workflows.get_mut(&id).ok_or(WorkflowError::NotFound)?;
            if record.state != WorkflowState::Pending {
                return Err(WorkflowError::NotExecutable(record.state.to_string()));
            }
            record.state = WorkflowState::Running;
            execution_order(&record.tasks)
        };

        let mut any_failed = false;
        for task in &ordered {
            let (status, assigned_to, output) = self.run_task(task).await;
            if status == TaskStatus::Failed {
                any_failed = true;
            }
            if let Some(mut record) = self.workflows.get_mut(&id) {
                if let Some(stored) = record.tasks.iter_mut().find(|t| t.id == task.id) {
                    stored.status = status;
                    stored.assigned_to = assigned_to;
                    stored.output = Some(output);
                }
            }
        }

        let mut record = self.workflows.get_mut(&id).ok_or(WorkflowError::NotFound)?;
        record.state = if any_failed {
            WorkflowState::Failed
        } else {
            WorkflowState::Completed
        };
        record.completed_at = Some(Utc::now());
        info!(state = %record.state, "workflow finished");
        Ok(record.clone())
    }

    /// Dispatch one task to a capable idle worker and run its prompt.
    async fn run_task(&self, task: &AgentTask) -> (TaskStatus, Option<String>, Value) {
        let Some(worker) = self.registry.assign(&task.task_type) else {
            warn!(task = %task.id, task_type = %task.task_type, "no idle worker with capability");
            return (
                TaskStatus::Failed,
                None,
                json!({"error": format!("no worker available for {}", task.task_type)}),
            );
        };

        let prompt = format!(
            "You are the {} worker executing one task of an infrastructure \
             workflow.\n\nTask: {}\n\n\
             Respond with a single JSON object exactly like:\n\
             {{\"summary\": \"what was done\", \"details\": [\"step taken\"]}}",
            worker, task.description,
        );

        let result = self.gateway.invoke(&prompt, &self.options).await;
        match result {
            Ok(reply) if reply.has_data() => {
                self.registry.release(&worker, &task.task_type, true);
                (
                    TaskStatus::Completed,
                    Some(worker),
                    Value::Object(reply.data.unwrap_or_default()),
                )
            }
            Ok(reply) => {
                self.registry.release(&worker, &task.task_type, true);
                (
                    TaskStatus::Completed,
                    Some(worker),
                    json!({"summary": reply.raw}),
                )
            }
            Err(err) => {
                warn!(task = %task.id, error = %err, "task execution failed");
                self.registry.release(&worker, &task.task_type, false);
                (
                    TaskStatus::Failed,
                    Some(worker),
                    json!({"error": err.to_string()}),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::mock::MockGateway;
    use crate::tasks::registry::default_registry;

    fn engine(gateway: MockGateway) -> WorkflowEngine {
        WorkflowEngine::new(
            Arc::new(BoxGateway::new(gateway)),
            default_registry(),
            InvokeOptions::default(),
        )
    }

    #[tokio::test]
    async fn test_analysis_workflow_runs_without_approval() {
        let engine = engine(MockGateway::replying(json!({
            "summary": "done",
            "details": ["collected metrics"]
        })));

        let record = engine.create_workflow("Review database utilization");
        assert!(!record.requires_approval);
        assert_eq!(record.state, WorkflowState::Pending);

        let finished = engine.execute(record.id).await.unwrap();
        assert_eq!(finished.state, WorkflowState::Completed);
        assert!(finished
            .tasks
            .iter()
            .all(|t| t.status == TaskStatus::Completed));
        assert!(finished.tasks.iter().all(|t| t.assigned_to.is_some()));
    }

    #[tokio::test]
    async fn test_provisioning_pauses_for_approval() {
        let engine = engine(MockGateway::replying(json!({"summary": "ok"})));

        let record = engine.create_workflow("Provision a new RDS database");
        assert!(record.requires_approval);
        assert_eq!(record.state, WorkflowState::WaitingApproval);

        // Direct execution is rejected while paused.
        let err = engine.execute(record.id).await.unwrap_err();
        assert!(matches!(err, WorkflowError::NotExecutable(_)));

        let finished = engine.approve(record.id, "alice").await.unwrap();
        assert_eq!(finished.state, WorkflowState::Completed);
        assert_eq!(finished.approved_by.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_failing_gateway_fails_workflow() {
        let engine = engine(MockGateway::failing());

        let record = engine.create_workflow("Analyze spend across the fleet");
        let finished = engine.execute(record.id).await.unwrap();
        assert_eq!(finished.state, WorkflowState::Failed);
        assert!(finished
            .tasks
            .iter()
            .any(|t| t.status == TaskStatus::Failed));
    }

    #[tokio::test]
    async fn test_approve_rejects_wrong_state() {
        let engine = engine(MockGateway::replying(json!({"summary": "ok"})));
        let record = engine.create_workflow("Review database utilization");

        let err = engine.approve(record.id, "alice").await.unwrap_err();
        assert!(matches!(err, WorkflowError::NotWaitingApproval(_)));
    }

    #[tokio::test]
    async fn test_unknown_workflow_is_not_found() {
        let engine = engine(MockGateway::failing());
        assert!(matches!(
            engine.get(Uuid::now_v7()),
            Err(WorkflowError::NotFound)
        ));
    }
}
