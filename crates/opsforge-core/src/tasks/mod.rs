//! Goal classification and task templates for the workflow engine.
//!
//! Classification is keyword containment over the lowercased goal text.
//! Each primary action expands into a fixed task template with declared
//! dependencies; the engine then sorts and dispatches them.

pub mod registry;
pub mod sort;
pub mod workflow;

use opsforge_types::task::{AgentTask, GoalClassification, TaskPriority};

fn contains_any(goal: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| goal.contains(k))
}

/// Classify a free-text goal into an action tuple.
pub fn classify_goal(goal: &str) -> GoalClassification {
    let lower = goal.to_lowercase();

    let primary_action = if contains_any(&lower, &["provision", "create", "set up", "deploy"]) {
        "provision"
    } else if contains_any(&lower, &["optimize", "reduce cost", "tune", "rightsize"]) {
        "optimize"
    } else if contains_any(&lower, &["fix", "remediate", "repair", "resolve", "mitigate"]) {
        "remediate"
    } else {
        "analyze"
    };

    let target = if contains_any(&lower, &["database", "rds", "dynamodb", "table", "sql"]) {
        "database"
    } else if contains_any(&lower, &["service", "api", "application"]) {
        "service"
    } else {
        "infrastructure"
    };

    let urgency = if contains_any(&lower, &["urgent", "asap", "immediately", "critical", "outage"]) {
        "high"
    } else {
        "normal"
    };

    let scope = if contains_any(&lower, &["all ", "every", "fleet", "across"]) {
        "broad"
    } else {
        "single"
    };

    GoalClassification {
        primary_action: primary_action.to_string(),
        target: target.to_string(),
        urgency: urgency.to_string(),
        scope: scope.to_string(),
    }
}

/// Expand a classification into its task template. Templates are fixed
/// per action; the classification only steers descriptions and priority.
pub fn expand_tasks(classification: &GoalClassification, goal: &str) -> Vec<AgentTask> {
    let urgent = classification.urgency == "high";
    let boost = |p: TaskPriority| if urgent { TaskPriority::High.max(p) } else { p };

    match classification.primary_action.as_str() {
        "provision" => vec![
            AgentTask::new(
                "gather_requirements",
                "gather_requirements",
                format!("Collect requirements for: {goal}"),
                boost(TaskPriority::Medium),
                vec![],
            ),
            AgentTask::new(
                "design",
                "design_architecture",
                format!("Design the {} architecture", classification.target),
                boost(TaskPriority::Medium),
                vec!["gather_requirements".into()],
            ),
            AgentTask::new(
                "cost_review",
                "estimate_cost",
                "Estimate monthly cost of the proposed design",
                boost(TaskPriority::Medium),
                vec!["design".into()],
            ),
            // Applying infrastructure changes always gates on approval.
            AgentTask::new(
                "apply",
                "apply_infrastructure",
                "Apply the approved infrastructure changes",
                TaskPriority::Critical,
                vec!["cost_review".into()],
            ),
            AgentTask::new(
                "verify",
                "verify_deployment",
                "Verify the deployment is healthy",
                boost(TaskPriority::Medium),
                vec!["apply".into()],
            ),
        ],
        "optimize" => vec![
            AgentTask::new(
                "baseline",
                "collect_metrics",
                format!("Capture a utilization baseline for the {}", classification.target),
                boost(TaskPriority::Medium),
                vec![],
            ),
            AgentTask::new(
                "identify",
                "identify_savings",
                "Identify rightsizing and savings opportunities",
                boost(TaskPriority::Medium),
                vec!["baseline".into()],
            ),
            AgentTask::new(
                "apply",
                "apply_infrastructure",
                "Apply the selected optimizations",
                TaskPriority::Critical,
                vec!["identify".into()],
            ),
            AgentTask::new(
                "validate",
                "verify_deployment",
                "Validate performance after the change",
                boost(TaskPriority::Medium),
                vec!["apply".into()],
            ),
        ],
        "remediate" => vec![
            AgentTask::new(
                "triage",
                "triage_issue",
                format!("Triage: {goal}"),
                boost(TaskPriority::High),
                vec![],
            ),
            AgentTask::new(
                "plan",
                "plan_remediation",
                "Plan the remediation steps",
                boost(TaskPriority::High),
                vec!["triage".into()],
            ),
            AgentTask::new(
                "execute",
                "execute_remediation",
                "Execute the remediation plan",
                if urgent { TaskPriority::Critical } else { TaskPriority::High },
                vec!["plan".into()],
            ),
            AgentTask::new(
                "verify",
                "verify_deployment",
                "Confirm the issue is resolved",
                boost(TaskPriority::Medium),
                vec!["execute".into()],
            ),
        ],
        _ => vec![
            AgentTask::new(
                "collect",
                "collect_metrics",
                format!("Collect data for: {goal}"),
                boost(TaskPriority::Medium),
                vec![],
            ),
            AgentTask::new(
                "analyze",
                "analyze_data",
                format!("Analyze the {} data", classification.target),
                boost(TaskPriority::Medium),
                vec!["collect".into()],
            ),
            AgentTask::new(
                "report",
                "write_report",
                "Summarize findings and recommendations",
                boost(TaskPriority::Low),
                vec!["analyze".into()],
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_provision_database() {
        let c = classify_goal("Provision a new RDS database for the payments team");
        assert_eq!(c.primary_action, "provision");
        assert_eq!(c.target, "database");
        assert_eq!(c.urgency, "normal");
    }

    #[test]
    fn test_classify_urgent_remediation() {
        let c = classify_goal("Fix the checkout API outage immediately");
        assert_eq!(c.primary_action, "remediate");
        assert_eq!(c.target, "service");
        assert_eq!(c.urgency, "high");
    }

    #[test]
    fn test_classify_defaults_to_analyze() {
        let c = classify_goal("What is going on with our spend?");
        assert_eq!(c.primary_action, "analyze");
        assert_eq!(c.target, "infrastructure");
        assert_eq!(c.scope, "single");
    }

    #[test]
    fn test_provision_template_carries_critical_apply() {
        let c = classify_goal("Deploy a dynamodb table");
        let tasks = expand_tasks(&c, "Deploy a dynamodb table");
        let apply = tasks.iter().find(|t| t.id == "apply").unwrap();
        assert_eq!(apply.priority, TaskPriority::Critical);
        assert_eq!(apply.dependencies, vec!["cost_review"]);
    }

    #[test]
    fn test_analyze_template_has_no_critical_tasks() {
        let c = classify_goal("Review database utilization");
        let tasks = expand_tasks(&c, "Review database utilization");
        assert!(tasks.iter().all(|t| t.priority != TaskPriority::Critical));
    }

    #[test]
    fn test_every_template_task_is_described() {
        for goal in [
            "Provision a new RDS database",
            "Optimize our EC2 spend",
            "Fix the checkout outage",
            "Review database utilization",
        ] {
            let c = classify_goal(goal);
            for task in expand_tasks(&c, goal) {
                assert!(!task.description.is_empty(), "{goal}: {}", task.id);
            }
        }
    }

    #[test]
    fn test_urgency_boosts_priority() {
        let c = classify_goal("Fix the failing reconciliation job urgent");
        let tasks = expand_tasks(&c, "Fix the failing reconciliation job urgent");
        let execute = tasks.iter().find(|t| t.id == "execute").unwrap();
        assert_eq!(execute.priority, TaskPriority::Critical);
    }
}
