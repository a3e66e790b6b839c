//! Generic phase orchestrator.
//!
//! One orchestrator drives every domain: a [`PhasePlan`] declares the
//! ordered phases, each phase holds one or more [`AgentSpec`]s, and a
//! multi-agent phase fans out concurrently via `tokio::task::JoinSet` with
//! a barrier before the next phase. Each agent's analysis is merged into
//! the accumulated context under its `context_key` before the following
//! phase builds its prompts.
//!
//! # Failure semantics
//!
//! The only hard stop is the upfront credential probe: if it fails, no
//! phase runs and the caller gets `OrchestratorError::Credentials`. After
//! the probe, individual agent failures degrade to fallback analyses
//! inside `run_agent`, so a run always completes -- possibly with every
//! result marked `degraded`.

pub mod plans;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tokio::task::JoinSet;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use opsforge_types::agent::{AgentResult, AnalysisOutcome, ExecutionSummary, PhaseStep};
use opsforge_types::error::OrchestratorError;
use opsforge_types::llm::InvokeOptions;
use opsforge_types::request::{AnalysisRequest, Domain};

use crate::agent::{AgentSpec, Context, run_agent};
use crate::gateway::BoxGateway;

/// One ordered step of a plan. More than one agent means concurrent
/// fan-out with a fan-in barrier.
#[derive(Debug, Clone)]
pub struct Phase {
    pub name: &'static str,
    pub agents: Vec<AgentSpec>,
}

/// Declarative description of a domain pipeline.
pub struct PhasePlan {
    pub domain: Domain,
    pub phases: Vec<Phase>,
    /// Pure synthesis over the accumulated context. Absent keys resolve
    /// to curated defaults, never errors.
    pub synthesize: fn(&Context) -> Value,
}

/// Drives one [`PhasePlan`] against a gateway.
pub struct PhaseOrchestrator {
    gateway: Arc<BoxGateway>,
    plan: PhasePlan,
    options: InvokeOptions,
}

impl PhaseOrchestrator {
    pub fn new(gateway: Arc<BoxGateway>, plan: PhasePlan, options: InvokeOptions) -> Self {
        Self {
            gateway,
            plan,
            options,
        }
    }

    pub fn domain(&self) -> Domain {
        self.plan.domain
    }

    /// Run the full plan for one request.
    #[instrument(skip_all, fields(domain = %self.plan.domain))]
    pub async fn analyze(
        &self,
        request: &AnalysisRequest,
    ) -> Result<AnalysisOutcome, OrchestratorError> {
        // Credential probe before anything else: a misconfigured gateway
        // must produce zero agent invocations.
        self.gateway
            .probe()
            .map_err(|e| OrchestratorError::Credentials(e.to_string()))?;

        let session_id = Uuid::now_v7();
        let start = Instant::now();
        let mut context = Context::new();
        let mut agent_results: BTreeMap<String, AgentResult> = BTreeMap::new();
        let mut steps = Vec::with_capacity(self.plan.phases.len());

        for phase in &self.plan.phases {
            let phase_start = Instant::now();
            let parallel = phase.agents.len() > 1;

            let results = if parallel {
                self.run_fan_out(phase, request, &context).await?
            } else {
                let mut results = Vec::with_capacity(1);
                for spec in &phase.agents {
                    results.push((
                        *spec,
                        run_agent(&self.gateway, spec, request, &context, &self.options).await,
                    ));
                }
                results
            };

            for (spec, result) in results {
                if result.degraded {
                    warn!(phase = phase.name, agent = spec.key, "agent degraded to fallback");
                }
                context.insert(
                    spec.context_key.to_string(),
                    Value::Object(result.analysis.clone()),
                );
                agent_results.insert(spec.key.to_string(), result);
            }

            steps.push(PhaseStep {
                phase: phase.name.to_string(),
                agents: phase.agents.iter().map(|a| a.key.to_string()).collect(),
                parallel,
                duration_ms: phase_start.elapsed().as_millis() as u64,
            });
        }

        let final_recommendation = (self.plan.synthesize)(&context);
        let degraded_agents = agent_results.values().filter(|r| r.degraded).count() as u32;
        let degraded = degraded_agents > 0;
        let total_ms = start.elapsed().as_millis() as u64;

        info!(
            session_id = %session_id,
            total_ms,
            agents = agent_results.len(),
            degraded_agents,
            "analysis complete"
        );

        Ok(AnalysisOutcome {
            session_id,
            domain: self.plan.domain,
            steps,
            execution_summary: ExecutionSummary {
                total_ms,
                phases: self.plan.phases.len() as u32,
                agents: agent_results.len() as u32,
                degraded_agents,
            },
            agent_results,
            final_recommendation,
            degraded,
        })
    }

    /// Fan out every agent of a phase, then barrier on all of them.
    /// Completion order is arbitrary; the barrier guarantees all results
    /// are merged before the next phase starts.
    async fn run_fan_out(
        &self,
        phase: &Phase,
        request: &AnalysisRequest,
        context: &Context,
    ) -> Result<Vec<(AgentSpec, AgentResult)>, OrchestratorError> {
        let mut join_set = JoinSet::new();
        for spec in &phase.agents {
            let gateway = self.gateway.clone();
            let spec = *spec;
            let request = request.clone();
            let context = context.clone();
            let options = self.options.clone();
            join_set.spawn(async move {
                let result = run_agent(&gateway, &spec, &request, &context, &options).await;
                (spec, result)
            });
        }

        let mut results = Vec::with_capacity(phase.agents.len());
        while let Some(joined) = join_set.join_next().await {
            results.push(joined.map_err(|e| OrchestratorError::Join(e.to_string()))?);
        }
        // Stable merge order regardless of completion order.
        results.sort_by_key(|(spec, _)| spec.key);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::plans;
    use super::*;
    use crate::agent::confidence::{MAX_CONFIDENCE, MIN_CONFIDENCE};
    use crate::gateway::mock::MockGateway;
    use opsforge_types::request::{IncidentRequest, IncidentMetrics, SqlProvisioningRequest};
    use std::sync::atomic::Ordering;

    fn incident_request() -> AnalysisRequest {
        AnalysisRequest::Incident(IncidentRequest {
            service: "checkout-api".into(),
            severity: "critical".into(),
            description: "elevated 5xx rate".into(),
            metrics: IncidentMetrics {
                affected_users: 5000,
                error_rate: "12%".into(),
                ..Default::default()
            },
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_probe_failure_runs_zero_agents() {
        let gateway_impl = MockGateway::without_credentials();
        let calls = gateway_impl.calls();
        let orchestrator = PhaseOrchestrator::new(
            Arc::new(BoxGateway::new(gateway_impl)),
            plans::incident::plan(),
            InvokeOptions::default(),
        );

        let err = orchestrator.analyze(&incident_request()).await.unwrap_err();
        assert!(matches!(err, OrchestratorError::Credentials(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_all_failures_still_complete_degraded() {
        let orchestrator = PhaseOrchestrator::new(
            Arc::new(BoxGateway::new(MockGateway::failing())),
            plans::incident::plan(),
            InvokeOptions::default(),
        );

        let outcome = orchestrator.analyze(&incident_request()).await.unwrap();
        assert!(outcome.degraded);
        assert_eq!(outcome.execution_summary.degraded_agents, 5);
        for result in outcome.agent_results.values() {
            assert!(result.degraded);
            assert!((MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(&result.confidence));
        }
    }

    #[tokio::test]
    async fn test_incident_plan_end_to_end_fallback() {
        let orchestrator = PhaseOrchestrator::new(
            Arc::new(BoxGateway::new(MockGateway::failing())),
            plans::incident::plan(),
            InvokeOptions::default(),
        );

        let outcome = orchestrator.analyze(&incident_request()).await.unwrap();

        let keys: Vec<&str> = outcome.agent_results.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["communication", "detection", "post_incident", "remediation", "root_cause"]
        );
        // Severity is model-derived; under total fallback it is P2.
        assert_eq!(
            outcome.final_recommendation["incident_response_plan"]["severity"],
            "P2"
        );
    }

    #[tokio::test]
    async fn test_phase_ordering_and_fan_out_shape() {
        let orchestrator = PhaseOrchestrator::new(
            Arc::new(BoxGateway::new(MockGateway::failing())),
            plans::incident::plan(),
            InvokeOptions::default(),
        );

        let outcome = orchestrator.analyze(&incident_request()).await.unwrap();
        let phases: Vec<(&str, bool)> = outcome
            .steps
            .iter()
            .map(|s| (s.phase.as_str(), s.parallel))
            .collect();
        assert_eq!(
            phases,
            vec![
                ("detection", false),
                ("investigation", true),
                ("remediation", false),
                ("post_incident", false),
            ]
        );
    }

    #[tokio::test]
    async fn test_context_propagates_between_phases() {
        // A live detection reply must be visible in the accumulated context
        // when synthesis reads it back out.
        let orchestrator = PhaseOrchestrator::new(
            Arc::new(BoxGateway::new(MockGateway::replying(serde_json::json!({
                "severity": "P1",
                "category": "availability",
                "impact_scope": "multi_service",
                "likely_cause": "bad deploy",
                "evidence": ["5xx spike"],
                "affected_components": ["checkout-api"],
                "status_page_update": "Investigating elevated errors",
                "stakeholder_summary": "Checkout degraded",
                "next_update_minutes": 30,
                "immediate_actions": ["rollback"],
                "rollback_required": true,
                "estimated_recovery_minutes": 20,
                "action_items": ["add canary"],
                "review_scheduled": true,
                "prevention_measures": ["canary deploys"]
            })))),
            plans::incident::plan(),
            InvokeOptions::default(),
        );

        let outcome = orchestrator.analyze(&incident_request()).await.unwrap();
        assert!(!outcome.degraded);
        assert_eq!(
            outcome.final_recommendation["incident_response_plan"]["severity"],
            "P1"
        );
    }

    #[tokio::test]
    async fn test_sql_plan_fallback_recommendation() {
        let orchestrator = PhaseOrchestrator::new(
            Arc::new(BoxGateway::new(MockGateway::failing())),
            plans::sql::plan(),
            InvokeOptions::default(),
        );
        let request = AnalysisRequest::Sql(SqlProvisioningRequest {
            team: "payments".into(),
            application: "ledger".into(),
            ..Default::default()
        });

        let outcome = orchestrator.analyze(&request).await.unwrap();
        let rec = &outcome.final_recommendation["provisioning_recommendation"];
        assert_eq!(rec["engine"], "postgres");
        assert_eq!(rec["multi_az"], true);
    }
}
