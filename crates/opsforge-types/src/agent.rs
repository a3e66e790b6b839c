//! Agent execution results and analysis outcomes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::request::Domain;

/// Result of one agent invocation. Immutable once produced.
///
/// `degraded` distinguishes a live model analysis from the curated fallback
/// analysis substituted on gateway failure. It propagates to the top-level
/// response so callers never have to dig for a side-channel flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResult {
    pub agent_name: String,
    pub analysis: serde_json::Map<String, serde_json::Value>,
    /// Heuristic confidence in [0.70, 0.98]. Presentation-layer trust,
    /// not a calibrated probability; it gates no control flow.
    pub confidence: f64,
    pub reasoning: Vec<String>,
    pub recommendations: Vec<String>,
    pub degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub execution_time_ms: u64,
}

/// One executed phase of a plan, for the response `steps` list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseStep {
    pub phase: String,
    pub agents: Vec<String>,
    pub parallel: bool,
    pub duration_ms: u64,
}

/// Timing/degradation roll-up for a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionSummary {
    pub total_ms: u64,
    pub phases: u32,
    pub agents: u32,
    pub degraded_agents: u32,
}

/// Final product of a phase-plan run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub session_id: Uuid,
    pub domain: Domain,
    pub steps: Vec<PhaseStep>,
    /// Keyed by agent role (e.g. "detection", "root_cause").
    pub agent_results: BTreeMap<String, AgentResult>,
    pub final_recommendation: serde_json::Value,
    pub execution_summary: ExecutionSummary,
    /// True when any agent fell back to canned analysis.
    pub degraded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_result() -> AgentResult {
        AgentResult {
            agent_name: "Detection".into(),
            analysis: serde_json::Map::new(),
            confidence: 0.75,
            reasoning: vec!["no data".into()],
            recommendations: vec![],
            degraded: true,
            fallback_reason: Some("gateway transport error".into()),
            timestamp: Utc::now(),
            execution_time_ms: 42,
        }
    }

    #[test]
    fn test_agent_result_serde_roundtrip() {
        let result = sample_result();
        let json = serde_json::to_string(&result).unwrap();
        let parsed: AgentResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.agent_name, "Detection");
        assert!(parsed.degraded);
        assert_eq!(parsed.fallback_reason.as_deref(), Some("gateway transport error"));
    }

    #[test]
    fn test_fallback_reason_omitted_when_none() {
        let mut result = sample_result();
        result.degraded = false;
        result.fallback_reason = None;
        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("fallback_reason").is_none());
    }
}
