//! Incident-response plan:
//! detection -> (root_cause || communication) -> remediation -> post_incident.

use serde_json::{Map, Value, json};

use opsforge_types::request::{AnalysisRequest, Domain, IncidentRequest};

use crate::agent::{AgentSpec, Context, str_field};
use crate::orchestrator::{Phase, PhasePlan};

use super::{context_block, context_str, context_value, object};

pub fn plan() -> PhasePlan {
    PhasePlan {
        domain: Domain::Incident,
        phases: vec![
            Phase {
                name: "detection",
                agents: vec![DETECTION],
            },
            Phase {
                name: "investigation",
                agents: vec![ROOT_CAUSE, COMMUNICATION],
            },
            Phase {
                name: "remediation",
                agents: vec![REMEDIATION],
            },
            Phase {
                name: "post_incident",
                agents: vec![POST_INCIDENT],
            },
        ],
        synthesize,
    }
}

fn incident(request: &AnalysisRequest) -> IncidentRequest {
    request.as_incident().cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// detection
// ---------------------------------------------------------------------------

const DETECTION: AgentSpec = AgentSpec {
    key: "detection",
    name: "Incident Detection",
    context_key: "incident_classification",
    key_fields: &["severity", "category", "impact_scope"],
    prompt: detection_prompt,
    fallback: detection_fallback,
    reasoning: detection_reasoning,
    recommendations: detection_recommendations,
};

fn detection_prompt(request: &AnalysisRequest, _context: &Context) -> String {
    let req = incident(request);
    format!(
        "You are an incident detection agent for AWS production services.\n\
         Classify the incident below.\n\n\
         Service: {}\n\
         Reported severity: {}\n\
         Description: {}\n\
         Affected users: {}\n\
         Error rate: {}\n\n\
         Respond with a single JSON object exactly like:\n\
         {{\"severity\": \"P1\", \"category\": \"availability\", \
         \"impact_scope\": \"multi_service\", \
         \"affected_components\": [\"api\"], \
         \"detection_summary\": \"one sentence\"}}",
        req.service,
        req.severity,
        req.description,
        req.metrics.affected_users,
        req.metrics.error_rate,
    )
}

fn detection_fallback(request: &AnalysisRequest) -> Map<String, Value> {
    let req = incident(request);
    object(json!({
        "severity": "P2",
        "category": "availability",
        "impact_scope": "single_service",
        "affected_components": [req.service],
        "detection_summary": format!(
            "Reported degradation of {} requires classification",
            req.service
        ),
    }))
}

fn detection_reasoning(analysis: &Map<String, Value>) -> Vec<String> {
    vec![
        format!(
            "Classified as {} severity in the {} category",
            str_field(analysis, "severity"),
            str_field(analysis, "category")
        ),
        format!("Impact scope assessed as {}", str_field(analysis, "impact_scope")),
    ]
}

fn detection_recommendations(analysis: &Map<String, Value>) -> Vec<String> {
    let mut recs = vec!["Page the on-call engineer for the affected service".to_string()];
    if str_field(analysis, "severity") == "P1" {
        recs.push("Open a dedicated incident channel and assign an incident commander".to_string());
    }
    recs
}

// ---------------------------------------------------------------------------
// root cause
// ---------------------------------------------------------------------------

const ROOT_CAUSE: AgentSpec = AgentSpec {
    key: "root_cause",
    name: "Root Cause Analysis",
    context_key: "root_cause_analysis",
    key_fields: &["likely_cause", "evidence"],
    prompt: root_cause_prompt,
    fallback: root_cause_fallback,
    reasoning: root_cause_reasoning,
    recommendations: root_cause_recommendations,
};

fn root_cause_prompt(request: &AnalysisRequest, context: &Context) -> String {
    let req = incident(request);
    format!(
        "You are a root cause analysis agent. Given the incident description \
         and the classification below, hypothesize the most likely cause.\n\n\
         Service: {}\nDescription: {}\n\n\
         Prior analysis:\n{}\n\n\
         Respond with a single JSON object exactly like:\n\
         {{\"likely_cause\": \"bad deploy\", \
         \"evidence\": [\"error spike correlates with deploy\"], \
         \"contributing_factors\": [\"missing canary\"], \
         \"confidence_note\": \"one sentence\"}}",
        req.service,
        req.description,
        context_block(context),
    )
}

fn root_cause_fallback(request: &AnalysisRequest) -> Map<String, Value> {
    let req = incident(request);
    object(json!({
        "likely_cause": "recent deployment or configuration change",
        "evidence": [format!("Error rate of {} reported for {}", req.metrics.error_rate, req.service)],
        "contributing_factors": ["insufficient pre-production validation"],
        "confidence_note": "Hypothesis based on typical failure modes, not live telemetry",
    }))
}

fn root_cause_reasoning(analysis: &Map<String, Value>) -> Vec<String> {
    let evidence = analysis
        .get("evidence")
        .and_then(Value::as_array)
        .map(Vec::len)
        .unwrap_or(0);
    vec![
        format!("Most likely cause: {}", str_field(analysis, "likely_cause")),
        format!("{evidence} supporting evidence item(s) identified"),
    ]
}

fn root_cause_recommendations(analysis: &Map<String, Value>) -> Vec<String> {
    vec![
        format!(
            "Verify the hypothesis ({}) against deploy and change logs",
            str_field(analysis, "likely_cause")
        ),
        "Capture diagnostic snapshots before any remediation mutates state".to_string(),
    ]
}

// ---------------------------------------------------------------------------
// communication
// ---------------------------------------------------------------------------

const COMMUNICATION: AgentSpec = AgentSpec {
    key: "communication",
    name: "Incident Communication",
    context_key: "communication_plan",
    key_fields: &["status_page_update", "stakeholder_summary"],
    prompt: communication_prompt,
    fallback: communication_fallback,
    reasoning: communication_reasoning,
    recommendations: communication_recommendations,
};

fn communication_prompt(request: &AnalysisRequest, context: &Context) -> String {
    let req = incident(request);
    format!(
        "You are an incident communications agent. Draft customer and \
         stakeholder messaging for the incident below.\n\n\
         Service: {}\nDescription: {}\nAffected users: {}\n\n\
         Prior analysis:\n{}\n\n\
         Respond with a single JSON object exactly like:\n\
         {{\"status_page_update\": \"one short paragraph\", \
         \"stakeholder_summary\": \"one short paragraph\", \
         \"next_update_minutes\": 30}}",
        req.service,
        req.description,
        req.metrics.affected_users,
        context_block(context),
    )
}

fn communication_fallback(request: &AnalysisRequest) -> Map<String, Value> {
    let req = incident(request);
    object(json!({
        "status_page_update": format!(
            "We are investigating elevated errors affecting {}. Updates to follow.",
            req.service
        ),
        "stakeholder_summary": format!(
            "{} is degraded; engineering is engaged and investigating.",
            req.service
        ),
        "next_update_minutes": 30,
    }))
}

fn communication_reasoning(analysis: &Map<String, Value>) -> Vec<String> {
    let cadence = analysis
        .get("next_update_minutes")
        .and_then(Value::as_u64)
        .unwrap_or(30);
    vec![format!("Public messaging drafted with a {cadence}-minute update cadence")]
}

fn communication_recommendations(_analysis: &Map<String, Value>) -> Vec<String> {
    vec![
        "Publish the status page update before starting remediation".to_string(),
        "Keep stakeholder updates on the stated cadence even when there is no news".to_string(),
    ]
}

// ---------------------------------------------------------------------------
// remediation
// ---------------------------------------------------------------------------

const REMEDIATION: AgentSpec = AgentSpec {
    key: "remediation",
    name: "Remediation Planning",
    context_key: "remediation_plan",
    key_fields: &["immediate_actions", "rollback_required"],
    prompt: remediation_prompt,
    fallback: remediation_fallback,
    reasoning: remediation_reasoning,
    recommendations: remediation_recommendations,
};

fn remediation_prompt(request: &AnalysisRequest, context: &Context) -> String {
    let req = incident(request);
    format!(
        "You are a remediation planning agent. Using the classification and \
         root cause analysis below, plan the recovery.\n\n\
         Service: {}\n\n\
         Prior analysis:\n{}\n\n\
         Respond with a single JSON object exactly like:\n\
         {{\"immediate_actions\": [\"rollback release\"], \
         \"rollback_required\": true, \
         \"estimated_recovery_minutes\": 20, \
         \"verification_steps\": [\"error rate back under 1%\"]}}",
        req.service,
        context_block(context),
    )
}

fn remediation_fallback(request: &AnalysisRequest) -> Map<String, Value> {
    let req = incident(request);
    object(json!({
        "immediate_actions": [
            format!("Roll back the most recent deployment of {}", req.service),
            "Scale out healthy capacity while the rollback completes",
        ],
        "rollback_required": true,
        "estimated_recovery_minutes": 30,
        "verification_steps": ["Error rate returns to baseline", "Synthetic checks pass"],
    }))
}

fn remediation_reasoning(analysis: &Map<String, Value>) -> Vec<String> {
    let rollback = analysis
        .get("rollback_required")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let eta = analysis
        .get("estimated_recovery_minutes")
        .and_then(Value::as_u64)
        .unwrap_or(30);
    vec![
        if rollback {
            "Rollback identified as the primary recovery path".to_string()
        } else {
            "Recovery planned without a rollback".to_string()
        },
        format!("Estimated recovery time: {eta} minutes"),
    ]
}

fn remediation_recommendations(analysis: &Map<String, Value>) -> Vec<String> {
    let mut recs: Vec<String> = analysis
        .get("immediate_actions")
        .and_then(Value::as_array)
        .map(|actions| {
            actions
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();
    recs.push("Run every verification step before declaring recovery".to_string());
    recs
}

// ---------------------------------------------------------------------------
// post-incident
// ---------------------------------------------------------------------------

const POST_INCIDENT: AgentSpec = AgentSpec {
    key: "post_incident",
    name: "Post-Incident Review",
    context_key: "post_incident_plan",
    key_fields: &["action_items", "prevention_measures"],
    prompt: post_incident_prompt,
    fallback: post_incident_fallback,
    reasoning: post_incident_reasoning,
    recommendations: post_incident_recommendations,
};

fn post_incident_prompt(request: &AnalysisRequest, context: &Context) -> String {
    let req = incident(request);
    format!(
        "You are a post-incident review agent. Produce follow-up actions and \
         prevention measures from the full incident record below.\n\n\
         Service: {}\n\n\
         Prior analysis:\n{}\n\n\
         Respond with a single JSON object exactly like:\n\
         {{\"action_items\": [\"add canary stage\"], \
         \"prevention_measures\": [\"pre-deploy load test\"], \
         \"review_scheduled\": true}}",
        req.service,
        context_block(context),
    )
}

fn post_incident_fallback(request: &AnalysisRequest) -> Map<String, Value> {
    let req = incident(request);
    object(json!({
        "action_items": [
            format!("Schedule a blameless review for the {} incident", req.service),
            "Document the incident timeline while it is fresh",
        ],
        "prevention_measures": ["Add automated rollback on error-rate regression"],
        "review_scheduled": true,
    }))
}

fn post_incident_reasoning(analysis: &Map<String, Value>) -> Vec<String> {
    let items = analysis
        .get("action_items")
        .and_then(Value::as_array)
        .map(Vec::len)
        .unwrap_or(0);
    vec![format!("{items} follow-up action item(s) recorded")]
}

fn post_incident_recommendations(analysis: &Map<String, Value>) -> Vec<String> {
    analysis
        .get("prevention_measures")
        .and_then(Value::as_array)
        .map(|measures| {
            measures
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// synthesis
// ---------------------------------------------------------------------------

fn synthesize(context: &Context) -> Value {
    json!({
        "incident_response_plan": {
            "severity": context_str(context, "incident_classification", "severity", "P2"),
            "category": context_str(context, "incident_classification", "category", "availability"),
            "impact_scope": context_str(context, "incident_classification", "impact_scope", "single_service"),
            "likely_cause": context_str(
                context,
                "root_cause_analysis",
                "likely_cause",
                "undetermined"
            ),
            "immediate_actions": context_value(context, "remediation_plan", "immediate_actions"),
            "rollback_required": context_value(context, "remediation_plan", "rollback_required"),
            "status_page_update": context_str(
                context,
                "communication_plan",
                "status_page_update",
                "Incident under investigation"
            ),
            "follow_up": context_value(context, "post_incident_plan", "action_items"),
        }
    })
}
