//! SQL provisioning plan: workload -> (cost || security) -> architecture.

use serde_json::{Map, Value, json};

use opsforge_types::request::{AnalysisRequest, Domain, SqlProvisioningRequest};

use crate::agent::{AgentSpec, Context, str_field};
use crate::orchestrator::{Phase, PhasePlan};

use super::{context_block, context_str, context_value, object};

pub fn plan() -> PhasePlan {
    PhasePlan {
        domain: Domain::Sql,
        phases: vec![
            Phase {
                name: "workload",
                agents: vec![WORKLOAD],
            },
            Phase {
                name: "assessment",
                agents: vec![COST, SECURITY],
            },
            Phase {
                name: "architecture",
                agents: vec![ARCHITECTURE],
            },
        ],
        synthesize,
    }
}

fn sql(request: &AnalysisRequest) -> SqlProvisioningRequest {
    request.as_sql().cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// workload analysis
// ---------------------------------------------------------------------------

const WORKLOAD: AgentSpec = AgentSpec {
    key: "workload",
    name: "Workload Analysis",
    context_key: "workload_profile",
    key_fields: &["workload_class", "read_write_ratio", "peak_qps"],
    prompt: workload_prompt,
    fallback: workload_fallback,
    reasoning: workload_reasoning,
    recommendations: workload_recommendations,
};

fn workload_prompt(request: &AnalysisRequest, _context: &Context) -> String {
    let req = sql(request);
    format!(
        "You are a database workload analysis agent for AWS RDS.\n\
         Characterize the workload below.\n\n\
         Team: {}\nApplication: {}\nEnvironment: {}\n\
         Workload type: {}\nExpected QPS: {}\nData size: {} GB\n\
         Requirements: {}\n\n\
         Respond with a single JSON object exactly like:\n\
         {{\"workload_class\": \"oltp\", \"read_write_ratio\": \"80:20\", \
         \"peak_qps\": 2500, \"growth_projection\": \"20% yearly\", \
         \"hot_tables_expected\": true}}",
        req.team,
        req.application,
        req.environment,
        req.workload_type,
        req.expected_qps,
        req.data_size_gb,
        req.requirements.join(", "),
    )
}

fn workload_fallback(request: &AnalysisRequest) -> Map<String, Value> {
    let req = sql(request);
    object(json!({
        "workload_class": if req.workload_type.is_empty() { "oltp".to_string() } else { req.workload_type },
        "read_write_ratio": "80:20",
        "peak_qps": if req.expected_qps > 0 { req.expected_qps.saturating_mul(2) } else { 1000 },
        "growth_projection": "20% yearly",
        "hot_tables_expected": false,
    }))
}

fn workload_reasoning(analysis: &Map<String, Value>) -> Vec<String> {
    vec![
        format!(
            "Workload characterized as {} with a {} read/write ratio",
            str_field(analysis, "workload_class"),
            str_field(analysis, "read_write_ratio")
        ),
        format!(
            "Peak planning target: {} QPS",
            analysis.get("peak_qps").and_then(Value::as_u64).unwrap_or(1000)
        ),
    ]
}

fn workload_recommendations(analysis: &Map<String, Value>) -> Vec<String> {
    let mut recs = vec!["Size for the projected peak, not the stated average".to_string()];
    if analysis
        .get("hot_tables_expected")
        .and_then(Value::as_bool)
        .unwrap_or(false)
    {
        recs.push("Plan read replicas for the identified hot tables".to_string());
    }
    recs
}

// ---------------------------------------------------------------------------
// cost projection
// ---------------------------------------------------------------------------

const COST: AgentSpec = AgentSpec {
    key: "cost",
    name: "Cost Optimization",
    context_key: "cost_projection",
    key_fields: &["monthly_estimate_usd", "cost_breakdown"],
    prompt: cost_prompt,
    fallback: cost_fallback,
    reasoning: cost_reasoning,
    recommendations: cost_recommendations,
};

fn cost_prompt(request: &AnalysisRequest, context: &Context) -> String {
    let req = sql(request);
    format!(
        "You are a cloud cost optimization agent. Project monthly costs for \
         the RDS deployment implied by the workload profile below.\n\n\
         Environment: {}\nData size: {} GB\n\n\
         Prior analysis:\n{}\n\n\
         Respond with a single JSON object exactly like:\n\
         {{\"monthly_estimate_usd\": 850, \
         \"cost_breakdown\": {{\"compute\": 600, \"storage\": 150, \"backup\": 100}}, \
         \"savings_options\": [\"reserved instances\"]}}",
        req.environment,
        req.data_size_gb,
        context_block(context),
    )
}

fn cost_fallback(_request: &AnalysisRequest) -> Map<String, Value> {
    object(json!({
        "monthly_estimate_usd": 850,
        "cost_breakdown": {"compute": 600, "storage": 150, "backup": 100},
        "savings_options": ["Reserved instances for steady-state compute", "gp3 storage tier"],
    }))
}

fn cost_reasoning(analysis: &Map<String, Value>) -> Vec<String> {
    let estimate = analysis
        .get("monthly_estimate_usd")
        .and_then(Value::as_u64)
        .unwrap_or(850);
    vec![format!("Projected monthly cost: ${estimate}")]
}

fn cost_recommendations(analysis: &Map<String, Value>) -> Vec<String> {
    analysis
        .get("savings_options")
        .and_then(Value::as_array)
        .map(|options| {
            options
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// security assessment
// ---------------------------------------------------------------------------

const SECURITY: AgentSpec = AgentSpec {
    key: "security",
    name: "Security Compliance",
    context_key: "security_assessment",
    key_fields: &["encryption_at_rest", "network_isolation"],
    prompt: security_prompt,
    fallback: security_fallback,
    reasoning: security_reasoning,
    recommendations: security_recommendations,
};

fn security_prompt(request: &AnalysisRequest, context: &Context) -> String {
    let req = sql(request);
    format!(
        "You are a security compliance agent for AWS data stores. Assess the \
         required controls for the deployment below.\n\n\
         Team: {}\nEnvironment: {}\nRequirements: {}\n\n\
         Prior analysis:\n{}\n\n\
         Respond with a single JSON object exactly like:\n\
         {{\"encryption_at_rest\": true, \"network_isolation\": \"private_subnet\", \
         \"iam_auth\": true, \"compliance_notes\": [\"enable audit logging\"]}}",
        req.team,
        req.environment,
        req.requirements.join(", "),
        context_block(context),
    )
}

fn security_fallback(request: &AnalysisRequest) -> Map<String, Value> {
    let req = sql(request);
    object(json!({
        "encryption_at_rest": true,
        "network_isolation": "private_subnet",
        "iam_auth": req.environment == "production",
        "compliance_notes": ["Enable audit logging", "Rotate credentials via the secrets manager"],
    }))
}

fn security_reasoning(analysis: &Map<String, Value>) -> Vec<String> {
    vec![format!(
        "Network isolation set to {} with encryption at rest {}",
        str_field(analysis, "network_isolation"),
        if analysis
            .get("encryption_at_rest")
            .and_then(Value::as_bool)
            .unwrap_or(true)
        {
            "enabled"
        } else {
            "disabled"
        }
    )]
}

fn security_recommendations(analysis: &Map<String, Value>) -> Vec<String> {
    analysis
        .get("compliance_notes")
        .and_then(Value::as_array)
        .map(|notes| notes.iter().filter_map(Value::as_str).map(String::from).collect())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// architecture synthesis
// ---------------------------------------------------------------------------

const ARCHITECTURE: AgentSpec = AgentSpec {
    key: "architecture",
    name: "Architecture Synthesis",
    context_key: "architecture_recommendation",
    key_fields: &["engine", "instance_class", "storage_gb"],
    prompt: architecture_prompt,
    fallback: architecture_fallback,
    reasoning: architecture_reasoning,
    recommendations: architecture_recommendations,
};

fn architecture_prompt(request: &AnalysisRequest, context: &Context) -> String {
    let req = sql(request);
    format!(
        "You are a database architecture agent. Combine the workload, cost, \
         and security analyses below into a concrete RDS recommendation.\n\n\
         Application: {}\nEnvironment: {}\n\n\
         Prior analysis:\n{}\n\n\
         Respond with a single JSON object exactly like:\n\
         {{\"engine\": \"postgres\", \"engine_version\": \"16.4\", \
         \"instance_class\": \"db.r6g.large\", \"storage_gb\": 100, \
         \"multi_az\": true, \"read_replicas\": 1, \
         \"backup_retention_days\": 7}}",
        req.application,
        req.environment,
        context_block(context),
    )
}

fn architecture_fallback(request: &AnalysisRequest) -> Map<String, Value> {
    let req = sql(request);
    object(json!({
        "engine": "postgres",
        "engine_version": "16.4",
        "instance_class": "db.r6g.large",
        "storage_gb": req.data_size_gb.max(100),
        "multi_az": req.environment == "production",
        "read_replicas": if req.expected_qps > 5000 { 2 } else { 1 },
        "backup_retention_days": 7,
    }))
}

fn architecture_reasoning(analysis: &Map<String, Value>) -> Vec<String> {
    vec![
        format!(
            "Selected {} on {} class instances",
            str_field(analysis, "engine"),
            str_field(analysis, "instance_class")
        ),
        format!(
            "Multi-AZ {}",
            if analysis.get("multi_az").and_then(Value::as_bool).unwrap_or(false) {
                "enabled for failover"
            } else {
                "disabled"
            }
        ),
    ]
}

fn architecture_recommendations(analysis: &Map<String, Value>) -> Vec<String> {
    vec![
        format!(
            "Provision {} with {} GB gp3 storage",
            str_field(analysis, "instance_class"),
            analysis.get("storage_gb").and_then(Value::as_u64).unwrap_or(100)
        ),
        "Load-test against the projected peak before go-live".to_string(),
    ]
}

// ---------------------------------------------------------------------------
// synthesis
// ---------------------------------------------------------------------------

fn synthesize(context: &Context) -> Value {
    json!({
        "provisioning_recommendation": {
            "engine": context_str(context, "architecture_recommendation", "engine", "postgres"),
            "engine_version": context_str(context, "architecture_recommendation", "engine_version", "16.4"),
            "instance_class": context_str(
                context,
                "architecture_recommendation",
                "instance_class",
                "db.r6g.large"
            ),
            "storage_gb": context_value(context, "architecture_recommendation", "storage_gb"),
            "multi_az": context
                .get("architecture_recommendation")
                .and_then(|a| a.get("multi_az"))
                .and_then(Value::as_bool)
                .unwrap_or(true),
            "backup_retention_days": context_value(
                context,
                "architecture_recommendation",
                "backup_retention_days"
            ),
            "monthly_estimate_usd": context_value(context, "cost_projection", "monthly_estimate_usd"),
            "encryption_at_rest": context
                .get("security_assessment")
                .and_then(|a| a.get("encryption_at_rest"))
                .and_then(Value::as_bool)
                .unwrap_or(true),
            "network_isolation": context_str(
                context,
                "security_assessment",
                "network_isolation",
                "private_subnet"
            ),
        }
    })
}
