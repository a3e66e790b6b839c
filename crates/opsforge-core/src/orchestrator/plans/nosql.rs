//! NoSQL provisioning plan:
//! access_patterns -> (capacity || security) -> table_design.

use serde_json::{Map, Value, json};

use opsforge_types::request::{AnalysisRequest, Domain, NoSqlProvisioningRequest};

use crate::agent::{AgentSpec, Context, str_field};
use crate::orchestrator::{Phase, PhasePlan};

use super::{context_block, context_str, context_value, object};

pub fn plan() -> PhasePlan {
    PhasePlan {
        domain: Domain::Nosql,
        phases: vec![
            Phase {
                name: "access_patterns",
                agents: vec![ACCESS_PATTERNS],
            },
            Phase {
                name: "assessment",
                agents: vec![CAPACITY, SECURITY],
            },
            Phase {
                name: "table_design",
                agents: vec![TABLE_DESIGN],
            },
        ],
        synthesize,
    }
}

fn nosql(request: &AnalysisRequest) -> NoSqlProvisioningRequest {
    request.as_nosql().cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// access pattern analysis
// ---------------------------------------------------------------------------

const ACCESS_PATTERNS: AgentSpec = AgentSpec {
    key: "access_patterns",
    name: "Access Pattern Analysis",
    context_key: "access_pattern_analysis",
    key_fields: &["primary_pattern", "query_shapes"],
    prompt: access_prompt,
    fallback: access_fallback,
    reasoning: access_reasoning,
    recommendations: access_recommendations,
};

fn access_prompt(request: &AnalysisRequest, _context: &Context) -> String {
    let req = nosql(request);
    format!(
        "You are a DynamoDB access pattern analysis agent.\n\
         Analyze the patterns below.\n\n\
         Team: {}\nApplication: {}\nEnvironment: {}\n\
         Access patterns: {}\nExpected RPS: {}\nItem size: {} KB\n\n\
         Respond with a single JSON object exactly like:\n\
         {{\"primary_pattern\": \"get_by_id\", \
         \"query_shapes\": [\"point lookup by user id\"], \
         \"hot_partition_risk\": \"low\", \
         \"gsi_candidates\": [\"by_status\"]}}",
        req.team,
        req.application,
        req.environment,
        req.access_patterns.join("; "),
        req.expected_rps,
        req.item_size_kb,
    )
}

fn access_fallback(request: &AnalysisRequest) -> Map<String, Value> {
    let req = nosql(request);
    let shapes: Vec<Value> = if req.access_patterns.is_empty() {
        vec![Value::String("point lookup by primary key".to_string())]
    } else {
        req.access_patterns.iter().cloned().map(Value::String).collect()
    };
    object(json!({
        "primary_pattern": "get_by_id",
        "query_shapes": shapes,
        "hot_partition_risk": if req.expected_rps > 10_000 { "high" } else { "low" },
        "gsi_candidates": [],
    }))
}

fn access_reasoning(analysis: &Map<String, Value>) -> Vec<String> {
    vec![
        format!("Primary access pattern: {}", str_field(analysis, "primary_pattern")),
        format!(
            "Hot partition risk assessed as {}",
            str_field(analysis, "hot_partition_risk")
        ),
    ]
}

fn access_recommendations(analysis: &Map<String, Value>) -> Vec<String> {
    let mut recs = vec!["Model keys around the dominant pattern first".to_string()];
    if str_field(analysis, "hot_partition_risk") == "high" {
        recs.push("Add write sharding to spread the hot partition key".to_string());
    }
    recs
}

// ---------------------------------------------------------------------------
// capacity planning
// ---------------------------------------------------------------------------

const CAPACITY: AgentSpec = AgentSpec {
    key: "capacity",
    name: "Capacity Planning",
    context_key: "capacity_plan",
    key_fields: &["billing_mode", "peak_rcu", "peak_wcu"],
    prompt: capacity_prompt,
    fallback: capacity_fallback,
    reasoning: capacity_reasoning,
    recommendations: capacity_recommendations,
};

fn capacity_prompt(request: &AnalysisRequest, context: &Context) -> String {
    let req = nosql(request);
    format!(
        "You are a DynamoDB capacity planning agent. Plan table capacity from \
         the access pattern analysis below.\n\n\
         Expected RPS: {}\nItem size: {} KB\nEnvironment: {}\n\n\
         Prior analysis:\n{}\n\n\
         Respond with a single JSON object exactly like:\n\
         {{\"billing_mode\": \"PAY_PER_REQUEST\", \"peak_rcu\": 5000, \
         \"peak_wcu\": 1000, \"monthly_estimate_usd\": 320}}",
        req.expected_rps,
        req.item_size_kb,
        req.environment,
        context_block(context),
    )
}

fn capacity_fallback(request: &AnalysisRequest) -> Map<String, Value> {
    let req = nosql(request);
    // Rough sizing: reads dominate, one RCU per 4 KB item read.
    let item_units = (req.item_size_kb.max(1)).div_ceil(4);
    let peak = req.expected_rps.max(100) * item_units;
    object(json!({
        "billing_mode": "PAY_PER_REQUEST",
        "peak_rcu": peak,
        "peak_wcu": peak / 4,
        "monthly_estimate_usd": 320,
    }))
}

fn capacity_reasoning(analysis: &Map<String, Value>) -> Vec<String> {
    vec![format!(
        "Billing mode {} sized for {} peak RCU",
        str_field(analysis, "billing_mode"),
        analysis.get("peak_rcu").and_then(Value::as_u64).unwrap_or(0)
    )]
}

fn capacity_recommendations(analysis: &Map<String, Value>) -> Vec<String> {
    let mut recs = vec!["Revisit billing mode once real traffic settles".to_string()];
    if str_field(analysis, "billing_mode") == "PROVISIONED" {
        recs.push("Enable auto scaling on both read and write capacity".to_string());
    }
    recs
}

// ---------------------------------------------------------------------------
// security assessment
// ---------------------------------------------------------------------------

const SECURITY: AgentSpec = AgentSpec {
    key: "security",
    name: "Security Compliance",
    context_key: "security_assessment",
    key_fields: &["encryption_at_rest", "point_in_time_recovery"],
    prompt: security_prompt,
    fallback: security_fallback,
    reasoning: security_reasoning,
    recommendations: security_recommendations,
};

fn security_prompt(request: &AnalysisRequest, context: &Context) -> String {
    let req = nosql(request);
    format!(
        "You are a security compliance agent for AWS data stores. Assess the \
         controls required for the DynamoDB table below.\n\n\
         Team: {}\nEnvironment: {}\nRequirements: {}\n\n\
         Prior analysis:\n{}\n\n\
         Respond with a single JSON object exactly like:\n\
         {{\"encryption_at_rest\": true, \"point_in_time_recovery\": true, \
         \"iam_policies\": [\"least-privilege table access\"], \
         \"compliance_notes\": [\"enable deletion protection\"]}}",
        req.team,
        req.environment,
        req.requirements.join(", "),
        context_block(context),
    )
}

fn security_fallback(request: &AnalysisRequest) -> Map<String, Value> {
    let req = nosql(request);
    object(json!({
        "encryption_at_rest": true,
        "point_in_time_recovery": req.environment == "production",
        "iam_policies": ["Least-privilege access scoped to the table ARN"],
        "compliance_notes": ["Enable deletion protection in production"],
    }))
}

fn security_reasoning(analysis: &Map<String, Value>) -> Vec<String> {
    let pitr = analysis
        .get("point_in_time_recovery")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    vec![format!(
        "Encryption at rest required; point-in-time recovery {}",
        if pitr { "enabled" } else { "not required" }
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
// table design
// ---------------------------------------------------------------------------

const TABLE_DESIGN: AgentSpec = AgentSpec {
    key: "table_design",
    name: "Table Design",
    context_key: "table_design",
    key_fields: &["table_name", "partition_key", "sort_key"],
    prompt: design_prompt,
    fallback: design_fallback,
    reasoning: design_reasoning,
    recommendations: design_recommendations,
};

fn design_prompt(request: &AnalysisRequest, context: &Context) -> String {
    let req = nosql(request);
    format!(
        "You are a DynamoDB table design agent. Combine the analyses below \
         into a concrete table definition.\n\n\
         Application: {}\nEnvironment: {}\n\n\
         Prior analysis:\n{}\n\n\
         Respond with a single JSON object exactly like:\n\
         {{\"table_name\": \"orders\", \"partition_key\": \"pk\", \
         \"sort_key\": \"sk\", \
         \"global_secondary_indexes\": [{{\"name\": \"by_status\", \
         \"partition_key\": \"status\", \"sort_key\": \"created_at\"}}], \
         \"ttl_attribute\": null}}",
        req.application,
        req.environment,
        context_block(context),
    )
}

fn design_fallback(request: &AnalysisRequest) -> Map<String, Value> {
    let req = nosql(request);
    let table_name = if req.application.is_empty() {
        "app-table".to_string()
    } else {
        format!("{}-{}", req.application, req.environment)
    };
    object(json!({
        "table_name": table_name,
        "partition_key": "pk",
        "sort_key": "sk",
        "global_secondary_indexes": [],
        "ttl_attribute": Value::Null,
    }))
}

fn design_reasoning(analysis: &Map<String, Value>) -> Vec<String> {
    let gsi_count = analysis
        .get("global_secondary_indexes")
        .and_then(Value::as_array)
        .map(Vec::len)
        .unwrap_or(0);
    vec![format!(
        "Single-table design keyed on {}/{} with {gsi_count} GSI(s)",
        str_field(analysis, "partition_key"),
        str_field(analysis, "sort_key")
    )]
}

fn design_recommendations(analysis: &Map<String, Value>) -> Vec<String> {
    vec![
        format!(
            "Create table {} with composite primary key",
            str_field(analysis, "table_name")
        ),
        "Verify every declared access pattern against the key schema".to_string(),
    ]
}

// ---------------------------------------------------------------------------
// synthesis
// ---------------------------------------------------------------------------

fn synthesize(context: &Context) -> Value {
    json!({
        "table_recommendation": {
            "table_name": context_str(context, "table_design", "table_name", "app-table"),
            "partition_key": context_str(context, "table_design", "partition_key", "pk"),
            "sort_key": context_str(context, "table_design", "sort_key", "sk"),
            "global_secondary_indexes": context_value(
                context,
                "table_design",
                "global_secondary_indexes"
            ),
            "billing_mode": context_str(context, "capacity_plan", "billing_mode", "PAY_PER_REQUEST"),
            "monthly_estimate_usd": context_value(context, "capacity_plan", "monthly_estimate_usd"),
            "encryption_at_rest": context
                .get("security_assessment")
                .and_then(|a| a.get("encryption_at_rest"))
                .and_then(Value::as_bool)
                .unwrap_or(true),
            "point_in_time_recovery": context
                .get("security_assessment")
                .and_then(|a| a.get("point_in_time_recovery"))
                .and_then(Value::as_bool)
                .unwrap_or(false),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> AnalysisRequest {
        AnalysisRequest::Nosql(NoSqlProvisioningRequest {
            team: "orders".into(),
            application: "order-service".into(),
            environment: "production".into(),
            access_patterns: vec!["get order by id".into(), "list orders by status".into()],
            expected_rps: 12_000,
            item_size_kb: 6,
            ..Default::default()
        })
    }

    #[test]
    fn test_plan_shape() {
        let plan = plan();
        assert_eq!(plan.phases.len(), 3);
        assert_eq!(plan.phases[1].agents.len(), 2);
    }

    #[test]
    fn test_access_fallback_flags_hot_partitions() {
        let analysis = access_fallback(&request());
        assert_eq!(analysis["hot_partition_risk"], "high");
        assert_eq!(analysis["query_shapes"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_capacity_fallback_sizing() {
        // 6 KB items round up to 2 read units each.
        let analysis = capacity_fallback(&request());
        assert_eq!(analysis["peak_rcu"], 24_000);
        assert_eq!(analysis["billing_mode"], "PAY_PER_REQUEST");
    }

    #[test]
    fn test_design_fallback_names_table() {
        let analysis = design_fallback(&request());
        assert_eq!(analysis["table_name"], "order-service-production");
    }

    #[test]
    fn test_synthesis_defaults_without_context() {
        let built = synthesize(&Context::new());
        let rec = &built["table_recommendation"];
        assert_eq!(rec["billing_mode"], "PAY_PER_REQUEST");
        assert_eq!(rec["partition_key"], "pk");
    }
}
