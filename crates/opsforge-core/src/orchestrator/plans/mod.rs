//! Built-in phase plans, one per analysis domain.
//!
//! Each plan module exposes a single `plan()` constructor returning the
//! declarative [`PhasePlan`](super::PhasePlan) for its domain. Everything
//! in here is data and pure functions; execution lives in the orchestrator.

pub mod incident;
pub mod nosql;
pub mod sql;

use serde_json::{Map, Value};

use crate::agent::Context;

/// Unwrap a `json!` object literal into the map the fallback builders
/// return. Non-object literals are a programming error in the plan
/// itself, so an empty map is an acceptable degenerate result.
pub(crate) fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Read a string field from a prior agent's analysis in the context,
/// falling back to a curated default when the chain is absent.
pub(crate) fn context_str<'a>(
    context: &'a Context,
    agent_key: &str,
    field: &str,
    default: &'a str,
) -> &'a str {
    context
        .get(agent_key)
        .and_then(|a| a.get(field))
        .and_then(Value::as_str)
        .unwrap_or(default)
}

/// Clone an arbitrary field from a prior agent's analysis, defaulting to
/// `Value::Null` when absent.
pub(crate) fn context_value(context: &Context, agent_key: &str, field: &str) -> Value {
    context
        .get(agent_key)
        .and_then(|a| a.get(field))
        .cloned()
        .unwrap_or(Value::Null)
}

/// Render the context as compact JSON for embedding in a prompt. Phase
/// plans only pass forward what earlier phases produced, so this is the
/// whole inter-agent protocol.
pub(crate) fn context_block(context: &Context) -> String {
    if context.is_empty() {
        return "(no prior analysis)".to_string();
    }
    serde_json::to_string_pretty(&Value::Object(context.clone()))
        .unwrap_or_else(|_| "(unrenderable context)".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_context_str_walks_chain() {
        let mut ctx = Context::new();
        ctx.insert(
            "incident_classification".into(),
            json!({"severity": "P1"}),
        );
        assert_eq!(context_str(&ctx, "incident_classification", "severity", "P2"), "P1");
        assert_eq!(context_str(&ctx, "incident_classification", "category", "other"), "other");
        assert_eq!(context_str(&ctx, "missing_agent", "severity", "P2"), "P2");
    }

    #[test]
    fn test_object_tolerates_non_object() {
        assert!(object(json!(42)).is_empty());
        assert_eq!(object(json!({"a": 1}))["a"], 1);
    }

    #[test]
    fn test_context_block_empty_marker() {
        assert_eq!(context_block(&Context::new()), "(no prior analysis)");
    }
}
