//! Declarative agent specs and the shared execution path.
//!
//! An agent is one prompt, one gateway call, one fallback table. The
//! domain-specific parts (prompt builder, fallback analysis, derivations)
//! are plain function pointers in [`AgentSpec`], supplied as data by each
//! phase plan; `run_agent` is the single execution path all of them share.

pub mod confidence;

use std::time::Instant;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{Instrument, debug, info_span, warn};

use opsforge_types::agent::AgentResult;
use opsforge_types::llm::InvokeOptions;
use opsforge_types::request::AnalysisRequest;

use crate::gateway::{BoxGateway, invoke_validated};

/// Accumulated prior-phase output, keyed by each agent's `context_key`.
pub type Context = Map<String, Value>;

/// Declarative description of one agent. All behavior is function
/// pointers, so a spec is `Copy` and moves freely into spawned tasks.
#[derive(Clone, Copy)]
pub struct AgentSpec {
    /// Result key in the outcome map (e.g. "root_cause").
    pub key: &'static str,
    /// Display name (e.g. "Root Cause Analysis").
    pub name: &'static str,
    /// Context key this agent's analysis is merged under
    /// (e.g. "root_cause_analysis").
    pub context_key: &'static str,
    /// Top-level keys a usable reply must contain; also drive the
    /// confidence completeness bonus.
    pub key_fields: &'static [&'static str],
    /// Build the domain prompt from the request and accumulated context.
    pub prompt: fn(&AnalysisRequest, &Context) -> String,
    /// Curated analysis substituted when the gateway fails or returns
    /// nothing usable. Also seeds per-field defaults under a live reply.
    pub fallback: fn(&AnalysisRequest) -> Map<String, Value>,
    /// Deterministic reasoning lines derived from the final analysis.
    pub reasoning: fn(&Map<String, Value>) -> Vec<String>,
    /// Deterministic recommendations derived from the final analysis.
    pub recommendations: fn(&Map<String, Value>) -> Vec<String>,
}

impl std::fmt::Debug for AgentSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentSpec")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("context_key", &self.context_key)
            .finish_non_exhaustive()
    }
}

/// Execute one agent: build the prompt, call the gateway (with the single
/// correction retry), populate the analysis from the reply or the fallback
/// table, and derive reasoning/recommendations/confidence.
///
/// Never returns an error: every failure path degrades to the fallback
/// analysis with `degraded = true` and a recorded `fallback_reason`.
pub async fn run_agent(
    gateway: &BoxGateway,
    spec: &AgentSpec,
    request: &AnalysisRequest,
    context: &Context,
    options: &InvokeOptions,
) -> AgentResult {
    let start = Instant::now();
    let prompt = (spec.prompt)(request, context);

    // The fallback table doubles as the per-field default layer: a live
    // reply is overlaid on top of it, so missing sub-keys keep curated
    // values instead of disappearing.
    let mut analysis = (spec.fallback)(request);
    let mut degraded = true;
    let mut fallback_reason = None;

    let span = info_span!(
        "gen_ai.complete",
        gen_ai.system = gateway.name(),
        gen_ai.operation.name = spec.key,
        gen_ai.request.max_tokens = options.max_tokens,
        gen_ai.request.temperature = options.temperature,
    );

    match invoke_validated(gateway, &prompt, options, spec.key_fields)
        .instrument(span)
        .await
    {
        Ok(reply) if reply.has_data() => {
            for (key, value) in reply.data.unwrap_or_default() {
                analysis.insert(key, value);
            }
            degraded = false;
            debug!(agent = spec.key, model = %reply.model, "live analysis");
        }
        Ok(reply) => {
            warn!(agent = spec.key, raw_len = reply.raw.len(), "reply had no parseable JSON, using fallback");
            fallback_reason = Some("model reply contained no parseable JSON object".to_string());
        }
        Err(err) => {
            warn!(agent = spec.key, error = %err, "gateway call failed, using fallback");
            fallback_reason = Some(err.to_string());
        }
    }

    let execution_time_ms = start.elapsed().as_millis() as u64;
    let reasoning = (spec.reasoning)(&analysis);
    let recommendations = (spec.recommendations)(&analysis);
    let confidence = confidence::score(&analysis, spec.key_fields, degraded, execution_time_ms);

    AgentResult {
        agent_name: spec.name.to_string(),
        analysis,
        confidence,
        reasoning,
        recommendations,
        degraded,
        fallback_reason,
        timestamp: Utc::now(),
        execution_time_ms,
    }
}

/// Read a string field out of an analysis map, for derivation helpers.
pub fn str_field<'a>(analysis: &'a Map<String, Value>, key: &str) -> &'a str {
    analysis.get(key).and_then(Value::as_str).unwrap_or("unknown")
}
