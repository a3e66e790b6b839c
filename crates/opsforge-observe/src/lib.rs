//! Observability for Opsforge: tracing subscriber setup. LLM calls are
//! instrumented with `gen_ai.*` span fields at the call sites in core.

pub mod tracing_setup;
