//! Confidence scoring heuristic.
//!
//! Maps (degraded?, analysis completeness, latency) to a score clamped to
//! [0.70, 0.98]. The score is presentation-layer trust only: nothing is
//! retried or escalated on a low score. Scores are fully deterministic --
//! the source system's hash-seeded jitter served no purpose and is gone.

use serde_json::{Map, Value};

use crate::gateway::extract::is_placeholder;

/// Floor of every score, degraded or not.
pub const MIN_CONFIDENCE: f64 = 0.70;
/// Ceiling of every score.
pub const MAX_CONFIDENCE: f64 = 0.98;

/// Base score when the analysis came from a live model reply.
const LIVE_BASE: f64 = 0.88;
/// Base score when the analysis is the curated fallback.
const DEGRADED_BASE: f64 = 0.75;
/// Maximum bonus for a fully populated set of key fields.
const COMPLETENESS_BONUS: f64 = 0.10;
/// Maximum latency penalty.
const LATENCY_PENALTY: f64 = 0.05;
/// Latency above this starts accruing the penalty.
const LATENCY_THRESHOLD_MS: u64 = 3000;

/// Score one agent's analysis.
pub fn score(
    analysis: &Map<String, Value>,
    key_fields: &[&str],
    degraded: bool,
    execution_time_ms: u64,
) -> f64 {
    let base = if degraded { DEGRADED_BASE } else { LIVE_BASE };

    let completeness = if key_fields.is_empty() {
        1.0
    } else {
        let populated = key_fields
            .iter()
            .filter(|key| analysis.get(**key).is_some_and(|v| !is_placeholder(v)))
            .count();
        populated as f64 / key_fields.len() as f64
    };

    // Linear past the threshold, saturating at one extra threshold-width.
    let penalty = if execution_time_ms > LATENCY_THRESHOLD_MS {
        let over = (execution_time_ms - LATENCY_THRESHOLD_MS) as f64;
        (over / LATENCY_THRESHOLD_MS as f64).min(1.0) * LATENCY_PENALTY
    } else {
        0.0
    };

    (base + completeness * COMPLETENESS_BONUS - penalty).clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}
