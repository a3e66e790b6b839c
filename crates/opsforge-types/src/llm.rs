//! Gateway request/response types for Opsforge.
//!
//! The gateway is a deliberately narrow surface: one prompt in, one reply
//! out. Replies carry both the raw model text and the best-effort JSON
//! object extracted from it; an absent `data` is a degraded reply, not an
//! error.

use serde::{Deserialize, Serialize};

/// Sampling options for a single gateway invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeOptions {
    /// Maximum number of output tokens to request.
    pub max_tokens: u32,
    /// Sampling temperature. Analysis prompts run cool (0.2 default).
    pub temperature: f64,
}

impl Default for InvokeOptions {
    fn default() -> Self {
        Self {
            max_tokens: 1500,
            temperature: 0.2,
        }
    }
}

/// Reply from one gateway invocation.
///
/// `data` is the JSON object found between the first `{` and the last `}`
/// of `raw`, or `None` when no parseable object is present. Callers must
/// treat `None` as "degrade to fallback", never as a transport failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayReply {
    pub data: Option<serde_json::Map<String, serde_json::Value>>,
    pub raw: String,
    /// Model identifier the backend actually used.
    pub model: String,
    pub latency_ms: u64,
}

impl GatewayReply {
    /// Whether the reply carries a usable (non-empty) JSON object.
    pub fn has_data(&self) -> bool {
        self.data.as_ref().is_some_and(|m| !m.is_empty())
    }
}

/// Errors from gateway operations.
///
/// No variant is retried by the gateway itself; the single correction
/// retry for malformed JSON lives one layer up, in `invoke_validated`.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("gateway credentials missing or misconfigured")]
    MissingCredentials,

    #[error("gateway HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("gateway rate limited")]
    RateLimited,

    #[error("gateway overloaded: {0}")]
    Overloaded(String),

    #[error("gateway transport error: {0}")]
    Transport(String),

    #[error("gateway deserialization error: {0}")]
    Deserialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoke_options_default() {
        let opts = InvokeOptions::default();
        assert_eq!(opts.max_tokens, 1500);
        assert!((opts.temperature - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reply_has_data() {
        let mut map = serde_json::Map::new();
        map.insert("severity".into(), serde_json::json!("P1"));
        let reply = GatewayReply {
            data: Some(map),
            raw: "{\"severity\":\"P1\"}".into(),
            model: "claude-sonnet".into(),
            latency_ms: 12,
        };
        assert!(reply.has_data());
    }

    #[test]
    fn test_reply_empty_object_is_not_data() {
        let reply = GatewayReply {
            data: Some(serde_json::Map::new()),
            raw: "{}".into(),
            model: "claude-sonnet".into(),
            latency_ms: 12,
        };
        assert!(!reply.has_data());
    }

    #[test]
    fn test_gateway_error_display() {
        let err = GatewayError::Http {
            status: 503,
            message: "upstream unavailable".into(),
        };
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("upstream unavailable"));
    }
}
