//! Counting mock gateway shared by the crate's test modules.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use opsforge_types::llm::{GatewayError, GatewayReply, InvokeOptions};

use super::LlmGateway;

/// Deterministic gateway double with an invocation counter.
pub(crate) struct MockGateway {
    reply: Option<serde_json::Value>,
    fail_invoke: bool,
    has_credentials: bool,
    calls: Arc<AtomicUsize>,
}

impl MockGateway {
    /// Succeeds every invoke with the given JSON object.
    pub(crate) fn replying(reply: serde_json::Value) -> Self {
        Self {
            reply: Some(reply),
            fail_invoke: false,
            has_credentials: true,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Probe succeeds, every invoke returns a transport error.
    pub(crate) fn failing() -> Self {
        Self {
            reply: None,
            fail_invoke: true,
            has_credentials: true,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Probe itself fails: the no-credentials configuration.
    pub(crate) fn without_credentials() -> Self {
        Self {
            reply: None,
            fail_invoke: true,
            has_credentials: false,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared invoke counter, for call-count assertions.
    pub(crate) fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

impl LlmGateway for MockGateway {
    fn name(&self) -> &str {
        "mock"
    }

    fn probe(&self) -> Result<(), GatewayError> {
        if self.has_credentials {
            Ok(())
        } else {
            Err(GatewayError::MissingCredentials)
        }
    }

    async fn invoke(
        &self,
        _prompt: &str,
        _options: &InvokeOptions,
    ) -> Result<GatewayReply, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_invoke {
            return Err(GatewayError::Transport("mock transport failure".into()));
        }
        let value = self.reply.clone().unwrap_or(serde_json::Value::Null);
        let raw = value.to_string();
        let data = match value {
            serde_json::Value::Object(map) => Some(map),
            _ => None,
        };
        Ok(GatewayReply {
            data,
            raw,
            model: "mock-model".into(),
            latency_ms: 5,
        })
    }
}
