//! LlmGateway trait definition and the validated-invoke path.
//!
//! `LlmGateway` uses RPITIT for `invoke`; the object-safe [`BoxGateway`]
//! wrapper lives in [`box_gateway`] for callers that need dynamic dispatch
//! (orchestrators, app state, test mocks).

pub mod box_gateway;
pub mod extract;

#[cfg(test)]
pub(crate) mod mock;

use opsforge_types::llm::{GatewayError, GatewayReply, InvokeOptions};

pub use box_gateway::BoxGateway;

/// Trait for LLM gateway backends (Bedrock in production, mocks in tests).
///
/// One prompt, one reply, one attempt: the gateway itself never retries.
/// The bounded correction retry for malformed replies is layered on top in
/// [`invoke_validated`].
pub trait LlmGateway: Send + Sync {
    /// Human-readable backend name (e.g. "bedrock").
    fn name(&self) -> &str;

    /// Cheap upfront credential check. Orchestrators call this once before
    /// any phase runs; a failure here means zero agent invocations.
    fn probe(&self) -> Result<(), GatewayError>;

    /// Send one prompt and receive the reply.
    fn invoke(
        &self,
        prompt: &str,
        options: &InvokeOptions,
    ) -> impl std::future::Future<Output = Result<GatewayReply, GatewayError>> + Send;
}

/// Invoke the gateway and validate the reply against a set of required
/// top-level keys. When the first reply is missing keys, send exactly one
/// correction prompt; the second reply is returned as-is (callers degrade
/// on an empty or still-incomplete reply, they do not error).
pub async fn invoke_validated(
    gateway: &BoxGateway,
    prompt: &str,
    options: &InvokeOptions,
    required_keys: &[&str],
) -> Result<GatewayReply, GatewayError> {
    let reply = gateway.invoke(prompt, options).await?;

    let missing = match &reply.data {
        Some(data) => extract::missing_keys(data, required_keys),
        None => required_keys.to_vec(),
    };
    if missing.is_empty() {
        return Ok(reply);
    }

    tracing::debug!(
        gateway = gateway.name(),
        missing = ?missing,
        "reply missing required keys, sending correction prompt"
    );

    let correction = build_correction_prompt(prompt, &reply.raw, required_keys);
    gateway.invoke(&correction, options).await
}

/// Correction prompt for the single validation retry.
fn build_correction_prompt(original: &str, previous_raw: &str, required_keys: &[&str]) -> String {
    let keys = required_keys.join("\", \"");
    format!(
        "Your previous reply could not be parsed as a complete JSON object.\n\
         Previous reply:\n{previous_raw}\n\n\
         Original request:\n{original}\n\n\
         Respond again with ONLY a JSON object containing at least the keys \
         \"{keys}\". No prose before or after the object."
    )
}

#[cfg(test)]
mod tests {
    use super::mock::MockGateway;
    use super::*;

    #[tokio::test]
    async fn test_invoke_validated_accepts_complete_reply() {
        let gateway = BoxGateway::new(MockGateway::replying(serde_json::json!({
            "severity": "P1",
            "category": "availability",
        })));
        let reply = invoke_validated(
            &gateway,
            "classify",
            &InvokeOptions::default(),
            &["severity", "category"],
        )
        .await
        .unwrap();
        assert!(reply.has_data());
    }

    #[tokio::test]
    async fn test_invoke_validated_retries_once_on_missing_keys() {
        let gateway_impl = MockGateway::replying(serde_json::json!({"severity": "P1"}));
        let calls = gateway_impl.calls();
        let gateway = BoxGateway::new(gateway_impl);

        let _ = invoke_validated(
            &gateway,
            "classify",
            &InvokeOptions::default(),
            &["severity", "category"],
        )
        .await
        .unwrap();
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invoke_validated_no_retry_when_complete() {
        let gateway_impl = MockGateway::replying(serde_json::json!({"severity": "P1"}));
        let calls = gateway_impl.calls();
        let gateway = BoxGateway::new(gateway_impl);

        let _ = invoke_validated(&gateway, "classify", &InvokeOptions::default(), &["severity"])
            .await
            .unwrap();
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invoke_validated_propagates_transport_error() {
        let gateway = BoxGateway::new(MockGateway::failing());
        let err = invoke_validated(&gateway, "classify", &InvokeOptions::default(), &["severity"])
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)));
    }

    #[test]
    fn test_correction_prompt_names_keys() {
        let prompt = build_correction_prompt("orig", "not json", &["severity", "category"]);
        assert!(prompt.contains("\"severity\", \"category\""));
        assert!(prompt.contains("not json"));
    }
}
