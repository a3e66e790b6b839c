//! BoxGateway -- object-safe dynamic dispatch wrapper for LlmGateway.
//!
//! Three-step boxing pattern:
//! 1. Define an object-safe `GatewayDyn` trait with boxed futures
//! 2. Blanket-impl `GatewayDyn` for all `T: LlmGateway`
//! 3. `BoxGateway` wraps `Box<dyn GatewayDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use opsforge_types::llm::{GatewayError, GatewayReply, InvokeOptions};

use super::LlmGateway;

/// Object-safe version of [`LlmGateway`] with boxed futures.
///
/// Exists solely to enable dynamic dispatch; a blanket implementation is
/// provided for all types implementing `LlmGateway`.
pub trait GatewayDyn: Send + Sync {
    fn name(&self) -> &str;

    fn probe(&self) -> Result<(), GatewayError>;

    fn invoke_boxed<'a>(
        &'a self,
        prompt: &'a str,
        options: &'a InvokeOptions,
    ) -> Pin<Box<dyn Future<Output = Result<GatewayReply, GatewayError>> + Send + 'a>>;
}

impl<T: LlmGateway> GatewayDyn for T {
    fn name(&self) -> &str {
        LlmGateway::name(self)
    }

    fn probe(&self) -> Result<(), GatewayError> {
        LlmGateway::probe(self)
    }

    fn invoke_boxed<'a>(
        &'a self,
        prompt: &'a str,
        options: &'a InvokeOptions,
    ) -> Pin<Box<dyn Future<Output = Result<GatewayReply, GatewayError>> + Send + 'a>> {
        Box::pin(self.invoke(prompt, options))
    }
}

/// Type-erased gateway for runtime backend selection.
///
/// `LlmGateway` uses RPITIT and cannot be a trait object directly;
/// `BoxGateway` provides equivalent methods delegating to the inner
/// `GatewayDyn` trait object.
pub struct BoxGateway {
    inner: Box<dyn GatewayDyn + Send + Sync>,
}

impl BoxGateway {
    /// Wrap a concrete `LlmGateway` in a type-erased box.
    pub fn new<T: LlmGateway + 'static>(gateway: T) -> Self {
        Self {
            inner: Box::new(gateway),
        }
    }

    /// Human-readable backend name.
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Cheap upfront credential check.
    pub fn probe(&self) -> Result<(), GatewayError> {
        self.inner.probe()
    }

    /// Send one prompt and receive the reply.
    pub async fn invoke(
        &self,
        prompt: &str,
        options: &InvokeOptions,
    ) -> Result<GatewayReply, GatewayError> {
        self.inner.invoke_boxed(prompt, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::mock::MockGateway;
    use super::*;

    #[tokio::test]
    async fn test_box_gateway_delegates() {
        let gateway = BoxGateway::new(MockGateway::replying(serde_json::json!({"ok": true})));
        assert_eq!(gateway.name(), "mock");
        assert!(gateway.probe().is_ok());
        let reply = gateway
            .invoke("hello", &InvokeOptions::default())
            .await
            .unwrap();
        assert!(reply.has_data());
    }

    #[tokio::test]
    async fn test_box_gateway_probe_failure() {
        let gateway = BoxGateway::new(MockGateway::without_credentials());
        assert!(matches!(
            gateway.probe(),
            Err(GatewayError::MissingCredentials)
        ));
    }
}
