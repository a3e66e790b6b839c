//! BedrockGateway -- concrete [`LlmGateway`] for the AWS Bedrock Runtime API.
//!
//! Sends non-streaming `invoke` requests using Bearer token authentication.
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output. A single attempt per call; the
//! correction retry for malformed JSON lives in the core crate.

use std::time::{Duration, Instant};

use secrecy::{ExposeSecret, SecretString};

use opsforge_core::gateway::{LlmGateway, extract::extract_json};
use opsforge_types::config::BedrockConfig;
use opsforge_types::llm::{GatewayError, GatewayReply, InvokeOptions};

use super::types::{BedrockMessage, BedrockRequest, BedrockResponse};

/// AWS Bedrock Claude gateway.
///
/// Construction never fails: a missing API key produces a gateway whose
/// `probe` reports [`GatewayError::MissingCredentials`], which the
/// orchestrators check before running any phase.
pub struct BedrockGateway {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    region: String,
    model_id: String,
}

impl BedrockGateway {
    /// The Anthropic API version for Bedrock.
    const API_VERSION: &'static str = "bedrock-2023-05-31";

    /// Prefix used to identify Bedrock API keys.
    const KEY_PREFIX: &'static str = "bedrock-api-key-";

    /// Create a gateway from configuration.
    ///
    /// If the key starts with `bedrock-api-key-`, the prefix is stripped
    /// and the remainder is used as the Bearer token. The token is a
    /// base64-encoded presigned URL whose embedded credential scope may
    /// name a different region than the configured one; the token's
    /// region wins.
    pub fn new(api_key: Option<SecretString>, config: &BedrockConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        let (api_key, region) = match api_key {
            Some(key) => {
                let raw_key = key.expose_secret().to_string();
                let token = raw_key.strip_prefix(Self::KEY_PREFIX).unwrap_or(&raw_key);
                let region = Self::detect_region_from_token(token)
                    .unwrap_or_else(|| config.region.clone());
                (Some(SecretString::from(token.to_string())), region)
            }
            None => (None, config.region.clone()),
        };

        let model_id = Self::to_bedrock_model_id(&config.model, &region);

        Self {
            client,
            api_key,
            region,
            model_id,
        }
    }

    /// Try to extract the AWS region from a base64-encoded presigned URL
    /// token. The token decodes to a URL containing
    /// `X-Amz-Credential=<access-key>/<date>/<region>/bedrock/aws4_request`.
    fn detect_region_from_token(token: &str) -> Option<String> {
        use base64::Engine;
        let decoded = base64::engine::general_purpose::STANDARD.decode(token).ok()?;
        let text = String::from_utf8(decoded).ok()?;

        let cred_start = text.find("X-Amz-Credential=")?;
        let cred_value = &text[cred_start + "X-Amz-Credential=".len()..];
        let parts: Vec<&str> = cred_value.split('/').collect();
        if parts.len() >= 3 {
            let region = parts[2].split('&').next().unwrap_or(parts[2]);
            tracing::info!(region = %region, "Detected region from Bedrock bearer token");
            Some(region.to_string())
        } else {
            None
        }
    }

    /// Convert a standard Claude model name to a Bedrock inference
    /// profile ID.
    ///
    /// Cross-region inference profiles use a region shorthand prefix
    /// before the model ID; the shorthand is the first segment of the
    /// full AWS region. A model already containing a `.` is treated as
    /// fully qualified and returned as-is.
    ///
    /// ```text
    /// ("claude-sonnet-4-20250514", "eu-west-1") -> "eu.anthropic.claude-sonnet-4-20250514-v1:0"
    /// ("us.anthropic.claude-sonnet-4-20250514-v1:0", _) -> unchanged
    /// ```
    pub fn to_bedrock_model_id(model: &str, region: &str) -> String {
        if model.contains('.') {
            model.to_string()
        } else {
            let region_prefix = region.split('-').next().unwrap_or("us");
            format!("{region_prefix}.anthropic.{model}-v1:0")
        }
    }

    /// Full Bedrock Runtime URL for the invoke action.
    fn url(&self) -> String {
        format!(
            "https://bedrock-runtime.{}.amazonaws.com/model/{}/invoke",
            self.region, self.model_id
        )
    }
}

// BedrockGateway intentionally does NOT derive Debug to prevent
// accidental exposure of the bearer token.

impl LlmGateway for BedrockGateway {
    fn name(&self) -> &str {
        "bedrock"
    }

    fn probe(&self) -> Result<(), GatewayError> {
        if self.api_key.is_none() {
            return Err(GatewayError::MissingCredentials);
        }
        Ok(())
    }

    async fn invoke(
        &self,
        prompt: &str,
        options: &InvokeOptions,
    ) -> Result<GatewayReply, GatewayError> {
        let api_key = self.api_key.as_ref().ok_or(GatewayError::MissingCredentials)?;

        let body = BedrockRequest {
            anthropic_version: Self::API_VERSION.to_string(),
            max_tokens: options.max_tokens,
            messages: vec![BedrockMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: options.temperature,
        };
        let url = self.url();

        tracing::debug!(url = %url, model_id = %self.model_id, region = %self.region, "Bedrock invoke request");

        let start = Instant::now();
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key.expose_secret()))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %error_body, url = %url, "Bedrock API error response");
            return Err(match status.as_u16() {
                401 | 403 => GatewayError::Http {
                    status: status.as_u16(),
                    message: format!("Bedrock authentication failed: {error_body}"),
                },
                429 => GatewayError::RateLimited,
                529 => GatewayError::Overloaded(error_body),
                s => GatewayError::Http {
                    status: s,
                    message: error_body,
                },
            });
        }

        let bedrock_resp: BedrockResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Deserialization(format!("failed to parse response: {e}")))?;

        let raw = bedrock_resp.joined_text();
        let data = extract_json(&raw);

        Ok(GatewayReply {
            data,
            raw,
            model: bedrock_resp.model,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}
