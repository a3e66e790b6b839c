//! AWS Bedrock request/response types.
//!
//! Bedrock speaks the Claude Messages API JSON format with two twists:
//! the `model` field moves into the URL path and an `anthropic_version`
//! field is required in the body.

use serde::{Deserialize, Serialize};

/// Request body for the Bedrock Runtime `invoke` action.
#[derive(Debug, Clone, Serialize)]
pub struct BedrockRequest {
    pub anthropic_version: String,
    pub max_tokens: u32,
    pub messages: Vec<BedrockMessage>,
    pub temperature: f64,
}

/// A single message in the conversation.
#[derive(Debug, Clone, Serialize)]
pub struct BedrockMessage {
    pub role: String,
    pub content: String,
}

/// Non-streaming response body.
#[derive(Debug, Clone, Deserialize)]
pub struct BedrockResponse {
    pub model: String,
    pub content: Vec<BedrockContentBlock>,
}

/// One content block of the response. Only text blocks carry analysis
/// output; anything else is ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BedrockContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

impl BedrockResponse {
    /// Concatenate the text blocks into the raw reply string.
    pub fn joined_text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                BedrockContentBlock::Text { text } => Some(text.as_str()),
                BedrockContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }
}
