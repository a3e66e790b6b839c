//! AWS Bedrock Claude gateway.

mod client;
mod types;

pub use client::BedrockGateway;
