//! LLM gateway backends.

pub mod bedrock;
