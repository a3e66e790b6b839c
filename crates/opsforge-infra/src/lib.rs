//! Infrastructure adapters for Opsforge.
//!
//! Concrete implementations of the core traits: the AWS Bedrock gateway,
//! the in-memory session store, and configuration loading.

pub mod config;
pub mod llm;
pub mod session;
