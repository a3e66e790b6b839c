//! Shared domain types for Opsforge.
//!
//! This crate has no business logic: it holds the serde data models and
//! error enums shared by `opsforge-core`, `opsforge-infra`, and
//! `opsforge-api`.

pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod request;
pub mod session;
pub mod task;
pub mod update;
