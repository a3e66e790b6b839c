//! Core business logic for Opsforge.
//!
//! - [`gateway`] -- the LLM gateway trait, JSON extraction, and the
//!   validated-invoke correction retry.
//! - [`agent`] -- declarative agent specs, the shared execution path, and
//!   confidence scoring.
//! - [`orchestrator`] -- the generic phase orchestrator plus the shipped
//!   domain plans (incident, sql, nosql).
//! - [`tasks`] -- the task-decomposition workflow engine.
//! - [`session`] -- the session store trait.
//! - [`provision`] -- Terraform rendering for approved recommendations.
//! - [`updates`] -- capped append-only audit logs.

pub mod agent;
pub mod gateway;
pub mod orchestrator;
pub mod provision;
pub mod session;
pub mod tasks;
pub mod updates;
