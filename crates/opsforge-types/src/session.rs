//! Session records: the in-memory trace of one orchestrator invocation.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agent::AgentResult;
use crate::request::Domain;

/// Lifecycle status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Analyzing,
    Completed,
    Failed,
    Provisioning,
    Rejected,
    ManualOverride,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Analyzing => write!(f, "analyzing"),
            SessionStatus::Completed => write!(f, "completed"),
            SessionStatus::Failed => write!(f, "failed"),
            SessionStatus::Provisioning => write!(f, "provisioning"),
            SessionStatus::Rejected => write!(f, "rejected"),
            SessionStatus::ManualOverride => write!(f, "manual_override"),
        }
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "analyzing" => Ok(SessionStatus::Analyzing),
            "completed" => Ok(SessionStatus::Completed),
            "failed" => Ok(SessionStatus::Failed),
            "provisioning" => Ok(SessionStatus::Provisioning),
            "rejected" => Ok(SessionStatus::Rejected),
            "manual_override" => Ok(SessionStatus::ManualOverride),
            other => Err(format!("invalid session status: '{other}'")),
        }
    }
}

/// One orchestrator invocation, keyed by a generated v7 UUID.
///
/// Lives only for the process lifetime; the store evicts the oldest record
/// past its capacity bound rather than growing without limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: Uuid,
    pub domain: Domain,
    /// The request as received, for later inspection.
    pub request: serde_json::Value,
    pub status: SessionStatus,
    pub agent_results: BTreeMap<String, AgentResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<serde_json::Value>,
    pub degraded: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl SessionRecord {
    /// Fresh record in `Analyzing` state.
    pub fn new(id: Uuid, domain: Domain, request: serde_json::Value) -> Self {
        Self {
            id,
            domain,
            request,
            status: SessionStatus::Analyzing,
            agent_results: BTreeMap::new(),
            recommendation: None,
            degraded: false,
            created_at: Utc::now(),
            completed_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in [
            SessionStatus::Analyzing,
            SessionStatus::Completed,
            SessionStatus::Failed,
            SessionStatus::Provisioning,
            SessionStatus::Rejected,
            SessionStatus::ManualOverride,
        ] {
            let s = status.to_string();
            let parsed: SessionStatus = s.parse().unwrap();
            assert_eq!(status, parsed);
        }
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&SessionStatus::ManualOverride).unwrap();
        assert_eq!(json, "\"manual_override\"");
    }

    #[test]
    fn test_new_record_is_analyzing() {
        let record = SessionRecord::new(
            Uuid::now_v7(),
            Domain::Sql,
            serde_json::json!({"team": "payments"}),
        );
        assert_eq!(record.status, SessionStatus::Analyzing);
        assert!(record.agent_results.is_empty());
        assert!(record.completed_at.is_none());
    }
}
