//! Typed analysis requests, one variant per domain.
//!
//! The HTTP boundary validates free-form JSON into these variants, so the
//! prompt builders read typed fields instead of chasing `.get(..)` chains
//! through an open dict. Each variant still carries an `extra` map for
//! pass-through fields the prompts may mention verbatim.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Analysis domain, one per phase plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Incident,
    Sql,
    Nosql,
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Incident => write!(f, "incident"),
            Domain::Sql => write!(f, "sql"),
            Domain::Nosql => write!(f, "nosql"),
        }
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "incident" => Ok(Domain::Incident),
            "sql" => Ok(Domain::Sql),
            "nosql" => Ok(Domain::Nosql),
            other => Err(format!("unknown analysis domain: '{other}'")),
        }
    }
}

/// Request for a SQL database provisioning analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqlProvisioningRequest {
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub application: String,
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default)]
    pub workload_type: String,
    #[serde(default)]
    pub expected_qps: u64,
    #[serde(default)]
    pub data_size_gb: u64,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for SqlProvisioningRequest {
    fn default() -> Self {
        Self {
            team: String::new(),
            application: String::new(),
            environment: default_environment(),
            workload_type: String::new(),
            expected_qps: 0,
            data_size_gb: 0,
            requirements: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Request for a NoSQL table provisioning analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoSqlProvisioningRequest {
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub application: String,
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default)]
    pub access_patterns: Vec<String>,
    #[serde(default)]
    pub expected_rps: u64,
    #[serde(default)]
    pub item_size_kb: u64,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for NoSqlProvisioningRequest {
    fn default() -> Self {
        Self {
            team: String::new(),
            application: String::new(),
            environment: default_environment(),
            access_patterns: Vec::new(),
            expected_rps: 0,
            item_size_kb: 0,
            requirements: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Reported metrics attached to an incident.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncidentMetrics {
    #[serde(default)]
    pub affected_users: u64,
    #[serde(default)]
    pub error_rate: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Request for an incident-response analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncidentRequest {
    #[serde(default)]
    pub service: String,
    /// Reporter-supplied severity hint. The detection agent classifies the
    /// authoritative severity; this field only steers the prompt.
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub metrics: IncidentMetrics,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_environment() -> String {
    "production".to_string()
}

/// Tagged request, validated at the HTTP boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", rename_all = "snake_case")]
pub enum AnalysisRequest {
    Sql(SqlProvisioningRequest),
    Nosql(NoSqlProvisioningRequest),
    Incident(IncidentRequest),
}

impl AnalysisRequest {
    pub fn domain(&self) -> Domain {
        match self {
            AnalysisRequest::Sql(_) => Domain::Sql,
            AnalysisRequest::Nosql(_) => Domain::Nosql,
            AnalysisRequest::Incident(_) => Domain::Incident,
        }
    }

    pub fn as_sql(&self) -> Option<&SqlProvisioningRequest> {
        match self {
            AnalysisRequest::Sql(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_nosql(&self) -> Option<&NoSqlProvisioningRequest> {
        match self {
            AnalysisRequest::Nosql(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_incident(&self) -> Option<&IncidentRequest> {
        match self {
            AnalysisRequest::Incident(r) => Some(r),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_roundtrip() {
        for d in [Domain::Incident, Domain::Sql, Domain::Nosql] {
            let s = d.to_string();
            let parsed: Domain = s.parse().unwrap();
            assert_eq!(d, parsed);
        }
    }

    #[test]
    fn test_domain_unknown() {
        assert!("blockchain".parse::<Domain>().is_err());
    }

    #[test]
    fn test_incident_request_defaults() {
        let req: IncidentRequest = serde_json::from_str(
            r#"{"service": "checkout-api", "description": "elevated 5xx rate"}"#,
        )
        .unwrap();
        assert_eq!(req.service, "checkout-api");
        assert!(req.severity.is_empty());
        assert_eq!(req.metrics.affected_users, 0);
    }

    #[test]
    fn test_sql_request_environment_default() {
        let req: SqlProvisioningRequest =
            serde_json::from_str(r#"{"team": "payments", "application": "ledger"}"#).unwrap();
        assert_eq!(req.environment, "production");
    }

    #[test]
    fn test_extra_fields_pass_through() {
        let req: IncidentRequest = serde_json::from_str(
            r#"{"service": "api", "description": "down", "region": "us-east-1"}"#,
        )
        .unwrap();
        assert_eq!(req.extra["region"], "us-east-1");
    }

    #[test]
    fn test_request_domain_tag() {
        let req = AnalysisRequest::Incident(IncidentRequest::default());
        assert_eq!(req.domain(), Domain::Incident);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["domain"], "incident");
    }
}
