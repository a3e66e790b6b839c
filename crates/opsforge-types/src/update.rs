//! Audit update entries: lightweight append-only log records.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which capped log an update lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateChannel {
    /// Developer-posted status notes (capacity 50).
    Dev,
    /// Automation-posted notes, e.g. pipeline callbacks (capacity 100).
    Automation,
}

impl UpdateChannel {
    /// Maximum retained entries; the oldest entry is dropped past this.
    pub fn capacity(&self) -> usize {
        match self {
            UpdateChannel::Dev => 50,
            UpdateChannel::Automation => 100,
        }
    }
}

impl fmt::Display for UpdateChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateChannel::Dev => write!(f, "dev"),
            UpdateChannel::Automation => write!(f, "automation"),
        }
    }
}

impl FromStr for UpdateChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(UpdateChannel::Dev),
            "automation" => Ok(UpdateChannel::Automation),
            other => Err(format!("unknown update channel: '{other}'")),
        }
    }
}

/// One audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateEntry {
    pub id: Uuid,
    pub channel: UpdateChannel,
    pub author: String,
    pub message: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_capacities() {
        assert_eq!(UpdateChannel::Dev.capacity(), 50);
        assert_eq!(UpdateChannel::Automation.capacity(), 100);
    }

    #[test]
    fn test_channel_roundtrip() {
        for ch in [UpdateChannel::Dev, UpdateChannel::Automation] {
            let parsed: UpdateChannel = ch.to_string().parse().unwrap();
            assert_eq!(ch, parsed);
        }
    }
}
