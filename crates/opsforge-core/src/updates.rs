//! Capped append-only update logs.
//!
//! One log per channel. Appends past capacity drop the oldest entry, so a
//! long-running process keeps a bounded, recent window instead of an
//! unbounded audit trail.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::Utc;
use uuid::Uuid;

use opsforge_types::update::{UpdateChannel, UpdateEntry};

pub struct UpdateLog {
    channel: UpdateChannel,
    entries: Mutex<VecDeque<UpdateEntry>>,
}

impl UpdateLog {
    pub fn new(channel: UpdateChannel) -> Self {
        Self {
            channel,
            entries: Mutex::new(VecDeque::with_capacity(channel.capacity())),
        }
    }

    pub fn channel(&self) -> UpdateChannel {
        self.channel
    }

    /// Append an entry, evicting the oldest when at capacity.
    pub fn push(&self, author: impl Into<String>, message: impl Into<String>, tags: Vec<String>) -> UpdateEntry {
        let entry = UpdateEntry {
            id: Uuid::now_v7(),
            channel: self.channel,
            author: author.into(),
            message: message.into(),
            tags,
            created_at: Utc::now(),
        };
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if entries.len() == self.channel.capacity() {
            entries.pop_front();
        }
        entries.push_back(entry.clone());
        entry
    }

    /// Newest-first slice of the log, capped at `limit`.
    pub fn recent(&self, limit: usize) -> Vec<UpdateEntry> {
        let entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.iter().rev().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        match self.entries.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_recent_order() {
        let log = UpdateLog::new(UpdateChannel::Dev);
        log.push("alice", "first", vec![]);
        log.push("bob", "second", vec!["deploy".into()]);

        let recent = log.recent(10);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].message, "second");
        assert_eq!(recent[1].message, "first");
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let log = UpdateLog::new(UpdateChannel::Dev);
        for i in 0..60 {
            log.push("bot", format!("update {i}"), vec![]);
        }

        assert_eq!(log.len(), UpdateChannel::Dev.capacity());
        let recent = log.recent(100);
        assert_eq!(recent.first().unwrap().message, "update 59");
        assert_eq!(recent.last().unwrap().message, "update 10");
    }

    #[test]
    fn test_channel_capacities_differ() {
        assert_eq!(UpdateChannel::Dev.capacity(), 50);
        assert_eq!(UpdateChannel::Automation.capacity(), 100);
    }
}
