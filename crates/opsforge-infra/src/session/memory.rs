//! In-memory session store.
//!
//! A capacity-capped `DashMap`. Inserting past capacity evicts the oldest
//! session by creation time, so a long-running process holds a bounded
//! window of recent sessions. Nothing survives a restart.

use dashmap::DashMap;
use uuid::Uuid;

use opsforge_core::session::SessionStore;
use opsforge_types::error::SessionError;
use opsforge_types::request::Domain;
use opsforge_types::session::SessionRecord;

pub struct InMemorySessionStore {
    sessions: DashMap<Uuid, SessionRecord>,
    max_sessions: usize,
}

impl InMemorySessionStore {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            max_sessions: max_sessions.max(1),
        }
    }

    fn evict_oldest(&self) {
        let oldest = self
            .sessions
            .iter()
            .min_by_key(|r| r.created_at)
            .map(|r| r.id);
        if let Some(id) = oldest {
            tracing::debug!(session_id = %id, "evicting oldest session at capacity");
            self.sessions.remove(&id);
        }
    }
}

impl SessionStore for InMemorySessionStore {
    fn create(&self, record: SessionRecord) {
        if self.sessions.len() >= self.max_sessions {
            self.evict_oldest();
        }
        self.sessions.insert(record.id, record);
    }

    fn get(&self, id: Uuid) -> Result<SessionRecord, SessionError> {
        self.sessions
            .get(&id)
            .map(|r| r.clone())
            .ok_or(SessionError::NotFound)
    }

    fn update(
        &self,
        id: Uuid,
        mutate: &mut dyn FnMut(&mut SessionRecord),
    ) -> Result<(), SessionError> {
        let mut entry = self.sessions.get_mut(&id).ok_or(SessionError::NotFound)?;
        mutate(&mut entry);
        Ok(())
    }

    fn list(&self, domain: Domain, limit: usize) -> Vec<SessionRecord> {
        let mut records: Vec<SessionRecord> = self
            .sessions
            .iter()
            .filter(|r| r.domain == domain)
            .map(|r| r.clone())
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records.truncate(limit);
        records
    }

    fn len(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsforge_types::session::SessionStatus;
    use serde_json::json;

    fn record(domain: Domain) -> SessionRecord {
        SessionRecord::new(Uuid::now_v7(), domain, json!({"team": "payments"}))
    }

    #[test]
    fn test_create_and_get_roundtrip() {
        let store = InMemorySessionStore::new(10);
        let session = record(Domain::Sql);
        let id = session.id;
        store.create(session);

        let fetched = store.get(id).unwrap();
        assert_eq!(fetched.id, id);
        assert_eq!(fetched.status, SessionStatus::Analyzing);
        assert_eq!(fetched.request["team"], "payments");
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let store = InMemorySessionStore::new(10);
        assert!(matches!(
            store.get(Uuid::now_v7()),
            Err(SessionError::NotFound)
        ));
    }

    #[test]
    fn test_update_mutates_in_place() {
        let store = InMemorySessionStore::new(10);
        let session = record(Domain::Incident);
        let id = session.id;
        store.create(session);

        store
            .update(id, &mut |s| s.status = SessionStatus::Completed)
            .unwrap();
        assert_eq!(store.get(id).unwrap().status, SessionStatus::Completed);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let store = InMemorySessionStore::new(3);
        let first = record(Domain::Sql);
        let first_id = first.id;
        store.create(first);
        for _ in 0..3 {
            store.create(record(Domain::Sql));
        }

        assert_eq!(store.len(), 3);
        assert!(matches!(store.get(first_id), Err(SessionError::NotFound)));
    }

    #[test]
    fn test_list_filters_domain_newest_first() {
        let store = InMemorySessionStore::new(10);
        for _ in 0..3 {
            store.create(record(Domain::Sql));
        }
        store.create(record(Domain::Incident));
        let newest = record(Domain::Sql);
        let newest_id = newest.id;
        store.create(newest);

        let listed = store.list(Domain::Sql, 10);
        assert_eq!(listed.len(), 4);
        assert_eq!(listed[0].id, newest_id);

        assert_eq!(store.list(Domain::Sql, 2).len(), 2);
        assert_eq!(store.list(Domain::Incident, 10).len(), 1);
    }
}
