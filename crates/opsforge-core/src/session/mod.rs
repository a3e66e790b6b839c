//! Session store abstraction.
//!
//! Sessions are the durable face of an analysis run: the HTTP layer
//! creates one per accepted request, the orchestrator's outcome is folded
//! in on completion, and approval transitions mutate its status. The trait
//! is synchronous since every backend is expected to be an in-process map;
//! an async backend would wrap itself in its own task.

use serde_json::Value;
use uuid::Uuid;

use opsforge_types::error::SessionError;
use opsforge_types::request::Domain;
use opsforge_types::session::{SessionRecord, SessionStatus};

/// Storage backend for analysis sessions.
///
/// `update` takes a closure instead of a patch struct so callers can make
/// read-modify-write transitions without a second lookup, and so the
/// store can run the mutation under its own shard lock.
pub trait SessionStore: Send + Sync {
    /// Insert a new record. Evicts the oldest record first when the store
    /// is at capacity.
    fn create(&self, record: SessionRecord);

    /// Fetch a session by id.
    fn get(&self, id: Uuid) -> Result<SessionRecord, SessionError>;

    /// Mutate a session in place.
    fn update(
        &self,
        id: Uuid,
        mutate: &mut dyn FnMut(&mut SessionRecord),
    ) -> Result<(), SessionError>;

    /// Most recent sessions for a domain, newest first, capped at `limit`.
    fn list(&self, domain: Domain, limit: usize) -> Vec<SessionRecord>;

    /// Number of live sessions.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Transition a completed session into `Provisioning` and hand back the
/// recommendation the caller will render. Shared by every approval
/// endpoint so the status rules live in one place.
pub fn approve_session(
    store: &dyn SessionStore,
    id: Uuid,
    approved: bool,
) -> Result<(SessionStatus, Option<Value>), SessionError> {
    let session = store.get(id)?;
    if session.status != SessionStatus::Completed {
        return Err(SessionError::NotCompleted(session.status.to_string()));
    }

    let next = if approved {
        SessionStatus::Provisioning
    } else {
        SessionStatus::Rejected
    };

    let recommendation = if approved {
        match session.recommendation {
            Some(rec) => Some(rec),
            None => return Err(SessionError::NotProvisionable(session.domain.to_string())),
        }
    } else {
        None
    };

    store.update(id, &mut |record| {
        record.status = next;
        record.completed_at = Some(chrono::Utc::now());
    })?;

    Ok((next, recommendation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashmap::DashMap;
    use serde_json::json;

    // Minimal uncapped store for exercising the approval transition.
    #[derive(Default)]
    struct MapStore {
        sessions: DashMap<Uuid, SessionRecord>,
    }

    impl SessionStore for MapStore {
        fn create(&self, record: SessionRecord) {
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
            let mut all: Vec<SessionRecord> = self
                .sessions
                .iter()
                .filter(|r| r.domain == domain)
                .map(|r| r.clone())
                .collect();
            all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            all.truncate(limit);
            all
        }

        fn len(&self) -> usize {
            self.sessions.len()
        }
    }

    fn completed_session(store: &MapStore) -> Uuid {
        let id = Uuid::now_v7();
        let mut record = SessionRecord::new(id, Domain::Sql, json!({"team": "payments"}));
        record.status = SessionStatus::Completed;
        record.recommendation = Some(json!({"engine": "postgres"}));
        store.create(record);
        id
    }

    #[test]
    fn test_approve_moves_to_provisioning() {
        let store = MapStore::default();
        let id = completed_session(&store);

        let (status, rec) = approve_session(&store, id, true).unwrap();
        assert_eq!(status, SessionStatus::Provisioning);
        assert_eq!(rec.unwrap()["engine"], "postgres");
        assert_eq!(store.get(id).unwrap().status, SessionStatus::Provisioning);
    }

    #[test]
    fn test_reject_moves_to_rejected() {
        let store = MapStore::default();
        let id = completed_session(&store);

        let (status, rec) = approve_session(&store, id, false).unwrap();
        assert_eq!(status, SessionStatus::Rejected);
        assert!(rec.is_none());
    }

    #[test]
    fn test_approve_requires_completed_status() {
        let store = MapStore::default();
        let id = Uuid::now_v7();
        store.create(SessionRecord::new(id, Domain::Sql, json!({})));

        let err = approve_session(&store, id, true).unwrap_err();
        assert!(matches!(err, SessionError::NotCompleted(_)));
    }

    #[test]
    fn test_approve_without_recommendation_is_rejected() {
        let store = MapStore::default();
        let id = Uuid::now_v7();
        let mut record = SessionRecord::new(id, Domain::Incident, json!({}));
        record.status = SessionStatus::Completed;
        store.create(record);

        let err = approve_session(&store, id, true).unwrap_err();
        assert!(matches!(err, SessionError::NotProvisionable(_)));
        assert!(err.to_string().contains("incident"));
    }

    #[test]
    fn test_missing_session_is_not_found() {
        let store = MapStore::default();
        let err = approve_session(&store, Uuid::now_v7(), true).unwrap_err();
        assert!(matches!(err, SessionError::NotFound));
    }
}
