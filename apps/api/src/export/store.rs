use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::export::error::ExportError;
use crate::export::session::ExportSession;

/// Live export sessions keyed by id.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, ExportSession>>>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout,
        }
    }

    pub fn insert(&self, session: ExportSession) {
        self.sessions.write().insert(session.id(), session);
    }

    /// Looks a session up and marks it active.
    pub fn get(&self, id: Uuid) -> Result<ExportSession, ExportError> {
        let session = self
            .sessions
            .read()
            .get(&id)
            .cloned()
            .ok_or(ExportError::SessionNotFound(id))?;
        session.touch();
        Ok(session)
    }

    /// Closes the view and forgets the session.
    pub fn remove(&self, id: Uuid) -> Result<(), ExportError> {
        let session = self
            .sessions
            .write()
            .remove(&id)
            .ok_or(ExportError::SessionNotFound(id))?;
        session.hide();
        Ok(())
    }

    /// Drops every session idle since before `now - idle_timeout`, closing
    /// its view first. Returns how many were evicted.
    pub fn evict_idle(&self, now: DateTime<Utc>) -> usize {
        let cutoff = now - self.idle_timeout;
        let evicted: Vec<ExportSession> = {
            let mut sessions = self.sessions.write();
            let stale: Vec<Uuid> = sessions
                .iter()
                .filter(|(_, s)| s.last_activity() < cutoff)
                .map(|(id, _)| *id)
                .collect();
            stale.iter().filter_map(|id| sessions.remove(id)).collect()
        };
        for session in &evicted {
            session.hide();
        }
        if !evicted.is_empty() {
            info!(
                "Evicted {} idle export session(s), {} remaining",
                evicted.len(),
                self.len()
            );
        }
        evicted.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
