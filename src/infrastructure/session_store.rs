use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::info;
use uuid::Uuid;

use crate::domain::error::{AppError, Result};
use crate::domain::session::SessionContext;

struct SessionEntry {
    context: SessionContext,
    last_seen: Instant,
}

/// In-memory dashboard sessions keyed by id.
///
/// Callers copy what they need out with [`SessionStore::read`], compute
/// without holding the lock, then write back with [`SessionStore::update`].
/// Sessions untouched for longer than the idle TTL are dropped.
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, SessionEntry>>,
    idle_ttl: Duration,
}

impl SessionStore {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_ttl,
        }
    }

    pub fn idle_ttl(&self) -> Duration {
        self.idle_ttl
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Uuid, SessionEntry>>> {
        self.sessions
            .lock()
            .map_err(|_| AppError::Internal("session store lock poisoned".to_string()))
    }

    fn is_idle(&self, entry: &SessionEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.last_seen) > self.idle_ttl
    }

    /// Live entry for `id` with its idle clock reset. Expired entries are removed.
    fn touch<'m>(
        &self,
        sessions: &'m mut HashMap<Uuid, SessionEntry>,
        id: Uuid,
        now: Instant,
    ) -> Result<&'m mut SessionEntry> {
        let idle = match sessions.get(&id) {
            Some(entry) => self.is_idle(entry, now),
            None => return Err(not_found(id)),
        };
        if idle {
            sessions.remove(&id);
            info!(session_id = %id, "Idle session expired");
            return Err(not_found(id));
        }

        let entry = sessions.get_mut(&id).ok_or_else(|| not_found(id))?;
        entry.last_seen = now;
        Ok(entry)
    }

    fn sweep(&self, sessions: &mut HashMap<Uuid, SessionEntry>, now: Instant) -> usize {
        let before = sessions.len();
        sessions.retain(|_, entry| !self.is_idle(entry, now));
        before - sessions.len()
    }

    pub fn create(&self) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let now = Instant::now();
        let mut sessions = self.lock()?;
        let evicted = self.sweep(&mut sessions, now);
        sessions.insert(
            id,
            SessionEntry {
                context: SessionContext::default(),
                last_seen: now,
            },
        );
        info!(session_id = %id, evicted, "Session created");
        Ok(id)
    }

    pub fn remove(&self, id: Uuid) -> Result<()> {
        self.lock()?
            .remove(&id)
            .map(|_| info!(session_id = %id, "Session removed"))
            .ok_or_else(|| not_found(id))
    }

    pub fn read<T>(&self, id: Uuid, f: impl FnOnce(&SessionContext) -> T) -> Result<T> {
        let mut sessions = self.lock()?;
        let entry = self.touch(&mut sessions, id, Instant::now())?;
        Ok(f(&entry.context))
    }

    pub fn update<T>(&self, id: Uuid, f: impl FnOnce(&mut SessionContext) -> T) -> Result<T> {
        let mut sessions = self.lock()?;
        let entry = self.touch(&mut sessions, id, Instant::now())?;
        Ok(f(&mut entry.context))
    }

    /// Drop every session idle at `now`; returns how many were dropped
    pub fn evict_idle_at(&self, now: Instant) -> Result<usize> {
        let mut sessions = self.lock()?;
        let evicted = self.sweep(&mut sessions, now);
        if evicted > 0 {
            info!(evicted, remaining = sessions.len(), "Evicted idle sessions");
        }
        Ok(evicted)
    }

    pub fn evict_idle(&self) -> Result<usize> {
        self.evict_idle_at(Instant::now())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("session {} does not exist", id))
}
