use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Per-visitor state that survives between checks.
#[derive(Clone, Debug)]
pub struct Session {
    pub id: Uuid,
    in_flight: Arc<AtomicBool>,
    completed: Arc<AtomicU64>,
    last_seen: DateTime<Utc>,
}

impl Session {
    fn new(id: Uuid) -> Self {
        Self {
            id,
            in_flight: Arc::new(AtomicBool::new(false)),
            completed: Arc::new(AtomicU64::new(0)),
            last_seen: Utc::now(),
        }
    }

    /// Claim the session's single request slot. `None` while another check
    /// is outstanding.
    pub fn try_begin(&self) -> Option<InFlightGuard> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard {
                flag: Arc::clone(&self.in_flight),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn completed_checks(&self) -> u64 {
        self.completed.load(Ordering::Acquire)
    }

    /// Returns the new count.
    pub fn record_completed(&self) -> u64 {
        self.completed.fetch_add(1, Ordering::AcqRel) + 1
    }
}

/// Releases the session's request slot when dropped, on every exit path.
#[derive(Debug)]
pub struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[derive(Clone, Debug, Serialize, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub active_sessions: usize,
    pub checks_in_flight: usize,
    pub completed_checks: u64,
}

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<DashMap<Uuid, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the session named by the visitor's cookie, creating a fresh one
    /// for unknown or missing ids.
    pub fn get_or_create(&self, id: Option<Uuid>) -> Session {
        if let Some(id) = id {
            if let Some(mut entry) = self.sessions.get_mut(&id) {
                entry.last_seen = Utc::now();
                return entry.value().clone();
            }
        }
        let session = Session::new(Uuid::new_v4());
        self.sessions.insert(session.id, session.clone());
        session
    }

    pub fn get(&self, id: Uuid) -> Option<Session> {
        self.sessions.get(&id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn stats(&self) -> SessionStats {
        let mut stats = SessionStats {
            active_sessions: self.len(),
            ..Default::default()
        };
        for entry in self.sessions.iter() {
            if entry.is_busy() {
                stats.checks_in_flight += 1;
            }
            stats.completed_checks += entry.completed_checks();
        }
        stats
    }

    /// Drop sessions idle for longer than `max_idle`. Sessions with a check
    /// in flight are kept.
    pub fn cleanup(&self, max_idle: std::time::Duration) {
        let Ok(max_idle) = chrono::Duration::from_std(max_idle) else {
            return;
        };
        let cutoff = Utc::now() - max_idle;
        let before = self.sessions.len();
        self.sessions
            .retain(|_, session| session.last_seen > cutoff || session.is_busy());
        let removed = before.saturating_sub(self.sessions.len());
        if removed > 0 {
            info!("[aichecking] Evicted {} idle sessions", removed);
        }
    }
}
