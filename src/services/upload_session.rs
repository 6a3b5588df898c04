//! Request tokens for upload slots.
//!
//! A client that re-uploads before an earlier validation finishes gets a
//! newer token; the earlier verdict is then discarded on arrival instead of
//! overwriting the newer one.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use lru::LruCache;
use tokio::time::Instant;
use tracing::debug;

use crate::error::AppError;
use crate::models::{ClassificationVerdict, GateRejection, SessionOutcome};

pub type RequestToken = u64;

pub const DEFAULT_MAX_SESSIONS: usize = 10_000;
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Default)]
pub struct UploadSession {
    latest_issued: AtomicU64,
    applied: Mutex<Option<(RequestToken, SessionOutcome)>>,
}

impl UploadSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the token for a new validation attempt. Tokens start at 1.
    pub fn begin(&self) -> RequestToken {
        self.latest_issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn latest_token(&self) -> RequestToken {
        self.latest_issued.load(Ordering::SeqCst)
    }

    /// Store `verdict` if `token` is still the latest one issued.
    pub fn apply(&self, token: RequestToken, verdict: ClassificationVerdict) -> bool {
        self.record(token, SessionOutcome::Verdict(verdict))
    }

    /// Record that the upload behind `token` never got past the gate.
    pub fn reject(&self, token: RequestToken, error: &AppError) -> bool {
        self.record(
            token,
            SessionOutcome::Rejected(GateRejection {
                code: error.error_code().to_string(),
                message: error.to_string(),
            }),
        )
    }

    fn record(&self, token: RequestToken, outcome: SessionOutcome) -> bool {
        let mut applied = match self.applied.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        // Checked under the lock so a concurrent apply cannot interleave.
        if token != self.latest_token() {
            debug!(token, latest = self.latest_token(), "Discarding stale outcome");
            return false;
        }

        *applied = Some((token, outcome));
        true
    }

    pub fn current(&self) -> Option<(RequestToken, SessionOutcome)> {
        match self.applied.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[derive(Debug)]
struct SessionEntry {
    session: Arc<UploadSession>,
    last_seen: Instant,
}

/// Sessions keyed by the client's `x-upload-session` value.
///
/// Holds at most `capacity` sessions, dropping the least recently used one
/// on overflow. Sessions with no upload for `idle_ttl` are dropped too.
/// A request that still holds an evicted session's `Arc` finishes normally.
pub struct SessionRegistry {
    sessions: Mutex<LruCache<String, SessionEntry>>,
    idle_ttl: Duration,
}

impl SessionRegistry {
    pub fn new(capacity: usize, idle_ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            sessions: Mutex::new(LruCache::new(capacity)),
            idle_ttl,
        }
    }

    /// Session for `session_id`, created if absent. Counts as activity.
    pub fn session(&self, session_id: &str) -> Arc<UploadSession> {
        let mut sessions = self.lock();
        let now = Instant::now();
        self.evict_idle(&mut sessions, now);

        let key = session_id.to_string();
        if let Some(entry) = sessions.get_mut(&key) {
            entry.last_seen = now;
            return entry.session.clone();
        }

        let session = Arc::new(UploadSession::new());
        let evicted = sessions.push(
            key.clone(),
            SessionEntry {
                session: session.clone(),
                last_seen: now,
            },
        );
        if let Some((evicted_id, _)) = evicted.filter(|(id, _)| *id != key) {
            debug!(session_id = %evicted_id, "Session registry full, evicted least recent session");
        }
        session
    }

    /// Lookup without refreshing the session's idle clock.
    pub fn get(&self, session_id: &str) -> Option<Arc<UploadSession>> {
        let mut sessions = self.lock();
        self.evict_idle(&mut sessions, Instant::now());
        sessions
            .peek(&session_id.to_string())
            .map(|entry| entry.session.clone())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<String, SessionEntry>> {
        match self.sessions.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    // LRU order matches `last_seen` order, so expired entries sit at the tail.
    fn evict_idle(&self, sessions: &mut LruCache<String, SessionEntry>, now: Instant) {
        while let Some((_, entry)) = sessions.peek_lru() {
            if now.duration_since(entry.last_seen) < self.idle_ttl {
                break;
            }
            if let Some((session_id, _)) = sessions.pop_lru() {
                debug!(session_id = %session_id, "Evicted idle upload session");
            }
        }
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_IDLE)
    }
}
