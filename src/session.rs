use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::{metrics, rates::ExchangeRateTable};

/// One browser session and the rate table fetched when it started
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub rates: Arc<ExchangeRateTable>,
    pub created_at: DateTime<Utc>,
    last_seen: Instant,
}

impl Session {
    pub fn new(rates: ExchangeRateTable) -> Self {
        Self {
            id: Uuid::new_v4(),
            rates: Arc::new(rates),
            created_at: Utc::now(),
            last_seen: Instant::now(),
        }
    }

    pub fn idle_for(&self, now: Instant) -> Duration {
        now.duration_since(self.last_seen)
    }

    /// Whole seconds since the session was started
    pub fn age_seconds(&self, now: DateTime<Utc>) -> i64 {
        (now - self.created_at).num_seconds()
    }
}

/// Per-session rate cache
///
/// A session's table is written once, when the session is created; later
/// requests only refresh `last_seen`. Sessions idle past the TTL are dropped
/// by [`cleanup_loop`](Self::cleanup_loop).
#[derive(Debug)]
pub struct SessionStore {
    sessions: DashMap<Uuid, Session>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    /// Live session by id, refreshing its idle timer
    pub fn touch(&self, id: Uuid) -> Option<Session> {
        let mut entry = self.sessions.get_mut(&id)?;
        let now = Instant::now();
        if entry.idle_for(now) >= self.ttl {
            drop(entry);
            self.sessions.remove(&id);
            metrics::set_active_sessions(self.sessions.len());
            return None;
        }
        entry.last_seen = now;
        Some(entry.clone())
    }

    pub fn insert(&self, session: Session) {
        self.sessions.insert(session.id, session);
        metrics::set_active_sessions(self.sessions.len());
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Start time of the longest-lived session still in the store
    pub fn oldest_started_at(&self) -> Option<DateTime<Utc>> {
        self.sessions.iter().map(|entry| entry.created_at).min()
    }

    /// Drop sessions idle for at least the TTL; returns how many were removed
    pub fn evict_expired(&self, now: Instant) -> usize {
        let before = self.sessions.len();
        let wall_clock = Utc::now();
        self.sessions.retain(|id, session| {
            let live = session.idle_for(now) < self.ttl;
            if !live {
                tracing::debug!(
                    session_id = %id,
                    age_seconds = session.age_seconds(wall_clock),
                    "Evicting idle session"
                );
            }
            live
        });
        let remaining = self.sessions.len();
        metrics::set_active_sessions(remaining);
        before.saturating_sub(remaining)
    }

    pub async fn cleanup_loop(self: Arc<Self>, every: Duration) {
        let mut interval = tokio::time::interval(every);

        loop {
            interval.tick().await;

            let evicted = self.evict_expired(Instant::now());

            tracing::debug!(
                evicted,
                active_sessions = self.sessions.len(),
                "Session cleanup completed"
            );
        }
    }
}

/// Extract a session id from a `Cookie` header value
pub fn session_id_from_cookie(header: &str, cookie_name: &str) -> Option<Uuid> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

/// `Set-Cookie` header value for a session
pub fn session_cookie(cookie_name: &str, id: Uuid, ttl: Duration) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        cookie_name,
        id,
        ttl.as_secs()
    )
}
