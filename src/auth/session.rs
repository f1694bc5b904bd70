//! Active sessions plus a subscribe/notify channel for auth changes.

use super::Session;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// A change in authentication state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(Session),
    SignedOut { token: String, user_id: String },
    /// Dropped from the table after `expires_at` passed.
    Expired { token: String, user_id: String },
}

pub type SubscriptionId = u64;

type Listener = Arc<dyn Fn(&AuthEvent) + Send + Sync>;

/// Holds the active sessions and notifies subscribers of every change.
///
/// Sessions only change through [`SessionContext::publish`], so subscribers
/// observe every transition exactly once.
#[derive(Default)]
pub struct SessionContext {
    sessions: RwLock<HashMap<String, Session>>,
    listeners: RwLock<Vec<(SubscriptionId, Listener)>>,
    next_id: AtomicU64,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&AuthEvent) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut listeners) = self.listeners.write() {
            listeners.push((id, Arc::new(listener)));
        }
        id
    }

    /// Returns true if the subscription existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        match self.listeners.write() {
            Ok(mut listeners) => {
                let before = listeners.len();
                listeners.retain(|(sid, _)| *sid != id);
                listeners.len() != before
            }
            Err(_) => false,
        }
    }

    /// Applies an event to the session table, then notifies subscribers.
    pub fn publish(&self, event: AuthEvent) {
        if let Ok(mut sessions) = self.sessions.write() {
            match &event {
                AuthEvent::SignedIn(session) => {
                    sessions.insert(session.token.clone(), session.clone());
                }
                AuthEvent::SignedOut { token, .. } | AuthEvent::Expired { token, .. } => {
                    sessions.remove(token);
                }
            }
        }
        self.notify(&[event]);
    }

    // Listeners run outside the lock so they may call back into the context.
    fn notify(&self, events: &[AuthEvent]) {
        if events.is_empty() {
            return;
        }
        let listeners: Vec<Listener> = match self.listeners.read() {
            Ok(listeners) => listeners.iter().map(|(_, l)| Arc::clone(l)).collect(),
            Err(_) => return,
        };
        for event in events {
            for listener in &listeners {
                listener(event);
            }
        }
    }

    /// Removes every session expired at `now_ms`, emitting `Expired` for each.
    /// Returns how many were removed.
    pub fn prune_expired(&self, now_ms: i64) -> usize {
        let expired: Vec<AuthEvent> = match self.sessions.write() {
            Ok(mut sessions) => {
                let tokens: Vec<String> = sessions
                    .values()
                    .filter(|s| s.is_expired(now_ms))
                    .map(|s| s.token.clone())
                    .collect();
                tokens
                    .into_iter()
                    .filter_map(|token| sessions.remove(&token))
                    .map(|s| AuthEvent::Expired {
                        token: s.token,
                        user_id: s.user.id,
                    })
                    .collect()
            }
            Err(_) => return 0,
        };
        self.notify(&expired);
        expired.len()
    }

    /// Session for `token` if it exists and has not expired at `now_ms`.
    /// Looking up an expired session prunes the table.
    pub fn get(&self, token: &str, now_ms: i64) -> Option<Session> {
        let found = self.sessions.read().ok()?.get(token).cloned()?;
        if found.is_expired(now_ms) {
            self.prune_expired(now_ms);
            return None;
        }
        Some(found)
    }

    pub fn active_count(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::User;
    use std::sync::Mutex;

    fn session(token: &str, expires_at: i64) -> Session {
        Session {
            token: token.to_string(),
            user: User {
                id: "u1".to_string(),
                email: "ada@example.com".to_string(),
            },
            expires_at,
        }
    }

    #[test]
    fn test_subscribers_see_every_event() {
        let ctx = SessionContext::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        ctx.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

        ctx.publish(AuthEvent::SignedIn(session("t1", 100)));
        ctx.publish(AuthEvent::SignedOut {
            token: "t1".to_string(),
            user_id: "u1".to_string(),
        });

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(matches!(seen[0], AuthEvent::SignedIn(_)));
        assert_eq!(ctx.active_count(), 0);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let ctx = SessionContext::new();
        let count = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&count);
        let id = ctx.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        ctx.publish(AuthEvent::SignedIn(session("t1", 100)));
        assert!(ctx.unsubscribe(id));
        assert!(!ctx.unsubscribe(id));
        ctx.publish(AuthEvent::SignedIn(session("t2", 100)));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_expired_sessions_are_not_returned() {
        let ctx = SessionContext::new();
        ctx.publish(AuthEvent::SignedIn(session("t1", 100)));
        assert!(ctx.get("t1", 99).is_some());
        assert!(ctx.get("t1", 100).is_none());
        assert!(ctx.get("missing", 0).is_none());
    }

    #[test]
    fn test_expired_sessions_are_pruned() {
        let ctx = SessionContext::new();
        let expired = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&expired);
        ctx.subscribe(move |event| {
            if let AuthEvent::Expired { token, .. } = event {
                sink.lock().unwrap().push(token.clone());
            }
        });

        ctx.publish(AuthEvent::SignedIn(session("t1", 100)));
        ctx.publish(AuthEvent::SignedIn(session("t2", 100)));
        ctx.publish(AuthEvent::SignedIn(session("t3", 500)));
        assert_eq!(ctx.active_count(), 3);

        // Touching one expired token sweeps every expired entry.
        assert!(ctx.get("t1", 200).is_none());
        assert_eq!(ctx.active_count(), 1);
        let mut seen = expired.lock().unwrap().clone();
        seen.sort();
        assert_eq!(seen, vec!["t1", "t2"]);

        assert_eq!(ctx.prune_expired(200), 0);
        assert_eq!(ctx.prune_expired(500), 1);
        assert_eq!(ctx.active_count(), 0);
    }
}
