use crate::domain::model::Session;
use crate::utils::error::{Result, RoomError};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    InitialSession,
    SignedIn,
    SignedOut,
}

type Listener = Arc<dyn Fn(AuthEvent, Option<&Session>) + Send + Sync>;

/// Current identity plus the one place to subscribe to its changes.
///
/// Created once and shared as `Arc<SessionStore>`; services receive it explicitly.
#[derive(Default)]
pub struct SessionStore {
    current: RwLock<Option<Session>>,
    listeners: Mutex<BTreeMap<u64, Listener>>,
    next_id: AtomicU64,
}

impl SessionStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn current(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn require(&self) -> Result<Session> {
        self.current().ok_or(RoomError::Unauthenticated)
    }

    pub fn is_signed_in(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Registers `listener`; it stays registered until the returned handle is dropped.
    pub fn subscribe<F>(self: &Arc<Self>, listener: F) -> Subscription
    where
        F: Fn(AuthEvent, Option<&Session>) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(listener));
        tracing::debug!("Session listener {} subscribed", id);

        Subscription {
            id,
            store: Arc::downgrade(self),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Replaces the current session and notifies every listener.
    pub fn publish(&self, event: AuthEvent, session: Option<Session>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = session.clone();

        // 在鎖外呼叫，listener 可以再讀取 current()
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        tracing::debug!("Session event {:?} -> {} listeners", event, listeners.len());
        for listener in listeners {
            listener(event, session.as_ref());
        }
    }

    fn unsubscribe(&self, id: u64) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        tracing::debug!("Session listener {} unsubscribed", id);
    }
}

/// Handle returned by [`SessionStore::subscribe`]; unsubscribes on drop.
pub struct Subscription {
    id: u64,
    store: Weak<SessionStore>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        drop(self)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(store) = self.store.upgrade() {
            store.unsubscribe(self.id);
        }
    }
}
