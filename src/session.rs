//! Process-wide authentication session state.
//!
//! One [`SessionService`] is constructed at process start and passed by
//! reference to whatever wires up the UI tree — there is no ambient
//! global. The flag starts [`AuthStatus::Unknown`], is resolved once by
//! [`SessionService::initialize`] (fail-closed), and is thereafter
//! updated optimistically by the flows after login/logout/delete-account.
//! Listeners are notified synchronously on the thread that calls `set`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use crate::api::user::AuthStatusBody;
use crate::fetch::Controller;

// ── Status ──────────────────────────────────────────────────────────

/// The session flag. `Unknown` means the startup check has not settled
/// yet; guarded views must not render until it has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    Unknown,
    LoggedIn,
    LoggedOut,
}

impl AuthStatus {
    pub fn from_flag(flag: Option<bool>) -> Self {
        match flag {
            None => AuthStatus::Unknown,
            Some(true) => AuthStatus::LoggedIn,
            Some(false) => AuthStatus::LoggedOut,
        }
    }

    pub fn flag(self) -> Option<bool> {
        match self {
            AuthStatus::Unknown => None,
            AuthStatus::LoggedIn => Some(true),
            AuthStatus::LoggedOut => Some(false),
        }
    }

    pub fn is_logged_in(self) -> bool {
        self == AuthStatus::LoggedIn
    }
}

// ── Service ─────────────────────────────────────────────────────────

/// Unique handle for a session subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(AuthStatus) + Send + Sync>;

/// Injectable session-state service: `current()`, `set(status)`,
/// `subscribe(listener)`.
pub struct SessionService {
    status: RwLock<AuthStatus>,
    listeners: RwLock<Vec<(SubscriptionId, Listener)>>,
    /// Monotonic counter for subscription IDs.
    next_id: AtomicU64,
}

impl SessionService {
    pub fn new() -> Self {
        Self {
            status: RwLock::new(AuthStatus::Unknown),
            listeners: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// The current session flag.
    pub fn current(&self) -> AuthStatus {
        *self.status.read().unwrap()
    }

    /// Whether the startup check has settled (flag is no longer unknown).
    pub fn is_ready(&self) -> bool {
        self.current() != AuthStatus::Unknown
    }

    /// Set the flag and notify every listener synchronously.
    ///
    /// Used optimistically after a locally-known-successful action
    /// (login, logout, delete-account) without re-querying the backend.
    pub fn set(&self, status: AuthStatus) {
        {
            let mut current = self.status.write().unwrap();
            *current = status;
        }
        debug!(?status, "session status set");
        // Notify after releasing the status lock, so listeners can read.
        let listeners: Vec<Listener> = {
            let guard = self.listeners.read().unwrap();
            guard.iter().map(|(_, l)| Arc::clone(l)).collect()
        };
        for listener in listeners {
            listener(status);
        }
    }

    /// Convenience form of [`SessionService::set`] taking the wire flag.
    pub fn set_flag(&self, flag: Option<bool>) {
        self.set(AuthStatus::from_flag(flag));
    }

    /// Subscribe to session changes. The listener runs synchronously on
    /// the thread that calls `set`.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(AuthStatus) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .unwrap()
            .push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener by its subscription ID.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners
            .write()
            .unwrap()
            .retain(|(entry_id, _)| *entry_id != id);
    }

    /// Resolve the flag once at startup via the check-auth controller.
    ///
    /// Fail-closed: any fault (transport or backend) resolves to
    /// `LoggedOut` rather than leaving the flag unknown.
    pub async fn initialize(&self, checker: &Controller<AuthStatusBody>) {
        checker.trigger_empty().await;
        match checker.result() {
            Some(body) => self.set(AuthStatus::from_flag(Some(body.auth))),
            None => {
                if let Some(fault) = checker.fault() {
                    warn!(%fault, "session check failed, defaulting to logged out");
                }
                self.set(AuthStatus::LoggedOut);
            }
        }
    }

    /// Re-run the session check to reconcile optimistic drift.
    ///
    /// The embedder decides when (on window focus, on an interval); the
    /// service owns no timer. Eventual, not strict, consistency.
    pub async fn revalidate(&self, checker: &Controller<AuthStatusBody>) {
        self.initialize(checker).await;
    }
}

impl Default for SessionService {
    fn default() -> Self {
        Self::new()
    }
}
