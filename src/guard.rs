//! Route guard.
//!
//! Navigation gating is an explicit transition table over
//! `(session status, target route)` instead of an implicit reactive
//! effect: [`resolve`] is total, and a [`Navigator`] re-applies it to the
//! current route whenever the session flag changes, so a logout while on
//! a protected route redirects immediately.

use std::sync::{Arc, OnceLock, RwLock, Weak};

use tracing::debug;

use crate::session::{AuthStatus, SessionService, SubscriptionId};

// ── Routes ──────────────────────────────────────────────────────────

/// The application's navigation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Public entry point — the login screen.
    Login,
    Signup,
    Dashboard,
    Upload,
    MyAccount,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/",
            Route::Signup => "/signup",
            Route::Dashboard => "/dashboard",
            Route::Upload => "/upload",
            Route::MyAccount => "/my-account",
        }
    }

    /// Routes that require a logged-in session.
    pub fn is_protected(self) -> bool {
        matches!(self, Route::Dashboard | Route::Upload | Route::MyAccount)
    }

    /// Routes that only make sense logged out. Signup is reachable
    /// either way.
    pub fn is_public_only(self) -> bool {
        matches!(self, Route::Login)
    }
}

// ── Transition table ────────────────────────────────────────────────

/// Where a navigation to `target` actually lands under `status`.
///
/// - `LoggedOut` (explicitly — not merely unknown) bounces protected
///   routes to the public entry point.
/// - `LoggedIn` bounces public-only routes to the dashboard.
/// - `Unknown` permits everything; rendering is blocked upstream until
///   the session check settles, so nothing is shown prematurely.
pub fn resolve(status: AuthStatus, target: Route) -> Route {
    match status {
        AuthStatus::Unknown => target,
        AuthStatus::LoggedOut if target.is_protected() => Route::Login,
        AuthStatus::LoggedIn if target.is_public_only() => Route::Dashboard,
        _ => target,
    }
}

// ── Navigator ───────────────────────────────────────────────────────

/// Tracks the current route and keeps it consistent with the session.
///
/// Subscribes to the [`SessionService`] on construction; every session
/// change re-runs [`resolve`] against the current route. Dropping the
/// navigator removes the subscription.
pub struct Navigator {
    session: Arc<SessionService>,
    current: RwLock<Route>,
    subscription: OnceLock<SubscriptionId>,
}

impl Navigator {
    pub fn new(session: Arc<SessionService>, initial: Route) -> Arc<Self> {
        let nav = Arc::new(Self {
            session: session.clone(),
            current: RwLock::new(initial),
            subscription: OnceLock::new(),
        });

        let weak: Weak<Navigator> = Arc::downgrade(&nav);
        let id = session.subscribe(move |status| {
            if let Some(nav) = weak.upgrade() {
                nav.reapply(status);
            }
        });
        let _ = nav.subscription.set(id);
        nav
    }

    /// The route currently in effect.
    pub fn current(&self) -> Route {
        *self.current.read().unwrap()
    }

    /// Whether anything may render at all (the session check settled).
    pub fn can_render(&self) -> bool {
        self.session.is_ready()
    }

    /// Navigate to `target`, landing wherever the table permits.
    pub fn navigate(&self, target: Route) -> Route {
        let landed = resolve(self.session.current(), target);
        *self.current.write().unwrap() = landed;
        if landed != target {
            debug!(target = target.path(), landed = landed.path(), "navigation redirected");
        }
        landed
    }

    fn reapply(&self, status: AuthStatus) {
        let mut current = self.current.write().unwrap();
        let landed = resolve(status, *current);
        if landed != *current {
            debug!(from = current.path(), to = landed.path(), "session change redirected");
            *current = landed;
        }
    }
}

impl Drop for Navigator {
    fn drop(&mut self) {
        if let Some(id) = self.subscription.get() {
            self.session.unsubscribe(*id);
        }
    }
}
