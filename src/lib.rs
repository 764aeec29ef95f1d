//! aha-core — client core for the audio hosting app.
//!
//! Rust owns the request lifecycle, session state, and routing decisions;
//! the rendering layer (whatever it is) only reads observable state and
//! draws. Everything talks to the backend over HTTP with a shared
//! cookie-jar client so the session cookie rides along on every call.
//!
//! # Three layers
//!
//! - [`fetch::Controller`] / [`upload::UploadController`] — one controller
//!   per (endpoint, method); `trigger` drives an invocation, the outcome
//!   lands in observable state (`phase`, `result`, `fault`, `succeeded`).
//! - [`session::SessionService`] — process-wide auth flag derived from the
//!   check-auth call, updated optimistically by the flows, observed by
//!   subscribers.
//! - [`guard`] — the `(session status, target route)` transition table and
//!   a [`guard::Navigator`] that re-applies it whenever the session flag
//!   changes.
//!
//! # Example
//!
//! ```ignore
//! use aha_core::{api::Api, AppConfig, AuthStatus, Navigator, Route, SessionService};
//! use std::sync::Arc;
//!
//! let api = Api::new(AppConfig::from_env()?)?;
//! let session = Arc::new(SessionService::new());
//! let nav = Navigator::new(session.clone(), Route::Login);
//!
//! // Startup: resolve the session flag before rendering anything.
//! let checker = api.check_auth();
//! session.initialize(&checker).await;
//!
//! let login = aha_core::flows::LoginFlow::new(&api, session.clone());
//! login.submit("alice", "secret").await?;
//! assert_eq!(nav.current(), Route::Dashboard);
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod fetch;
pub mod flows;
pub mod guard;
pub mod session;
pub mod upload;

// Re-export primary types at crate root.
pub use config::{AppConfig, ConfigError};
pub use error::{BackendFault, Fault};
pub use fetch::{Controller, Method, Phase, RequestDescriptor};
pub use guard::{Navigator, Route};
pub use session::{AuthStatus, SessionService, SubscriptionId};
pub use upload::{MultipartPayload, UploadController};
