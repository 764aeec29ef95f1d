use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Fault codes ─────────────────────────────────────────────────────
//
// Stable, machine-readable identifiers reported by the backend. The
// flows match on `code` — never on the human-readable message string.

/// Stable backend fault-code constants.
pub mod fault_code {
    pub const INVALID_LOGIN: &str = "AHA-INVALID-LOGIN";
    pub const SIGNUP_INVALID_PASSWORD: &str = "AHA-SIGNUP-INVALID-PASSWORD";
    pub const USERNAME_ALREADY_EXISTS: &str = "AHA-USERNAME-ALREADY-EXISTS";
    pub const INVALID_OPERATION: &str = "AHA-INVALID-OPERATION";
    pub const CATEGORY_NOT_FOUND: &str = "AHA-CATEGORY-NOT-FOUND";
}

// ── Fault ───────────────────────────────────────────────────────────

/// Structured error record the backend sends on any non-2xx response.
///
/// ```json
/// {"httpCode": 401, "code": "AHA-INVALID-LOGIN", "message": "bad creds"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendFault {
    pub http_code: u16,
    pub code: String,
    pub message: String,
}

/// Unsuccessful outcome of a controller invocation.
///
/// The two variants keep the transport/backend boundary explicit:
/// a backend-reported fault always carries a decodable `{httpCode,
/// code, message}` body; a transport fault (DNS, connectivity, or an
/// undecodable body) is stored undecoded.
#[derive(Debug, Clone, Error)]
pub enum Fault {
    /// Non-2xx response with a decodable JSON error body.
    #[error("HTTP {}: {} ({})", .0.http_code, .0.message, .0.code)]
    Backend(BackendFault),

    /// The call failed before a backend error record was available.
    #[error("transport: {0}")]
    Transport(String),
}

impl Fault {
    /// Backend fault code, if this is a backend-reported fault.
    pub fn code(&self) -> Option<&str> {
        match self {
            Fault::Backend(f) => Some(&f.code),
            Fault::Transport(_) => None,
        }
    }

    /// The full backend record, if this is a backend-reported fault.
    pub fn backend(&self) -> Option<&BackendFault> {
        match self {
            Fault::Backend(f) => Some(f),
            Fault::Transport(_) => None,
        }
    }

    /// Decode a non-2xx response body.
    ///
    /// A body matching the backend error contract becomes
    /// [`Fault::Backend`]; anything else (HTML error pages, empty
    /// bodies) is kept opaque as [`Fault::Transport`].
    pub(crate) fn from_error_body(status: u16, body: &str) -> Fault {
        match serde_json::from_str::<BackendFault>(body) {
            Ok(record) => Fault::Backend(record),
            Err(_) => Fault::Transport(format!("HTTP {status}: {body}")),
        }
    }
}
