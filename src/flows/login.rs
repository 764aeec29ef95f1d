//! Login screen flow.

use std::sync::Arc;

use crate::api::Api;
use crate::api::user::{LoginPayload, LoginResponse};
use crate::error::{Fault, fault_code};
use crate::fetch::Controller;
use crate::session::{AuthStatus, SessionService};

use super::UNKNOWN_ERROR_MESSAGE;

/// User-facing login failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginError {
    /// Local validation — no network call was made.
    BlankField,
    Invalid,
    Unknown,
}

impl LoginError {
    pub fn message(self) -> &'static str {
        match self {
            LoginError::BlankField => "Please fill in your username and password",
            LoginError::Invalid => "Wrong username or password",
            LoginError::Unknown => UNKNOWN_ERROR_MESSAGE,
        }
    }

    fn from_fault(fault: Option<&Fault>) -> Self {
        match fault.and_then(Fault::code) {
            Some(fault_code::INVALID_LOGIN) => LoginError::Invalid,
            _ => LoginError::Unknown,
        }
    }
}

/// Drives `POST /user/login` and sets the session flag optimistically on
/// success. Navigation follows from the session change (the navigator's
/// transition table moves the login route to the dashboard).
pub struct LoginFlow {
    controller: Controller<LoginResponse>,
    session: Arc<SessionService>,
}

impl LoginFlow {
    pub fn new(api: &Api, session: Arc<SessionService>) -> Self {
        Self {
            controller: api.login(),
            session,
        }
    }

    pub async fn submit(&self, username: &str, password: &str) -> Result<(), LoginError> {
        if username.is_empty() || password.is_empty() {
            return Err(LoginError::BlankField);
        }

        self.controller
            .trigger(&LoginPayload {
                username: username.to_string(),
                password: password.to_string(),
            })
            .await;

        if let Some(response) = self.controller.result()
            && response.login
        {
            self.session.set(AuthStatus::LoggedIn);
            return Ok(());
        }
        Err(LoginError::from_fault(self.controller.fault().as_ref()))
    }

    pub fn controller(&self) -> &Controller<LoginResponse> {
        &self.controller
    }
}
