//! Signup screen flow.

use crate::api::Api;
use crate::api::user::{SignupPayload, SignupResponse};
use crate::error::{Fault, fault_code};
use crate::fetch::Controller;

use super::UNKNOWN_ERROR_MESSAGE;

/// User-facing signup failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupError {
    /// Local validation — no network call was made.
    BlankField,
    /// Backend rejected the password pair.
    InvalidPassword,
    UsernameTaken,
    Unknown,
}

impl SignupError {
    pub fn message(self) -> &'static str {
        match self {
            SignupError::BlankField => "Please fill in all fields",
            SignupError::InvalidPassword => "Please ensure that both passwords match",
            SignupError::UsernameTaken => {
                "This username is taken, please choose another username"
            }
            SignupError::Unknown => UNKNOWN_ERROR_MESSAGE,
        }
    }

    fn from_fault(fault: Option<&Fault>) -> Self {
        match fault.and_then(Fault::code) {
            Some(fault_code::SIGNUP_INVALID_PASSWORD) => SignupError::InvalidPassword,
            Some(fault_code::USERNAME_ALREADY_EXISTS) => SignupError::UsernameTaken,
            _ => SignupError::Unknown,
        }
    }
}

/// Drives `POST /user/signup`. Does not touch the session — the new user
/// still has to log in.
pub struct SignupFlow {
    controller: Controller<SignupResponse>,
}

impl SignupFlow {
    pub fn new(api: &Api) -> Self {
        Self {
            controller: api.signup(),
        }
    }

    pub async fn submit(
        &self,
        username: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<(), SignupError> {
        if username.is_empty() || password.is_empty() || confirm_password.is_empty() {
            return Err(SignupError::BlankField);
        }

        self.controller
            .trigger(&SignupPayload {
                username: username.to_string(),
                password: password.to_string(),
                confirm_password: confirm_password.to_string(),
            })
            .await;

        if let Some(response) = self.controller.result()
            && response.signup
        {
            return Ok(());
        }
        Err(SignupError::from_fault(self.controller.fault().as_ref()))
    }

    pub fn controller(&self) -> &Controller<SignupResponse> {
        &self.controller
    }
}
