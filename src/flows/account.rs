//! Account screen flows: change password, delete account, logout.

use std::sync::Arc;

use crate::api::Api;
use crate::api::user::{
    ChangePasswordPayload, ChangePasswordResponse, DeleteAccountPayload, DeleteAccountResponse,
    Empty,
};
use crate::error::{Fault, fault_code};
use crate::fetch::Controller;
use crate::session::{AuthStatus, SessionService};

use super::UNKNOWN_ERROR_MESSAGE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangePasswordError {
    BlankField,
    InvalidPassword,
    Unknown,
}

impl ChangePasswordError {
    pub fn message(self) -> &'static str {
        match self {
            ChangePasswordError::BlankField => "Please fill in all fields",
            ChangePasswordError::InvalidPassword => "Please ensure that both passwords match",
            ChangePasswordError::Unknown => UNKNOWN_ERROR_MESSAGE,
        }
    }

    fn from_fault(fault: Option<&Fault>) -> Self {
        match fault.and_then(Fault::code) {
            Some(fault_code::SIGNUP_INVALID_PASSWORD) => ChangePasswordError::InvalidPassword,
            _ => ChangePasswordError::Unknown,
        }
    }
}

/// Drives `PUT /user/change-password`.
pub struct ChangePasswordFlow {
    controller: Controller<ChangePasswordResponse>,
}

impl ChangePasswordFlow {
    pub fn new(api: &Api) -> Self {
        Self {
            controller: api.change_password(),
        }
    }

    pub async fn submit(
        &self,
        new_password: &str,
        confirm_new_password: &str,
    ) -> Result<(), ChangePasswordError> {
        if new_password.is_empty() || confirm_new_password.is_empty() {
            return Err(ChangePasswordError::BlankField);
        }

        self.controller
            .trigger(&ChangePasswordPayload {
                new_password: new_password.to_string(),
                confirm_new_password: confirm_new_password.to_string(),
            })
            .await;

        if let Some(response) = self.controller.result()
            && response.change_password
        {
            return Ok(());
        }
        Err(ChangePasswordError::from_fault(
            self.controller.fault().as_ref(),
        ))
    }

    pub fn controller(&self) -> &Controller<ChangePasswordResponse> {
        &self.controller
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteAccountError {
    BlankField,
    InvalidOperation,
    Unknown,
}

impl DeleteAccountError {
    pub fn message(self) -> &'static str {
        match self {
            DeleteAccountError::BlankField => "Please fill in your password",
            DeleteAccountError::InvalidOperation => "Invalid operation",
            DeleteAccountError::Unknown => UNKNOWN_ERROR_MESSAGE,
        }
    }

    fn from_fault(fault: Option<&Fault>) -> Self {
        match fault.and_then(Fault::code) {
            Some(fault_code::INVALID_OPERATION) => DeleteAccountError::InvalidOperation,
            _ => DeleteAccountError::Unknown,
        }
    }
}

/// Drives `DELETE /user/delete-account`. A confirmed deletion ends the
/// session, so the flow flips the shared status to logged out.
pub struct DeleteAccountFlow {
    controller: Controller<DeleteAccountResponse>,
    session: Arc<SessionService>,
}

impl DeleteAccountFlow {
    pub fn new(api: &Api, session: Arc<SessionService>) -> Self {
        Self {
            controller: api.delete_account(),
            session,
        }
    }

    pub async fn submit(&self, password: &str) -> Result<(), DeleteAccountError> {
        if password.is_empty() {
            return Err(DeleteAccountError::BlankField);
        }

        self.controller
            .trigger(&DeleteAccountPayload {
                password: password.to_string(),
            })
            .await;

        if let Some(response) = self.controller.result()
            && response.delete_account
        {
            self.session.set(AuthStatus::LoggedOut);
            return Ok(());
        }
        Err(DeleteAccountError::from_fault(
            self.controller.fault().as_ref(),
        ))
    }

    pub fn controller(&self) -> &Controller<DeleteAccountResponse> {
        &self.controller
    }
}

/// Drives `DELETE /user/logout`. Any settled success flips the session to
/// logged out; a failure hands the fault back untouched.
pub struct LogoutFlow {
    controller: Controller<Empty>,
    session: Arc<SessionService>,
}

impl LogoutFlow {
    pub fn new(api: &Api, session: Arc<SessionService>) -> Self {
        Self {
            controller: api.logout(),
            session,
        }
    }

    pub async fn submit(&self) -> Result<(), Fault> {
        self.controller.trigger_empty().await;

        if self.controller.succeeded() {
            self.session.set(AuthStatus::LoggedOut);
            return Ok(());
        }
        match self.controller.fault() {
            Some(fault) => Err(fault),
            None => Err(Fault::Transport("logout did not settle".to_string())),
        }
    }

    pub fn controller(&self) -> &Controller<Empty> {
        &self.controller
    }
}
