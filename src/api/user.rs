//! User endpoint payloads and responses.

use serde::{Deserialize, Serialize};

/// Body of `GET /user/check-auth`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatusBody {
    pub auth: bool,
}

/// Request body for `POST /user/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginPayload {
    pub username: String,
    pub password: String,
}

/// Body of a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub login: bool,
}

/// Request body for `POST /user/signup`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupPayload {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupResponse {
    pub signup: bool,
}

/// Request body for `PUT /user/change-password`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordPayload {
    pub new_password: String,
    pub confirm_new_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordResponse {
    pub change_password: bool,
}

/// Request body for `DELETE /user/delete-account`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteAccountPayload {
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAccountResponse {
    pub delete_account: bool,
}

/// Body of `DELETE /user/logout` — an empty object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Empty {}
