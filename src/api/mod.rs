//! Typed bindings for the backend HTTP contract.
//!
//! One [`Api`] facade binds controllers to endpoints under the configured
//! base URL. All controllers share a single cookie-jar HTTP client, so the
//! backend's session cookie set at login authenticates every later call.

pub mod category;
pub mod file;
pub mod user;

use crate::config::AppConfig;
use crate::fetch::{Controller, Method};
use crate::upload::UploadController;

use category::{CategoryList, NewCategoryResponse};
use file::{FileList, UploadResponse};
use user::{
    AuthStatusBody, ChangePasswordResponse, DeleteAccountResponse, Empty, LoginResponse,
    SignupResponse,
};

/// Controller factory for the backend contract.
pub struct Api {
    config: AppConfig,
    http: reqwest::Client,
}

impl Api {
    /// Build the facade with its own cookie-jar client.
    pub fn new(config: AppConfig) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self { config, http })
    }

    /// Build the facade over an existing client (tests, custom TLS).
    ///
    /// The client should carry a cookie store, or session continuity is
    /// lost.
    pub fn with_client(config: AppConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    fn controller<T>(&self, path: &str, method: Method) -> Controller<T> {
        Controller::new(self.http.clone(), self.config.endpoint(path), method)
    }

    // ── User ────────────────────────────────────────────────────────

    pub fn check_auth(&self) -> Controller<AuthStatusBody> {
        self.controller("/user/check-auth", Method::Get)
    }

    pub fn login(&self) -> Controller<LoginResponse> {
        self.controller("/user/login", Method::Post)
    }

    pub fn signup(&self) -> Controller<SignupResponse> {
        self.controller("/user/signup", Method::Post)
    }

    pub fn logout(&self) -> Controller<Empty> {
        self.controller("/user/logout", Method::Delete)
    }

    pub fn change_password(&self) -> Controller<ChangePasswordResponse> {
        self.controller("/user/change-password", Method::Put)
    }

    pub fn delete_account(&self) -> Controller<DeleteAccountResponse> {
        self.controller("/user/delete-account", Method::Delete)
    }

    // ── Files ───────────────────────────────────────────────────────

    pub fn files(&self) -> Controller<FileList> {
        self.controller("/file", Method::Get)
    }

    pub fn upload_file(&self) -> UploadController<UploadResponse> {
        UploadController::new(self.http.clone(), self.config.endpoint("/file/new"))
    }

    // ── Categories ──────────────────────────────────────────────────

    pub fn categories(&self) -> Controller<CategoryList> {
        self.controller("/category", Method::Get)
    }

    pub fn new_category(&self) -> Controller<NewCategoryResponse> {
        self.controller("/category/new", Method::Post)
    }
}
