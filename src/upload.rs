//! Multipart upload controller.
//!
//! Same lifecycle contract as [`crate::fetch::Controller`], specialized
//! for POST requests carrying a multipart payload (file bytes plus named
//! text fields). No JSON content type is set — the transport owns the
//! multipart boundary — and there is no query-parameter support.

use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::Fault;
use crate::fetch::{Invocation, Phase, Settled};

// ── Payload ─────────────────────────────────────────────────────────

struct FilePart {
    field: String,
    file_name: String,
    mime: String,
    bytes: Vec<u8>,
}

/// Builder for one multipart request body: at most one file plus zero or
/// more named text fields. Consumed by [`UploadController::trigger`], so
/// a payload is never replayed.
#[derive(Default)]
pub struct MultipartPayload {
    file: Option<FilePart>,
    fields: Vec<(String, String)>,
}

impl MultipartPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the binary file part.
    pub fn file(
        mut self,
        field: impl Into<String>,
        file_name: impl Into<String>,
        mime: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.file = Some(FilePart {
            field: field.into(),
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        });
        self
    }

    /// Append a named text field.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    fn into_form(self) -> Result<Form, Fault> {
        let mut form = Form::new();
        for (name, value) in self.fields {
            form = form.text(name, value);
        }
        if let Some(file) = self.file {
            let part = Part::bytes(file.bytes)
                .file_name(file.file_name)
                .mime_str(&file.mime)
                .map_err(|e| Fault::Transport(format!("mime: {e}")))?;
            form = form.part(file.field, part);
        }
        Ok(form)
    }
}

// ── Controller ──────────────────────────────────────────────────────

/// Lifecycle controller for one multipart POST endpoint.
pub struct UploadController<T> {
    url: String,
    http: reqwest::Client,
    state: RwLock<Invocation<T>>,
    issued: AtomicU64,
}

impl<T> UploadController<T> {
    /// Bind a controller to an upload endpoint. No network call happens.
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http,
            state: RwLock::new(Invocation::idle()),
            issued: AtomicU64::new(0),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn phase(&self) -> Phase {
        self.state.read().unwrap().phase
    }

    pub fn loading(&self) -> bool {
        self.phase() == Phase::InFlight
    }

    pub fn succeeded(&self) -> bool {
        self.state.read().unwrap().succeeded
    }

    pub fn fault(&self) -> Option<Fault> {
        self.state.read().unwrap().fault.clone()
    }

    pub fn invocation_count(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    /// Reset `fault` to absent. Idempotent; phase and result untouched.
    pub fn clear_fault(&self) {
        self.state.write().unwrap().fault = None;
    }
}

impl<T: Clone> UploadController<T> {
    pub fn result(&self) -> Option<T> {
        self.state.read().unwrap().result.clone()
    }
}

impl<T: DeserializeOwned> UploadController<T> {
    /// Trigger one multipart POST invocation.
    pub async fn trigger(&self, payload: MultipartPayload) {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.write().unwrap().enter_in_flight();
        debug!(url = %self.url, seq, "upload start");

        let settled = self.execute(payload).await;

        // Sequence check under the state lock, as in `fetch::Controller`.
        let mut state = self.state.write().unwrap();
        if self.issued.load(Ordering::SeqCst) != seq {
            warn!(url = %self.url, seq, "stale upload response discarded");
            return;
        }

        if let Some(ref fault) = settled.fault {
            warn!(url = %self.url, seq, %fault, "upload settled with fault");
        } else {
            debug!(url = %self.url, seq, succeeded = settled.succeeded, "upload settled");
        }

        state.phase = Phase::Settled;
        state.succeeded = settled.succeeded;
        state.result = settled.result;
        state.fault = settled.fault;
    }

    async fn execute(&self, payload: MultipartPayload) -> Settled<T> {
        let form = match payload.into_form() {
            Ok(form) => form,
            Err(fault) => return Settled::fault(fault),
        };
        let resp = match self.http.post(&self.url).multipart(form).send().await {
            Ok(resp) => resp,
            Err(e) => return Settled::fault(Fault::Transport(e.to_string())),
        };
        Settled::from_response(resp).await
    }
}
