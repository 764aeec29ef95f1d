//! Generic request/response lifecycle controller.
//!
//! One [`Controller`] owns one (endpoint, method, headers) descriptor.
//! [`Controller::trigger`] drives a single invocation; the outcome is
//! never returned or thrown — it lands in observable state:
//!
//! - [`Controller::phase`] — `Idle` until the first trigger, `InFlight`
//!   while a call is outstanding, `Settled` afterwards.
//! - [`Controller::result`] — decoded body, present only for an HTTP 200
//!   response. Other 2xx statuses (204 and friends) settle successfully
//!   with no result.
//! - [`Controller::fault`] — decoded [`Fault`] when the call did not
//!   succeed.
//! - [`Controller::succeeded`] — raw HTTP-level success (2xx), independent
//!   of whether a body was present or decodable.
//!
//! Invocations are not queued: triggering again while a call is
//! outstanding races both calls at the network. Each invocation takes a
//! sequence number at trigger time and only the latest issued number may
//! settle the state, so the latest trigger always wins and an earlier
//! late-arriving response is discarded.

use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::Fault;

// ── Descriptor ──────────────────────────────────────────────────────

/// HTTP methods the backend contract uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    fn to_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Immutable per-controller request configuration.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub url: String,
    pub method: Method,
    /// Static headers merged over the default `Content-Type:
    /// application/json` (caller-supplied names win).
    pub headers: Vec<(String, String)>,
}

// ── Invocation state ────────────────────────────────────────────────

/// Lifecycle stage of the most recent invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    InFlight,
    Settled,
}

/// Mutable state of the most recent invocation. One per controller.
pub(crate) struct Invocation<T> {
    pub(crate) phase: Phase,
    pub(crate) result: Option<T>,
    pub(crate) fault: Option<Fault>,
    pub(crate) succeeded: bool,
}

impl<T> Invocation<T> {
    pub(crate) fn idle() -> Self {
        Self {
            phase: Phase::Idle,
            result: None,
            fault: None,
            succeeded: false,
        }
    }

    pub(crate) fn enter_in_flight(&mut self) {
        self.phase = Phase::InFlight;
        self.succeeded = false;
        self.result = None;
        self.fault = None;
    }
}

/// Decoded outcome of one network call, settled into state as a unit.
pub(crate) struct Settled<T> {
    pub(crate) succeeded: bool,
    pub(crate) result: Option<T>,
    pub(crate) fault: Option<Fault>,
}

impl<T> Settled<T> {
    pub(crate) fn fault(fault: Fault) -> Self {
        Self {
            succeeded: false,
            result: None,
            fault: Some(fault),
        }
    }

    /// Decode a response per the lifecycle contract: 2xx settles
    /// successfully, only an exact 200 carries a result, non-2xx bodies
    /// decode structurally into a fault.
    pub(crate) async fn from_response(resp: reqwest::Response) -> Self
    where
        T: DeserializeOwned,
    {
        let status = resp.status();
        if status.is_success() {
            if status.as_u16() == 200 {
                match resp.json::<T>().await {
                    Ok(body) => Self {
                        succeeded: true,
                        result: Some(body),
                        fault: None,
                    },
                    Err(e) => Self {
                        succeeded: true,
                        result: None,
                        fault: Some(Fault::Transport(format!("decode: {e}"))),
                    },
                }
            } else {
                // 204 and other bodiless successes: settled, no result.
                Self {
                    succeeded: true,
                    result: None,
                    fault: None,
                }
            }
        } else {
            let code = status.as_u16();
            let body = resp.text().await.unwrap_or_default();
            Self::fault(Fault::from_error_body(code, &body))
        }
    }
}

// ── Controller ──────────────────────────────────────────────────────

/// Request/response lifecycle controller for one (endpoint, method) pair.
///
/// Construction performs no network call. Faults never propagate past the
/// controller boundary — consumers inspect [`Controller::fault`].
pub struct Controller<T> {
    descriptor: RequestDescriptor,
    http: reqwest::Client,
    state: RwLock<Invocation<T>>,
    /// Invocations issued so far; the latest number owns settlement.
    issued: AtomicU64,
}

impl<T> Controller<T> {
    pub fn new(http: reqwest::Client, url: impl Into<String>, method: Method) -> Self {
        Self::with_headers(http, url, method, Vec::new())
    }

    pub fn with_headers(
        http: reqwest::Client,
        url: impl Into<String>,
        method: Method,
        headers: Vec<(String, String)>,
    ) -> Self {
        Self {
            descriptor: RequestDescriptor {
                url: url.into(),
                method,
                headers,
            },
            http,
            state: RwLock::new(Invocation::idle()),
            issued: AtomicU64::new(0),
        }
    }

    pub fn descriptor(&self) -> &RequestDescriptor {
        &self.descriptor
    }

    // ── Observable state ────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.state.read().unwrap().phase
    }

    pub fn loading(&self) -> bool {
        self.phase() == Phase::InFlight
    }

    /// Raw HTTP-level success of the most recent settled invocation.
    pub fn succeeded(&self) -> bool {
        self.state.read().unwrap().succeeded
    }

    pub fn fault(&self) -> Option<Fault> {
        self.state.read().unwrap().fault.clone()
    }

    /// Number of invocations triggered so far.
    pub fn invocation_count(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    /// Reset `fault` to absent. Idempotent; phase and result untouched.
    pub fn clear_fault(&self) {
        self.state.write().unwrap().fault = None;
    }
}

impl<T: Clone> Controller<T> {
    /// Decoded success payload of the most recent settled invocation.
    pub fn result(&self) -> Option<T> {
        self.state.read().unwrap().result.clone()
    }
}

impl<T: DeserializeOwned> Controller<T> {
    /// Trigger an invocation with a JSON payload.
    pub async fn trigger<P: Serialize + ?Sized>(&self, payload: &P) {
        self.run(Some(payload), None).await;
    }

    /// Trigger an invocation with no payload.
    pub async fn trigger_empty(&self) {
        self.run::<()>(None, None).await;
    }

    /// Trigger with an optional payload and query parameters.
    ///
    /// Parameters are appended to the descriptor URL (with `&` when the
    /// URL already carries a query string, `?` otherwise).
    pub async fn trigger_with_query<P: Serialize + ?Sized>(
        &self,
        payload: Option<&P>,
        query: &[(String, String)],
    ) {
        self.run(payload, Some(query)).await;
    }

    async fn run<P: Serialize + ?Sized>(
        &self,
        payload: Option<&P>,
        query: Option<&[(String, String)]>,
    ) {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.write().unwrap().enter_in_flight();
        debug!(
            url = %self.descriptor.url,
            method = self.descriptor.method.as_str(),
            seq,
            "request start"
        );

        let settled = self.execute(payload, query).await;

        // Sequence guard: only the latest issued invocation settles. The
        // check happens under the state lock, so a trigger issued in the
        // meantime cannot have its in-flight state overwritten.
        let mut state = self.state.write().unwrap();
        if self.issued.load(Ordering::SeqCst) != seq {
            warn!(url = %self.descriptor.url, seq, "stale response discarded");
            return;
        }

        if let Some(ref fault) = settled.fault {
            warn!(url = %self.descriptor.url, seq, %fault, "request settled with fault");
        } else {
            debug!(url = %self.descriptor.url, seq, succeeded = settled.succeeded, "request settled");
        }

        state.phase = Phase::Settled;
        state.succeeded = settled.succeeded;
        state.result = settled.result;
        state.fault = settled.fault;
    }

    async fn execute<P: Serialize + ?Sized>(
        &self,
        payload: Option<&P>,
        query: Option<&[(String, String)]>,
    ) -> Settled<T> {
        let mut req = self
            .http
            .request(self.descriptor.method.to_reqwest(), &self.descriptor.url)
            .headers(self.merged_headers());

        if let Some(params) = query
            && !params.is_empty()
        {
            req = req.query(params);
        }

        // A GET never carries a body.
        if self.descriptor.method != Method::Get
            && let Some(payload) = payload
        {
            match serde_json::to_vec(payload) {
                Ok(body) => req = req.body(body),
                Err(e) => return Settled::fault(Fault::Transport(format!("encode: {e}"))),
            }
        }

        let resp = match req.send().await {
            Ok(resp) => resp,
            Err(e) => return Settled::fault(Fault::Transport(e.to_string())),
        };
        Settled::from_response(resp).await
    }

    /// Default JSON content type, overridden by caller-supplied headers.
    fn merged_headers(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in &self.descriptor.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                (Ok(name), Ok(value)) => {
                    map.insert(name, value);
                }
                _ => warn!(header = %name, "skipping invalid static header"),
            }
        }
        map
    }
}
