//! End-to-end tests against an in-process stand-in for the backend.
//!
//! The server speaks the real contract: JSON bodies, `AHA-*` error codes
//! in the `{httpCode, code, message}` envelope, a session cookie set at
//! login and required by the protected endpoints, and multipart uploads.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Json;
use axum::extract::{Multipart, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use serde::Deserialize;
use serde_json::{Value, json};

use aha_core::api::Api;
use aha_core::api::user::AuthStatusBody;
use aha_core::config::AppConfig;
use aha_core::flows::{
    DeleteAccountError, DeleteAccountFlow, FilesFlow, LoginError, LoginFlow, LogoutFlow,
    SelectedFile, SignupError, SignupFlow, UploadError, UploadForm,
};
use aha_core::flows::{AddCategoryFlow, CategoriesFlow};
use aha_core::guard::{Navigator, Route};
use aha_core::session::{AuthStatus, SessionService};
use aha_core::{Fault, Phase};

// ==================================================================
// Contract server
// ==================================================================

const SESSION_COOKIE: &str = "sid=user";
// Path=/ so the jar sends the cookie to every route, not just /user/*.
const SET_SESSION_COOKIE: &str = "sid=user; Path=/";
const CLEAR_SESSION_COOKIE: &str = "sid=; Path=/; Max-Age=0";

struct Backend {
    usernames: Vec<String>,
    categories: Vec<(String, String)>,
    next_category: u32,
}

impl Backend {
    fn new() -> Self {
        Self {
            usernames: vec!["alice".to_string(), "taken".to_string()],
            categories: vec![("cat-1".to_string(), "Rock".to_string())],
            next_category: 2,
        }
    }
}

type Shared = Arc<Mutex<Backend>>;

fn aha_error(status: StatusCode, code: &str, message: &str) -> Response {
    (
        status,
        Json(json!({
            "httpCode": status.as_u16(),
            "code": code,
            "message": message,
        })),
    )
        .into_response()
}

fn has_session(headers: &HeaderMap) -> bool {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|c| c.contains(SESSION_COOKIE))
}

fn require_session(headers: &HeaderMap) -> Result<(), Response> {
    if has_session(headers) {
        Ok(())
    } else {
        Err(aha_error(
            StatusCode::UNAUTHORIZED,
            "AHA-INVALID-OPERATION",
            "not logged in",
        ))
    }
}

async fn check_auth(headers: HeaderMap) -> Response {
    Json(json!({ "auth": has_session(&headers) })).into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    let username = body["username"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    if username == "alice" && password == "secret" {
        (
            [(header::SET_COOKIE, SET_SESSION_COOKIE)],
            Json(json!({ "login": true })),
        )
            .into_response()
    } else {
        aha_error(
            StatusCode::UNAUTHORIZED,
            "AHA-INVALID-LOGIN",
            "invalid username or password",
        )
    }
}

async fn signup(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let username = body["username"].as_str().unwrap_or_default().to_string();
    let mut backend = state.lock().unwrap();
    if backend.usernames.contains(&username) {
        return aha_error(
            StatusCode::CONFLICT,
            "AHA-USERNAME-ALREADY-EXISTS",
            "username already exists",
        );
    }
    if body["password"] != body["confirmPassword"] {
        return aha_error(
            StatusCode::BAD_REQUEST,
            "AHA-SIGNUP-INVALID-PASSWORD",
            "passwords do not match",
        );
    }
    backend.usernames.push(username);
    Json(json!({ "signup": true })).into_response()
}

async fn logout(headers: HeaderMap) -> Response {
    if let Err(denied) = require_session(&headers) {
        return denied;
    }
    (
        [(header::SET_COOKIE, CLEAR_SESSION_COOKIE)],
        Json(json!({})),
    )
        .into_response()
}

async fn change_password(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(denied) = require_session(&headers) {
        return denied;
    }
    if body["newPassword"] != body["confirmNewPassword"] {
        return aha_error(
            StatusCode::BAD_REQUEST,
            "AHA-SIGNUP-INVALID-PASSWORD",
            "passwords do not match",
        );
    }
    Json(json!({ "changePassword": true })).into_response()
}

async fn delete_account(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(denied) = require_session(&headers) {
        return denied;
    }
    if body["password"] != "secret" {
        return aha_error(
            StatusCode::UNAUTHORIZED,
            "AHA-INVALID-OPERATION",
            "wrong password",
        );
    }
    (
        [(header::SET_COOKIE, CLEAR_SESSION_COOKIE)],
        Json(json!({ "deleteAccount": true })),
    )
        .into_response()
}

async fn list_files(headers: HeaderMap) -> Response {
    if let Err(denied) = require_session(&headers) {
        return denied;
    }
    Json(json!({
        "files": [{
            "id": "f1",
            "userId": "u1",
            "description": "first take",
            "path": "/uploads/f1.mp3",
            "status": "uploaded",
            "categories": [],
            "createdAt": "2026-01-01T00:00:00Z",
            "updatedAt": "2026-01-01T00:00:00Z",
        }]
    }))
    .into_response()
}

async fn upload_file(
    State(state): State<Shared>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if let Err(denied) = require_session(&headers) {
        return denied;
    }

    let mut description = String::new();
    let mut category_id = None;
    let mut file_name = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "description" => description = field.text().await.unwrap_or_default(),
            "categoryId" => category_id = Some(field.text().await.unwrap_or_default()),
            "audiofile" => {
                file_name = field.file_name().map(str::to_string);
                let _ = field.bytes().await;
            }
            _ => {}
        }
    }

    let backend = state.lock().unwrap();
    let mut categories = Vec::new();
    if let Some(id) = category_id {
        match backend.categories.iter().find(|(cid, _)| *cid == id) {
            Some((cid, name)) => categories.push(json!({
                "id": cid,
                "name": name,
                "createdAt": "2026-01-01T00:00:00Z",
                "updatedAt": "2026-01-01T00:00:00Z",
            })),
            None => {
                return aha_error(
                    StatusCode::NOT_FOUND,
                    "AHA-CATEGORY-NOT-FOUND",
                    "category not found",
                );
            }
        }
    }

    Json(json!({
        "file": {
            "id": "f2",
            "userId": "u1",
            "description": description,
            "path": format!("/uploads/{}", file_name.unwrap_or_default()),
            "status": "uploaded",
            "categories": categories,
            "createdAt": "2026-01-02T00:00:00Z",
            "updatedAt": "2026-01-02T00:00:00Z",
        }
    }))
    .into_response()
}

async fn list_categories(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if let Err(denied) = require_session(&headers) {
        return denied;
    }
    let backend = state.lock().unwrap();
    let categories: Vec<Value> = backend
        .categories
        .iter()
        .map(|(id, name)| {
            json!({
                "id": id,
                "name": name,
                "createdAt": "2026-01-01T00:00:00Z",
                "updatedAt": "2026-01-01T00:00:00Z",
            })
        })
        .collect();
    Json(json!({ "categories": categories })).into_response()
}

async fn new_category(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(denied) = require_session(&headers) {
        return denied;
    }
    let name = body["name"].as_str().unwrap_or_default().to_string();
    let mut backend = state.lock().unwrap();
    let id = format!("cat-{}", backend.next_category);
    backend.next_category += 1;
    backend.categories.push((id.clone(), name.clone()));
    Json(json!({
        "category": {
            "id": id,
            "name": name,
            "createdAt": "2026-01-03T00:00:00Z",
            "updatedAt": "2026-01-03T00:00:00Z",
        }
    }))
    .into_response()
}

// Test-only endpoints exercising transport edge cases.

async fn no_content() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn plain_failure() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response()
}

async fn echo_query(Query(params): Query<HashMap<String, String>>) -> Response {
    Json(params).into_response()
}

async fn slow(Query(params): Query<HashMap<String, String>>) -> Response {
    let ms: u64 = params
        .get("ms")
        .and_then(|v| v.parse().ok())
        .unwrap_or_default();
    tokio::time::sleep(Duration::from_millis(ms)).await;
    Json(json!({ "tag": params.get("tag").cloned().unwrap_or_default() })).into_response()
}

async fn spawn_backend() -> SocketAddr {
    let state: Shared = Arc::new(Mutex::new(Backend::new()));
    let app = axum::Router::new()
        .route("/user/check-auth", get(check_auth))
        .route("/user/login", post(login))
        .route("/user/signup", post(signup))
        .route("/user/logout", delete(logout))
        .route("/user/change-password", put(change_password))
        .route("/user/delete-account", delete(delete_account))
        .route("/file", get(list_files))
        .route("/file/new", post(upload_file))
        .route("/category", get(list_categories))
        .route("/category/new", post(new_category))
        .route("/empty", get(no_content))
        .route("/plain", get(plain_failure))
        .route("/echo", get(echo_query))
        .route("/slow", get(slow))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    for _ in 0..50 {
        if tokio::net::TcpStream::connect(addr).await.is_ok() {
            return addr;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("contract server never came up");
}

async fn client() -> Api {
    let addr = spawn_backend().await;
    Api::new(AppConfig::new(format!("http://{addr}"))).unwrap()
}

async fn logged_in_client() -> (Api, Arc<SessionService>) {
    let api = client().await;
    let session = Arc::new(SessionService::new());
    LoginFlow::new(&api, session.clone())
        .submit("alice", "secret")
        .await
        .unwrap();
    (api, session)
}

fn sample_file() -> SelectedFile {
    SelectedFile {
        name: "take.mp3".to_string(),
        mime: "audio/mpeg".to_string(),
        bytes: vec![0x49, 0x44, 0x33],
    }
}

// ==================================================================
// Login and session
// ==================================================================

#[tokio::test]
async fn login_success_reaches_the_dashboard() {
    let api = client().await;
    let session = Arc::new(SessionService::new());
    session.initialize(&api.check_auth()).await;
    assert_eq!(session.current(), AuthStatus::LoggedOut);

    let navigator = Navigator::new(session.clone(), Route::Login);
    assert_eq!(navigator.current(), Route::Login);

    let flow = LoginFlow::new(&api, session.clone());
    flow.submit("alice", "secret").await.unwrap();

    assert_eq!(session.current(), AuthStatus::LoggedIn);
    assert_eq!(navigator.current(), Route::Dashboard);
    assert!(flow.controller().succeeded());
    assert_eq!(flow.controller().phase(), Phase::Settled);
}

#[tokio::test]
async fn login_failure_maps_to_wrong_credentials() {
    let api = client().await;
    let session = Arc::new(SessionService::new());
    session.set(AuthStatus::LoggedOut);

    let flow = LoginFlow::new(&api, session.clone());
    let err = flow.submit("alice", "nope").await.unwrap_err();

    assert_eq!(err, LoginError::Invalid);
    assert_eq!(err.message(), "Wrong username or password");
    assert_eq!(session.current(), AuthStatus::LoggedOut);

    let fault = flow.controller().fault().unwrap();
    let backend = fault.backend().unwrap();
    assert_eq!(backend.http_code, 401);
    assert_eq!(backend.code, "AHA-INVALID-LOGIN");
}

#[tokio::test]
async fn session_cookie_survives_across_controllers() {
    let (api, session) = logged_in_client().await;

    let checker = api.check_auth();
    checker.trigger_empty().await;
    let body: AuthStatusBody = checker.result().unwrap();
    assert!(body.auth);

    session.revalidate(&checker).await;
    assert_eq!(session.current(), AuthStatus::LoggedIn);
}

#[tokio::test]
async fn initialize_fails_closed_when_the_backend_is_down() {
    // Bind then drop, so the port is known dead.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = Api::new(AppConfig::new(format!("http://{addr}"))).unwrap();
    let session = Arc::new(SessionService::new());
    session.initialize(&api.check_auth()).await;

    assert_eq!(session.current(), AuthStatus::LoggedOut);
    assert!(session.is_ready());
}

#[tokio::test]
async fn logout_flips_the_session() {
    let (api, session) = logged_in_client().await;

    LogoutFlow::new(&api, session.clone()).submit().await.unwrap();
    assert_eq!(session.current(), AuthStatus::LoggedOut);

    let checker = api.check_auth();
    checker.trigger_empty().await;
    assert!(!checker.result().map(|b| b.auth).unwrap_or(true));
}

// ==================================================================
// Signup and account
// ==================================================================

#[tokio::test]
async fn signup_rejects_a_taken_username() {
    let api = client().await;
    let flow = SignupFlow::new(&api);

    let err = flow.submit("taken", "pw", "pw").await.unwrap_err();
    assert_eq!(err, SignupError::UsernameTaken);
    assert_eq!(
        err.message(),
        "This username is taken, please choose another username"
    );
}

#[tokio::test]
async fn signup_accepts_a_new_username() {
    let api = client().await;
    let flow = SignupFlow::new(&api);
    flow.submit("bob", "pw", "pw").await.unwrap();
    assert!(flow.controller().result().unwrap().signup);
}

#[tokio::test]
async fn delete_account_with_a_wrong_password_keeps_the_session() {
    let (api, session) = logged_in_client().await;
    let flow = DeleteAccountFlow::new(&api, session.clone());

    let err = flow.submit("guess").await.unwrap_err();
    assert_eq!(err, DeleteAccountError::InvalidOperation);
    assert_eq!(session.current(), AuthStatus::LoggedIn);

    flow.submit("secret").await.unwrap();
    assert_eq!(session.current(), AuthStatus::LoggedOut);
}

// ==================================================================
// Files, categories, upload
// ==================================================================

#[tokio::test]
async fn files_load_for_a_logged_in_user() {
    let (api, _session) = logged_in_client().await;
    let files = FilesFlow::new(&api).load().await.unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].description, "first take");
}

#[tokio::test]
async fn files_fail_with_a_backend_fault_when_logged_out() {
    let api = client().await;
    let err = FilesFlow::new(&api).load().await.unwrap_err();
    assert_eq!(err.code(), Some("AHA-INVALID-OPERATION"));
}

#[tokio::test]
async fn categories_load_and_grow() {
    let (api, _session) = logged_in_client().await;

    let before = CategoriesFlow::new(&api).load().await.unwrap();
    assert_eq!(before.len(), 1);

    let added = AddCategoryFlow::new(&api).submit("Jazz").await.unwrap();
    assert_eq!(added.name, "Jazz");

    let after = CategoriesFlow::new(&api).load().await.unwrap();
    assert_eq!(after.len(), 2);
}

#[tokio::test]
async fn upload_returns_the_stored_file() {
    let (api, _session) = logged_in_client().await;
    let form = UploadForm::new(&api);
    form.set_description("live cut");
    form.set_category(Some("cat-1".to_string()));
    form.choose_file(sample_file());

    let file = form.submit().await.unwrap();
    assert_eq!(file.description, "live cut");
    assert_eq!(file.path, "/uploads/take.mp3");
    assert_eq!(file.categories.len(), 1);
    // Only a failed submit starts the form over.
    assert_eq!(form.file_name(), Some("take.mp3".to_string()));
    assert_eq!(form.description(), "live cut");
}

#[tokio::test]
async fn upload_with_an_unknown_category_clears_the_form() {
    let (api, _session) = logged_in_client().await;
    let form = UploadForm::new(&api);
    form.set_description("live cut");
    form.set_category(Some("cat-404".to_string()));
    form.choose_file(sample_file());

    let err = form.submit().await.unwrap_err();
    assert_eq!(err, UploadError::CategoryNotFound);
    assert_eq!(err.message(), "Category not found");

    assert_eq!(form.description(), "");
    assert_eq!(form.file_name(), None);
    // The category selection survives for the retry.
    assert_eq!(form.category_id(), Some("cat-404".to_string()));
}

// ==================================================================
// Transport edge cases
// ==================================================================

#[derive(Debug, Clone, Deserialize)]
struct Tag {
    tag: String,
}

#[tokio::test]
async fn no_content_settles_without_a_result() {
    let api = client().await;
    let controller = aha_core::fetch::Controller::<Tag>::new(
        api.http().clone(),
        api.config().endpoint("/empty"),
        aha_core::Method::Get,
    );
    controller.trigger_empty().await;

    assert!(controller.succeeded());
    assert!(controller.result().is_none());
    assert!(controller.fault().is_none());
}

#[tokio::test]
async fn a_plain_text_error_is_a_transport_fault() {
    let api = client().await;
    let controller = aha_core::fetch::Controller::<Tag>::new(
        api.http().clone(),
        api.config().endpoint("/plain"),
        aha_core::Method::Get,
    );
    controller.trigger_empty().await;

    assert!(!controller.succeeded());
    assert!(matches!(controller.fault(), Some(Fault::Transport(_))));
}

#[tokio::test]
async fn query_parameters_reach_the_server() {
    let api = client().await;
    let controller = aha_core::fetch::Controller::<HashMap<String, String>>::new(
        api.http().clone(),
        api.config().endpoint("/echo"),
        aha_core::Method::Get,
    );
    controller
        .trigger_with_query::<()>(
            None,
            &[("genre".to_string(), "rock".to_string())],
        )
        .await;

    let echoed = controller.result().unwrap();
    assert_eq!(echoed.get("genre").map(String::as_str), Some("rock"));
}

#[tokio::test]
async fn query_parameters_append_to_an_existing_query_string() {
    let api = client().await;
    let controller = aha_core::fetch::Controller::<HashMap<String, String>>::new(
        api.http().clone(),
        format!("{}?fixed=1", api.config().endpoint("/echo")),
        aha_core::Method::Get,
    );
    controller
        .trigger_with_query::<()>(None, &[("genre".to_string(), "rock".to_string())])
        .await;

    // The appended parameter joins the existing query with `&`.
    let echoed = controller.result().unwrap();
    assert_eq!(echoed.get("fixed").map(String::as_str), Some("1"));
    assert_eq!(echoed.get("genre").map(String::as_str), Some("rock"));
}

#[tokio::test]
async fn a_stale_settlement_is_discarded() {
    let api = client().await;
    let controller = aha_core::fetch::Controller::<Tag>::new(
        api.http().clone(),
        api.config().endpoint("/slow"),
        aha_core::Method::Get,
    );

    let slow_params = [
        ("ms".to_string(), "300".to_string()),
        ("tag".to_string(), "first".to_string()),
    ];
    let fast_params = [
        ("ms".to_string(), "0".to_string()),
        ("tag".to_string(), "second".to_string()),
    ];
    let slow = controller.trigger_with_query::<()>(None, &slow_params);
    let fast = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        controller
            .trigger_with_query::<()>(None, &fast_params)
            .await;
    };
    tokio::join!(slow, fast);

    assert_eq!(controller.invocation_count(), 2);
    assert_eq!(controller.result().unwrap().tag, "second");
    assert_eq!(controller.phase(), Phase::Settled);
}

#[tokio::test]
async fn the_latest_of_many_overlapping_triggers_wins() {
    let api = client().await;
    let controller = aha_core::fetch::Controller::<Tag>::new(
        api.http().clone(),
        api.config().endpoint("/slow"),
        aha_core::Method::Get,
    );

    // Earlier invocations settle after later ones; none of their
    // settlements may leak into the state.
    let staggered = |delay: u64, ms: &str, tag: &str| {
        let params = [
            ("ms".to_string(), ms.to_string()),
            ("tag".to_string(), tag.to_string()),
        ];
        let controller = &controller;
        async move {
            tokio::time::sleep(Duration::from_millis(delay)).await;
            controller.trigger_with_query::<()>(None, &params).await;
        }
    };
    tokio::join!(
        staggered(0, "300", "first"),
        staggered(40, "150", "second"),
        staggered(80, "0", "third"),
    );

    assert_eq!(controller.invocation_count(), 3);
    assert_eq!(controller.result().unwrap().tag, "third");
    assert_eq!(controller.phase(), Phase::Settled);
    assert!(controller.succeeded());
}
