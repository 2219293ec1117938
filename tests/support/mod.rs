// Shared test backend: an axum router standing in for the ERP API, plus
// helpers to assemble a shell pointed at it. Every handler records the request
// it saw, so tests assert on what actually went over the wire.
//
// Not every test binary uses every helper.
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::Notify;

use portal_shell::{AppShell, InProcessNavigator, ShellConfig, views};

pub const TEST_TOKEN: &str = "test-token-1";
pub const DEMO_EMAIL: &str = "amina@example.com";
pub const DEMO_PASSWORD: &str = "s3cret-pass";

/// One request as the backend saw it.
#[derive(Debug, Clone)]
pub struct Captured {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub accept_language: Option<String>,
    pub request_id: Option<String>,
    pub content_type: Option<String>,
    pub body: Option<Value>,
}

#[derive(Default)]
pub struct BackendState {
    pub captured: Mutex<Vec<Captured>>,
    // /auth/login embeds the user and modules in its response when set.
    inline_login_user: AtomicBool,
    // /auth/login answers 200 without an access_token.
    omit_login_token: AtomicBool,
    // /users/me serves the bare profile instead of the {"user": ...} wrapper.
    bare_me_profile: AtomicBool,
    // Non-zero values override the happy-path status of the endpoint.
    me_status: AtomicU16,
    whoami_status: AtomicU16,
    logout_status: AtomicU16,
    tree_status: AtomicU16,
    // /probe/pause blocks until released; lets tests observe in-flight state.
    pause_gate: Notify,
}

pub struct TestBackend {
    pub address: String,
    pub state: Arc<BackendState>,
}

impl TestBackend {
    pub fn captured(&self) -> Vec<Captured> {
        self.state.captured.lock().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<Captured> {
        self.captured()
            .into_iter()
            .filter(|c| c.path == path)
            .collect()
    }

    pub fn last_request(&self, path: &str) -> Captured {
        self.requests_to(path)
            .pop()
            .unwrap_or_else(|| panic!("no request to {path} was captured"))
    }

    pub fn inline_login(&self, on: bool) {
        self.state.inline_login_user.store(on, Ordering::SeqCst);
    }

    pub fn omit_login_token(&self, on: bool) {
        self.state.omit_login_token.store(on, Ordering::SeqCst);
    }

    pub fn bare_me(&self, on: bool) {
        self.state.bare_me_profile.store(on, Ordering::SeqCst);
    }

    pub fn set_me_status(&self, status: u16) {
        self.state.me_status.store(status, Ordering::SeqCst);
    }

    pub fn set_whoami_status(&self, status: u16) {
        self.state.whoami_status.store(status, Ordering::SeqCst);
    }

    pub fn set_logout_status(&self, status: u16) {
        self.state.logout_status.store(status, Ordering::SeqCst);
    }

    pub fn set_tree_status(&self, status: u16) {
        self.state.tree_status.store(status, Ordering::SeqCst);
    }

    pub fn release_paused(&self) {
        self.state.pause_gate.notify_one();
    }
}

pub async fn spawn_backend() -> TestBackend {
    let state = Arc::new(BackendState::default());
    let router = backend_router(Arc::clone(&state));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestBackend { address, state }
}

// --- Shell Assembly Helpers ---

pub fn shell_config(backend: &TestBackend) -> ShellConfig {
    let mut config = ShellConfig::default();
    config.api_base = backend.address.clone();
    config
}

pub fn build_shell(backend: &TestBackend) -> (AppShell, Arc<InProcessNavigator>) {
    build_shell_from(shell_config(backend))
}

pub fn build_shell_from(config: ShellConfig) -> (AppShell, Arc<InProcessNavigator>) {
    let nav = Arc::new(InProcessNavigator::default());
    let shell = AppShell::with_parts(config, nav.clone(), views::default_registry())
        .expect("Failed to assemble test shell");
    (shell, nav)
}

/// Signs the demo user in via the inline-login path, the shortest route to an
/// authenticated shell.
pub async fn sign_in(backend: &TestBackend, shell: &AppShell) {
    backend.inline_login(true);
    shell
        .auth()
        .login(DEMO_EMAIL, DEMO_PASSWORD)
        .await
        .expect("demo sign-in failed");
}

// --- Fixtures ---

pub fn demo_user() -> Value {
    json!({
        "id": 7,
        "email": DEMO_EMAIL,
        "first_name": "Amina",
        "last_name": "Haddad",
        "is_active": true,
        "role_code": "admin"
    })
}

pub fn demo_modules() -> Value {
    json!([
        {"code": "users", "name_en": "Users"},
        {"code": "hr", "name_en": "HR"}
    ])
}

/// Tree payload exercising the sloppier shapes the real endpoint produces:
/// mixed-case codes, numeric lock flags, a stringly sort weight, and a null
/// display name falling through to `name_en`.
pub fn demo_tree() -> Value {
    json!({"modules": [
        {
            "id": 1, "code": "USERS", "name": "Users", "name_en": "Users",
            "icon": "People", "sort_order": 1, "is_locked": false,
            "tabs": [
                {"id": 10, "code": "users", "name": "Users", "sort_order": 1, "sections": []}
            ]
        },
        {
            "id": 2, "code": "hr", "name": null, "name_en": "Human Resources",
            "icon": "Badge", "sort_order": "2", "is_locked": 0,
            "tabs": [
                {"id": 20, "code": "employees", "name": "Employees", "sort_order": 1},
                {
                    "id": 21, "code": "payroll", "name": "Payroll", "sort_order": 2,
                    "is_locked": 1,
                    "sections": [{"code": "RUNS", "name_en": "Runs"}]
                }
            ]
        }
    ]})
}

pub fn users_page() -> Value {
    json!({
        "items": [
            demo_user(),
            {
                "id": 8,
                "email": "omar@example.com",
                "first_name": "Omar",
                "last_name": "Nasser",
                "is_active": false,
                "role_code": "employee"
            }
        ],
        "page": 1, "size": 50, "total": 2, "pages": 1
    })
}

pub fn employees_page() -> Value {
    json!({
        "items": [
            {
                "id": 101, "code": "EMP-101", "first_name": "Sara", "last_name": "Aziz",
                "email": "sara@example.com", "phone": null, "position": "Accountant",
                "branch_id": 3, "is_active": true, "hire_date": "2023-05-01",
                "termination_date": null, "salary_monthly": "8500.00",
                "nationality": "SA", "dob": "1992-11-03", "meta": {},
                "created_at": "2023-05-01T08:00:00", "updated_at": "2024-01-15T10:30:00"
            },
            {
                "id": 102, "code": null, "first_name": "Karim", "last_name": "Fahd",
                "email": null, "phone": null, "position": null, "branch_id": null,
                "is_active": false, "hire_date": null, "termination_date": null,
                "salary_monthly": null, "nationality": null, "dob": null, "meta": null,
                "created_at": null, "updated_at": null
            }
        ],
        "page": 1, "size": 50, "total": 2, "pages": 1
    })
}

pub fn employee_row(id: i64) -> Value {
    let mut row = employees_page()["items"][0].clone();
    row["id"] = json!(id);
    row
}

pub fn issue_row(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "created_at": "2026-02-11T08:30:00Z",
        "status": status,
        "method": "POST",
        "url": "/hr/employees",
        "http_status": 500,
        "note": null,
        "pr_url": null
    })
}

fn module_row(code: &str) -> Value {
    json!({
        "code": code,
        "name_en": "Module",
        "name_ar": null,
        "is_active": true,
        "is_locked": false,
        "sort_order": 0
    })
}

fn tab_row(module_code: &str, code: &str) -> Value {
    json!({
        "module_code": module_code,
        "code": code,
        "name_en": "Tab",
        "name_ar": null,
        "is_active": true,
        "is_locked": false,
        "sort_order": 0
    })
}

// --- The Router ---

fn backend_router(state: Arc<BackendState>) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/whoami", get(whoami))
        .route("/auth/logout", post(logout))
        .route("/users/me", get(me))
        .route("/users/", get(list_users))
        .route("/hr/employees", get(list_employees).post(create_employee))
        .route(
            "/hr/employees/{id}",
            get(get_employee).patch(update_employee).delete(delete_employee),
        )
        .route("/admin/modules/tree", get(module_tree))
        .route("/admin/modules", get(list_modules).post(create_module))
        .route("/admin/modules/{code}", put(update_module))
        .route("/admin/modules/{code}/tabs", get(list_tabs).post(create_tab))
        .route("/admin/modules/{code}/tabs/{tab}", put(update_tab))
        .route("/admin/issues", get(list_issues).post(create_issue))
        .route("/admin/issues/{id}", get(get_issue).patch(update_issue))
        .route("/probe/boom", get(boom).post(boom))
        .route("/probe/teapot", get(teapot))
        .route("/probe/expired", get(expired))
        .route("/probe/invalid", post(invalid))
        .route("/probe/plain", get(plain))
        .route("/probe/empty", get(empty))
        .route("/probe/slow", get(slow))
        .route("/probe/pause", get(pause))
        .with_state(state)
}

/// Pushes the request into the capture log and hands back its parsed body.
fn record(
    state: &BackendState,
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    body: &[u8],
) -> Value {
    let parsed: Option<Value> = if body.is_empty() {
        None
    } else {
        serde_json::from_slice(body).ok()
    };

    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    state.captured.lock().push(Captured {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: header_value("authorization"),
        accept_language: header_value("accept-language"),
        request_id: header_value("x-request-id"),
        content_type: header_value("content-type"),
        body: parsed.clone(),
    });

    parsed.unwrap_or(Value::Null)
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"message": message}))).into_response()
}

fn override_status(slot: &AtomicU16) -> Option<StatusCode> {
    match slot.load(Ordering::SeqCst) {
        0 => None,
        code => Some(StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)),
    }
}

fn bearer_ok(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {TEST_TOKEN}"))
        .unwrap_or(false)
}

// --- Handlers ---

async fn login(
    State(state): State<Arc<BackendState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let creds = record(&state, &method, &uri, &headers, &body);

    let field = |key: &str| creds.get(key).and_then(Value::as_str);
    if field("email") != Some(DEMO_EMAIL) || field("password") != Some(DEMO_PASSWORD) {
        return error_response(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }

    if state.omit_login_token.load(Ordering::SeqCst) {
        return Json(json!({"user": demo_user()})).into_response();
    }

    let mut payload = json!({"access_token": TEST_TOKEN});
    if state.inline_login_user.load(Ordering::SeqCst) {
        payload["user"] = demo_user();
        payload["modules"] = demo_modules();
    }
    Json(payload).into_response()
}

async fn me(
    State(state): State<Arc<BackendState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&state, &method, &uri, &headers, &body);
    if !bearer_ok(&headers) {
        return error_response(StatusCode::UNAUTHORIZED, "Missing Authorization Header");
    }
    if let Some(status) = override_status(&state.me_status) {
        return error_response(status, "profile endpoint unavailable");
    }
    if state.bare_me_profile.load(Ordering::SeqCst) {
        return Json(demo_user()).into_response();
    }
    Json(json!({"user": demo_user(), "modules": demo_modules()})).into_response()
}

async fn whoami(
    State(state): State<Arc<BackendState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&state, &method, &uri, &headers, &body);
    if !bearer_ok(&headers) {
        return error_response(StatusCode::UNAUTHORIZED, "Missing Authorization Header");
    }
    if let Some(status) = override_status(&state.whoami_status) {
        return error_response(status, "identity service down");
    }
    Json(json!({"user": demo_user()})).into_response()
}

async fn logout(
    State(state): State<Arc<BackendState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&state, &method, &uri, &headers, &body);
    if let Some(status) = override_status(&state.logout_status) {
        return error_response(status, "session backend down");
    }
    Json(json!({"message": "Signed out"})).into_response()
}

async fn list_users(
    State(state): State<Arc<BackendState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&state, &method, &uri, &headers, &body);
    if !bearer_ok(&headers) {
        return error_response(StatusCode::UNAUTHORIZED, "Missing Authorization Header");
    }
    Json(users_page()).into_response()
}

async fn list_employees(
    State(state): State<Arc<BackendState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&state, &method, &uri, &headers, &body);
    if !bearer_ok(&headers) {
        return error_response(StatusCode::UNAUTHORIZED, "Missing Authorization Header");
    }
    Json(employees_page()).into_response()
}

async fn create_employee(
    State(state): State<Arc<BackendState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&state, &method, &uri, &headers, &body);
    (StatusCode::CREATED, Json(employee_row(103))).into_response()
}

async fn get_employee(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<i64>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&state, &method, &uri, &headers, &body);
    Json(employee_row(id)).into_response()
}

async fn update_employee(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<i64>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&state, &method, &uri, &headers, &body);
    Json(employee_row(id)).into_response()
}

async fn delete_employee(
    State(state): State<Arc<BackendState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&state, &method, &uri, &headers, &body);
    Json(json!({"deleted": true})).into_response()
}

async fn module_tree(
    State(state): State<Arc<BackendState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&state, &method, &uri, &headers, &body);
    if !bearer_ok(&headers) {
        return error_response(StatusCode::UNAUTHORIZED, "Missing Authorization Header");
    }
    if let Some(status) = override_status(&state.tree_status) {
        return error_response(status, "tree unavailable");
    }
    Json(demo_tree()).into_response()
}

async fn list_modules(
    State(state): State<Arc<BackendState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&state, &method, &uri, &headers, &body);
    Json(json!([module_row("users"), module_row("hr")])).into_response()
}

async fn create_module(
    State(state): State<Arc<BackendState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let payload = record(&state, &method, &uri, &headers, &body);
    let code = payload.get("code").and_then(Value::as_str).unwrap_or("new");
    (StatusCode::CREATED, Json(module_row(code))).into_response()
}

async fn update_module(
    State(state): State<Arc<BackendState>>,
    Path(code): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&state, &method, &uri, &headers, &body);
    Json(module_row(&code)).into_response()
}

async fn list_tabs(
    State(state): State<Arc<BackendState>>,
    Path(code): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&state, &method, &uri, &headers, &body);
    Json(json!([tab_row(&code, "index")])).into_response()
}

async fn create_tab(
    State(state): State<Arc<BackendState>>,
    Path(code): Path<String>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let payload = record(&state, &method, &uri, &headers, &body);
    let tab = payload.get("code").and_then(Value::as_str).unwrap_or("new");
    (StatusCode::CREATED, Json(tab_row(&code, tab))).into_response()
}

async fn update_tab(
    State(state): State<Arc<BackendState>>,
    Path((code, tab)): Path<(String, String)>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&state, &method, &uri, &headers, &body);
    Json(tab_row(&code, &tab)).into_response()
}

async fn list_issues(
    State(state): State<Arc<BackendState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&state, &method, &uri, &headers, &body);
    Json(json!({
        "items": [issue_row(41, "open")],
        "page": 1, "per_page": 20, "total": 1
    }))
    .into_response()
}

async fn create_issue(
    State(state): State<Arc<BackendState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&state, &method, &uri, &headers, &body);
    (
        StatusCode::CREATED,
        Json(json!({"id": 41, "created_at": "2026-02-11T08:30:00Z"})),
    )
        .into_response()
}

async fn get_issue(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<i64>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&state, &method, &uri, &headers, &body);
    let mut detail = issue_row(id, "open");
    detail["request"] = json!({"password": "***"});
    detail["response"] = json!({"message": "exploded"});
    detail["headers"] = json!({"x-request-id": "abc"});
    Json(detail).into_response()
}

async fn update_issue(
    State(state): State<Arc<BackendState>>,
    Path(id): Path<i64>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let payload = record(&state, &method, &uri, &headers, &body);
    let status = payload
        .get("status")
        .and_then(Value::as_str)
        .unwrap_or("open")
        .to_string();
    Json(issue_row(id, &status)).into_response()
}

// --- Transport Probes ---

async fn boom(
    State(state): State<Arc<BackendState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&state, &method, &uri, &headers, &body);
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "exploded")
}

async fn teapot(
    State(state): State<Arc<BackendState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&state, &method, &uri, &headers, &body);
    error_response(StatusCode::IM_A_TEAPOT, "I refuse")
}

async fn expired(
    State(state): State<Arc<BackendState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&state, &method, &uri, &headers, &body);
    error_response(StatusCode::UNAUTHORIZED, "Token has expired")
}

async fn invalid(
    State(state): State<Arc<BackendState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&state, &method, &uri, &headers, &body);
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Signature verification failed",
    )
}

async fn plain(
    State(state): State<Arc<BackendState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&state, &method, &uri, &headers, &body);
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain")],
        "plain text body",
    )
        .into_response()
}

async fn empty(
    State(state): State<Arc<BackendState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&state, &method, &uri, &headers, &body);
    StatusCode::NO_CONTENT.into_response()
}

async fn slow(
    State(state): State<Arc<BackendState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&state, &method, &uri, &headers, &body);
    tokio::time::sleep(std::time::Duration::from_secs(5)).await;
    Json(json!({"late": true})).into_response()
}

async fn pause(
    State(state): State<Arc<BackendState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    record(&state, &method, &uri, &headers, &body);
    state.pause_gate.notified().await;
    Json(json!({"released": true})).into_response()
}
