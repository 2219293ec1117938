use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use crate::config::ShellConfig;
use crate::error::{ApiError, extract_message};
use crate::loading::LoadingGauge;
use crate::navigator::{LOGIN_PATH, NavigatorState};
use crate::prefs::PreferenceStore;
use crate::report::{ReportBus, ServerErrorReport, redact_body};
use crate::session::SessionStore;

/// ApiRequest
///
/// One request *instance*: method, path, query, body, plus the identity that
/// distinguishes an instance from an attempt. Callers may execute the same
/// instance several times (their own retry policy; the shell has none), and
/// both the request id and the reported-once marker belong to the instance,
/// not to any single attempt.
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
    // Overrides the session token for this instance. Login hydration uses it
    // to authenticate with a token the session has not adopted yet.
    bearer: Option<String>,
    request_id: Uuid,
    // Set by the first 5xx classification; later attempts stay silent.
    reported: AtomicBool,
}

impl ApiRequest {
    /// new
    ///
    /// `path` is relative to the configured API base and starts with `/`.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            bearer: None,
            request_id: Uuid::new_v4(),
            reported: AtomicBool::new(false),
        }
    }

    /// query
    ///
    /// Appends URL query pairs. Chainable.
    pub fn query(mut self, pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    /// body
    ///
    /// Attaches a JSON body. Chainable.
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// bearer
    ///
    /// Authenticates this instance with an explicit token instead of the
    /// session's. Chainable.
    pub fn bearer(mut self, token: &str) -> Self {
        self.bearer = Some(token.to_string());
        self
    }

    /// request_id
    ///
    /// The correlation id stamped into the `x-request-id` header on every
    /// attempt of this instance.
    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// first_report
    ///
    /// True exactly once per instance: the caller that wins gets to emit the
    /// server-error report.
    fn first_report(&self) -> bool {
        !self.reported.swap(true, Ordering::SeqCst)
    }
}

/// ApiClient
///
/// The request pipeline. Wraps a `reqwest::Client` and weaves every request
/// through the shell's cross-cutting services:
///
/// 1. the loading gauge counts the attempt in and out,
/// 2. outbound headers are injected (bearer token, Accept-Language, request id),
/// 3. the response is classified in a fixed order, with the 5xx report
///    emission and the 401/422 sign-out handling as side effects.
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
    locale_fallback: String,
    session: Arc<SessionStore>,
    prefs: Arc<PreferenceStore>,
    gauge: Arc<LoadingGauge>,
    reports: Arc<ReportBus>,
    navigator: NavigatorState,
}

impl ApiClient {
    /// new
    ///
    /// Builds the underlying HTTP client with the configured timeout. Fails
    /// only if the TLS backend cannot initialize.
    pub fn new(
        config: &ShellConfig,
        session: Arc<SessionStore>,
        prefs: Arc<PreferenceStore>,
        gauge: Arc<LoadingGauge>,
        reports: Arc<ReportBus>,
        navigator: NavigatorState,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base: normalize_base(&config.api_base),
            locale_fallback: config.locale.clone(),
            session,
            prefs,
            gauge,
            reports,
            navigator,
        })
    }

    /// execute
    ///
    /// Runs one attempt of a request instance and returns the status plus the
    /// body as JSON (raw text wrapped in a JSON string when the body is not
    /// JSON, `null` when empty). All classification side effects happen in
    /// here; callers see only the typed error.
    pub async fn execute(&self, req: &ApiRequest) -> Result<(StatusCode, Value), ApiError> {
        // 1. Count the attempt in; the guard counts it out on every exit path.
        let _guard = self.gauge.begin_scoped();

        let url = format!("{}{}", self.base, req.path);

        // 2. Header injection. The map doubles as the header record carried by
        //    an eventual server-error report.
        let mut headers = BTreeMap::new();

        let mut builder = self.http.request(req.method.clone(), &url);
        if !req.query.is_empty() {
            builder = builder.query(&req.query);
        }

        // The session token is consulted per attempt, never cached: a request
        // built before login still authenticates if executed after it. An
        // instance-level override wins over the session.
        if let Some(token) = req.bearer.clone().or_else(|| self.session.token()) {
            headers.insert("authorization".to_string(), format!("Bearer {token}"));
            builder = builder.bearer_auth(token);
        }

        let mut lang = self.prefs.lang();
        if lang.is_empty() {
            lang = self.locale_fallback.clone();
        }
        headers.insert("accept-language".to_string(), lang.clone());
        builder = builder.header("Accept-Language", lang);

        let request_id = req.request_id.to_string();
        headers.insert("x-request-id".to_string(), request_id.clone());
        builder = builder.header("x-request-id", request_id);

        if let Some(body) = &req.body {
            headers.insert("content-type".to_string(), "application/json".to_string());
            builder = builder.json(body);
        }

        tracing::debug!(
            method = %req.method,
            path = %req.path,
            req_id = %req.request_id,
            "sending request"
        );

        // 3. Send. Transport failures skip classification entirely.
        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        let body_value = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        // 4. Classification, strictly in this order.
        if status.is_success() {
            return Ok((status, body_value));
        }

        let message = extract_message(status, &body_value);

        if status.is_server_error() {
            if req.first_report() {
                let report = ServerErrorReport {
                    url: req.path.clone(),
                    method: req.method.as_str().to_string(),
                    status: status.as_u16(),
                    request_data: req.body.as_ref().and_then(redact_body),
                    response_data: (body_value != Value::Null).then(|| body_value.clone()),
                    headers,
                };
                self.reports.emit(report);
            }
            tracing::error!(
                status = status.as_u16(),
                path = %req.path,
                req_id = %req.request_id,
                "server error"
            );
            return Err(ApiError::Server {
                status: status.as_u16(),
                message,
            });
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::UNPROCESSABLE_ENTITY {
            // No side effects while already on the login screen; the login
            // form's own failures must not clear state or loop the redirect.
            if self.navigator.current_path() != LOGIN_PATH {
                tracing::warn!(
                    status = status.as_u16(),
                    path = %req.path,
                    "auth failure; clearing session"
                );
                self.session.clear_auth();
                self.navigator.replace(LOGIN_PATH);
            }
            return Err(ApiError::Auth {
                status: status.as_u16(),
                message,
            });
        }

        tracing::debug!(status = status.as_u16(), path = %req.path, "request failed");
        Err(ApiError::Client {
            status: status.as_u16(),
            message,
        })
    }

    /// send
    ///
    /// Executes one attempt and decodes the body into `T`.
    pub async fn send<T: DeserializeOwned>(&self, req: &ApiRequest) -> Result<T, ApiError> {
        let (_status, body) = self.execute(req).await?;
        serde_json::from_value(body).map_err(|source| ApiError::Decode {
            context: "decoding response body",
            source,
        })
    }

    // --- One-Shot Conveniences ---

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(&ApiRequest::new(Method::GET, path)).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<T, ApiError> {
        self.send(&ApiRequest::new(Method::GET, path).query(query))
            .await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        let body = encode_body(body)?;
        self.send(&ApiRequest::new(Method::POST, path).body(body))
            .await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        let body = encode_body(body)?;
        self.send(&ApiRequest::new(Method::PUT, path).body(body))
            .await
    }

    pub async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> Result<T, ApiError> {
        let body = encode_body(body)?;
        self.send(&ApiRequest::new(Method::PATCH, path).body(body))
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(&ApiRequest::new(Method::DELETE, path)).await
    }
}

/// normalize_base
///
/// Strips trailing slashes so base + path concatenation yields exactly one
/// separator regardless of how the base was configured.
fn normalize_base(base: &str) -> String {
    base.trim_end_matches('/').to_string()
}

fn encode_body(body: &impl Serialize) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|source| ApiError::Decode {
        context: "encoding request body",
        source,
    })
}
