use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;

use crate::error::ApiError;
use crate::models::{LoginRequest, LoginResponse, ModuleSummary, UserProfile, WhoAmiResponse};
use crate::navigator::{LOGIN_PATH, NavigatorState};
use crate::navtree::ModuleTreeStore;
use crate::pipeline::{ApiClient, ApiRequest};
use crate::session::SessionStore;

/// AuthApi
///
/// The sign-in and sign-out flows. Login is more than one request: older
/// backend deployments return a bare token, so the profile may have to be
/// hydrated through a fallback chain before the session can be established.
pub struct AuthApi {
    client: Arc<ApiClient>,
    session: Arc<SessionStore>,
    modules: Arc<ModuleTreeStore>,
    navigator: NavigatorState,
}

impl AuthApi {
    pub fn new(
        client: Arc<ApiClient>,
        session: Arc<SessionStore>,
        modules: Arc<ModuleTreeStore>,
        navigator: NavigatorState,
    ) -> Self {
        Self {
            client,
            session,
            modules,
            navigator,
        }
    }

    /// login
    ///
    /// POST /auth/login, then establish the session.
    ///
    /// 1. The response must carry `access_token`; a response without one is a
    ///    decode failure, not a session.
    /// 2. If the response carries the user inline, adopt it (modules default
    ///    to empty).
    /// 3. Otherwise hydrate: GET /users/me with the fresh token; if that
    ///    fails for any reason, GET /auth/whoami (which yields no modules).
    /// 4. Only a fully hydrated result reaches `set_auth`; a login whose
    ///    hydration chain fails entirely leaves the session untouched.
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, ApiError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = self.client.post("/auth/login", &request).await?;

        let (user, modules) = match response.user {
            Some(user) => (user, response.modules),
            None => self.hydrate(&response.access_token).await?,
        };

        self.session
            .set_auth(&response.access_token, Some(user.clone()), modules);
        tracing::info!(user = %user.email, "signed in");
        Ok(user)
    }

    /// hydrate
    ///
    /// Resolves the profile for a token the session has not adopted yet, so
    /// both calls carry the token explicitly instead of relying on the
    /// pipeline's session lookup.
    async fn hydrate(
        &self,
        token: &str,
    ) -> Result<(UserProfile, Vec<ModuleSummary>), ApiError> {
        match self.me_with_token(token).await {
            Ok(result) => Ok(result),
            Err(err) => {
                tracing::debug!(error = %err, "profile hydration via /users/me failed; trying /auth/whoami");
                let request = ApiRequest::new(Method::GET, "/auth/whoami").bearer(token);
                let who: WhoAmiResponse = self.client.send(&request).await?;
                Ok((who.user, Vec::new()))
            }
        }
    }

    /// me_with_token
    ///
    /// GET /users/me with an explicit bearer. Parsed defensively: the current
    /// backend wraps the profile under `user`, but a bare profile object is
    /// accepted too, and a malformed module list degrades to empty rather
    /// than failing the whole login.
    async fn me_with_token(
        &self,
        token: &str,
    ) -> Result<(UserProfile, Vec<ModuleSummary>), ApiError> {
        let request = ApiRequest::new(Method::GET, "/users/me").bearer(token);
        let (_status, body) = self.client.execute(&request).await?;

        let user_value = match body.get("user") {
            Some(user) if !user.is_null() => user.clone(),
            _ => body.clone(),
        };
        let user: UserProfile =
            serde_json::from_value(user_value).map_err(|source| ApiError::Decode {
                context: "decoding profile from /users/me",
                source,
            })?;

        let modules = body
            .get("modules")
            .and_then(|value| serde_json::from_value(value.clone()).ok())
            .unwrap_or_default();

        Ok((user, modules))
    }

    /// whoami
    ///
    /// GET /auth/whoami with the session's own token.
    pub async fn whoami(&self) -> Result<UserProfile, ApiError> {
        let response: WhoAmiResponse = self.client.get("/auth/whoami").await?;
        Ok(response.user)
    }

    /// logout
    ///
    /// Ends the session. The server is told first (POST /auth/logout), but a
    /// failing or unreachable server never blocks local sign-out: the session
    /// and tree state are cleared and the user lands on the login path
    /// regardless.
    pub async fn logout(&self) {
        let request = ApiRequest::new(Method::POST, "/auth/logout");
        if let Err(err) = self.client.send::<Value>(&request).await {
            tracing::warn!(error = %err, "logout request failed; clearing the session anyway");
        }

        self.session.clear_auth();
        self.modules.reset();
        self.navigator.replace(LOGIN_PATH);
        tracing::info!("signed out");
    }
}
