use std::sync::Arc;

use crate::error::ApiError;
use crate::models::{
    AppModuleRow, ClientContext, IssueAck, IssueDetail, IssuePage, IssuePatch, IssueReport,
    IssueStatus, IssueSummary, ModuleCreate, ModuleUpdate, TabCreate, TabRow, TabUpdate,
};
use crate::navigator::NavigatorState;
use crate::pipeline::ApiClient;
use crate::prefs::PreferenceStore;
use crate::report::ServerErrorReport;
use crate::session::SessionStore;

// Client identifier sent with escalated issues, in place of a browser UA.
const CLIENT_UA: &str = concat!("portal-shell/", env!("CARGO_PKG_VERSION"));

/// AdminApi
///
/// Module and tab administration plus the issue tracker. Issue escalation
/// needs to say who reported from where, so this facade also holds the
/// session, preference, and navigator handles.
pub struct AdminApi {
    client: Arc<ApiClient>,
    session: Arc<SessionStore>,
    prefs: Arc<PreferenceStore>,
    navigator: NavigatorState,
}

impl AdminApi {
    pub fn new(
        client: Arc<ApiClient>,
        session: Arc<SessionStore>,
        prefs: Arc<PreferenceStore>,
        navigator: NavigatorState,
    ) -> Self {
        Self {
            client,
            session,
            prefs,
            navigator,
        }
    }

    // --- Modules ---

    /// list_modules
    ///
    /// GET /admin/modules: the flat management view, ordered by code.
    pub async fn list_modules(&self) -> Result<Vec<AppModuleRow>, ApiError> {
        self.client.get("/admin/modules").await
    }

    /// create_module
    ///
    /// POST /admin/modules.
    pub async fn create_module(&self, module: &ModuleCreate) -> Result<AppModuleRow, ApiError> {
        self.client.post("/admin/modules", module).await
    }

    /// update_module
    ///
    /// PUT /admin/modules/{code}. Partial: only the fields present in the
    /// patch change.
    pub async fn update_module(
        &self,
        code: &str,
        patch: &ModuleUpdate,
    ) -> Result<AppModuleRow, ApiError> {
        self.client
            .put(&format!("/admin/modules/{code}"), patch)
            .await
    }

    // --- Tabs ---

    /// list_tabs
    ///
    /// GET /admin/modules/{code}/tabs, ordered by sort weight then code.
    pub async fn list_tabs(&self, module_code: &str) -> Result<Vec<TabRow>, ApiError> {
        self.client
            .get(&format!("/admin/modules/{module_code}/tabs"))
            .await
    }

    /// create_tab
    ///
    /// POST /admin/modules/{code}/tabs.
    pub async fn create_tab(&self, module_code: &str, tab: &TabCreate) -> Result<TabRow, ApiError> {
        self.client
            .post(&format!("/admin/modules/{module_code}/tabs"), tab)
            .await
    }

    /// update_tab
    ///
    /// PUT /admin/modules/{code}/tabs/{tab_code}. Partial.
    pub async fn update_tab(
        &self,
        module_code: &str,
        tab_code: &str,
        patch: &TabUpdate,
    ) -> Result<TabRow, ApiError> {
        self.client
            .put(
                &format!("/admin/modules/{module_code}/tabs/{tab_code}"),
                patch,
            )
            .await
    }

    // --- Issues ---

    /// report_issue
    ///
    /// POST /admin/issues: escalates a captured server error into the
    /// tracker. The payload couples the report with the reporter's current
    /// context (who, route, locale) and an optional note; a blank note is
    /// sent as null.
    pub async fn report_issue(
        &self,
        report: &ServerErrorReport,
        note: Option<&str>,
    ) -> Result<IssueAck, ApiError> {
        let user = self.session.user();
        let context = ClientContext {
            user_id: user.as_ref().map(|u| u.id),
            user_email: user.as_ref().map(|u| u.email.clone()),
            user_name: user.as_ref().map(|u| u.display_name()),
            route: self.navigator.current_path(),
            locale: self.prefs.lang(),
            ua: CLIENT_UA.to_string(),
        };

        let payload = IssueReport {
            method: report.method.clone(),
            url: report.url.clone(),
            status: report.status,
            note: note
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            client: context,
            request: report.request_data.clone(),
            response: report.response_data.clone(),
            headers: serde_json::to_value(&report.headers).ok(),
        };

        self.client.post("/admin/issues", &payload).await
    }

    /// list_issues
    ///
    /// GET /admin/issues, newest first, optionally filtered by workflow
    /// status. This endpoint still paginates with `per_page`.
    pub async fn list_issues(
        &self,
        status: Option<IssueStatus>,
        page: u32,
        per_page: u32,
    ) -> Result<IssuePage, ApiError> {
        let mut query = vec![
            ("page".to_string(), page.to_string()),
            ("per_page".to_string(), per_page.to_string()),
        ];
        if let Some(status) = status {
            let value = serde_json::to_value(status).map_err(|source| ApiError::Decode {
                context: "encoding issue status filter",
                source,
            })?;
            if let Some(s) = value.as_str() {
                query.push(("status".to_string(), s.to_string()));
            }
        }
        self.client.get_with_query("/admin/issues", query).await
    }

    /// get_issue
    ///
    /// GET /admin/issues/{id}: the summary plus the captured payloads.
    pub async fn get_issue(&self, id: i64) -> Result<IssueDetail, ApiError> {
        self.client.get(&format!("/admin/issues/{id}")).await
    }

    /// update_issue
    ///
    /// PATCH /admin/issues/{id}: move it through the workflow, attach a fix
    /// PR, or annotate it.
    pub async fn update_issue(
        &self,
        id: i64,
        patch: &IssuePatch,
    ) -> Result<IssueSummary, ApiError> {
        self.client
            .patch(&format!("/admin/issues/{id}"), patch)
            .await
    }
}
