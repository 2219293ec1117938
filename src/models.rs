use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// --- Identity Schemas ---

/// UserProfile
///
/// The signed-in user's identity record as the backend serializes it. Resolved
/// during login (either inline in the login response or through the hydration
/// fallbacks) and consumed by UI chrome for display.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    // Some endpoints omit the activation flag; absent means unknown, not inactive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_code: Option<String>,
}

impl UserProfile {
    /// display_name
    ///
    /// "First Last" with surrounding whitespace collapsed; falls back to the
    /// email address when both name parts are blank.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_string()
        }
    }

    /// initials
    ///
    /// Uppercased first letters of the name parts, for avatar badges. Falls back
    /// to the first letter of the email when no name is available.
    pub fn initials(&self) -> String {
        let mut out: String = [&self.first_name, &self.last_name]
            .iter()
            .filter_map(|part| part.trim().chars().next())
            .flat_map(char::to_uppercase)
            .collect();
        if out.is_empty() {
            out = self
                .email
                .chars()
                .next()
                .map(|c| c.to_uppercase().collect())
                .unwrap_or_default();
        }
        out
    }
}

/// ModuleSummary
///
/// The compact module list returned alongside the login payload. Distinct from
/// the full navigation tree, which is fetched separately after sign-in.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ModuleSummary {
    pub code: String,
    pub name_en: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_ar: Option<String>,
}

// --- Auth Payloads ---

/// LoginRequest
///
/// Input payload for POST /auth/login. The password travels straight to the
/// backend and is never persisted or logged by the shell (request-body
/// redaction masks it in error reports).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// LoginResponse
///
/// Output of POST /auth/login. `access_token` is mandatory; `user` and
/// `modules` are best-effort and drive the hydration fallback chain when
/// absent.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modules: Vec<ModuleSummary>,
}

/// WhoAmiResponse
///
/// Output of GET /auth/whoami, the last resort of the login hydration chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhoAmiResponse {
    pub user: UserProfile,
}

/// MeResponse
///
/// Output of GET /users/me: the profile plus the module summary derived from
/// the caller's permissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    pub user: UserProfile,
    #[serde(default)]
    pub modules: Vec<ModuleSummary>,
}

// --- Navigation Tree Schemas ---

/// ModuleNode
///
/// One business area in the normalized navigation tree. Codes are lowercased on
/// ingestion; the order of modules (and of their tabs and sections) is exactly
/// the server's order and must never be re-sorted client-side.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ModuleNode {
    pub code: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<f64>,
    pub is_locked: bool,
    pub tabs: Vec<TabNode>,
}

/// TabNode
///
/// A sub-view inside a module. `sections` distinguishes "none sent" (`None`)
/// from "sent but empty" (`Some(vec![])`).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TabNode {
    pub code: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<f64>,
    pub is_locked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<SectionNode>>,
}

/// SectionNode
///
/// Optional third navigation level under a tab.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SectionNode {
    pub code: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<f64>,
}

/// ModuleIcon
///
/// The enumerated icon vocabulary the shell recognizes. The backend sends icon
/// names as free-form strings; anything outside this table renders as the
/// `Settings` fallback instead of being looked up dynamically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModuleIcon {
    People,
    Badge,
    Dashboard,
    Settings,
}

impl ModuleIcon {
    /// resolve
    ///
    /// Maps a server-sent icon name onto the enumerated vocabulary. The name is
    /// stripped of anything outside `[A-Za-z0-9_]` first, matching how the
    /// portal historically cleaned these values. Unknown or missing names
    /// resolve to `Settings`.
    pub fn resolve(name: Option<&str>) -> Self {
        let key: String = name
            .unwrap_or("")
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();
        match key.as_str() {
            "People" => Self::People,
            "Badge" => Self::Badge,
            "Dashboard" => Self::Dashboard,
            _ => Self::Settings,
        }
    }
}

// --- List Envelopes & Queries ---

/// Page
///
/// The standard paginated list envelope (`/users/`, `/hr/employees`).
/// `page` is 1-based; `pages` is the server-computed ceiling.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total: u64,
    pub pages: u32,
}

/// IssuePage
///
/// The issue tracker predates the standard envelope and still paginates with
/// `per_page` instead of `size` (and carries no `pages` field).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IssuePage {
    pub items: Vec<IssueSummary>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
}

/// ListQuery
///
/// Common query parameters for paginated endpoints. `page` is 1-based.
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub page: u32,
    pub size: u32,
    pub q: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            size: 50,
            q: None,
        }
    }
}

impl ListQuery {
    /// to_pairs
    ///
    /// Renders the query as URL parameter pairs. Blank search strings are
    /// omitted entirely rather than sent as `q=`.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("size".to_string(), self.size.to_string()),
        ];
        if let Some(q) = self.q.as_deref() {
            let q = q.trim();
            if !q.is_empty() {
                pairs.push(("q".to_string(), q.to_string()));
            }
        }
        pairs
    }
}

/// EmployeeQuery
///
/// HR listing parameters: the common set plus branch filtering and the two
/// name orderings the backend understands.
#[derive(Debug, Clone, Default)]
pub struct EmployeeQuery {
    pub list: ListQuery,
    // "ALL" is the UI's no-filter marker and is never sent to the server.
    pub branch: Option<String>,
    // "name_asc" | "name_desc"; anything else falls back to server ordering.
    pub order: Option<String>,
}

impl EmployeeQuery {
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = self.list.to_pairs();
        if let Some(branch) = self.branch.as_deref() {
            if !branch.is_empty() && branch != "ALL" {
                pairs.push(("branch".to_string(), branch.to_string()));
            }
        }
        if let Some(order) = self.order.as_deref() {
            pairs.push(("order".to_string(), order.to_string()));
        }
        pairs
    }
}

// --- Admin: Modules & Tabs ---

/// AppModuleRow
///
/// One row of the module administration table (GET /admin/modules). This is
/// the flat management view, not the navigation tree.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppModuleRow {
    pub code: String,
    pub name_en: Option<String>,
    pub name_ar: Option<String>,
    pub is_active: bool,
    pub is_locked: bool,
    pub sort_order: i64,
}

/// ModuleCreate
///
/// Input payload for POST /admin/modules.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ModuleCreate {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_en: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_ar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_locked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,
}

/// ModuleUpdate
///
/// Partial update payload for PUT /admin/modules/{code}.
///
/// *Optimization*: Uses `Option<T>` for all fields and
/// `#[serde(skip_serializing_if = "Option::is_none")]` so only the provided
/// fields appear in the JSON payload; the server leaves the rest untouched.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ModuleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_en: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_ar: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_locked: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,
}

/// TabRow
///
/// One row of a module's tab administration table.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TabRow {
    pub module_code: String,
    pub code: String,
    pub name_en: Option<String>,
    pub name_ar: Option<String>,
    pub is_active: bool,
    pub is_locked: bool,
    pub sort_order: i64,
}

/// TabCreate
///
/// Input payload for POST /admin/modules/{code}/tabs.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TabCreate {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_en: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_ar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_locked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,
}

/// TabUpdate
///
/// Partial update payload for PUT /admin/modules/{code}/tabs/{tab_code}.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TabUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_en: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_ar: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_locked: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i64>,
}

// --- Issue Tracker Schemas ---

/// IssueStatus
///
/// Workflow states for captured server errors. The wire format is
/// snake_case, matching the values the backend validates against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    #[default]
    Open,
    InProgress,
    Resolved,
    Ignored,
}

/// IssueSummary
///
/// Compact issue row for the tracker list view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueSummary {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub status: IssueStatus,
    pub method: String,
    pub url: String,
    pub http_status: u16,
    pub note: Option<String>,
    pub pr_url: Option<String>,
}

/// IssueDetail
///
/// Full issue view: the summary fields plus the captured request, response,
/// and header payloads stored when the error was reported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueDetail {
    #[serde(flatten)]
    pub summary: IssueSummary,
    pub request: Option<Value>,
    pub response: Option<Value>,
    pub headers: Option<Value>,
}

/// IssuePatch
///
/// Partial update for PATCH /admin/issues/{id}. Only the provided fields are
/// sent; the backend validates `status` against the workflow set.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IssuePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<IssueStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pr_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// IssueAck
///
/// Acknowledgement returned when a new issue is filed (POST /admin/issues).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueAck {
    pub id: i64,
    pub created_at: DateTime<Utc>,
}

/// ClientContext
///
/// Who and where the reporter was when a server error got escalated. The user
/// fields are null for anonymous reports; `ua` identifies this shell build.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClientContext {
    pub user_id: Option<i64>,
    pub user_email: Option<String>,
    pub user_name: Option<String>,
    pub route: String,
    pub locale: String,
    pub ua: String,
}

/// IssueReport
///
/// The full escalation payload for POST /admin/issues: the captured failure
/// plus the reporter's context and an optional free-text note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueReport {
    pub method: String,
    pub url: String,
    pub status: u16,
    pub note: Option<String>,
    pub client: ClientContext,
    pub request: Option<Value>,
    pub response: Option<Value>,
    pub headers: Option<Value>,
}

// --- HR Schemas ---

/// Employee
///
/// An HR employee record as serialized by the backend. Monetary and timestamp
/// fields arrive as strings and are passed through untouched; the shell does
/// not do arithmetic on them.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Employee {
    pub id: i64,
    pub code: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub branch_id: Option<i64>,
    #[serde(default)]
    pub is_active: bool,
    pub hire_date: Option<NaiveDate>,
    pub termination_date: Option<NaiveDate>,
    pub salary_monthly: Option<String>,
    pub nationality: Option<String>,
    pub dob: Option<NaiveDate>,
    pub meta: Option<Value>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// EmployeeCreate
///
/// Input payload for POST /hr/employees. `first_name` and `last_name` are the
/// only fields the backend requires.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EmployeeCreate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hire_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_monthly: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

/// EmployeeUpdate
///
/// Partial update payload for PATCH /hr/employees/{id}. Same field-presence
/// semantics as the other partial updates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EmployeeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hire_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub termination_date: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_monthly: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

/// DeleteAck
///
/// Acknowledgement for DELETE endpoints (`{"deleted": true}`).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DeleteAck {
    pub deleted: bool,
}
