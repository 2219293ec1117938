use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use crate::models::{ModuleNode, SectionNode, TabNode};
use crate::pipeline::ApiClient;

/// TreeState
///
/// The three facts an embedding layer renders from: the tree itself, whether a
/// fetch is in flight, and the last fetch failure. One lock so they always
/// move together.
#[derive(Default)]
struct TreeState {
    tree: Vec<ModuleNode>,
    loading: bool,
    error: Option<String>,
}

/// ModuleTreeStore
///
/// Caches the signed-in user's navigation tree. The tree is fetched once per
/// session (the embedding layer calls `load` after sign-in) and replaced
/// wholesale on every refresh; nothing mutates it incrementally.
///
/// Concurrent `load` calls are last-write-wins: whichever fetch *finishes*
/// last owns the state, regardless of which was issued last. The store is a
/// cache of the most recent fetch result, and that race is part of its
/// observable contract.
pub struct ModuleTreeStore {
    state: RwLock<TreeState>,
    client: Arc<ApiClient>,
}

impl ModuleTreeStore {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            state: RwLock::new(TreeState::default()),
            client,
        }
    }

    /// load
    ///
    /// Fetches and normalizes the tree. On success the tree is replaced; on
    /// failure the error message is recorded and the tree is cleared rather
    /// than left stale. Either way `loading` ends false. The outcome lives in
    /// the store; callers read `tree()` / `error()` afterwards.
    pub async fn load(&self) {
        {
            let mut state = self.state.write();
            state.loading = true;
            state.error = None;
        }

        let result: Result<Value, _> = self
            .client
            .get_with_query(
                "/admin/modules/tree",
                vec![("include".to_string(), "tabs,sections".to_string())],
            )
            .await;

        let mut state = self.state.write();
        match result {
            Ok(payload) => {
                state.tree = normalize(&payload);
                tracing::debug!(modules = state.tree.len(), "module tree loaded");
            }
            Err(err) => {
                tracing::warn!(error = %err, "module tree load failed");
                state.error = Some(err.to_string());
                state.tree = Vec::new();
            }
        }
        state.loading = false;
    }

    /// get_default_path
    ///
    /// The canonical first landing route for a module: prefer its `index` tab,
    /// else the first tab in server order, else the module root when it has no
    /// tabs at all. Unknown codes yield `None`. Lookup is case-insensitive;
    /// lock flags are deliberately ignored (locking is a display concern).
    pub fn get_default_path(&self, module_code: &str) -> Option<String> {
        default_path_in(&self.state.read().tree, module_code)
    }

    pub fn tree(&self) -> Vec<ModuleNode> {
        self.state.read().tree.clone()
    }

    pub fn loading(&self) -> bool {
        self.state.read().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.read().error.clone()
    }

    /// reset
    ///
    /// Drops all tree state. Part of sign-out.
    pub fn reset(&self) {
        *self.state.write() = TreeState::default();
    }
}

/// normalize
///
/// Turns the server payload into the typed tree. Accepts either
/// `{"modules": [...]}` or a bare array; anything else is an empty tree.
/// Field coercions are deliberately forgiving (the payload crosses an
/// organizational boundary) and the input order is preserved verbatim at
/// every level.
pub(crate) fn normalize(payload: &Value) -> Vec<ModuleNode> {
    let items: &[Value] = match payload.get("modules") {
        Some(Value::Array(items)) => items,
        _ => match payload {
            Value::Array(items) => items,
            _ => &[],
        },
    };

    items.iter().map(normalize_module).collect()
}

fn normalize_module(raw: &Value) -> ModuleNode {
    ModuleNode {
        // Lowercased: URL segments compare case-insensitively.
        code: stringify(raw.get("code")).to_lowercase(),
        // The display-name fallback chain uses the *raw* code, pre-lowercase.
        name: name_of(raw),
        icon: raw
            .get("icon")
            .and_then(Value::as_str)
            .map(str::to_string),
        sort_order: number_or_absent(raw.get("sort_order")),
        is_locked: truthy(raw.get("is_locked")),
        tabs: match raw.get("tabs") {
            Some(Value::Array(tabs)) => tabs.iter().map(normalize_tab).collect(),
            _ => Vec::new(),
        },
    }
}

fn normalize_tab(raw: &Value) -> TabNode {
    TabNode {
        code: stringify(raw.get("code")).to_lowercase(),
        name: name_of(raw),
        sort_order: number_or_absent(raw.get("sort_order")),
        is_locked: truthy(raw.get("is_locked")),
        // None when the server sent nothing; Some(vec![]) when it sent an
        // empty list. The distinction survives normalization.
        sections: match raw.get("sections") {
            Some(Value::Array(sections)) => {
                Some(sections.iter().map(normalize_section).collect())
            }
            _ => None,
        },
    }
}

fn normalize_section(raw: &Value) -> SectionNode {
    SectionNode {
        code: stringify(raw.get("code")).to_lowercase(),
        name: name_of(raw),
        sort_order: number_or_absent(raw.get("sort_order")),
    }
}

/// name_of
///
/// First non-null of `name`, `name_en`, `code` (raw), stringified; empty
/// string when none are usable. An empty string present under `name` is kept
/// as-is, it does not fall through the chain.
fn name_of(raw: &Value) -> String {
    let chosen = ["name", "name_en", "code"]
        .iter()
        .find_map(|key| raw.get(*key).filter(|v| !v.is_null()));
    stringify(chosen)
}

/// stringify
///
/// Best-effort string coercion for scalar JSON values. Missing, null, and
/// non-scalar values become the empty string.
fn stringify(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// number_or_absent
///
/// Keeps a sort weight only when the server actually sent a number. Numeric
/// strings do not count.
fn number_or_absent(value: Option<&Value>) -> Option<f64> {
    match value {
        Some(Value::Number(n)) => n.as_f64(),
        _ => None,
    }
}

/// truthy
///
/// Loose boolean coercion: null, false, zero, and the empty string are false,
/// everything else is true.
fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

/// default_path_in
///
/// Pure form of `ModuleTreeStore::get_default_path`, over an explicit tree.
pub(crate) fn default_path_in(tree: &[ModuleNode], module_code: &str) -> Option<String> {
    let needle = module_code.to_lowercase();
    let module = tree.iter().find(|m| m.code == needle)?;

    let tab = module
        .tabs
        .iter()
        .find(|t| t.code == "index")
        .or_else(|| module.tabs.first());

    Some(match tab {
        Some(tab) => format!("/app/{}/{}", module.code, tab.code),
        None => format!("/app/{}", module.code),
    })
}
