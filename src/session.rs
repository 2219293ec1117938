use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::models::{ModuleSummary, UserProfile};

/// sanitize_token
///
/// Normalizes a raw token value to "present" or "absent". Client storage that
/// round-trips through string serialization can hand back the literals `"null"`
/// and `"undefined"` or an empty string; all three mean "no token". The
/// comparison is exact: `"NULL"` is a real (if odd) token.
pub fn sanitize_token(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    match trimmed {
        "" | "null" | "undefined" => None,
        _ => Some(trimmed.to_string()),
    }
}

// 1. TokenStore Contract
/// TokenStore
///
/// Defines the abstract contract for durable token storage. This trait allows
/// us to swap the concrete implementation, from the on-disk store
/// (FileTokenStore) in the real client to the in-memory one (MemoryTokenStore)
/// during testing, without affecting the SessionStore.
///
/// Implementations are infallible from the caller's view: storage trouble is
/// logged and swallowed, and the in-memory session stays the source of truth.
pub trait TokenStore: Send + Sync {
    /// Returns the persisted raw token, if any. No sanitization here; the
    /// SessionStore owns that.
    fn read(&self) -> Option<String>;

    /// Persists the token, replacing any previous value.
    fn write(&self, token: &str);

    /// Removes the persisted token if present.
    fn clear(&self);
}

/// TokenState
///
/// The concrete type used to share the token store across the shell.
pub type TokenState = Arc<dyn TokenStore>;

// 2. The On-Disk Implementation
/// TokenDocument
///
/// The JSON document written to disk. A document rather than a bare string so
/// the format can grow without breaking existing installs.
#[derive(Serialize, Deserialize)]
struct TokenDocument {
    token: String,
}

/// FileTokenStore
///
/// Durable token storage as a small JSON file under the configured state
/// directory. Writes go through a temp-file-then-rename so a crash mid-write
/// can never leave a half-written document behind.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// new
    ///
    /// `state_dir` is the directory from ShellConfig; the file name itself is
    /// fixed so every shell instance on a machine shares one session.
    pub fn new(state_dir: &Path) -> Self {
        Self {
            path: state_dir.join("session.json"),
        }
    }
}

impl TokenStore for FileTokenStore {
    fn read(&self) -> Option<String> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "failed to read session file");
                return None;
            }
        };

        match serde_json::from_str::<TokenDocument>(&raw) {
            Ok(doc) => Some(doc.token),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "session file is malformed; ignoring it");
                None
            }
        }
    }

    fn write(&self, token: &str) {
        let doc = TokenDocument {
            token: token.to_string(),
        };
        // serde_json cannot fail on this shape; treat it like the IO errors anyway.
        let json = match serde_json::to_string_pretty(&doc) {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!(error = %err, "failed to serialize session document");
                return;
            }
        };

        if let Err(err) = write_atomically(&self.path, &json) {
            tracing::warn!(path = %self.path.display(), error = %err, "failed to persist session token");
        }
    }

    fn clear(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "failed to remove session file");
            }
        }
    }
}

/// write_atomically
///
/// Writes to `<path>.tmp` and renames over the target. The rename is the
/// atomic step on every platform we care about. Shared with the preference
/// store, which keeps its document next to this one.
pub(crate) fn write_atomically(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)
}

// 3. The In-Memory Implementation (For Tests and Stateless Hosts)
/// MemoryTokenStore
///
/// Keeps the "durable" token in memory only. Used by tests and by hosts with
/// no resolvable state directory; the session then simply does not survive
/// the process.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// with_token
    ///
    /// Pre-seeds the store, letting tests exercise the hydration path.
    pub fn with_token(token: &str) -> Self {
        Self {
            token: RwLock::new(Some(token.to_string())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn read(&self) -> Option<String> {
        self.token.read().clone()
    }

    fn write(&self, token: &str) {
        *self.token.write() = Some(token.to_string());
    }

    fn clear(&self) {
        *self.token.write() = None;
    }
}

// 4. The Session Store
/// SessionInner
///
/// The mutable session state guarded by one lock so token, user, and modules
/// always change together.
#[derive(Default)]
struct SessionInner {
    token: Option<String>,
    user: Option<UserProfile>,
    modules: Vec<ModuleSummary>,
}

/// SessionStore
///
/// Owns the authenticated session: the bearer token the pipeline attaches to
/// every request, plus the signed-in user's profile and module summary.
/// Exactly one instance exists per shell; all mutation funnels through
/// `set_auth` and `clear_auth`.
pub struct SessionStore {
    inner: RwLock<SessionInner>,
    store: TokenState,
}

impl SessionStore {
    /// new
    ///
    /// Constructs the store and hydrates it from durable storage: a persisted
    /// token is adopted only if it sanitizes to a clean value. A persisted
    /// sentinel is stale garbage and is cleared on sight.
    pub fn new(store: TokenState) -> Self {
        let hydrated = match store.read() {
            Some(raw) => match sanitize_token(&raw) {
                Some(clean) => Some(clean),
                None => {
                    store.clear();
                    None
                }
            },
            None => None,
        };

        if hydrated.is_some() {
            tracing::debug!("session hydrated from durable storage");
        }

        Self {
            inner: RwLock::new(SessionInner {
                token: hydrated,
                ..Default::default()
            }),
            store,
        }
    }

    /// set_auth
    ///
    /// Adopts a login result. The token is sanitized first; it is persisted
    /// durably **only** when sanitization yields a clean value, while the
    /// in-memory token always becomes the sanitized result (possibly absent).
    /// User and modules are replaced unconditionally.
    pub fn set_auth(&self, token: &str, user: Option<UserProfile>, modules: Vec<ModuleSummary>) {
        let clean = sanitize_token(token);

        if let Some(tok) = clean.as_deref() {
            self.store.write(tok);
        }

        let mut inner = self.inner.write();
        inner.token = clean;
        inner.user = user;
        inner.modules = modules;
    }

    /// clear_auth
    ///
    /// Ends the session: removes the durable token and resets every in-memory
    /// field. Called by sign-out and by the pipeline's auth-failure handling.
    pub fn clear_auth(&self) {
        self.store.clear();
        *self.inner.write() = SessionInner::default();
    }

    /// token
    ///
    /// The current bearer token. Consulted by the pipeline per request, never
    /// cached by callers.
    pub fn token(&self) -> Option<String> {
        self.inner.read().token.clone()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.inner.read().user.clone()
    }

    pub fn modules(&self) -> Vec<ModuleSummary> {
        self.inner.read().modules.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.read().token.is_some()
    }
}
