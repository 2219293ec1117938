use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::session::write_atomically;

/// Theme
///
/// The three appearance modes the portal offers. `System` defers to the host
/// environment's light/dark setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// Layout
///
/// Dashboard arrangement: the classic bar list or the tile grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Bars,
    Tiles,
}

/// Preferences
///
/// The durable, non-sensitive UI preferences document. Serialized as one JSON
/// file; unknown fields from newer versions are ignored on read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Preferences {
    pub lang: String,
    pub theme: Theme,
    pub layout: Layout,
    // Branch filter selection; "ALL" is the no-filter marker.
    pub branches: Vec<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            lang: "en".to_string(),
            theme: Theme::System,
            layout: Layout::Bars,
            branches: vec!["ALL".to_string()],
        }
    }
}

/// PreferenceStore
///
/// Holds the user's UI preferences and mirrors every change to disk. Reads at
/// construction; a missing or malformed document silently becomes the
/// defaults. Setters persist immediately and never fail from the caller's
/// view (write trouble is logged).
pub struct PreferenceStore {
    inner: RwLock<Preferences>,
    path: Option<PathBuf>,
}

impl PreferenceStore {
    /// new
    ///
    /// `state_dir` is the directory from ShellConfig; `None` keeps preferences
    /// in memory only, which is what tests use.
    pub fn new(state_dir: Option<&Path>) -> Self {
        let path = state_dir.map(|dir| dir.join("preferences.json"));
        let prefs = path
            .as_deref()
            .and_then(load_document)
            .unwrap_or_default();

        Self {
            inner: RwLock::new(prefs),
            path,
        }
    }

    /// snapshot
    ///
    /// The full current preference set.
    pub fn snapshot(&self) -> Preferences {
        self.inner.read().clone()
    }

    pub fn lang(&self) -> String {
        self.inner.read().lang.clone()
    }

    pub fn theme(&self) -> Theme {
        self.inner.read().theme
    }

    pub fn layout(&self) -> Layout {
        self.inner.read().layout
    }

    pub fn branches(&self) -> Vec<String> {
        self.inner.read().branches.clone()
    }

    pub fn set_lang(&self, lang: &str) {
        self.update(|prefs| prefs.lang = lang.to_string());
    }

    pub fn set_theme(&self, theme: Theme) {
        self.update(|prefs| prefs.theme = theme);
    }

    pub fn set_layout(&self, layout: Layout) {
        self.update(|prefs| prefs.layout = layout);
    }

    pub fn set_branches(&self, branches: Vec<String>) {
        self.update(|prefs| prefs.branches = branches);
    }

    /// update
    ///
    /// Applies a mutation under the lock, then persists the result outside it.
    fn update(&self, mutate: impl FnOnce(&mut Preferences)) {
        let snapshot = {
            let mut inner = self.inner.write();
            mutate(&mut inner);
            inner.clone()
        };

        if let Some(path) = self.path.as_deref() {
            persist_document(path, &snapshot);
        }
    }
}

/// load_document
///
/// Reads and parses the preference file. Any failure mode (missing file,
/// unreadable file, malformed JSON) means "use the defaults"; only the
/// unexpected ones get logged.
fn load_document(path: &Path) -> Option<Preferences> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "failed to read preferences");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(prefs) => Some(prefs),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "preferences file is malformed; using defaults");
            None
        }
    }
}

fn persist_document(path: &Path, prefs: &Preferences) {
    let json = match serde_json::to_string_pretty(prefs) {
        Ok(json) => json,
        Err(err) => {
            tracing::warn!(error = %err, "failed to serialize preferences");
            return;
        }
    };

    if let Err(err) = write_atomically(path, &json) {
        tracing::warn!(path = %path.display(), error = %err, "failed to persist preferences");
    }
}
