use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::AppShell;
use crate::error::ApiError;
use crate::navigator::APP_ROOT;

/// RouteKey
///
/// A parsed `/app/...` location. Two shapes exist because tab views and
/// section views live in separate registries: `(module, tab)` and
/// `(module, tab, section)`. All components are lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RouteKey {
    Tab {
        module: String,
        tab: String,
    },
    Section {
        module: String,
        tab: String,
        section: String,
    },
}

impl RouteKey {
    /// parse
    ///
    /// Reads a location path into a key. Only paths under `/app` with a module
    /// segment parse; a missing tab segment defaults to `"index"` (so
    /// `/app/hr` and `/app/hr/index` are the same key). Anything deeper than a
    /// section does not parse.
    pub fn parse(path: &str) -> Option<Self> {
        let mut segments = path.trim().split('/').filter(|s| !s.is_empty());

        if segments.next() != Some(APP_ROOT.trim_start_matches('/')) {
            return None;
        }

        let module = segments.next()?.to_lowercase();
        let tab = segments
            .next()
            .map(str::to_lowercase)
            .unwrap_or_else(|| "index".to_string());
        let section = segments.next().map(str::to_lowercase);

        if segments.next().is_some() {
            return None;
        }

        Some(match section {
            Some(section) => Self::Section {
                module,
                tab,
                section,
            },
            None => Self::Tab { module, tab },
        })
    }
}

impl std::fmt::Display for RouteKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tab { module, tab } => write!(f, "{module}/{tab}"),
            Self::Section {
                module,
                tab,
                section,
            } => write!(f, "{module}/{tab}/{section}"),
        }
    }
}

// 1. ViewLoader Contract
/// ViewLoader
///
/// Defines the abstract contract for a routable view. Implementations fetch
/// whatever they need through the shell's services and hand back a rendered
/// description; the host environment decides how to display it. A load is
/// bounded only by the HTTP timeouts of the requests it makes; there is no
/// additional outer deadline.
#[async_trait]
pub trait ViewLoader: Send + Sync {
    /// Static title for chrome (window titles, breadcrumbs).
    fn title(&self) -> &str;

    /// Produces the view's content. Runs through the full pipeline, so a load
    /// participates in the loading gauge and error reporting like any other
    /// traffic.
    async fn load(&self, shell: &AppShell) -> Result<LoadedView, ApiError>;
}

/// ViewState
///
/// The concrete type used to share a view loader between the registry and
/// resolution results.
pub type ViewState = Arc<dyn ViewLoader>;

/// LoadedView
///
/// The rendered output of a view loader.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedView {
    pub title: String,
    pub body: ViewBody,
}

/// ViewBody
///
/// The shapes a headless view can take. `Table` covers the grid views the
/// portal is made of; `Text` covers everything simpler.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewBody {
    Table(DataTable),
    Text(String),
}

/// DataTable
///
/// A server-paged grid: the column headers, the first page of rows (already
/// formatted for display), and the server-side total row count.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub total: u64,
}

// 2. Registry Entries & Resolution
/// RegistryEntry
///
/// What a route key maps to: a view, or a redirect to a deeper default route
/// (the `index` tab of a module typically redirects to its real first tab).
#[derive(Clone)]
pub enum RegistryEntry {
    View(ViewState),
    Redirect(String),
}

/// Resolution
///
/// The outcome of resolving a path. A miss is not an error: it resolves to a
/// replace-navigation back to the app root, exactly like an unroutable URL
/// typed into the original portal.
#[derive(Clone)]
pub enum Resolution {
    View(ViewState),
    Redirect(String),
}

impl RegistryEntry {
    fn to_resolution(&self) -> Resolution {
        match self {
            Self::View(loader) => Resolution::View(Arc::clone(loader)),
            Self::Redirect(target) => Resolution::Redirect(target.clone()),
        }
    }
}

// 3. The Registry
/// RegistryBuilder
///
/// Collects explicit view registrations and validates them once. Keys are
/// lowercased on insertion so registration and resolution agree regardless of
/// the caller's casing. Duplicate keys are collected rather than silently
/// shadowed and turn into a single startup error naming all of them.
#[derive(Default)]
pub struct RegistryBuilder {
    tabs: HashMap<(String, String), RegistryEntry>,
    sections: HashMap<(String, String, String), RegistryEntry>,
    duplicates: Vec<String>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// tab
    ///
    /// Registers a `(module, tab)` entry.
    pub fn tab(mut self, module: &str, tab: &str, entry: RegistryEntry) -> Self {
        let key = (module.to_lowercase(), tab.to_lowercase());
        if self.tabs.contains_key(&key) {
            self.duplicates.push(format!("{}/{}", key.0, key.1));
        } else {
            self.tabs.insert(key, entry);
        }
        self
    }

    /// section
    ///
    /// Registers a `(module, tab, section)` entry. The section table is
    /// independent of the tab table; a tab view and its sections coexist.
    pub fn section(mut self, module: &str, tab: &str, section: &str, entry: RegistryEntry) -> Self {
        let key = (
            module.to_lowercase(),
            tab.to_lowercase(),
            section.to_lowercase(),
        );
        if self.sections.contains_key(&key) {
            self.duplicates
                .push(format!("{}/{}/{}", key.0, key.1, key.2));
        } else {
            self.sections.insert(key, entry);
        }
        self
    }

    /// tab_view / tab_redirect / section_view
    ///
    /// Sugar over the two entry shapes.
    pub fn tab_view(self, module: &str, tab: &str, loader: ViewState) -> Self {
        self.tab(module, tab, RegistryEntry::View(loader))
    }

    pub fn tab_redirect(self, module: &str, tab: &str, target: &str) -> Self {
        self.tab(module, tab, RegistryEntry::Redirect(target.to_string()))
    }

    pub fn section_view(self, module: &str, tab: &str, section: &str, loader: ViewState) -> Self {
        self.section(module, tab, section, RegistryEntry::View(loader))
    }

    /// build
    ///
    /// Finalizes the registry. Fails with every duplicate key found, so a bad
    /// registration set is one boot failure with the full list, not a
    /// whack-a-mole series.
    pub fn build(self) -> Result<ViewRegistry, ApiError> {
        if !self.duplicates.is_empty() {
            return Err(ApiError::Registry(self.duplicates.join(", ")));
        }
        Ok(ViewRegistry {
            tabs: self.tabs,
            sections: self.sections,
        })
    }
}

/// ViewRegistry
///
/// The immutable route table: one map for tab keys, one for section keys.
/// Resolution is exact-match only; there is no prefix or wildcard matching.
pub struct ViewRegistry {
    tabs: HashMap<(String, String), RegistryEntry>,
    sections: HashMap<(String, String, String), RegistryEntry>,
}

impl std::fmt::Debug for ViewRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Entries hold `Arc<dyn ViewLoader>`, so only the keys are printable.
        f.debug_struct("ViewRegistry")
            .field("tabs", &self.tabs.keys())
            .field("sections", &self.sections.keys())
            .finish()
    }
}

impl ViewRegistry {
    /// resolve
    ///
    /// Maps a location path to its view or redirect. Unparseable paths and
    /// unregistered keys both resolve to a redirect to the app root; callers
    /// must not feed the app root itself back through the registry.
    pub fn resolve(&self, path: &str) -> Resolution {
        match RouteKey::parse(path) {
            Some(key) => self.resolve_key(&key),
            None => Resolution::Redirect(APP_ROOT.to_string()),
        }
    }

    /// resolve_key
    ///
    /// Exact-match lookup in the table matching the key's shape.
    pub fn resolve_key(&self, key: &RouteKey) -> Resolution {
        let entry = match key {
            RouteKey::Tab { module, tab } => self.tabs.get(&(module.clone(), tab.clone())),
            RouteKey::Section {
                module,
                tab,
                section,
            } => self
                .sections
                .get(&(module.clone(), tab.clone(), section.clone())),
        };

        match entry {
            Some(entry) => entry.to_resolution(),
            None => {
                tracing::debug!(key = %key, "no view registered; redirecting to app root");
                Resolution::Redirect(APP_ROOT.to_string())
            }
        }
    }

    /// tab_count
    ///
    /// Number of registered tab entries, for startup logging.
    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }
}
