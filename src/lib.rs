use std::sync::Arc;

// --- Module Structure ---

// Core client services and stores.
pub mod config;
pub mod error;
pub mod loading;
pub mod models;
pub mod navigator;
pub mod navtree;
pub mod pipeline;
pub mod prefs;
pub mod report;
pub mod router;
pub mod session;

// Endpoint facades and the built-in views they feed.
pub mod api;
pub mod views;

use api::{AdminApi, AuthApi, HrApi, UsersApi};
use session::{FileTokenStore, MemoryTokenStore, TokenState};

// --- Public Re-exports ---

// Makes the core shell types easily accessible to host applications (main.rs).
pub use config::{Env, ShellConfig};
pub use error::ApiError;
pub use loading::LoadingGauge;
pub use navigator::{APP_ROOT, InProcessNavigator, LOGIN_PATH, Navigator, NavigatorState};
pub use navtree::ModuleTreeStore;
pub use pipeline::ApiClient;
pub use prefs::PreferenceStore;
pub use report::{ReportBus, ServerErrorReport};
pub use router::{RegistryBuilder, Resolution, ViewRegistry};
pub use session::SessionStore;

/// AppShell
///
/// Implements the **Unified State Pattern**. This is the single, thread-safe
/// container holding every service the portal client is made of: the session,
/// the preference store, the request pipeline, the module tree, and the
/// validated route table. Hosts build one shell at startup and share it across
/// every task that talks to the backend.
#[derive(Clone)]
pub struct AppShell {
    /// Configuration: the loaded, immutable environment configuration.
    pub config: ShellConfig,
    /// Session Layer: token + identity, hydrated from disk at construction.
    pub session: Arc<SessionStore>,
    /// Preference Layer: durable UI preferences (language, theme, layout).
    pub prefs: Arc<PreferenceStore>,
    /// Navigation: the host's location abstraction.
    pub navigator: NavigatorState,
    /// Loading Gauge: collapses concurrent requests into one busy flag.
    pub loading: Arc<LoadingGauge>,
    /// Report Bus: server-error reports for interested subscribers.
    pub reports: Arc<ReportBus>,
    /// Request Pipeline: the instrumented HTTP client everything goes through.
    pub client: Arc<ApiClient>,
    /// Module Tree: the navigation tree store, loaded after login.
    pub modules: Arc<ModuleTreeStore>,
    /// Route Table: the immutable, duplicate-checked view registry.
    pub registry: Arc<ViewRegistry>,
}

impl AppShell {
    /// new
    ///
    /// Assembles a shell with the stock parts: an in-process navigator and the
    /// built-in route table.
    pub fn new(config: ShellConfig) -> Result<Self, ApiError> {
        Self::with_parts(
            config,
            Arc::new(InProcessNavigator::default()),
            views::default_registry(),
        )
    }

    /// with_parts
    ///
    /// Assembles a shell around a caller-supplied navigator and route table.
    /// Hosts embedding the shell use this to wire in their own location
    /// handling and extend the registry with custom views.
    pub fn with_parts(
        config: ShellConfig,
        navigator: NavigatorState,
        registry: RegistryBuilder,
    ) -> Result<Self, ApiError> {
        // 1. Durable Stores
        // A shell without a state directory keeps everything in memory.
        let tokens: TokenState = match config.state_dir.as_deref() {
            Some(dir) => Arc::new(FileTokenStore::new(dir)),
            None => Arc::new(MemoryTokenStore::new()),
        };
        let session = Arc::new(SessionStore::new(tokens));
        let prefs = Arc::new(PreferenceStore::new(config.state_dir.as_deref()));

        // 2. Pipeline Services
        let loading = Arc::new(LoadingGauge::new());
        let reports = Arc::new(ReportBus::new());
        let client = Arc::new(ApiClient::new(
            &config,
            Arc::clone(&session),
            Arc::clone(&prefs),
            Arc::clone(&loading),
            Arc::clone(&reports),
            Arc::clone(&navigator),
        )?);

        // 3. Navigation State
        // The route table is validated here so duplicate registrations fail
        // the boot instead of shadowing each other at click time.
        let modules = Arc::new(ModuleTreeStore::new(Arc::clone(&client)));
        let registry = Arc::new(registry.build()?);

        tracing::info!(
            api_base = %config.api_base,
            registered_tabs = registry.tab_count(),
            authenticated = session.token().is_some(),
            "application shell assembled"
        );

        Ok(Self {
            config,
            session,
            prefs,
            navigator,
            loading,
            reports,
            client,
            modules,
            registry,
        })
    }

    // --- Endpoint Facades ---

    // Facades are built per call; they are thin bundles of Arc handles.

    pub fn auth(&self) -> AuthApi {
        AuthApi::new(
            Arc::clone(&self.client),
            Arc::clone(&self.session),
            Arc::clone(&self.modules),
            Arc::clone(&self.navigator),
        )
    }

    pub fn users(&self) -> UsersApi {
        UsersApi::new(Arc::clone(&self.client))
    }

    pub fn admin(&self) -> AdminApi {
        AdminApi::new(
            Arc::clone(&self.client),
            Arc::clone(&self.session),
            Arc::clone(&self.prefs),
            Arc::clone(&self.navigator),
        )
    }

    pub fn hr(&self) -> HrApi {
        HrApi::new(Arc::clone(&self.client))
    }
}
