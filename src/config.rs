use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// ShellConfig
///
/// Holds the shell's entire configuration state. This struct is designed to be
/// immutable once loaded, ensuring consistency across all services (pipeline, session,
/// preferences). It is composed into the shared `AppShell` at startup.
#[derive(Clone)]
pub struct ShellConfig {
    // Base URL every request path is joined onto (e.g. "http://localhost:5000/api").
    pub api_base: String,
    // Hard deadline applied to every outbound request.
    pub request_timeout: Duration,
    // Directory for durable client state (token, preferences). None keeps state in memory.
    pub state_dir: Option<PathBuf>,
    // Fallback Accept-Language value when no language preference has been saved.
    pub locale: String,
    // Runtime environment marker. Controls log format and required variables.
    pub env: Env,
}

/// Env
///
/// Defines the runtime context, used to switch between development conveniences
/// (default endpoints, pretty logs) and strict production configuration (explicit
/// endpoint, JSON logs).
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for ShellConfig {
    /// default
    ///
    /// Provides a safe, non-panicking ShellConfig instance primarily used for test setup.
    /// This allows tests to instantiate the shell without touching environment variables
    /// or the real state directory.
    fn default() -> Self {
        Self {
            api_base: "http://localhost:5000/api".to_string(),
            request_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            // Tests must never write into the real platform data directory.
            state_dir: None,
            locale: "en".to_string(),
            env: Env::Local,
        }
    }
}

// Default request deadline, in milliseconds.
const DEFAULT_TIMEOUT_MS: u64 = 30_000;

impl ShellConfig {
    /// load
    ///
    /// The canonical function for initializing the shell configuration at startup.
    /// It reads all parameters from environment variables and implements the **fail-fast**
    /// principle.
    ///
    /// # Panics
    /// Panics if a critical environment variable required for the current runtime
    /// environment (especially Production) is not found or cannot be parsed. This
    /// prevents the shell from starting with an incomplete or silently-wrong
    /// configuration.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        // API Base Resolution
        // The production endpoint is mandatory and must be explicitly set.
        let api_base = match env {
            Env::Production => env::var("PORTAL_API_BASE")
                .expect("FATAL: PORTAL_API_BASE must be set in production."),
            // In local, fall back to the conventional dev backend address.
            _ => env::var("PORTAL_API_BASE")
                .unwrap_or_else(|_| "http://localhost:5000/api".to_string()),
        };

        // Timeout Resolution
        // An unparseable override is a configuration bug, not something to paper over.
        let request_timeout = match env::var("PORTAL_HTTP_TIMEOUT_MS") {
            Ok(raw) => {
                let millis: u64 = raw
                    .parse()
                    .expect("FATAL: PORTAL_HTTP_TIMEOUT_MS must be an integer (milliseconds)");
                Duration::from_millis(millis)
            }
            Err(_) => Duration::from_millis(DEFAULT_TIMEOUT_MS),
        };

        // State Directory Resolution
        // Explicit override first, then the platform data directory. A machine with no
        // resolvable data directory degrades to in-memory state rather than failing.
        let state_dir = match env::var("PORTAL_STATE_DIR") {
            Ok(dir) => Some(PathBuf::from(dir)),
            Err(_) => directories::ProjectDirs::from("com", "portal-shell", "portal-shell")
                .map(|dirs| dirs.data_dir().to_path_buf()),
        };

        let locale = env::var("PORTAL_LOCALE").unwrap_or_else(|_| "en".to_string());

        Self {
            api_base,
            request_timeout,
            state_dir,
            locale,
            env,
        }
    }
}
