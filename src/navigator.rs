use std::sync::Arc;

use parking_lot::RwLock;

/// Path the pipeline sends a de-authenticated user to.
pub const LOGIN_PATH: &str = "/login";
/// Landing path after sign-in, and the redirect target for unroutable paths.
pub const APP_ROOT: &str = "/app";

// 1. Navigator Contract
/// Navigator
///
/// Defines the abstract contract for the host's notion of "where the user is".
/// This trait is the seam between the shell and whatever actually displays
/// screens: the demo binary uses the in-process implementation below, a GUI
/// host would adapt its own routing, and tests observe the recorded trail.
pub trait Navigator: Send + Sync {
    /// The current location path, e.g. "/app/hr/employees".
    fn current_path(&self) -> String;

    /// Replaces the current location. Replace, not push: the abandoned
    /// location must not remain reachable via host history (the user should
    /// never "Back" into a signed-out page).
    fn replace(&self, path: &str);
}

/// NavigatorState
///
/// The concrete type used to share the navigator across the shell.
pub type NavigatorState = Arc<dyn Navigator>;

// 2. The In-Process Implementation
/// InProcessNavigator
///
/// Location state held in memory, with a trail of every location held so far.
/// The trail is what tests assert on; `current_path` is all the shell itself
/// ever consults.
pub struct InProcessNavigator {
    trail: RwLock<Vec<String>>,
}

impl InProcessNavigator {
    /// new
    ///
    /// Starts at the given path, conventionally `LOGIN_PATH` before sign-in.
    pub fn new(initial: &str) -> Self {
        Self {
            trail: RwLock::new(vec![initial.to_string()]),
        }
    }

    /// trail
    ///
    /// Every location this navigator has held, oldest first.
    pub fn trail(&self) -> Vec<String> {
        self.trail.read().clone()
    }
}

impl Default for InProcessNavigator {
    fn default() -> Self {
        Self::new(LOGIN_PATH)
    }
}

impl Navigator for InProcessNavigator {
    fn current_path(&self) -> String {
        self.trail
            .read()
            .last()
            .cloned()
            .unwrap_or_else(|| LOGIN_PATH.to_string())
    }

    fn replace(&self, path: &str) {
        tracing::debug!(to = %path, "navigating");
        self.trail.write().push(path.to_string());
    }
}
