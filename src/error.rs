use thiserror::Error;

/// ApiError
///
/// The single error type surfaced by the request pipeline and everything built
/// on top of it (endpoint wrappers, tree store, view loaders). HTTP failures are
/// pre-classified into the buckets the shell reacts to, so callers match on the
/// variant instead of re-inspecting status codes.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 401 or 422. The pipeline has already cleared the session and navigated
    /// to the login path when appropriate; callers only report the failure.
    #[error("authentication failed ({status}): {message}")]
    Auth { status: u16, message: String },

    /// 5xx. A server-error report has already been emitted on the bus for the
    /// first occurrence on a given request instance.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Any remaining non-2xx status. No side effects; the caller decides.
    #[error("request failed ({status}): {message}")]
    Client { status: u16, message: String },

    /// Transport-level failure: DNS, connect, TLS, or the configured timeout.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A JSON payload did not match the expected shape. Almost always a
    /// response body; the encoding direction can only fail on pathological
    /// inputs.
    #[error("invalid json while {context}: {source}")]
    Decode {
        context: &'static str,
        source: serde_json::Error,
    },

    /// A view key was registered twice. Raised at startup, never at resolve time.
    #[error("duplicate view registration: {0}")]
    Registry(String),
}

impl ApiError {
    /// status
    ///
    /// The HTTP status carried by this error, when the failure reached the
    /// classification stage at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Auth { status, .. } | Self::Server { status, .. } | Self::Client { status, .. } => {
                Some(*status)
            }
            Self::Network(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// is_auth
    ///
    /// True when this failure already triggered (or was exempt from) the
    /// sign-out handling in the pipeline.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }
}

/// extract_message
///
/// Pulls a human-readable message out of an error response body. The backend's
/// error envelope is `{"message": "..."}`; some legacy endpoints use
/// `{"error": "..."}` instead. Anything else falls back to the canonical
/// reason phrase for the status.
pub(crate) fn extract_message(status: reqwest::StatusCode, body: &serde_json::Value) -> String {
    body.get("message")
        .or_else(|| body.get("error"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        })
}
