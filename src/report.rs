use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

// Request-body keys whose values are masked before a report leaves the pipeline.
const SECRET_KEYS: [&str; 5] = ["password", "pwd", "secret", "token", "access_token"];

// Buffered reports per subscriber before the slowest one starts lagging.
const BUS_CAPACITY: usize = 32;

/// ServerErrorReport
///
/// Snapshot of one failed request, captured by the pipeline the first time a
/// request instance observes a 5xx response. Carries what was sent (redacted),
/// what came back, and the headers the shell attached, which is what triage
/// needs to reproduce the failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerErrorReport {
    /// Request path as sent, without the base URL.
    pub url: String,
    /// HTTP method, uppercase.
    pub method: String,
    /// Response status code.
    pub status: u16,
    /// Redacted copy of the JSON request body, when there was one.
    pub request_data: Option<Value>,
    /// Response body parsed as JSON, or the raw text when it is not JSON.
    pub response_data: Option<Value>,
    /// Headers the pipeline attached to the request.
    pub headers: BTreeMap<String, String>,
}

/// redact_body
///
/// Produces the reportable form of a request body. A JSON string is parsed
/// first (an unparseable one yields nothing rather than leaking raw text).
/// For a top-level object, the five secret keys are overwritten with "***"
/// when present; nested objects are left alone. Non-object values pass
/// through unchanged.
pub fn redact_body(body: &Value) -> Option<Value> {
    let parsed;
    let data = match body {
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(value) => {
                parsed = value;
                &parsed
            }
            Err(_) => return None,
        },
        other => other,
    };

    match data {
        Value::Object(map) => {
            let mut clone = map.clone();
            for key in SECRET_KEYS {
                if let Some(slot) = clone.get_mut(key) {
                    *slot = Value::String("***".to_string());
                }
            }
            Some(Value::Object(clone))
        }
        other => Some(other.clone()),
    }
}

/// ReportBus
///
/// Fan-out channel for server-error reports. Emission never blocks and never
/// fails: with no subscribers the report is simply dropped, and a slow
/// subscriber lags (and is told so by the broadcast receiver) instead of
/// back-pressuring the pipeline.
pub struct ReportBus {
    tx: broadcast::Sender<ServerErrorReport>,
}

impl Default for ReportBus {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportBus {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(BUS_CAPACITY);
        Self { tx }
    }

    /// emit
    ///
    /// Publishes a report to every current subscriber.
    pub fn emit(&self, report: ServerErrorReport) {
        tracing::debug!(url = %report.url, status = report.status, "server error report emitted");
        // Err here just means nobody is listening right now.
        let _ = self.tx.send(report);
    }

    /// subscribe
    ///
    /// A receiver positioned after all previously emitted reports; only
    /// reports emitted from now on are observed.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerErrorReport> {
        self.tx.subscribe()
    }
}
