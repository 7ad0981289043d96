//! Diagnostic trail of request/response activity.
//!
//! # Responsibilities
//! - Record every non-suppressed request and its outcome
//! - Hand snapshots to an external viewer (debug panel, CLI dump)
//!
//! # Design Decisions
//! - Append-only within a session, no eviction; never consulted for
//!   control flow
//! - Entries are timestamped at append time, not at construction

use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use uuid::Uuid;

/// Whether an entry records the outgoing request or its outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogKind {
    /// Logged just before dispatch.
    Request,
    /// Logged once the call settled.
    Response,
}

/// Status recorded on a RESPONSE entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStatus {
    /// An HTTP status code, or the 500 sentinel for transport failures.
    Code(u16),
    /// The call was canceled before settling.
    Canceled,
}

impl std::fmt::Display for LogStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogStatus::Code(code) => write!(f, "{code}"),
            LogStatus::Canceled => write!(f, "canceled"),
        }
    }
}

impl Serialize for LogStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LogStatus::Code(code) => serializer.serialize_u16(*code),
            LogStatus::Canceled => serializer.serialize_str("canceled"),
        }
    }
}

/// One diagnostic record.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    /// Correlates a RESPONSE entry with its REQUEST entry.
    pub request_id: Uuid,
    /// Resource URL.
    pub url: String,
    /// HTTP method.
    pub method: String,
    /// Request or response.
    pub kind: LogKind,
    /// Status, RESPONSE entries only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<LogStatus>,
    /// Error text, when the call failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Free-text annotation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Milliseconds since the Unix epoch, set at append time.
    pub timestamp_ms: u64,
}

impl LogEntry {
    /// Entry for an outgoing request.
    pub fn request(request_id: Uuid, url: &str, method: &str) -> Self {
        Self {
            request_id,
            url: url.to_string(),
            method: method.to_string(),
            kind: LogKind::Request,
            status: None,
            error: None,
            description: None,
            timestamp_ms: 0,
        }
    }

    /// Entry for a settled request.
    pub fn response(request_id: Uuid, url: &str, method: &str, status: LogStatus) -> Self {
        Self {
            request_id,
            url: url.to_string(),
            method: method.to_string(),
            kind: LogKind::Response,
            status: Some(status),
            error: None,
            description: None,
            timestamp_ms: 0,
        }
    }

    /// Attach error text.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Attach a free-text description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Append-only log of request/response activity.
#[derive(Debug, Default)]
pub struct RequestLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl RequestLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `entry`, stamping it with the current time.
    pub fn log(&self, mut entry: LogEntry) {
        entry.timestamp_ms = now_ms();
        self.entries
            .lock()
            .expect("request log mutex poisoned")
            .push(entry);
    }

    /// Snapshot of all entries, oldest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .expect("request log mutex poisoned")
            .clone()
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("request log mutex poisoned").len()
    }

    /// True when nothing has been logged yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_stamps_timestamp() {
        let log = RequestLog::new();
        log.log(LogEntry::request(Uuid::new_v4(), "/x", "GET"));

        let entries = log.entries();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].timestamp_ms > 0);
        assert_eq!(entries[0].kind, LogKind::Request);
    }

    #[test]
    fn test_response_entry_carries_status() {
        let log = RequestLog::new();
        let id = Uuid::new_v4();
        log.log(
            LogEntry::response(id, "/x", "GET", LogStatus::Code(500))
                .with_description("No response"),
        );

        let entries = log.entries();
        assert_eq!(entries[0].status, Some(LogStatus::Code(500)));
        assert_eq!(entries[0].description.as_deref(), Some("No response"));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(LogStatus::Code(404).to_string(), "404");
        assert_eq!(LogStatus::Canceled.to_string(), "canceled");
    }

    #[test]
    fn test_status_serialization() {
        let code = serde_json::to_value(LogStatus::Code(200)).unwrap();
        assert_eq!(code, serde_json::json!(200));

        let canceled = serde_json::to_value(LogStatus::Canceled).unwrap();
        assert_eq!(canceled, serde_json::json!("canceled"));
    }
}
