//! User-facing notification boundary.
//!
//! The pipeline raises alert-level notifications for qualifying failures;
//! what "showing" one means is up to the host (toast in a UI, stderr in a
//! CLI). Details carry the failing request and the structured error so a
//! "View details" affordance can render them.

use std::sync::Mutex;

use serde::Serialize;
use serde_json::Value;

/// The request a notification is about.
#[derive(Debug, Clone, Serialize)]
pub struct RequestSummary {
    /// Resource URL.
    pub url: String,
    /// HTTP method.
    pub method: String,
}

/// Structured payload behind a "View details" action.
#[derive(Debug, Clone, Serialize)]
pub struct AlertDetails {
    /// The failing request.
    pub request: RequestSummary,
    /// The error, as JSON.
    pub error: Value,
}

/// One alert-level notification.
#[derive(Debug, Clone)]
pub struct Alert {
    /// Human-readable message.
    pub message: String,
    /// Optional structured details.
    pub details: Option<AlertDetails>,
}

/// Receives alerts raised by the pipeline.
pub trait NotificationSink: Send + Sync {
    /// Deliver one alert to the user.
    fn alert(&self, alert: Alert);
}

/// Sink that forwards alerts to the tracing subscriber.
#[derive(Debug, Default)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn alert(&self, alert: Alert) {
        match &alert.details {
            Some(details) => tracing::error!(
                message = %alert.message,
                url = %details.request.url,
                method = %details.request.method,
                "Request alert"
            ),
            None => tracing::error!(message = %alert.message, "Request alert"),
        }
    }
}

/// Sink that records alerts for later inspection.
#[derive(Debug, Default)]
pub struct MemorySink {
    alerts: Mutex<Vec<Alert>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of received alerts, oldest first.
    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts
            .lock()
            .expect("notification sink mutex poisoned")
            .clone()
    }

    /// Number of received alerts.
    pub fn len(&self) -> usize {
        self.alerts
            .lock()
            .expect("notification sink mutex poisoned")
            .len()
    }

    /// True when no alert has been received.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NotificationSink for MemorySink {
    fn alert(&self, alert: Alert) {
        self.alerts
            .lock()
            .expect("notification sink mutex poisoned")
            .push(alert);
    }
}
