//! Transport boundary between the request pipeline and the network.
//!
//! # Responsibilities
//! - Define the request/response shapes the pipeline works with
//! - Classify every failure into exactly one taxonomy variant
//! - Provide cooperative cancellation primitives
//!
//! # Design Decisions
//! - Failures are a tagged union, one variant per bucket; the pipeline
//!   dispatches on the discriminant, never on field presence
//! - Cancel handles expose a single `cancel()` capability so the pipeline
//!   never depends on a transport-specific token type

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Notify;
use uuid::Uuid;

pub mod http;

pub use http::HttpTransport;

/// How a response body should be decoded.
///
/// The browser console distinguished json/text/blob/arraybuffer/document/
/// stream; outside a browser the binary kinds collapse into [`Bytes`].
///
/// [`Bytes`]: ResponseKind::Bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseKind {
    /// Decode the body as JSON (the default).
    #[default]
    Json,
    /// Keep the body as UTF-8 text.
    Text,
    /// Keep the raw bytes.
    Bytes,
}

/// Decoded response payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    /// JSON payload.
    Json(Value),
    /// Plain text payload.
    Text(String),
    /// Raw bytes payload.
    Bytes(Vec<u8>),
}

impl ResponseBody {
    /// Borrow the payload as JSON, if it was decoded as JSON.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Convert the payload into a JSON value for diagnostics.
    pub fn to_json_value(&self) -> Value {
        match self {
            ResponseBody::Json(value) => value.clone(),
            ResponseBody::Text(text) => Value::String(text.clone()),
            ResponseBody::Bytes(bytes) => Value::String(format!("<{} bytes>", bytes.len())),
        }
    }
}

/// A fully built outbound request, ready for dispatch.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// Correlation ID shared with the request log entries.
    pub request_id: Uuid,
    /// HTTP method.
    pub method: reqwest::Method,
    /// Absolute resource URL.
    pub url: String,
    /// Final header set (defaults already merged in).
    pub headers: HashMap<String, String>,
    /// Optional JSON body.
    pub body: Option<Value>,
    /// Requested body decoding.
    pub response_kind: ResponseKind,
}

/// A response received from the backend.
///
/// Also carried inside [`TransportError::Response`] when the status is
/// outside the 2xx range.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Canonical status text, empty when unknown.
    pub status_text: String,
    /// Decoded body.
    pub data: ResponseBody,
}

/// Failure taxonomy for a dispatched request.
///
/// Exactly one variant applies to any failed call; the buckets are mutually
/// exclusive by construction.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The server responded with a non-2xx status.
    #[error("server returned status {}", .0.status)]
    Response(ApiResponse),

    /// The request was sent but no response arrived (timeout, connection
    /// failure).
    #[error("no response from server")]
    NoResponse,

    /// The call's own cancel handle was invoked.
    #[error("request canceled")]
    Cancelled,

    /// The request never reached the transport (malformed URL, bad header).
    #[error("request setup failed: {0}")]
    Setup(String),
}

/// A capability to abort one in-flight request.
pub trait Cancelable: Send + Sync {
    /// Request cancellation. Safe to call more than once, and after the
    /// request has already settled.
    fn cancel(&self);
}

/// Signal observed by the transport while a request is in flight.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    notify: Arc<Notify>,
}

impl CancelSignal {
    /// Wait until the paired handle fires. Completes immediately if it
    /// already fired.
    pub async fn triggered(&self) {
        self.notify.notified().await;
    }
}

/// Handle half of a cancellation pair.
pub struct SignalHandle {
    notify: Arc<Notify>,
}

impl Cancelable for SignalHandle {
    fn cancel(&self) {
        // notify_one stores a permit, so a cancel that races ahead of the
        // dispatch still takes effect.
        self.notify.notify_one();
    }
}

/// Create a linked cancel handle and signal.
///
/// Dropping the handle without firing it leaves the signal pending forever,
/// so an evicted handle never aborts its request.
pub fn cancel_pair() -> (SignalHandle, CancelSignal) {
    let notify = Arc::new(Notify::new());
    (
        SignalHandle {
            notify: notify.clone(),
        },
        CancelSignal { notify },
    )
}

/// Dispatches one request and classifies the outcome.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request`, honoring `cancel` if supplied.
    async fn dispatch(
        &self,
        request: TransportRequest,
        cancel: Option<CancelSignal>,
    ) -> Result<ApiResponse, TransportError>;
}
