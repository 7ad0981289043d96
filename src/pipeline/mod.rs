//! Request pipeline: the single chokepoint for every backend call.
//!
//! # Responsibilities
//! - Merge default headers and session context into every request
//! - Serve slow-changing reads from the response cache
//! - Register cancel handles grouped by caller-supplied tags
//! - Log request/response pairs for diagnostics
//! - Classify failures and raise user-visible alerts
//! - Redirect to the login route when the session expires
//!
//! # Design Decisions
//! - No retries anywhere; callers re-issue polling calls on their own
//!   schedule
//! - All collaborators are injected at construction, no hidden globals

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::cache::ResponseCache;
use crate::config::ClientConfig;
use crate::diagnostics::{LogEntry, LogStatus, RequestLog};
use crate::nav::{login_redirect, Navigator};
use crate::notify::{Alert, AlertDetails, NotificationSink, RequestSummary};
use crate::session::SessionStore;
use crate::transport::{cancel_pair, ApiResponse, Transport, TransportError, TransportRequest};

pub mod cancel;
pub mod options;

pub use cancel::CancelRegistry;
pub use options::RequestOptions;

/// Notification text for failures where no response arrived.
const CONNECTION_FAILED_MESSAGE: &str =
    "Request failed, there might be a problem with the connection to the server.";

/// Hard limit on the URL portion of a notification message.
const TRUNCATE_URL_AT: usize = 100;

/// How a pipeline call can fail.
///
/// Mirrors the transport taxonomy one-to-one; the pipeline adds its
/// reactions (logging, alerting, redirect) but never changes the bucket.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The server answered with a non-2xx status; the response is carried.
    #[error("server returned status {}", .0.status)]
    Server(ApiResponse),

    /// The request was sent but nothing came back.
    #[error("no response from server")]
    NoResponse,

    /// The call was canceled through its group tag.
    #[error("request canceled")]
    Cancelled,

    /// The request never reached the transport.
    #[error("request setup failed: {0}")]
    Setup(String),
}

impl RequestError {
    /// The `canceled` flag the web console attached to non-HTTP failures:
    /// `Some(true)` for a canceled call, `Some(false)` for a setup failure,
    /// `None` for the HTTP buckets.
    pub fn canceled(&self) -> Option<bool> {
        match self {
            RequestError::Cancelled => Some(true),
            RequestError::Setup(_) => Some(false),
            _ => None,
        }
    }
}

/// Mediates all outbound calls from the console to the backend REST API.
pub struct RequestPipeline {
    transport: Arc<dyn Transport>,
    session: Arc<dyn SessionStore>,
    navigator: Arc<dyn Navigator>,
    notifications: Arc<dyn NotificationSink>,
    cache: ResponseCache,
    log: RequestLog,
    cancelables: CancelRegistry,
    default_headers: Mutex<HashMap<String, String>>,
    base_url: String,
    login_path: String,
    auth_exempt_paths: Vec<String>,
}

impl RequestPipeline {
    /// Wire a pipeline from configuration and its boundary collaborators.
    pub fn new(
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
        session: Arc<dyn SessionStore>,
        navigator: Arc<dyn Navigator>,
        notifications: Arc<dyn NotificationSink>,
    ) -> Self {
        let mut default_headers = HashMap::new();
        default_headers.insert("Content-Type".to_string(), "application/json".to_string());

        Self {
            transport,
            session,
            navigator,
            notifications,
            cache: ResponseCache::new(),
            log: RequestLog::new(),
            cancelables: CancelRegistry::new(config.cancel_buffer_capacity),
            default_headers: Mutex::new(default_headers),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            login_path: config.login_path.clone(),
            auth_exempt_paths: config.auth_exempt_paths.clone(),
        }
    }

    /// Send one request.
    ///
    /// Cache reads happen first: a fresh hit resolves immediately with the
    /// cached payload and skips the network, the log, and the cancel
    /// registry entirely.
    pub async fn send(&self, options: RequestOptions) -> Result<ApiResponse, RequestError> {
        let url = self.resolve_url(&options.url);

        if options.cache {
            let max_age = options.cache_for_ms.map(Duration::from_millis);
            if let Some(data) = self.cache.load(&url, max_age) {
                tracing::debug!(url = %url, "Serving response from cache");
                return Ok(ApiResponse {
                    status: 200,
                    status_text: "OK".to_string(),
                    data,
                });
            }
        }

        let request_id = Uuid::new_v4();
        let headers = {
            let defaults = self
                .default_headers
                .lock()
                .expect("default headers mutex poisoned");
            let mut merged = defaults.clone();
            merged.extend(options.headers.clone());
            merged
        };

        let request = TransportRequest {
            request_id,
            method: options.method.clone(),
            url: url.clone(),
            headers,
            body: options.data.clone(),
            response_kind: options.response_kind,
        };

        // The handle goes into the buffer before dispatch so a cancel that
        // lands while the call is in flight always finds it.
        let cancel = options.cancel_id.as_deref().map(|tag| {
            let (handle, signal) = cancel_pair();
            self.cancelables.register(tag, Box::new(handle));
            signal
        });

        if !options.skip_log {
            self.log
                .log(LogEntry::request(request_id, &url, options.method.as_str()));
        }
        tracing::debug!(method = %options.method, url = %url, request_id = %request_id, "Dispatching request");

        match self.transport.dispatch(request, cancel).await {
            Ok(response) => {
                if !options.skip_log {
                    self.log.log(LogEntry::response(
                        request_id,
                        &url,
                        options.method.as_str(),
                        LogStatus::Code(200),
                    ));
                }
                if options.cache {
                    self.cache.save(&url, response.data.clone());
                }
                Ok(response)
            }
            Err(err) => Err(self.handle_failure(&options, &url, request_id, err)),
        }
    }

    /// Convenience GET with all defaults.
    pub async fn get(&self, url: impl Into<String>) -> Result<ApiResponse, RequestError> {
        self.send(RequestOptions::new(url)).await
    }

    /// Cancel every in-flight request registered under `group_tag`.
    pub fn cancel_requests(&self, group_tag: &str) {
        let fired = self.cancelables.cancel_group(group_tag);
        if fired > 0 {
            tracing::debug!(group = %group_tag, count = fired, "Canceled in-flight requests");
        }
    }

    /// Set or clear a process-wide default header.
    ///
    /// Takes effect for calls not yet dispatched; in-flight calls keep the
    /// headers they were built with.
    pub fn set_default_header(&self, name: &str, value: Option<&str>) {
        let mut headers = self
            .default_headers
            .lock()
            .expect("default headers mutex poisoned");
        match value {
            Some(value) => {
                headers.insert(name.to_string(), value.to_string());
            }
            None => {
                headers.remove(name);
            }
        }
    }

    /// The currently selected project, if any.
    pub fn project_id(&self) -> Option<String> {
        self.session.project_id()
    }

    /// The diagnostic request log.
    pub fn request_log(&self) -> &RequestLog {
        &self.log
    }

    /// The response cache.
    pub fn response_cache(&self) -> &ResponseCache {
        &self.cache
    }

    fn resolve_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else if url.starts_with('/') {
            format!("{}{}", self.base_url, url)
        } else {
            format!("{}/{}", self.base_url, url)
        }
    }

    fn handle_failure(
        &self,
        options: &RequestOptions,
        url: &str,
        request_id: Uuid,
        err: TransportError,
    ) -> RequestError {
        let method = options.method.as_str();
        match err {
            TransportError::Response(response) => {
                let message = server_message(&response);
                if !options.skip_log {
                    let mut entry = LogEntry::response(
                        request_id,
                        url,
                        method,
                        LogStatus::Code(response.status),
                    );
                    if let Some(message) = &message {
                        entry = entry.with_error(message.clone());
                    }
                    self.log.log(entry);
                }

                let on_login = self.on_login_page();
                let suppress = options.quiet_error || (response.status == 401 && on_login);
                if !suppress {
                    let status_label = if response.status_text.is_empty() {
                        response.status.to_string()
                    } else {
                        response.status_text.clone()
                    };
                    let message = message
                        .unwrap_or_else(|| format!("{} {}", status_label, truncated_url(url)));
                    self.alert(options, url, message, response.data.to_json_value());
                }

                if response.status == 401 {
                    self.maybe_redirect_to_login(url, on_login);
                }
                RequestError::Server(response)
            }
            TransportError::NoResponse => {
                if !options.skip_log {
                    self.log.log(
                        LogEntry::response(request_id, url, method, LogStatus::Code(500))
                            .with_description("No response"),
                    );
                }
                if !(self.on_login_page() || options.quiet_error) {
                    let message = format!("{} {}", CONNECTION_FAILED_MESSAGE, truncated_url(url));
                    self.alert(options, url, message, json!({}));
                }
                RequestError::NoResponse
            }
            TransportError::Cancelled => {
                if !options.skip_log {
                    self.log.log(LogEntry::response(
                        request_id,
                        url,
                        method,
                        LogStatus::Canceled,
                    ));
                }
                tracing::debug!(url = %url, "Request canceled");
                RequestError::Cancelled
            }
            TransportError::Setup(reason) => {
                if !options.skip_log {
                    self.log.log(
                        LogEntry::response(request_id, url, method, LogStatus::Code(500))
                            .with_description("Something happened in setting up the request")
                            .with_error(reason.clone()),
                    );
                }
                // Setup failures always alert; quiet_error does not apply.
                let message = format!("{} {}", CONNECTION_FAILED_MESSAGE, truncated_url(url));
                self.alert(options, url, message, Value::String(reason.clone()));
                RequestError::Setup(reason)
            }
        }
    }

    fn alert(&self, options: &RequestOptions, url: &str, message: String, error: Value) {
        self.notifications.alert(Alert {
            message,
            details: Some(AlertDetails {
                request: RequestSummary {
                    url: url.to_string(),
                    method: options.method.to_string(),
                },
                error,
            }),
        });
    }

    /// True when the current path is the login route or one of its
    /// sub-paths. Sibling routes sharing the prefix (`/login-help`) do
    /// not count.
    fn on_login_page(&self) -> bool {
        let path = self.navigator.current_location().path;
        path == self.login_path
            || path
                .strip_prefix(&self.login_path)
                .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Redirect to the login route, unless the user is already there or the
    /// URL is one of the paths that legitimately return 401.
    fn maybe_redirect_to_login(&self, url: &str, on_login: bool) {
        if on_login {
            return;
        }
        if self
            .auth_exempt_paths
            .iter()
            .any(|path| url.contains(path.as_str()))
        {
            return;
        }
        let current = self.navigator.current_location();
        let target = login_redirect(&self.login_path, &current);
        tracing::info!(from = %current.path_and_query(), "Session expired, redirecting to login");
        self.navigator.navigate(&target);
    }
}

/// Server-provided error message, when the payload carries one.
///
/// The Coriolis API nests messages under `error.message`; a few endpoints
/// return a top-level `message` instead.
fn server_message(response: &ApiResponse) -> Option<String> {
    let data = response.data.as_json()?;
    data.get("error")
        .and_then(|error| error.get("message"))
        .or_else(|| data.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Path-only, doubled, hard-truncated rendering of a URL for notifications.
fn truncated_url(raw: &str) -> String {
    let relative = match url::Url::parse(raw) {
        Ok(parsed) => {
            let mut path = parsed.path().to_string();
            if let Some(query) = parsed.query() {
                path.push('?');
                path.push_str(query);
            }
            path
        }
        Err(_) => raw.to_string(),
    };

    // The path is doubled before truncation, matching the notification
    // format the console has always shown.
    let mut doubled = relative.clone();
    doubled.push_str(&relative);
    if doubled.len() > TRUNCATE_URL_AT {
        let mut truncated: String = doubled.chars().take(TRUNCATE_URL_AT).collect();
        truncated.push_str("...");
        truncated
    } else {
        doubled
    }
}
