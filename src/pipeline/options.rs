//! Per-call request options.

use std::collections::HashMap;

use reqwest::Method;
use serde_json::Value;

use crate::transport::ResponseKind;

/// Everything a caller can say about one request.
///
/// Built with the fluent methods; only `url` is required.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// Absolute URL or backend-relative path.
    pub url: String,
    /// HTTP method, GET by default.
    pub method: Method,
    /// Extra headers, merged over the pipeline's default headers.
    pub headers: HashMap<String, String>,
    /// Optional JSON body.
    pub data: Option<Value>,
    /// Body decoding, JSON by default.
    pub response_kind: ResponseKind,
    /// Group tag registering this call as cancelable.
    pub cancel_id: Option<String>,
    /// Suppress the user-facing alert on failure; the call still fails and
    /// is still logged.
    pub quiet_error: bool,
    /// Suppress both REQUEST and RESPONSE log entries for this call.
    pub skip_log: bool,
    /// Read the response cache before sending and write it after success.
    pub cache: bool,
    /// Max age in milliseconds for a cached value; absent means a cached
    /// value is never considered stale. Only meaningful with `cache`.
    pub cache_for_ms: Option<u64>,
}

impl RequestOptions {
    /// Options for a plain GET of `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::GET,
            headers: HashMap::new(),
            data: None,
            response_kind: ResponseKind::default(),
            cancel_id: None,
            quiet_error: false,
            skip_log: false,
            cache: false,
            cache_for_ms: None,
        }
    }

    /// Set the HTTP method.
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Add one header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the JSON body.
    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Set the body decoding.
    pub fn response_kind(mut self, kind: ResponseKind) -> Self {
        self.response_kind = kind;
        self
    }

    /// Register this call as cancelable under `tag`.
    pub fn cancel_id(mut self, tag: impl Into<String>) -> Self {
        self.cancel_id = Some(tag.into());
        self
    }

    /// Suppress the failure alert.
    pub fn quiet_error(mut self) -> Self {
        self.quiet_error = true;
        self
    }

    /// Suppress diagnostic logging for this call.
    pub fn skip_log(mut self) -> Self {
        self.skip_log = true;
        self
    }

    /// Serve from and populate the response cache, with no staleness bound.
    pub fn cached(mut self) -> Self {
        self.cache = true;
        self
    }

    /// Serve from and populate the response cache, treating entries older
    /// than `max_age_ms` milliseconds as stale.
    pub fn cached_for(mut self, max_age_ms: u64) -> Self {
        self.cache = true;
        self.cache_for_ms = Some(max_age_ms);
        self
    }
}
