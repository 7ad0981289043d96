//! reqwest-backed transport adapter.
//!
//! # Responsibilities
//! - Translate a [`TransportRequest`] into a real HTTP call
//! - Race the call against its cancel signal
//! - Map every reqwest failure shape onto the taxonomy

use std::time::Duration;

use async_trait::async_trait;

use crate::transport::{
    ApiResponse, CancelSignal, ResponseBody, ResponseKind, Transport, TransportError,
    TransportRequest,
};

/// HTTP transport over a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Setup(e.to_string()))?;
        Ok(Self { client })
    }

    /// Create a transport around an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn dispatch(
        &self,
        request: TransportRequest,
        cancel: Option<CancelSignal>,
    ) -> Result<ApiResponse, TransportError> {
        let mut builder = self.client.request(request.method.clone(), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let send = builder.send();
        let result = match cancel {
            Some(signal) => {
                tokio::select! {
                    result = send => result,
                    _ = signal.triggered() => return Err(TransportError::Cancelled),
                }
            }
            None => send.await,
        };

        let response = result.map_err(classify_send_error)?;
        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or_default().to_string();
        let data = decode_body(response, request.response_kind).await?;

        let api_response = ApiResponse {
            status: status.as_u16(),
            status_text,
            data,
        };
        if status.is_success() {
            Ok(api_response)
        } else {
            Err(TransportError::Response(api_response))
        }
    }
}

/// Map a reqwest send error onto the failure taxonomy.
///
/// Builder errors mean the call never left the process; everything else
/// means it was sent and nothing came back.
fn classify_send_error(err: reqwest::Error) -> TransportError {
    if err.is_builder() {
        TransportError::Setup(err.to_string())
    } else {
        TransportError::NoResponse
    }
}

async fn decode_body(
    response: reqwest::Response,
    kind: ResponseKind,
) -> Result<ResponseBody, TransportError> {
    match kind {
        ResponseKind::Json => {
            let bytes = response
                .bytes()
                .await
                .map_err(|_| TransportError::NoResponse)?;
            if bytes.is_empty() {
                // 204-style responses decode to null rather than failing.
                return Ok(ResponseBody::Json(serde_json::Value::Null));
            }
            match serde_json::from_slice(&bytes) {
                Ok(value) => Ok(ResponseBody::Json(value)),
                // Non-JSON bodies (plain-text error pages, proxies) fall
                // back to text instead of failing the call.
                Err(_) => Ok(ResponseBody::Text(
                    String::from_utf8_lossy(&bytes).into_owned(),
                )),
            }
        }
        ResponseKind::Text => {
            let text = response
                .text()
                .await
                .map_err(|_| TransportError::NoResponse)?;
            Ok(ResponseBody::Text(text))
        }
        ResponseKind::Bytes => {
            let bytes = response
                .bytes()
                .await
                .map_err(|_| TransportError::NoResponse)?;
            Ok(ResponseBody::Bytes(bytes.to_vec()))
        }
    }
}
