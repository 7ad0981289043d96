//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

use coriolis_client::nav::MemoryNavigator;
use coriolis_client::notify::MemorySink;
use coriolis_client::session::MemorySession;
use coriolis_client::transport::{
    ApiResponse, CancelSignal, ResponseBody, Transport, TransportError, TransportRequest,
};
use coriolis_client::{ClientConfig, RequestPipeline};

/// Scripted outcome for one dispatched request.
pub enum MockOutcome {
    Ok(ApiResponse),
    Err(TransportError),
    /// Stay pending until the cancel signal fires.
    HangUntilCancel,
}

/// 200 response with a JSON payload.
pub fn json_ok(value: Value) -> MockOutcome {
    MockOutcome::Ok(ApiResponse {
        status: 200,
        status_text: "OK".to_string(),
        data: ResponseBody::Json(value),
    })
}

/// Non-2xx response with a JSON payload.
pub fn error_response(status: u16, status_text: &str, body: Value) -> MockOutcome {
    MockOutcome::Err(TransportError::Response(ApiResponse {
        status,
        status_text: status_text.to_string(),
        data: ResponseBody::Json(body),
    }))
}

/// Transport that replays scripted outcomes and records every dispatch.
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<MockOutcome>>,
    dispatched: AtomicU32,
    requests: Mutex<Vec<TransportRequest>>,
}

impl MockTransport {
    pub fn scripted(outcomes: Vec<MockOutcome>) -> Self {
        Self {
            script: Mutex::new(outcomes.into()),
            dispatched: AtomicU32::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// How many requests reached the transport.
    pub fn dispatched(&self) -> u32 {
        self.dispatched.load(Ordering::SeqCst)
    }

    /// Every request that reached the transport, in order.
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn dispatch(
        &self,
        request: TransportRequest,
        cancel: Option<CancelSignal>,
    ) -> Result<ApiResponse, TransportError> {
        self.dispatched.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);

        let outcome = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(MockOutcome::Err(TransportError::Setup(
                "mock script exhausted".to_string(),
            )));

        match outcome {
            MockOutcome::Ok(response) => Ok(response),
            MockOutcome::Err(err) => Err(err),
            MockOutcome::HangUntilCancel => match cancel {
                Some(signal) => {
                    signal.triggered().await;
                    Err(TransportError::Cancelled)
                }
                None => {
                    // Not cancelable; settle as a timeout eventually.
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Err(TransportError::NoResponse)
                }
            },
        }
    }
}

/// A pipeline wired to in-memory boundaries and a scripted transport.
pub struct Harness {
    pub pipeline: Arc<RequestPipeline>,
    pub transport: Arc<MockTransport>,
    pub sink: Arc<MemorySink>,
    pub navigator: Arc<MemoryNavigator>,
    pub session: Arc<MemorySession>,
}

/// Build a harness starting at the root location.
pub fn harness(script: Vec<MockOutcome>) -> Harness {
    harness_at("/", script)
}

/// Build a harness with the user at `location`.
pub fn harness_at(location: &str, script: Vec<MockOutcome>) -> Harness {
    let transport = Arc::new(MockTransport::scripted(script));
    let sink = Arc::new(MemorySink::new());
    let navigator = Arc::new(MemoryNavigator::at(location));
    let session = Arc::new(MemorySession::new());

    let pipeline = Arc::new(RequestPipeline::new(
        &ClientConfig::default(),
        transport.clone(),
        session.clone(),
        navigator.clone(),
        sink.clone(),
    ));

    Harness {
        pipeline,
        transport,
        sink,
        navigator,
        session,
    }
}

/// Start a simple mock backend that returns a fixed response.
pub async fn start_mock_backend(addr: SocketAddr, status_line: &'static str, body: &'static str) {
    let listener = TcpListener::bind(addr).await.unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_line,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}

/// Start a mock backend that waits `delay` before answering 200.
pub async fn start_slow_backend(addr: SocketAddr, delay: Duration, body: &'static str) {
    let listener = TcpListener::bind(addr).await.unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        let response = format!(
                            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}
