//! Coriolis API client library.
//!
//! Every outbound call to the Coriolis backend goes through one
//! [`RequestPipeline`]: it merges default headers, serves slow-changing
//! reads from a response cache, registers cancel handles under
//! caller-supplied group tags, keeps a diagnostic request log, classifies
//! failures into a fixed taxonomy, and raises user-visible alerts.
//!
//! The pipeline talks to its host through four injected boundaries:
//! a [`transport::Transport`] for the network, a [`session::SessionStore`]
//! for project context, a [`nav::Navigator`] for the login redirect, and a
//! [`notify::NotificationSink`] for alerts.

pub mod cache;
pub mod config;
pub mod diagnostics;
pub mod nav;
pub mod notify;
pub mod observability;
pub mod pipeline;
pub mod session;
pub mod transport;

pub use config::ClientConfig;
pub use pipeline::{RequestError, RequestOptions, RequestPipeline};
pub use transport::{ApiResponse, HttpTransport, ResponseBody, Transport};
