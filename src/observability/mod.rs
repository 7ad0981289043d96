//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All modules produce:
//!     → structured log events (tracing macros)
//!     → the diagnostics request log (separate, user-visible trail)
//!
//! Consumers:
//!     → stdout via the subscriber installed by logging.rs
//!     → the diagnostics viewer / CLI log dump
//! ```
//!
//! # Design Decisions
//! - The request log in `diagnostics` is a product feature, not telemetry;
//!   tracing output is for operators and stays out of the pipeline's
//!   control flow

pub mod logging;
