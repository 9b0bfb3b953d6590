//! HTTP API layer for lendlocal.
//!
//! This crate provides the REST API and real-time streaming:
//!
//! - **Endpoints**: resource routers nested under `/api`
//! - **Extractors**: authentication
//! - **Middleware**: bearer-token resolution
//! - **Streaming**: WebSocket event relay and presence signals
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;
pub mod streaming;

pub use endpoints::router;
pub use streaming::{StreamingState, streaming_handler};
