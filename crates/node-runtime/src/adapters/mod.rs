//! # Adapters
//!
//! The node's outward faces: an axum HTTP API and an in-process transport
//! for clients embedded in the same process.

pub mod http_api;
pub mod local_transport;

pub use http_api::{build_router, serve};
pub use local_transport::LocalTransport;
