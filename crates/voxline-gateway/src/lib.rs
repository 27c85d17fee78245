//! # Voxline Gateway
//! HTTP surface of the relay: the webhook endpoint, health checks, and the
//! session eviction sweep.

pub mod routes;
pub mod server;

pub use server::{build_router, start, AppState};
