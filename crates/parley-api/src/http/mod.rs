//! HTTP/REST API layer for Parley.
//!
//! Axum-based REST API at `/api/` with a `{success, ...}` envelope and
//! CORS restricted to the configured frontend origin.

pub mod error;
pub mod handlers;
pub mod router;
