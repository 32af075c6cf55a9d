//! HTTP request handlers.

pub mod messages;
