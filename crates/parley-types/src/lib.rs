//! Shared domain types for Parley.
//!
//! Conversation and message types, LLM tier types, configuration, and the
//! error enums shared by the core, infrastructure and API crates.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod conversation;
pub mod error;
pub mod llm;
