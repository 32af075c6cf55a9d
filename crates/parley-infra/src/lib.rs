//! Infrastructure layer for Parley.
//!
//! Contains implementations of the traits defined in `parley-core`:
//! SQLite conversation storage, the Groq delivery tiers, and the
//! configuration loader.

pub mod config;
pub mod llm;
pub mod sqlite;
