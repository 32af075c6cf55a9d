//! LLM reply resolution for Parley.
//!
//! - `ProviderClient`: RPITIT trait for concrete delivery tiers
//! - `BoxProviderClient`: object-safe wrapper for dynamic dispatch
//! - `AiResponder`: ordered fallback chain that always produces a reply

pub mod box_provider;
pub mod provider;
pub mod responder;
