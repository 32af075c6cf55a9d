//! ProviderClient trait definition.
//!
//! Every network delivery tier implements this trait. Uses RPITIT for
//! `complete`; `BoxProviderClient` provides the object-safe wrapper.

use parley_types::llm::{LlmError, TierReply};

/// A strategy that turns a prompt into text, or fails.
///
/// Implementations live in parley-infra (e.g., `GroqSdkClient`,
/// `GroqHttpClient`). `NullProviderClient` stands in for a tier whose
/// credentials or client are missing.
pub trait ProviderClient: Send + Sync {
    /// Human-readable client name used in logs (e.g., "groq-sdk").
    fn name(&self) -> &str;

    /// Whether the tier was set up successfully at construction.
    ///
    /// Unconfigured tiers are skipped without being called.
    fn is_configured(&self) -> bool {
        true
    }

    /// Request a single-turn completion for `prompt`.
    fn complete(
        &self,
        prompt: &str,
    ) -> impl std::future::Future<Output = Result<TierReply, LlmError>> + Send;
}

/// Null object for a tier that is not configured.
#[derive(Debug, Clone)]
pub struct NullProviderClient {
    name: String,
}

impl NullProviderClient {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl ProviderClient for NullProviderClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_configured(&self) -> bool {
        false
    }

    async fn complete(&self, _prompt: &str) -> Result<TierReply, LlmError> {
        Err(LlmError::NotConfigured)
    }
}
