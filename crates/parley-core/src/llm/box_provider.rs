//! BoxProviderClient -- object-safe dynamic dispatch wrapper for ProviderClient.
//!
//! 1. Define an object-safe `ProviderClientDyn` trait with boxed futures
//! 2. Blanket-impl `ProviderClientDyn` for all `T: ProviderClient`
//! 3. `BoxProviderClient` wraps `Box<dyn ProviderClientDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use parley_types::llm::{LlmError, TierReply};

use super::provider::{NullProviderClient, ProviderClient};

/// Object-safe version of [`ProviderClient`] with boxed futures.
pub trait ProviderClientDyn: Send + Sync {
    fn name(&self) -> &str;

    fn is_configured(&self) -> bool;

    fn complete_boxed<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<TierReply, LlmError>> + Send + 'a>>;
}

impl<T: ProviderClient> ProviderClientDyn for T {
    fn name(&self) -> &str {
        ProviderClient::name(self)
    }

    fn is_configured(&self) -> bool {
        ProviderClient::is_configured(self)
    }

    fn complete_boxed<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<TierReply, LlmError>> + Send + 'a>> {
        Box::pin(self.complete(prompt))
    }
}

/// Type-erased provider client so tiers can be chosen at runtime.
///
/// Since `ProviderClient` uses RPITIT, it cannot be used as a trait object
/// directly; this wrapper delegates to the inner `ProviderClientDyn`.
pub struct BoxProviderClient {
    inner: Box<dyn ProviderClientDyn + Send + Sync>,
}

impl BoxProviderClient {
    /// Wrap a concrete `ProviderClient` in a type-erased box.
    pub fn new<T: ProviderClient + 'static>(client: T) -> Self {
        Self {
            inner: Box::new(client),
        }
    }

    /// A tier that is never attempted.
    pub fn null(name: &str) -> Self {
        Self::new(NullProviderClient::new(name))
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn is_configured(&self) -> bool {
        self.inner.is_configured()
    }

    pub async fn complete(&self, prompt: &str) -> Result<TierReply, LlmError> {
        self.inner.complete_boxed(prompt).await
    }
}

impl std::fmt::Debug for BoxProviderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxProviderClient")
            .field("name", &self.name())
            .field("configured", &self.is_configured())
            .finish()
    }
}
