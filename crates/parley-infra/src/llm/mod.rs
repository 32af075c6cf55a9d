//! Groq delivery tiers.
//!
//! Concrete [`ProviderClient`](parley_core::llm::provider::ProviderClient)
//! implementations for the primary (SDK) and secondary (raw HTTP) tiers,
//! plus [`build_responder`], which wires them into an `AiResponder` from
//! configuration.

pub mod groq_http;
pub mod groq_sdk;

#[cfg(test)]
pub(crate) mod test_server;

use secrecy::SecretString;
use tracing::{info, warn};

use parley_core::llm::box_provider::BoxProviderClient;
use parley_core::llm::responder::AiResponder;
use parley_types::config::ProviderConfig;

use self::groq_http::GroqHttpClient;
use self::groq_sdk::GroqSdkClient;

/// Build the tiered responder from provider configuration.
///
/// Without an API key both network tiers are null and every reply comes
/// from the local fallback. A tier whose client fails to initialize is
/// replaced by a null tier; the other tier is unaffected.
pub fn build_responder(config: &ProviderConfig) -> AiResponder {
    let Some(api_key) = config.api_key() else {
        warn!("No provider API key configured, replies will use the local fallback");
        return AiResponder::local_only();
    };

    let primary = match GroqSdkClient::new(api_key, config) {
        Ok(client) => BoxProviderClient::new(client),
        Err(e) => {
            warn!(error = %e, "Primary client failed to initialize, tier disabled");
            BoxProviderClient::null("groq-sdk")
        }
    };

    let secondary = match GroqHttpClient::new(SecretString::from(api_key.to_string()), config) {
        Ok(client) => BoxProviderClient::new(client),
        Err(e) => {
            warn!(error = %e, "Secondary client failed to initialize, tier disabled");
            BoxProviderClient::null("groq-http")
        }
    };

    info!(
        model = %config.model,
        base_url = %config.base_url,
        primary = primary.is_configured(),
        secondary = secondary.is_configured(),
        "Provider tiers ready"
    );

    AiResponder::new(primary, secondary)
}
