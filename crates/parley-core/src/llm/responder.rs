//! Tiered reply resolution.
//!
//! Routes an utterance through the primary client tier, then the secondary
//! transport tier, then a local template. The first tier that returns any
//! non-error result wins, degraded results included. Tier errors are logged
//! and swallowed; the local tier cannot fail, so neither can the responder.

use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use parley_types::llm::{LlmError, TierKind};

use super::box_provider::BoxProviderClient;

/// Reply produced when every network tier is unavailable.
pub fn local_fallback_reply(utterance: &str) -> String {
    format!("I received: \"{utterance}\" — (AI service unavailable, this is a fallback reply)")
}

/// Which tier answered, and with what.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub text: String,
    pub tier: TierKind,
    /// True when the text is a serialized response of unexpected shape.
    pub degraded: bool,
}

/// Ordered fallback chain over the network tiers plus the local template.
#[derive(Debug)]
pub struct AiResponder {
    tiers: Vec<(TierKind, BoxProviderClient)>,
}

impl AiResponder {
    /// Build a responder from the two network tiers, in order.
    ///
    /// Pass `BoxProviderClient::null(..)` for a tier that is not configured.
    pub fn new(primary: BoxProviderClient, secondary: BoxProviderClient) -> Self {
        Self {
            tiers: vec![
                (TierKind::Primary, primary),
                (TierKind::Secondary, secondary),
            ],
        }
    }

    /// A responder with no network tiers; always answers locally.
    pub fn local_only() -> Self {
        Self::new(
            BoxProviderClient::null("primary"),
            BoxProviderClient::null("secondary"),
        )
    }

    /// Whether any network tier is configured.
    pub fn has_network_tier(&self) -> bool {
        self.tiers.iter().any(|(_, client)| client.is_configured())
    }

    /// Resolve a reply, reporting which tier produced it.
    ///
    /// Tiers run strictly one after another. Cancelling `cancel` aborts the
    /// in-flight tier, skips the remaining network tiers, and answers locally.
    pub async fn resolve(&self, utterance: &str, cancel: &CancellationToken) -> Resolution {
        for (kind, client) in &self.tiers {
            if !client.is_configured() {
                debug!(tier = %kind, client = client.name(), "Tier not configured, skipping");
                continue;
            }
            if cancel.is_cancelled() {
                break;
            }

            let start = Instant::now();
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(LlmError::Cancelled),
                result = client.complete(utterance) => result,
            };
            let latency_ms = start.elapsed().as_millis() as u64;

            match result {
                Ok(reply) => {
                    let degraded = reply.is_degraded();
                    let text = reply.into_text();
                    if degraded {
                        warn!(
                            tier = %kind,
                            client = client.name(),
                            "Unexpected response shape, using serialized response"
                        );
                    }
                    info!(tier = %kind, client = client.name(), latency_ms, "Reply resolved");
                    return Resolution {
                        text,
                        tier: *kind,
                        degraded,
                    };
                }
                Err(LlmError::Cancelled) => {
                    info!(tier = %kind, client = client.name(), "Reply cancelled by caller");
                    break;
                }
                Err(err) => {
                    warn!(
                        tier = %kind,
                        client = client.name(),
                        latency_ms,
                        error = %err,
                        "Tier failed, trying next"
                    );
                }
            }
        }

        info!(tier = %TierKind::Local, "Answering with local fallback");
        Resolution {
            text: local_fallback_reply(utterance),
            tier: TierKind::Local,
            degraded: false,
        }
    }

    /// Resolve a reply. Never fails.
    pub async fn resolve_reply(&self, utterance: &str, cancel: &CancellationToken) -> String {
        self.resolve(utterance, cancel).await.text
    }
}
