//! LLM tier types for Parley.
//!
//! These types model what a delivery tier hands back to the responder:
//! a well-formed answer, a degraded answer built from an unexpected
//! response shape, or an error.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a tier in the responder's fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TierKind {
    Primary,
    Secondary,
    Local,
}

impl fmt::Display for TierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TierKind::Primary => write!(f, "primary"),
            TierKind::Secondary => write!(f, "secondary"),
            TierKind::Local => write!(f, "local"),
        }
    }
}

/// Successful output of a provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierReply {
    /// The first choice's text content.
    Content(String),
    /// The response did not match the expected schema; `raw` is the whole
    /// response serialized as JSON. Still a success.
    UnexpectedShape { raw: String },
}

impl TierReply {
    /// Whether this reply came from the degraded branch.
    pub fn is_degraded(&self) -> bool {
        matches!(self, TierReply::UnexpectedShape { .. })
    }

    /// The text to show to the user.
    pub fn into_text(self) -> String {
        match self {
            TierReply::Content(text) => text,
            TierReply::UnexpectedShape { raw } => raw,
        }
    }
}

/// Errors from LLM provider operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("rate limited")]
    RateLimited,

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("provider not configured")]
    NotConfigured,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("request cancelled")]
    Cancelled,
}
