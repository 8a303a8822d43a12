//! Quote generation errors.
//!
//! None of these reach callers of `QuoteService::lookup_quote`; they are
//! logged and resolved through the fallback chain.

use std::time::Duration;

use thiserror::Error;
use trmnl_core::NetworkError;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Empty provider response: {0}")]
    EmptyResponse(&'static str),

    #[error("No JSON object found in response")]
    NoJson,

    #[error("Invalid JSON in response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Quote generation is not configured")]
    Disabled,
}

impl GenerationError {
    /// Whether the provider itself was unreachable or refused the request,
    /// as opposed to answering with unusable text.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Status { .. } | Self::Timeout(_)
        )
    }
}
