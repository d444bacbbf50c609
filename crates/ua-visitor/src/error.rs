//! Error types for the visitor client.

use crate::types::HitType;

/// Errors that can occur while recording or delivering hits.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A hit was recorded without one of its required parameters.
    #[error("Missing required parameter `{parameter}` for {hit} hit")]
    MissingParameter {
        hit: HitType,
        parameter: &'static str,
    },

    /// The collection endpoint rejected a hit.
    #[error("Collection endpoint responded with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// A background send was requested outside of a tokio runtime.
    #[error("No tokio runtime available to deliver queued hits")]
    NoRuntime,
}

impl Error {
    /// Whether this error came from parameter validation rather than delivery.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::MissingParameter { .. })
    }
}
