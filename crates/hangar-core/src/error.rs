//! Error types for Hangar Core
//!
//! Three families live here:
//! - [`GenerationError`]: the outcome of a failed `generate` call, surfaced to the presentation layer.
//! - [`PersistenceWarning`]: non-fatal store trouble. Logged, never returned from manager operations.
//! - [`HangarError`]: configuration and adapter plumbing (files, HTTP client setup, stores).

use thiserror::Error;

/// Result type alias for Hangar operations
pub type Result<T> = std::result::Result<T, HangarError>;

/// Failure of a single generation request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The trimmed prompt was empty; the generation service was not contacted
    #[error("Prompt is empty")]
    EmptyPrompt,

    /// The service answered but without a usable artifact reference
    #[error("Generation service returned no model URL")]
    EmptyResponse,

    /// Network failure, timeout, non-2xx status or undecodable body
    #[error("Transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GenerationError::Transport(format!("request timed out: {}", e))
        } else {
            GenerationError::Transport(e.to_string())
        }
    }
}

/// Recoverable persistence problem
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceWarning {
    #[error("Failed to read history from store: {0}")]
    Read(String),

    #[error("Failed to write history to store: {0}")]
    Write(String),

    #[error("Stored history is unreadable, starting empty: {0}")]
    Corrupt(String),
}

/// Hangar error type
#[derive(Error, Debug)]
pub enum HangarError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("HTTP client error: {0}")]
    Http(String),
}

impl From<serde_json::Error> for HangarError {
    fn from(e: serde_json::Error) -> Self {
        HangarError::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for HangarError {
    fn from(e: reqwest::Error) -> Self {
        HangarError::Http(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_error_display() {
        assert_eq!(GenerationError::EmptyPrompt.to_string(), "Prompt is empty");
        assert_eq!(
            GenerationError::Transport("503".to_string()).to_string(),
            "Transport error: 503"
        );
    }

    #[test]
    fn test_serde_error_converts() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let converted: HangarError = err.into();
        assert!(matches!(converted, HangarError::Serialization(_)));
    }

    #[test]
    fn test_reqwest_error_converts() {
        let err = reqwest::Client::new().get("not a url").build().unwrap_err();
        let converted: HangarError = err.into();
        assert!(matches!(converted, HangarError::Http(_)));
    }
}
