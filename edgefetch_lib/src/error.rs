//! Error types for the library layer.

use std::fmt;

use crate::prune::PruneError;

/// Errors produced by the library layer, wrapping client and pruning errors
/// and adding probe and input validation failures.
#[derive(Debug)]
pub enum EdgeFetchError {
    /// An error from the underlying API client.
    Api(edgefetch_api::Error),
    /// The probe endpoint answered with a non-2xx status.
    Probe(edgefetch_api::FetchFailure),
    /// Standalone bundle cleanup failed.
    Prune(PruneError),
    /// JSON serialization or deserialization failed.
    Serialization(serde_json::Error),
    /// User-provided input failed validation.
    InvalidInput(String),
}

impl fmt::Display for EdgeFetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api(e) => write!(f, "API error: {}", e),
            Self::Probe(e) => write!(f, "Probe error: {}", e),
            Self::Prune(e) => write!(f, "Prune error: {}", e),
            Self::Serialization(e) => write!(f, "Serialization error: {}", e),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for EdgeFetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Api(e) => Some(e),
            Self::Probe(e) => Some(e),
            Self::Prune(e) => Some(e),
            Self::Serialization(e) => Some(e),
            Self::InvalidInput(_) => None,
        }
    }
}

impl From<edgefetch_api::Error> for EdgeFetchError {
    fn from(e: edgefetch_api::Error) -> Self {
        Self::Api(e)
    }
}

impl From<edgefetch_api::FetchFailure> for EdgeFetchError {
    fn from(e: edgefetch_api::FetchFailure) -> Self {
        Self::Probe(e)
    }
}

impl From<PruneError> for EdgeFetchError {
    fn from(e: PruneError) -> Self {
        Self::Prune(e)
    }
}

impl From<serde_json::Error> for EdgeFetchError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e)
    }
}
