//! Error types for the API client.
//!
//! Remote application errors (non-2xx responses) are not represented here:
//! they come back as [`FetchResult::Failure`](crate::FetchResult::Failure).

/// Errors that can occur when making API requests.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The request never produced a usable response (DNS, connection refused,
    /// timeout, or the body stream broke while reading).
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The response body was not valid JSON, or a 2xx body did not match the
    /// expected type.
    #[error("Failed to parse response body (status {status}): {source}")]
    Parse {
        status: u16,
        #[source]
        source: serde_json::Error,
    },
    /// Request parameters could not be serialized, or did not form a JSON object.
    #[error("Invalid request parameters: {0}")]
    InvalidParams(String),
    /// The base URL and path did not combine into a valid absolute URL.
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}
