//! Library layer for edgefetch: request-body diagnostics and deployment
//! bundle cleanup around the `edgefetch_api` client.
//!
//! The probe endpoint reports how a request payload reached the server
//! (body or query string), which is how a host with broken body streaming
//! is detected before enabling the client's compatibility fallback.

pub mod error;
pub mod probe;
pub mod prune;
pub mod validation;

pub use edgefetch_api;
pub use edgefetch_api::types;
pub use edgefetch_api::{
    build_path, header, Client, ClientConfig, ErrorResponse, FetchFailure, FetchResult, Method,
};

pub use error::EdgeFetchError;
pub use probe::{PayloadSource, ProbeComparison, ProbeOutcome, ProbeReport, PROBE_PATH};
pub use prune::{prune_standalone, PruneError, PruneOptions, PruneReport};
