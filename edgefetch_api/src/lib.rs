mod client;
mod config;
mod errors;
mod query;
pub mod types;
pub use self::client::Client;
pub use self::config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_MAX_URL_LEN};
pub use self::errors::Error;
pub use self::query::{build_path, encode_query, params_to_pairs};
pub use self::types::{ErrorBody, ErrorResponse, FetchFailure, FetchResult};
pub use reqwest::header;
pub use reqwest::Method;
