//! Client configuration, injected once at construction.

/// Base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// URL length above which a query-string payload is flagged with a warning.
/// Common proxies and CDNs start rejecting request lines around 8 KiB.
pub const DEFAULT_MAX_URL_LEN: usize = 8192;

const ENV_BASE_URL: &str = "EDGEFETCH_BASE_URL";
const ENV_EDGE_COMPAT: &str = "EDGEFETCH_EDGE_COMPAT";
const ENV_MAX_URL_LEN: &str = "EDGEFETCH_MAX_URL_LEN";

/// Settings for a [`Client`](crate::Client).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Scheme, host and optional prefix prepended to every request path.
    /// Stored without a trailing slash.
    pub base_url: String,
    /// When set, POST and PUT payloads travel in the query string instead of
    /// the request body, for hosts that drop or corrupt request bodies.
    pub edge_compat: bool,
    /// Fallback URLs longer than this are logged as a warning.
    pub max_url_len: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ClientConfig {
    /// Creates a config for `base_url` with body-based POST/PUT.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            edge_compat: false,
            max_url_len: DEFAULT_MAX_URL_LEN,
        }
    }

    /// Enables or disables the query-string fallback for POST/PUT.
    pub fn with_edge_compat(mut self, edge_compat: bool) -> Self {
        self.edge_compat = edge_compat;
        self
    }

    /// Sets the URL length above which fallback requests are flagged.
    pub fn with_max_url_len(mut self, max_url_len: usize) -> Self {
        self.max_url_len = max_url_len;
        self
    }

    /// Reads `EDGEFETCH_BASE_URL`, `EDGEFETCH_EDGE_COMPAT` and
    /// `EDGEFETCH_MAX_URL_LEN` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Missing or unparsable
    /// values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(ENV_BASE_URL)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let edge_compat = lookup(ENV_EDGE_COMPAT)
            .map(|v| parse_flag(&v))
            .unwrap_or(false);
        let max_url_len = lookup(ENV_MAX_URL_LEN)
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_URL_LEN);

        Self::new(base_url.trim())
            .with_edge_compat(edge_compat)
            .with_max_url_len(max_url_len)
    }
}

/// Interprets a boolean-like setting: `1`, `true`, `yes` and `on`
/// (case-insensitive) enable it, anything else disables it.
pub(crate) fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
