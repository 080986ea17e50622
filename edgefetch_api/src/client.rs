//! JSON HTTP client with a query-string fallback for hosts that lose
//! request bodies.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CACHE_CONTROL, CONTENT_TYPE, PRAGMA};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::{build_path, ClientConfig, Error, FetchResult};

/// HTTP client that exchanges JSON with a single base URL.
///
/// Every call performs exactly one round-trip with caching disabled and
/// returns a [`FetchResult`]. Non-2xx responses are returned, not raised.
/// The client holds no per-call state, so clones can be used concurrently.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    config: ClientConfig,
}

impl Client {
    /// Creates a client from an explicit configuration.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let http = reqwest::Client::builder().build().map_err(|e| {
            tracing::error!("Failed to build HTTP client: {}", e);
            Error::Transport(e)
        })?;
        Ok(Self { http, config })
    }

    /// Creates a client with a custom base URL and default settings. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str) -> Result<Self, Error> {
        Self::new(ClientConfig::new(base_url))
    }

    /// Creates a client configured from `EDGEFETCH_*` environment variables.
    pub fn from_env() -> Result<Self, Error> {
        Self::new(ClientConfig::from_env())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url_for(&self, path_and_query: &str) -> String {
        format!("{}{}", self.config.base_url, path_and_query)
    }

    /// Sends one request to a fully formed `url`.
    ///
    /// `Accept` and `Content-Type` default to `application/json`; entries in
    /// `headers` replace defaults with the same name. The response body is
    /// parsed as JSON whatever the status.
    pub async fn request<T>(
        &self,
        method: Method,
        url: &str,
        body: Option<String>,
        headers: &HeaderMap,
    ) -> Result<FetchResult<T>, Error>
    where
        T: DeserializeOwned,
    {
        let url = Url::parse(url).map_err(|e| {
            tracing::error!("Invalid URL constructed: {}", e);
            Error::InvalidUrl {
                url: url.to_string(),
                reason: e.to_string(),
            }
        })?;

        let mut merged = default_headers();
        merged.extend(headers.clone());

        tracing::debug!(%method, %url, has_body = body.is_some(), "dispatching request");

        let mut builder = self.http.request(method, url).headers(merged);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let resp = builder.send().await.map_err(|e| {
            tracing::error!("Failed to send request: {}", e);
            Error::Transport(e)
        })?;

        let status = resp.status();
        let body = resp.bytes().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::Transport(e)
        })?;

        FetchResult::from_body(status.as_u16(), status.is_success(), &body).inspect_err(|e| {
            tracing::error!("Failed to parse response: {} | body: {}", e, truncate_body(&body));
        })
    }

    /// `GET path?params`. Never sends a body.
    pub async fn get<T, P>(
        &self,
        path: &str,
        params: &P,
        headers: &HeaderMap,
    ) -> Result<FetchResult<T>, Error>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let url = self.url_for(&build_path(path, params)?);
        self.request(Method::GET, &url, None, headers).await
    }

    /// `DELETE path?params`. Never sends a body.
    pub async fn delete<T, P>(
        &self,
        path: &str,
        params: &P,
        headers: &HeaderMap,
    ) -> Result<FetchResult<T>, Error>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let url = self.url_for(&build_path(path, params)?);
        self.request(Method::DELETE, &url, None, headers).await
    }

    /// `POST` with `params` as a JSON body, or as query parameters when
    /// [`ClientConfig::edge_compat`] is set.
    pub async fn post<T, P>(
        &self,
        path: &str,
        params: &P,
        headers: &HeaderMap,
    ) -> Result<FetchResult<T>, Error>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        self.send(Method::POST, path, params, headers).await
    }

    /// `PUT` with the same payload encoding rules as [`Client::post`].
    pub async fn put<T, P>(
        &self,
        path: &str,
        params: &P,
        headers: &HeaderMap,
    ) -> Result<FetchResult<T>, Error>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        self.send(Method::PUT, path, params, headers).await
    }

    async fn send<T, P>(
        &self,
        method: Method,
        path: &str,
        params: &P,
        headers: &HeaderMap,
    ) -> Result<FetchResult<T>, Error>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        if self.config.edge_compat {
            let url = self.url_for(&build_path(path, params)?);
            if url.len() > self.config.max_url_len {
                tracing::warn!(
                    len = url.len(),
                    max = self.config.max_url_len,
                    "query-string payload exceeds URL length limit; intermediaries may reject or truncate it"
                );
            }
            return self.request(method, &url, None, headers).await;
        }

        let body = encode_body(params)?;
        self.request(method, &self.url_for(path), Some(body), headers)
            .await
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers
}

/// Serializes a request body. Absent params (`()` or `null`) become `{}`.
fn encode_body<P>(params: &P) -> Result<String, Error>
where
    P: Serialize + ?Sized,
{
    let value = serde_json::to_value(params).map_err(|e| Error::InvalidParams(e.to_string()))?;
    let value = match value {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    Ok(value.to_string())
}

fn truncate_body(body: &[u8]) -> String {
    const MAX: usize = 2000;
    let text = String::from_utf8_lossy(body);
    if text.len() <= MAX {
        text.into_owned()
    } else {
        let cut = (0..=MAX).rev().find(|&i| text.is_char_boundary(i)).unwrap_or(0);
        format!("{}...[truncated]", &text[..cut])
    }
}
