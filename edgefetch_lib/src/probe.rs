//! Request-body delivery probe.
//!
//! Server side, [`router`] exposes `POST /api/debug-poc`, which reports where
//! the request payload turned up: in the body, in the query string, or
//! nowhere. Client side, [`compare`] posts the same payload once per encoding
//! so a broken host shows up as a body-encoded request arriving empty.

use std::collections::BTreeMap;
use std::net::SocketAddr;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, Uri};
use axum::routing::post;
use axum::{Json, Router};
use edgefetch_api::{Client, ClientConfig};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EdgeFetchError;

/// Route the probe handler is mounted on.
pub const PROBE_PATH: &str = "/api/debug-poc";

const PREVIEW_CHARS: usize = 200;

/// Request headers worth calling out: serverless adapters tend to rewrite
/// these when they re-encode or drop the body.
const WATCHED_HEADERS: [&str; 4] = [
    "content-type",
    "content-length",
    "x-scf-is-base64-encoded",
    "x-forwarded-for",
];

/// Where the probe found the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadSource {
    Body,
    Query,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeOutcome {
    Success,
    Failure,
}

/// Report returned by the probe endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeReport {
    pub result: ProbeOutcome,
    pub source: PayloadSource,
    /// Length of the captured payload text in bytes.
    pub body_length: usize,
    /// First 200 characters of the captured payload.
    pub body_preview: String,
    /// Step-by-step trace of what the handler observed.
    pub logs: Vec<String>,
    /// Every request header as received, repeated values joined with `, `.
    pub headers: BTreeMap<String, String>,
}

/// Results of posting the same payload with both encodings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeComparison {
    /// Payload sent as a JSON request body.
    pub body: ProbeReport,
    /// Payload sent as query parameters.
    pub query: ProbeReport,
}

impl ProbeComparison {
    /// True when the body-encoded request arrived with its body intact.
    pub fn body_delivered(&self) -> bool {
        self.body.source == PayloadSource::Body
    }

    /// True when the host loses bodies but the query-string fallback works,
    /// i.e. the client should run with `edge_compat` enabled.
    pub fn needs_edge_compat(&self) -> bool {
        !self.body_delivered() && self.query.source == PayloadSource::Query
    }
}

/// Router serving the probe endpoint.
pub fn router() -> Router {
    Router::new().route(PROBE_PATH, post(debug_probe))
}

/// Bind `addr` and serve the probe endpoint until the process exits.
pub async fn serve(addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, path = PROBE_PATH, "probe endpoint listening");
    axum::serve(listener, router()).await
}

/// POST /api/debug-poc
pub async fn debug_probe(
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Json<ProbeReport> {
    Json(inspect(&method, &uri, &headers, &body))
}

/// Accumulates the trace returned to the caller and mirrors it to the log.
#[derive(Default)]
struct Trace(Vec<String>);

impl Trace {
    fn push(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        tracing::info!("[probe] {}", msg);
        self.0.push(msg);
    }
}

/// Work out where the payload of a request ended up.
pub fn inspect(method: &Method, uri: &Uri, headers: &HeaderMap, body: &[u8]) -> ProbeReport {
    let mut trace = Trace::default();
    trace.push(format!("[Start] Method: {}, URL: {}", method, uri));

    for name in WATCHED_HEADERS {
        let value = headers
            .get(name)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .unwrap_or_else(|| "<absent>".to_string());
        trace.push(format!("[Headers] {}: {}", name, value));
    }

    let mut source = PayloadSource::None;
    let mut raw = String::new();

    trace.push("[Step 1] Reading request body");
    if body.is_empty() {
        trace.push("[Step 1] body was empty");
    } else {
        if let Err(e) = std::str::from_utf8(body) {
            trace.push(format!("[Step 1] body is not valid UTF-8, decoded lossily: {}", e));
        }
        raw = String::from_utf8_lossy(body).into_owned();
        trace.push(format!("[Step 1] body read. Length: {}", raw.len()));
        source = PayloadSource::Body;
    }

    if raw.is_empty() {
        trace.push("[Step 2] Checking query string for a fallback payload");
        match uri.query() {
            Some(query) if !query.is_empty() => {
                trace.push(format!("[Step 2] query string found. Length: {}", query.len()));
                raw = query.to_string();
                source = PayloadSource::Query;
            }
            _ => trace.push("[Step 2] query string was empty"),
        }
    }

    if !raw.is_empty() {
        trace.push("[Step 3] Decoding payload");
        match payload_keys(source, &raw) {
            Ok(keys) => trace.push(format!("[Step 3] decoded. Keys: {}", keys.join(","))),
            Err(reason) => trace.push(format!("[Step 3] decode failed: {}", reason)),
        }
    }

    ProbeReport {
        result: if raw.is_empty() {
            ProbeOutcome::Failure
        } else {
            ProbeOutcome::Success
        },
        source,
        body_length: raw.len(),
        body_preview: raw.chars().take(PREVIEW_CHARS).collect(),
        logs: trace.0,
        headers: collect_headers(headers),
    }
}

fn payload_keys(source: PayloadSource, raw: &str) -> Result<Vec<String>, String> {
    match source {
        PayloadSource::Body => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Ok(map.keys().cloned().collect()),
            Ok(_) => Err("body is JSON but not an object".to_string()),
            Err(e) => Err(e.to_string()),
        },
        PayloadSource::Query => Ok(url::form_urlencoded::parse(raw.as_bytes())
            .map(|(key, _)| key.into_owned())
            .collect()),
        PayloadSource::None => Ok(Vec::new()),
    }
}

fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut out: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes());
        out.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert_with(|| value.into_owned());
    }
    out
}

/// Post `payload` to the probe at `path` using the client's configured encoding.
pub async fn run_probe<P>(client: &Client, path: &str, payload: &P) -> Result<ProbeReport, EdgeFetchError>
where
    P: Serialize + ?Sized,
{
    let result = client
        .post::<ProbeReport, _>(path, payload, &edgefetch_api::header::HeaderMap::new())
        .await?;
    Ok(result.into_result()?)
}

/// Post `payload` once as a body and once as query parameters, concurrently.
pub async fn compare<P>(
    config: &ClientConfig,
    path: &str,
    payload: &P,
) -> Result<ProbeComparison, EdgeFetchError>
where
    P: Serialize + ?Sized,
{
    let body_client = Client::new(config.clone().with_edge_compat(false))?;
    let query_client = Client::new(config.clone().with_edge_compat(true))?;

    let (body, query) = tokio::try_join!(
        run_probe(&body_client, path, payload),
        run_probe(&query_client, path, payload),
    )?;

    tracing::info!(
        body_source = ?body.source,
        query_source = ?query.source,
        "probe comparison finished"
    );
    Ok(ProbeComparison { body, query })
}
