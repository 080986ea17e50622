use edgefetch_lib::probe::{self, PayloadSource, ProbeOutcome, PROBE_PATH};
use edgefetch_lib::{Client, ClientConfig, EdgeFetchError};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn spawn_probe_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, probe::router()).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn body_encoding_reaches_the_probe_as_body() {
    let base = spawn_probe_server().await;
    let client = Client::with_base_url(&base).unwrap();

    let report = probe::run_probe(&client, PROBE_PATH, &json!({"websiteId": "abc", "n": 1}))
        .await
        .unwrap();

    assert_eq!(report.result, ProbeOutcome::Success);
    assert_eq!(report.source, PayloadSource::Body);
    assert_eq!(report.body_preview, r#"{"websiteId":"abc","n":1}"#);
    assert_eq!(report.headers["content-type"], "application/json");
    assert_eq!(report.headers["cache-control"], "no-cache");
}

#[tokio::test]
async fn compat_encoding_reaches_the_probe_as_query() {
    let base = spawn_probe_server().await;
    let client = Client::new(ClientConfig::new(&base).with_edge_compat(true)).unwrap();

    let report = probe::run_probe(&client, PROBE_PATH, &json!({"a": 1, "b": {"c": 2}}))
        .await
        .unwrap();

    assert_eq!(report.source, PayloadSource::Query);
    assert_eq!(report.body_preview, "a=1&b=%7B%22c%22%3A2%7D");
    assert!(report.logs.iter().any(|l| l == "[Step 3] decoded. Keys: a,b"));
}

#[tokio::test]
async fn compare_runs_both_encodings() {
    let base = spawn_probe_server().await;
    let config = ClientConfig::new(&base);

    let comparison = probe::compare(&config, PROBE_PATH, &json!({"event": "pageview"}))
        .await
        .unwrap();

    assert_eq!(comparison.body.source, PayloadSource::Body);
    assert_eq!(comparison.query.source, PayloadSource::Query);
    assert!(comparison.body_delivered());
    assert!(!comparison.needs_edge_compat());
}

#[tokio::test]
async fn host_that_drops_bodies_is_detected() {
    let server = MockServer::start().await;

    // Simulates an adapter that loses the body but keeps the query string.
    Mock::given(method("POST"))
        .and(path(PROBE_PATH))
        .respond_with(|req: &wiremock::Request| {
            let uri: axum::http::Uri = format!("{}?{}", req.url.path(), req.url.query().unwrap_or(""))
                .parse()
                .unwrap();
            let report = probe::inspect(
                &axum::http::Method::POST,
                &uri,
                &axum::http::HeaderMap::new(),
                b"",
            );
            ResponseTemplate::new(200).set_body_json(report)
        })
        .mount(&server)
        .await;

    let comparison = probe::compare(
        &ClientConfig::new(&server.uri()),
        PROBE_PATH,
        &json!({"event": "pageview"}),
    )
    .await
    .unwrap();

    assert_eq!(comparison.body.source, PayloadSource::None);
    assert_eq!(comparison.body.result, ProbeOutcome::Failure);
    assert!(comparison.needs_edge_compat());
}

#[tokio::test]
async fn probe_error_status_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(PROBE_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"status": 404, "message": "not found"}
        })))
        .mount(&server)
        .await;

    let client = Client::with_base_url(&server.uri()).unwrap();
    let err = probe::run_probe(&client, PROBE_PATH, &json!({}))
        .await
        .unwrap_err();

    match err {
        EdgeFetchError::Probe(failure) => {
            assert_eq!(failure.status, 404);
            assert_eq!(failure.error.unwrap().error.message, "not found");
        }
        other => panic!("expected probe failure, got {other}"),
    }
}
