#![allow(clippy::unwrap_used, clippy::expect_used)]

use fiesta::api::FiestaClient;
use fiesta::relay::server::RelayServer;
use fiesta::transport::{
    DirectTransport, FallbackTransport, HeaderProfile, RelayTransport, StreamDetector,
};
use fiesta::{Credential, Outcome, RequestSpec, Transport, TransportError};
use reqwest::Url;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn direct() -> DirectTransport {
    DirectTransport::new(
        reqwest::Client::new(),
        HeaderProfile::browser(),
        StreamDetector::default(),
    )
}

/// Helper: run a relay on a random port, returning its proxy URL.
async fn start_relay() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = RelayServer::build(direct());

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}/api/proxy")
}

async fn post_relay(relay: &str, body: Value) -> (u16, Value) {
    let resp = reqwest::Client::new()
        .post(relay)
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

const SSE_BODY: &str = concat!(
    "data: {\"type\":\"start\",\"model\":\"gpt-4\"}\n\n",
    "data: {\"type\":\"content\",\"content\":\"Hello\"}\n\n",
    "data: {oops\n\n",
    "data: {\"type\":\"content\",\"content\":\" world\"}\n\n",
    "data: [DONE]\n\n",
);

#[tokio::test]
async fn test_health_endpoint() {
    let relay = start_relay().await;
    let url = relay.replace("/api/proxy", "/health");
    let body: Value = reqwest::get(&url).await.unwrap().json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "fiesta");
}

#[tokio::test]
async fn test_streaming_completion_is_collected() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat/completions"))
        .and(header("authorization", "Bearer tok"))
        .and(header("referer", "https://chat.aifiesta.ai/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SSE_BODY))
        .expect(1)
        .mount(&upstream)
        .await;

    let relay = start_relay().await;
    let (status, body) = post_relay(
        &relay,
        json!({
            "url": format!("{}/api/chat/completions", upstream.uri()),
            "method": "POST",
            "data": {"prompt": "hi"},
            "authToken": "tok"
        }),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["totalEvents"], 3);
    assert_eq!(body["data"][0]["type"], "start");
    assert_eq!(body["data"][2]["content"], " world");
    assert_eq!(body["streamText"], SSE_BODY);
}

#[tokio::test]
async fn test_buffered_text_is_wrapped() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(&upstream)
        .await;

    let relay = start_relay().await;
    let (status, body) = post_relay(
        &relay,
        json!({"url": format!("{}/api/chat", upstream.uri()), "method": "POST", "data": {}, "authToken": ""}),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body, json!({"data": "OK"}));
}

#[tokio::test]
async fn test_upstream_error_status_is_relayed() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403).set_body_string("nope"))
        .mount(&upstream)
        .await;

    let relay = start_relay().await;
    let (status, body) = post_relay(
        &relay,
        json!({"url": format!("{}/api/chat", upstream.uri()), "method": "POST", "data": {}, "authToken": "t"}),
    )
    .await;

    assert_eq!(status, 403);
    assert_eq!(body["message"], "Request failed: 403 - nope");
}

#[tokio::test]
async fn test_unreachable_upstream_is_proxy_error() {
    let relay = start_relay().await;
    let (status, body) = post_relay(
        &relay,
        json!({"url": "http://127.0.0.1:1/api/chat", "method": "POST", "data": {}, "authToken": ""}),
    )
    .await;

    assert_eq!(status, 500);
    assert!(body["message"].as_str().unwrap().starts_with("Proxy server error:"));
}

#[tokio::test]
async fn test_malformed_relay_request_is_rejected() {
    let relay = start_relay().await;
    let (status, body) = post_relay(&relay, json!({"method": "POST"})).await;
    assert_eq!(status, 400);
    assert!(body["message"].as_str().unwrap().starts_with("Invalid relay request"));
}

#[tokio::test]
async fn test_fallback_through_relay_recovers_stream() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&upstream)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string(SSE_BODY))
        .mount(&upstream)
        .await;

    let relay = start_relay().await;
    // The direct path points nowhere, so every call falls back to the relay.
    let transport = FallbackTransport::new(
        Box::new(RedirectTo {
            inner: direct(),
            base: "http://127.0.0.1:1".to_string(),
        }),
        Box::new(RelayTransport::new(
            reqwest::Client::new(),
            Url::parse(&relay).unwrap(),
            StreamDetector::default(),
        )),
    );

    let client = FiestaClient::new(
        Box::new(transport),
        &format!("{}/api", upstream.uri()),
        Credential::new("tok"),
        3,
    )
    .unwrap();

    let out = client.ask("New Chat", "hi", "gpt-4").await.unwrap();
    let Outcome::Stream(r) = out else {
        panic!("expected stream outcome");
    };
    assert_eq!(r.started_model(), Some("gpt-4"));
    assert_eq!(r.content(), "Hello world");
    assert!(r.is_complete());
}

#[tokio::test]
async fn test_fallback_failure_surfaces_secondary_error() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .expect(2)
        .mount(&upstream)
        .await;

    let relay = start_relay().await;
    let transport = FallbackTransport::new(
        Box::new(direct()),
        Box::new(RelayTransport::new(
            reqwest::Client::new(),
            Url::parse(&relay).unwrap(),
            StreamDetector::default(),
        )),
    );

    let spec = RequestSpec::post(
        Url::parse(&format!("{}/api/chat", upstream.uri())).unwrap(),
        json!({"id": "c1", "title": "New Chat", "folderId": null}),
        Credential::new("tok"),
    );
    let err = transport.execute(&spec).await.unwrap_err();
    assert!(matches!(err, TransportError::Relay { status: 503, .. }));
    assert_eq!(err.to_string(), "Request failed: 503 - down");

    let reqs = upstream.received_requests().await.unwrap();
    assert_eq!(reqs.len(), 2);
    assert_eq!(reqs[0].body, reqs[1].body);
}

/// Sends the request to a different origin, keeping path and payload.
struct RedirectTo {
    inner: DirectTransport,
    base: String,
}

impl Transport for RedirectTo {
    fn name(&self) -> &'static str {
        "redirect"
    }

    fn execute<'a>(
        &'a self,
        spec: &'a RequestSpec,
    ) -> futures_core::future::BoxFuture<'a, fiesta::TransportResult<Outcome>> {
        Box::pin(async move {
            let mut moved = spec.clone();
            moved.url = Url::parse(&format!("{}{}", self.base, spec.url.path())).unwrap();
            self.inner.execute(&moved).await
        })
    }
}
