use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{header as match_header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use leadflow_api::{router, AppState};
use leadflow_enricher::ProviderEnricher;

fn app(provider: &MockServer) -> axum::Router {
    let enricher = ProviderEnricher::new(&provider.uri()).unwrap();
    router(Arc::new(AppState {
        enricher: Box::new(enricher),
        call_timeout: Duration::from_secs(5),
    }))
}

fn enrich_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/enrich")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn contact(first: &str) -> Value {
    json!({"firstName": first, "lastName": "Lovelace", "domain": "acme.io"})
}

#[tokio::test]
async fn health_check_is_ok_and_uncached() {
    let provider = MockServer::start().await;
    let resp = app(&provider)
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CACHE_CONTROL], "no-store");
}

#[tokio::test]
async fn forwards_batch_and_returns_results() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/people/bulk_match"))
        .and(match_header("x-api-key", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "matches": [
                {"first_name": "Ada", "title": "CTO", "organization": {"name": "Acme"}},
                null
            ]
        })))
        .expect(1)
        .mount(&provider)
        .await;

    let resp = app(&provider)
        .oneshot(enrich_request(json!({
            "apiKey": "secret",
            "contacts": [contact("Ada"), contact("Grace")],
            "options": {}
        })))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = read_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["apiCalls"], 1);
    assert_eq!(body["results"][0]["title"], "CTO");
    assert_eq!(body["results"][0]["enrichmentStatus"], "success");
    assert_eq!(body["results"][1]["enrichmentStatus"], "failed");
    assert_eq!(body["results"][1]["error"], "no match found");
}

#[tokio::test]
async fn rejects_missing_key_and_empty_batch() {
    let provider = MockServer::start().await;

    let resp = app(&provider)
        .oneshot(enrich_request(json!({"contacts": [contact("Ada")]})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = read_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["kind"], "invalid_input");
    assert_eq!(body["error"], "missing credential");

    let resp = app(&provider)
        .oneshot(enrich_request(json!({"apiKey": "k", "contacts": []})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(resp).await["error"], "no contacts");
}

#[tokio::test]
async fn rejects_oversized_batch() {
    let provider = MockServer::start().await;
    let contacts: Vec<Value> = (0..26).map(|i| contact(&format!("F{i}"))).collect();

    let resp = app(&provider)
        .oneshot(enrich_request(json!({"apiKey": "k", "contacts": contacts})))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(provider.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn provider_failures_map_to_statuses() {
    for (upstream, expected, kind) in [
        (401, StatusCode::UNAUTHORIZED, "authentication"),
        (429, StatusCode::TOO_MANY_REQUESTS, "rate_limited"),
        (500, StatusCode::BAD_GATEWAY, "failed"),
    ] {
        let provider = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(upstream).set_body_json(json!({"error": "upstream said no"})),
            )
            .mount(&provider)
            .await;

        let resp = app(&provider)
            .oneshot(enrich_request(json!({"apiKey": "k", "contacts": [contact("Ada")]})))
            .await
            .unwrap();

        assert_eq!(resp.status(), expected);
        let body = read_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["kind"], kind);
    }
}

#[tokio::test]
async fn slow_provider_times_out() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"matches": [null]}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&provider)
        .await;

    let enricher = ProviderEnricher::new(&provider.uri()).unwrap();
    let app = router(Arc::new(AppState {
        enricher: Box::new(enricher),
        call_timeout: Duration::from_millis(100),
    }));

    let resp = app
        .oneshot(enrich_request(json!({"apiKey": "k", "contacts": [contact("Ada")]})))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(read_json(resp).await["kind"], "timeout");
}
