// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - POST /api/search (credentials, validation, success, contained panics)
// - POST /search alias

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value as Json};
use tower::ServiceExt as _; // for `oneshot`

use repost_finder::clients::{Connector, WebSearch, WebSearchTask};
use repost_finder::{router, AppState, Backends, Capabilities, CredentialSource, SearchSettings};

const BODY_LIMIT: usize = 1024 * 1024;

enum Mode {
    Answer(&'static str),
    /// Enrichment panics; search prompts answer like `Answer`.
    EnrichmentPanics(&'static str),
}

struct FakeWeb(Mode);

#[async_trait]
impl WebSearch for FakeWeb {
    async fn search(&self, task: &WebSearchTask) -> Result<String> {
        let text = match self.0 {
            Mode::EnrichmentPanics(_) if task.prompt.starts_with("Describe this video") => {
                panic!("unexpected upstream shape")
            }
            Mode::Answer(text) | Mode::EnrichmentPanics(text) => text,
        };
        if task.prompt.contains("site:tiktok.com") {
            Ok(text.to_string())
        } else {
            Ok("[]".to_string())
        }
    }
}

struct FakeConnector {
    mode: fn() -> Mode,
    connects: Arc<AtomicUsize>,
}

impl Connector for FakeConnector {
    fn connect(&self, _caps: &Capabilities, _settings: &SearchSettings) -> Result<Backends> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Backends {
            web: Arc::new(FakeWeb((self.mode)())),
            scraper: None,
        })
    }
}

/// Fails while wiring backends, outside any adapter.
struct BrokenConnector;

impl Connector for BrokenConnector {
    fn connect(&self, _caps: &Capabilities, _settings: &SearchSettings) -> Result<Backends> {
        panic!("connector wiring bug")
    }
}

const ANSWER: &str = r#"[
            {"platform":"tiktok","account_name":"@later","url":"https://www.tiktok.com/@later/video/2","confidence":"medium","date_found":"2024-05-02"},
            {"platform":"tiktok","account_name":"@first","url":"https://www.tiktok.com/@first/video/1","confidence":"high","date_found":"2024-05-01","type":"reaction","views":"1,500"}
        ]"#;

fn answer() -> Mode {
    Mode::Answer(ANSWER)
}

fn enrichment_panics() -> Mode {
    Mode::EnrichmentPanics(ANSWER)
}

fn counted_app(credentials: CredentialSource, mode: fn() -> Mode) -> (Router, Arc<AtomicUsize>) {
    let connects = Arc::new(AtomicUsize::new(0));
    let connector = FakeConnector {
        mode,
        connects: connects.clone(),
    };
    let state = AppState::live(SearchSettings::default())
        .with_credentials(credentials)
        .with_connector(Arc::new(connector));
    (router(state), connects)
}

fn app_with(credentials: CredentialSource, mode: fn() -> Mode) -> Router {
    counted_app(credentials, mode).0
}

fn keyed() -> CredentialSource {
    CredentialSource::fixed([("ANTHROPIC_API_KEY", "test-key")])
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("build POST")
}

async fn read_json(resp: axum::response::Response) -> Json {
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn health_returns_ok() {
    let app = app_with(keyed(), answer);
    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");
    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_api_key_is_500_before_validation() {
    let (app, connects) = counted_app(CredentialSource::fixed(Vec::<(&str, &str)>::new()), answer);
    // Body is invalid too; the credential check wins.
    let resp = app.oneshot(post_json("/api/search", "{}")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        read_json(resp).await,
        json!({ "error": "ANTHROPIC_API_KEY not configured" })
    );
    assert_eq!(connects.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_fields_are_400() {
    for body in [
        r#"{"platform":"tiktok"}"#,
        r#"{"url":"https://www.tiktok.com/@x/video/1"}"#,
        r#"{"url":"","platform":"tiktok"}"#,
        "not json at all",
    ] {
        let (app, connects) = counted_app(keyed(), answer);
        let resp = app.oneshot(post_json("/api/search", body)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(read_json(resp).await, json!({ "error": "Missing url or platform" }));
        assert_eq!(connects.load(Ordering::SeqCst), 0, "no backends built for: {body}");
    }
}

#[tokio::test]
async fn get_is_not_allowed_on_search() {
    let app = app_with(keyed(), answer);
    let req = Request::builder()
        .uri("/api/search")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn search_returns_ranked_results_and_sources() {
    let (app, connects) = counted_app(keyed(), answer);
    let body = json!({
        "url": "https://www.tiktok.com/@orig/video/999",
        "platform": "tiktok",
        "metadata": { "author": "@orig", "title": "Skate trick" }
    });
    let resp = app
        .oneshot(post_json("/api/search", &body.to_string()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let v = read_json(resp).await;
    let results = v["results"].as_array().expect("results array");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["url"], "https://www.tiktok.com/@first/video/1");
    assert_eq!(results[0]["confidence"], "high");
    assert_eq!(results[0]["type"], "reaction");
    assert_eq!(results[0]["views"], 1500);
    assert_eq!(results[0]["accountName"], "@first");
    assert_eq!(results[0]["dateFound"], "2024-05-01");
    assert_eq!(results[1]["accountName"], "@later");
    assert_eq!(v["sources"], json!({ "apify": false, "claude": true }));
    assert!(v.get("rawText").is_none());
    assert_eq!(connects.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn search_alias_route_works() {
    let app = app_with(keyed(), answer);
    let body = r#"{"url":"https://www.instagram.com/reel/abc/","platform":"Instagram"}"#;
    let resp = app.oneshot(post_json("/search", body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let v = read_json(resp).await;
    assert!(v["results"].is_array());
}

#[tokio::test]
async fn enrichment_panic_still_returns_results() {
    let app = app_with(keyed(), enrichment_panics);
    let body = r#"{"url":"https://www.tiktok.com/@orig/video/999","platform":"tiktok"}"#;
    let resp = app.oneshot(post_json("/api/search", body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let v = read_json(resp).await;
    assert_eq!(v["results"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn panic_outside_adapters_becomes_generic_500() {
    let state = AppState::live(SearchSettings::default())
        .with_credentials(keyed())
        .with_connector(Arc::new(BrokenConnector));
    let body = r#"{"url":"https://www.tiktok.com/@x/video/1","platform":"tiktok"}"#;
    let resp = router(state)
        .oneshot(post_json("/api/search", body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(read_json(resp).await, json!({ "error": "Repost search failed" }));
}
