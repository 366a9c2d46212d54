use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use nowplaying::server::build_router;
use nowplaying::tracks::{TrackResponse, TrackSource};
use nowplaying::{Error, Res};
use tower::ServiceExt;

/// What a fake source answers for both routes.
#[derive(Clone)]
enum Outcome {
    Body(&'static [u8]),
    Empty,
    Fail,
}

struct FakeSource {
    now_playing: Outcome,
    last_played: Outcome,
}

impl FakeSource {
    fn respond(outcome: &Outcome) -> Res<TrackResponse> {
        match outcome {
            Outcome::Body(bytes) => Ok(TrackResponse {
                body: Some(bytes.to_vec()),
            }),
            Outcome::Empty => Ok(TrackResponse::empty()),
            Outcome::Fail => Err(Error::Upstream("spotify is down".into())),
        }
    }
}

#[async_trait]
impl TrackSource for FakeSource {
    async fn now_playing(&self) -> Res<TrackResponse> {
        Self::respond(&self.now_playing)
    }

    async fn last_played(&self) -> Res<TrackResponse> {
        Self::respond(&self.last_played)
    }
}

fn app(now_playing: Outcome, last_played: Outcome) -> Router {
    build_router(
        Arc::new(FakeSource {
            now_playing,
            last_played,
        }),
        &[],
    )
}

fn get(path: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(path)
        .body(Body::empty())
        .expect("failed to build request")
}

#[tokio::test]
async fn success_returns_exact_bytes() {
    // Deliberately odd spacing: the handler must not re-encode the body.
    let body: &'static [u8] = br#"{"trackName" : "T",  "imageUrl":"X"}"#;
    let response = app(Outcome::Body(body), Outcome::Empty)
        .oneshot(get("/api/nowplaying"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], body);
}

#[tokio::test]
async fn empty_body_returns_no_content() {
    for path in ["/api/nowplaying", "/api/lastplayed"] {
        let response = app(Outcome::Empty, Outcome::Empty)
            .oneshot(get(path))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT, "path: {path}");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }
}

#[tokio::test]
async fn error_returns_bad_request_without_body() {
    for path in ["/api/nowplaying", "/api/lastplayed"] {
        let response = app(Outcome::Fail, Outcome::Fail)
            .oneshot(get(path))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "path: {path}");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }
}

#[tokio::test]
async fn routes_use_their_own_fetcher() {
    let body: &'static [u8] = br#"{"playedAt":"2024-01-01 09:00:00"}"#;
    let router = app(Outcome::Fail, Outcome::Body(body));

    let now = router.clone().oneshot(get("/api/nowplaying")).await.unwrap();
    assert_eq!(now.status(), StatusCode::BAD_REQUEST);

    let last = router.oneshot(get("/api/lastplayed")).await.unwrap();
    assert_eq!(last.status(), StatusCode::OK);
    let bytes = to_bytes(last.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], body);
}

#[tokio::test]
async fn post_is_not_routed() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/nowplaying")
        .body(Body::empty())
        .unwrap();

    let response = app(Outcome::Empty, Outcome::Empty)
        .oneshot(request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn health_reports_version() {
    let response = app(Outcome::Fail, Outcome::Fail)
        .oneshot(get("/health"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json.as_object().map(|o| o.len()), Some(2));
}

#[tokio::test]
async fn cors_preflight_for_allowed_origin() {
    let router = build_router(
        Arc::new(FakeSource {
            now_playing: Outcome::Empty,
            last_played: Outcome::Empty,
        }),
        &["http://localhost:4321".to_string()],
    );

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/nowplaying")
        .header(header::ORIGIN, "http://localhost:4321")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:4321"
    );
}
