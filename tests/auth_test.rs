use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use mockito::{Matcher, Mock, Server, ServerGuard};
use nowplaying::Error;
use nowplaying::api::CallbackState;
use nowplaying::config::{Credentials, Endpoints};
use nowplaying::server::callback_router;
use nowplaying::spotify::{Authenticator, SpotifyClient, handoff};
use serde_json::json;
use tower::ServiceExt;

fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .and_then(|listener| listener.local_addr())
        .map(|addr| addr.port())
        .expect("failed to find a free port")
}

fn credentials(redirect_uri: String, refresh_token: Option<&str>) -> Credentials {
    Credentials {
        client_id: "client".into(),
        client_secret: "secret".into(),
        redirect_uri,
        refresh_token: refresh_token.map(str::to_string),
        scopes: vec!["user-follow-read".into()],
    }
}

async fn mock_exchange(server: &mut ServerGuard, status: usize) -> Mock {
    server
        .mock("POST", "/api/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
            Matcher::UrlEncoded("code".into(), "the-code".into()),
        ]))
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "access_token": "access-token",
                "token_type": "Bearer",
                "scope": "user-follow-read",
                "expires_in": 3600,
                "refresh_token": "refresh-token"
            })
            .to_string(),
        )
        .create_async()
        .await
}

fn callback_state(
    server: &ServerGuard,
) -> (CallbackState, handoff::Pending<SpotifyClient>) {
    let (handoff, pending) = handoff::channel();
    let authenticator = Authenticator::new(
        credentials("http://127.0.0.1:8888/callback".into(), None),
        Endpoints::with_base(&server.url()),
    );

    (
        CallbackState {
            state: "expected-state".into(),
            authenticator,
            handoff,
        },
        pending,
    )
}

fn get(path: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .body(Body::empty())
        .expect("failed to build request")
}

#[tokio::test]
async fn refresh_token_path_never_binds_or_blocks() {
    // The redirect URI is unusable on purpose: the refresh path must not touch it.
    let auth = Authenticator::new(
        credentials("not a uri".into(), Some("refresh-token")),
        Endpoints::default(),
    )
    .with_callback_timeout(None);

    let client = tokio::time::timeout(Duration::from_secs(1), auth.authenticate())
        .await
        .expect("authenticate blocked")
        .unwrap();

    assert_eq!(client.token().refresh_token, "refresh-token");
}

#[tokio::test]
async fn mismatched_state_is_not_found_and_delivers_nothing() {
    let mut server = Server::new_async().await;
    let exchange = server
        .mock("POST", "/api/token")
        .expect(0)
        .create_async()
        .await;
    let (state, pending) = callback_state(&server);
    let handoff = state.handoff.clone();

    let response = callback_router(state)
        .oneshot(get("/callback?code=the-code&state=other-state"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(!handoff.is_fulfilled().await);
    let result = pending.wait(Some(Duration::from_millis(50))).await;
    assert!(matches!(result, Err(Error::AuthTimeout(_))));
    exchange.assert_async().await;
}

#[tokio::test]
async fn failed_exchange_is_server_error() {
    let mut server = Server::new_async().await;
    let _exchange = mock_exchange(&mut server, 400).await;
    let (state, pending) = callback_state(&server);
    let handoff = state.handoff.clone();

    let response = callback_router(state)
        .oneshot(get("/callback?code=the-code&state=expected-state"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!handoff.is_fulfilled().await);
    let result = pending.wait(Some(Duration::from_millis(50))).await;
    assert!(matches!(result, Err(Error::AuthTimeout(_))));
}

#[tokio::test]
async fn denied_authorization_is_server_error() {
    let server = Server::new_async().await;
    let (state, _pending) = callback_state(&server);

    let response = callback_router(state)
        .oneshot(get("/callback?error=access_denied&state=expected-state"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn valid_callback_delivers_client() {
    let mut server = Server::new_async().await;
    let exchange = mock_exchange(&mut server, 200).await;
    let (state, pending) = callback_state(&server);

    let response = callback_router(state)
        .oneshot(get("/callback?code=the-code&state=expected-state"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    exchange.assert_async().await;

    let client = pending.wait(Some(Duration::from_secs(1))).await.unwrap();
    assert_eq!(client.token().access_token, "access-token");
    assert_eq!(client.token().refresh_token, "refresh-token");
}

#[tokio::test]
async fn landing_route_is_a_no_op() {
    let server = Server::new_async().await;
    let (state, _pending) = callback_state(&server);

    let response = callback_router(state).oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn interactive_flow_returns_after_callback() {
    let mut server = Server::new_async().await;
    let _exchange = mock_exchange(&mut server, 200).await;
    let port = free_port();
    let auth = Authenticator::new(
        credentials(format!("http://127.0.0.1:{port}/callback"), None),
        Endpoints::with_base(&server.url()),
    )
    .with_callback_timeout(Some(Duration::from_secs(10)));

    let handle = tokio::spawn(async move {
        auth.authorize_with_state("known-state".into()).await
    });

    // Wait until the callback server answers on its landing route.
    let http = reqwest::Client::new();
    let base = format!("http://127.0.0.1:{port}");
    let mut ready = false;
    for _ in 0..100 {
        if http.get(format!("{base}/")).send().await.is_ok() {
            ready = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(ready, "callback server never came up");
    assert!(!handle.is_finished(), "returned before any callback");

    let response = http
        .get(format!("{base}/callback?code=the-code&state=known-state"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let client = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("authenticator did not return")
        .unwrap()
        .unwrap();
    assert_eq!(client.token().access_token, "access-token");
}

#[tokio::test]
async fn interactive_flow_times_out_and_frees_the_port() {
    let server = Server::new_async().await;
    let port = free_port();
    let auth = Authenticator::new(
        credentials(format!("http://127.0.0.1:{port}/callback"), None),
        Endpoints::with_base(&server.url()),
    )
    .with_callback_timeout(Some(Duration::from_millis(100)));

    let first = auth.authorize_with_state("s1".into()).await;
    assert!(matches!(first, Err(Error::AuthTimeout(_))));

    tokio::time::sleep(Duration::from_millis(200)).await;

    // The listener was shut down, so the same port binds again.
    let second = auth.authorize_with_state("s2".into()).await;
    assert!(matches!(second, Err(Error::AuthTimeout(_))));
}
