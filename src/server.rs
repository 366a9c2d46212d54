use std::{future::Future, net::SocketAddr, time::Duration};

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
    routing::get,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    Res,
    api::{self, CallbackState, SharedSource},
};

/// Builds the public router.
///
/// CORS is applied only when `cors_origins` is non-empty; a `*` entry allows
/// any origin.
pub fn build_router(source: SharedSource, cors_origins: &[String]) -> Router {
    let router = Router::new()
        .route("/api/nowplaying", get(api::now_playing))
        .route("/api/lastplayed", get(api::last_played))
        .route("/health", get(api::health))
        .with_state(source);

    let router = match cors_layer(cors_origins) {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router.layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    if origins.is_empty() {
        return None;
    }

    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let values = origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect::<Vec<_>>();
        AllowOrigin::list(values)
    };

    Some(
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers([
                header::CONTENT_TYPE,
                header::ACCEPT,
                header::AUTHORIZATION,
                HeaderName::from_static("x-requested-with"),
            ])
            .max_age(Duration::from_secs(24 * 60 * 60)),
    )
}

/// Binds `0.0.0.0:port` and serves `router` until the process exits.
pub async fn serve(router: Router, port: u16) -> Res<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(%addr, "serving now playing API");
    axum::serve(listener, router).await?;
    Ok(())
}

/// Builds the router of the temporary authorization callback server.
pub fn callback_router(state: CallbackState) -> Router {
    Router::new()
        .route("/", get(api::landing))
        .route("/callback", get(api::callback))
        .with_state(state)
}

/// Serves the callback routes on `listener` until `shutdown` resolves.
pub async fn start_callback_server(
    listener: TcpListener,
    state: CallbackState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Res<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "waiting for authorization callback");
    }

    axum::serve(listener, callback_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::debug!("callback server stopped");
    Ok(())
}
