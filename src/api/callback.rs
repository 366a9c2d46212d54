use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::spotify::{Authenticator, SpotifyClient, handoff::Handoff};

/// State shared by the temporary callback server's routes.
#[derive(Clone)]
pub struct CallbackState {
    /// Nonce the returned `state` parameter must match.
    pub state: String,
    pub authenticator: Authenticator,
    pub handoff: Handoff<SpotifyClient>,
}

/// Landing route for the redirect host. Does nothing.
pub async fn landing() -> StatusCode {
    StatusCode::OK
}

/// Completes the authorization-code flow.
///
/// A mismatched `state` answers 404 and delivers nothing. A missing code or a
/// failed exchange answers 500. On success the client is handed to the
/// waiting authenticator.
pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    State(cb): State<CallbackState>,
) -> Response {
    if params.get("state") != Some(&cb.state) {
        tracing::warn!("authorization callback with unexpected state");
        return StatusCode::NOT_FOUND.into_response();
    }

    let Some(code) = params.get("code") else {
        let reason = params.get("error").map(String::as_str).unwrap_or("missing code");
        tracing::error!(reason, "authorization callback without code");
        return failed_to_get_token();
    };

    let token = match cb.authenticator.exchange_code(code).await {
        Ok(token) => token,
        Err(e) => {
            tracing::error!(error = %e, "token exchange failed");
            return failed_to_get_token();
        }
    };

    if cb.handoff.fulfill(cb.authenticator.client_for(token)).await {
        Html("<h2>Authentication successful.</h2><p>Close browser window.</p>").into_response()
    } else {
        tracing::warn!("authorization callback after the client was already delivered");
        Html("<h4>Authentication already completed.</h4>").into_response()
    }
}

fn failed_to_get_token() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "failed to get token").into_response()
}
