use std::sync::Arc;

use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::{
    Res,
    tracks::{TrackResponse, TrackSource},
};

/// Shared handle the public routes read snapshots from.
pub type SharedSource = Arc<dyn TrackSource>;

pub async fn now_playing(State(source): State<SharedSource>) -> Response {
    respond("now playing", source.now_playing().await)
}

pub async fn last_played(State(source): State<SharedSource>) -> Response {
    respond("last played", source.last_played().await)
}

/// Maps a fetch outcome onto the wire.
///
/// Errors become `400` without a body, an empty result becomes `204`, and a
/// snapshot is written as-is with a JSON content type.
fn respond(what: &str, result: Res<TrackResponse>) -> Response {
    match result {
        Err(e) => {
            tracing::error!(error = %e, "{what} request failed");
            StatusCode::BAD_REQUEST.into_response()
        }
        Ok(TrackResponse { body: None }) => StatusCode::NO_CONTENT.into_response(),
        Ok(TrackResponse { body: Some(body) }) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
    }
}
