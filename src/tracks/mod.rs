//! # Track Fetchers
//!
//! Each fetcher authenticates, calls one Spotify player endpoint and projects
//! the result into a compact snapshot serialized as JSON bytes. An empty
//! upstream result is not an error: it yields a [`TrackResponse`] without a
//! body, which the HTTP layer turns into `204 No Content`.
//!
//! [`TrackSource`] is the seam between the HTTP handlers and the fetchers, so
//! routes can be exercised without Spotify.

mod lastplayed;
mod nowplaying;

use async_trait::async_trait;

pub use lastplayed::{fetch_last_played, last_played, project_last_played};
pub use nowplaying::{fetch_now_playing, now_playing, project_now_playing};

use crate::{
    Error, Res,
    spotify::Authenticator,
    types::{Artist, Track},
};

/// Serialized snapshot, or `None` when there is nothing to report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackResponse {
    pub body: Option<Vec<u8>>,
}

impl TrackResponse {
    pub fn empty() -> Self {
        TrackResponse { body: None }
    }

    pub fn json<T: serde::Serialize>(snapshot: &T) -> Res<Self> {
        Ok(TrackResponse {
            body: Some(serde_json::to_vec(snapshot)?),
        })
    }
}

/// Where the HTTP handlers get their snapshots from.
#[async_trait]
pub trait TrackSource: Send + Sync {
    async fn now_playing(&self) -> Res<TrackResponse>;
    async fn last_played(&self) -> Res<TrackResponse>;
}

/// Production source: reads the environment and authenticates on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpotifyTracks;

#[async_trait]
impl TrackSource for SpotifyTracks {
    async fn now_playing(&self) -> Res<TrackResponse> {
        let authenticator = Authenticator::from_env()
            .inspect_err(|e| tracing::error!(error = %e, "cannot read Spotify configuration"))?;
        fetch_now_playing(&authenticator).await
    }

    async fn last_played(&self) -> Res<TrackResponse> {
        let authenticator = Authenticator::from_env()
            .inspect_err(|e| tracing::error!(error = %e, "cannot read Spotify configuration"))?;
        fetch_last_played(&authenticator).await
    }
}

/// URL of the album's first image, or empty when the album has none.
fn image_url(track: &Track) -> String {
    track
        .album
        .images
        .first()
        .map(|image| image.url.clone())
        .unwrap_or_default()
}

/// The track's primary artist.
fn primary_artist(track: &Track) -> Res<&Artist> {
    track
        .artists
        .first()
        .ok_or_else(|| Error::Upstream(format!("track '{}' has no artists", track.name)))
}
