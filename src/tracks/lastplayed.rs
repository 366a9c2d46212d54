use crate::{
    Res,
    spotify::{Authenticator, SpotifyClient},
    types::{LastPlayed, PlayHistory},
    utils::{format_played_at, spotify_url},
};

use super::{TrackResponse, image_url, primary_artist};

/// Authenticates and reports the most recently played track.
pub async fn fetch_last_played(authenticator: &Authenticator) -> Res<TrackResponse> {
    let mut client = authenticator.authenticate().await?;

    last_played(&mut client).await
}

/// Reports the most recently played track, or an empty response when the
/// play history is empty.
pub async fn last_played(client: &mut SpotifyClient) -> Res<TrackResponse> {
    let history = client
        .recently_played(1)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "recently played request failed"))?;

    let Some(entry) = history.items.first() else {
        tracing::debug!("play history is empty");
        return Ok(TrackResponse::empty());
    };

    let snapshot = project_last_played(entry)
        .inspect_err(|e| tracing::error!(error = %e, "cannot project last played"))?;
    TrackResponse::json(&snapshot)
        .inspect_err(|e| tracing::error!(error = %e, "cannot serialize last played"))
}

pub fn project_last_played(entry: &PlayHistory) -> Res<LastPlayed> {
    let track = &entry.track;
    let artist = primary_artist(track)?;

    Ok(LastPlayed {
        image_url: image_url(track),
        played_at: format_played_at(&entry.played_at)?,
        track_name: track.name.clone(),
        track_url: spotify_url(&track.external_urls),
        album_name: track.album.name.clone(),
        album_url: spotify_url(&track.album.external_urls),
        artist_name: artist.name.clone(),
        artist_url: spotify_url(&artist.external_urls),
    })
}
