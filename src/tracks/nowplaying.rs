use crate::{
    Res,
    spotify::{Authenticator, SpotifyClient},
    types::{NowPlaying, Track},
    utils::spotify_url,
};

use super::{TrackResponse, image_url, primary_artist};

/// Authenticates and reports the track playing right now.
pub async fn fetch_now_playing(authenticator: &Authenticator) -> Res<TrackResponse> {
    let mut client = authenticator.authenticate().await?;

    now_playing(&mut client).await
}

/// Reports the track playing right now, or an empty response when idle.
pub async fn now_playing(client: &mut SpotifyClient) -> Res<TrackResponse> {
    let current = client
        .currently_playing()
        .await
        .inspect_err(|e| tracing::error!(error = %e, "currently playing request failed"))?;

    let Some(track) = current.and_then(|c| c.item) else {
        tracing::debug!("nothing is playing");
        return Ok(TrackResponse::empty());
    };

    let snapshot = project_now_playing(&track)
        .inspect_err(|e| tracing::error!(error = %e, "cannot project now playing"))?;
    TrackResponse::json(&snapshot)
        .inspect_err(|e| tracing::error!(error = %e, "cannot serialize now playing"))
}

pub fn project_now_playing(track: &Track) -> Res<NowPlaying> {
    let artist = primary_artist(track)?;

    Ok(NowPlaying {
        image_url: image_url(track),
        track_name: track.name.clone(),
        track_url: spotify_url(&track.external_urls),
        album_name: track.album.name.clone(),
        album_url: spotify_url(&track.album.external_urls),
        artist_name: artist.name.clone(),
        artist_url: spotify_url(&artist.external_urls),
    })
}
