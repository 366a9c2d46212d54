use std::collections::HashMap;

use axum::http::Uri;
use chrono::{DateTime, FixedOffset};
use rand::RngCore;
use url::Url;

use crate::{Error, Res};

/// Offset of Japan Standard Time from UTC, in seconds.
pub const JST_OFFSET_SECS: i32 = 9 * 60 * 60;

/// Display format of the `playedAt` field.
pub const PLAYED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Number of random bytes in an authorization state nonce.
const STATE_BYTES: usize = 11;

/// Generates the random correlation state for one authorization handshake.
///
/// The nonce is 11 random bytes, hex-encoded into 22 lowercase characters.
pub fn generate_state() -> String {
    let mut bytes = [0u8; STATE_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Extracts the explicit port from a redirect URI.
///
/// The callback listener binds this port, so a URI without one is rejected
/// along with unparsable ones. A port spelled out explicitly is returned even
/// when it equals the scheme default (`http://localhost:80/callback` gives 80).
///
/// # Errors
///
/// Returns [`Error::Config`] if the URI does not parse or carries no port.
///
/// # Example
///
/// ```
/// let port = port_from_redirect_uri("http://localhost:8080/callback")?;
/// assert_eq!(port, 8080);
/// ```
pub fn port_from_redirect_uri(uri: &str) -> Res<u16> {
    let parsed = Url::parse(uri)
        .map_err(|e| Error::Config(format!("invalid redirect URI '{uri}': {e}")))?;

    if let Some(port) = parsed.port() {
        return Ok(port);
    }

    // `Url` drops a port equal to the scheme default; the raw authority keeps it.
    uri.parse::<Uri>()
        .ok()
        .and_then(|raw| raw.port_u16())
        .ok_or_else(|| Error::Config(format!("redirect URI '{uri}' has no explicit port")))
}

/// The named fixed offset used for `playedAt`.
pub fn jst() -> Res<FixedOffset> {
    FixedOffset::east_opt(JST_OFFSET_SECS)
        .ok_or_else(|| Error::Config("JST offset out of range".to_string()))
}

/// Converts an RFC 3339 timestamp from Spotify into JST display form.
///
/// # Example
///
/// ```
/// assert_eq!(format_played_at("2024-01-01T00:00:00Z")?, "2024-01-01 09:00:00");
/// ```
pub fn format_played_at(played_at: &str) -> Res<String> {
    let instant = DateTime::parse_from_rfc3339(played_at)
        .map_err(|e| Error::Upstream(format!("invalid played_at '{played_at}': {e}")))?;

    Ok(instant.with_timezone(&jst()?).format(PLAYED_AT_FORMAT).to_string())
}

/// Returns the Spotify link from an `external_urls` map, or an empty string.
pub fn spotify_url(external_urls: &HashMap<String, String>) -> String {
    external_urls.get("spotify").cloned().unwrap_or_default()
}
