use std::{collections::HashMap, fmt};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::REDACTED;

/// OAuth token held by an authenticated client.
///
/// An empty `access_token` means the token has never been used; the client
/// refreshes it before the first request.
#[derive(Clone, Serialize, Deserialize)]
pub struct Token {
    pub token_type: String,
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("token_type", &self.token_type)
            .field("access_token", &REDACTED)
            .field("refresh_token", &REDACTED)
            .field("scope", &self.scope)
            .field("expires_in", &self.expires_in)
            .field("obtained_at", &self.obtained_at)
            .finish()
    }
}

impl Token {
    /// A bearer token carrying only a refresh token.
    pub fn from_refresh_token(refresh_token: impl Into<String>) -> Self {
        Token {
            token_type: "Bearer".to_string(),
            access_token: String::new(),
            refresh_token: refresh_token.into(),
            scope: String::new(),
            expires_in: 0,
            obtained_at: 0,
        }
    }

    /// Builds a token from a token endpoint response.
    ///
    /// Spotify may omit the refresh token on a refresh grant; `previous` is
    /// kept in that case.
    pub fn from_response(res: TokenResponse, previous: Option<&str>) -> Self {
        Token {
            token_type: res.token_type,
            access_token: res.access_token,
            refresh_token: res
                .refresh_token
                .or_else(|| previous.map(str::to_string))
                .unwrap_or_default(),
            scope: res.scope,
            expires_in: res.expires_in,
            obtained_at: Utc::now().timestamp() as u64,
        }
    }

    /// True when the access token is missing or expires within four minutes.
    pub fn is_expired(&self) -> bool {
        if self.access_token.is_empty() {
            return true;
        }
        let now = Utc::now().timestamp() as u64;
        now + 240 >= self.obtained_at + self.expires_in
    }
}

#[derive(Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "bearer")]
    pub token_type: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub expires_in: u64,
    pub refresh_token: Option<String>,
}

impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .field("expires_in", &self.expires_in)
            .finish_non_exhaustive()
    }
}

fn bearer() -> String {
    "Bearer".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub name: String,
    #[serde(default)]
    pub external_urls: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    pub name: String,
    #[serde(default)]
    pub external_urls: HashMap<String, String>,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    #[serde(default)]
    pub external_urls: HashMap<String, String>,
    pub album: Album,
    #[serde(default)]
    pub artists: Vec<Artist>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentlyPlayingResponse {
    #[serde(default)]
    pub is_playing: bool,
    pub item: Option<Track>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayHistory {
    pub track: Track,
    pub played_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentlyPlayedResponse {
    #[serde(default)]
    pub items: Vec<PlayHistory>,
}

/// Public shape of `GET /api/nowplaying`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NowPlaying {
    pub image_url: String,
    pub track_name: String,
    pub track_url: String,
    pub album_name: String,
    pub album_url: String,
    pub artist_name: String,
    pub artist_url: String,
}

/// Public shape of `GET /api/lastplayed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastPlayed {
    pub image_url: String,
    pub played_at: String,
    pub track_name: String,
    pub track_url: String,
    pub album_name: String,
    pub album_url: String,
    pub artist_name: String,
    pub artist_url: String,
}
