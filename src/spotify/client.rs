use std::fmt;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::{
    Error, Res,
    config::{Credentials, Endpoints, REDACTED},
    types::{CurrentlyPlayingResponse, RecentlyPlayedResponse, Token, TokenResponse},
};

/// Authenticated Spotify Web API client.
///
/// Built by the authenticator for a single fetch and dropped afterwards.
/// When the held token has no usable access token (a client created from a
/// configured refresh token), the refresh grant runs before the first call.
pub struct SpotifyClient {
    http: Client,
    endpoints: Endpoints,
    client_id: String,
    client_secret: String,
    token: Token,
}

impl fmt::Debug for SpotifyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpotifyClient")
            .field("endpoints", &self.endpoints)
            .field("client_id", &self.client_id)
            .field("client_secret", &REDACTED)
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

impl SpotifyClient {
    pub fn new(http: Client, credentials: &Credentials, endpoints: &Endpoints, token: Token) -> Self {
        SpotifyClient {
            http,
            endpoints: endpoints.clone(),
            client_id: credentials.client_id.clone(),
            client_secret: credentials.client_secret.clone(),
            token,
        }
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    /// Returns a usable access token, refreshing it first if needed.
    pub async fn valid_token(&mut self) -> Res<String> {
        if self.token.is_expired() {
            self.token = self.refresh_token().await?;
        }

        Ok(self.token.access_token.clone())
    }

    /// Exchanges the held refresh token for a fresh access token.
    ///
    /// # Errors
    ///
    /// - [`Error::Upstream`] when no refresh token is held or Spotify rejects it
    /// - [`Error::Request`] on transport failure
    async fn refresh_token(&self) -> Res<Token> {
        if self.token.refresh_token.is_empty() {
            return Err(Error::Upstream(
                "access token expired and no refresh token is available".into(),
            ));
        }

        let response = self
            .http
            .post(&self.endpoints.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", self.token.refresh_token.as_str()),
            ])
            .send()
            .await?;

        let json: TokenResponse = parse_json(response, "token refresh").await?;
        tracing::debug!(expires_in = json.expires_in, "refreshed Spotify access token");

        Ok(Token::from_response(json, Some(&self.token.refresh_token)))
    }

    /// Fetches the user's currently playing item.
    ///
    /// Spotify answers `204 No Content` when nothing is playing; that is
    /// reported as `Ok(None)`.
    pub async fn currently_playing(&mut self) -> Res<Option<CurrentlyPlayingResponse>> {
        let url = format!(
            "{uri}/me/player/currently-playing?limit={limit}",
            uri = self.endpoints.api_url,
            limit = 1
        );

        let token = self.valid_token().await?;
        let response = self.http.get(&url).bearer_auth(token).send().await?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        parse_json(response, "currently playing").await.map(Some)
    }

    /// Fetches the user's play history, newest first.
    pub async fn recently_played(&mut self, limit: u32) -> Res<RecentlyPlayedResponse> {
        let url = format!(
            "{uri}/me/player/recently-played?limit={limit}",
            uri = self.endpoints.api_url,
            limit = limit
        );

        let token = self.valid_token().await?;
        let response = self.http.get(&url).bearer_auth(token).send().await?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(RecentlyPlayedResponse { items: Vec::new() });
        }

        parse_json(response, "recently played").await
    }
}

/// Checks the status and decodes the body, naming `what` in errors.
pub(crate) async fn parse_json<T: DeserializeOwned>(response: Response, what: &str) -> Res<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Upstream(format!(
            "{what} request failed with {status}: {body}"
        )));
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes)
        .map_err(|e| Error::Upstream(format!("malformed {what} response: {e}")))
}
