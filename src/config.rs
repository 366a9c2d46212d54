//! Configuration management for the now playing service.
//!
//! This module handles loading and accessing configuration values from environment
//! variables and `.env` files. Values are read at call time, so a running process
//! picks up whatever the environment holds when a request needs it.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the working directory
//! 3. `.env` file in the local data directory
//! 4. Application defaults (where applicable)

use std::{env, fmt, path::PathBuf, time::Duration};

use crate::{Error, Res};

/// Port the public API listens on when `BACK_PORT` is not set.
pub const DEFAULT_BACK_PORT: u16 = 1323;

/// Upper bound for waiting on the browser authorization callback.
pub const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 300;

/// Scopes requested during the interactive authorization.
pub const DEFAULT_SCOPES: [&str; 4] = [
    "user-follow-read",
    "user-follow-modify",
    "user-library-read",
    "user-library-modify",
];

/// Stand-in printed for secrets in `Debug` output.
pub(crate) const REDACTED: &str = "<redacted>";

const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Loads environment variables from a `.env` file.
///
/// Looks in the working directory first and falls back to the platform local
/// data directory (`~/.local/share/nowplaying/.env` on Linux). Variables already
/// present in the process environment are never overwritten.
///
/// # Returns
///
/// The path of the file that was loaded, or `None` when no `.env` file exists.
/// A missing file is not an error; the process environment may carry
/// everything on its own.
pub fn load_env() -> Option<PathBuf> {
    if let Ok(path) = dotenv::dotenv() {
        return Some(path);
    }

    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("nowplaying/.env");
    dotenv::from_path(&path).ok().map(|_| path)
}

/// OAuth client credentials and the optional long-lived refresh token.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub refresh_token: Option<String>,
    pub scopes: Vec<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &REDACTED)
            .field("redirect_uri", &self.redirect_uri)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| REDACTED))
            .field("scopes", &self.scopes)
            .finish()
    }
}

impl Credentials {
    /// Reads the credentials from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when `SPOTIFY_ID`, `SPOTIFY_SECRET` or
    /// `SPOTIFY_REDIRECT_URI` is missing.
    pub fn from_env() -> Res<Self> {
        Ok(Self {
            client_id: spotify_client_id()?,
            client_secret: spotify_client_secret()?,
            redirect_uri: spotify_redirect_uri()?,
            refresh_token: spotify_refresh_token(),
            scopes: spotify_scopes(),
        })
    }
}

/// Spotify service locations. Overridable so tests can point at a mock server.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub api_url: String,
    pub auth_url: String,
    pub token_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
        }
    }
}

impl Endpoints {
    pub fn from_env() -> Self {
        Self {
            api_url: optional("SPOTIFY_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            auth_url: optional("SPOTIFY_AUTH_URL").unwrap_or_else(|| DEFAULT_AUTH_URL.to_string()),
            token_url: optional("SPOTIFY_TOKEN_URL")
                .unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
        }
    }

    /// Points every endpoint at one base URL, laid out like the real services.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            api_url: format!("{base}/v1"),
            auth_url: format!("{base}/authorize"),
            token_url: format!("{base}/api/token"),
        }
    }
}

pub fn spotify_client_id() -> Res<String> {
    required("SPOTIFY_ID")
}

pub fn spotify_client_secret() -> Res<String> {
    required("SPOTIFY_SECRET")
}

pub fn spotify_redirect_uri() -> Res<String> {
    required("SPOTIFY_REDIRECT_URI")
}

pub fn spotify_refresh_token() -> Option<String> {
    optional("SPOTIFY_REFRESH_TOKEN")
}

pub fn spotify_scopes() -> Vec<String> {
    match optional("SPOTIFY_SCOPE") {
        Some(scope) => scope.split_whitespace().map(str::to_string).collect(),
        None => DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
    }
}

/// How long the interactive handshake waits for the browser callback.
///
/// `SPOTIFY_AUTH_TIMEOUT_SECS=0` disables the bound and waits forever.
pub fn spotify_auth_timeout() -> Option<Duration> {
    let secs = optional("SPOTIFY_AUTH_TIMEOUT_SECS")
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(DEFAULT_AUTH_TIMEOUT_SECS);
    parse_timeout(secs)
}

pub fn parse_timeout(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Origins allowed to call the API from a browser; empty disables CORS.
pub fn cors_allowed_origins() -> Vec<String> {
    optional("CORS_ALLOWED_ORIGINS")
        .map(|v| parse_origins(&v))
        .unwrap_or_default()
}

pub fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

fn required(key: &str) -> Res<String> {
    optional(key).ok_or_else(|| Error::Config(format!("{key} must be set")))
}

fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
