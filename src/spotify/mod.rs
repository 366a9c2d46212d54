//! # Spotify Integration Module
//!
//! This module is the integration layer between the service and Spotify. It
//! covers the OAuth 2.0 authorization-code flow against the accounts service
//! and the two Web API player endpoints the service reports on.
//!
//! ## Architecture
//!
//! ```text
//! Track fetchers (crate::tracks)
//!          ↓
//! Spotify Integration Layer
//!     ├── Authentication (authorization code + refresh token)
//!     ├── Handoff (write-once slot between callback and caller)
//!     └── Client (player endpoints, silent token refresh)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Authentication Strategy
//!
//! [`auth::Authenticator`] hands out a fresh [`SpotifyClient`] per call:
//!
//! - With `SPOTIFY_REFRESH_TOKEN` configured, the client is built around the
//!   refresh token alone and obtains an access token on its first request.
//! - Without it, a temporary callback server is started on the redirect URI's
//!   port. The operator opens the printed authorization URL; the `/callback`
//!   route verifies the `state` nonce, exchanges the code and fulfills the
//!   [`handoff`] slot the authenticator is waiting on. The refresh token is
//!   printed so later starts can skip the browser step.
//!
//! ## API Coverage
//!
//! - `GET /me/player/currently-playing` - The item playing right now
//! - `GET /me/player/recently-played` - Play history, newest first
//! - `POST /api/token` - Code exchange and refresh grants
//!
//! ## Error Types
//!
//! Everything returns [`crate::Res`]. Upstream status failures and malformed
//! payloads become [`crate::Error::Upstream`]; handshake failures become
//! [`crate::Error::Auth`] or [`crate::Error::AuthTimeout`].

pub mod auth;
pub mod client;
pub mod handoff;

pub use auth::Authenticator;
pub use client::SpotifyClient;
