//! # API Module
//!
//! HTTP handlers for the service's two listeners.
//!
//! ## Endpoints
//!
//! ### Public API
//!
//! - [`now_playing`] - `GET /api/nowplaying`, the track playing right now
//! - [`last_played`] - `GET /api/lastplayed`, the most recently played track
//! - [`health`] - `GET /health`, liveness and version information
//!
//! Both track routes answer `200` with the snapshot JSON, `204` when there is
//! nothing to report and `400` with an empty body on any failure.
//!
//! ### Authorization callback
//!
//! Served only while an interactive handshake is in progress, on the port of
//! the configured redirect URI:
//!
//! - [`landing`] - `GET /`, no-op landing route
//! - [`callback`] - `GET /callback`, verifies `state`, exchanges the code and
//!   hands the client to the waiting authenticator
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use axum::{Router, routing::get};
//! use nowplaying::{api, tracks::SpotifyTracks};
//!
//! let source: api::SharedSource = Arc::new(SpotifyTracks);
//! let app = Router::new()
//!     .route("/api/nowplaying", get(api::now_playing))
//!     .with_state(source);
//! ```

mod callback;
mod health;
mod tracks;

pub use callback::{CallbackState, callback, landing};
pub use health::health;
pub use tracks::{SharedSource, last_played, now_playing};
