//! Now Playing Service Library
//!
//! This library backs a small HTTP service that reports the track a Spotify
//! user is currently listening to and the track they played last. It bundles
//! the OAuth handshake against the Spotify accounts service, the two player
//! endpoint fetchers and the axum routes exposing them.
//!
//! # Modules
//!
//! - `api` - HTTP handlers for the public routes and the OAuth callback
//! - `config` - Configuration management and environment variables
//! - `error` - Error type shared by every layer
//! - `logging` - Tracing subscriber setup
//! - `server` - Router construction and listeners
//! - `spotify` - Spotify authentication and Web API client
//! - `tracks` - Track fetchers projecting player data into snapshots
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use nowplaying::{config, server, tracks::SpotifyTracks};
//!
//! #[tokio::main]
//! async fn main() -> nowplaying::Res<()> {
//!     config::load_env();
//!     let router = server::build_router(Arc::new(SpotifyTracks), &config::cors_allowed_origins());
//!     server::serve(router, 1323).await
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod server;
pub mod spotify;
pub mod tracks;
pub mod types;
pub mod utils;

pub use error::Error;

/// A convenient Result type alias for operations that may fail.
///
/// Every fallible operation in the crate reports an [`Error`], so callers can
/// propagate with `?` from the Spotify client up to the HTTP handlers where
/// errors are finally translated into status codes.
///
/// # Example
///
/// ```
/// use nowplaying::Res;
///
/// async fn fetch_data() -> Res<String> {
///     Ok("data".to_string())
/// }
/// ```
pub type Res<T> = std::result::Result<T, Error>;

/// Prints an informational message with a blue bullet point.
///
/// Used for operator-facing console output, such as the authorization URL
/// that has to be opened in a browser during the first run.
///
/// # Example
///
/// ```
/// info!("Open the following URL to authorize: {}", url);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Listening on port {}", port);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Reserved for fatal startup failures in the binary. Request paths never
/// call it; they return [`Error`] instead.
///
/// # Example
///
/// ```
/// error!("Failed to bind port {}", port);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// # Example
///
/// ```
/// warning!("No .env file found, relying on the process environment");
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
