use std::sync::Arc;

use clap::{
    Parser,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};

use nowplaying::{
    config, error, logging, server, success,
    tracks::SpotifyTracks,
    warning,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    /// Port the API listens on
    #[clap(long, env = "BACK_PORT", default_value_t = config::DEFAULT_BACK_PORT)]
    port: u16,

    /// Log level when RUST_LOG is not set (trace, debug, info, warn, error)
    #[clap(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let env_file = config::load_env();
    let cli = Cli::parse();

    logging::init_logging(&cli.log_level);

    match env_file {
        Some(path) => tracing::info!(path = %path.display(), "loaded environment file"),
        None => warning!("No .env file found, relying on the process environment"),
    }

    if config::spotify_refresh_token().is_none() {
        warning!(
            "SPOTIFY_REFRESH_TOKEN is not set. Each request will wait for a browser authorization."
        );
    }

    let router = server::build_router(Arc::new(SpotifyTracks), &config::cors_allowed_origins());

    success!("Now playing API listening on port {}", cli.port);
    if let Err(e) = server::serve(router, cli.port).await {
        error!("Server stopped. Err: {}", e);
    }
}
