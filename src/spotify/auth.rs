use std::{net::SocketAddr, time::Duration};

use reqwest::Client;
use tokio::{net::TcpListener, sync::oneshot};
use url::Url;

use crate::{
    Error, Res,
    api::CallbackState,
    config::{self, Credentials, Endpoints},
    info,
    server::start_callback_server,
    spotify::{SpotifyClient, client::parse_json, handoff},
    success,
    types::{Token, TokenResponse},
    utils,
};

/// Produces authenticated Spotify clients.
///
/// Two paths exist:
/// 1. **Refresh**: a refresh token is configured. The client is returned
///    immediately and refreshes its access token on first use.
/// 2. **Interactive**: no refresh token. A temporary callback server is bound
///    on the redirect URI's port, the operator opens the printed authorization
///    URL, and the callback hands the resulting client back to the caller.
///
/// Nothing is cached between calls; every fetch authenticates again.
#[derive(Debug, Clone)]
pub struct Authenticator {
    http: Client,
    credentials: Credentials,
    endpoints: Endpoints,
    callback_timeout: Option<Duration>,
}

impl Authenticator {
    pub fn new(credentials: Credentials, endpoints: Endpoints) -> Self {
        Authenticator {
            http: Client::new(),
            credentials,
            endpoints,
            callback_timeout: config::parse_timeout(config::DEFAULT_AUTH_TIMEOUT_SECS),
        }
    }

    /// Reads credentials, endpoints and the callback timeout from the environment.
    pub fn from_env() -> Res<Self> {
        Ok(Self::new(Credentials::from_env()?, Endpoints::from_env())
            .with_callback_timeout(config::spotify_auth_timeout()))
    }

    /// Bounds the wait for the browser callback; `None` waits forever.
    pub fn with_callback_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.callback_timeout = timeout;
        self
    }

    /// Returns an authenticated client, running the interactive handshake
    /// when no refresh token is configured.
    pub async fn authenticate(&self) -> Res<SpotifyClient> {
        match self.credentials.refresh_token.as_deref() {
            Some(refresh_token) => Ok(self.client_from_refresh_token(refresh_token)),
            None => self.authorize_with_state(utils::generate_state()).await,
        }
    }

    fn client_from_refresh_token(&self, refresh_token: &str) -> SpotifyClient {
        tracing::debug!("using configured refresh token");
        self.client_for(Token::from_refresh_token(refresh_token))
    }

    pub(crate) fn client_for(&self, token: Token) -> SpotifyClient {
        SpotifyClient::new(self.http.clone(), &self.credentials, &self.endpoints, token)
    }

    /// Runs the interactive handshake correlated by `state`.
    ///
    /// Binds the callback server, prints the authorization URL and waits for
    /// the callback to deliver a client. The callback server is shut down once
    /// the wait ends, whether a client arrived or not.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the redirect URI has no usable port
    /// - [`Error::Io`] if the callback port cannot be bound
    /// - [`Error::AuthTimeout`] if no callback succeeds in time
    pub async fn authorize_with_state(&self, state: String) -> Res<SpotifyClient> {
        let port = utils::port_from_redirect_uri(&self.credentials.redirect_uri).inspect_err(
            |e| tracing::error!(error = %e, "cannot derive callback port"),
        )?;

        let listener = TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], port)))
            .await
            .inspect_err(|e| tracing::error!(error = %e, port, "cannot bind callback listener"))?;

        let (handoff, pending) = handoff::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let callback_state = CallbackState {
            state: state.clone(),
            authenticator: self.clone(),
            handoff,
        };

        tokio::spawn(async move {
            if let Err(e) = start_callback_server(listener, callback_state, async {
                let _ = shutdown_rx.await;
            })
            .await
            {
                tracing::error!(error = %e, "callback server stopped");
            }
        });

        info!(
            "Open the following URL in a browser to authorize this service:\n{}",
            self.authorize_url(&state)?
        );

        let result = pending.wait(self.callback_timeout).await;
        let _ = shutdown_tx.send(());

        let client =
            result.inspect_err(|e| tracing::error!(error = %e, "authorization failed"))?;
        success!(
            "Authorization complete. Set SPOTIFY_REFRESH_TOKEN={} to skip this step next time.",
            client.token().refresh_token
        );

        Ok(client)
    }

    /// Builds the provider authorization URL for `state`.
    pub fn authorize_url(&self, state: &str) -> Res<String> {
        let scope = self.credentials.scopes.join(" ");
        let url = Url::parse_with_params(
            &self.endpoints.auth_url,
            &[
                ("client_id", self.credentials.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.credentials.redirect_uri.as_str()),
                ("scope", scope.as_str()),
                ("state", state),
            ],
        )
        .map_err(|e| Error::Config(format!("invalid authorization URL: {e}")))?;

        Ok(url.to_string())
    }

    /// Exchanges an authorization code for a token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Auth`] when the request fails or Spotify rejects the code.
    pub async fn exchange_code(&self, code: &str) -> Res<Token> {
        let response = self
            .http
            .post(&self.endpoints.token_url)
            .basic_auth(&self.credentials.client_id, Some(&self.credentials.client_secret))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.credentials.redirect_uri.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::Auth(format!("token exchange failed: {e}")))?;

        let json: TokenResponse = parse_json(response, "token exchange")
            .await
            .map_err(|e| Error::Auth(e.to_string()))?;

        Ok(Token::from_response(json, None))
    }
}
