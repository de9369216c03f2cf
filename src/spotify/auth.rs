use std::{sync::Arc, time::Duration};

use reqwest::{Client, header::AUTHORIZATION};
use tokio::sync::Mutex;
use url::Url;

use crate::{
    Res,
    config::Settings,
    error::Error,
    server,
    spotify::SpotifyClient,
    types::{CodeExchange, PendingAuthorization, TokenResponse},
    utils, warning,
};

/// How long the interactive flow waits for the browser to come back.
const AUTHORIZATION_TIMEOUT: Duration = Duration::from_secs(120);

/// Credentials used to reach the destination API. Exactly one variant is
/// used per run.
#[derive(Debug, Clone)]
pub enum DestinationCredentials {
    /// Interactive authorization-code flow with the application's credentials.
    AuthorizationFlow {
        client_id: String,
        client_secret: String,
        redirect_uri: String,
    },
    /// An access token obtained elsewhere, e.g. by the web frontend.
    BearerToken { token: String },
}

impl DestinationCredentials {
    /// Uses `access_token` when given, the application credentials from
    /// `settings` otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when no token is given and the client id,
    /// secret or redirect URI is not configured.
    pub fn from_settings(settings: &Settings, access_token: Option<String>) -> Res<Self> {
        if let Some(token) = access_token.filter(|t| !t.trim().is_empty()) {
            return Ok(DestinationCredentials::BearerToken { token });
        }

        Ok(DestinationCredentials::AuthorizationFlow {
            client_id: settings.client_id()?.to_string(),
            client_secret: settings.client_secret()?.to_string(),
            redirect_uri: settings.redirect_uri()?.to_string(),
        })
    }
}

/// Builds the URL of Spotify's authorization page.
///
/// # Arguments
///
/// * `auth_url` - The authorize endpoint, usually `https://accounts.spotify.com/authorize`
/// * `client_id` - Client id of the registered application
/// * `redirect_uri` - Where Spotify sends the browser back to; must be registered
/// * `scope` - Space separated scopes
/// * `state` - Optional value echoed back to the callback
///
/// # Errors
///
/// Returns [`Error::Config`] when `auth_url` is not a valid URL.
pub fn authorize_url(
    auth_url: &str,
    client_id: &str,
    redirect_uri: &str,
    scope: &str,
    state: Option<&str>,
) -> Res<String> {
    let mut url = Url::parse(auth_url)
        .map_err(|e| Error::Config(format!("invalid authorize URL '{auth_url}': {e}")))?;

    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("response_type", "code")
            .append_pair("client_id", client_id)
            .append_pair("scope", scope)
            .append_pair("redirect_uri", redirect_uri);
        if let Some(state) = state {
            query.append_pair("state", state);
        }
    }

    Ok(url.into())
}

/// Exchanges an authorization code for an access token.
///
/// The application authenticates with its client id and secret through HTTP
/// Basic authentication. The request is bounded by `exchange.timeout`.
///
/// # Arguments
///
/// * `exchange` - Token endpoint, application credentials and timeout
/// * `code` - The `code` query parameter Spotify passed to the callback
///
/// # Errors
///
/// - [`Error::Http`] if the token endpoint cannot be reached or does not
///   answer in time
/// - [`Error::Authentication`] if the exchange is rejected
pub async fn exchange_code(exchange: &CodeExchange, code: &str) -> Res<String> {
    let client = Client::builder().timeout(exchange.timeout).build()?;
    let response = client
        .post(&exchange.token_url)
        .header(
            AUTHORIZATION,
            utils::basic_auth_header(&exchange.client_id, &exchange.client_secret),
        )
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", exchange.redirect_uri.as_str()),
        ])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Authentication(format!(
            "token exchange returned {status}: {body}"
        )));
    }

    let token: TokenResponse = response.json().await?;
    Ok(token.access_token)
}

/// Runs the complete interactive authorization-code flow.
///
/// 1. Starts the local callback server on `settings.server_address`
/// 2. Opens the authorization URL in the default browser
/// 3. Waits for the callback handler to exchange the code
///
/// The `state` parameter is random per run and checked by the callback.
///
/// # Errors
///
/// - [`Error::Io`] / [`Error::Config`] if the callback server cannot bind
/// - [`Error::Authentication`] if no token arrives within two minutes
pub async fn authorize(settings: &Settings, exchange: CodeExchange) -> Res<String> {
    let state = utils::generate_state();
    let auth_url = authorize_url(
        &settings.spotify_auth_url,
        &exchange.client_id,
        &exchange.redirect_uri,
        &settings.scope_param(),
        Some(&state),
    )?;

    let shared_state = Arc::new(Mutex::new(Some(PendingAuthorization {
        state,
        exchange,
        access_token: None,
    })));

    let listener = server::bind(&settings.server_address).await?;
    let router = server::callback_router(Arc::clone(&shared_state));
    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!(error = %e, "callback server stopped");
        }
    });

    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    let token = wait_for_token(shared_state, AUTHORIZATION_TIMEOUT).await;
    server_handle.abort();

    token.ok_or_else(|| Error::Authentication("authorization failed or timed out".to_string()))
}

/// Polls the shared state until the callback handler stored a token or
/// `max_wait` has passed.
async fn wait_for_token(
    shared_state: Arc<Mutex<Option<PendingAuthorization>>>,
    max_wait: Duration,
) -> Option<String> {
    use std::time::Instant;

    let start = Instant::now();

    while start.elapsed() < max_wait {
        let lock = shared_state.lock().await;
        if let Some(token) = lock.as_ref().and_then(|p| p.access_token.as_ref()) {
            return Some(token.clone());
        }
        drop(lock);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}

/// Turns credentials into an API handle.
///
/// For [`DestinationCredentials::AuthorizationFlow`] this runs [`authorize`]
/// first. The handle is not checked against the API here;
/// [`crate::spotify::Reconciler::authenticate`] does that.
///
/// # Errors
///
/// Errors of the interactive flow and of building the HTTP client.
pub async fn authenticate(
    credentials: &DestinationCredentials,
    settings: &Settings,
) -> Res<SpotifyClient> {
    let access_token = match credentials {
        DestinationCredentials::BearerToken { token } => token.clone(),
        DestinationCredentials::AuthorizationFlow {
            client_id,
            client_secret,
            redirect_uri,
        } => {
            let exchange = CodeExchange {
                token_url: settings.spotify_token_url.clone(),
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
                redirect_uri: redirect_uri.clone(),
                timeout: settings.http_timeout,
            };
            authorize(settings, exchange).await?
        }
    };

    SpotifyClient::new(&settings.spotify_api_url, access_token, settings.http_timeout)
}
