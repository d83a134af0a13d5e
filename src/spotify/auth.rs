use std::{sync::Arc, time::Duration};

use chrono::Utc;
use reqwest::{Client, Url};
use tokio::sync::{Mutex, oneshot};

use crate::{
    config::{self, Credentials},
    error::{AuthError, RemoteError},
    info,
    management::TokenManager,
    server,
    types::{AuthCallback, Token, TokenResponse},
    utils, warning,
};

use super::{SpotifyClient, client::read_json};

/// How long the user has to grant access in the browser.
pub const AUTH_TIMEOUT_SECS: u64 = 120;

/// Establishes an authenticated session for the given application credentials.
///
/// A cached token is reused when it was granted the required scope, refreshing
/// it first when it is about to expire. Without a usable cached token the
/// authorization code flow runs:
///
/// 1. A local callback server is bound to the host and port of the redirect URI
/// 2. The authorization URL is opened in the default browser
/// 3. The redirect carrying the code is awaited for [`AUTH_TIMEOUT_SECS`]
/// 4. The code is exchanged for a token using the client credentials
///
/// The resulting token is cached for the next run. Failing to write the cache
/// only produces a warning.
///
/// # Errors
///
/// Any failure of the authorization flow or the code exchange is returned as
/// [`AuthError`]; the run cannot continue without a session.
pub async fn connect(credentials: &Credentials) -> Result<SpotifyClient, AuthError> {
    let http = Client::new();

    let cached = match TokenManager::load(credentials).await {
        Ok(mut cached) if utils::scope_covers(&cached.current_token().scope, config::SPOTIFY_SCOPE) => {
            if !cached.is_expired() {
                Some(cached)
            } else {
                match cached.refresh(&http).await {
                    Ok(()) => Some(cached),
                    Err(e) => {
                        warning!("Cached token could not be refreshed: {}", e);
                        None
                    }
                }
            }
        }
        _ => None,
    };

    let tokens = match cached {
        Some(tokens) => tokens,
        None => {
            let token = authorize(&http, credentials).await?;
            TokenManager::new(token, credentials.clone())
        }
    };

    if let Err(e) = tokens.persist().await {
        warning!("Failed to save token to cache: {}", e);
    }

    Ok(SpotifyClient::new(http, config::spotify_apiurl(), tokens))
}

/// Runs the interactive authorization code flow and returns the new token.
async fn authorize(http: &Client, credentials: &Credentials) -> Result<Token, AuthError> {
    let redirect_uri = Url::parse(&credentials.redirect_uri)
        .map_err(|_| AuthError::RedirectUri(credentials.redirect_uri.clone()))?;
    let expected_state = utils::generate_state();

    let shared_state = Arc::new(Mutex::new(AuthCallback {
        expected_state: expected_state.clone(),
        outcome: None,
    }));

    let listener = server::bind(&redirect_uri).await?;
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let server_state = Arc::clone(&shared_state);
    let callback_path = redirect_uri.path().to_string();
    let server = tokio::spawn(async move {
        server::serve(listener, &callback_path, server_state, shutdown_rx).await
    });

    let auth_url = authorize_url(credentials, &expected_state)?;
    info!("Waiting for Spotify authorization in the browser...");
    if webbrowser::open(auth_url.as_str()).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    let outcome = wait_for_callback(shared_state, Duration::from_secs(AUTH_TIMEOUT_SECS)).await;

    let _ = shutdown_tx.send(());
    match server.await {
        Ok(Err(e)) => warning!("{}", e),
        Err(e) => warning!("Callback server task failed: {}", e),
        Ok(Ok(())) => {}
    }

    let code = match outcome {
        Some(Ok(code)) => code,
        Some(Err(reason)) => return Err(AuthError::Callback(reason)),
        None => return Err(AuthError::Timeout(AUTH_TIMEOUT_SECS)),
    };

    request_token(
        http,
        &config::spotify_apitoken_url(),
        credentials,
        &[
            ("grant_type", "authorization_code"),
            ("code", &code),
            ("redirect_uri", &credentials.redirect_uri),
        ],
    )
    .await
}

/// Authorization URL the user has to visit to grant access.
pub fn authorize_url(credentials: &Credentials, state: &str) -> Result<Url, AuthError> {
    let base = config::spotify_apiauth_url();
    let mut url = Url::parse(&base).map_err(|e| AuthError::Exchange(format!("{}: {}", base, e)))?;
    url.query_pairs_mut()
        .append_pair("client_id", &credentials.client_id)
        .append_pair("response_type", "code")
        .append_pair("redirect_uri", &credentials.redirect_uri)
        .append_pair("state", state)
        .append_pair("scope", config::SPOTIFY_SCOPE);
    Ok(url)
}

/// Polls the shared callback state until the redirect arrived or `max_wait` passed.
async fn wait_for_callback(
    shared_state: Arc<Mutex<AuthCallback>>,
    max_wait: Duration,
) -> Option<Result<String, String>> {
    use std::time::Instant;

    let start = Instant::now();

    while start.elapsed() < max_wait {
        let lock = shared_state.lock().await;
        if let Some(outcome) = &lock.outcome {
            return Some(outcome.clone());
        }
        drop(lock);
        tokio::time::sleep(Duration::from_millis(500)).await;
    }

    None
}

/// Posts `form` to the token endpoint, authenticating with the client credentials.
pub async fn request_token(
    http: &Client,
    token_url: &str,
    credentials: &Credentials,
    form: &[(&str, &str)],
) -> Result<Token, AuthError> {
    let response = http
        .post(token_url)
        .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
        .form(form)
        .send()
        .await
        .map_err(RemoteError::from)?;

    let res: TokenResponse = read_json(response)
        .await
        .map_err(|e| AuthError::Exchange(e.to_string()))?;

    Ok(Token {
        access_token: res.access_token,
        refresh_token: res.refresh_token.unwrap_or_default(),
        scope: res.scope.unwrap_or_default(),
        expires_in: res.expires_in.unwrap_or(3600),
        obtained_at: Utc::now().timestamp() as u64,
    })
}
