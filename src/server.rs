use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use reqwest::Url;
use tokio::{
    net::TcpListener,
    sync::{Mutex, oneshot},
};

use crate::{api, error::AuthError, types::AuthCallback};

/// Binds the callback listener on the host and port of the redirect URI.
pub async fn bind(redirect_uri: &Url) -> Result<TcpListener, AuthError> {
    let invalid = || AuthError::RedirectUri(redirect_uri.to_string());
    let host = redirect_uri.host_str().ok_or_else(invalid)?;
    let port = redirect_uri.port_or_known_default().ok_or_else(invalid)?;

    TcpListener::bind((host, port))
        .await
        .map_err(|e| AuthError::Server(format!("cannot listen on {}:{}: {}", host, port, e)))
}

/// Serves the OAuth callback at `path` until `shutdown` fires.
pub async fn serve(
    listener: TcpListener,
    path: &str,
    state: Arc<Mutex<AuthCallback>>,
    shutdown: oneshot::Receiver<()>,
) -> Result<(), AuthError> {
    let app = Router::new().route(path, get(api::callback).layer(Extension(state)));

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.await;
        })
        .await
        .map_err(|e| AuthError::Server(e.to_string()))
}
