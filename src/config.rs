//! Configuration management for the playlist importer.
//!
//! Values come from environment variables, which may be pre-populated from a
//! `.env` file in the local data directory. Priority order:
//! 1. Command-line flags (credentials only)
//! 2. Environment variables
//! 3. `.env` file in the local data directory
//! 4. Application defaults

use std::{env, path::PathBuf};

use crate::error::AuthError;

const APP_DIR: &str = "playlist2spotify";

pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8000/callback";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_API_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_API_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Permissions requested during authorization: playlist read/write and library read.
pub const SPOTIFY_SCOPE: &str =
    "playlist-modify-public playlist-modify-private playlist-read-private user-library-read";

/// Loads environment variables from `playlist2spotify/.env` in the local data directory.
///
/// The directory is created when missing so users know where to put the file.
/// A missing `.env` file is not an error, variables may as well be exported by
/// the shell.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/playlist2spotify/.env`
/// - macOS: `~/Library/Application Support/playlist2spotify/.env`
/// - Windows: `%LOCALAPPDATA%/playlist2spotify/.env`
pub async fn load_env() -> Result<(), String> {
    let path = app_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if !path.is_file() {
        return Ok(());
    }

    dotenv::from_path(&path).map_err(|e| format!("{}: {}", path.display(), e))
}

/// Root of everything the tool stores locally.
pub fn app_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

/// Client credentials of the registered Spotify application.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl Credentials {
    /// Resolves the credentials, preferring explicit overrides over the environment.
    ///
    /// Blank values count as missing.
    pub fn resolve(
        client_id: Option<String>,
        client_secret: Option<String>,
    ) -> Result<Self, AuthError> {
        let client_id = non_blank(client_id).or_else(|| env_value("SPOTIFY_CLIENT_ID"));
        let client_secret =
            non_blank(client_secret).or_else(|| env_value("SPOTIFY_CLIENT_SECRET"));

        match (client_id, client_secret) {
            (Some(client_id), Some(client_secret)) => Ok(Credentials {
                client_id,
                client_secret,
                redirect_uri: spotify_redirect_uri(),
            }),
            _ => Err(AuthError::MissingCredentials),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_value(key: &str) -> Option<String> {
    non_blank(env::var(key).ok())
}

/// Returns the OAuth redirect URI registered for the application.
///
/// Reads `SPOTIFY_REDIRECT_URI`, defaulting to `http://127.0.0.1:8000/callback`.
/// The local callback server binds to the host and port of this URI.
pub fn spotify_redirect_uri() -> String {
    env_value("SPOTIFY_REDIRECT_URI").unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string())
}

/// Returns the Spotify Web API base URL (`SPOTIFY_API_URL`).
pub fn spotify_apiurl() -> String {
    env_value("SPOTIFY_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

/// Returns the Spotify OAuth authorization URL (`SPOTIFY_API_AUTH_URL`).
pub fn spotify_apiauth_url() -> String {
    env_value("SPOTIFY_API_AUTH_URL").unwrap_or_else(|| DEFAULT_API_AUTH_URL.to_string())
}

/// Returns the Spotify OAuth token exchange URL (`SPOTIFY_API_TOKEN_URL`).
pub fn spotify_apitoken_url() -> String {
    env_value("SPOTIFY_API_TOKEN_URL").unwrap_or_else(|| DEFAULT_API_TOKEN_URL.to_string())
}
