use std::{io, path::PathBuf};

use reqwest::StatusCode;
use thiserror::Error;

/// Failures while turning a playlist file into track references.
///
/// Individual malformed lines never produce an error, only the file as a
/// whole can fail.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("File '{path}' could not be read: {source}", path = .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unsupported file format '{0}'. Supported formats: .m3u, .txt, .csv")]
    UnsupportedFormat(String),
}

/// Failures of a single call to the Spotify Web API.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("http status {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Failures while establishing the authenticated session.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(
        "Spotify credentials required. Set SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET environment variables or use --client-id and --client-secret flags."
    )]
    MissingCredentials,

    #[error("invalid redirect uri '{0}'")]
    RedirectUri(String),

    #[error("callback server failed: {0}")]
    Server(String),

    #[error("authorization was rejected: {0}")]
    Callback(String),

    #[error("authorization timed out after {0} seconds")]
    Timeout(u64),

    #[error("token exchange failed: {0}")]
    Exchange(String),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Fatal outcomes of a reconciliation run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("No tracks found in playlist file.")]
    EmptyPlaylist,

    #[error("Playlist '{0}' not found. Use --create-playlist to create it.")]
    PlaylistNotFound(String),

    #[error("Failed to create playlist '{0}'.")]
    PlaylistCreateFailed(String),

    #[error("Failed to add tracks to playlist '{0}'.")]
    AppendFailed(String),
}
