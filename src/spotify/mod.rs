//! # Spotify Integration Module
//!
//! Everything that talks to the Spotify Web API lives here. Business logic
//! does not use the HTTP client directly: it is written against the
//! [`Catalog`] trait, which [`SpotifyClient`] implements for the real service
//! and tests implement in memory.
//!
//! ```text
//! Reconciler (matching, duplicate detection, batching)
//!          ↓
//! Catalog trait
//!          ↓
//! SpotifyClient (reqwest, bearer token, JSON)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Modules
//!
//! - [`auth`] - establishes the session: cached token, refresh, or the
//!   authorization code flow through the local callback server
//! - [`client`] - the [`Catalog`] implementation over HTTP
//! - [`paging`] - paginated listings as lazy streams of pages
//!
//! ## API Coverage
//!
//! - `GET /search` - track search
//! - `GET /me` - current user id, needed to create playlists
//! - `GET /me/playlists` - the user's playlists, paginated
//! - `POST /users/{user_id}/playlists` - create a playlist
//! - `GET /playlists/{playlist_id}/tracks` - playlist content, paginated
//! - `POST /playlists/{playlist_id}/tracks` - append up to 100 tracks
//! - `POST /api/token` - code exchange and token refresh

pub mod auth;
pub mod client;
pub mod paging;

use async_trait::async_trait;

pub use auth::connect;
pub use client::SpotifyClient;

use crate::{
    error::RemoteError,
    types::{Page, PlaylistHandle},
};

/// The remote operations the importer relies on.
///
/// Cursors are opaque: `None` requests the first page, afterwards the value
/// returned in [`Page::next`] is passed back unchanged.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Ids of the tracks matching `query`, best match first.
    async fn search_track_ids(&self, query: &str, limit: u32) -> Result<Vec<String>, RemoteError>;

    async fn current_user_id(&self) -> Result<String, RemoteError>;

    /// One page of the current user's playlists.
    async fn playlists_page(
        &self,
        cursor: Option<String>,
    ) -> Result<Page<PlaylistHandle>, RemoteError>;

    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        public: bool,
        description: &str,
    ) -> Result<PlaylistHandle, RemoteError>;

    /// One page of track ids of a playlist. Entries without a catalog track,
    /// such as local files, are `None`.
    async fn playlist_track_ids_page(
        &self,
        playlist_id: &str,
        cursor: Option<String>,
    ) -> Result<Page<Option<String>>, RemoteError>;

    /// Appends `uris` (at most 100) to the end of the playlist.
    async fn append_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<(), RemoteError>;
}
