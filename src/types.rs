use std::fmt;

use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// An (artist, title) pair read from a playlist file.
///
/// The title is never empty, the artist may be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRef {
    pub artist: String,
    pub title: String,
}

impl TrackRef {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        TrackRef {
            artist: artist.into(),
            title: title.into(),
        }
    }
}

impl fmt::Display for TrackRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.artist.is_empty() {
            write!(f, "{}", self.title)
        } else {
            write!(f, "{} - {}", self.artist, self.title)
        }
    }
}

/// A track reference matched to a catalog id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTrack {
    pub reference: TrackRef,
    pub id: String,
}

pub fn track_uri(id: &str) -> String {
    format!("spotify:track:{}", id)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistHandle {
    pub id: String,
    pub name: String,
}

/// One page of a paginated listing together with the cursor of the next page.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
}

#[derive(Tabled)]
pub struct NotFoundTableRow {
    pub artist: String,
    pub title: String,
}

impl From<&TrackRef> for NotFoundTableRow {
    fn from(track: &TrackRef) -> Self {
        NotFoundTableRow {
            artist: track.artist.clone(),
            title: track.title.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
    pub expires_in: Option<u64>,
}

/// Result of the OAuth redirect as seen by the local callback server.
#[derive(Debug, Clone)]
pub struct AuthCallback {
    pub expected_state: String,
    pub outcome: Option<Result<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub tracks: SearchTracks,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchTracks {
    pub items: Vec<Track>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUserResponse {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetUserPlaylistsResponse {
    pub items: Vec<Playlist>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub public: bool,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistTracksResponse {
    pub items: Vec<PlaylistItem>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub track: Option<Track>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistRequest {
    pub uris: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistResponse {
    pub snapshot_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
}
