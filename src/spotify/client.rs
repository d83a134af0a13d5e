use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    error::RemoteError,
    management::TokenManager,
    types::{
        AddTrackToPlaylistRequest, AddTrackToPlaylistResponse, ApiErrorResponse,
        CreatePlaylistRequest, CurrentUserResponse, GetUserPlaylistsResponse, Page, Playlist,
        PlaylistHandle, PlaylistTracksResponse, SearchResponse,
    },
};

use super::Catalog;

const PLAYLISTS_PAGE_SIZE: u32 = 50;
const PLAYLIST_TRACKS_PAGE_SIZE: u32 = 100;

/// Authenticated session against the Spotify Web API.
///
/// Created once per run by [`super::connect`] and shared by every call. The
/// access token is refreshed transparently shortly before it expires.
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    tokens: Mutex<TokenManager>,
}

impl SpotifyClient {
    pub fn new(http: Client, api_url: String, tokens: TokenManager) -> Self {
        SpotifyClient {
            http,
            api_url,
            tokens: Mutex::new(tokens),
        }
    }

    /// Builds `<api_url>/<segments...>`, escaping every segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        let mut url = Url::parse(&self.api_url)
            .map_err(|e| RemoteError::Decode(format!("invalid api url '{}': {}", self.api_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| RemoteError::Decode(format!("invalid api url '{}'", self.api_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Resolves a page cursor, falling back to the first page at `first`.
    fn page_url(cursor: Option<String>, first: Url) -> Result<Url, RemoteError> {
        match cursor {
            Some(next) => Url::parse(&next)
                .map_err(|e| RemoteError::Decode(format!("invalid page cursor '{}': {}", next, e))),
            None => Ok(first),
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, RemoteError> {
        let token = self.tokens.lock().await.get_valid_token(&self.http).await;
        let response = request.bearer_auth(token).send().await?;
        read_json(response).await
    }
}

/// Decodes a successful JSON response or turns the failure into a [`RemoteError`].
pub async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(RemoteError::Status {
            status,
            message: error_message(&body),
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| RemoteError::Decode(e.to_string()))
}

/// Extracts the human readable message of an error body.
///
/// The Web API answers `{"error": {"status": .., "message": ..}}`, the accounts
/// service `{"error": "..", "error_description": ".."}`.
pub fn error_message(body: &str) -> String {
    if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(body) {
        return api_error.error.message;
    }

    if let Ok(json) = serde_json::from_str::<Value>(body) {
        let description = json["error_description"]
            .as_str()
            .or_else(|| json["error"].as_str());
        if let Some(description) = description {
            return description.to_string();
        }
    }

    match body.trim() {
        "" => "no details".to_string(),
        other => other.to_string(),
    }
}

#[async_trait]
impl Catalog for SpotifyClient {
    async fn search_track_ids(&self, query: &str, limit: u32) -> Result<Vec<String>, RemoteError> {
        let url = self.endpoint(&["search"])?;
        let request = self.http.get(url).query(&[
            ("q", query.to_string()),
            ("type", "track".to_string()),
            ("limit", limit.to_string()),
        ]);

        let res: SearchResponse = self.send(request).await?;
        Ok(res.tracks.items.into_iter().filter_map(|t| t.id).collect())
    }

    async fn current_user_id(&self) -> Result<String, RemoteError> {
        let url = self.endpoint(&["me"])?;
        let res: CurrentUserResponse = self.send(self.http.get(url)).await?;
        Ok(res.id)
    }

    async fn playlists_page(
        &self,
        cursor: Option<String>,
    ) -> Result<Page<PlaylistHandle>, RemoteError> {
        let mut first = self.endpoint(&["me", "playlists"])?;
        first
            .query_pairs_mut()
            .append_pair("limit", &PLAYLISTS_PAGE_SIZE.to_string());

        let url = Self::page_url(cursor, first)?;
        let res: GetUserPlaylistsResponse = self.send(self.http.get(url)).await?;

        Ok(Page {
            items: res
                .items
                .into_iter()
                .map(|Playlist { id, name }| PlaylistHandle { id, name })
                .collect(),
            next: res.next,
        })
    }

    async fn create_playlist(
        &self,
        user_id: &str,
        name: &str,
        public: bool,
        description: &str,
    ) -> Result<PlaylistHandle, RemoteError> {
        let url = self.endpoint(&["users", user_id, "playlists"])?;
        let body = CreatePlaylistRequest {
            name: name.to_string(),
            public,
            description: description.to_string(),
        };

        let res: Playlist = self.send(self.http.post(url).json(&body)).await?;
        Ok(PlaylistHandle {
            id: res.id,
            name: res.name,
        })
    }

    async fn playlist_track_ids_page(
        &self,
        playlist_id: &str,
        cursor: Option<String>,
    ) -> Result<Page<Option<String>>, RemoteError> {
        let mut first = self.endpoint(&["playlists", playlist_id, "tracks"])?;
        first
            .query_pairs_mut()
            .append_pair("limit", &PLAYLIST_TRACKS_PAGE_SIZE.to_string())
            .append_pair("fields", "items(track(id,name)),next");

        let url = Self::page_url(cursor, first)?;
        let res: PlaylistTracksResponse = self.send(self.http.get(url)).await?;

        Ok(Page {
            items: res
                .items
                .into_iter()
                .map(|item| item.track.and_then(|t| t.id))
                .collect(),
            next: res.next,
        })
    }

    async fn append_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<(), RemoteError> {
        let url = self.endpoint(&["playlists", playlist_id, "tracks"])?;
        let body = AddTrackToPlaylistRequest {
            uris: uris.to_vec(),
        };

        let _: AddTrackToPlaylistResponse = self.send(self.http.post(url).json(&body)).await?;
        Ok(())
    }
}
