use std::path::PathBuf;

use chrono::Utc;
use reqwest::Client;

use crate::{
    config::{self, Credentials},
    error::AuthError,
    spotify::auth::request_token,
    types::Token,
    utils, warning,
};

/// Seconds before the real expiry at which a token counts as expired.
const EXPIRY_MARGIN_SECS: u64 = 240;

pub struct TokenManager {
    token: Token,
    credentials: Credentials,
}

impl TokenManager {
    pub fn new(token: Token, credentials: Credentials) -> Self {
        TokenManager { token, credentials }
    }

    /// Loads the cached token of the given client.
    pub async fn load(credentials: &Credentials) -> Result<Self, String> {
        let path = Self::token_path(&credentials.client_id);
        let content = async_fs::read_to_string(&path)
            .await
            .map_err(|e| e.to_string())?;
        let token: Token = serde_json::from_str(&content).map_err(|e| e.to_string())?;
        Ok(Self {
            token,
            credentials: credentials.clone(),
        })
    }

    pub async fn persist(&self) -> Result<(), String> {
        let path = Self::token_path(&self.credentials.client_id);
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(&self.token).map_err(|e| e.to_string())?;
        async_fs::write(path, json).await.map_err(|e| e.to_string())
    }

    /// Returns an access token, refreshing and persisting it when it is about to expire.
    ///
    /// A failed refresh keeps the old token; the following request then fails
    /// with an authorization error that is reported at the call site.
    pub async fn get_valid_token(&mut self, http: &Client) -> String {
        if self.is_expired() {
            match self.refresh(http).await {
                Ok(()) => {
                    if let Err(e) = self.persist().await {
                        warning!("Failed to save token to cache: {}", e);
                    }
                }
                Err(e) => warning!("Failed to refresh access token: {}", e),
            }
        }

        self.token.access_token.clone()
    }

    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp() as u64;
        now >= self.token.obtained_at + self.token.expires_in.saturating_sub(EXPIRY_MARGIN_SECS)
    }

    /// Exchanges the refresh token for a new access token.
    pub async fn refresh(&mut self, http: &Client) -> Result<(), AuthError> {
        if self.token.refresh_token.is_empty() {
            return Err(AuthError::Exchange("no refresh token available".to_string()));
        }

        let refresh_token = self.token.refresh_token.clone();
        let token = request_token(
            http,
            &config::spotify_apitoken_url(),
            &self.credentials,
            &[
                ("grant_type", "refresh_token"),
                ("refresh_token", &refresh_token),
            ],
        )
        .await?;

        // the accounts service only sometimes rotates the refresh token
        self.token = Token {
            refresh_token: if token.refresh_token.is_empty() {
                refresh_token
            } else {
                token.refresh_token
            },
            scope: if token.scope.is_empty() {
                self.token.scope.clone()
            } else {
                token.scope
            },
            ..token
        };
        Ok(())
    }

    fn token_path(client_id: &str) -> PathBuf {
        let mut path = config::app_dir();
        path.push(format!(
            "cache/token-{key}.json",
            key = utils::token_cache_key(client_id)
        ));
        path
    }

    pub fn current_token(&self) -> &Token {
        &self.token
    }
}
