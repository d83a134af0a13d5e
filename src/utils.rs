use std::time::Duration;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use indicatif::{ProgressBar, ProgressStyle};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

/// Random value for the OAuth `state` parameter.
pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Stable, file-name safe key for caching the token of a client id.
pub fn token_cache_key(client_id: &str) -> String {
    let hash = Sha256::digest(client_id.as_bytes());
    let mut key = URL_SAFE_NO_PAD.encode(hash);
    key.truncate(16);
    key
}

/// Whether every permission of `required` is part of the granted `scope`.
pub fn scope_covers(scope: &str, required: &str) -> bool {
    let granted: Vec<&str> = scope.split_whitespace().collect();
    required.split_whitespace().all(|s| granted.contains(&s))
}

/// Builds the search query for a track, constraining the artist only when known.
pub fn build_track_query(artist: &str, title: &str) -> String {
    if artist.is_empty() {
        format!("track:{}", title)
    } else {
        format!("track:{} artist:{}", title, artist)
    }
}

pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}
