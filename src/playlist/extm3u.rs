//! Extended M3U playlists.
//!
//! ```text
//! #EXTM3U
//! #EXTINF:123,Daft Punk - One More Time
//! /music/a.mp3
//! /music/Justice - D.A.N.C.E.flac
//! ```
//!
//! An `#EXTINF` line fills a pending slot that the next path line consumes.
//! Path lines without preceding metadata are described by their file name.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::TrackRef;

static EXTINF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#EXTINF:-?\d+(?:\.\d+)?,(.+)$").expect("EXTINF pattern is valid")
});

pub fn parse(content: &str) -> Vec<TrackRef> {
    let mut tracks = Vec::new();
    let mut pending: Option<TrackRef> = None;

    for line in content.lines().map(str::trim) {
        if line.starts_with("#EXTINF:") {
            // a malformed EXTINF keeps whatever was pending
            if let Some(info) = EXTINF.captures(line).and_then(|c| c.get(1)) {
                pending = super::artist_title(info.as_str());
            }
            continue;
        }

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let track = match pending.take() {
            Some(track) => Some(track),
            None => super::artist_title(file_stem(line)),
        };
        tracks.extend(track);
    }

    tracks
}

/// File name without directory and extension, for both `/` and `\` paths.
pub fn file_stem(location: &str) -> &str {
    let name = location
        .rsplit(['/', '\\'])
        .find(|part| !part.is_empty())
        .unwrap_or("");

    match name.rfind('.') {
        Some(dot) if dot > 0 => &name[..dot],
        _ => name,
    }
}
