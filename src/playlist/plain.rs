//! Plain text playlists, one track per line.
//!
//! Each line is tried against these shapes, first match wins:
//!
//! - `Artist - Title`
//! - `Title by Artist`
//! - `Title`

use super::{ARTIST_TITLE_SEPARATOR, entry, split_pair};
use crate::types::TrackRef;

const TITLE_BY_ARTIST_SEPARATOR: &str = " by ";

pub fn parse(content: &str) -> Vec<TrackRef> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(parse_line)
        .collect()
}

pub fn parse_line(line: &str) -> Option<TrackRef> {
    let line = line.trim();
    if let Some((artist, title)) = split_pair(line, ARTIST_TITLE_SEPARATOR) {
        entry(artist, title, line)
    } else if let Some((title, artist)) = split_pair(line, TITLE_BY_ARTIST_SEPARATOR) {
        entry(artist, title, line)
    } else {
        entry("", line, line)
    }
}
