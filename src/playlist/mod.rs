//! # Playlist Module
//!
//! Turns playlist files into an ordered list of [`TrackRef`]s. Three formats
//! are understood, selected by the file extension:
//!
//! | Extension | Format                                   | Parser       |
//! |-----------|------------------------------------------|--------------|
//! | `.m3u`    | extended M3U with `#EXTINF` metadata     | [`extm3u`]   |
//! | `.txt`    | one track per line                       | [`plain`]    |
//! | `.csv`    | `;` separated table with a header row    | [`delimited`]|
//!
//! Parsing never fails on individual lines. Entries that do not match the
//! expected shape degrade to the best reference that can be extracted, only
//! reading the file itself can fail.

pub mod delimited;
pub mod extm3u;
pub mod plain;

use std::path::Path;

use crate::{error::ParseError, types::TrackRef};

/// Separator between artist and title, as in `Daft Punk - One More Time`.
pub const ARTIST_TITLE_SEPARATOR: &str = " - ";

/// Playlist file formats, keyed by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistFormat {
    ExtM3u,
    PlainText,
    Delimited,
}

impl PlaylistFormat {
    /// Maps a file extension (without dot, any case) to its format.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "m3u" => Some(PlaylistFormat::ExtM3u),
            "txt" => Some(PlaylistFormat::PlainText),
            "csv" => Some(PlaylistFormat::Delimited),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ParseError> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_default();

        Self::from_extension(&extension).ok_or_else(|| {
            ParseError::UnsupportedFormat(if extension.is_empty() {
                String::new()
            } else {
                format!(".{}", extension.to_ascii_lowercase())
            })
        })
    }

    pub fn parse(&self, content: &str) -> Vec<TrackRef> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        match self {
            PlaylistFormat::ExtM3u => extm3u::parse(content),
            PlaylistFormat::PlainText => plain::parse(content),
            PlaylistFormat::Delimited => delimited::parse(content),
        }
    }
}

/// Reads a playlist file, picking the parser from its extension.
///
/// A missing or unreadable file is reported before the extension is looked
/// at, so a typo in the path is never mistaken for an unsupported format.
pub async fn read_playlist(path: impl AsRef<Path>) -> Result<Vec<TrackRef>, ParseError> {
    let path = path.as_ref();
    let io_error = |source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    };

    async_fs::metadata(path).await.map_err(io_error)?;
    let format = PlaylistFormat::from_path(path)?;
    parse_file(path, format).await
}

/// Reads `path` and parses it as `format`, regardless of its extension.
pub async fn parse_file(path: &Path, format: PlaylistFormat) -> Result<Vec<TrackRef>, ParseError> {
    let content = async_fs::read_to_string(path)
        .await
        .map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(format.parse(&content))
}

/// Splits once on `separator`, trimming both halves.
pub(crate) fn split_pair<'a>(text: &'a str, separator: &str) -> Option<(&'a str, &'a str)> {
    text.split_once(separator)
        .map(|(left, right)| (left.trim(), right.trim()))
}

/// Parses `Artist - Title`, or a bare title when there is no separator.
///
/// The separator is looked up before trimming, so ` - Title` has no artist.
pub(crate) fn artist_title(text: &str) -> Option<TrackRef> {
    let whole = text.trim();
    match split_pair(text, ARTIST_TITLE_SEPARATOR) {
        Some((artist, title)) => entry(artist, title, whole),
        None => entry("", whole, whole),
    }
}

/// Builds a reference; an empty title falls back to `whole` as title.
pub(crate) fn entry(artist: &str, title: &str, whole: &str) -> Option<TrackRef> {
    if !title.is_empty() {
        Some(TrackRef::new(artist, title))
    } else if !whole.is_empty() {
        Some(TrackRef::new("", whole))
    } else {
        None
    }
}
