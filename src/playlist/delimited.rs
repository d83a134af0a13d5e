//! Semicolon separated tables with a header row.
//!
//! ```text
//! Title;Artist
//! Yesterday;The Beatles
//! ```
//!
//! Artist and title are looked up under a fixed list of header names, the
//! first non-empty value wins. Rows without a title are left out.

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::types::TrackRef;

pub const ARTIST_COLUMNS: [&str; 3] = ["artist", "Artist", "ARTIST"];
pub const TITLE_COLUMNS: [&str; 7] = ["title", "Title", "TITLE", "track", "Track", "song", "Song"];

pub fn parse(content: &str) -> Vec<TrackRef> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let headers = match reader.headers() {
        Ok(headers) => headers.clone(),
        Err(_) => return Vec::new(),
    };
    let artist_columns = column_indices(&headers, &ARTIST_COLUMNS);
    let title_columns = column_indices(&headers, &TITLE_COLUMNS);

    reader
        .records()
        .filter_map(Result::ok)
        .filter_map(|record| {
            let title = first_value(&record, &title_columns)?;
            let artist = first_value(&record, &artist_columns).unwrap_or_default();
            Some(TrackRef::new(artist, title))
        })
        .collect()
}

/// Column index for each name present in `headers`, in priority order.
///
/// A repeated header name resolves to its last column.
fn column_indices(headers: &StringRecord, names: &[&str]) -> Vec<usize> {
    names
        .iter()
        .filter_map(|name| {
            headers
                .iter()
                .enumerate()
                .filter(|(_, header)| header == name)
                .map(|(idx, _)| idx)
                .last()
        })
        .collect()
}

fn first_value<'r>(record: &'r StringRecord, columns: &[usize]) -> Option<&'r str> {
    columns
        .iter()
        .filter_map(|&idx| record.get(idx))
        .map(str::trim)
        .find(|value| !value.is_empty())
}
