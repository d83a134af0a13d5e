//! Reconciliation of parsed playlist entries against the Spotify catalog.
//!
//! The [`Reconciler`] wraps a [`Catalog`] session and offers the individual
//! operations (search, playlist lookup and creation, membership check and
//! batched append) plus [`Reconciler::run`], which drives them for a whole
//! playlist file:
//!
//! 1. Resolve the target playlist, creating it when requested
//! 2. Search every entry in file order, collecting matches and misses
//! 3. Print a summary of found and missing entries
//! 4. Append the matches, or only report them on a dry run
//!
//! Remote failures of read operations are logged and treated as "no result".
//! Only the playlist resolution and the final append can fail the run.

use std::{collections::HashSet, path::Path};

use colored::Colorize;
use futures::{StreamExt, pin_mut};
use tabled::Table;

use crate::{
    error::RunError,
    info,
    spotify::{Catalog, paging::paginate},
    success,
    types::{NotFoundTableRow, PlaylistHandle, ResolvedTrack, TrackRef, track_uri},
    utils, warning,
};

/// Maximum number of tracks the service accepts per append call.
pub const APPEND_BATCH_SIZE: usize = 100;

/// Only the best match of a search is considered.
pub const SEARCH_LIMIT: u32 = 1;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub playlist_name: String,
    /// File name of the imported playlist, used in the description of created playlists.
    pub source_name: String,
    pub create_playlist: bool,
    pub skip_duplicates: bool,
    pub dry_run: bool,
}

impl RunOptions {
    pub fn new(playlist_name: impl Into<String>, source: impl AsRef<Path>) -> Self {
        let source = source.as_ref();
        RunOptions {
            playlist_name: playlist_name.into(),
            source_name: source
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| source.display().to_string()),
            create_playlist: false,
            skip_duplicates: false,
            dry_run: false,
        }
    }

    pub fn description(&self) -> String {
        format!("Imported from {}", self.source_name)
    }
}

/// What a run ended with.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Outcome {
    #[default]
    NothingToAdd,
    DryRun {
        would_add: usize,
    },
    Appended {
        added: usize,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Report {
    pub playlist: Option<PlaylistHandle>,
    /// Matches to append, in file order.
    pub found: Vec<ResolvedTrack>,
    pub not_found: Vec<TrackRef>,
    /// Matches left out because the playlist already holds them.
    pub skipped: Vec<ResolvedTrack>,
    pub outcome: Outcome,
}

impl Report {
    pub fn found_ids(&self) -> Vec<String> {
        self.found.iter().map(|t| t.id.clone()).collect()
    }
}

pub struct Reconciler<'a, C: Catalog + ?Sized> {
    catalog: &'a C,
}

impl<'a, C: Catalog + ?Sized> Reconciler<'a, C> {
    pub fn new(catalog: &'a C) -> Self {
        Reconciler { catalog }
    }

    /// Returns the id of the best catalog match for the entry.
    ///
    /// The artist only constrains the query when it is known.
    pub async fn search_track(&self, artist: &str, title: &str) -> Option<String> {
        let query = utils::build_track_query(artist, title);

        match self.catalog.search_track_ids(&query, SEARCH_LIMIT).await {
            Ok(ids) => ids.into_iter().next(),
            Err(e) => {
                warning!("Error searching for '{}' by '{}': {}", title, artist, e);
                None
            }
        }
    }

    /// Looks up one of the user's playlists by name, ignoring case.
    pub async fn find_playlist(&self, name: &str) -> Option<String> {
        let wanted = name.to_lowercase();
        let catalog = self.catalog;
        let pages = paginate(move |cursor| catalog.playlists_page(cursor));
        pin_mut!(pages);

        while let Some(page) = pages.next().await {
            match page {
                Ok(playlists) => {
                    if let Some(playlist) = playlists.into_iter().find(|p| p.name.to_lowercase() == wanted) {
                        return Some(playlist.id);
                    }
                }
                Err(e) => {
                    warning!("Error finding playlist '{}': {}", name, e);
                    return None;
                }
            }
        }

        None
    }

    /// Creates a private playlist owned by the current user.
    pub async fn create_playlist(&self, name: &str, description: &str) -> Option<String> {
        let created = match self.catalog.current_user_id().await {
            Ok(user_id) => {
                self.catalog
                    .create_playlist(&user_id, name, false, description)
                    .await
            }
            Err(e) => Err(e),
        };

        match created {
            Ok(playlist) => Some(playlist.id),
            Err(e) => {
                warning!("Error creating playlist '{}': {}", name, e);
                None
            }
        }
    }

    /// Appends `ids` in order, [`APPEND_BATCH_SIZE`] tracks per call.
    ///
    /// Stops at the first failing batch; batches sent before stay applied.
    pub async fn add_tracks_to_playlist(&self, playlist_id: &str, ids: &[String]) -> bool {
        for (idx, batch) in ids.chunks(APPEND_BATCH_SIZE).enumerate() {
            let uris: Vec<String> = batch.iter().map(|id| track_uri(id)).collect();
            if let Err(e) = self.catalog.append_tracks(playlist_id, &uris).await {
                warning!(
                    "Error adding tracks to playlist (batch {} of {}): {}",
                    idx + 1,
                    ids.len().div_ceil(APPEND_BATCH_SIZE),
                    e
                );
                return false;
            }
        }

        true
    }

    /// Whether the playlist already contains the track, scanning page by page.
    pub async fn is_track_in_playlist(&self, playlist_id: &str, id: &str) -> bool {
        let catalog = self.catalog;
        let pages = paginate(move |cursor| catalog.playlist_track_ids_page(playlist_id, cursor));
        pin_mut!(pages);

        while let Some(page) = pages.next().await {
            match page {
                Ok(ids) => {
                    if ids.iter().flatten().any(|existing| existing == id) {
                        return true;
                    }
                }
                Err(e) => {
                    warning!("Error checking track in playlist: {}", e);
                    return false;
                }
            }
        }

        false
    }

    /// Finds the target playlist, creating it when allowed.
    pub async fn resolve_playlist(&self, options: &RunOptions) -> Result<PlaylistHandle, RunError> {
        let name = &options.playlist_name;

        let pb = utils::spinner(&format!("Looking up playlist '{}'...", name));
        let existing = self.find_playlist(name).await;
        pb.finish_and_clear();

        if let Some(id) = existing {
            success!("Found playlist '{}'", name);
            return Ok(PlaylistHandle {
                id,
                name: name.clone(),
            });
        }

        if !options.create_playlist {
            return Err(RunError::PlaylistNotFound(name.clone()));
        }

        info!("Playlist '{}' not found. Creating new playlist...", name);
        match self.create_playlist(name, &options.description()).await {
            Some(id) => {
                success!("Created playlist '{}'", name);
                Ok(PlaylistHandle {
                    id,
                    name: name.clone(),
                })
            }
            None => Err(RunError::PlaylistCreateFailed(name.clone())),
        }
    }

    /// Imports `tracks` into the playlist described by `options`.
    ///
    /// Entries are searched one after another in file order. With
    /// `skip_duplicates` a match is left out when the playlist already holds
    /// it or when it was matched earlier in the same run.
    pub async fn run(&self, tracks: &[TrackRef], options: &RunOptions) -> Result<Report, RunError> {
        if tracks.is_empty() {
            return Err(RunError::EmptyPlaylist);
        }

        let playlist = self.resolve_playlist(options).await?;
        let mut report = Report::default();
        let mut collected: HashSet<String> = HashSet::new();

        info!("Searching for tracks on Spotify...");
        let total = tracks.len();
        for (idx, track) in tracks.iter().enumerate() {
            info!(
                "[{}/{}] Searching: {} - {}",
                idx + 1,
                total,
                track.artist,
                track.title
            );

            let Some(id) = self.search_track(&track.artist, &track.title).await else {
                println!("    → {}", "Not found".red());
                report.not_found.push(track.clone());
                continue;
            };

            let resolved = ResolvedTrack {
                reference: track.clone(),
                id,
            };

            if options.skip_duplicates
                && (collected.contains(&resolved.id)
                    || self.is_track_in_playlist(&playlist.id, &resolved.id).await)
            {
                println!("    → {}", "Already in playlist, skipping".yellow());
                report.skipped.push(resolved);
                continue;
            }

            println!("    → {}", "Found".green());
            collected.insert(resolved.id.clone());
            report.found.push(resolved);
        }

        print_summary(&report, options.skip_duplicates);

        let count = report.found.len();
        report.outcome = if count == 0 {
            info!("No tracks to add.");
            Outcome::NothingToAdd
        } else if options.dry_run {
            info!(
                "Dry run: would add {} tracks to playlist '{}'.",
                count, playlist.name
            );
            Outcome::DryRun { would_add: count }
        } else {
            info!("Adding {} tracks to playlist '{}'...", count, playlist.name);
            if !self
                .add_tracks_to_playlist(&playlist.id, &report.found_ids())
                .await
            {
                return Err(RunError::AppendFailed(playlist.name));
            }
            Outcome::Appended { added: count }
        };

        report.playlist = Some(playlist);
        Ok(report)
    }
}

fn print_summary(report: &Report, skip_duplicates: bool) {
    info!("Results:");
    println!("    Found: {} tracks", report.found.len());
    println!("    Not found: {} tracks", report.not_found.len());
    if skip_duplicates {
        println!("    Already in playlist: {} tracks", report.skipped.len());
    }

    if !report.not_found.is_empty() {
        warning!("Tracks not found:");
        let rows: Vec<NotFoundTableRow> = report.not_found.iter().map(NotFoundTableRow::from).collect();
        println!("{}", Table::new(rows));
    }
}
