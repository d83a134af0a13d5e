use std::path::PathBuf;

use crate::{
    config::Credentials,
    error, info, playlist,
    reconcile::{Outcome, Reconciler, RunOptions},
    spotify, success,
};

/// Everything the import command was invoked with.
#[derive(Debug, Clone)]
pub struct ImportArgs {
    pub playlist_file: PathBuf,
    pub playlist_name: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub create_playlist: bool,
    pub skip_duplicates: bool,
    pub dry_run: bool,
}

impl ImportArgs {
    fn run_options(&self) -> RunOptions {
        RunOptions {
            create_playlist: self.create_playlist,
            skip_duplicates: self.skip_duplicates,
            dry_run: self.dry_run,
            ..RunOptions::new(self.playlist_name.clone(), &self.playlist_file)
        }
    }
}

/// Imports a playlist file into a Spotify playlist.
///
/// Every fatal condition ends the process with exit code 1: missing
/// credentials, an unreadable or unsupported file, a file without tracks, a
/// failed authorization, a missing target playlist and a failed append.
pub async fn import(args: ImportArgs) {
    let credentials = match Credentials::resolve(args.client_id.clone(), args.client_secret.clone()) {
        Ok(credentials) => credentials,
        Err(e) => error!("{}", e),
    };

    let tracks = match playlist::read_playlist(&args.playlist_file).await {
        Ok(tracks) => tracks,
        Err(e) => error!("{}", e),
    };

    if tracks.is_empty() {
        error!("No tracks found in playlist file.");
    }
    info!("Found {} tracks in playlist.", tracks.len());

    let session = match spotify::connect(&credentials).await {
        Ok(session) => session,
        Err(e) => error!("Error initializing Spotify connection: {}", e),
    };

    let options = args.run_options();
    match Reconciler::new(&session).run(&tracks, &options).await {
        Ok(report) => {
            if let Outcome::Appended { added } = report.outcome {
                success!(
                    "Successfully added {} tracks to playlist '{}'!",
                    added,
                    options.playlist_name
                );
            }
        }
        Err(e) => error!("{}", e),
    }
}
