//! Playlist to Spotify importer library
//!
//! Reads playlists written as extended M3U, plain text or semicolon separated
//! tables and reconciles them against a Spotify playlist: every entry is
//! searched in the catalog, optionally checked against the playlist content and
//! the resolved tracks are appended in batches.
//!
//! # Modules
//!
//! - `api` - HTTP handlers of the local OAuth callback server
//! - `cli` - Command-line workflow, exit codes and console reporting
//! - `config` - Configuration from environment variables and `.env`
//! - `error` - Error types of the parser, the remote boundary and the run
//! - `management` - Token cache handling
//! - `playlist` - Playlist file parsing
//! - `reconcile` - Matching parsed tracks against the catalog
//! - `server` - Local HTTP server for OAuth callbacks
//! - `spotify` - Spotify Web API client and the `Catalog` boundary trait
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use playlist2spotify::{playlist, reconcile::{Reconciler, RunOptions}};
//!
//! async fn import(
//!     catalog: &impl playlist2spotify::spotify::Catalog,
//! ) -> Result<(), Box<dyn std::error::Error>> {
//!     let tracks = playlist::read_playlist("mix.m3u").await?;
//!     let options = RunOptions::new("Road Trip", "mix.m3u");
//!     Reconciler::new(catalog).run(&tracks, &options).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod playlist;
pub mod reconcile;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Found {} tracks in playlist.", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Terminates the process with exit code 1 right after printing. Only the
/// command-line layer uses it; library code returns errors instead.
///
/// # Example
///
/// ```
/// error!("Playlist '{}' not found. Use --create-playlist to create it.", name);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for recoverable problems, most notably remote calls that failed and
/// are treated as "no result".
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
