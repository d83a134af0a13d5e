//! # CLI Module
//!
//! Command-line layer of the importer. It resolves credentials, reads the
//! playlist file, connects to Spotify and hands over to the
//! [`crate::reconcile`] module, translating every fatal outcome into a red
//! error line and exit code 1.
//!
//! ```text
//! credentials → playlist file → Spotify session → target playlist
//!     → track search → append (or dry-run report)
//! ```
//!
//! ## Usage
//!
//! ```bash
//! playlist2spotify mix.m3u "Road Trip" --create-playlist
//! playlist2spotify favourites.txt "Favourites" --skip-duplicates --dry-run
//! playlist2spotify export.csv "Imported" --client-id ID --client-secret SECRET
//! ```

mod import;

pub use import::ImportArgs;
pub use import::import;
