use std::path::PathBuf;

use clap::{
    CommandFactory, Parser,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use playlist2spotify::{cli, config, warning};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    /// Path to playlist file (M3U, TXT, or CSV)
    #[clap(required_unless_present = "completions")]
    playlist_file: Option<PathBuf>,

    /// Name of the Spotify playlist to add tracks to
    #[clap(required_unless_present = "completions")]
    playlist_name: Option<String>,

    /// Spotify Client ID
    #[clap(long, env = "SPOTIFY_CLIENT_ID", hide_env_values = true)]
    client_id: Option<String>,

    /// Spotify Client Secret
    #[clap(long, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
    client_secret: Option<String>,

    /// Create playlist if it doesn't exist
    #[clap(long)]
    create_playlist: bool,

    /// Skip tracks already in playlist
    #[clap(long)]
    skip_duplicates: bool,

    /// Show what would be added without adding
    #[clap(long)]
    dry_run: bool,

    /// Print shell completions and exit
    #[clap(long, value_name = "SHELL", exclusive = true)]
    completions: Option<Shell>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        warning!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    let (Some(playlist_file), Some(playlist_name)) = (cli.playlist_file, cli.playlist_name) else {
        Cli::command()
            .error(
                clap::error::ErrorKind::MissingRequiredArgument,
                "PLAYLIST_FILE and PLAYLIST_NAME are required",
            )
            .exit();
    };

    cli::import(cli::ImportArgs {
        playlist_file,
        playlist_name,
        client_id: cli.client_id,
        client_secret: cli.client_secret,
        create_playlist: cli.create_playlist,
        skip_duplicates: cli.skip_duplicates,
        dry_run: cli.dry_run,
    })
    .await
}
