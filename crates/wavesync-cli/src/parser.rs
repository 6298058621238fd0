//! Main CLI parser and top-level argument handling.

use std::path::PathBuf;

use clap::Parser;

use crate::commands::Commands;

/// Resumable, verified game installer.
#[derive(Parser, Debug)]
#[command(name = "wavesync")]
#[command(about = "Install, update and preload game assets from a resource index")]
#[command(version)]
pub struct Cli {
    /// Install root
    #[arg(long = "install-dir", env = "WAVESYNC_INSTALL_DIR", global = true)]
    pub install_dir: Option<PathBuf>,

    /// Launcher document URL (source of the index URL and version)
    #[arg(long = "launcher-url", env = "WAVESYNC_LAUNCHER_URL", global = true)]
    pub launcher_url: Option<String>,

    /// Resource index URL; bypasses the launcher document
    #[arg(
        long = "index-url",
        env = "WAVESYNC_INDEX_URL",
        global = true,
        conflicts_with = "launcher_url"
    )]
    pub index_url: Option<String>,

    /// Version recorded after a run when `--index-url` is used
    #[arg(long = "game-version", env = "WAVESYNC_VERSION", global = true)]
    pub game_version: Option<String>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}
