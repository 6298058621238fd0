//! Subcommands.

use clap::{Subcommand, ValueEnum};
use wavesync_core::InstallKind;

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download every missing or invalid file
    Install,

    /// Bring an existing install to the remote version
    Update,

    /// Pre-download the advertised version
    Preload,

    /// Show installed and remote versions
    Status,

    /// Show the declared game size and bytes already on disk
    Size {
        /// Which run the sizes are computed for
        #[arg(long, value_enum, default_value_t = KindArg::Install)]
        kind: KindArg,
    },
}

/// Command-line spelling of [`InstallKind`].
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum KindArg {
    Install,
    Update,
    Preload,
}

impl From<KindArg> for InstallKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Install => Self::Install,
            KindArg::Update => Self::Update,
            KindArg::Preload => Self::Preload,
        }
    }
}
