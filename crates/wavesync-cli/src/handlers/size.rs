//! Declared and on-disk sizes.

use indicatif::HumanBytes;
use wavesync_core::InstallKind;

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Print the game size and the bytes already downloaded.
pub async fn execute(ctx: &CliContext, kind: InstallKind) -> Result<(), CliError> {
    let total = ctx.installer.game_size(kind).await;
    let downloaded = ctx.installer.downloaded_size(kind).await;

    println!("Game size:  {} ({total} bytes)", HumanBytes(total));
    println!("On disk:    {} ({downloaded} bytes)", HumanBytes(downloaded));
    println!(
        "Remaining:  {}",
        HumanBytes(total.saturating_sub(downloaded))
    );
    Ok(())
}
