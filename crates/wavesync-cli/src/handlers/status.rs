//! Installed vs. remote version.

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Print the install status.
pub async fn execute(ctx: &CliContext) -> Result<(), CliError> {
    let status = ctx.installer.status().await?;

    println!(
        "Installed: {}",
        status.installed_version.as_deref().unwrap_or("not installed")
    );
    println!(
        "Remote:    {}",
        status.remote_version.as_deref().unwrap_or("unavailable")
    );
    if status.update_available {
        println!("An update is available. Run `wavesync update`.");
    } else if status.is_installed && status.remote_version.is_some() {
        println!("Up to date.");
    }
    Ok(())
}
