//! CLI entry point - the composition root.

use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;
use wavesync_cli::{Cli, CliConfig, CliError, Commands, bootstrap, handlers};
use wavesync_core::InstallKind;

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = if verbose {
        EnvFilter::new(default)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = bootstrap(CliConfig::from_cli(&cli))?;

    let cancel = ctx.cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("Cancelling...");
            cancel.cancel();
        }
    });

    match cli.command {
        Commands::Install => handlers::install::execute(&ctx, InstallKind::Install).await?,
        Commands::Update => handlers::install::execute(&ctx, InstallKind::Update).await?,
        Commands::Preload => handlers::install::execute(&ctx, InstallKind::Preload).await?,
        Commands::Status => handlers::status::execute(&ctx).await?,
        Commands::Size { kind } => handlers::size::execute(&ctx, kind.into()).await?,
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables before clap reads its env fallbacks
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            if code == CliError::Cancelled.exit_code() {
                eprintln!("Cancelled. Run the same command again to resume.");
            } else {
                error!(error = %e, "Command failed");
                eprintln!("Error: {e:#}");
            }
            ExitCode::from(code)
        }
    }
}
