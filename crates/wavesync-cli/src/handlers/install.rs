//! Install, update and preload.

use tracing::info;
use wavesync_core::{ChannelSink, InstallKind};

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::presentation::InstallProgressPrinter;
use crate::presentation::progress::describe;

/// Run one install pass, rendering events as they arrive.
pub async fn execute(ctx: &CliContext, kind: InstallKind) -> Result<(), CliError> {
    let (sink, mut events) = ChannelSink::channel();

    let render = tokio::spawn(async move {
        let mut printer = InstallProgressPrinter::new(kind);
        while let Some(event) = events.recv().await {
            printer.handle(&event);
        }
        printer.finish();
    });

    let result = ctx.installer.run(kind, &sink, &ctx.cancel).await;

    // Closing the channel ends the render task.
    drop(sink);
    if let Err(e) = render.await {
        tracing::warn!(error = %e, "Progress renderer stopped");
    }

    let progress = result?;
    info!(%kind, "Finished");
    println!("✓ {kind} complete: {}", describe(&progress));
    Ok(())
}
