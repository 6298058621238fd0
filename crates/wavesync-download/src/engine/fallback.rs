//! Primary-then-fallback fetching of one resource.

use std::path::Path;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;
use wavesync_core::{FallbackResolver, InstallError, InstallResult, ResourceEntry};

use super::{ChunkedDownloader, FetchError};

/// A successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    /// URL that finally served the resource.
    pub url: Url,
    /// Bytes written by the successful attempt.
    pub bytes_written: u64,
    /// Number of URLs tried, including the successful one.
    pub attempts: u32,
}

/// Fetch `entry` from `primary`, then from each fallback candidate.
///
/// Only HTTP-classified failures move on to the next URL. Cancellation and
/// local I/O errors end the walk at once. When every URL fails the error
/// names the destination and carries the last status code.
pub async fn fetch_with_fallback(
    downloader: &ChunkedDownloader,
    resolver: &FallbackResolver,
    primary: &Url,
    entry: &ResourceEntry,
    output: &Path,
    cancel: &CancellationToken,
    on_bytes: &mut (dyn FnMut(u64) + Send),
) -> InstallResult<FetchOutcome> {
    let candidates = std::iter::once(primary.clone())
        .chain(resolver.candidates(primary, &entry.destination));

    let mut attempts = 0u32;
    let mut last_error: Option<FetchError> = None;

    for url in candidates {
        if cancel.is_cancelled() {
            return Err(InstallError::Cancelled);
        }
        attempts += 1;
        if attempts > 1 {
            warn!(
                destination = %entry.destination,
                attempt = attempts,
                url = %url,
                "Trying fallback URL"
            );
        }

        match downloader
            .fetch(&url, &entry.chunks, output, cancel, on_bytes)
            .await
        {
            Ok(bytes_written) => {
                debug!(destination = %entry.destination, url = %url, attempts, "Fetched resource");
                return Ok(FetchOutcome {
                    url,
                    bytes_written,
                    attempts,
                });
            }
            Err(e) if e.is_cancelled() => return Err(InstallError::Cancelled),
            Err(e) if e.is_http_classified() => {
                warn!(destination = %entry.destination, url = %url, error = %e, "Fetch attempt failed");
                last_error = Some(e);
            }
            Err(FetchError::Io { source, .. }) => return Err(InstallError::from_io_error(&source)),
            Err(e) => return Err(InstallError::io("Other", e.to_string())),
        }
    }

    let status_code = match &last_error {
        Some(FetchError::Transport(e)) => e.status_code(),
        _ => None,
    };
    let message = last_error.map_or_else(|| "no candidate URLs".to_string(), |e| e.to_string());

    Err(InstallError::download_exhausted(
        entry.destination.clone(),
        attempts,
        status_code,
        message,
    ))
}
