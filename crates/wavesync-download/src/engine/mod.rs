//! Chunked download engine.
//!
//! One resource at a time is streamed into `<output>.tmp` and then
//! published over `<output>`. Whole-file mode issues a single GET; chunked
//! mode issues one `Range` request per chunk, in order, appending to the
//! same temporary file. A range request answered with anything but 206
//! counts as a failed status. The engine never retries; a failed status
//! aborts the resource and the caller decides whether to try another URL.
//!
//! A previous `.tmp` is truncated, never resumed.

mod fallback;
pub(crate) mod paths;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;
use wavesync_core::{
    ByteRange, ChunkRange, DIGEST_BUFFER_SIZE, HttpTransport, ResponseBody, TransportError,
    TransportRequest,
};

pub use fallback::{FetchOutcome, fetch_with_fallback};
pub use paths::{TEMP_SUFFIX, temp_path};

const PARTIAL_CONTENT: u16 = 206;

/// Errors from a single fetch attempt.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The transport failed (status, network).
    #[error(transparent)]
    Transport(TransportError),

    /// Local file I/O failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File being written.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The cancellation token fired.
    #[error("download cancelled")]
    Cancelled,
}

impl FetchError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Whether this failure may be retried against another URL.
    pub const fn is_http_classified(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_http_classified(),
            Self::Io { .. } | Self::Cancelled => false,
        }
    }

    /// Whether the cancellation token fired.
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Transport(TransportError::Cancelled))
    }
}

impl From<TransportError> for FetchError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Cancelled => Self::Cancelled,
            other => Self::Transport(other),
        }
    }
}

/// Streams resources to disk through an [`HttpTransport`].
#[derive(Clone)]
pub struct ChunkedDownloader {
    transport: Arc<dyn HttpTransport>,
    buffer_size: usize,
}

impl ChunkedDownloader {
    /// Create a downloader with the default 64 KiB write buffer.
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            buffer_size: DIGEST_BUFFER_SIZE,
        }
    }

    /// Set the write buffer size.
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Download `url` into `output`.
    ///
    /// With no `chunks` the resource is fetched in one GET; otherwise each
    /// chunk is requested with its inclusive range and appended in order.
    /// `on_bytes` is called after every write with the number of bytes
    /// written. Returns the total bytes written.
    pub async fn fetch(
        &self,
        url: &Url,
        chunks: &[ChunkRange],
        output: &Path,
        cancel: &CancellationToken,
        on_bytes: &mut (dyn FnMut(u64) + Send),
    ) -> Result<u64, FetchError> {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        let temp = temp_path(output);
        paths::ensure_parent(output)
            .await
            .map_err(|e| FetchError::io(output, e))?;
        paths::remove_if_exists(&temp)
            .await
            .map_err(|e| FetchError::io(&temp, e))?;

        let file = tokio::fs::File::create(&temp)
            .await
            .map_err(|e| FetchError::io(&temp, e))?;
        let mut writer = BufWriter::with_capacity(self.buffer_size, file);

        let requests: Vec<TransportRequest> = if chunks.is_empty() {
            vec![TransportRequest::get(url.clone())]
        } else {
            chunks
                .iter()
                .map(|chunk| TransportRequest::get(url.clone()).with_range(ByteRange::from(chunk)))
                .collect()
        };

        let mut written = 0u64;
        for request in requests {
            if cancel.is_cancelled() {
                return Err(FetchError::Cancelled);
            }
            let ranged = request.range.is_some();
            if let Some(range) = request.range {
                debug!(url = %url, range = %range.header_value(), "Requesting chunk");
            }

            let body = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(FetchError::Cancelled),
                result = self.transport.get(request) => result?,
            };
            // A server that ignores Range would append the whole file per chunk.
            if ranged && body.status() != PARTIAL_CONTENT {
                return Err(FetchError::Transport(TransportError::status(
                    body.status(),
                    url.as_str(),
                )));
            }

            written += copy_body(body, &mut writer, &temp, cancel, on_bytes).await?;
        }

        writer.flush().await.map_err(|e| FetchError::io(&temp, e))?;
        writer
            .into_inner()
            .sync_all()
            .await
            .map_err(|e| FetchError::io(&temp, e))?;

        paths::publish(&temp, output)
            .await
            .map_err(|e| FetchError::io(output, e))?;

        debug!(url = %url, path = %output.display(), bytes = written, "Published download");
        Ok(written)
    }
}

async fn copy_body(
    mut body: Box<dyn ResponseBody>,
    writer: &mut BufWriter<tokio::fs::File>,
    temp: &Path,
    cancel: &CancellationToken,
    on_bytes: &mut (dyn FnMut(u64) + Send),
) -> Result<u64, FetchError> {
    let mut written = 0u64;
    loop {
        let next = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(FetchError::Cancelled),
            next = body.chunk() => next?,
        };

        let Some(bytes) = next else {
            return Ok(written);
        };
        if bytes.is_empty() {
            continue;
        }

        writer
            .write_all(&bytes)
            .await
            .map_err(|e| FetchError::io(temp, e))?;
        let n = bytes.len() as u64;
        written += n;
        on_bytes(n);
    }
}
