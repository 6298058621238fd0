//! Streaming MD5 digests.
//!
//! Files are hashed through a fixed 64 KiB buffer and never loaded whole.
//! Comparison is case-insensitive because manifests mix hex casing.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use md5::{Digest, Md5};

/// Read buffer size used while hashing.
pub const DIGEST_BUFFER_SIZE: usize = 64 * 1024;

/// Compute the lowercase hex MD5 of a seekable stream.
///
/// The stream is rewound to its start first.
pub fn md5_hex<R: Read + Seek>(reader: &mut R) -> io::Result<String> {
    reader.seek(SeekFrom::Start(0))?;

    let mut hasher = Md5::new();
    let mut buffer = vec![0u8; DIGEST_BUFFER_SIZE];

    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Compute the MD5 of a file on a blocking worker thread.
pub async fn md5_file(path: &Path) -> io::Result<String> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let mut file = File::open(&path)?;
        md5_hex(&mut file)
    })
    .await
    .map_err(io::Error::other)?
}

/// Case-insensitive hex comparison, ignoring surrounding whitespace.
#[must_use]
pub fn checksums_match(actual: &str, expected: &str) -> bool {
    actual.trim().eq_ignore_ascii_case(expected.trim())
}
