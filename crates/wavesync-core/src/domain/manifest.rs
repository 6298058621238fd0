//! Resource manifest types.
//!
//! A manifest is the remote description of every file an install target is
//! made of. These are plain value types; parsing lives in `wavesync-index`.

use serde::{Deserialize, Serialize};

/// Root document for an install target.
///
/// Entries keep declaration order. Duplicate destinations are allowed and
/// are processed in order, so the last one wins on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceManifest {
    /// Entries in declaration order.
    pub entries: Vec<ResourceEntry>,
}

impl ResourceManifest {
    /// Create a manifest from a list of entries.
    #[must_use]
    pub const fn new(entries: Vec<ResourceEntry>) -> Self {
        Self { entries }
    }

    /// Whether the manifest declares no entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of declared entries, including those without a destination.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries that can actually be installed (non-empty destination).
    pub fn installable(&self) -> impl Iterator<Item = &ResourceEntry> {
        self.entries.iter().filter(|e| e.has_destination())
    }

    /// Sum of all declared entry sizes, saturating instead of overflowing.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.entries
            .iter()
            .fold(0u64, |acc, e| acc.saturating_add(e.size))
    }
}

/// One installable artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEntry {
    /// Path relative to the install root, `/`-separated as published.
    pub destination: String,
    /// Declared size in bytes; zero means unknown.
    pub size: u64,
    /// Declared MD5 as a hex string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    /// Byte ranges to fetch in order. Empty means a single whole-file GET.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chunks: Vec<ChunkRange>,
}

impl ResourceEntry {
    /// Create an entry with a destination and a size.
    pub fn new(destination: impl Into<String>, size: u64) -> Self {
        Self {
            destination: destination.into(),
            size,
            checksum: None,
            chunks: Vec::new(),
        }
    }

    /// Attach a declared checksum.
    #[must_use]
    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = Some(checksum.into());
        self
    }

    /// Attach chunk ranges.
    #[must_use]
    pub fn with_chunks(mut self, chunks: Vec<ChunkRange>) -> Self {
        self.chunks = chunks;
        self
    }

    /// Entries with an empty destination are skipped everywhere.
    #[must_use]
    pub fn has_destination(&self) -> bool {
        !self.destination.trim().is_empty()
    }

    /// Declared size, if known.
    #[must_use]
    pub const fn known_size(&self) -> Option<u64> {
        if self.size > 0 { Some(self.size) } else { None }
    }

    /// Declared checksum, if present and non-blank.
    #[must_use]
    pub fn declared_checksum(&self) -> Option<&str> {
        self.checksum
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// Whether this entry is fetched with HTTP range requests.
    #[must_use]
    pub fn is_chunked(&self) -> bool {
        !self.chunks.is_empty()
    }
}

/// A byte range of an entry, fetched with one HTTP range request.
///
/// The per-chunk checksum is carried but never verified; only the whole-file
/// checksum gates acceptance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRange {
    /// First byte offset.
    pub start: u64,
    /// Last byte offset, inclusive.
    pub end: u64,
    /// Declared MD5 of this chunk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl ChunkRange {
    /// Create a chunk covering `start..=end`.
    #[must_use]
    pub const fn new(start: u64, end: u64) -> Self {
        Self {
            start,
            end,
            checksum: None,
        }
    }

    /// Attach the declared chunk checksum.
    #[must_use]
    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = Some(checksum.into());
        self
    }

    /// Number of bytes covered, zero for an inverted range.
    #[must_use]
    pub const fn len(&self) -> u64 {
        if self.end < self.start {
            0
        } else {
            self.end - self.start + 1
        }
    }

    /// Whether the range covers no bytes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
