//! Alternate URLs for a resource whose primary URL failed.
//!
//! Destinations arrive raw (spaces, `#`, non-ASCII, `/`-separated). Each
//! path segment is percent-encoded on its own; the separating `/` never is.

use url::{Position, Url};

/// Derives fallback candidates for asset downloads.
///
/// The resolver is built from a base URL (the CDN resource base, or the
/// index URL when no base is published). Candidate order:
///
/// 1. `<base without query, trailing slash trimmed>/<encoded destination>`
/// 2. `<scheme and authority of base><directory of base path>/<encoded destination>`
///
/// The primary URL itself is owned by the caller and is never repeated.
#[derive(Debug, Clone)]
pub struct FallbackResolver {
    base: Url,
}

impl FallbackResolver {
    /// Create a resolver around a base URL.
    #[must_use]
    pub const fn new(base: Url) -> Self {
        Self { base }
    }

    /// Parse the base URL and create a resolver.
    pub fn parse(base: &str) -> Result<Self, url::ParseError> {
        Url::parse(base).map(Self::new)
    }

    /// The base URL candidates are derived from.
    #[must_use]
    pub const fn base(&self) -> &Url {
        &self.base
    }

    /// Primary URL for a destination: the destination resolved against the
    /// directory of `index_url`.
    pub fn primary_url(index_url: &Url, destination: &str) -> Result<Url, url::ParseError> {
        index_url.join(destination.trim_start_matches('/'))
    }

    /// Percent-encode every path segment of a destination.
    ///
    /// Backslashes are treated as separators too, and empty segments are
    /// dropped.
    #[must_use]
    pub fn encode_destination(destination: &str) -> String {
        destination
            .split(['/', '\\'])
            .filter(|segment| !segment.is_empty())
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Ordered fallback candidates for `destination`.
    ///
    /// Candidates equal to `primary` or to an earlier candidate are skipped,
    /// as are candidates that fail to parse.
    #[must_use]
    pub fn candidates(&self, primary: &Url, destination: &str) -> Vec<Url> {
        let encoded = Self::encode_destination(destination);
        if encoded.is_empty() {
            return Vec::new();
        }

        let through_path = self.base[..Position::AfterPath].trim_end_matches('/');
        let authority = &self.base[..Position::BeforePath];
        let path = self.base.path();
        let directory = path.rfind('/').map_or("", |idx| &path[..idx]);

        let raw = [
            format!("{through_path}/{encoded}"),
            format!("{authority}{directory}/{encoded}"),
        ];

        let mut out: Vec<Url> = Vec::with_capacity(raw.len());
        for candidate in raw {
            let Ok(url) = Url::parse(&candidate) else {
                continue;
            };
            if &url == primary || out.contains(&url) {
                continue;
            }
            out.push(url);
        }
        out
    }
}
