//! URL construction helpers for index and launcher documents.

use url::{Position, Url};

use crate::error::IndexResult;

/// File names tried in the index directory when the configured URL is 404.
const ALTERNATE_INDEX_NAMES: &[&str] = &["index.json", "indexFile.json", ""];

/// Parse an index URL, assuming `https` when no scheme is given.
pub fn parse_index_url(raw: &str) -> IndexResult<Url> {
    let raw = raw.trim();
    match Url::parse(raw) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Ok(Url::parse(&format!("https://{}", raw.trim_start_matches('/')))?)
        }
        Err(e) => Err(e.into()),
    }
}

/// Candidate URLs for an index document, in the order they are tried.
///
/// The configured URL comes first, then `index.json`, `indexFile.json` and
/// the bare directory next to it. Duplicates are dropped.
pub fn build_index_candidates(index_url: &Url) -> Vec<Url> {
    let authority = &index_url[..Position::BeforePath];
    let path = index_url.path();
    let directory = path.rfind('/').map_or("/", |idx| &path[..=idx]);

    let mut out = vec![index_url.clone()];
    for name in ALTERNATE_INDEX_NAMES {
        let Ok(candidate) = Url::parse(&format!("{authority}{directory}{name}")) else {
            continue;
        };
        if !out.contains(&candidate) {
            out.push(candidate);
        }
    }
    out
}

/// Resolve the launcher's `indexFile` against the asset base.
///
/// Mirrors the launcher: plain concatenation when the base ends with `/`,
/// URL joining otherwise.
pub fn build_index_url(asset_base: &str, index_file: &str) -> IndexResult<Url> {
    let index_file = index_file.trim();
    if let Ok(absolute) = Url::parse(index_file) {
        return Ok(absolute);
    }
    if asset_base.ends_with('/') {
        return parse_index_url(&format!("{asset_base}{}", index_file.trim_start_matches('/')));
    }
    Ok(parse_index_url(asset_base)?.join(index_file)?)
}
