//! JSON parsing for the resource index and the launcher document.
//!
//! Both documents are walked as `serde_json::Value` so that key casing and
//! number encoding can vary between CDNs.

use serde_json::{Map, Value};
use wavesync_core::{ChunkRange, ResourceEntry, ResourceManifest};

use crate::error::{IndexError, IndexResult};

// ============================================================================
// Lenient value helpers
// ============================================================================

/// Look up `key` in an object, ignoring ASCII case.
///
/// An exact match wins over a case-insensitive one.
fn get_ci<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).or_else(|| {
        object
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    })
}

/// Read an unsigned integer from a JSON number or a numeric string.
fn as_u64_lenient(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

// ============================================================================
// Resource index
// ============================================================================

/// Parse a resource index document.
///
/// The top level must be an object. A missing `resource` array yields an
/// empty manifest; elements that are not objects are skipped.
pub fn parse_resource_index(body: &[u8]) -> IndexResult<ResourceManifest> {
    let json: Value = serde_json::from_slice(body)?;

    let Some(root) = json.as_object() else {
        return Ok(ResourceManifest::default());
    };

    let entries = get_ci(root, "resource")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(parse_entry).collect())
        .unwrap_or_default();

    Ok(ResourceManifest::new(entries))
}

fn parse_entry(value: &Value) -> Option<ResourceEntry> {
    let object = value.as_object()?;

    let destination = get_ci(object, "dest").and_then(as_string).unwrap_or_default();
    let size = get_ci(object, "size").and_then(as_u64_lenient).unwrap_or(0);

    let mut entry = ResourceEntry::new(destination, size);
    if let Some(md5) = get_ci(object, "md5").and_then(as_string) {
        entry = entry.with_checksum(md5);
    }

    let chunks: Vec<ChunkRange> = get_ci(object, "chunkInfos")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(parse_chunk).collect())
        .unwrap_or_default();

    Some(entry.with_chunks(chunks))
}

fn parse_chunk(value: &Value) -> Option<ChunkRange> {
    let object = value.as_object()?;
    let start = get_ci(object, "start").and_then(as_u64_lenient)?;
    let end = get_ci(object, "end").and_then(as_u64_lenient)?;

    let chunk = ChunkRange::new(start, end);
    Some(match get_ci(object, "md5").and_then(as_string) {
        Some(md5) => chunk.with_checksum(md5),
        None => chunk,
    })
}

// ============================================================================
// Launcher document
// ============================================================================

/// The fields of the launcher document the installer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherDocument {
    /// Index file path relative to the asset base.
    pub index_file: String,
    /// Current version string.
    pub version: String,
    /// Resource base path, if published.
    pub base_url: Option<String>,
}

/// Parse the launcher document (`default.config.{indexFile,version,baseUrl}`).
pub fn parse_launcher_document(body: &[u8]) -> IndexResult<LauncherDocument> {
    let json: Value = serde_json::from_slice(body)?;

    let config = json
        .as_object()
        .and_then(|root| get_ci(root, "default"))
        .and_then(Value::as_object)
        .and_then(|default| get_ci(default, "config"))
        .and_then(Value::as_object)
        .ok_or_else(|| IndexError::MissingField {
            field: "default.config".to_string(),
        })?;

    let required = |key: &str| {
        get_ci(config, key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| IndexError::MissingField {
                field: format!("default.config.{key}"),
            })
    };

    let index_file = required("indexFile")?;
    let version = required("version")?;
    let base_url = required("baseUrl").ok();

    Ok(LauncherDocument {
        index_file,
        version,
        base_url,
    })
}
