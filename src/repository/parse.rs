//! Structural scanning helpers for drift-tolerant response parsing.
//!
//! The remote schema is an implementation detail of the server, discovered
//! empirically and prone to drift. Every parser in this crate follows the
//! same layered strategy: try the known fixed index path first, then fall
//! back to a structural search over the nested arrays for values matching
//! an expected shape (UUID pattern, URL prefix, plausible code range), and
//! finally guess from contextual signals. Helpers here never panic and
//! never allocate beyond their results.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// UUID pattern as issued by the server (lowercase hex, hyphenated).
#[allow(clippy::expect_used)]
static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}")
        .expect("UUID regex is valid") // Static pattern, safe to panic
});

/// Whether the whole string is one server-issued UUID.
#[must_use]
pub fn looks_like_uuid(s: &str) -> bool {
    UUID_RE.find(s).is_some_and(|m| m.len() == s.len())
}

/// Finds the first UUID substring anywhere in raw text.
#[must_use]
pub fn first_uuid_in_text(text: &str) -> Option<&str> {
    UUID_RE.find(text).map(|m| m.as_str())
}

/// Walks a fixed index path into nested arrays.
#[must_use]
pub fn value_at<'a>(value: &'a Value, path: &[usize]) -> Option<&'a Value> {
    let mut current = value;
    for &idx in path {
        current = current.as_array()?.get(idx)?;
    }
    Some(current)
}

/// String at a fixed index path.
#[must_use]
pub fn str_at<'a>(value: &'a Value, path: &[usize]) -> Option<&'a str> {
    value_at(value, path)?.as_str()
}

/// Integer at a fixed index path.
#[must_use]
pub fn i64_at(value: &Value, path: &[usize]) -> Option<i64> {
    value_at(value, path)?.as_i64()
}

/// Depth-first search for the first string satisfying a predicate.
#[must_use]
pub fn find_string_where<'a>(
    value: &'a Value,
    pred: &dyn Fn(&str) -> bool,
) -> Option<&'a str> {
    match value {
        Value::String(s) if pred(s) => Some(s),
        Value::Array(items) => items.iter().find_map(|item| find_string_where(item, pred)),
        _ => None,
    }
}

/// Depth-first search for the first UUID-shaped string.
#[must_use]
pub fn find_uuid(value: &Value) -> Option<&str> {
    find_string_where(value, &looks_like_uuid)
}

/// Depth-first search for the first http(s) URL string.
#[must_use]
pub fn find_url(value: &Value) -> Option<&str> {
    find_string_where(value, &|s| s.starts_with("http://") || s.starts_with("https://"))
}

/// Depth-first search for the first integer in a plausible code range.
#[must_use]
pub fn find_code_in_range(value: &Value, range: std::ops::RangeInclusive<i64>) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().filter(|v| range.contains(v)),
        Value::Array(items) => items
            .iter()
            .find_map(|item| find_code_in_range(item, range.clone())),
        _ => None,
    }
}

/// Longest string found anywhere in the tree.
///
/// Last-resort extraction for endpoints whose only stable property is that
/// the payload of interest is by far the longest text in the response.
#[must_use]
pub fn find_longest_string(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s),
        Value::Array(items) => items
            .iter()
            .filter_map(find_longest_string)
            .max_by_key(|s| s.len()),
        _ => None,
    }
}

/// A standalone string plausible as a human title: not a UUID, not a URL,
/// not a bare number, and long enough to mean something.
#[must_use]
pub fn plausible_title(s: &str) -> bool {
    let trimmed = s.trim();
    trimmed.len() > 1
        && !looks_like_uuid(trimmed)
        && !trimmed.starts_with("http://")
        && !trimmed.starts_with("https://")
        && trimmed.parse::<f64>().is_err()
}

/// Derives a title from the last meaningful path segment of a URL.
#[must_use]
pub fn title_from_url(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed
        .path_segments()?
        .filter(|s| !s.is_empty())
        .next_back()?
        .to_string();
    if segment.is_empty() {
        return None;
    }
    let decoded = urlencoding::decode(&segment).ok()?.into_owned();
    Some(decoded.replace(['-', '_'], " "))
}
