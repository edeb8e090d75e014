//! Duplicate detection against a notebook's current source list.
//!
//! The remote application happily ingests the same page twice, so the
//! queue checks before submitting. Titles compare case- and
//! whitespace-insensitively; URLs compare after stripping tracking query
//! parameters, and YouTube URLs collapse to a canonical video-id form so
//! share links, shorts links, and watch links all match each other.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::repository::Source;

/// Query parameters that carry tracking state, not identity.
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "ref",
    "si",
];

/// YouTube video-id pattern in path-based URL forms.
#[allow(clippy::expect_used)]
static YOUTUBE_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:youtu\.be/|youtube\.com/(?:shorts/|embed/|live/))([A-Za-z0-9_-]{6,})")
        .expect("YouTube path regex is valid") // Static pattern, safe to panic
});

/// Normalizes a title for comparison: trim, collapse inner whitespace,
/// lowercase.
#[must_use]
pub fn normalize_title(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Extracts the canonical YouTube video id from any known URL form.
#[must_use]
pub fn youtube_video_id(url: &str) -> Option<String> {
    if let Some(caps) = YOUTUBE_PATH_RE.captures(url) {
        return caps.get(1).map(|m| m.as_str().to_string());
    }
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    if !host.ends_with("youtube.com") {
        return None;
    }
    parsed
        .query_pairs()
        .find(|(key, _)| key == "v")
        .map(|(_, value)| value.into_owned())
}

/// Normalizes a URL for duplicate comparison.
///
/// YouTube URLs collapse to `youtube:<video id>`; everything else keeps
/// scheme/host/path plus non-tracking query parameters, with the fragment
/// dropped and the trailing slash trimmed.
#[must_use]
pub fn normalize_url(url: &str) -> String {
    if let Some(video_id) = youtube_video_id(url) {
        return format!("youtube:{video_id}");
    }
    let Ok(parsed) = Url::parse(url) else {
        return url.trim().to_lowercase();
    };

    let host = parsed.host_str().unwrap_or_default().to_lowercase();
    let path = parsed.path().trim_end_matches('/');
    let mut kept: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| !TRACKING_PARAMS.contains(&key.as_ref()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    kept.sort();

    let query = if kept.is_empty() {
        String::new()
    } else {
        let joined: Vec<String> = kept.into_iter().map(|(k, v)| format!("{k}={v}")).collect();
        format!("?{}", joined.join("&"))
    };
    format!("{}://{host}{path}{query}", parsed.scheme())
}

/// Finds an existing source duplicating the candidate title/URL.
#[must_use]
pub fn find_duplicate<'a>(
    sources: &'a [Source],
    title: &str,
    url: Option<&str>,
) -> Option<&'a Source> {
    let wanted_title = normalize_title(title);
    let wanted_url = url.map(normalize_url);

    sources.iter().find(|source| {
        if !wanted_title.is_empty() && normalize_title(&source.title) == wanted_title {
            return true;
        }
        match (&wanted_url, &source.url) {
            (Some(wanted), Some(existing)) => &normalize_url(existing) == wanted,
            _ => false,
        }
    })
}
