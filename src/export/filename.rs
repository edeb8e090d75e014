//! Export filename construction.

use chrono::{DateTime, Utc};

/// Characters disallowed in filenames across platforms.
const FORBIDDEN: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Maximum length kept from a notebook title.
const MAX_TITLE_LEN: usize = 60;

/// Sanitizes a notebook title for use in a filename.
///
/// Forbidden characters become underscores, whitespace runs collapse to a
/// single underscore, and the result is truncated. An empty result
/// becomes `"notebook"`.
#[must_use]
pub fn sanitize_title(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| {
            if FORBIDDEN.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    let collapsed = cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    let truncated: String = collapsed.chars().take(MAX_TITLE_LEN).collect();
    let trimmed = truncated.trim_matches(['_', '.']).to_string();
    if trimmed.is_empty() {
        "notebook".to_string()
    } else {
        trimmed
    }
}

/// Builds an export filename: `<title>_<category>_<timestamp>.<ext>`.
#[must_use]
pub fn export_filename(
    title: &str,
    category: &str,
    extension: &str,
    timestamp: DateTime<Utc>,
) -> String {
    format!(
        "{}_{category}_{}.{extension}",
        sanitize_title(title),
        timestamp.format("%Y-%m-%d_%H%M%S"),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_sanitize_title_strips_forbidden_chars() {
        assert_eq!(sanitize_title("My: Notes / 2026?"), "My__Notes___2026");
        assert_eq!(sanitize_title("  spaced   out  "), "spaced_out");
    }

    #[test]
    fn test_sanitize_title_empty_falls_back() {
        assert_eq!(sanitize_title(""), "notebook");
        assert_eq!(sanitize_title("???"), "notebook");
    }

    #[test]
    fn test_sanitize_title_truncates() {
        let long = "x".repeat(200);
        assert_eq!(sanitize_title(&long).chars().count(), 60);
    }

    #[test]
    fn test_export_filename_shape() {
        let ts = Utc.with_ymd_and_hms(2026, 8, 6, 14, 30, 5).unwrap();
        assert_eq!(
            export_filename("Biology 101", "flashcards", "txt", ts),
            "Biology_101_flashcards_2026-08-06_143005.txt"
        );
    }
}
