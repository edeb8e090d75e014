//! Upload queue item types and status definitions.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Status of a queue item.
///
/// `pending -> processing -> {done | error}`; terminal states are never
/// re-entered automatically, only an explicit re-enqueue restarts an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    /// Waiting to be processed.
    Pending,
    /// Currently being submitted.
    Processing,
    /// Successfully submitted (including soft "accepted async" responses).
    Done,
    /// Failed, with an explanatory message on the item.
    Error,
}

impl UploadStatus {
    /// Returns the display string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Done => "done",
            Self::Error => "error",
        }
    }

    /// Whether the item has reached a terminal state.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the content was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadKind {
    /// A full page capture.
    Page,
    /// A text selection.
    Selection,
    /// A local file.
    File,
    /// A YouTube link.
    Youtube,
    /// A hand-written note.
    Note,
}

/// The captured payload to submit.
#[derive(Debug, Clone)]
pub enum UploadPayload {
    /// Plain text (page text, selection, note body).
    Text {
        /// The text content.
        text: String,
    },
    /// A link-based source (page URL, YouTube URL).
    Link {
        /// The URL to ingest.
        url: String,
    },
    /// A binary file.
    File {
        /// Filename, including extension.
        filename: String,
        /// MIME type.
        mime: String,
        /// Raw content.
        bytes: Vec<u8>,
    },
}

/// Local id allocator for queue items.
///
/// Queue items are the only entities the client issues identity for;
/// everything server-owned uses server-issued UUIDs.
static NEXT_ITEM_ID: AtomicU64 = AtomicU64::new(1);

/// A single item in the upload queue.
///
/// Mutated in place while processed; never persisted beyond the process
/// lifetime.
#[derive(Debug, Clone)]
pub struct UploadItem {
    /// Locally issued identifier.
    pub id: u64,
    /// How the content was captured.
    pub kind: UploadKind,
    /// Title the source will carry in the notebook.
    pub title: String,
    /// The content to submit.
    pub payload: UploadPayload,
    /// Current status.
    pub status: UploadStatus,
    /// Progress percentage (chunked items advance per chunk).
    pub progress: u8,
    /// 1-based chunk currently being submitted, for chunked items.
    pub chunk_index: Option<usize>,
    /// Total chunk count, for chunked items.
    pub total_chunks: Option<usize>,
    /// Explanatory message for terminal states.
    pub message: Option<String>,
}

impl UploadItem {
    /// Creates a pending item with a fresh local id.
    #[must_use]
    pub fn new(kind: UploadKind, title: impl Into<String>, payload: UploadPayload) -> Self {
        Self {
            id: NEXT_ITEM_ID.fetch_add(1, Ordering::Relaxed),
            kind,
            title: title.into(),
            payload,
            status: UploadStatus::Pending,
            progress: 0,
            chunk_index: None,
            total_chunks: None,
            message: None,
        }
    }

    /// The URL carried by link-based payloads.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match &self.payload {
            UploadPayload::Link { url } => Some(url),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_terminality() {
        assert!(!UploadStatus::Pending.is_terminal());
        assert!(!UploadStatus::Processing.is_terminal());
        assert!(UploadStatus::Done.is_terminal());
        assert!(UploadStatus::Error.is_terminal());
    }

    #[test]
    fn test_new_items_get_distinct_local_ids() {
        let a = UploadItem::new(
            UploadKind::Note,
            "A",
            UploadPayload::Text { text: "x".into() },
        );
        let b = UploadItem::new(
            UploadKind::Note,
            "B",
            UploadPayload::Text { text: "y".into() },
        );
        assert_ne!(a.id, b.id);
        assert_eq!(a.status, UploadStatus::Pending);
        assert_eq!(a.progress, 0);
    }

    #[test]
    fn test_url_accessor() {
        let link = UploadItem::new(
            UploadKind::Youtube,
            "Video",
            UploadPayload::Link {
                url: "https://youtu.be/abc".into(),
            },
        );
        assert_eq!(link.url(), Some("https://youtu.be/abc"));
        let text = UploadItem::new(
            UploadKind::Note,
            "Note",
            UploadPayload::Text { text: "t".into() },
        );
        assert_eq!(text.url(), None);
    }
}
