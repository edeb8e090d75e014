//! Domain types for notebooks, sources, artifacts, and extracted content.
//!
//! Numeric type codes and status values come from the remote schema and are
//! only partially understood; both mappings are static tables so new
//! observations extend data, not control flow.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A notebook as listed by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notebook {
    /// Server-assigned UUID. The client never generates these.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Full notebook metadata including its source list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotebookDetail {
    /// Server-assigned UUID.
    pub id: String,
    /// Notebook title.
    pub title: String,
    /// Sources currently in the notebook.
    pub sources: Vec<Source>,
}

/// Human-meaningful source type resolved from the server's opaque code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Pasted or captured text.
    Text,
    /// Uploaded PDF document.
    Pdf,
    /// Web page URL.
    Url,
    /// YouTube video link.
    Youtube,
    /// Drive-hosted document.
    Gdrive,
    /// Image upload.
    Image,
    /// Video upload.
    Video,
    /// In-app authored note promoted to a source.
    Note,
    /// Mindmap promoted to a source.
    Mindmap,
    /// Slide deck.
    Slides,
    /// Code not present in the table.
    Unknown,
}

/// Observed server type codes for sources.
///
/// Captured empirically; codes outside the table resolve to
/// [`SourceKind::Unknown`].
pub const SOURCE_KIND_TABLE: &[(i64, SourceKind)] = &[
    (1, SourceKind::Gdrive),
    (2, SourceKind::Slides),
    (3, SourceKind::Pdf),
    (4, SourceKind::Text),
    (5, SourceKind::Url),
    (6, SourceKind::Youtube),
    (7, SourceKind::Image),
    (8, SourceKind::Video),
    (9, SourceKind::Note),
    (10, SourceKind::Mindmap),
];

impl SourceKind {
    /// Resolves a server type code through the lookup table.
    #[must_use]
    pub fn from_code(code: i64) -> Self {
        SOURCE_KIND_TABLE
            .iter()
            .find(|(c, _)| *c == code)
            .map_or(Self::Unknown, |(_, kind)| *kind)
    }

    /// Best-effort inference from a URL when no explicit type code exists.
    #[must_use]
    pub fn infer_from_url(url: &str) -> Self {
        let lower = url.to_ascii_lowercase();
        if lower.contains("youtube.com/") || lower.contains("youtu.be/") {
            Self::Youtube
        } else if lower.ends_with(".pdf") {
            Self::Pdf
        } else if lower.contains("docs.google.com") || lower.contains("drive.google.com") {
            Self::Gdrive
        } else {
            Self::Url
        }
    }
}

/// Processing status of a source or artifact.
///
/// The server's semantics for these small integers are only partially
/// reverse-engineered (observed values 0-4). Unknown values are treated
/// permissively as ready rather than blocking the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    /// Status 0: not set by the server; treated as eligible/ready.
    Unspecified,
    /// Queued, not yet processing.
    Pending,
    /// Server-side processing in progress.
    Processing,
    /// Processing finished.
    Ready,
    /// Server-side processing failed.
    Error,
}

impl ResourceStatus {
    /// Resolves a raw status integer, permissively.
    #[must_use]
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Unspecified,
            1 => Self::Pending,
            2 => Self::Processing,
            3 => Self::Ready,
            4 => Self::Error,
            other => {
                debug!(code = other, "unknown status code, assuming ready");
                Self::Ready
            }
        }
    }

    /// Whether dependent content is worth fetching for this status.
    #[must_use]
    pub fn is_fetchable(self) -> bool {
        matches!(self, Self::Unspecified | Self::Ready)
    }
}

/// A user-supplied unit of content inside a notebook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    /// Server-assigned UUID.
    pub id: String,
    /// Display title (may be inferred when the server omits one).
    pub title: String,
    /// Raw server type code.
    pub type_code: i64,
    /// Resolved type.
    pub kind: SourceKind,
    /// Original URL for link-based sources.
    pub url: Option<String>,
    /// Processing status.
    pub status: ResourceStatus,
}

/// Kind of generated artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Generated report / study guide document.
    Report,
    /// Audio overview.
    Audio,
    /// Video overview.
    Video,
    /// Flashcard set (type code 4, variant 1).
    Flashcards,
    /// Quiz (type code 4, variant 2).
    Quiz,
    /// Slide deck.
    Slides,
    /// Data table.
    Table,
    /// Mindmap.
    Mindmap,
    /// Infographic image.
    Infographic,
    /// Code/variant combination not in the table.
    Unknown,
}

impl ArtifactKind {
    /// Resolves an artifact type code plus optional variant.
    ///
    /// Type code 4 is ambiguous upstream and disambiguated by a nested
    /// variant field (1 = flashcards, 2 = quiz). That is a quirk of the
    /// remote schema, preserved as-is.
    #[must_use]
    pub fn from_codes(type_code: i64, variant: Option<i64>) -> Self {
        match (type_code, variant) {
            (1, _) => Self::Report,
            (2, _) => Self::Audio,
            (3, _) => Self::Video,
            (4, Some(1)) => Self::Flashcards,
            (4, Some(2)) => Self::Quiz,
            (4, _) => Self::Unknown,
            (5, _) => Self::Slides,
            (6, _) => Self::Table,
            (7, _) => Self::Mindmap,
            (8, _) => Self::Infographic,
            _ => Self::Unknown,
        }
    }

    /// Whether this artifact's content lives behind a separate content call.
    #[must_use]
    pub fn has_interactive_content(self) -> bool {
        matches!(self, Self::Report | Self::Flashcards | Self::Quiz | Self::Table)
    }
}

/// A generated deliverable inside a notebook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    /// Server-assigned UUID.
    pub id: String,
    /// Raw server type code.
    pub type_code: i64,
    /// Variant disambiguator for ambiguous type codes.
    pub variant: Option<i64>,
    /// Display title.
    pub title: String,
    /// Processing status.
    pub status: ResourceStatus,
    /// Resolved kind.
    pub kind: ArtifactKind,
}

/// Who produced a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    /// The user.
    User,
    /// The application's assistant.
    Assistant,
    /// A date separator row reconstructed from the transcript.
    Date,
}

/// One message of a chat transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message author.
    pub role: ChatRole,
    /// Message text.
    pub content: String,
    /// Timestamp when the server provided one.
    pub timestamp: Option<String>,
}

/// One flashcard of a generated set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    /// Question side.
    pub front: String,
    /// Answer side.
    pub back: String,
    /// Optional tag list.
    pub tags: Vec<String>,
}

/// One question of a generated quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    /// Question text.
    pub question: String,
    /// Answer options in display order.
    pub options: Vec<String>,
    /// Index of the correct option, when known.
    pub answer_index: Option<usize>,
    /// Explanation text, when provided.
    pub explanation: Option<String>,
}

/// A generated data table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTable {
    /// Column headers.
    pub headers: Vec<String>,
    /// Row data, outer = rows, inner = cells.
    pub rows: Vec<Vec<String>>,
}

/// One slide recovered from a deck.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slide {
    /// Rendered image, as a URL or data URL.
    pub image_url: Option<String>,
    /// Per-slide PDF URL when the viewer exposes one.
    pub pdf_url: Option<String>,
    /// 1-based position in the deck.
    pub slide_number: usize,
}

/// A node of a mindmap tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MindmapNode {
    /// Node label.
    pub label: String,
    /// Child nodes.
    pub children: Vec<MindmapNode>,
}

/// An in-app note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    /// Server-assigned id.
    pub id: String,
    /// Note title.
    pub title: String,
    /// Markdown body.
    pub content: String,
}

/// A generated report document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Title of the generating artifact.
    pub title: String,
    /// Markdown body.
    pub content: String,
}

/// Everything recoverable from a notebook beyond its source list.
///
/// Each field is independently best-effort: an empty collection means "no
/// data yet or not recoverable", never an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotebookContent {
    /// In-app notes.
    pub notes: Vec<Note>,
    /// Mindmap trees.
    pub mindmaps: Vec<MindmapNode>,
    /// Chat transcript.
    pub chat: Vec<ChatMessage>,
    /// Artifact descriptors, as listed.
    pub artifacts: Vec<Artifact>,
    /// Flashcard sets keyed by artifact title.
    pub flashcard_sets: Vec<(String, Vec<Flashcard>)>,
    /// Quizzes keyed by artifact title.
    pub quizzes: Vec<(String, Vec<QuizQuestion>)>,
    /// Data tables keyed by artifact title.
    pub tables: Vec<(String, DataTable)>,
    /// Generated reports.
    pub reports: Vec<Report>,
    /// Slide decks keyed by artifact title (live-page recovery only; no
    /// RPC exposes rendered slides).
    pub slide_decks: Vec<(String, Vec<Slide>)>,
    /// Infographic data URLs keyed by artifact title (live-page recovery
    /// only).
    pub infographics: Vec<(String, String)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_kind_from_known_codes() {
        assert_eq!(SourceKind::from_code(5), SourceKind::Url);
        assert_eq!(SourceKind::from_code(6), SourceKind::Youtube);
        assert_eq!(SourceKind::from_code(3), SourceKind::Pdf);
    }

    #[test]
    fn test_source_kind_unknown_code_falls_back() {
        assert_eq!(SourceKind::from_code(99), SourceKind::Unknown);
        assert_eq!(SourceKind::from_code(-1), SourceKind::Unknown);
    }

    #[test]
    fn test_source_kind_inferred_from_url() {
        assert_eq!(
            SourceKind::infer_from_url("https://www.youtube.com/watch?v=abc"),
            SourceKind::Youtube
        );
        assert_eq!(
            SourceKind::infer_from_url("https://youtu.be/abc"),
            SourceKind::Youtube
        );
        assert_eq!(
            SourceKind::infer_from_url("https://example.com/paper.PDF"),
            SourceKind::Pdf
        );
        assert_eq!(
            SourceKind::infer_from_url("https://example.com/page"),
            SourceKind::Url
        );
    }

    #[test]
    fn test_status_observed_values() {
        assert_eq!(ResourceStatus::from_code(0), ResourceStatus::Unspecified);
        assert_eq!(ResourceStatus::from_code(1), ResourceStatus::Pending);
        assert_eq!(ResourceStatus::from_code(2), ResourceStatus::Processing);
        assert_eq!(ResourceStatus::from_code(3), ResourceStatus::Ready);
        assert_eq!(ResourceStatus::from_code(4), ResourceStatus::Error);
    }

    #[test]
    fn test_status_unknown_value_is_permissive() {
        assert_eq!(ResourceStatus::from_code(7), ResourceStatus::Ready);
        assert!(ResourceStatus::from_code(7).is_fetchable());
    }

    #[test]
    fn test_unspecified_status_is_fetchable() {
        assert!(ResourceStatus::Unspecified.is_fetchable());
        assert!(!ResourceStatus::Processing.is_fetchable());
        assert!(!ResourceStatus::Error.is_fetchable());
    }

    #[test]
    fn test_artifact_kind_variant_disambiguation() {
        assert_eq!(ArtifactKind::from_codes(4, Some(1)), ArtifactKind::Flashcards);
        assert_eq!(ArtifactKind::from_codes(4, Some(2)), ArtifactKind::Quiz);
        assert_eq!(ArtifactKind::from_codes(4, None), ArtifactKind::Unknown);
        assert_eq!(ArtifactKind::from_codes(4, Some(9)), ArtifactKind::Unknown);
    }

    #[test]
    fn test_artifact_kind_interactive_content() {
        assert!(ArtifactKind::Flashcards.has_interactive_content());
        assert!(ArtifactKind::Report.has_interactive_content());
        assert!(!ArtifactKind::Audio.has_interactive_content());
        assert!(!ArtifactKind::Slides.has_interactive_content());
    }
}
