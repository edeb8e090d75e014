//! Renderers from recovered notebook content to portable file formats.
//!
//! Pure functions only: no network, no DOM. Every renderer is
//! deterministic given identical input and timestamp, so exports are
//! byte-for-byte reproducible in tests.
//!
//! # Formats
//!
//! - Markdown / plain text / JSON for notes, chat, reports, mindmaps
//! - CSV (UTF-8 with BOM, for spreadsheet compatibility) for tables and
//!   flashcards; Anki-style TSV for flashcards
//! - PDF (text flowed onto A4 pages)
//! - DOCX and PPTX (minimal OOXML containers)
//! - ZIP bundles for batch mode and multi-image categories

mod bundle;
mod csv;
mod docx;
mod filename;
mod markdown;
mod pdf;
mod pptx;

pub use bundle::zip_bundle;
pub use csv::{flashcards_to_anki, flashcards_to_csv, table_to_csv, CSV_BOM};
pub use docx::text_to_docx;
pub use filename::{export_filename, sanitize_title};
pub use markdown::{
    chat_to_markdown, chat_to_text, mindmap_to_outline, notes_to_markdown, quiz_to_markdown,
    report_to_markdown,
};
pub use pdf::text_to_pdf;
pub use pptx::slides_to_pptx;

use thiserror::Error;

/// Errors raised while rendering an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Writing to the in-memory container failed.
    #[error("I/O failure while rendering export: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP container construction failed.
    #[error("archive failure while rendering export: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// PDF document construction failed.
    #[error("PDF rendering failed: {0}")]
    Pdf(String),

    /// Nothing renderable in the input (e.g. a slide deck with no
    /// recoverable images).
    #[error("nothing to export: {0}")]
    Empty(&'static str),
}

/// Serializes any exportable value as pretty JSON.
///
/// # Errors
///
/// Returns [`ExportError::Io`] when serialization fails (practically
/// impossible for the crate's content types).
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<String, ExportError> {
    serde_json::to_string_pretty(value).map_err(|e| ExportError::Io(e.into()))
}
