//! PDF rendering for text content.
//!
//! Text is flowed onto A4 pages with a built-in font. Built-in PDF fonts
//! cover Latin-1 only, so glyphs outside that range degrade to `?` rather
//! than producing a corrupt file; callers wanting full fidelity use the
//! markdown or text formats.

use std::io::BufWriter;

use printpdf::{BuiltinFont, Mm, PdfDocument};

use super::ExportError;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 15.0;
const FONT_SIZE: f32 = 11.0;
const LINE_HEIGHT_MM: f32 = 5.5;
const TITLE_SIZE: f32 = 16.0;

/// Characters per line at the body font size, conservative for A4.
const WRAP_COLUMNS: usize = 92;

/// Renders a titled text document as PDF bytes.
///
/// # Errors
///
/// Returns [`ExportError::Pdf`] when document construction fails.
pub fn text_to_pdf(title: &str, text: &str) -> Result<Vec<u8>, ExportError> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "content");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;

    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    let mut cursor_y = PAGE_HEIGHT_MM - MARGIN_MM;

    layer.use_text(latin1_lossy(title), TITLE_SIZE, Mm(MARGIN_MM), Mm(cursor_y), &bold);
    cursor_y -= LINE_HEIGHT_MM * 2.0;

    for line in wrap_lines(text, WRAP_COLUMNS) {
        if cursor_y < MARGIN_MM {
            let (page, page_layer) =
                doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "content");
            layer = doc.get_page(page).get_layer(page_layer);
            cursor_y = PAGE_HEIGHT_MM - MARGIN_MM;
        }
        if !line.is_empty() {
            layer.use_text(latin1_lossy(&line), FONT_SIZE, Mm(MARGIN_MM), Mm(cursor_y), &font);
        }
        cursor_y -= LINE_HEIGHT_MM;
    }

    let mut writer = BufWriter::new(Vec::new());
    doc.save(&mut writer)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    writer
        .into_inner()
        .map_err(|e| ExportError::Pdf(e.to_string()))
}

/// Wraps text at word boundaries to the given column count.
fn wrap_lines(text: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for raw_line in text.lines() {
        if raw_line.chars().count() <= columns {
            lines.push(raw_line.to_string());
            continue;
        }
        let mut current = String::new();
        for word in raw_line.split(' ') {
            let candidate_len = current.chars().count() + word.chars().count() + 1;
            if !current.is_empty() && candidate_len > columns {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            // A single over-long word is hard-split.
            if word.chars().count() > columns {
                let mut rest: Vec<char> = word.chars().collect();
                while rest.len() > columns {
                    let head: String = rest.drain(..columns).collect();
                    lines.push(head);
                }
                current.extend(rest);
            } else {
                current.push_str(word);
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines
}

/// Replaces glyphs the built-in fonts cannot encode.
fn latin1_lossy(text: &str) -> String {
    text.chars()
        .map(|c| if (c as u32) < 0x100 { c } else { '?' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_output_has_header_and_eof() {
        let bytes = text_to_pdf("Title", "Some body text.\n\nSecond paragraph.")
            .expect("pdf renders");
        assert!(bytes.starts_with(b"%PDF"));
        let tail = String::from_utf8_lossy(&bytes[bytes.len().saturating_sub(32)..]).to_string();
        assert!(tail.contains("%%EOF"));
    }

    #[test]
    fn test_pdf_long_text_spans_pages() {
        let short = text_to_pdf("Doc", "one line").expect("pdf renders");
        let long = text_to_pdf("Doc", &"line of text\n".repeat(200)).expect("pdf renders");
        // 200 lines at ~50 lines per page must grow the document.
        assert!(long.len() > short.len());
    }

    #[test]
    fn test_wrap_lines_respects_columns() {
        let text = "alpha beta gamma delta epsilon zeta".repeat(10);
        for line in wrap_lines(&text, 40) {
            assert!(line.chars().count() <= 40, "line too long: {line}");
        }
    }

    #[test]
    fn test_wrap_lines_keeps_blank_lines() {
        let lines = wrap_lines("a\n\nb", 10);
        assert_eq!(lines, vec!["a", "", "b"]);
    }

    #[test]
    fn test_latin1_lossy_degrades_cleanly() {
        assert_eq!(latin1_lossy("café"), "café");
        assert_eq!(latin1_lossy("日本語"), "???");
    }
}
