//! Minimal DOCX (WordprocessingML) container writer.
//!
//! A `.docx` file is a ZIP of XML parts; this writer emits the three parts
//! Word requires ([Content_Types].xml, the package relationships, and the
//! document body) with one paragraph per input line.

use std::io::{Cursor, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::ExportError;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

/// Escapes text for XML content.
fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// One WordprocessingML paragraph, optionally heading-styled.
fn paragraph(text: &str, heading: bool) -> String {
    let props = if heading {
        "<w:pPr><w:pStyle w:val=\"Heading1\"/></w:pPr>"
    } else {
        ""
    };
    format!(
        "<w:p>{props}<w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>",
        xml_escape(text)
    )
}

/// Renders a titled text document as DOCX bytes.
///
/// # Errors
///
/// Returns [`ExportError`] on archive or I/O failure.
pub fn text_to_docx(title: &str, text: &str) -> Result<Vec<u8>, ExportError> {
    let mut body = String::new();
    body.push_str(&paragraph(title, true));
    for line in text.lines() {
        body.push_str(&paragraph(line, false));
    }
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:body>{body}<w:sectPr/></w:body>
</w:document>"#
    );

    let mut archive = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    archive.start_file("[Content_Types].xml", options)?;
    archive.write_all(CONTENT_TYPES.as_bytes())?;
    archive.start_file("_rels/.rels", options)?;
    archive.write_all(PACKAGE_RELS.as_bytes())?;
    archive.start_file("word/document.xml", options)?;
    archive.write_all(document.as_bytes())?;
    let cursor = archive.finish()?;
    Ok(cursor.into_inner())
}
