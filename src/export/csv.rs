//! CSV and TSV renderers for tables and flashcards.

use crate::repository::{DataTable, Flashcard};

/// UTF-8 byte-order mark prefixed to CSV output.
///
/// Spreadsheet applications sniff encoding from the BOM; without it,
/// non-ASCII content opens as mojibake.
pub const CSV_BOM: &str = "\u{feff}";

/// Quotes a CSV field per RFC 4180.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Renders a data table as CSV with a BOM prefix.
#[must_use]
pub fn table_to_csv(table: &DataTable) -> String {
    let mut out = String::from(CSV_BOM);
    if !table.headers.is_empty() {
        let headers: Vec<String> = table.headers.iter().map(|h| csv_field(h)).collect();
        out.push_str(&headers.join(","));
        out.push_str("\r\n");
    }
    for row in &table.rows {
        let cells: Vec<String> = row.iter().map(|c| csv_field(c)).collect();
        out.push_str(&cells.join(","));
        out.push_str("\r\n");
    }
    out
}

/// Renders flashcards as a three-column CSV (front, back, tags).
#[must_use]
pub fn flashcards_to_csv(cards: &[Flashcard]) -> String {
    let mut out = String::from(CSV_BOM);
    out.push_str("Front,Back,Tags\r\n");
    for card in cards {
        out.push_str(&format!(
            "{},{},{}\r\n",
            csv_field(&card.front),
            csv_field(&card.back),
            csv_field(&card.tags.join(" ")),
        ));
    }
    out
}

/// Renders flashcards in Anki's tab-separated import format.
///
/// One line per card: `front<TAB>back<TAB>tags-joined-by-space`. Embedded
/// tabs would shift columns on import, so they become spaces; embedded
/// newlines become spaces for the same reason.
#[must_use]
pub fn flashcards_to_anki(cards: &[Flashcard]) -> String {
    cards
        .iter()
        .map(|card| {
            format!(
                "{}\t{}\t{}",
                anki_field(&card.front),
                anki_field(&card.back),
                anki_field(&card.tags.join(" ")),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn anki_field(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}
