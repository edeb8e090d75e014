//! ZIP bundling for batch exports and multi-image categories.

use std::io::{Cursor, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::ExportError;

/// Bundles named files into one ZIP archive.
///
/// Used both for "individual files" batch mode (one file per exported
/// item) and for multi-image categories (slide decks, infographics).
/// Duplicate names get a numeric suffix so nothing is silently
/// overwritten.
///
/// # Errors
///
/// Returns [`ExportError::Empty`] for an empty file list; archive and I/O
/// failures propagate.
pub fn zip_bundle(files: &[(String, Vec<u8>)]) -> Result<Vec<u8>, ExportError> {
    if files.is_empty() {
        return Err(ExportError::Empty("no files to bundle"));
    }

    let mut archive = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    let mut used: Vec<String> = Vec::new();

    for (name, data) in files {
        let unique = unique_name(name, &used);
        archive.start_file(unique.as_str(), options)?;
        archive.write_all(data)?;
        used.push(unique);
    }

    let cursor = archive.finish()?;
    Ok(cursor.into_inner())
}

/// Appends ` (n)` before the extension until the name is unused.
fn unique_name(name: &str, used: &[String]) -> String {
    if !used.iter().any(|u| u == name) {
        return name.to_string();
    }
    let (stem, extension) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    };
    for n in 2.. {
        let candidate = match extension {
            Some(ext) => format!("{stem} ({n}).{ext}"),
            None => format!("{stem} ({n})"),
        };
        if !used.iter().any(|u| u == &candidate) {
            return candidate;
        }
    }
    unreachable!("suffix search always terminates")
}
