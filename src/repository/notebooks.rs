//! Notebook listing, creation, renaming, and detail parsing.

use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use crate::rpc::ProcedureId;
use crate::wire;

use super::parse::{
    find_string_where, find_url, find_uuid, first_uuid_in_text, i64_at, plausible_title, str_at,
    title_from_url, value_at,
};
use super::types::{Notebook, NotebookDetail, ResourceStatus, Source, SourceKind};
use super::{Repository, RepositoryError};

impl Repository {
    /// Lists the user's own notebooks, excluding ones shared with them.
    ///
    /// # Errors
    ///
    /// Propagates RPC failures. A decodable-but-unrecognized response shape
    /// yields an empty list, not an error.
    #[instrument(level = "debug", skip(self))]
    pub async fn list_notebooks(&self) -> Result<Vec<Notebook>, RepositoryError> {
        let text = self
            .client()
            .call(ProcedureId::LIST_NOTEBOOKS, &json!([null, 1]))
            .await?;

        let Some(payload) = wire::decode_response(&text) else {
            debug!("notebook list response had no decodable payload");
            return Ok(Vec::new());
        };

        let rows = value_at(&payload, &[0])
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let mut notebooks = Vec::new();
        for row in &rows {
            if row_is_shared(row) {
                continue;
            }
            let Some(id) = str_at(row, &[2])
                .filter(|s| super::parse::looks_like_uuid(s))
                .or_else(|| find_uuid(row))
            else {
                continue;
            };
            let name = str_at(row, &[0])
                .filter(|s| plausible_title(s))
                .or_else(|| find_string_where(row, &plausible_title))
                .unwrap_or("Untitled notebook");
            notebooks.push(Notebook {
                id: id.to_string(),
                name: name.to_string(),
            });
        }
        debug!(count = notebooks.len(), "listed notebooks");
        Ok(notebooks)
    }

    /// Creates a notebook and returns it.
    ///
    /// The response shape for creation has drifted more than once; the only
    /// stable property is that a successful response contains the new
    /// server-issued UUID somewhere in its raw text, so that is what is
    /// checked.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::CreateFailed`] when no UUID appears in the
    /// response; RPC failures propagate.
    #[instrument(level = "debug", skip(self))]
    pub async fn create_notebook(&self, name: &str) -> Result<Notebook, RepositoryError> {
        let text = self
            .client()
            .call(ProcedureId::CREATE_NOTEBOOK, &json!([name, null]))
            .await?;
        Self::check_inline_code(&text)?;

        let Some(id) = first_uuid_in_text(&text) else {
            warn!("create notebook response contained no UUID");
            return Err(RepositoryError::CreateFailed);
        };
        debug!(id, "created notebook");
        Ok(Notebook {
            id: id.to_string(),
            name: name.to_string(),
        })
    }

    /// Renames a notebook.
    ///
    /// # Errors
    ///
    /// RPC failures and fatal inline codes propagate.
    #[instrument(level = "debug", skip(self))]
    pub async fn rename_notebook(
        &self,
        notebook_id: &str,
        name: &str,
    ) -> Result<(), RepositoryError> {
        let text = self
            .client()
            .call(ProcedureId::RENAME_NOTEBOOK, &json!([notebook_id, name]))
            .await?;
        Self::check_inline_code(&text)?;
        Ok(())
    }

    /// Fetches a notebook's title and source list.
    ///
    /// # Errors
    ///
    /// Propagates RPC failures; unrecognized shapes degrade to a detail
    /// with the requested id and no sources.
    #[instrument(level = "debug", skip(self))]
    pub async fn notebook_detail(
        &self,
        notebook_id: &str,
    ) -> Result<NotebookDetail, RepositoryError> {
        let text = self
            .client()
            .call(ProcedureId::NOTEBOOK_DETAIL, &json!([notebook_id]))
            .await?;

        let mut detail = NotebookDetail {
            id: notebook_id.to_string(),
            ..NotebookDetail::default()
        };
        let Some(payload) = wire::decode_response(&text) else {
            debug!("notebook detail response had no decodable payload");
            return Ok(detail);
        };

        detail.title = str_at(&payload, &[1])
            .filter(|s| plausible_title(s))
            .or_else(|| find_string_where(&payload, &plausible_title))
            .unwrap_or_default()
            .to_string();

        let rows = value_at(&payload, &[0])
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        detail.sources = rows.iter().filter_map(parse_source_row).collect();

        debug!(sources = detail.sources.len(), "fetched notebook detail");
        Ok(detail)
    }
}

/// Shared-notebook discriminator: a metadata array whose second element is
/// the share flag. Absent metadata means "owned".
fn row_is_shared(row: &Value) -> bool {
    i64_at(row, &[3, 1]) == Some(1)
}

/// Parses one per-source row with the layered strategy.
///
/// Fixed index paths first; each field independently falls back to a
/// structural scan, and the title falls back further to the URL path or any
/// plausible standalone string in the row. Returns `None` only when not
/// even an id can be recovered.
fn parse_source_row(row: &Value) -> Option<Source> {
    let id = str_at(row, &[0, 0])
        .filter(|s| super::parse::looks_like_uuid(s))
        .or_else(|| find_uuid(row))?
        .to_string();

    let url = str_at(row, &[3])
        .filter(|s| s.starts_with("http"))
        .or_else(|| find_url(row))
        .map(ToString::to_string);

    // No structural fallback for the type code: status shares the same
    // small-integer range, so a scan would grab the wrong field. The URL
    // is the safer signal when the fixed path is empty.
    let type_code = i64_at(row, &[2]).filter(|c| (0..=20).contains(c));
    let kind = match (type_code, url.as_deref()) {
        (Some(code), _) => SourceKind::from_code(code),
        (None, Some(u)) => SourceKind::infer_from_url(u),
        (None, None) => SourceKind::Unknown,
    };

    let status = i64_at(row, &[4])
        .map_or(ResourceStatus::Unspecified, ResourceStatus::from_code);

    let title = str_at(row, &[1])
        .filter(|s| plausible_title(s))
        .map(ToString::to_string)
        .or_else(|| url.as_deref().and_then(title_from_url))
        .or_else(|| {
            find_string_where(row, &|s| plausible_title(s) && !s.starts_with("http"))
                .map(ToString::to_string)
        })
        .unwrap_or_else(|| "Untitled source".to_string());

    Some(Source {
        id,
        title,
        type_code: type_code.unwrap_or(0),
        kind,
        url,
        status,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    const SRC_ID: &str = "7a1b2c3d-0e4f-4a5b-8c6d-9e0f1a2b3c4d";

    #[test]
    fn test_parse_source_row_fixed_paths() {
        let row = json!([[SRC_ID], "My Paper", 3, "https://example.com/p.pdf", 3]);
        let source = parse_source_row(&row).unwrap();
        assert_eq!(source.id, SRC_ID);
        assert_eq!(source.title, "My Paper");
        assert_eq!(source.kind, SourceKind::Pdf);
        assert_eq!(source.status, ResourceStatus::Ready);
        assert_eq!(source.url.as_deref(), Some("https://example.com/p.pdf"));
    }

    #[test]
    fn test_parse_source_row_structural_fallback() {
        // Drifted shape: id buried deeper, no explicit type code, no title.
        let row = json!([null, [[SRC_ID, "https://example.com/docs/annual-report.pdf"]]]);
        let source = parse_source_row(&row).unwrap();
        assert_eq!(source.id, SRC_ID);
        assert_eq!(source.kind, SourceKind::Pdf, "kind inferred from URL");
        assert_eq!(source.title, "annual report.pdf", "title from URL path");
    }

    #[test]
    fn test_parse_source_row_title_from_plausible_string() {
        let row = json!([[SRC_ID], null, null, null, null, ["Some Standalone Title"]]);
        let source = parse_source_row(&row).unwrap();
        assert_eq!(source.title, "Some Standalone Title");
    }

    #[test]
    fn test_parse_source_row_without_id_is_skipped() {
        let row = json!(["no id here", 3]);
        assert!(parse_source_row(&row).is_none());
    }

    #[test]
    fn test_parse_source_row_missing_status_is_unspecified() {
        let row = json!([[SRC_ID], "T"]);
        let source = parse_source_row(&row).unwrap();
        assert_eq!(source.status, ResourceStatus::Unspecified);
        assert!(source.status.is_fetchable());
    }

    #[test]
    fn test_row_is_shared_discriminator() {
        assert!(row_is_shared(&json!(["T", null, SRC_ID, [0, 1]])));
        assert!(!row_is_shared(&json!(["T", null, SRC_ID, [0, 0]])));
        assert!(!row_is_shared(&json!(["T", null, SRC_ID])));
    }
}
