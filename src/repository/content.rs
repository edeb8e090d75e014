//! Extended notebook content: notes, mindmaps, chat history, artifacts.
//!
//! Everything here is best-effort by design. The three listing calls are
//! independent; a failure in one never aborts the others, and per-artifact
//! content fetches are bounded by the artifact's declared status. Callers
//! treat empty collections as "no data yet".

use serde_json::{Value, json};
use tracing::{debug, instrument, warn};

use crate::rpc::ProcedureId;
use crate::wire;

use super::parse::{find_uuid, i64_at, looks_like_uuid, plausible_title, str_at, value_at};
use super::types::{
    Artifact, ArtifactKind, ChatMessage, ChatRole, DataTable, Flashcard, MindmapNode, Note,
    NotebookContent, QuizQuestion, Report, ResourceStatus,
};
use super::Repository;

impl Repository {
    /// Fetches everything recoverable from a notebook beyond its sources.
    ///
    /// Issues three independent calls (notes + mindmaps, chat history,
    /// artifact list); each is best-effort, so this method is infallible —
    /// a notebook that answers nothing yields an empty
    /// [`NotebookContent`]. Artifacts whose content requires a further
    /// call (reports, flashcards, quizzes, tables) get one each, but only
    /// when their declared status makes fetching worthwhile.
    #[instrument(level = "debug", skip(self))]
    pub async fn extended_content(&self, notebook_id: &str) -> NotebookContent {
        let mut content = NotebookContent::default();

        match self
            .client()
            .call(ProcedureId::NOTES_AND_MINDMAPS, &json!([notebook_id]))
            .await
        {
            Ok(response) => parse_notes_payload(&response, &mut content),
            Err(error) => warn!(%error, "notes/mindmaps call failed, continuing"),
        }

        match self
            .client()
            .call(ProcedureId::CHAT_HISTORY, &json!([notebook_id, null, 1]))
            .await
        {
            Ok(response) => content.chat = parse_chat_payload(&response),
            Err(error) => warn!(%error, "chat history call failed, continuing"),
        }

        match self
            .client()
            .call(ProcedureId::ARTIFACT_LIST, &json!([notebook_id]))
            .await
        {
            Ok(response) => content.artifacts = parse_artifact_list(&response),
            Err(error) => warn!(%error, "artifact list call failed, continuing"),
        }

        let wanted: Vec<Artifact> = content
            .artifacts
            .iter()
            .filter(|a| a.kind.has_interactive_content() && a.status.is_fetchable())
            .cloned()
            .collect();
        for artifact in wanted {
            self.fetch_artifact_content(notebook_id, &artifact, &mut content)
                .await;
        }

        debug!(
            notes = content.notes.len(),
            chat = content.chat.len(),
            artifacts = content.artifacts.len(),
            "fetched extended content"
        );
        content
    }

    /// Fetches one artifact's interactive payload into `content`.
    ///
    /// Best-effort: failures are logged and leave `content` untouched.
    async fn fetch_artifact_content(
        &self,
        notebook_id: &str,
        artifact: &Artifact,
        content: &mut NotebookContent,
    ) {
        let args = json!([notebook_id, artifact.id]);
        let response = match self.client().call(ProcedureId::ARTIFACT_CONTENT, &args).await {
            Ok(response) => response,
            Err(error) => {
                warn!(artifact = %artifact.id, %error, "artifact content call failed");
                return;
            }
        };
        let Some(payload) = wire::decode_response(&response) else {
            debug!(artifact = %artifact.id, "artifact content had no payload");
            return;
        };
        // The interactive data itself is one more JSON string inside the
        // payload; fall back to the payload tree when it is inline.
        let inner: Value = str_at(&payload, &[0])
            .and_then(|s| serde_json::from_str(s).ok())
            .unwrap_or(payload);

        match artifact.kind {
            ArtifactKind::Flashcards => {
                let cards = parse_flashcards(&inner);
                if !cards.is_empty() {
                    content.flashcard_sets.push((artifact.title.clone(), cards));
                }
            }
            ArtifactKind::Quiz => {
                let questions = parse_quiz(&inner);
                if !questions.is_empty() {
                    content.quizzes.push((artifact.title.clone(), questions));
                }
            }
            ArtifactKind::Table => {
                let table = parse_table(&inner);
                if !table.headers.is_empty() || !table.rows.is_empty() {
                    content.tables.push((artifact.title.clone(), table));
                }
            }
            ArtifactKind::Report => {
                if let Some(body) = report_body(&inner) {
                    content.reports.push(Report {
                        title: artifact.title.clone(),
                        content: body,
                    });
                }
            }
            _ => {}
        }
    }
}

/// Parses the notes + mindmaps response into `content`.
///
/// Row shape: `[[id], title, body, tag]` with tag 0 = note, 1 = mindmap
/// (mindmap body is a JSON-encoded node tree).
fn parse_notes_payload(response: &str, content: &mut NotebookContent) {
    let Some(payload) = wire::decode_response(response) else {
        debug!("notes response had no decodable payload");
        return;
    };
    let rows = value_at(&payload, &[0])
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    for row in &rows {
        let id = str_at(row, &[0, 0])
            .filter(|s| looks_like_uuid(s))
            .or_else(|| find_uuid(row))
            .unwrap_or_default()
            .to_string();
        let title = str_at(row, &[1])
            .filter(|s| plausible_title(s))
            .unwrap_or("Untitled note")
            .to_string();
        let body = str_at(row, &[2]).unwrap_or_default();
        let tag = i64_at(row, &[3]).unwrap_or(0);

        if tag == 1 {
            let Ok(tree) = serde_json::from_str::<Value>(body) else {
                debug!(%id, "mindmap body was not valid JSON");
                continue;
            };
            if let Some(node) = parse_mindmap_node(&tree) {
                content.mindmaps.push(node);
            }
        } else {
            content.notes.push(Note {
                id,
                title,
                content: body.to_string(),
            });
        }
    }
}

/// Parses the chat history response.
///
/// Row shape: `[role_code, content, timestamp?]` with 1 = user,
/// 2 = assistant; other codes are skipped.
fn parse_chat_payload(response: &str) -> Vec<ChatMessage> {
    let Some(payload) = wire::decode_response(response) else {
        debug!("chat response had no decodable payload");
        return Vec::new();
    };
    let rows = value_at(&payload, &[0])
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    rows.iter()
        .filter_map(|row| {
            let role = match i64_at(row, &[0]) {
                Some(1) => ChatRole::User,
                Some(2) => ChatRole::Assistant,
                _ => return None,
            };
            let content = str_at(row, &[1]).filter(|s| !s.is_empty())?.to_string();
            let timestamp = str_at(row, &[2]).map(ToString::to_string);
            Some(ChatMessage {
                role,
                content,
                timestamp,
            })
        })
        .collect()
}

/// Parses the artifact list response.
///
/// Row shape: `[id, type_code, title, status, [variant]]`. Type code 4 is
/// disambiguated by the nested variant.
fn parse_artifact_list(response: &str) -> Vec<Artifact> {
    let Some(payload) = wire::decode_response(response) else {
        debug!("artifact list had no decodable payload");
        return Vec::new();
    };
    let rows = value_at(&payload, &[0])
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    rows.iter()
        .filter_map(|row| {
            let id = str_at(row, &[0])
                .filter(|s| looks_like_uuid(s))
                .or_else(|| find_uuid(row))?
                .to_string();
            let type_code = i64_at(row, &[1]).unwrap_or(0);
            let variant = i64_at(row, &[4, 0]);
            let title = str_at(row, &[2])
                .filter(|s| plausible_title(s))
                .unwrap_or("Untitled artifact")
                .to_string();
            let status = i64_at(row, &[3])
                .map_or(ResourceStatus::Unspecified, ResourceStatus::from_code);
            Some(Artifact {
                id,
                type_code,
                variant,
                title,
                status,
                kind: ArtifactKind::from_codes(type_code, variant),
            })
        })
        .collect()
}

/// Parses flashcards from `[[front, back, [tags...]], ...]`.
pub(crate) fn parse_flashcards(value: &Value) -> Vec<Flashcard> {
    let Some(rows) = value.as_array() else {
        return Vec::new();
    };
    rows.iter()
        .filter_map(|row| {
            let front = str_at(row, &[0]).filter(|s| !s.is_empty())?.to_string();
            let back = str_at(row, &[1]).unwrap_or_default().to_string();
            let tags = value_at(row, &[2])
                .and_then(Value::as_array)
                .map(|tags| {
                    tags.iter()
                        .filter_map(Value::as_str)
                        .map(ToString::to_string)
                        .collect()
                })
                .unwrap_or_default();
            Some(Flashcard { front, back, tags })
        })
        .collect()
}

/// Parses quiz questions from `[[question, [options...], answer, explanation], ...]`.
pub(crate) fn parse_quiz(value: &Value) -> Vec<QuizQuestion> {
    let Some(rows) = value.as_array() else {
        return Vec::new();
    };
    rows.iter()
        .filter_map(|row| {
            let question = str_at(row, &[0]).filter(|s| !s.is_empty())?.to_string();
            let options = value_at(row, &[1])
                .and_then(Value::as_array)
                .map(|opts| {
                    opts.iter()
                        .filter_map(Value::as_str)
                        .map(ToString::to_string)
                        .collect()
                })
                .unwrap_or_default();
            let answer_index = i64_at(row, &[2])
                .and_then(|i| usize::try_from(i).ok());
            let explanation = str_at(row, &[3])
                .filter(|s| !s.is_empty())
                .map(ToString::to_string);
            Some(QuizQuestion {
                question,
                options,
                answer_index,
                explanation,
            })
        })
        .collect()
}

/// Parses a data table from `[[headers...], [[cell...], ...]]`.
pub(crate) fn parse_table(value: &Value) -> DataTable {
    let headers = value_at(value, &[0])
        .and_then(Value::as_array)
        .map(|cells| {
            cells
                .iter()
                .filter_map(Value::as_str)
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default();
    let rows = value_at(value, &[1])
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .filter_map(|row| {
                    row.as_array().map(|cells| {
                        cells
                            .iter()
                            .map(|cell| cell.as_str().unwrap_or_default().to_string())
                            .collect::<Vec<_>>()
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    DataTable { headers, rows }
}

/// Extracts a report's markdown body: the value itself when it is a
/// string, else the longest string in the tree.
fn report_body(value: &Value) -> Option<String> {
    if let Some(s) = value.as_str().filter(|s| !s.is_empty()) {
        return Some(s.to_string());
    }
    super::parse::find_longest_string(value)
        .filter(|s| !s.is_empty() && !looks_like_uuid(s))
        .map(ToString::to_string)
}

/// Parses a mindmap node from either the array form `[label, [children]]`
/// or the object form `{"label": .., "children": [..]}`.
pub(crate) fn parse_mindmap_node(value: &Value) -> Option<MindmapNode> {
    match value {
        Value::Array(fields) => {
            let label = fields.first()?.as_str()?.to_string();
            let children = fields
                .get(1)
                .and_then(Value::as_array)
                .map(|kids| kids.iter().filter_map(parse_mindmap_node).collect())
                .unwrap_or_default();
            Some(MindmapNode { label, children })
        }
        Value::Object(map) => {
            let label = map.get("label")?.as_str()?.to_string();
            let children = map
                .get("children")
                .and_then(Value::as_array)
                .map(|kids| kids.iter().filter_map(parse_mindmap_node).collect())
                .unwrap_or_default();
            Some(MindmapNode { label, children })
        }
        _ => None,
    }
}
