//! Interactive artifact payload recovery (flashcards, quizzes, tables,
//! reports) from a pinned background tab.

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::repository::{DataTable, Flashcard, QuizQuestion, parse_flashcards, parse_quiz, parse_table};

use super::engine::{ARTIFACT_POLL_TIMEOUT, ExtractionEngine, RENDER_DELAY};
use super::{FrameScope, TabId, scripts};

/// Selector clicked to force the artifact viewer to render its payload.
const FORCE_RENDER_SELECTOR: &str = ".artifact-open-button";

impl ExtractionEngine {
    /// Recovers one artifact's payload from a live viewer.
    ///
    /// Strategies, in order, inside a pinned background tab:
    /// 1. poll all frames for the DOM attribute carrying embedded JSON;
    /// 2. discover the viewer iframe's direct URL and navigate to it (some
    ///    content is blocked from cross-frame script access), then poll
    ///    again;
    /// 3. scrape the rendered table/report markup directly.
    ///
    /// The background tab is closed on every exit path. Returns `None` on
    /// any failure or timeout.
    #[instrument(level = "debug", skip(self))]
    pub async fn artifact_payload(&self, notebook_id: &str, artifact_id: &str) -> Option<Value> {
        let url = format!("{}?artifact={artifact_id}", self.notebook_url(notebook_id));
        let tab = match self.open_settled_tab(&url, true).await {
            Ok(tab) => tab,
            Err(error) => {
                warn!(%error, "could not open artifact tab");
                return None;
            }
        };
        let result = self.payload_from_tab(tab).await;
        self.close_quietly(tab).await;
        result
    }

    /// Flashcards via the payload strategies.
    pub async fn artifact_flashcards(
        &self,
        notebook_id: &str,
        artifact_id: &str,
    ) -> Vec<Flashcard> {
        self.artifact_payload(notebook_id, artifact_id)
            .await
            .map(|value| parse_flashcards(&value))
            .unwrap_or_default()
    }

    /// Quiz questions via the payload strategies.
    pub async fn artifact_quiz(
        &self,
        notebook_id: &str,
        artifact_id: &str,
    ) -> Vec<QuizQuestion> {
        self.artifact_payload(notebook_id, artifact_id)
            .await
            .map(|value| parse_quiz(&value))
            .unwrap_or_default()
    }

    /// Data table via the payload strategies.
    pub async fn artifact_table(&self, notebook_id: &str, artifact_id: &str) -> Option<DataTable> {
        let value = self.artifact_payload(notebook_id, artifact_id).await?;
        let table = parse_table(&value);
        (!table.headers.is_empty() || !table.rows.is_empty()).then_some(table)
    }

    /// Runs the strategy chain inside an already-open tab.
    async fn payload_from_tab(&self, tab: TabId) -> Option<Value> {
        // Some viewers render lazily until something interacts with them.
        match self.inspector().click(tab, FORCE_RENDER_SELECTOR).await {
            Ok(true) => tokio::time::sleep(RENDER_DELAY).await,
            Ok(false) => {}
            Err(error) => debug!(%error, "force-render click rejected"),
        }

        if let Some(value) = self.poll_json_attribute(tab, ARTIFACT_POLL_TIMEOUT).await {
            return Some(value);
        }

        // Cross-frame access may be blocked; go straight to the iframe.
        if let Some(frame_url) = self.viewer_iframe_url(tab).await {
            debug!(%frame_url, "navigating to viewer iframe directly");
            if self.inspector().navigate(tab, &frame_url).await.is_ok() {
                tokio::time::sleep(RENDER_DELAY).await;
                if let Some(value) = self.poll_json_attribute(tab, ARTIFACT_POLL_TIMEOUT / 2).await
                {
                    return Some(value);
                }
            }
        }

        self.scrape_rendered_markup(tab).await
    }

    /// Polls all frames for the embedded-JSON attribute until the deadline.
    async fn poll_json_attribute(
        &self,
        tab: TabId,
        timeout: std::time::Duration,
    ) -> Option<Value> {
        let deadline = Self::deadline(timeout);
        loop {
            let result = self
                .inspector()
                .execute(tab, FrameScope::All, scripts::READ_ARTIFACT_JSON_ATTR)
                .await
                .unwrap_or(Value::Null);
            if let Some(raw) = first_string(&result) {
                if let Ok(value) = serde_json::from_str::<Value>(raw) {
                    return Some(value);
                }
                debug!("artifact attribute present but not valid JSON");
            }
            if !Self::tick(deadline).await {
                debug!("artifact attribute polling hit deadline");
                return None;
            }
        }
    }

    /// Asks the top frame for the viewer iframe's direct URL.
    async fn viewer_iframe_url(&self, tab: TabId) -> Option<String> {
        let value = self
            .inspector()
            .execute(tab, FrameScope::Top, scripts::FIND_VIEWER_IFRAME_URL)
            .await
            .ok()?;
        first_string(&value)
            .filter(|s| s.starts_with("http"))
            .map(ToString::to_string)
    }

    /// Last resort: scrape whatever the viewer rendered.
    async fn scrape_rendered_markup(&self, tab: TabId) -> Option<Value> {
        let table = self
            .inspector()
            .execute(tab, FrameScope::All, scripts::SCRAPE_RENDERED_TABLE)
            .await
            .unwrap_or(Value::Null);
        let table = flatten_frames(table);
        if table.as_array().is_some_and(|a| !a.is_empty()) {
            return Some(table);
        }

        let report = self
            .inspector()
            .execute(tab, FrameScope::All, scripts::SCRAPE_RENDERED_REPORT)
            .await
            .unwrap_or(Value::Null);
        first_string(&report).map(|s| Value::String(s.to_string()))
    }
}

/// First non-empty string in a per-frame result (a bare string, or an
/// array of per-frame values for [`FrameScope::All`]).
fn first_string(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Array(items) => items.iter().find_map(first_string),
        _ => None,
    }
}

/// Collapses a per-frame result array to the first non-null frame value.
fn flatten_frames(value: Value) -> Value {
    match value {
        Value::Array(ref items)
            if items.len() <= 8 && items.iter().any(|v| matches!(v, Value::Array(_))) =>
        {
            // Heuristic: an outer array of frame results contains arrays or
            // nulls, never strings; real payloads start with a header row.
            items
                .iter()
                .find(|v| !v.is_null())
                .cloned()
                .unwrap_or(Value::Null)
        }
        other => other,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::super::testing::FakeInspector;
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_artifact_payload_from_json_attribute() {
        let cards = json!([["F1", "B1", []], ["F2", "B2", ["tag"]]]);
        let inspector = Arc::new(FakeInspector::with_results(&[(
            "data-artifact-state",
            json!([null, cards.to_string()]),
        )]));
        let engine = ExtractionEngine::new(inspector.clone(), "https://notebook.example");

        let flashcards = engine.artifact_flashcards("nb", "art").await;
        assert_eq!(flashcards.len(), 2);
        assert_eq!(flashcards[1].tags, vec!["tag"]);
        // The background tab must be closed on success.
        assert_eq!(inspector.closed.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_artifact_payload_times_out_and_closes_tab() {
        let inspector = Arc::new(FakeInspector::default());
        let engine = ExtractionEngine::new(inspector.clone(), "https://notebook.example");

        let payload = engine.artifact_payload("nb", "art").await;
        assert!(payload.is_none());
        assert_eq!(
            inspector.closed.lock().unwrap().len(),
            1,
            "tab must be closed on timeout too"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_artifact_table_scrape_fallback() {
        let inspector = Arc::new(FakeInspector::with_results(&[(
            "tbody tr",
            json!([[["H1", "H2"], [["a", "b"]]]]),
        )]));
        let engine = ExtractionEngine::new(inspector, "https://notebook.example");

        let table = engine.artifact_table("nb", "art").await.unwrap();
        assert_eq!(table.headers, vec!["H1", "H2"]);
        assert_eq!(table.rows, vec![vec!["a".to_string(), "b".to_string()]]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_artifact_payload_no_tab_returns_none() {
        let inspector = Arc::new(FakeInspector {
            no_tabs: true,
            ..FakeInspector::default()
        });
        let engine = ExtractionEngine::new(inspector, "https://notebook.example");
        assert!(engine.artifact_payload("nb", "art").await.is_none());
        assert!(engine.artifact_flashcards("nb", "art").await.is_empty());
    }
}
