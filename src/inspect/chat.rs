//! Chat transcript recovery from the rendered chat panel.
//!
//! No RPC returns the transcript text the panel shows, so the engine reads
//! the two known message-container classes and reconstructs chronological
//! order from vertical screen position. Date separators are recovered in a
//! second pass and merged by the same position key.

use serde_json::Value;
use tracing::{debug, instrument};

use crate::repository::{ChatMessage, ChatRole};

use super::engine::{ExtractionEngine, RENDER_DELAY};
use super::{FrameScope, scripts};

impl ExtractionEngine {
    /// Extracts the chat transcript of a notebook from a live tab.
    ///
    /// Strategies, in order: activate the chat tab by simulated click and
    /// read the known message containers; if that yields nothing, read the
    /// containers without the click (the panel may already be open).
    /// Returns an empty transcript on any failure.
    #[instrument(level = "debug", skip(self))]
    pub async fn chat_transcript(&self, notebook_id: &str) -> Vec<ChatMessage> {
        let Some(tab) = self.acquire_notebook_tab(notebook_id).await else {
            return Vec::new();
        };

        // First strategy: make sure the chat panel is frontmost.
        match self.inspector().click(tab, scripts::CHAT_TAB_SELECTOR).await {
            Ok(true) => tokio::time::sleep(RENDER_DELAY).await,
            Ok(false) => debug!("chat tab button not found, reading panel as-is"),
            Err(error) => debug!(%error, "chat tab click rejected, reading panel as-is"),
        }

        let mut rows = self.read_positioned_messages(tab).await;
        if rows.is_empty() {
            // Second chance after a render delay: the click may have landed
            // before the panel finished mounting.
            tokio::time::sleep(RENDER_DELAY).await;
            rows = self.read_positioned_messages(tab).await;
        }

        let mut separators = self.read_date_separators(tab).await;
        rows.append(&mut separators);

        // Vertical position reconstructs chronological order; the DOM
        // returns containers in an order the layout does not guarantee.
        rows.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        rows.into_iter().map(|(_, message)| message).collect()
    }

    /// Reads `[[role, text, top], ...]` rows from the message containers.
    async fn read_positioned_messages(&self, tab: super::TabId) -> Vec<(f64, ChatMessage)> {
        let value = self
            .inspector()
            .execute(tab, FrameScope::Top, scripts::COLLECT_CHAT_MESSAGES)
            .await
            .unwrap_or(Value::Null);
        let Some(rows) = value.as_array() else {
            return Vec::new();
        };
        rows.iter()
            .filter_map(|row| {
                let fields = row.as_array()?;
                let role = match fields.first()?.as_str()? {
                    "user" => ChatRole::User,
                    "assistant" => ChatRole::Assistant,
                    _ => return None,
                };
                let content = fields.get(1)?.as_str()?.trim().to_string();
                if content.is_empty() {
                    return None;
                }
                let top = fields.get(2).and_then(Value::as_f64).unwrap_or(0.0);
                Some((
                    top,
                    ChatMessage {
                        role,
                        content,
                        timestamp: None,
                    },
                ))
            })
            .collect()
    }

    /// Reads `[[text, top], ...]` date-separator rows.
    async fn read_date_separators(&self, tab: super::TabId) -> Vec<(f64, ChatMessage)> {
        let value = self
            .inspector()
            .execute(tab, FrameScope::Top, scripts::COLLECT_DATE_SEPARATORS)
            .await
            .unwrap_or(Value::Null);
        let Some(rows) = value.as_array() else {
            return Vec::new();
        };
        rows.iter()
            .filter_map(|row| {
                let fields = row.as_array()?;
                let content = fields.first()?.as_str()?.trim().to_string();
                if content.is_empty() {
                    return None;
                }
                let top = fields.get(1).and_then(Value::as_f64).unwrap_or(0.0);
                Some((
                    top,
                    ChatMessage {
                        role: ChatRole::Date,
                        content,
                        timestamp: None,
                    },
                ))
            })
            .collect()
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
    async fn test_chat_transcript_orders_by_position_and_merges_dates() {
        let inspector = Arc::new(FakeInspector::with_results(&[
            (
                "from-user-container",
                json!([
                    ["assistant", "Second answer", 300.0],
                    ["user", "First question", 120.0],
                    ["assistant", "  ", 400.0]
                ]),
            ),
            ("separator", json!([["Aug 3", 50.0]])),
        ]));
        let engine = ExtractionEngine::new(inspector, "https://notebook.example");

        let chat = engine.chat_transcript("abc").await;
        assert_eq!(chat.len(), 3);
        assert_eq!(chat[0].role, ChatRole::Date);
        assert_eq!(chat[0].content, "Aug 3");
        assert_eq!(chat[1].content, "First question");
        assert_eq!(chat[2].content, "Second answer");
    }

    #[tokio::test(start_paused = true)]
    async fn test_chat_transcript_no_tab_returns_empty() {
        let inspector = Arc::new(FakeInspector {
            no_tabs: true,
            ..FakeInspector::default()
        });
        let engine = ExtractionEngine::new(inspector, "https://notebook.example");
        assert!(engine.chat_transcript("abc").await.is_empty());
    }
}
