//! Extraction orchestration: tab lifecycle, settle delays, polling.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::repository::{ArtifactKind, NotebookContent};

use super::{InspectorError, PageInspector, TabId};

/// Delay after load-complete before the client-rendered DOM is trusted.
pub(crate) const SETTLE_DELAY: Duration = Duration::from_millis(1500);

/// Extra delay after a simulated click before reading what it rendered.
pub(crate) const RENDER_DELAY: Duration = Duration::from_millis(800);

/// Fixed sleep between poll attempts.
pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Hard deadline for artifact payload polling.
pub(crate) const ARTIFACT_POLL_TIMEOUT: Duration = Duration::from_secs(15);

/// Deadline for a tab to report load-complete.
pub(crate) const TAB_LOAD_TIMEOUT: Duration = Duration::from_secs(20);

/// Per-strategy deadline for generic image fetching.
pub(crate) const IMAGE_STRATEGY_TIMEOUT: Duration = Duration::from_secs(10);

/// Orchestrates live-page extraction through a [`PageInspector`].
///
/// All public extraction methods live in the sibling files (`chat`,
/// `artifact`, `images`); this file owns tab acquisition and the shared
/// polling/cleanup discipline.
#[derive(Clone)]
pub struct ExtractionEngine {
    inspector: Arc<dyn PageInspector>,
    base_url: String,
}

impl ExtractionEngine {
    /// Creates an engine over the given inspector and application base URL.
    #[must_use]
    pub fn new(inspector: Arc<dyn PageInspector>, base_url: impl Into<String>) -> Self {
        Self {
            inspector,
            base_url: base_url.into(),
        }
    }

    pub(crate) fn inspector(&self) -> &Arc<dyn PageInspector> {
        &self.inspector
    }

    /// URL of a notebook page.
    pub(crate) fn notebook_url(&self, notebook_id: &str) -> String {
        format!("{}/notebook/{notebook_id}", self.base_url.trim_end_matches('/'))
    }

    /// Finds or opens a foreground tab showing the notebook.
    ///
    /// Reuses an existing tab when one already shows the notebook (by URL
    /// match); otherwise opens one and waits for load-complete plus the
    /// settle delay. Returns `None` on any failure.
    pub(crate) async fn acquire_notebook_tab(&self, notebook_id: &str) -> Option<TabId> {
        let fragment = format!("/notebook/{notebook_id}");
        if let Some(tab) = self.inspector.find_tab(&fragment).await {
            debug!(%tab, "reusing existing notebook tab");
            return Some(tab);
        }
        let url = self.notebook_url(notebook_id);
        match self.open_settled_tab(&url, false).await {
            Ok(tab) => Some(tab),
            Err(error) => {
                warn!(%error, "could not acquire notebook tab");
                None
            }
        }
    }

    /// Opens a tab, waits for load-complete, and lets the DOM settle.
    pub(crate) async fn open_settled_tab(
        &self,
        url: &str,
        background: bool,
    ) -> Result<TabId, InspectorError> {
        let tab = self.inspector.open_tab(url, background).await?;
        if let Err(error) = self.inspector.wait_for_load(tab, TAB_LOAD_TIMEOUT).await {
            // Load signal failures are not fatal on their own; the settle
            // delay below may still be enough for a cached page.
            debug!(%tab, %error, "load-complete signal not observed");
        }
        tokio::time::sleep(SETTLE_DELAY).await;
        Ok(tab)
    }

    /// Closes a temporary tab, tolerating failures.
    ///
    /// Tab leakage is a correctness bug, not just a resource leak: one
    /// export session can open dozens of background tabs. Every open path
    /// must reach this call on success, failure, and timeout alike.
    pub(crate) async fn close_quietly(&self, tab: TabId) {
        if let Err(error) = self.inspector.close_tab(tab).await {
            warn!(%tab, %error, "failed to close background tab");
        }
    }

    /// Fills the gaps RPC retrieval left in `content` from live pages.
    ///
    /// Chat text, slide images, and infographic renders are only
    /// observable in the DOM; interactive payloads the artifact-content
    /// call failed to produce get a second chance here. Everything is
    /// best-effort: content already present is never replaced, and a
    /// failing extraction leaves the field as it was.
    pub async fn augment(&self, notebook_id: &str, content: &mut NotebookContent) {
        if content.chat.is_empty() {
            content.chat = self.chat_transcript(notebook_id).await;
        }

        let artifacts = content.artifacts.clone();
        for artifact in artifacts
            .iter()
            .filter(|a| a.status.is_fetchable())
        {
            match artifact.kind {
                ArtifactKind::Flashcards
                    if !content.flashcard_sets.iter().any(|(t, _)| *t == artifact.title) =>
                {
                    let cards = self.artifact_flashcards(notebook_id, &artifact.id).await;
                    if !cards.is_empty() {
                        content.flashcard_sets.push((artifact.title.clone(), cards));
                    }
                }
                ArtifactKind::Quiz
                    if !content.quizzes.iter().any(|(t, _)| *t == artifact.title) =>
                {
                    let questions = self.artifact_quiz(notebook_id, &artifact.id).await;
                    if !questions.is_empty() {
                        content.quizzes.push((artifact.title.clone(), questions));
                    }
                }
                ArtifactKind::Table
                    if !content.tables.iter().any(|(t, _)| *t == artifact.title) =>
                {
                    if let Some(table) = self.artifact_table(notebook_id, &artifact.id).await {
                        content.tables.push((artifact.title.clone(), table));
                    }
                }
                ArtifactKind::Slides => {
                    let slides = self.slide_images(notebook_id, &artifact.id).await;
                    if !slides.is_empty() {
                        content.slide_decks.push((artifact.title.clone(), slides));
                    }
                }
                ArtifactKind::Infographic => {
                    if let Some(image) = self.infographic_image(notebook_id, &artifact.id).await {
                        content.infographics.push((artifact.title.clone(), image));
                    }
                }
                _ => {}
            }
        }
    }

    /// Returns a poll deadline from now.
    pub(crate) fn deadline(timeout: Duration) -> Instant {
        Instant::now() + timeout
    }

    /// True while a poll loop may continue; sleeps one interval.
    pub(crate) async fn tick(deadline: Instant) -> bool {
        if Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
        true
    }
}
