//! Sequential upload pipeline from captured content to notebook sources.
//!
//! Concurrency is intentionally 1: the remote application's session-token
//! refresh and per-notebook source list are not safe to hit concurrently
//! from this client without risking duplicate submissions, and a fixed
//! delay between items keeps the remote side's own rate limiting quiet.
//!
//! # Architecture
//!
//! - [`UploadItem`] / [`UploadStatus`] - Item model and state machine
//! - [`dedup`] - Title/URL normalization and duplicate detection
//! - [`UploadQueue`] - Single-flight FIFO drain with per-item isolation

pub mod dedup;

mod item;

pub use item::{UploadItem, UploadKind, UploadPayload, UploadStatus};

use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::chunk::split_text;
use crate::queue::dedup::{find_duplicate, normalize_title};
use crate::repository::{Repository, Source};

/// Text above this many chars is split into parts before submission.
pub const CHUNK_THRESHOLD: usize = 225_000;

/// Overlap carried between consecutive parts.
pub const CHUNK_OVERLAP: usize = 1_000;

/// Tuning knobs for the drain loop.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Chunking threshold and chunk size, in chars.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks, in chars.
    pub chunk_overlap: usize,
    /// Pause between queue items.
    pub inter_item_delay: Duration,
    /// Pause between chunks of one oversized item.
    pub inter_chunk_delay: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            chunk_size: CHUNK_THRESHOLD,
            chunk_overlap: CHUNK_OVERLAP,
            inter_item_delay: Duration::from_secs(1),
            inter_chunk_delay: Duration::from_millis(500),
        }
    }
}

/// Explicit drain state; the single-flight guarantee hangs off this tag
/// rather than a bare boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DrainState {
    Idle,
    Processing,
}

/// Summary of one `process()` run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Whether this call performed the drain (false = another drain was
    /// already in flight and this call returned immediately).
    pub started: bool,
    /// Items that reached `done`.
    pub done: usize,
    /// Items that reached `error`.
    pub failed: usize,
}

/// Sequential, single-flight upload queue for one notebook.
pub struct UploadQueue {
    repository: Repository,
    notebook_id: String,
    items: Mutex<Vec<UploadItem>>,
    drain: Mutex<DrainState>,
    config: QueueConfig,
}

impl UploadQueue {
    /// Creates an empty queue targeting one notebook.
    #[must_use]
    pub fn new(repository: Repository, notebook_id: impl Into<String>) -> Self {
        Self::with_config(repository, notebook_id, QueueConfig::default())
    }

    /// Creates a queue with explicit tuning.
    #[must_use]
    pub fn with_config(
        repository: Repository,
        notebook_id: impl Into<String>,
        config: QueueConfig,
    ) -> Self {
        Self {
            repository,
            notebook_id: notebook_id.into(),
            items: Mutex::new(Vec::new()),
            drain: Mutex::new(DrainState::Idle),
            config,
        }
    }

    /// Adds an item; returns its local id.
    pub async fn enqueue(&self, item: UploadItem) -> u64 {
        let id = item.id;
        self.items.lock().await.push(item);
        debug!(id, "enqueued upload item");
        id
    }

    /// Snapshot of all items.
    pub async fn items(&self) -> Vec<UploadItem> {
        self.items.lock().await.clone()
    }

    /// Removes an item by local id (user dismissal).
    pub async fn remove(&self, id: u64) -> bool {
        let mut items = self.items.lock().await;
        let before = items.len();
        items.retain(|item| item.id != id);
        items.len() != before
    }

    /// Drains all currently pending items, FIFO, sequentially.
    ///
    /// Single-flight: when a drain is already running, this returns
    /// immediately with `started == false` instead of starting a second
    /// one. One item's failure never halts the rest; every drained item
    /// reaches a terminal state.
    #[instrument(level = "info", skip(self), fields(notebook = %self.notebook_id))]
    pub async fn process(&self) -> DrainReport {
        {
            let mut state = self.drain.lock().await;
            if *state == DrainState::Processing {
                debug!("drain already in flight, skipping");
                return DrainReport::default();
            }
            *state = DrainState::Processing;
        }

        let report = self.drain_all().await;

        *self.drain.lock().await = DrainState::Idle;
        info!(done = report.done, failed = report.failed, "queue drained");
        report
    }

    async fn drain_all(&self) -> DrainReport {
        let mut report = DrainReport {
            started: true,
            ..DrainReport::default()
        };

        loop {
            let next = {
                let mut items = self.items.lock().await;
                match items
                    .iter_mut()
                    .find(|item| item.status == UploadStatus::Pending)
                {
                    Some(item) => {
                        item.status = UploadStatus::Processing;
                        Some(item.clone())
                    }
                    None => None,
                }
            };
            let Some(item) = next else { break };

            match self.submit_item(&item).await {
                Ok(()) => {
                    report.done += 1;
                    self.update_item(item.id, |it| {
                        it.status = UploadStatus::Done;
                        it.progress = 100;
                    })
                    .await;
                }
                Err(message) => {
                    report.failed += 1;
                    warn!(id = item.id, %message, "upload item failed");
                    self.update_item(item.id, |it| {
                        it.status = UploadStatus::Error;
                        it.message = Some(message);
                    })
                    .await;
                }
            }

            let more_pending = self
                .items
                .lock()
                .await
                .iter()
                .any(|it| it.status == UploadStatus::Pending);
            if more_pending {
                tokio::time::sleep(self.config.inter_item_delay).await;
            }
        }
        report
    }

    /// Submits one item; the error string becomes the item message.
    async fn submit_item(&self, item: &UploadItem) -> Result<(), String> {
        let sources = self.current_sources().await?;
        if let Some(existing) = find_duplicate(&sources, &item.title, item.url()) {
            // Deliberate soft stop, not a hard failure: the content is
            // already in the notebook.
            return Err(format!("already exists: \"{}\"", existing.title));
        }

        match &item.payload {
            UploadPayload::Link { url } => self
                .repository
                .add_url_source(&self.notebook_id, url)
                .await
                .map_err(|e| e.to_string()),
            UploadPayload::File {
                filename,
                mime,
                bytes,
            } => self
                .repository
                .add_file_source(&self.notebook_id, filename, mime, bytes)
                .await
                .map_err(|e| e.to_string()),
            UploadPayload::Text { text } => {
                if text.chars().count() > self.config.chunk_size {
                    self.submit_chunked(item, text).await
                } else {
                    self.repository
                        .add_text_source(&self.notebook_id, &item.title, text)
                        .await
                        .map_err(|e| e.to_string())
                }
            }
        }
    }

    /// Splits oversized text and submits each part as its own source.
    ///
    /// Every part gets its own duplicate check against a fresh source
    /// list, so a re-run after a partial failure skips the parts that
    /// already landed, and a best-effort existence check follows each
    /// submission.
    async fn submit_chunked(&self, item: &UploadItem, text: &str) -> Result<(), String> {
        let chunks = split_text(text, self.config.chunk_size, self.config.chunk_overlap);
        let total = chunks.len();
        debug!(id = item.id, total, "submitting oversized text in parts");

        for chunk in &chunks {
            let part = chunk.index + 1;
            let part_title = format!("{} (Part {part}/{total})", item.title);
            self.update_item(item.id, |it| {
                it.chunk_index = Some(part);
                it.total_chunks = Some(total);
                #[allow(clippy::cast_possible_truncation)]
                {
                    it.progress = ((chunk.index * 100) / total) as u8;
                }
            })
            .await;

            let sources = self.current_sources().await?;
            if find_duplicate(&sources, &part_title, None).is_some() {
                debug!(%part_title, "part already present, skipping");
                continue;
            }

            self.repository
                .add_text_source(&self.notebook_id, &part_title, &chunk.text)
                .await
                .map_err(|e| format!("part {part}/{total}: {e}"))?;

            tokio::time::sleep(self.config.inter_chunk_delay).await;
            self.confirm_part_landed(&part_title).await;
        }
        Ok(())
    }

    /// Best-effort post-submit existence check for a chunk title.
    async fn confirm_part_landed(&self, part_title: &str) {
        match self.current_sources().await {
            Ok(sources) => {
                let wanted = normalize_title(part_title);
                if !sources
                    .iter()
                    .any(|s| normalize_title(&s.title) == wanted)
                {
                    // The add may still be processing asynchronously; this
                    // is informational, not a failure.
                    debug!(%part_title, "part not yet visible in source list");
                }
            }
            Err(error) => debug!(%error, "existence check skipped"),
        }
    }

    async fn current_sources(&self) -> Result<Vec<Source>, String> {
        self.repository
            .notebook_detail(&self.notebook_id)
            .await
            .map(|detail| detail.sources)
            .map_err(|e| format!("could not load source list: {e}"))
    }

    async fn update_item(&self, id: u64, apply: impl FnOnce(&mut UploadItem)) {
        let mut items = self.items.lock().await;
        if let Some(item) = items.iter_mut().find(|item| item.id == id) {
            apply(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_protocol_limits() {
        let config = QueueConfig::default();
        assert_eq!(config.chunk_size, 225_000);
        assert_eq!(config.chunk_overlap, 1_000);
        assert_eq!(config.inter_item_delay, Duration::from_secs(1));
    }

    #[test]
    fn test_drain_report_default_is_not_started() {
        let report = DrainReport::default();
        assert!(!report.started);
        assert_eq!(report.done, 0);
        assert_eq!(report.failed, 0);
    }
}
