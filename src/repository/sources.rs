//! Source ingestion, deletion, and full-text retrieval.
//!
//! The positional argument layouts in [`add_source_args`] are a fixed but
//! undocumented contract with the remote server. Changes there are the
//! single biggest source of breakage, so every shape lives in this one
//! module and nowhere else.

use std::collections::{HashMap, VecDeque};

use serde_json::{Value, json};
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::rpc::ProcedureId;
use crate::wire;

use super::parse::{find_longest_string, looks_like_uuid, str_at};
use super::{Repository, RepositoryError};

/// Sources deleted per RPC call; the server silently drops larger batches.
pub const DELETE_BATCH_SIZE: usize = 20;

/// Default worker count for bulk source-text loading.
pub const SOURCE_LOAD_CONCURRENCY: usize = 3;

/// Positional argument builders for the three known add-source shapes.
pub(crate) mod add_source_args {
    use super::{Value, json};
    use base64::Engine as _;

    /// Pasted/captured text source.
    pub fn text(notebook_id: &str, title: &str, text: &str) -> Value {
        json!([[[null, [title, text], null, 2]], notebook_id])
    }

    /// Link source (web page or YouTube).
    pub fn url(notebook_id: &str, url: &str) -> Value {
        json!([[[null, null, [url]]], notebook_id])
    }

    /// Binary file source; bytes travel base64-encoded inside the array.
    pub fn file(notebook_id: &str, filename: &str, mime: &str, bytes: &[u8]) -> Value {
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        json!([[[[filename, encoded, mime]]], notebook_id])
    }
}

impl Repository {
    /// Adds a text source to a notebook.
    ///
    /// # Errors
    ///
    /// RPC failures and fatal inline codes propagate; benign codes
    /// (accepted, processing asynchronously) are success.
    #[instrument(level = "debug", skip(self, text), fields(len = text.len()))]
    pub async fn add_text_source(
        &self,
        notebook_id: &str,
        title: &str,
        text: &str,
    ) -> Result<(), RepositoryError> {
        let args = add_source_args::text(notebook_id, title, text);
        let response = self.client().call(ProcedureId::ADD_SOURCE, &args).await?;
        Self::check_inline_code(&response)
    }

    /// Adds a URL source (web page or YouTube link) to a notebook.
    ///
    /// # Errors
    ///
    /// RPC failures and fatal inline codes propagate.
    #[instrument(level = "debug", skip(self))]
    pub async fn add_url_source(
        &self,
        notebook_id: &str,
        url: &str,
    ) -> Result<(), RepositoryError> {
        let args = add_source_args::url(notebook_id, url);
        let response = self.client().call(ProcedureId::ADD_SOURCE, &args).await?;
        Self::check_inline_code(&response)
    }

    /// Adds a binary file source to a notebook.
    ///
    /// # Errors
    ///
    /// RPC failures and fatal inline codes propagate.
    #[instrument(level = "debug", skip(self, bytes), fields(len = bytes.len()))]
    pub async fn add_file_source(
        &self,
        notebook_id: &str,
        filename: &str,
        mime: &str,
        bytes: &[u8],
    ) -> Result<(), RepositoryError> {
        let args = add_source_args::file(notebook_id, filename, mime, bytes);
        let response = self.client().call(ProcedureId::ADD_SOURCE, &args).await?;
        Self::check_inline_code(&response)
    }

    /// Deletes sources in batches of [`DELETE_BATCH_SIZE`].
    ///
    /// The server does not echo per-item success, so the return value is
    /// the count of deletions *attempted* across all batches.
    ///
    /// # Errors
    ///
    /// RPC failures and fatal inline codes propagate; batches already sent
    /// stay deleted.
    #[instrument(level = "debug", skip(self, source_ids), fields(count = source_ids.len()))]
    pub async fn delete_sources(
        &self,
        notebook_id: &str,
        source_ids: &[String],
    ) -> Result<usize, RepositoryError> {
        let mut attempted = 0;
        for batch in source_ids.chunks(DELETE_BATCH_SIZE) {
            let nested: Vec<Value> = batch.iter().map(|id| json!([[id]])).collect();
            let args = json!([nested, notebook_id]);
            let response = self.client().call(ProcedureId::DELETE_SOURCES, &args).await?;
            Self::check_inline_code(&response)?;
            attempted += batch.len();
            debug!(batch = batch.len(), attempted, "deleted source batch");
        }
        Ok(attempted)
    }

    /// Fetches the full text of one source.
    ///
    /// Primary procedure first; when it yields nothing, the guide/summary
    /// procedure is tried (its argument array is quadruple-nested around a
    /// single element, an observed quirk of that endpoint). Both parsers
    /// fall back to the longest text string anywhere in the decoded tree.
    ///
    /// # Errors
    ///
    /// Only the primary call's RPC failures propagate; a failing guide
    /// call degrades to `None`.
    #[instrument(level = "debug", skip(self))]
    pub async fn source_text(
        &self,
        notebook_id: &str,
        source_id: &str,
    ) -> Result<Option<String>, RepositoryError> {
        let response = self
            .client()
            .call(ProcedureId::SOURCE_TEXT, &json!([notebook_id, [source_id]]))
            .await?;
        if let Some(text) = parse_text_payload(&response, &[0, 1]) {
            return Ok(Some(text));
        }

        debug!("primary source-text call yielded nothing, trying guide");
        let guide_args = json!([[[[source_id]]]]);
        match self.client().call(ProcedureId::SOURCE_GUIDE, &guide_args).await {
            Ok(response) => Ok(parse_text_payload(&response, &[0, 0])),
            Err(error) => {
                warn!(%error, "guide fallback failed");
                Ok(None)
            }
        }
    }

    /// Loads full text for many sources with a fixed-size worker pool.
    ///
    /// Workers pull ids from a shared queue; per-id failures are logged and
    /// skipped, never aborting siblings. Returns a map of id to text for
    /// the sources that yielded anything.
    #[instrument(level = "debug", skip(self, source_ids), fields(count = source_ids.len()))]
    pub async fn load_many_source_texts(
        &self,
        notebook_id: &str,
        source_ids: &[String],
        concurrency: usize,
    ) -> HashMap<String, String> {
        let pending: Mutex<VecDeque<String>> =
            Mutex::new(source_ids.iter().cloned().collect());
        let results: Mutex<HashMap<String, String>> = Mutex::new(HashMap::new());

        let pool_size = concurrency.clamp(1, source_ids.len().max(1));
        let workers = (0..pool_size).map(|worker| {
            let pending = &pending;
            let results = &results;
            async move {
                loop {
                    let Some(id) = pending.lock().await.pop_front() else {
                        break;
                    };
                    match self.source_text(notebook_id, &id).await {
                        Ok(Some(text)) => {
                            results.lock().await.insert(id, text);
                        }
                        Ok(None) => debug!(worker, id, "source yielded no text"),
                        Err(error) => warn!(worker, id, %error, "skipping source"),
                    }
                }
            }
        });
        futures_util::future::join_all(workers).await;
        results.into_inner()
    }
}

/// Decodes a response and extracts text: fixed path first, longest-string
/// fallback second. UUID-shaped strings are never the payload.
fn parse_text_payload(response: &str, path: &[usize]) -> Option<String> {
    let payload = wire::decode_response(response)?;
    if let Some(text) = str_at(&payload, path).filter(|s| !s.is_empty()) {
        return Some(text.to_string());
    }
    find_longest_string(&payload)
        .filter(|s| !s.is_empty() && !looks_like_uuid(s))
        .map(ToString::to_string)
}
