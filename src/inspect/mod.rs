//! Live-page extraction for content no RPC exposes.
//!
//! Chat transcript text, rendered slide images, and interactive
//! flashcard/quiz payloads are only observable through the DOM of a live
//! page showing the target application — markup that is neither versioned
//! nor stable. This module treats such a page as a queryable, best-effort
//! data source.
//!
//! # Architecture
//!
//! - [`PageInspector`] - Capability trait for the browser-automation host.
//!   Only implementations of this trait touch a real browser; everything
//!   else in the crate stays testable without one.
//! - [`ExtractionEngine`] - Orchestration: tab acquisition and reuse,
//!   ordered multi-strategy extraction, bounded polling, guaranteed
//!   background-tab cleanup.
//!
//! # Failure semantics
//!
//! Every extraction function returns its empty value (`Vec::new()`,
//! `None`) on any failure: missing tab, script rejection, timeout. This
//! component augments RPC data; its absence must never block an export of
//! data the repository already produced.

mod artifact;
mod chat;
mod engine;
mod images;
pub(crate) mod scripts;

pub use engine::ExtractionEngine;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Identifier of a browser tab managed by the inspector host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TabId(pub i64);

impl std::fmt::Display for TabId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tab#{}", self.0)
    }
}

/// Which frames a script runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameScope {
    /// Top frame only.
    Top,
    /// Every frame, including third-party-hosted iframes; results from all
    /// frames are returned as an array.
    All,
}

/// Errors from the inspector host.
///
/// These never escape the extraction engine; they exist so implementations
/// can report precisely and the engine can log before degrading to empty.
#[derive(Debug, Error)]
pub enum InspectorError {
    /// The referenced tab no longer exists.
    #[error("tab not found")]
    TabNotFound,
    /// The host refused to inject or run the script.
    #[error("script injection rejected: {0}")]
    ScriptRejected(String),
    /// A host operation exceeded its deadline.
    #[error("inspector operation timed out")]
    Timeout,
    /// Any other host-side failure.
    #[error("inspector backend error: {0}")]
    Backend(String),
}

/// Capability boundary to the browser-automation host.
///
/// The engine only requires that the host can run read-only extraction
/// scripts in a given tab/frame and return their JSON-serializable result,
/// manage tab lifecycle, and simulate a click. Implementations wrap the
/// real extension/driver APIs.
#[async_trait]
pub trait PageInspector: Send + Sync {
    /// Finds an existing tab whose URL contains the fragment.
    async fn find_tab(&self, url_fragment: &str) -> Option<TabId>;

    /// Opens a new tab; background tabs must not steal focus.
    async fn open_tab(&self, url: &str, background: bool) -> Result<TabId, InspectorError>;

    /// Navigates an existing tab.
    async fn navigate(&self, tab: TabId, url: &str) -> Result<(), InspectorError>;

    /// Resolves when the tab reports load-complete.
    ///
    /// Note the target is a client-rendered app that keeps building its DOM
    /// after the browser's load event; callers add their own settle delay.
    async fn wait_for_load(
        &self,
        tab: TabId,
        timeout: std::time::Duration,
    ) -> Result<(), InspectorError>;

    /// Runs a read-only script and returns its JSON-serialized result.
    async fn execute(
        &self,
        tab: TabId,
        frames: FrameScope,
        script: &str,
    ) -> Result<Value, InspectorError>;

    /// Simulates a click on the first element matching the selector.
    /// Returns whether an element was found.
    async fn click(&self, tab: TabId, selector: &str) -> Result<bool, InspectorError>;

    /// Closes a tab. Implementations should tolerate already-closed tabs.
    async fn close_tab(&self, tab: TabId) -> Result<(), InspectorError>;
}
