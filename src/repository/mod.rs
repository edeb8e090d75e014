//! Higher-level notebook operations built on the RPC client.
//!
//! Each operation targets one fixed procedure id and parses a response
//! whose structure is an undocumented implementation detail of the remote
//! server. Parsers are layered (fixed index paths, then structural search,
//! then contextual guessing — see [`parse`]) and never fail on unexpected
//! shapes: partial or asynchronous server-side processing is normal, and
//! "no data yet" must not crash the pipeline.
//!
//! Network and protocol failures, by contrast, are typed and propagate to
//! the caller.

pub mod parse;

mod content;
mod notebooks;
mod sources;
mod types;

pub(crate) use content::{parse_flashcards, parse_quiz, parse_table};
pub use types::{
    Artifact, ArtifactKind, ChatMessage, ChatRole, DataTable, Flashcard, MindmapNode, Note,
    Notebook, NotebookContent, NotebookDetail, QuizQuestion, Report, ResourceStatus, Slide,
    Source, SourceKind, SOURCE_KIND_TABLE,
};

use std::sync::Arc;

use thiserror::Error;

use crate::rpc::{RpcClient, RpcCodeClass, RpcError, classify_rpc_code};
use crate::wire;

/// Errors raised by repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The underlying RPC call failed.
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// Notebook creation returned no server-issued id.
    #[error("notebook creation failed: no id found in response")]
    CreateFailed,

    /// The server embedded an inline error code outside the benign
    /// allow-list. The allow-list is empirically derived and may need
    /// extension, so the offending code is carried for diagnosis.
    #[error("server rejected the operation with code {code}")]
    UnexpectedRpc {
        /// The inline error code.
        code: i64,
    },
}

/// Notebook/source/artifact operations against the remote application.
///
/// Thin stateless facade over an [`RpcClient`]; cheap to clone.
#[derive(Debug, Clone)]
pub struct Repository {
    client: Arc<RpcClient>,
}

impl Repository {
    /// Creates a repository over the given client.
    #[must_use]
    pub fn new(client: Arc<RpcClient>) -> Self {
        Self { client }
    }

    /// Returns the underlying RPC client.
    #[must_use]
    pub fn client(&self) -> &Arc<RpcClient> {
        &self.client
    }

    /// Checks a raw response for an inline error code.
    ///
    /// Benign codes (accepted, processing asynchronously) pass; anything
    /// else is a genuine failure. Used by mutating operations, where the
    /// marker can co-occur with a logically successful payload.
    pub(crate) fn check_inline_code(text: &str) -> Result<(), RepositoryError> {
        if let Some(code) = wire::find_error_code(text) {
            match classify_rpc_code(code) {
                RpcCodeClass::Benign => {
                    tracing::debug!(code, "inline code is benign (async processing)");
                }
                RpcCodeClass::Fatal => return Err(RepositoryError::UnexpectedRpc { code }),
            }
        }
        Ok(())
    }
}
