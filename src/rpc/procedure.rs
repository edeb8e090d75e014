//! The table of known remote procedures and inline error-code policy.
//!
//! Every id and code in this file was captured empirically from live
//! traffic; none of it is documented by the server. Ids and the benign
//! allow-list are kept as data so a server-side change is an edit here,
//! not a control-flow change.

/// Identifier of a remote procedure on the batched-execute endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcedureId(&'static str);

impl ProcedureId {
    /// List the user's notebooks.
    pub const LIST_NOTEBOOKS: Self = Self("wXbhsf");
    /// Create a notebook with a given name.
    pub const CREATE_NOTEBOOK: Self = Self("CCqFvf");
    /// Rename an existing notebook.
    pub const RENAME_NOTEBOOK: Self = Self("s0tc2d");
    /// Add a source (text, URL, or file payload) to a notebook.
    pub const ADD_SOURCE: Self = Self("izAoDd");
    /// Delete one batch of sources from a notebook.
    pub const DELETE_SOURCES: Self = Self("tGMBJc");
    /// Fetch a notebook's metadata and source list.
    pub const NOTEBOOK_DETAIL: Self = Self("rLM1Ne");
    /// Fetch a notebook's notes and mindmaps.
    pub const NOTES_AND_MINDMAPS: Self = Self("cFji9c");
    /// Fetch a notebook's chat history.
    pub const CHAT_HISTORY: Self = Self("hPCzQc");
    /// Fetch a notebook's generated-artifact list.
    pub const ARTIFACT_LIST: Self = Self("LfTqmc");
    /// Fetch the interactive content of one artifact.
    pub const ARTIFACT_CONTENT: Self = Self("VfAZjd");
    /// Fetch the full text of one source.
    pub const SOURCE_TEXT: Self = Self("hizoJc");
    /// Fetch the guide/summary of one source (fallback for full text).
    pub const SOURCE_GUIDE: Self = Self("tr032e");

    /// Returns the wire-format id string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for ProcedureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inline error codes that still indicate the operation was accepted and is
/// processing asynchronously.
///
/// Reverse-engineered by observation and possibly incomplete; a code outside
/// this list is a genuine failure, never a silent success.
pub const BENIGN_RPC_CODES: &[i64] = &[412];

/// Classification of an inline RPC error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcCodeClass {
    /// Operation accepted; the server is processing asynchronously.
    Benign,
    /// Genuine failure to surface to the caller.
    Fatal,
}

/// Classifies an inline error code against the benign allow-list.
///
/// Total over all `i64`: every code maps to exactly one class.
#[must_use]
pub fn classify_rpc_code(code: i64) -> RpcCodeClass {
    if BENIGN_RPC_CODES.contains(&code) {
        RpcCodeClass::Benign
    } else {
        RpcCodeClass::Fatal
    }
}
