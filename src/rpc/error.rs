//! RPC client error types.

use thiserror::Error;

/// Errors raised by [`super::RpcClient`] operations.
#[derive(Debug, Error)]
pub enum RpcError {
    /// No valid session tokens could be obtained.
    ///
    /// This is the signal that the user is not logged into the target site
    /// in the browser profile whose cookies were loaded. Surfaced directly;
    /// never retried automatically.
    #[error("not signed in to the notebook app: session tokens unavailable ({reason})")]
    AuthRequired {
        /// What went wrong while acquiring tokens.
        reason: String,
    },

    /// A call exceeded its deadline.
    #[error("RPC call timed out after {secs}s")]
    Timeout {
        /// The configured deadline in seconds.
        secs: u64,
    },

    /// The endpoint answered with a non-success HTTP status.
    #[error("RPC transport failure: HTTP {status}")]
    Transport {
        /// The HTTP status code returned.
        status: u16,
    },

    /// The underlying HTTP request failed before a status was available.
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl RpcError {
    /// Creates an [`RpcError::AuthRequired`] with the given reason.
    #[must_use]
    pub fn auth_required(reason: impl Into<String>) -> Self {
        Self::AuthRequired {
            reason: reason.into(),
        }
    }
}
