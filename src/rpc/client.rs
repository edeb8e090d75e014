//! HTTP client wrapper issuing authenticated batched-execute calls.

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use reqwest::{Client, ClientBuilder};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::user_agent;
use crate::wire::{ACTION_TOKEN_KEY, BL_TOKEN_KEY, SessionTokens, encode_call, extract_embedded_token};

use super::error::RpcError;
use super::procedure::ProcedureId;

/// Default per-call deadline.
pub const DEFAULT_CALL_TIMEOUT_SECS: u64 = 30;

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Location of the batched-execute endpoint.
///
/// Configurable so integration tests can point the client at a mock server;
/// production use keeps the defaults.
#[derive(Debug, Clone)]
pub struct RpcEndpoint {
    /// Root of the target application (token acquisition fetches this).
    pub base_url: String,
    /// Path of the batched-execute endpoint under `base_url`.
    pub rpc_path: String,
    /// Value of the `source-path` query parameter.
    pub source_path: String,
}

impl RpcEndpoint {
    /// Creates an endpoint rooted at the given base URL with default paths.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            rpc_path: "/_/LabsTailwindUi/data/batchexecute".to_string(),
            source_path: "/".to_string(),
        }
    }

    /// Absolute URL of the batched-execute endpoint.
    #[must_use]
    pub fn rpc_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.rpc_path)
    }
}

impl Default for RpcEndpoint {
    fn default() -> Self {
        Self::new("https://notebooklm.google.com")
    }
}

/// Authenticated RPC client.
///
/// Owns one `reqwest::Client` (connection pooling, cookie jar) plus the
/// process-wide cached session tokens. Cloning is cheap via `Arc` wrapping
/// at the caller; the client itself is `Send + Sync`.
///
/// # Session refresh
///
/// Tokens are fetched lazily from the application's root HTML. The cache is
/// guarded by a `tokio::sync::Mutex` held across the refresh await, so
/// concurrent callers needing tokens collapse into one in-flight fetch:
/// late arrivals wait on the lock and reuse the freshly cached result.
#[derive(Debug)]
pub struct RpcClient {
    client: Client,
    endpoint: RpcEndpoint,
    call_timeout: Duration,
    session: Mutex<Option<SessionTokens>>,
}

impl RpcClient {
    /// Creates a client for the given endpoint with default timeouts.
    ///
    /// The cookie jar carries the browser session cookies that authenticate
    /// every request; without them token acquisition fails with
    /// [`RpcError::AuthRequired`].
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::ClientBuild`] when the HTTP client cannot be
    /// constructed.
    pub fn new(endpoint: RpcEndpoint, cookie_jar: Option<Arc<Jar>>) -> Result<Self, RpcError> {
        Self::with_timeout(endpoint, cookie_jar, Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS))
    }

    /// Creates a client with an explicit per-call deadline.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::ClientBuild`] when the HTTP client cannot be
    /// constructed.
    pub fn with_timeout(
        endpoint: RpcEndpoint,
        cookie_jar: Option<Arc<Jar>>,
        call_timeout: Duration,
    ) -> Result<Self, RpcError> {
        let mut builder = ClientBuilder::new()
            .user_agent(user_agent::browser_user_agent())
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            // Token acquisition must observe redirects rather than follow
            // them: a redirect to a login page counts as "reachable but not
            // signed in".
            .redirect(Policy::none())
            .gzip(true);
        if let Some(jar) = cookie_jar {
            builder = builder.cookie_provider(jar);
        }
        let client = builder.build().map_err(RpcError::ClientBuild)?;
        Ok(Self {
            client,
            endpoint,
            call_timeout,
            session: Mutex::new(None),
        })
    }

    /// Returns the endpoint this client talks to.
    #[must_use]
    pub fn endpoint(&self) -> &RpcEndpoint {
        &self.endpoint
    }

    /// Issues one procedure call and returns the raw response text.
    ///
    /// Ensures session tokens are present (single-flight fetch), encodes the
    /// envelope, POSTs with cookies included, and bounds the whole exchange
    /// with the configured deadline.
    ///
    /// # Errors
    ///
    /// - [`RpcError::AuthRequired`] when tokens cannot be obtained
    /// - [`RpcError::Timeout`] when the deadline elapses
    /// - [`RpcError::Transport`] for non-success HTTP statuses
    #[instrument(level = "debug", skip(self, args), fields(procedure = %procedure))]
    pub async fn call(&self, procedure: ProcedureId, args: &Value) -> Result<String, RpcError> {
        let tokens = self.ensure_tokens().await?;
        let encoded = encode_call(
            &self.endpoint.rpc_url(),
            &self.endpoint.source_path,
            procedure.as_str(),
            args,
            &tokens,
        );

        let exchange = async {
            let response = self
                .client
                .post(&encoded.url)
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded;charset=UTF-8")
                .body(encoded.body)
                .send()
                .await?;
            let status = response.status();
            if !status.is_success() {
                return Err(RpcError::Transport {
                    status: status.as_u16(),
                });
            }
            let text = response.text().await?;
            Ok(text)
        };

        match tokio::time::timeout(self.call_timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(RpcError::Timeout {
                secs: self.call_timeout.as_secs(),
            }),
        }
    }

    /// Drops the cached session tokens so the next call re-fetches.
    ///
    /// The server sends no explicit expiry signal; callers invalidate after
    /// a failed call and retry at their own discretion.
    pub async fn invalidate_session(&self) {
        let mut guard = self.session.lock().await;
        if guard.take().is_some() {
            debug!("session tokens invalidated");
        }
    }

    /// Returns cached tokens or fetches them, single-flight.
    ///
    /// The mutex is held across the fetch await on purpose: that is what
    /// collapses concurrent refreshes into one request.
    async fn ensure_tokens(&self) -> Result<SessionTokens, RpcError> {
        let mut guard = self.session.lock().await;
        if let Some(tokens) = guard.as_ref() {
            return Ok(tokens.clone());
        }
        let tokens = self.fetch_tokens().await?;
        *guard = Some(tokens.clone());
        Ok(tokens)
    }

    /// Fetches the application root HTML and scrapes both session tokens.
    ///
    /// A redirect status still counts as reachable (the policy does not
    /// follow it), but a redirected or anonymous page carries no tokens, so
    /// the extraction below turns it into [`RpcError::AuthRequired`].
    #[instrument(level = "debug", skip(self))]
    async fn fetch_tokens(&self) -> Result<SessionTokens, RpcError> {
        let response = tokio::time::timeout(
            self.call_timeout,
            self.client.get(&self.endpoint.base_url).send(),
        )
        .await
        .map_err(|_| RpcError::Timeout {
            secs: self.call_timeout.as_secs(),
        })?
        .map_err(|e| RpcError::auth_required(format!("app root unreachable: {e}")))?;

        let status = response.status();
        if !(status.is_success() || status.is_redirection()) {
            return Err(RpcError::auth_required(format!(
                "app root answered HTTP {status}"
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| RpcError::auth_required(format!("could not read app root: {e}")))?;

        let Some(at) = extract_embedded_token(ACTION_TOKEN_KEY, &html) else {
            warn!("action token missing from app root HTML");
            return Err(RpcError::auth_required("action token not found; log in first"));
        };
        let Some(bl) = extract_embedded_token(BL_TOKEN_KEY, &html) else {
            warn!("bl token missing from app root HTML");
            return Err(RpcError::auth_required("bl token not found; log in first"));
        };

        debug!("session tokens acquired");
        Ok(SessionTokens::new(bl, at))
    }
}
