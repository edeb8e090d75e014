//! Session-token scraping from the target application's served HTML.
//!
//! The application embeds its per-session values in a JSON blob inside the
//! page it serves to logged-in browsers. There is no documented way to
//! obtain them; the client regex-extracts the two it needs.

use std::fmt;

use regex::Regex;
use tracing::debug;

/// JSON key under which the action (`at`) token is embedded in served HTML.
pub const ACTION_TOKEN_KEY: &str = "SNlM0e";

/// JSON key under which the backend-release (`bl`) token is embedded.
pub const BL_TOKEN_KEY: &str = "cfb2h";

/// Session tokens required on every RPC call.
///
/// Both values are scraped from the application's HTML and are only valid
/// for the browser session whose cookies fetched that HTML. They carry no
/// expiry signal; the client caches them process-wide until a call fails.
///
/// The `Debug` impl redacts token values to keep them out of logs.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionTokens {
    /// Backend-release token, sent as the `bl` query parameter.
    pub bl: String,
    /// Action token, sent as the `at` form field.
    pub at: String,
    /// Active user slot for multi-login browser profiles (0 = default).
    pub auth_user: u32,
}

impl SessionTokens {
    /// Creates a token set for the default user slot.
    #[must_use]
    pub fn new(bl: impl Into<String>, at: impl Into<String>) -> Self {
        Self {
            bl: bl.into(),
            at: at.into(),
            auth_user: 0,
        }
    }
}

impl fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTokens")
            .field("bl", &"[REDACTED]")
            .field("at", &"[REDACTED]")
            .field("auth_user", &self.auth_user)
            .finish()
    }
}

/// Extracts a `"<key>":"<value>"` pair embedded in raw HTML.
///
/// Returns `None` when the key is absent. Absence of either session token
/// key is the signal that the user is not logged into the target site.
#[must_use]
pub fn extract_embedded_token(key: &str, html: &str) -> Option<String> {
    // Keys are short alphanumeric identifiers; escape anyway so a future
    // table entry with a metacharacter cannot corrupt the pattern.
    let pattern = format!(r#""{}":"([^"]+)""#, regex::escape(key));
    let re = Regex::new(&pattern).ok()?;
    let value = re.captures(html)?.get(1)?.as_str().to_string();
    debug!(key, "extracted embedded token");
    Some(value)
}
