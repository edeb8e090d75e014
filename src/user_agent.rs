//! Shared User-Agent policy for RPC traffic.
//!
//! The target application serves its RPC endpoint to browsers only; requests
//! that do not look like a mainstream browser get bounced to an interstitial.
//! All traffic therefore uses one browser-equivalent UA string, matching the
//! browser profile whose session cookies authenticate the requests.

/// Browser-equivalent User-Agent sent on every request.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Returns the User-Agent used for all RPC and token-acquisition requests.
#[must_use]
pub fn browser_user_agent() -> &'static str {
    BROWSER_USER_AGENT
}
