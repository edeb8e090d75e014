//! Request/response envelope for the batched-execute transport.

use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, trace};

use super::tokens::SessionTokens;

/// Marker substring identifying the payload line of a batched response.
pub const RESPONSE_MARKER: &str = "wrb.fr";

/// Inline error marker pattern: `["e",4,null,null,<code>]`.
///
/// The marker may co-occur with a real payload on logically successful
/// calls; classification of the code is the caller's job.
#[allow(clippy::expect_used)]
static ERROR_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\["e"\s*,\s*4\s*,\s*null\s*,\s*null\s*,\s*(\d+)"#)
        .expect("error marker regex is valid") // Static pattern, safe to panic
});

/// A fully encoded RPC call ready to POST.
#[derive(Debug, Clone)]
pub struct EncodedCall {
    /// Absolute URL including the batched-execute query parameters.
    pub url: String,
    /// Form-encoded request body (`f.req` + `at`).
    pub body: String,
}

/// Encodes a procedure call into the batched-execute envelope.
///
/// The positional `args` array is JSON-stringified and nested inside the
/// wrapper array tagged with the procedure id and the literal `"generic"`
/// discriminator. A random 6-digit correlation id is attached per call;
/// the `authuser` parameter is only present for non-default user slots.
#[must_use]
pub fn encode_call(
    rpc_url: &str,
    source_path: &str,
    procedure: &str,
    args: &Value,
    tokens: &SessionTokens,
) -> EncodedCall {
    let inner = args.to_string();
    let envelope = Value::Array(vec![Value::Array(vec![Value::Array(vec![
        Value::String(procedure.to_string()),
        Value::String(inner),
        Value::Null,
        Value::String("generic".to_string()),
    ])])]);

    let req_id: u32 = rand::thread_rng().gen_range(100_000..1_000_000);

    let mut url = format!(
        "{rpc_url}?rpcids={procedure}&source-path={}&bl={}&_reqid={req_id}&rt=c",
        urlencoding::encode(source_path),
        urlencoding::encode(&tokens.bl),
    );
    if tokens.auth_user != 0 {
        url.push_str(&format!("&authuser={}", tokens.auth_user));
    }

    let body = format!(
        "f.req={}&at={}&",
        urlencoding::encode(&envelope.to_string()),
        urlencoding::encode(&tokens.at),
    );

    trace!(procedure, req_id, "encoded RPC call");
    EncodedCall { url, body }
}

/// Decodes a batched-execute response body into the embedded JSON payload.
///
/// The body is a sequence of length-prefixed chunks; the line of interest
/// contains [`RESPONSE_MARKER`] and parses as a JSON array whose third
/// element is a *string* containing further JSON, so a double decode is
/// required. Returns `None` when the marker line is absent or either decode
/// fails. Never panics on malformed bodies: upstream schema drift is
/// expected and must degrade to "no data".
#[must_use]
pub fn decode_response(text: &str) -> Option<Value> {
    let line = text.lines().find(|line| line.contains(RESPONSE_MARKER))?;
    let outer: Value = serde_json::from_str(line.trim()).ok()?;

    let payload = marker_payload(&outer)?;
    let decoded: Value = serde_json::from_str(payload).ok()?;
    debug!("decoded RPC response payload");
    Some(decoded)
}

/// Walks the outer array for the `[marker, proc, "<json>"]` element and
/// returns the embedded JSON string.
fn marker_payload(outer: &Value) -> Option<&str> {
    let rows = outer.as_array()?;
    for row in rows {
        let Some(fields) = row.as_array() else {
            // The line may already be the inner row rather than a batch.
            continue;
        };
        if fields.first().and_then(Value::as_str) == Some(RESPONSE_MARKER) {
            if let Some(payload) = fields.get(2).and_then(Value::as_str) {
                return Some(payload);
            }
        }
    }
    // Single-row form: the parsed line itself is the marker row.
    if rows.first().and_then(Value::as_str) == Some(RESPONSE_MARKER) {
        return rows.get(2).and_then(Value::as_str);
    }
    None
}

/// Finds the inline `["e",4,null,null,<code>]` error marker, if present.
#[must_use]
pub fn find_error_code(text: &str) -> Option<i64> {
    let captures = ERROR_MARKER_RE.captures(text)?;
    captures.get(1)?.as_str().parse().ok()
}
