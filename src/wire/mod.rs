//! Batched-RPC wire codec for the target notebook application.
//!
//! The target application exposes no documented API. Every call travels
//! through a single batched-execute endpoint: a form-encoded POST whose
//! `f.req` field wraps the procedure id and a JSON-stringified positional
//! argument array, answered by an anti-XSSI, length-prefixed multi-line
//! body in which exactly one line carries the payload of interest.
//!
//! This module owns that envelope in both directions, plus the scraping of
//! the two session tokens the envelope requires from the application's
//! served HTML. Decoding is deliberately infallible in signature: the remote
//! schema drifts without notice, and a malformed body must degrade to
//! "no data" rather than crash the pipeline.

mod envelope;
mod tokens;

pub use envelope::{EncodedCall, RESPONSE_MARKER, decode_response, encode_call, find_error_code};
pub use tokens::{
    ACTION_TOKEN_KEY, BL_TOKEN_KEY, SessionTokens, extract_embedded_token,
};
