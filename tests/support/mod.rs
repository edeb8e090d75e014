//! Shared fixtures for integration tests: batched-execute response bodies
//! and mock-server wiring.

#![allow(dead_code)]

use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path of the batched-execute endpoint (mirrors the client default).
pub const RPC_PATH: &str = "/_/LabsTailwindUi/data/batchexecute";

/// App-root HTML carrying both session tokens.
pub fn token_html() -> String {
    r#"<!doctype html><html><head><script>
window.WIZ_global_data = {"SNlM0e":"AEd6xL8test-at-token:1712","cfb2h":"boq_labs_20260801.06_p0"};
</script></head><body></body></html>"#
        .to_string()
}

/// Builds a batched-execute response embedding `payload` for `proc_id`.
pub fn rpc_response(proc_id: &str, payload: &Value) -> String {
    let row = serde_json::json!([[
        "wrb.fr",
        proc_id,
        payload.to_string(),
        serde_json::Value::Null,
        serde_json::Value::Null,
        serde_json::Value::Null,
        "generic"
    ]]);
    let line = row.to_string();
    format!(")]}}'\n\n{}\n{line}\n25\n[[\"di\",59],[\"af.httprm\",59,\"1\"]]\n", line.len())
}

/// Same as [`rpc_response`] but with an inline error marker appended.
pub fn rpc_response_with_code(proc_id: &str, payload: &Value, code: i64) -> String {
    let row = serde_json::json!([
        ["wrb.fr", proc_id, payload.to_string()],
        ["e", 4, serde_json::Value::Null, serde_json::Value::Null, code]
    ]);
    format!(")]}}'\n{row}\n")
}

/// Mounts the app-root mock that serves session tokens.
pub async fn mount_token_page(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(token_html()))
        .mount(server)
        .await;
}

/// Extracts and decodes the `f.req` JSON envelope from a form body.
pub fn decode_freq(body: &str) -> Value {
    let encoded = body
        .split('&')
        .find_map(|pair| pair.strip_prefix("f.req="))
        .expect("body has f.req field");
    let decoded = urlencoding::decode(encoded).expect("f.req is url-encoded");
    serde_json::from_str(&decoded).expect("f.req is JSON")
}

/// Returns the inner positional-args array of an `f.req` envelope.
pub fn decode_call_args(body: &str) -> Value {
    let envelope = decode_freq(body);
    let args_json = envelope[0][0][1].as_str().expect("args are a JSON string");
    serde_json::from_str(args_json).expect("args parse")
}
