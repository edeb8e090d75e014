//! Integration tests for the RPC client: token acquisition, single-flight
//! refresh, envelope wiring, and failure classification.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use notebridge_core::rpc::{ProcedureId, RpcClient, RpcEndpoint, RpcError};

mod support;
use support::{RPC_PATH, mount_token_page, rpc_response};

fn client_for(server: &MockServer) -> RpcClient {
    RpcClient::new(RpcEndpoint::new(server.uri()), None).expect("client builds")
}

#[tokio::test]
async fn test_call_fetches_tokens_then_posts() {
    let server = MockServer::start().await;
    mount_token_page(&server).await;
    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .and(query_param("rpcids", "wXbhsf"))
        .and(query_param("bl", "boq_labs_20260801.06_p0"))
        .and(query_param("rt", "c"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(rpc_response("wXbhsf", &json!([[]]))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let text = client
        .call(ProcedureId::LIST_NOTEBOOKS, &json!([null, 1]))
        .await
        .expect("call succeeds");
    assert!(text.contains("wrb.fr"));

    // Exactly one GET for tokens, one POST for the call.
    let requests = server.received_requests().await.expect("requests recorded");
    assert_eq!(requests.len(), 2);
    let post = &requests[1];
    let body = String::from_utf8_lossy(&post.body).to_string();
    assert!(body.contains("f.req="));
    assert!(body.contains("at="), "action token travels in the body");
}

#[tokio::test]
async fn test_missing_tokens_is_auth_required() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>sign in please</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let error = client
        .call(ProcedureId::LIST_NOTEBOOKS, &json!([]))
        .await
        .expect_err("must fail");
    assert!(matches!(error, RpcError::AuthRequired { .. }), "{error}");
}

#[tokio::test]
async fn test_redirect_to_login_is_auth_required() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", "https://accounts.example/login"),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let error = client
        .call(ProcedureId::LIST_NOTEBOOKS, &json!([]))
        .await
        .expect_err("must fail");
    // The redirect itself counts as reachable, but it carries no tokens.
    assert!(matches!(error, RpcError::AuthRequired { .. }), "{error}");
}

#[tokio::test]
async fn test_non_success_status_is_transport_error() {
    let server = MockServer::start().await;
    mount_token_page(&server).await;
    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let error = client
        .call(ProcedureId::ADD_SOURCE, &json!([]))
        .await
        .expect_err("must fail");
    assert!(matches!(error, RpcError::Transport { status: 500 }), "{error}");
}

#[tokio::test]
async fn test_slow_response_is_timeout() {
    let server = MockServer::start().await;
    mount_token_page(&server).await;
    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(rpc_response("wXbhsf", &json!([])))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = RpcClient::with_timeout(
        RpcEndpoint::new(server.uri()),
        None,
        Duration::from_millis(400),
    )
    .expect("client builds");
    let error = client
        .call(ProcedureId::LIST_NOTEBOOKS, &json!([]))
        .await
        .expect_err("must time out");
    assert!(matches!(error, RpcError::Timeout { .. }), "{error}");
}

#[tokio::test]
async fn test_concurrent_calls_share_one_token_fetch() {
    let server = MockServer::start().await;
    // The token page must be hit exactly once even though several callers
    // need tokens at the same time.
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(support::token_html())
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(rpc_response("wXbhsf", &json!([]))),
        )
        .mount(&server)
        .await;

    let client = Arc::new(client_for(&server));
    let calls = (0..4).map(|_| {
        let client = Arc::clone(&client);
        tokio::spawn(async move {
            client
                .call(ProcedureId::LIST_NOTEBOOKS, &json!([]))
                .await
                .expect("call succeeds")
        })
    });
    for handle in calls {
        handle.await.expect("task joins");
    }

    let token_fetches = server
        .received_requests()
        .await
        .expect("requests recorded")
        .iter()
        .filter(|r| r.method == wiremock::http::Method::GET)
        .count();
    assert_eq!(token_fetches, 1, "refresh must be single-flight");
}

#[tokio::test]
async fn test_invalidate_session_forces_refetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(support::token_html()))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(rpc_response("wXbhsf", &json!([]))),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .call(ProcedureId::LIST_NOTEBOOKS, &json!([]))
        .await
        .expect("first call");
    client.invalidate_session().await;
    client
        .call(ProcedureId::LIST_NOTEBOOKS, &json!([]))
        .await
        .expect("second call");
}
