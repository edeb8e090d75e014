//! Integration tests for repository operations against a mock
//! batched-execute endpoint.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use notebridge_core::repository::{
    ArtifactKind, Repository, RepositoryError, ResourceStatus, SourceKind,
};
use notebridge_core::rpc::{RpcClient, RpcEndpoint};

mod support;
use support::{
    RPC_PATH, decode_call_args, mount_token_page, rpc_response, rpc_response_with_code,
};

const NOTEBOOK_ID: &str = "3f2c8a1e-9b4d-4e6f-8a2b-1c5d7e9f0a3b";
const SOURCE_ID: &str = "7a1b2c3d-0e4f-4a5b-8c6d-9e0f1a2b3c4d";
const ARTIFACT_ID: &str = "9d8c7b6a-5e4f-4d3c-8b2a-1f0e9d8c7b6a";

async fn repository_for(server: &MockServer) -> Repository {
    mount_token_page(server).await;
    let client = RpcClient::new(RpcEndpoint::new(server.uri()), None).expect("client builds");
    Repository::new(Arc::new(client))
}

fn mock_rpc(proc_id: &'static str, body: String) -> Mock {
    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .and(query_param("rpcids", proc_id))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
}

#[tokio::test]
async fn test_list_notebooks_excludes_shared() {
    let server = MockServer::start().await;
    let payload = json!([[
        ["My Notebook", null, NOTEBOOK_ID, [0, 0]],
        ["Shared With Me", null, SOURCE_ID, [0, 1]],
        ["Another", null, ARTIFACT_ID]
    ]]);
    mock_rpc("wXbhsf", rpc_response("wXbhsf", &payload))
        .mount(&server)
        .await;

    let repository = repository_for(&server).await;
    let notebooks = repository.list_notebooks().await.expect("list succeeds");
    assert_eq!(notebooks.len(), 2);
    assert_eq!(notebooks[0].name, "My Notebook");
    assert_eq!(notebooks[0].id, NOTEBOOK_ID);
    assert!(notebooks.iter().all(|n| n.name != "Shared With Me"));
}

#[tokio::test]
async fn test_list_notebooks_unrecognized_shape_is_empty_not_error() {
    let server = MockServer::start().await;
    mock_rpc("wXbhsf", rpc_response("wXbhsf", &json!({"unexpected": "object"})))
        .mount(&server)
        .await;

    let repository = repository_for(&server).await;
    let notebooks = repository.list_notebooks().await.expect("no error on drift");
    assert!(notebooks.is_empty());
}

#[tokio::test]
async fn test_create_notebook_extracts_uuid_proof() {
    let server = MockServer::start().await;
    let payload = json!([[NOTEBOOK_ID, "Fresh Notebook"]]);
    mock_rpc("CCqFvf", rpc_response("CCqFvf", &payload))
        .mount(&server)
        .await;

    let repository = repository_for(&server).await;
    let notebook = repository
        .create_notebook("Fresh Notebook")
        .await
        .expect("create succeeds");
    assert_eq!(notebook.id, NOTEBOOK_ID);
    assert_eq!(notebook.name, "Fresh Notebook");
}

#[tokio::test]
async fn test_create_notebook_without_uuid_fails() {
    let server = MockServer::start().await;
    mock_rpc("CCqFvf", rpc_response("CCqFvf", &json!([["no identifier here"]])))
        .mount(&server)
        .await;

    let repository = repository_for(&server).await;
    let error = repository
        .create_notebook("Doomed")
        .await
        .expect_err("must fail");
    assert!(matches!(error, RepositoryError::CreateFailed), "{error}");
}

#[tokio::test]
async fn test_notebook_detail_parses_sources() {
    let server = MockServer::start().await;
    let payload = json!([
        [
            [[SOURCE_ID], "A Paper", 3, "https://example.com/p.pdf", 3],
            [[ARTIFACT_ID], null, null, "https://example.com/docs/guide-to-rust", 2]
        ],
        "Research Notebook"
    ]);
    mock_rpc("rLM1Ne", rpc_response("rLM1Ne", &payload))
        .mount(&server)
        .await;

    let repository = repository_for(&server).await;
    let detail = repository
        .notebook_detail(NOTEBOOK_ID)
        .await
        .expect("detail succeeds");
    assert_eq!(detail.title, "Research Notebook");
    assert_eq!(detail.sources.len(), 2);
    assert_eq!(detail.sources[0].kind, SourceKind::Pdf);
    assert_eq!(detail.sources[0].status, ResourceStatus::Ready);
    // Second source drifted: no title, no type code; both are inferred.
    assert_eq!(detail.sources[1].title, "guide to rust");
    assert_eq!(detail.sources[1].kind, SourceKind::Url);
    assert_eq!(detail.sources[1].status, ResourceStatus::Processing);
}

#[tokio::test]
async fn test_add_source_benign_code_is_success() {
    let server = MockServer::start().await;
    mock_rpc(
        "izAoDd",
        rpc_response_with_code("izAoDd", &json!([[SOURCE_ID]]), 412),
    )
    .mount(&server)
    .await;

    let repository = repository_for(&server).await;
    repository
        .add_text_source(NOTEBOOK_ID, "Notes", "body text")
        .await
        .expect("412 means accepted, processing asynchronously");
}

#[tokio::test]
async fn test_add_source_unknown_code_is_error() {
    let server = MockServer::start().await;
    mock_rpc(
        "izAoDd",
        rpc_response_with_code("izAoDd", &json!([[SOURCE_ID]]), 999),
    )
    .mount(&server)
    .await;

    let repository = repository_for(&server).await;
    let error = repository
        .add_url_source(NOTEBOOK_ID, "https://example.com")
        .await
        .expect_err("999 is not in the allow-list");
    assert!(
        matches!(error, RepositoryError::UnexpectedRpc { code: 999 }),
        "{error}"
    );
}

#[tokio::test]
async fn test_delete_sources_batches_of_twenty() {
    let server = MockServer::start().await;
    mock_rpc("tGMBJc", rpc_response("tGMBJc", &json!([])))
        .expect(3)
        .mount(&server)
        .await;

    let ids: Vec<String> = (0..45)
        .map(|i| format!("00000000-0000-4000-8000-{i:012}"))
        .collect();
    let repository = repository_for(&server).await;
    let attempted = repository
        .delete_sources(NOTEBOOK_ID, &ids)
        .await
        .expect("delete succeeds");
    assert_eq!(attempted, 45);

    let batches: Vec<usize> = server
        .received_requests()
        .await
        .expect("requests recorded")
        .iter()
        .filter(|r| r.url.query().is_some_and(|q| q.contains("tGMBJc")))
        .map(|r| {
            let args = decode_call_args(&String::from_utf8_lossy(&r.body));
            args[0].as_array().expect("batch array").len()
        })
        .collect();
    assert_eq!(batches, vec![20, 20, 5]);
}

#[tokio::test]
async fn test_source_text_falls_back_to_guide() {
    let server = MockServer::start().await;
    // Primary yields a shape with no text anywhere.
    mock_rpc("hizoJc", rpc_response("hizoJc", &json!([[]])))
        .mount(&server)
        .await;
    mock_rpc(
        "tr032e",
        rpc_response("tr032e", &json!([["the guide text for this source"]])),
    )
    .mount(&server)
    .await;

    let repository = repository_for(&server).await;
    let text = repository
        .source_text(NOTEBOOK_ID, SOURCE_ID)
        .await
        .expect("no hard failure");
    assert_eq!(text.as_deref(), Some("the guide text for this source"));

    // The guide call must use the quadruple-nested argument quirk.
    let guide_request = server
        .received_requests()
        .await
        .expect("requests recorded")
        .into_iter()
        .find(|r| r.url.query().is_some_and(|q| q.contains("tr032e")))
        .expect("guide call made");
    let args = decode_call_args(&String::from_utf8_lossy(&guide_request.body));
    assert_eq!(args[0][0][0][0], SOURCE_ID);
}

#[tokio::test]
async fn test_load_many_source_texts_skips_failures() {
    let server = MockServer::start().await;
    // One source resolves; the other's primary call blows up entirely.
    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .and(query_param("rpcids", "hizoJc"))
        .and(wiremock::matchers::body_string_contains(SOURCE_ID))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(rpc_response("hizoJc", &json!([[null, "recovered text body"]]))),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .and(query_param("rpcids", "hizoJc"))
        .and(wiremock::matchers::body_string_contains(ARTIFACT_ID))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let repository = repository_for(&server).await;
    let ids = vec![SOURCE_ID.to_string(), ARTIFACT_ID.to_string()];
    let texts = repository
        .load_many_source_texts(NOTEBOOK_ID, &ids, 3)
        .await;
    assert_eq!(texts.len(), 1, "failed id is skipped, sibling survives");
    assert_eq!(texts[SOURCE_ID], "recovered text body");
}

#[tokio::test]
async fn test_extended_content_is_best_effort_per_call() {
    let server = MockServer::start().await;
    // Notes call: server error. Chat and artifacts: fine.
    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .and(query_param("rpcids", "cFji9c"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mock_rpc(
        "hPCzQc",
        rpc_response(
            "hPCzQc",
            &json!([[[1, "What does the paper claim?", null], [2, "Three things.", null]]]),
        ),
    )
    .mount(&server)
    .await;
    mock_rpc(
        "LfTqmc",
        rpc_response(
            "LfTqmc",
            &json!([[[ARTIFACT_ID, 4, "Key terms", 3, [1]]]]),
        ),
    )
    .mount(&server)
    .await;
    mock_rpc(
        "VfAZjd",
        rpc_response(
            "VfAZjd",
            &json!([json!([["Front A", "Back A", ["t1"]], ["Front B", "Back B", []]]).to_string()]),
        ),
    )
    .mount(&server)
    .await;

    let repository = repository_for(&server).await;
    let content = repository.extended_content(NOTEBOOK_ID).await;

    assert!(content.notes.is_empty(), "failed call degrades to empty");
    assert_eq!(content.chat.len(), 2);
    assert_eq!(content.artifacts.len(), 1);
    assert_eq!(content.artifacts[0].kind, ArtifactKind::Flashcards);
    assert_eq!(content.flashcard_sets.len(), 1);
    let (set_title, cards) = &content.flashcard_sets[0];
    assert_eq!(set_title, "Key terms");
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].front, "Front A");
}

#[tokio::test]
async fn test_artifact_content_skipped_for_processing_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .and(query_param("rpcids", "cFji9c"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .and(query_param("rpcids", "hPCzQc"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mock_rpc(
        "LfTqmc",
        rpc_response(
            "LfTqmc",
            &json!([[[ARTIFACT_ID, 4, "Still cooking", 2, [1]]]]),
        ),
    )
    .mount(&server)
    .await;
    // The content call must never be made for a processing artifact.
    mock_rpc("VfAZjd", rpc_response("VfAZjd", &json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let repository = repository_for(&server).await;
    let content = repository.extended_content(NOTEBOOK_ID).await;
    assert_eq!(content.artifacts.len(), 1);
    assert!(content.flashcard_sets.is_empty());
}
