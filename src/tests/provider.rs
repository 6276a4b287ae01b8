use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::embedding::provider::{EmbeddingClient, ProviderConfig, ProviderError, WireProtocol};

fn native_config(base_url: String) -> ProviderConfig {
    ProviderConfig {
        protocol: WireProtocol::Native { base_url },
        model: "nomic-embed-text".to_string(),
        timeout: Duration::from_secs(5),
    }
}

fn openai_config(base_url: String) -> ProviderConfig {
    ProviderConfig {
        protocol: WireProtocol::OpenAi {
            base_url,
            api_key: "secret".to_string(),
        },
        model: "text-embedding-3-small".to_string(),
        timeout: Duration::from_secs(5),
    }
}

// --- native protocol ---

#[tokio::test]
async fn native_posts_model_and_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .and(body_json(json!({
            "model": "nomic-embed-text",
            "prompt": "hello world",
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"embedding": [1.0, 2.0, 3.0]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = EmbeddingClient::new(native_config(server.uri())).unwrap();
    let vector = client.embed("hello world").await.unwrap();
    assert_eq!(vector, vec![1.0, 2.0, 3.0]);
}

#[tokio::test]
async fn native_trims_trailing_slash_from_base() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"embedding": [0.5]})))
        .expect(1)
        .mount(&server)
        .await;

    let client = EmbeddingClient::new(native_config(format!("{}/", server.uri()))).unwrap();
    client.embed("anything").await.unwrap();
}

#[tokio::test]
async fn whitespace_is_collapsed_before_sending() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .and(body_json(json!({
            "model": "nomic-embed-text",
            "prompt": "rust async",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"embedding": [0.5]})))
        .expect(1)
        .mount(&server)
        .await;

    let client = EmbeddingClient::new(native_config(server.uri())).unwrap();
    client.embed("  rust\n\tasync  ").await.unwrap();
}

#[tokio::test]
async fn native_missing_embedding_field_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let client = EmbeddingClient::new(native_config(server.uri())).unwrap();
    let err = client.embed("q").await.unwrap_err();
    assert!(matches!(err, ProviderError::Malformed(_)));
}

#[tokio::test]
async fn out_of_range_component_is_malformed() {
    let server = MockServer::start().await;
    // Decodes to f32 infinity, which cannot be stored.
    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"embedding": [1e39, 2.0]})))
        .mount(&server)
        .await;

    let client = EmbeddingClient::new(native_config(server.uri())).unwrap();
    let err = client.embed("q").await.unwrap_err();
    assert!(matches!(err, ProviderError::Malformed(_)));
}

#[tokio::test]
async fn error_status_carries_body_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/embeddings"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
        .mount(&server)
        .await;

    let client = EmbeddingClient::new(native_config(server.uri())).unwrap();
    let err = client.embed("q").await.unwrap_err();
    match err {
        ProviderError::Status { status, body } => {
            assert_eq!(status.as_u16(), 500);
            assert!(body.contains("model not loaded"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

// --- openai-compatible protocol ---

#[tokio::test]
async fn openai_sends_bearer_and_takes_first_item() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(header("authorization", "Bearer secret"))
        .and(body_json(json!({
            "model": "text-embedding-3-small",
            "input": "query text",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"embedding": [0.5, 0.25]},
                {"embedding": [9.0, 9.0]},
            ],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = EmbeddingClient::new(openai_config(server.uri())).unwrap();
    let vector = client.embed("query text").await.unwrap();
    assert_eq!(vector, vec![0.5, 0.25]);
}

#[tokio::test]
async fn openai_empty_data_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let client = EmbeddingClient::new(openai_config(server.uri())).unwrap();
    let err = client.embed("q").await.unwrap_err();
    assert!(matches!(err, ProviderError::Malformed(_)));
}
