use mockito::Matcher;
use serde_json::json;
use std::time::Duration;

use solar_lead_bot::config::{LlmConfig, LlmProvider};
use solar_lead_bot::errors::LlmError;
use solar_lead_bot::llm::{ChatCompletion, ChatMessage, LlmClient};

fn client_for(url: String) -> LlmClient {
    let mut config = LlmConfig::for_provider(LlmProvider::DeepSeek, "test-key");
    config.api_url = url;
    config.timeout = Duration::from_secs(5);
    LlmClient::new(config).expect("Failed to build client")
}

fn conversation() -> Vec<ChatMessage> {
    vec![
        ChatMessage::system("Ты консультант по солнечным станциям."),
        ChatMessage::user("Сколько стоит станция для дома?"),
    ]
}

#[tokio::test]
async fn test_successful_completion() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::PartialJson(json!({
            "model": "deepseek-chat",
            "max_tokens": 1000,
            "stream": false,
            "messages": [
                {"role": "system", "content": "Ты консультант по солнечным станциям."},
                {"role": "user", "content": "Сколько стоит станция для дома?"}
            ]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"От 400 тыс. ₽."}}]}"#)
        .create_async()
        .await;

    let client = client_for(format!("{}/chat/completions", server.url()));
    let answer = client.complete(&conversation()).await.unwrap();

    assert_eq!(answer, "От 400 тыс. ₽.");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_non_success_status() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_body(r#"{"error":{"message":"invalid api key"}}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(format!("{}/chat/completions", server.url()));
    let err = client.complete(&conversation()).await.unwrap_err();

    match err {
        LlmError::Status { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("invalid api key"));
        }
        other => panic!("Unexpected error: {other:?}"),
    }
    // Single attempt, no retry
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unexpected_payload() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices":[]}"#)
        .create_async()
        .await;

    let client = client_for(format!("{}/chat/completions", server.url()));
    let err = client.complete(&conversation()).await.unwrap_err();

    assert!(matches!(err, LlmError::Payload(_)));
}

#[tokio::test]
async fn test_connection_failure() {
    // Nothing listens on the discard port
    let client = client_for("http://127.0.0.1:9/chat/completions".to_string());
    let err = client.complete(&conversation()).await.unwrap_err();

    assert!(matches!(err, LlmError::Network(_) | LlmError::Timeout));
}
