//! # AI Provider Wire Format Tests
//!
//! Verifies the requests sent to Ollama and to OpenAI-compatible servers, and
//! how their error responses are surfaced.

use anyhow::Result;
use cupom::providers::ai::{AiProvider, ImageAttachment, LocalAiProvider, OllamaProvider};
use cupom::providers::factory::{create_provider, ProviderConfig, ProviderKind};
use cupom::ExtractionError;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn image() -> ImageAttachment {
    ImageAttachment::new("image/png", b"PNGDATA".to_vec())
}

async fn last_request_body(server: &MockServer) -> Value {
    let requests = server.received_requests().await.unwrap_or_default();
    let request = requests.last().expect("the mock server should have a request");
    serde_json::from_slice(&request.body).expect("request body should be JSON")
}

#[tokio::test]
async fn test_ollama_sends_base64_image_in_user_message() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": {"role": "assistant", "content": "{}"}
        })))
        .mount(&server)
        .await;

    let provider = OllamaProvider::new(
        format!("{}/api/chat", server.uri()),
        "llava".to_string(),
        Some(0.0),
        None,
    )?;
    let reply = provider.generate("", "leia o cupom", &[image()]).await?;
    assert_eq!(reply, "{}");

    let body = last_request_body(&server).await;
    assert_eq!(body["model"], "llava");
    assert_eq!(body["stream"], false);
    assert_eq!(body["options"]["temperature"], 0.0);
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1, "empty system prompt must not be sent");
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[0]["content"], "leia o cupom");
    assert_eq!(messages[0]["images"], json!(["UE5HREFUQQ=="]));
    Ok(())
}

#[tokio::test]
async fn test_ollama_error_status_is_reported() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_string("model 'x' not found"))
        .mount(&server)
        .await;

    let provider = OllamaProvider::new(server.uri(), "x".to_string(), None, None)?;
    let err = provider.generate("", "p", &[]).await.unwrap_err();

    match err {
        ExtractionError::AiApi(message) => assert!(message.contains("model 'x' not found")),
        other => panic!("unexpected error: {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_local_provider_sends_data_url_and_bearer_key() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "{\"itens\": []}"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = LocalAiProvider::new(
        format!("{}/v1/chat/completions", server.uri()),
        Some("secret".to_string()),
        Some("qwen2-vl".to_string()),
        None,
        None,
    )?;
    let reply = provider
        .generate("Você extrai cupons.", "leia o cupom", &[image()])
        .await?;
    assert_eq!(reply, "{\"itens\": []}");

    let body = last_request_body(&server).await;
    assert_eq!(body["model"], "qwen2-vl");
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "system");
    assert_eq!(messages[1]["content"][0], json!({"type": "text", "text": "leia o cupom"}));
    assert_eq!(
        messages[1]["content"][1],
        json!({"type": "image_url", "image_url": {"url": "data:image/png;base64,UE5HREFUQQ=="}})
    );
    Ok(())
}

#[tokio::test]
async fn test_unreachable_server_is_a_request_error() -> Result<()> {
    let provider = OllamaProvider::new(
        "http://127.0.0.1:9/api/chat".to_string(),
        "x".to_string(),
        None,
        Some(std::time::Duration::from_secs(2)),
    )?;
    let err = provider.generate("", "p", &[]).await.unwrap_err();
    assert!(matches!(err, ExtractionError::AiRequest(_)));
    Ok(())
}

#[test]
fn test_factory_requires_url_for_local_provider() {
    let config = ProviderConfig {
        provider: ProviderKind::Local,
        ..ProviderConfig::default()
    };
    assert!(matches!(
        create_provider(&config),
        Err(ExtractionError::ProviderConfiguration(_))
    ));
}

#[test]
fn test_factory_defaults_to_ollama() {
    let config = ProviderConfig::default();
    assert_eq!(config.provider, ProviderKind::Ollama);
    assert_eq!(config.model_name, "qwen32b-custom");
    assert!(create_provider(&config).is_ok());
}
