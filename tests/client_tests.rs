use serde_json::json;
use sketchboard::board::{Board, parse_command};
use sketchboard::client::{ChatRequest, ImageRequest, OpenAiClient, RemoteError, RemoteModel};
use sketchboard::commands::build_orchestrator;
use sketchboard::config::{CanvasConfig, Config};
use sketchboard::mode::Mode;
use sketchboard::orchestrator::Outcome;
use sketchboard::payload::ImagePayload;
use sketchboard::session::Credential;
use sketchboard::ui;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "sk-wire-key";

fn chat_reply(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": text},
            "finish_reason": "stop"
        }]
    }))
}

fn chat_request(image: Option<ImagePayload>) -> ChatRequest {
    ChatRequest {
        model: "gpt-4o-mini".to_string(),
        instruction: "Describe the drawing".to_string(),
        image,
        max_tokens: Some(500),
    }
}

fn image_request() -> ImageRequest {
    ImageRequest {
        model: "dall-e-3".to_string(),
        prompt: "a lighthouse at dusk".to_string(),
        size: "1024x1024".to_string(),
    }
}

#[tokio::test]
async fn test_chat_completion_sends_image_part_and_returns_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", format!("Bearer {KEY}").as_str()))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "max_tokens": 500,
            "messages": [{
                "role": "user",
                "content": [
                    {"type": "text", "text": "Describe the drawing"},
                    {"type": "image_url", "image_url": {"url": "data:image/png;base64,cG5n"}}
                ]
            }]
        })))
        .respond_with(chat_reply("A house with a red roof"))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiClient::new().with_base_url(server.uri());
    let request = chat_request(Some(ImagePayload::from_png_bytes(b"png")));
    let text = client
        .complete(&Credential::new(KEY), &request)
        .await
        .expect("chat call should succeed");

    assert_eq!(text, "A house with a red roof");
}

#[tokio::test]
async fn test_image_generation_returns_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .and(body_partial_json(json!({
            "model": "dall-e-3",
            "prompt": "a lighthouse at dusk",
            "size": "1024x1024",
            "n": 1
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "created": 1,
            "data": [{"url": "https://images.example.com/lighthouse.png"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiClient::new().with_base_url(server.uri());
    let url = client
        .generate_image(&Credential::new(KEY), &image_request())
        .await
        .expect("image call should succeed");

    assert_eq!(url, "https://images.example.com/lighthouse.png");
}

#[tokio::test]
async fn test_image_generation_wraps_b64_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "created": 1,
            "data": [{"b64_json": "iVBORw0K"}]
        })))
        .mount(&server)
        .await;

    let client = OpenAiClient::new().with_base_url(server.uri());
    let url = client
        .generate_image(&Credential::new(KEY), &image_request())
        .await
        .expect("image call should succeed");

    assert_eq!(url, "data:image/png;base64,iVBORw0K");
}

#[tokio::test]
async fn test_rate_limit_maps_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {
                "message": "Rate limit reached for gpt-4o-mini",
                "type": "requests",
                "code": "rate_limit_exceeded"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiClient::new().with_base_url(server.uri());
    let err = client
        .complete(&Credential::new(KEY), &chat_request(None))
        .await
        .expect_err("429 should fail");

    match err {
        RemoteError::Api { status, message } => {
            assert_eq!(status, 429);
            assert_eq!(message, "Rate limit reached for gpt-4o-mini");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_undecodable_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let client = OpenAiClient::new().with_base_url(server.uri());
    let err = client
        .complete(&Credential::new(KEY), &chat_request(None))
        .await
        .expect_err("html is not a completion");

    assert!(matches!(err, RemoteError::Decode(_)));
}

#[tokio::test]
async fn test_base_url_with_path_and_trailing_slash() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(chat_reply("joined"))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenAiClient::new().with_base_url(format!("{}/v1/", server.uri()));
    assert_eq!(client.base_url(), format!("{}/v1", server.uri()));

    let text = client
        .complete(&Credential::new(KEY), &chat_request(None))
        .await
        .expect("chat call should succeed");
    assert_eq!(text, "joined");
}

#[tokio::test]
async fn test_download_returns_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/generated.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"\x89PNG".to_vec()))
        .mount(&server)
        .await;

    let client = OpenAiClient::new();
    let bytes = client
        .download(&format!("{}/files/generated.png", server.uri()))
        .await
        .expect("download should succeed");
    assert_eq!(bytes, b"\x89PNG");

    let missing = client
        .download(&format!("{}/files/missing.png", server.uri()))
        .await;
    assert!(matches!(missing, Err(RemoteError::Api { status: 404, .. })));
}

#[tokio::test]
async fn test_key_typed_into_board_is_sent_as_bearer() {
    ui::set_quiet_mode(true);
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-typed-in"))
        .respond_with(chat_reply("a small boat"))
        .expect(1)
        .mount(&server)
        .await;

    let config = Config {
        base_url: server.uri(),
        ..Config::default()
    };
    let mut board = Board::new(
        build_orchestrator(&config, Some("sk-from-flag")),
        &CanvasConfig::default(),
    );

    for line in ["key sk-typed-in", "stroke 10,10 80,60"] {
        let command = parse_command(line).expect("command should parse");
        board.execute(command).await;
    }
    let outcome = board.act(Mode::SketchAnalysis, false).await;
    assert!(matches!(outcome, Some(Outcome::Text { ref text, .. }) if text == "a small boat"));

    let requests = server
        .received_requests()
        .await
        .expect("request recording is on");
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0]
            .headers
            .get("authorization")
            .and_then(|value| value.to_str().ok()),
        Some("Bearer sk-typed-in")
    );
}
