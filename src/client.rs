//! Remote model client.
//!
//! `RemoteModel` is the seam the orchestrator talks to; `OpenAiClient` speaks the
//! OpenAI-compatible chat completion and image generation endpoints over HTTP.

use crate::log_debug;
use crate::payload::ImagePayload;
use crate::session::Credential;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";
pub const DEFAULT_IMAGE_SIZE: &str = "1024x1024";

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("The model returned an empty response")]
    EmptyResponse,

    #[error("Could not decode response: {0}")]
    Decode(String),
}

/// One chat-style request: a single user message with optional inline image
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub instruction: String,
    pub image: Option<ImagePayload>,
    pub max_tokens: Option<u32>,
}

/// One text-to-image request
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    pub model: String,
    pub prompt: String,
    pub size: String,
}

/// Remote calls take the session credential on every request; implementations never
/// hold a key of their own.
#[async_trait]
pub trait RemoteModel: Send + Sync {
    /// Chat completion; returns the assistant text verbatim
    async fn complete(
        &self,
        credential: &Credential,
        request: &ChatRequest,
    ) -> Result<String, RemoteError>;

    /// Image generation; returns a URL (or `data:` URL) for the image
    async fn generate_image(
        &self,
        credential: &Credential,
        request: &ImageRequest,
    ) -> Result<String, RemoteError>;
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: MessageContent<'a>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Serialize)]
struct ImageGenerationBody<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'a str,
    n: u8,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ImageGenerationResponse {
    data: Vec<GeneratedImage>,
}

#[derive(Deserialize)]
struct GeneratedImage {
    url: Option<String>,
    b64_json: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// HTTP client for OpenAI-compatible APIs
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
}

impl Default for OpenAiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenAiClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Point the client at a different OpenAI-compatible server
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn post<B: Serialize + Sync, R: for<'de> Deserialize<'de>>(
        &self,
        credential: &Credential,
        path: &str,
        body: &B,
    ) -> Result<R, RemoteError> {
        let url = format!("{}/{path}", self.base_url);
        log_debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(credential.expose())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(map_http_error(status, &text));
        }

        serde_json::from_str(&text).map_err(|e| RemoteError::Decode(e.to_string()))
    }

    /// Fetch the bytes behind a generated image URL
    pub async fn download(&self, url: &str) -> Result<Vec<u8>, RemoteError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Api {
                status: status.as_u16(),
                message: format!("Failed to download image from {url}"),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl RemoteModel for OpenAiClient {
    async fn complete(
        &self,
        credential: &Credential,
        request: &ChatRequest,
    ) -> Result<String, RemoteError> {
        let body = chat_body(request);
        let response: ChatCompletionResponse =
            self.post(credential, "chat/completions", &body).await?;
        extract_text(response)
    }

    async fn generate_image(
        &self,
        credential: &Credential,
        request: &ImageRequest,
    ) -> Result<String, RemoteError> {
        let body = ImageGenerationBody {
            model: &request.model,
            prompt: &request.prompt,
            size: &request.size,
            n: 1,
        };
        let response: ImageGenerationResponse = self.post(credential, "images/generations", &body).await?;
        extract_image_reference(response)
    }
}

fn chat_body(request: &ChatRequest) -> ChatCompletionBody<'_> {
    let content = match &request.image {
        Some(image) => MessageContent::Parts(vec![
            ContentPart::Text {
                text: &request.instruction,
            },
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: image.data_url(),
                },
            },
        ]),
        None => MessageContent::Text(&request.instruction),
    };

    ChatCompletionBody {
        model: &request.model,
        messages: vec![ChatMessage {
            role: "user",
            content,
        }],
        max_tokens: request.max_tokens,
    }
}

fn extract_text(response: ChatCompletionResponse) -> Result<String, RemoteError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or(RemoteError::EmptyResponse)
}

fn extract_image_reference(response: ImageGenerationResponse) -> Result<String, RemoteError> {
    let image = response
        .data
        .into_iter()
        .next()
        .ok_or(RemoteError::EmptyResponse)?;
    match (image.url, image.b64_json) {
        (Some(url), _) => Ok(url),
        (None, Some(b64)) => Ok(format!("data:image/png;base64,{b64}")),
        (None, None) => Err(RemoteError::EmptyResponse),
    }
}

fn map_http_error(status: StatusCode, body: &str) -> RemoteError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map_or_else(|_| body.to_string(), |wrapper| wrapper.error.message);
    RemoteError::Api {
        status: status.as_u16(),
        message,
    }
}
