//! OpenAI chat completions and image generation

use super::{decode_image, ImageGenerator, TextGenerator};
use crate::generate::transcript::{Message, Transcript};
use crate::{CardGenError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_MAX_TOKENS: u32 = 400;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Serialize)]
struct ImageRequest<'a> {
    prompt: &'a str,
    n: u32,
    size: String,
    response_format: &'a str,
}

#[derive(Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    b64_json: String,
}

/// Client for the OpenAI REST API
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl OpenAiClient {
    pub fn new(client: Client, api_key: impl Into<String>) -> Self {
        OpenAiClient {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

impl TextGenerator for OpenAiClient {
    async fn complete(&self, transcript: &Transcript) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: transcript.messages(),
            max_tokens: self.max_tokens,
        };

        debug!(messages = transcript.len(), model = %self.model, "requesting chat completion");
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<ChatCompletionResponse>()
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| CardGenError::Service {
                service: "OpenAI",
                message: "chat response contained no choices".to_string(),
            })
    }
}

impl ImageGenerator for OpenAiClient {
    async fn generate_image(&self, prompt: &str, size: u32) -> Result<Vec<u8>> {
        let request = ImageRequest {
            prompt,
            n: 1,
            size: format!("{size}x{size}"),
            response_format: "b64_json",
        };

        debug!(size, "requesting image");
        let response = self
            .client
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<ImageResponse>()
            .await?;

        let image = response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| CardGenError::Service {
                service: "OpenAI",
                message: "image response contained no images".to_string(),
            })?;
        decode_image(&image.b64_json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_shape() {
        let mut transcript = Transcript::with_prompt("make a card");
        transcript.push_assistant("{}");
        let request = ChatRequest {
            model: DEFAULT_MODEL,
            messages: transcript.messages(),
            max_tokens: DEFAULT_MAX_TOKENS,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-3.5-turbo");
        assert_eq!(json["max_tokens"], 400);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][1]["role"], "assistant");
    }

    #[test]
    fn test_chat_response_parses() {
        let body = r#"{"choices": [{"index": 0, "message": {"role": "assistant", "content": "hi"}}]}"#;
        let response: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.choices[0].message.content, "hi");
    }

    #[test]
    fn test_image_request_shape() {
        let request = ImageRequest {
            prompt: "a cow",
            n: 1,
            size: "512x512".to_string(),
            response_format: "b64_json",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["size"], "512x512");
        assert_eq!(json["response_format"], "b64_json");
    }

    #[test]
    fn test_client_options() {
        let client = OpenAiClient::new(Client::new(), "key")
            .with_base_url("http://localhost:8080/v1/")
            .with_model("gpt-4o-mini")
            .with_max_tokens(800);
        assert_eq!(client.base_url, "http://localhost:8080/v1");
        assert_eq!(client.model, "gpt-4o-mini");
        assert_eq!(client.max_tokens, 800);
    }
}
