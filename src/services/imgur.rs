//! Imgur image hosting

use super::ImagePublisher;
use crate::{CardGenError, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde_json::Value;
use tracing::info;

pub const UPLOAD_URL: &str = "https://api.imgur.com/3/image";

pub struct ImgurClient {
    client: Client,
    client_id: String,
}

impl ImgurClient {
    pub fn new(client: Client, client_id: impl Into<String>) -> Self {
        ImgurClient {
            client,
            client_id: client_id.into(),
        }
    }
}

impl ImagePublisher for ImgurClient {
    async fn publish(&self, image: &[u8]) -> Result<String> {
        let encoded = STANDARD.encode(image);

        let body = self
            .client
            .post(UPLOAD_URL)
            .header("Authorization", format!("Client-ID {}", self.client_id))
            .form(&[("image", encoded.as_str()), ("type", "base64")])
            .send()
            .await?
            .text()
            .await?;

        let link = parse_upload_response(&body)?;
        info!(bytes = image.len(), %link, "published image");
        Ok(link)
    }
}

/// Pull the hosted link out of an upload reply
///
/// Error replies carry `data.error` either as a string or as an object with
/// a `message`; that text becomes the error.
pub fn parse_upload_response(body: &str) -> Result<String> {
    let value: Value = serde_json::from_str(body).map_err(|_| CardGenError::Service {
        service: "Imgur",
        message: format!("unexpected reply: {body}"),
    })?;

    if let Some(link) = value.pointer("/data/link").and_then(Value::as_str) {
        return Ok(link.to_string());
    }

    let message = match value.pointer("/data/error") {
        Some(Value::String(s)) => s.clone(),
        Some(error) => error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
        None => body.to_string(),
    };
    Err(CardGenError::Service {
        service: "Imgur",
        message,
    })
}
