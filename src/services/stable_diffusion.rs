//! Local Stable Diffusion web UI (`/sdapi/v1/txt2img`)

use super::{decode_image, ImageGenerator};
use crate::{CardGenError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_URL: &str = "http://127.0.0.1:7860/sdapi/v1/txt2img";
pub const DEFAULT_STEPS: u32 = 50;

#[derive(Serialize)]
struct Txt2ImgRequest<'a> {
    prompt: &'a str,
    width: u32,
    height: u32,
    steps: u32,
}

#[derive(Deserialize)]
struct Txt2ImgResponse {
    #[serde(default)]
    images: Vec<String>,
}

pub struct StableDiffusionClient {
    client: Client,
    url: String,
    steps: u32,
}

impl StableDiffusionClient {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        StableDiffusionClient {
            client,
            url: url.into(),
            steps: DEFAULT_STEPS,
        }
    }

    pub fn with_steps(mut self, steps: u32) -> Self {
        self.steps = steps;
        self
    }
}

impl ImageGenerator for StableDiffusionClient {
    async fn generate_image(&self, prompt: &str, size: u32) -> Result<Vec<u8>> {
        let request = Txt2ImgRequest {
            prompt,
            width: size,
            height: size,
            steps: self.steps,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<Txt2ImgResponse>()
            .await?;

        let image = response
            .images
            .into_iter()
            .next()
            .ok_or_else(|| CardGenError::Service {
                service: "Stable Diffusion",
                message: "txt2img returned no images".to_string(),
            })?;
        decode_image(&image)
    }
}
