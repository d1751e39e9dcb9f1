//! External services
//!
//! Every collaborator the pipeline talks to sits behind a narrow trait so the
//! drivers can be exercised with scripted stand-ins:
//! - [`TextGenerator`]: transcript in, one reply out
//! - [`ImageGenerator`]: prompt in, image bytes out
//! - [`ImagePublisher`]: image bytes in, public URL out
//! - [`CardLookup`]: card name in, stock art URL (or nothing) out
//!
//! All calls are awaited one at a time.

pub mod imgur;
pub mod openai;
pub mod scripted;
pub mod scryfall;
pub mod stable_diffusion;

use crate::generate::transcript::Transcript;
use crate::Result;
use clap::ValueEnum;

pub use imgur::ImgurClient;
pub use openai::OpenAiClient;
pub use scripted::ScriptedTextGenerator;
pub use scryfall::ScryfallClient;
pub use stable_diffusion::StableDiffusionClient;

/// Sends the whole transcript and returns the assistant's reply text
#[allow(async_fn_in_trait)]
pub trait TextGenerator {
    async fn complete(&self, transcript: &Transcript) -> Result<String>;
}

/// Generates one square image and returns its raw (decoded) bytes
#[allow(async_fn_in_trait)]
pub trait ImageGenerator {
    async fn generate_image(&self, prompt: &str, size: u32) -> Result<Vec<u8>>;
}

/// Uploads an encoded image and returns its public URL
#[allow(async_fn_in_trait)]
pub trait ImagePublisher {
    async fn publish(&self, image: &[u8]) -> Result<String>;
}

/// Finds stock art for an existing card by exact name
///
/// `Ok(None)` means the service knows no such card.
#[allow(async_fn_in_trait)]
pub trait CardLookup {
    async fn find_image(&self, name: &str) -> Result<Option<String>>;
}

/// Image backend selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ImageBackend {
    /// Hosted OpenAI image generation
    Dalle,
    /// Local Stable Diffusion web UI API
    StableDiffusion,
}

/// Image generator chosen at runtime
pub enum ImageService {
    Dalle(OpenAiClient),
    StableDiffusion(StableDiffusionClient),
}

impl ImageGenerator for ImageService {
    async fn generate_image(&self, prompt: &str, size: u32) -> Result<Vec<u8>> {
        match self {
            ImageService::Dalle(client) => client.generate_image(prompt, size).await,
            ImageService::StableDiffusion(client) => client.generate_image(prompt, size).await,
        }
    }
}

/// Decode a base64 image payload, tolerating a `data:` URL prefix
pub(crate) fn decode_image(payload: &str) -> Result<Vec<u8>> {
    use base64::{engine::general_purpose::STANDARD, Engine};

    let data = match payload.split_once(";base64,") {
        Some((_, data)) => data,
        None => payload,
    };
    Ok(STANDARD.decode(data.trim())?)
}
