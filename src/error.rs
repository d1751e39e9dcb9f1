//! Error types for the card generation pipeline

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CardGenError {
    /// A parsed card reply lacks a field every card needs
    #[error("Card record is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Invalid card record: {0}")]
    InvalidCard(String),

    #[error("Invalid deck list: {0}")]
    InvalidDeck(String),

    #[error("{service} error: {message}")]
    Service {
        service: &'static str,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gave up after {attempts} unparsable replies")]
    RetriesExhausted { attempts: u32 },

    #[error("Renderer did not finish within {secs}s")]
    RendererTimeout { secs: u64 },

    #[error("Renderer failed: {0}")]
    RendererFailed(String),

    #[error("Deck export already exists: {}", .0.display())]
    ExportExists(PathBuf),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Archive error: {0}")]
    ArchiveError(#[from] zip::result::ZipError),

    #[error("Image decode error: {0}")]
    ImageDecode(#[from] base64::DecodeError),
}

pub type Result<T> = std::result::Result<T, CardGenError>;
