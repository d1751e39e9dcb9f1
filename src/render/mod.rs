//! Card rendering
//!
//! A normalized card becomes a set document, is zipped with its generated art
//! and handed to the external renderer.

pub mod archive;
pub mod mse;
pub mod pipeline;
pub mod set_file;

pub use mse::{CardImageRenderer, MseRenderer, RenderedImage};
pub use pipeline::{image_prompt, CardRenderer, RenderedCard};
pub use set_file::set_document;
