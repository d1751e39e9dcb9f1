//! Card rendering: art request, set archive, external render

use crate::config::{timestamp, OutputLayout, ART_SIZE};
use crate::core::Card;
use crate::render::archive::write_set_archive;
use crate::render::mse::{CardImageRenderer, RenderedImage};
use crate::render::set_file::set_document;
use crate::services::ImageGenerator;
use crate::Result;
use std::path::PathBuf;
use tracing::info;

/// Files written for one rendered card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCard {
    pub art: PathBuf,
    pub set_archive: PathBuf,
    pub image: RenderedImage,
}

/// Prompt sent to the image backend for a card's art
pub fn image_prompt(card: &Card) -> String {
    format!(
        "modern magic the gathering art depicting a {} {} named \"{}\", {}, digital art, art station, 4k render",
        card.super_type, card.sub_type, card.name, card.image_desc
    )
}

/// Renders normalized cards into images
///
/// Every render writes the art, the set archive and the final image under the
/// output layout; none of them are removed afterwards.
pub struct CardRenderer<I, R> {
    images: I,
    renderer: R,
    layout: OutputLayout,
}

impl<I: ImageGenerator, R: CardImageRenderer> CardRenderer<I, R> {
    pub fn new(images: I, renderer: R, layout: OutputLayout) -> Self {
        CardRenderer {
            images,
            renderer,
            layout,
        }
    }

    pub async fn render(&self, card: &Card) -> Result<RenderedCard> {
        self.layout.ensure_dirs().await?;
        let stamp = timestamp();

        let prompt = image_prompt(card);
        info!(card = %card.name, %prompt, "requesting card art");
        let art = self.images.generate_image(&prompt, ART_SIZE).await?;

        let art_path = self.layout.art_path(&stamp);
        tokio::fs::write(&art_path, &art).await?;

        let set_archive = self.layout.set_path(&stamp);
        write_set_archive(&set_archive, &set_document(card), &art).await?;

        let image = self.renderer.render(&set_archive).await?;
        info!(card = %card.name, path = %image.path.display(), "rendered card");

        Ok(RenderedCard {
            art: art_path,
            set_archive,
            image,
        })
    }
}
