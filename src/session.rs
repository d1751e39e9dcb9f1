//! Generation sessions
//!
//! A session runs strictly in sequence:
//! 1. generate the themed cards (one conversation)
//! 2. render every card; a failed render drops that card only
//! 3. (deck sessions) ask for a deck list in the same conversation
//! 4. resolve art for every deck entry: our renders are published, existing
//!    cards are looked up
//! 5. export the deck

use crate::config::{timestamp, OutputLayout};
use crate::core::Card;
use crate::deck::{export_deck, DeckEntry};
use crate::generate::prompts::card_prompt;
use crate::generate::{generate_cards, request_deck, RetryPolicy, Transcript};
use crate::render::{CardImageRenderer, CardRenderer, RenderedCard};
use crate::services::{CardLookup, ImageGenerator, ImagePublisher, TextGenerator};
use crate::Result;
use rustc_hash::FxHashMap;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// What to generate
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub theme: String,
    pub count: usize,
    pub retry: RetryPolicy,
}

/// A generated card and, if rendering worked, its render
#[derive(Debug, Clone)]
pub struct GeneratedCard {
    pub card: Card,
    pub render: Option<RenderedCard>,
}

/// Cards of one session plus the conversation that produced them
#[derive(Debug, Clone)]
pub struct GeneratedSet {
    pub transcript: Transcript,
    pub cards: Vec<GeneratedCard>,
}

/// The exported deck
#[derive(Debug, Clone)]
pub struct DeckExport {
    pub path: PathBuf,
    pub entries: Vec<DeckEntry>,
    /// Deck list names that resolved to no art and were left out
    pub skipped: Vec<String>,
}

/// Generate and render `options.count` cards
pub async fn generate_set<G, I, R>(
    generator: &G,
    renderer: &CardRenderer<I, R>,
    options: &SessionOptions,
) -> Result<GeneratedSet>
where
    G: TextGenerator,
    I: ImageGenerator,
    R: CardImageRenderer,
{
    info!(theme = %options.theme, count = options.count, "generating cards");
    let transcript = Transcript::with_prompt(card_prompt(&options.theme));
    let batch = generate_cards(generator, transcript, options.count, options.retry).await?;

    let mut cards = Vec::with_capacity(batch.cards.len());
    for card in batch.cards {
        let render = match renderer.render(&card).await {
            Ok(render) => Some(render),
            Err(e) => {
                error!(card = %card.name, error = %e, "failed to render card");
                None
            }
        };
        cards.push(GeneratedCard { card, render });
    }

    Ok(GeneratedSet {
        transcript: batch.transcript,
        cards,
    })
}

/// Request a deck around `set`, resolve its art and export it to `path`
pub async fn export_set_deck<G, P, L>(
    generator: &G,
    publisher: &P,
    lookup: &L,
    set: GeneratedSet,
    retry: RetryPolicy,
    back_url: &str,
    path: PathBuf,
) -> Result<DeckExport>
where
    G: TextGenerator,
    P: ImagePublisher,
    L: CardLookup,
{
    let generated: FxHashMap<String, &GeneratedCard> = set
        .cards
        .iter()
        .map(|c| (c.card.name.lookup_key(), c))
        .collect();

    let request = request_deck(generator, set.transcript, retry).await?;

    let mut published: FxHashMap<String, String> = FxHashMap::default();
    let mut entries = Vec::new();
    let mut skipped = Vec::new();

    for wanted in request.deck.entries {
        let key = wanted.name.lookup_key();

        let url = match generated.get(&key) {
            Some(GeneratedCard {
                render: Some(render),
                ..
            }) => match published.get(&key) {
                Some(url) => Some(url.clone()),
                None => {
                    let url = publisher.publish(&render.image.bytes).await?;
                    published.insert(key.clone(), url.clone());
                    Some(url)
                }
            },
            Some(GeneratedCard { render: None, .. }) => {
                warn!(card = %wanted.name, "generated card has no render, leaving it out");
                None
            }
            None => lookup.find_image(wanted.name.as_str()).await?,
        };

        match url {
            Some(url) => entries.push(DeckEntry {
                name: wanted.name,
                count: wanted.count,
                image_url: url,
            }),
            None => {
                warn!(card = %wanted.name, "no art found, leaving it out of the deck");
                skipped.push(wanted.name.to_string());
            }
        }
    }

    export_deck(&entries, back_url, &path).await?;
    Ok(DeckExport {
        path,
        entries,
        skipped,
    })
}

/// Default export path for a deck written now
pub async fn deck_export_path(layout: &OutputLayout) -> Result<PathBuf> {
    layout.ensure_dirs().await?;
    Ok(layout.deck_path(&timestamp()))
}
