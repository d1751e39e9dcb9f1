//! End-to-end session tests with in-process stand-ins for every service

use mtg_card_gen::config::{OutputLayout, DEFAULT_BACK_URL};
use mtg_card_gen::generate::RetryPolicy;
use mtg_card_gen::render::{CardImageRenderer, CardRenderer, RenderedImage};
use mtg_card_gen::services::{
    CardLookup, ImageGenerator, ImagePublisher, ScriptedTextGenerator,
};
use mtg_card_gen::session::{deck_export_path, export_set_deck, generate_set, SessionOptions};
use mtg_card_gen::{CardGenError, Result};
use serde_json::Value;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

const FAKE_PNG: &[u8] = b"\x89PNG fake art";

/// Returns fixed bytes, except for prompts naming `fail_on`
struct FakeArt {
    fail_on: Option<&'static str>,
}

impl ImageGenerator for FakeArt {
    async fn generate_image(&self, prompt: &str, _size: u32) -> Result<Vec<u8>> {
        match self.fail_on {
            Some(name) if prompt.contains(name) => Err(CardGenError::Service {
                service: "fake art",
                message: "content policy".to_string(),
            }),
            _ => Ok(FAKE_PNG.to_vec()),
        }
    }
}

/// Writes a numbered placeholder image next to the archive
///
/// Renders within the same second share a path, so each one overwrites the
/// previous file while its bytes stay distinct.
#[derive(Default)]
struct FakeRenderer {
    renders: AtomicUsize,
}

impl CardImageRenderer for FakeRenderer {
    async fn render(&self, set_archive: &Path) -> Result<RenderedImage> {
        assert!(set_archive.is_file());
        let n = self.renders.fetch_add(1, Ordering::SeqCst);
        let path = set_archive.with_extension("png");
        let bytes = format!("render {n}").into_bytes();
        std::fs::write(&path, &bytes)?;
        Ok(RenderedImage { path, bytes })
    }
}

/// Records uploaded bytes; the URL is the upload's index
#[derive(Default)]
struct FakeHost {
    uploads: Mutex<Vec<Vec<u8>>>,
}

impl ImagePublisher for FakeHost {
    async fn publish(&self, image: &[u8]) -> Result<String> {
        let mut uploads = self.uploads.lock().unwrap();
        let url = format!("https://img.example/{}.png", uploads.len());
        uploads.push(image.to_vec());
        Ok(url)
    }
}

struct FakeLookup;

impl CardLookup for FakeLookup {
    async fn find_image(&self, name: &str) -> Result<Option<String>> {
        Ok(match name {
            "Forest" => Some("https://cards.example/forest.jpg".to_string()),
            _ => None,
        })
    }
}

fn card_reply(name: &str) -> String {
    format!(
        r#"{{"name": "{name}", "text": "Vigilance", "cost": "{{2}}{{W}}", "rarity": "common",
            "types": "creature", "subtypes": "cow", "power": "2", "toughness": "2",
            "flavor": "Moo.", "image_desc": "a stoic cow"}}"#
    )
}

const DECK_REPLY: &str = r#"{"deck": [
    {"name": "Bessie", "count": 4},
    {"name": "Moo Herald", "count": 2},
    {"name": "Cud Chewer", "count": 2},
    {"name": "Forest", "count": 20},
    {"name": "Mystery Card", "count": 2},
    {"name": "bessie", "count": 1}
]}"#;

#[tokio::test]
async fn test_generate_set_keeps_unrendered_cards() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let layout = OutputLayout::new(dir.path().join("output"), dir.path().join("newest.png"))?;
    let renderer = CardRenderer::new(
        FakeArt {
            fail_on: Some("Moo Herald"),
        },
        FakeRenderer::default(),
        layout.clone(),
    );
    let generator = ScriptedTextGenerator::new([card_reply("Bessie"), card_reply("Moo Herald")]);

    let options = SessionOptions {
        theme: "cow tribal".to_string(),
        count: 2,
        retry: RetryPolicy::unbounded(),
    };
    let set = generate_set(&generator, &renderer, &options).await?;

    assert_eq!(set.cards.len(), 2);
    let bessie = set.cards[0].render.as_ref().expect("Bessie renders");
    assert_eq!(std::fs::read(&bessie.art)?, FAKE_PNG);
    assert!(bessie.set_archive.starts_with(layout.sets_dir()));
    assert!(bessie.image.path.is_file());
    assert!(set.cards[1].render.is_none());
    Ok(())
}

#[tokio::test]
async fn test_deck_session_resolves_art_and_exports() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let layout = OutputLayout::new(dir.path().join("output"), dir.path().join("newest.png"))?;
    let renderer = CardRenderer::new(
        FakeArt {
            fail_on: Some("Cud Chewer"),
        },
        FakeRenderer::default(),
        layout.clone(),
    );
    let generator = ScriptedTextGenerator::new([
        card_reply("Bessie"),
        card_reply("Moo Herald"),
        card_reply("Cud Chewer"),
        DECK_REPLY.to_string(),
    ]);

    let options = SessionOptions {
        theme: "cow tribal".to_string(),
        count: 3,
        retry: RetryPolicy::unbounded(),
    };
    let set = generate_set(&generator, &renderer, &options).await?;

    let host = FakeHost::default();
    let path = deck_export_path(&layout).await?;
    let export = export_set_deck(
        &generator,
        &host,
        &FakeLookup,
        set,
        options.retry,
        DEFAULT_BACK_URL,
        path.clone(),
    )
    .await?;

    // one upload per rendered card, even when the deck names it twice,
    // and each upload carries that card's own render
    assert_eq!(
        *host.uploads.lock().unwrap(),
        vec![b"render 0".to_vec(), b"render 1".to_vec()]
    );
    assert_eq!(export.skipped, vec!["Cud Chewer", "Mystery Card"]);
    assert_eq!(export.entries.len(), 4);
    assert_eq!(export.entries[3].image_url, export.entries[0].image_url);

    let saved: Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    let deck = &saved["ObjectStates"][0];
    let ids: Vec<u64> = deck["DeckIDs"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_u64)
        .collect();
    assert_eq!(ids.len(), 27);
    assert_eq!(ids.iter().filter(|&&id| id == 100).count(), 5);
    assert_eq!(ids.iter().filter(|&&id| id == 300).count(), 20);
    assert_eq!(deck["CustomDeck"].as_object().unwrap().len(), 3);
    assert_eq!(deck["CustomDeck"]["1"]["FaceURL"], "https://img.example/0.png");
    assert_eq!(deck["CustomDeck"]["2"]["FaceURL"], "https://img.example/1.png");
    assert_eq!(
        deck["CustomDeck"]["3"]["FaceURL"],
        "https://cards.example/forest.jpg"
    );
    assert_eq!(deck["CustomDeck"]["1"]["BackURL"], DEFAULT_BACK_URL);
    Ok(())
}
