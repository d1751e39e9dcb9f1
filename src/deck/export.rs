//! Tabletop Simulator deck export
//!
//! A deck is saved as one `DeckCustom` object. Every distinct card gets a
//! numbered slot in `CustomDeck` (a 1x1 sheet holding its face image and the
//! shared back); every physical copy is one card id, `slot * 100`, listed in
//! `DeckIDs` and as a contained object.

use crate::core::CardName;
use crate::{CardGenError, Result};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::info;

/// One line of the final deck with its resolved art
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckEntry {
    pub name: CardName,
    pub count: u32,
    pub image_url: String,
}

impl DeckEntry {
    pub fn new(name: impl Into<CardName>, count: u32, image_url: impl Into<String>) -> Self {
        DeckEntry {
            name: name.into(),
            count,
            image_url: image_url.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SavedObject {
    pub object_states: Vec<DeckObject>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeckObject {
    pub name: &'static str,
    pub transform: Transform,
    pub hide_when_face_down: bool,
    #[serde(rename = "DeckIDs")]
    pub deck_ids: Vec<u32>,
    /// Keyed by slot number; TTS expects string keys
    pub custom_deck: BTreeMap<String, CustomDeckSlot>,
    pub contained_objects: Vec<CardObject>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomDeckSlot {
    #[serde(rename = "FaceURL")]
    pub face_url: String,
    #[serde(rename = "BackURL")]
    pub back_url: String,
    pub num_width: u32,
    pub num_height: u32,
    pub back_is_hidden: bool,
    pub unique_back: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CardObject {
    #[serde(rename = "CardID")]
    pub card_id: u32,
    pub name: &'static str,
    pub nickname: String,
    pub transform: Transform,
}

#[derive(Debug, Clone, Serialize)]
pub struct Transform {
    #[serde(rename = "posX")]
    pub pos_x: f32,
    #[serde(rename = "posY")]
    pub pos_y: f32,
    #[serde(rename = "posZ")]
    pub pos_z: f32,
    #[serde(rename = "rotX")]
    pub rot_x: f32,
    #[serde(rename = "rotY")]
    pub rot_y: f32,
    #[serde(rename = "rotZ")]
    pub rot_z: f32,
    #[serde(rename = "scaleX")]
    pub scale_x: f32,
    #[serde(rename = "scaleY")]
    pub scale_y: f32,
    #[serde(rename = "scaleZ")]
    pub scale_z: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Transform {
            pos_x: 0.0,
            pos_y: 1.0,
            pos_z: 0.0,
            rot_x: 0.0,
            rot_y: 180.0,
            rot_z: 180.0,
            scale_x: 1.0,
            scale_y: 1.0,
            scale_z: 1.0,
        }
    }
}

/// Card id of the only card on a slot's 1x1 sheet
pub fn card_id(slot: u32) -> u32 {
    slot * 100
}

/// Assemble the saved object for `entries`
///
/// Entries naming the same card share a slot; the first entry's image wins.
/// Zero-count entries contribute nothing.
pub fn build_deck(entries: &[DeckEntry], back_url: &str) -> Result<SavedObject> {
    let mut slots: FxHashMap<String, u32> = FxHashMap::default();
    let mut custom_deck = BTreeMap::new();
    let mut deck_ids = Vec::new();
    let mut contained_objects = Vec::new();

    for entry in entries.iter().filter(|e| e.count > 0) {
        let next_slot = slots.len() as u32 + 1;
        let slot = *slots.entry(entry.name.lookup_key()).or_insert_with(|| {
            custom_deck.insert(
                next_slot.to_string(),
                CustomDeckSlot {
                    face_url: entry.image_url.clone(),
                    back_url: back_url.to_string(),
                    num_width: 1,
                    num_height: 1,
                    back_is_hidden: true,
                    unique_back: false,
                },
            );
            next_slot
        });

        for _ in 0..entry.count {
            deck_ids.push(card_id(slot));
            contained_objects.push(CardObject {
                card_id: card_id(slot),
                name: "Card",
                nickname: entry.name.to_string(),
                transform: Transform::default(),
            });
        }
    }

    if deck_ids.is_empty() {
        return Err(CardGenError::InvalidDeck("no cards to export".to_string()));
    }

    Ok(SavedObject {
        object_states: vec![DeckObject {
            name: "DeckCustom",
            transform: Transform::default(),
            hide_when_face_down: true,
            deck_ids,
            custom_deck,
            contained_objects,
        }],
    })
}

/// Write the deck to `path`, refusing to replace an existing export
pub async fn export_deck(entries: &[DeckEntry], back_url: &str, path: &Path) -> Result<()> {
    let deck = build_deck(entries, back_url)?;
    let json = serde_json::to_string_pretty(&deck)?;

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
        .map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => CardGenError::ExportExists(path.to_path_buf()),
            _ => CardGenError::IoError(e),
        })?;
    file.write_all(json.as_bytes()).await?;
    file.flush().await?;

    info!(path = %path.display(), cards = deck.object_states[0].deck_ids.len(), "exported deck");
    Ok(())
}
