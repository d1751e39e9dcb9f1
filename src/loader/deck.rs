//! Deck list parsing
//!
//! The deck request asks for JSON, but models sometimes answer with a plain
//! listing ("4 Mooington", "20x Forest"). Both shapes are accepted.

use crate::core::CardName;
use crate::generate::extract::extract;
use crate::{CardGenError, Result};
use serde::{Deserialize, Serialize};

/// Deck list loader for JSON and plain-text listings
pub struct DeckLoader;

impl DeckLoader {
    /// Find a deck list in a model reply
    ///
    /// Returns `None` when the reply holds no usable list, so the caller can
    /// ask again.
    pub fn from_reply(reply: &str) -> Option<DeckList> {
        let entries = match extract::<DeckReply>(reply) {
            Some(DeckReply::List(entries)) | Some(DeckReply::Wrapped { deck: entries }) => entries,
            None => Self::parse(reply).ok()?.entries,
        };

        let entries: Vec<DeckListEntry> = entries
            .into_iter()
            .filter(|e| e.count > 0 && !e.name.as_str().trim().is_empty())
            .collect();

        (!entries.is_empty()).then_some(DeckList { entries })
    }

    /// Parse a plain-text listing, one "<count> <name>" per line
    pub fn parse(content: &str) -> Result<DeckList> {
        let mut entries = Vec::new();

        for line in content.lines() {
            let line = line.trim().trim_start_matches(['-', '*']).trim();

            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }

            // Format: "4 Card Name" or "4x Card Name"
            if let Some((count_str, rest)) = line.split_once(' ') {
                let count_str = count_str.trim_end_matches(['x', 'X']);
                if let Ok(count) = count_str.parse::<u32>() {
                    let name = rest.trim();
                    // "60 cards total." is a sentence, not a list line
                    if !name.is_empty() && !name.ends_with(['.', ':']) {
                        entries.push(DeckListEntry {
                            name: CardName::new(name),
                            count,
                        });
                    }
                }
            }
        }

        if entries.is_empty() {
            return Err(CardGenError::InvalidDeck("Empty deck".to_string()));
        }

        Ok(DeckList { entries })
    }
}

/// JSON shapes a deck reply may take
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DeckReply {
    List(Vec<DeckListEntry>),
    Wrapped {
        #[serde(alias = "cards")]
        deck: Vec<DeckListEntry>,
    },
}

/// One requested line of the deck (card name and count)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckListEntry {
    pub name: CardName,
    #[serde(alias = "quantity", alias = "copies")]
    pub count: u32,
}

/// Deck list as requested from the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckList {
    pub entries: Vec<DeckListEntry>,
}

impl DeckList {
    /// Total cards across all entries
    pub fn total_cards(&self) -> usize {
        self.entries.iter().map(|e| e.count as usize).sum()
    }
}
