//! Deck assembly and export

pub mod export;

pub use export::{build_deck, card_id, export_deck, DeckEntry, SavedObject};
