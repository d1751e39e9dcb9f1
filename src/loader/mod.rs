//! Deck list loading
//!
//! Parsers for the deck lists the model writes (JSON or plain listings)

pub mod deck;

pub use deck::{DeckList, DeckListEntry, DeckLoader};
