//! MTG card generation - AI-written cards, rendered and dealt into a deck
//!
//! Asks a chat model for themed Magic: The Gathering cards, turns each reply
//! into a normalized card, renders it with generated art through Magic Set
//! Editor, and exports a Tabletop Simulator deck built around the new cards.

pub mod config;
pub mod core;
pub mod deck;
pub mod error;
pub mod generate;
pub mod loader;
pub mod render;
pub mod services;
pub mod session;

pub use error::{CardGenError, Result};
