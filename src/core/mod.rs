//! Core card types

pub mod card;
pub mod types;

pub use card::{Card, CardRecord, OneOrMany, Scalar};
pub use types::{CardName, Rarity};
