//! Strongly-typed wrappers for card concepts
//!
//! Card names travel between the model replies, the deck list, the lookup
//! service and the export document. Wrapping them keeps the raw display form
//! separate from the key used to match a deck entry against a generated card.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Card name as printed on the card
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardName(String);

impl CardName {
    pub fn new(s: impl Into<String>) -> Self {
        CardName(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key for matching names written by different sources
    ///
    /// "Mooington's Herd", "mooington’s herd" and " MOOINGTON'S HERD " all map
    /// to the same key.
    pub fn lookup_key(&self) -> String {
        deunicode::deunicode(self.0.trim())
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for CardName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CardName {
    fn from(s: String) -> Self {
        CardName(s)
    }
}

impl From<&str> for CardName {
    fn from(s: &str) -> Self {
        CardName(s.to_string())
    }
}

/// Card rarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    MythicRare,
}

impl Rarity {
    /// Parse the free-form rarity a model writes ("Mythic Rare", "mythic", "rare")
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect();

        match normalized.as_str() {
            "common" => Some(Rarity::Common),
            "uncommon" => Some(Rarity::Uncommon),
            "rare" => Some(Rarity::Rare),
            "mythic" | "mythicrare" => Some(Rarity::MythicRare),
            _ => None,
        }
    }

    /// Rarity keyword understood by the set file format
    pub fn as_set_value(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::MythicRare => "mythic rare",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_set_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_name() {
        let name = CardName::new("Mooington");
        assert_eq!(name.as_str(), "Mooington");
        assert_eq!(name.to_string(), "Mooington");
    }

    #[test]
    fn test_lookup_key_ignores_case_spacing_and_quotes() {
        let a = CardName::new("Mooington's  Herd");
        let b = CardName::new(" mooington\u{2019}s herd");
        assert_eq!(a.lookup_key(), "mooington's herd");
        assert_eq!(a.lookup_key(), b.lookup_key());
    }

    #[test]
    fn test_rarity_parse() {
        assert_eq!(Rarity::parse("Common"), Some(Rarity::Common));
        assert_eq!(Rarity::parse("uncommon"), Some(Rarity::Uncommon));
        assert_eq!(Rarity::parse("Mythic Rare"), Some(Rarity::MythicRare));
        assert_eq!(Rarity::parse("mythic-rare"), Some(Rarity::MythicRare));
        assert_eq!(Rarity::parse("legendary"), None);
    }

    #[test]
    fn test_rarity_set_value() {
        assert_eq!(Rarity::MythicRare.as_set_value(), "mythic rare");
        assert_eq!(Rarity::Rare.to_string(), "rare");
    }
}
