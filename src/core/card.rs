//! Card records
//!
//! `CardRecord` is what the model wrote, as loosely as it wrote it.
//! `Card` is the normalized, display-ready form that the renderer consumes.

use crate::core::{CardName, Rarity};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A JSON value the model may write either as a string or a number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl Scalar {
    pub fn into_string(self) -> String {
        match self {
            Scalar::Text(s) => s,
            Scalar::Number(n) => n.to_string(),
        }
    }
}

/// A JSON value the model may write either as one string or a list of them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_items(self) -> SmallVec<[String; 4]> {
        match self {
            OneOrMany::One(s) => SmallVec::from_elem(s, 1),
            OneOrMany::Many(v) => SmallVec::from_vec(v),
        }
    }
}

/// Card record as parsed from a model reply
///
/// Every field is optional here; the normalizer decides what is required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
    #[serde(default, alias = "title")]
    pub name: Option<String>,

    /// Rule text, one entry per line
    #[serde(default)]
    pub text: Option<OneOrMany>,

    #[serde(default, alias = "manaCost", alias = "mana_cost")]
    pub cost: Option<Scalar>,

    #[serde(default)]
    pub rarity: Option<String>,

    /// Super types ("creature", "legendary", ...)
    #[serde(default)]
    pub types: Option<OneOrMany>,

    #[serde(default)]
    pub subtypes: Option<OneOrMany>,

    #[serde(default)]
    pub power: Option<Scalar>,

    #[serde(default)]
    pub toughness: Option<Scalar>,

    #[serde(default)]
    pub flavor: Option<String>,

    #[serde(default)]
    pub image_desc: Option<String>,
}

impl CardRecord {
    /// True when the reply parsed as an object but carried none of the card keys
    pub fn is_empty(&self) -> bool {
        *self == CardRecord::default()
    }
}

/// Normalized card, ready for the set file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub name: CardName,
    pub cost: String,
    pub rarity: Option<Rarity>,
    /// Title-cased super types joined with spaces ("Legendary Creature")
    pub super_type: String,
    /// Title-cased subtypes joined with spaces, empty when there are none
    pub sub_type: String,
    /// Escaped rule text, lines joined with the set file indentation
    pub text: String,
    /// Flavor text, lines joined with the set file indentation
    pub flavor: String,
    pub power: Option<String>,
    pub toughness: Option<String>,
    pub image_desc: String,
}

impl Card {
    /// Type line as printed on the card ("Creature — Cow Warrior")
    pub fn type_line(&self) -> String {
        if self.sub_type.is_empty() {
            self.super_type.clone()
        } else {
            format!("{} \u{2014} {}", self.super_type, self.sub_type)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_accepts_loose_shapes() {
        let json = r#"{
            "title": "Mooington",
            "text": "Flying.",
            "manaCost": "{2}{G}",
            "types": "creature",
            "power": 3,
            "toughness": "3"
        }"#;
        let record: CardRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.name.as_deref(), Some("Mooington"));
        assert_eq!(
            record.text.unwrap().into_items().as_slice(),
            &["Flying.".to_string()]
        );
        assert_eq!(record.cost.unwrap().into_string(), "{2}{G}");
        assert_eq!(record.power.unwrap().into_string(), "3");
        assert_eq!(record.toughness.unwrap().into_string(), "3");
        assert!(record.subtypes.is_none());
    }

    #[test]
    fn test_empty_record() {
        let record: CardRecord = serde_json::from_str("{}").unwrap();
        assert!(record.is_empty());

        let record: CardRecord = serde_json::from_str(r#"{"name": "Bessie"}"#).unwrap();
        assert!(!record.is_empty());
    }

    #[test]
    fn test_type_line() {
        let mut card = Card {
            name: CardName::new("Mooington"),
            cost: "{2}{G}".to_string(),
            rarity: Some(Rarity::Rare),
            super_type: "Legendary Creature".to_string(),
            sub_type: "Cow".to_string(),
            text: String::new(),
            flavor: String::new(),
            power: Some("3".to_string()),
            toughness: Some("3".to_string()),
            image_desc: String::new(),
        };
        assert_eq!(card.type_line(), "Legendary Creature \u{2014} Cow");

        card.sub_type.clear();
        assert_eq!(card.type_line(), "Legendary Creature");
    }
}
