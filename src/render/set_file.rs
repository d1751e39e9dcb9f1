//! Magic Set Editor set document for a single card

use crate::core::Card;

/// Name of the image entry inside the set archive, referenced by the document
pub const IMAGE_ENTRY: &str = "image1";

/// Name of the document entry inside the set archive
pub const SET_ENTRY: &str = "set";

/// Build the `set` document for one card
///
/// Rule text and flavor are already joined with the nested indentation the
/// format expects (see [`crate::generate::normalize::INDENT`]).
pub fn set_document(card: &Card) -> String {
    let rarity = card.rarity.map(|r| r.as_set_value()).unwrap_or_default();

    format!(
        "mse_version: 2.0.2
game: magic
game_version: 2020-04-25
stylesheet: m15-altered
stylesheet_version: 2023-02-13
set_info:
\tsymbol:
\tmasterpiece_symbol:
styling:
\tmagic-m15-altered:
\t\ttext_box_mana_symbols: magic-mana-small.mse-symbol-font
\t\tlevel_mana_symbols: magic-mana-large.mse-symbol-font
\t\toverlay:
card:
\thas_styling: false
\tnotes:
\tname: {name}
\tcasting_cost: {cost}
\timage: {IMAGE_ENTRY}
\tsuper_type: <word-list-type>{super_type}</word-list-type>
\tsub_type: {sub_type}
\trule_text:
\t\t{text}
\tflavor_text:
\t\t<i-flavor>{flavor}</i-flavor>
\tpower: {power}
\ttoughness: {toughness}
\tcard_code_text: \"AI\"
\trarity: {rarity}
\timage_2:
\tmainframe_image:
\tmainframe_image_2:
version_control:
\ttype: none
apprentice_code:
",
        name = card.name,
        cost = casting_cost(&card.cost),
        super_type = card.super_type,
        sub_type = card.sub_type,
        text = card.text,
        flavor = card.flavor,
        power = card.power.as_deref().unwrap_or_default(),
        toughness = card.toughness.as_deref().unwrap_or_default(),
    )
}

/// Mana cost in the editor's notation: "{2}{G}{G}" -> "2GG"
fn casting_cost(cost: &str) -> String {
    cost.chars()
        .filter(|c| !matches!(c, '{' | '}') && !c.is_whitespace())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CardName, Rarity};
    use similar_asserts::assert_eq;

    fn card() -> Card {
        Card {
            name: CardName::new("Mooington"),
            cost: "{2}{G}".to_string(),
            rarity: Some(Rarity::MythicRare),
            super_type: "Legendary Creature".to_string(),
            sub_type: "Cow".to_string(),
            text: "Flying.\n\t\t<sym>T</sym>: draw a card.".to_string(),
            flavor: "Moo.\n\t\tMoo again.".to_string(),
            power: Some("3".to_string()),
            toughness: Some("4".to_string()),
            image_desc: "a cow".to_string(),
        }
    }

    #[test]
    fn test_card_block() {
        let doc = set_document(&card());
        let card_block: Vec<&str> = doc
            .lines()
            .skip_while(|l| *l != "card:")
            .take_while(|l| *l != "version_control:")
            .collect();

        assert_eq!(
            card_block.join("\n"),
            "card:
\thas_styling: false
\tnotes:
\tname: Mooington
\tcasting_cost: 2G
\timage: image1
\tsuper_type: <word-list-type>Legendary Creature</word-list-type>
\tsub_type: Cow
\trule_text:
\t\tFlying.
\t\t<sym>T</sym>: draw a card.
\tflavor_text:
\t\t<i-flavor>Moo.
\t\tMoo again.</i-flavor>
\tpower: 3
\ttoughness: 4
\tcard_code_text: \"AI\"
\trarity: mythic rare
\timage_2:
\tmainframe_image:
\tmainframe_image_2:"
        );
    }

    #[test]
    fn test_header() {
        let doc = set_document(&card());
        assert!(doc.starts_with("mse_version: 2.0.2\ngame: magic\n"));
        assert!(doc.contains("stylesheet: m15-altered\n"));
    }

    #[test]
    fn test_optional_fields_blank() {
        let mut card = card();
        card.power = None;
        card.toughness = None;
        card.rarity = None;
        let doc = set_document(&card);
        assert!(doc.contains("\n\tpower: \n"));
        assert!(doc.contains("\n\ttoughness: \n"));
        assert!(doc.contains("\n\trarity: \n"));
    }
}
