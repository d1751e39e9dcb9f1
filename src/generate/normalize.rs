//! Card normalization: raw model record -> display-ready card

use crate::core::{Card, CardName, CardRecord, Rarity};
use crate::{CardGenError, Result};
use tracing::warn;

/// Separator between rule text lines (and flavor lines) in the set file
pub const INDENT: &str = "\n\t\t";

/// Turn a parsed record into a card
///
/// `name`, `text`, `flavor` and a non-empty `types` are required; a record
/// without them is not a card and the error propagates to the caller.
pub fn normalize(record: CardRecord) -> Result<Card> {
    let CardRecord {
        name,
        text,
        cost,
        rarity,
        types,
        subtypes,
        power,
        toughness,
        flavor,
        image_desc,
    } = record;

    let types = types
        .map(|t| t.into_items())
        .filter(|t| t.iter().any(|s| !s.trim().is_empty()))
        .ok_or(CardGenError::MissingField("types"))?;
    let text = text.ok_or(CardGenError::MissingField("text"))?;
    let name = name.ok_or(CardGenError::MissingField("name"))?;
    let flavor = flavor.ok_or(CardGenError::MissingField("flavor"))?;

    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(CardGenError::InvalidCard("empty card name".to_string()));
    }

    let rarity = rarity.and_then(|r| {
        let parsed = Rarity::parse(&r);
        if parsed.is_none() {
            warn!(rarity = %r, card = %name, "unknown rarity, leaving it blank");
        }
        parsed
    });

    let subtypes = subtypes.map(|s| s.into_items()).unwrap_or_default();

    Ok(Card {
        super_type: title_case_join(types.as_slice()),
        sub_type: title_case_join(subtypes.as_slice()),
        text: format_rule_text(text.into_items().as_slice(), &name),
        flavor: format_flavor(&flavor),
        cost: cost.map(|c| c.into_string()).unwrap_or_default(),
        rarity,
        power: power.map(|p| p.into_string()),
        toughness: toughness.map(|t| t.into_string()),
        image_desc: image_desc.unwrap_or_default(),
        name: CardName::new(name),
    })
}

/// Title-case every word and join with single spaces
///
/// `["creature", "legendary"]` -> `"Creature Legendary"`
pub fn title_case_join<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .flat_map(|item| item.as_ref().split_whitespace())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

/// Trim and indent rule text lines, then escape symbols
///
/// Items may hold several lines themselves; blank lines are dropped.
pub fn format_rule_text<S: AsRef<str>>(lines: &[S], name: &str) -> String {
    let joined = lines
        .iter()
        .flat_map(|item| item.as_ref().lines())
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(INDENT);
    escape_rule_text(&joined, name)
}

/// Replace `{X}` with `<sym>X</sym>` and `~` with the card name tag
///
/// Single pass over the input so text inserted for `~` is never re-escaped.
pub fn escape_rule_text(text: &str, name: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '{' => out.push_str("<sym>"),
            '}' => out.push_str("</sym>"),
            '~' => {
                out.push_str("<atom-cardname><nospellcheck>");
                out.push_str(name);
                out.push_str("</nospellcheck></atom-cardname>");
            }
            _ => out.push(c),
        }
    }
    out
}

/// Put every flavor line on its own indented line
pub fn format_flavor(flavor: &str) -> String {
    flavor
        .trim()
        .lines()
        .map(str::trim_start)
        .collect::<Vec<_>>()
        .join(INDENT)
}
