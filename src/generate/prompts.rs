//! Fixed prompts sent to the text-generation service

/// Follow-up asked after every card except the last
pub const SYNERGY_PROMPT: &str =
    "Could you make another card with the same theme that synergizes with that?";

/// Opening prompt for a themed card
pub fn card_prompt(theme: &str) -> String {
    format!(
        r#"Could you generate a new magic card? It should have a theme around "{theme}". Output it as json and use this template:
```json
{{
	"name": <name>,
	"text": <formatted text, lines in array>,
	"cost": <mana cost>,
	"rarity": <common, uncommon, rare or mythic rare>,
	"types": <super types array>,
	"subtypes": <sub types array>,
	"power": <power>,
	"toughness": <toughness>,
	"flavor": <flavor text>,
	"image_desc": <image description>
}}
```"#
    )
}

/// Deck request appended once all cards are generated
pub fn deck_prompt() -> &'static str {
    r#"Could you build a 60 card deck using those cards and any existing relevant magic cards? Output it as json and use this template:
```json
[
	{"name": <card name>, "count": <number of copies>},
	{"name": <card name>, "count": <number of copies>}
]
```"#
}
