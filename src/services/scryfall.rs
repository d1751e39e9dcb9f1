//! Scryfall card lookup for stock art

use super::CardLookup;
use crate::Result;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

pub const NAMED_URL: &str = "https://api.scryfall.com/cards/named";

pub struct ScryfallClient {
    client: Client,
}

impl ScryfallClient {
    pub fn new(client: Client) -> Self {
        ScryfallClient { client }
    }
}

impl CardLookup for ScryfallClient {
    async fn find_image(&self, name: &str) -> Result<Option<String>> {
        // Scryfall answers unknown names with a 404 carrying an error object,
        // so the status is not checked here.
        let value: Value = self
            .client
            .get(NAMED_URL)
            .query(&[("exact", name)])
            .header(USER_AGENT, concat!("mtg-card-gen/", env!("CARGO_PKG_VERSION")))
            .header(ACCEPT, "application/json")
            .send()
            .await?
            .json()
            .await?;

        let url = image_from_lookup(&value);
        debug!(card = name, found = url.is_some(), "card lookup");
        Ok(url)
    }
}

/// Normal-size image URL from a named-card reply
///
/// Multi-faced cards keep their images on the faces; the front face wins.
pub fn image_from_lookup(value: &Value) -> Option<String> {
    if value.get("object").and_then(Value::as_str) == Some("error") {
        return None;
    }

    value
        .pointer("/image_uris/normal")
        .or_else(|| value.pointer("/card_faces/0/image_uris/normal"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_faced_card() {
        let value = json!({
            "object": "card",
            "name": "Forest",
            "image_uris": {"small": "s.jpg", "normal": "n.jpg"}
        });
        assert_eq!(image_from_lookup(&value).as_deref(), Some("n.jpg"));
    }

    #[test]
    fn test_double_faced_card() {
        let value = json!({
            "object": "card",
            "card_faces": [
                {"image_uris": {"normal": "front.jpg"}},
                {"image_uris": {"normal": "back.jpg"}}
            ]
        });
        assert_eq!(image_from_lookup(&value).as_deref(), Some("front.jpg"));
    }

    #[test]
    fn test_error_object() {
        let value = json!({
            "object": "error",
            "code": "not_found",
            "status": 404,
            "details": "No cards found matching \u{201c}Mooington\u{201d}"
        });
        assert_eq!(image_from_lookup(&value), None);
    }
}
