//! Conversation drivers
//!
//! The card phase and the deck phase share one transcript. It is moved from
//! [`generate_cards`] into [`request_deck`] so the deck request sees every
//! card the model wrote.
//!
//! Unparseable replies are retried by re-sending the same transcript; the bad
//! reply is never appended. There is no backoff.

use crate::core::{Card, CardRecord};
use crate::generate::extract::extract_object;
use crate::generate::normalize::normalize;
use crate::generate::prompts::{deck_prompt, SYNERGY_PROMPT};
use crate::generate::transcript::Transcript;
use crate::loader::{DeckList, DeckLoader};
use crate::services::TextGenerator;
use crate::{CardGenError, Result};
use tracing::{debug, info, warn};

/// How many unparseable replies to tolerate per request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryPolicy {
    /// `None` retries until the service cooperates
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    pub fn unbounded() -> Self {
        RetryPolicy { max_attempts: None }
    }

    pub fn at_most(attempts: u32) -> Self {
        RetryPolicy {
            max_attempts: Some(attempts.max(1)),
        }
    }

    fn exhausted(&self, attempts: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }
}

/// Cards generated in one session, with the transcript that produced them
#[derive(Debug, Clone)]
pub struct CardBatch {
    pub transcript: Transcript,
    pub cards: Vec<Card>,
}

/// Deck list requested at the end of a session
#[derive(Debug, Clone)]
pub struct DeckRequest {
    pub transcript: Transcript,
    pub deck: DeckList,
}

/// Request `count` cards, one per round trip
///
/// Each accepted reply is appended to the transcript, followed by the
/// synergy prompt when more cards remain. A record that parses but misses a
/// required field is an error, not a retry.
pub async fn generate_cards<G: TextGenerator>(
    generator: &G,
    mut transcript: Transcript,
    count: usize,
    retry: RetryPolicy,
) -> Result<CardBatch> {
    let mut cards = Vec::with_capacity(count);

    for i in 1..=count {
        let (reply, card) = request_until(generator, &transcript, retry, |reply| {
            match extract_object::<CardRecord>(reply) {
                Some(record) if !record.is_empty() => normalize(record).map(Some),
                _ => Ok(None),
            }
        })
        .await?;

        info!(card = %card.name, types = %card.type_line(), "generated card {i}/{count}");
        transcript.push_assistant(reply);
        if i < count {
            transcript.push_user(SYNERGY_PROMPT);
        }
        cards.push(card);
    }

    Ok(CardBatch { transcript, cards })
}

/// Ask for a 60 card deck built around the cards already in the transcript
pub async fn request_deck<G: TextGenerator>(
    generator: &G,
    mut transcript: Transcript,
    retry: RetryPolicy,
) -> Result<DeckRequest> {
    transcript.push_user(deck_prompt());

    let (reply, deck) = request_until(generator, &transcript, retry, |reply| {
        Ok(DeckLoader::from_reply(reply))
    })
    .await?;

    let total = deck.total_cards();
    if total != 60 {
        warn!(total, "deck list does not have 60 cards");
    }
    info!(entries = deck.entries.len(), total, "received deck list");

    transcript.push_assistant(reply);
    Ok(DeckRequest { transcript, deck })
}

/// Send the transcript until `parse` accepts a reply
///
/// `parse` returns `Ok(None)` for a reply worth retrying and `Err` for one
/// that should end the session.
async fn request_until<G, T, F>(
    generator: &G,
    transcript: &Transcript,
    retry: RetryPolicy,
    mut parse: F,
) -> Result<(String, T)>
where
    G: TextGenerator,
    F: FnMut(&str) -> Result<Option<T>>,
{
    let mut attempts = 0;
    loop {
        attempts += 1;
        let reply = generator.complete(transcript).await?;
        debug!(attempts, reply = %reply, "received reply");

        if let Some(value) = parse(&reply)? {
            return Ok((reply, value));
        }

        warn!(reply = %reply, "could not understand reply, trying again");
        if retry.exhausted(attempts) {
            return Err(CardGenError::RetriesExhausted { attempts });
        }
    }
}
