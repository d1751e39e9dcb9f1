//! Card text generation: transcript, reply extraction, normalization and the
//! conversation drivers

pub mod driver;
pub mod extract;
pub mod normalize;
pub mod prompts;
pub mod transcript;

pub use driver::{generate_cards, request_deck, CardBatch, DeckRequest, RetryPolicy};
pub use extract::{extract, extract_object};
pub use normalize::normalize;
pub use transcript::{Message, Role, Transcript};
