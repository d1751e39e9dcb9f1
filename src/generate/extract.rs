//! Structured-record extraction from free-form model replies
//!
//! Models wrap their JSON in prose, in fenced code blocks, or both. Extraction
//! tries, in order:
//! 1. the whole reply
//! 2. every fenced code block (with or without a language tag)
//! 3. the widest `{ ... }` span, then the widest `[ ... ]` span
//!
//! Nothing here returns an error: a reply with no parseable record yields
//! `None` and the caller decides whether to ask again.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Extract the first record of type `T` found in `reply`
pub fn extract<T: DeserializeOwned>(reply: &str) -> Option<T> {
    extract_where(reply, |_| true)
}

/// Like [`extract`], but only JSON objects are considered
///
/// Derived structs also deserialize from arrays, field by position. A reply
/// cut off mid-record would otherwise turn one of its inner lists into a
/// bogus record.
pub fn extract_object<T: DeserializeOwned>(reply: &str) -> Option<T> {
    extract_where(reply, Value::is_object)
}

fn extract_where<T, F>(reply: &str, accept: F) -> Option<T>
where
    T: DeserializeOwned,
    F: Fn(&Value) -> bool,
{
    candidates(reply)
        .filter_map(|text| serde_json::from_str::<Value>(text).ok())
        .filter(|value| accept(value))
        .find_map(|value| serde_json::from_value(value).ok())
}

/// Texts worth parsing, most specific first
fn candidates(reply: &str) -> impl Iterator<Item = &str> {
    let spans = [('{', '}'), ('[', ']')]
        .into_iter()
        .filter_map(move |(open, close)| widest_span(reply, open, close));

    std::iter::once(reply.trim())
        .chain(fenced_blocks(reply))
        .chain(spans)
}

/// Bodies of the fenced code blocks in `text`, in order
///
/// An unterminated trailing fence still yields its body.
fn fenced_blocks(text: &str) -> impl Iterator<Item = &str> {
    text.split("```").skip(1).step_by(2).map(|block| {
        let body = match block.split_once('\n') {
            Some((tag, body)) if is_info_string(tag) => body,
            _ => block,
        };
        body.trim()
    })
}

/// Language tag after an opening fence ("json", "JSON", "")
fn is_info_string(s: &str) -> bool {
    s.trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// From the first `open` to the last `close`, inclusive
fn widest_span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    (start < end).then(|| &text[start..=end])
}
