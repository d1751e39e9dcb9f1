//! Scripted text generator for testing and offline runs
//!
//! Replays a fixed list of replies in order and records the transcript length
//! seen by each request.

use super::TextGenerator;
use crate::generate::transcript::Transcript;
use crate::{CardGenError, Result};
use std::collections::VecDeque;
use std::sync::Mutex;

/// A generator that answers with a predetermined sequence of replies
pub struct ScriptedTextGenerator {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<usize>>,
}

impl ScriptedTextGenerator {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedTextGenerator {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Transcript length at each request, in order
    pub fn request_lengths(&self) -> Vec<usize> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Replies not yet handed out
    pub fn remaining(&self) -> usize {
        self.replies.lock().map(|r| r.len()).unwrap_or(0)
    }
}

impl TextGenerator for ScriptedTextGenerator {
    async fn complete(&self, transcript: &Transcript) -> Result<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(transcript.len());
        }

        self.replies
            .lock()
            .ok()
            .and_then(|mut replies| replies.pop_front())
            .ok_or_else(|| CardGenError::Service {
                service: "scripted",
                message: "script exhausted".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_in_order() {
        let generator = ScriptedTextGenerator::new(["first", "second"]);
        let transcript = Transcript::with_prompt("hi");

        assert_eq!(generator.complete(&transcript).await.unwrap(), "first");
        assert_eq!(generator.complete(&transcript).await.unwrap(), "second");
        assert!(generator.complete(&transcript).await.is_err());
        assert_eq!(generator.request_lengths(), vec![1, 1, 1]);
        assert_eq!(generator.remaining(), 0);
    }
}
