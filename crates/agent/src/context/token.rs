//! Token counting and hard truncation.
//!
//! The tokenizer is a shared capability: one [`SharedTokenizer`] is cloned
//! into every session and each count takes its lock, so concurrent sessions
//! can share a tokenizer that is not itself thread-safe.

use std::sync::{Arc, Mutex};
use tracing::warn;

/// Estimate the token count for a string.
///
/// Heuristic: 1 token ≈ 4 characters. Rounds up.
pub fn estimate_tokens(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    (text.len() + 3) / 4
}

/// Counts tokens in text.
pub trait TokenCounter: Send {
    fn count(&self, text: &str) -> usize;
}

/// Character heuristic, used when no tokenizer file is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicCounter;

impl TokenCounter for HeuristicCounter {
    fn count(&self, text: &str) -> usize {
        estimate_tokens(text)
    }
}

/// HuggingFace `tokenizer.json` backed counter.
#[cfg(feature = "hf-tokenizer")]
pub struct HfTokenCounter {
    tokenizer: tokenizers::Tokenizer,
}

#[cfg(feature = "hf-tokenizer")]
impl HfTokenCounter {
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, plugchain_core::Error> {
        let path = path.as_ref();
        let tokenizer = tokenizers::Tokenizer::from_file(path).map_err(|e| {
            plugchain_core::Error::Config {
                message: format!("Failed to load tokenizer {}: {e}", path.display()),
            }
        })?;
        Ok(Self { tokenizer })
    }
}

#[cfg(feature = "hf-tokenizer")]
impl TokenCounter for HfTokenCounter {
    fn count(&self, text: &str) -> usize {
        match self.tokenizer.encode(text, false) {
            Ok(encoding) => encoding.len(),
            Err(e) => {
                warn!(error = %e, "Tokenizer failed, falling back to estimate");
                estimate_tokens(text)
            }
        }
    }
}

/// A token counter shared between sessions behind a mutex.
#[derive(Clone)]
pub struct SharedTokenizer {
    inner: Arc<Mutex<Box<dyn TokenCounter>>>,
}

impl SharedTokenizer {
    pub fn new(counter: impl TokenCounter + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(counter))),
        }
    }

    pub fn heuristic() -> Self {
        Self::new(HeuristicCounter)
    }

    pub fn count(&self, text: &str) -> usize {
        let counter = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        counter.count(text)
    }
}

impl Default for SharedTokenizer {
    fn default() -> Self {
        Self::heuristic()
    }
}

impl std::fmt::Debug for SharedTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedTokenizer").finish_non_exhaustive()
    }
}

/// Keep the longest suffix of `prompt` that fits in `limit` tokens.
///
/// The end of the prompt carries the current input and tool transcript, so
/// the head is what gets cut.
pub fn hard_truncate(prompt: &str, tokenizer: &SharedTokenizer, limit: usize) -> String {
    let total = tokenizer.count(prompt);
    if total <= limit {
        return prompt.to_string();
    }

    // Byte offsets of every char boundary; a larger start index keeps less text.
    let starts: Vec<usize> = prompt
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(prompt.len()))
        .collect();

    let (mut lo, mut hi) = (0usize, starts.len() - 1);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if tokenizer.count(&prompt[starts[mid]..]) <= limit {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }

    let kept = &prompt[starts[lo]..];
    warn!(
        tokens = total,
        limit,
        dropped_chars = lo,
        "Prompt over token limit, truncating head"
    );
    kept.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct WordCounter;

    impl TokenCounter for WordCounter {
        fn count(&self, text: &str) -> usize {
            text.split_whitespace().count()
        }
    }

    #[test]
    fn empty_string_is_zero() {
        assert_eq!(estimate_tokens(""), 0);
    }

    #[test]
    fn five_chars_rounds_up() {
        assert_eq!(estimate_tokens("hello"), 2);
    }

    #[test]
    fn hard_truncate_keeps_fitting_prompt() {
        let tok = SharedTokenizer::heuristic();
        assert_eq!(hard_truncate("short prompt", &tok, 100), "short prompt");
    }

    #[test]
    fn hard_truncate_keeps_longest_suffix() {
        let tok = SharedTokenizer::new(WordCounter);
        let out = hard_truncate("one two three four five", &tok, 2);
        // The cut lands on the boundary before "four".
        assert_eq!(out, " four five");
    }

    #[test]
    fn hard_truncate_heuristic_bound() {
        let tok = SharedTokenizer::heuristic();
        let prompt = "x".repeat(100);
        let out = hard_truncate(&prompt, &tok, 10);
        assert_eq!(out.len(), 40);
        assert!(prompt.ends_with(&out));
    }

    #[test]
    fn hard_truncate_respects_char_boundaries() {
        let tok = SharedTokenizer::heuristic();
        let prompt = "é".repeat(50);
        let out = hard_truncate(&prompt, &tok, 5);
        assert!(tok.count(&out) <= 5);
        assert!(out.chars().all(|c| c == 'é'));
    }

    #[test]
    fn hard_truncate_zero_limit() {
        let tok = SharedTokenizer::heuristic();
        assert_eq!(hard_truncate("abc", &tok, 0), "");
    }

    #[test]
    fn shared_tokenizer_across_threads() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        struct Counting;
        impl TokenCounter for Counting {
            fn count(&self, text: &str) -> usize {
                CALLS.fetch_add(1, Ordering::SeqCst);
                text.len()
            }
        }

        let tok = SharedTokenizer::new(Counting);
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let tok = tok.clone();
                std::thread::spawn(move || tok.count(&"a".repeat(i)))
            })
            .collect();
        let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, (0..8).sum::<usize>());
        assert_eq!(CALLS.load(Ordering::SeqCst), 8);
    }
}
