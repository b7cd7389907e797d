/// Optional external text generation, injected into the engine.
///
/// The assembler asks a backend for a continuation of each beat prompt. Any
/// failure falls back to the handcrafted sentence banks, so a backend never
/// has to be present or reliable.
use thiserror::Error;

use crate::core::style::TERMINALS;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BackendError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("generation failed: {0}")]
    Failed(String),
}

/// A source of free-form prose continuations.
pub trait TextBackend: Send + Sync {
    /// Continue `prompt`. `seed` is the story seed, for backends that can
    /// sample reproducibly.
    fn continue_text(&self, prompt: &str, seed: u64) -> Result<String, BackendError>;

    /// Backend name, used in log output.
    fn name(&self) -> &str {
        "backend"
    }
}

impl<F> TextBackend for F
where
    F: Fn(&str, u64) -> Result<String, BackendError> + Send + Sync,
{
    fn continue_text(&self, prompt: &str, seed: u64) -> Result<String, BackendError> {
        self(prompt, seed)
    }
}

/// Split prose into trimmed sentences at `.`, `!` or `?` followed by
/// whitespace. Text after the last terminal is kept as a final sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        let at_boundary = TERMINALS.contains(&c)
            && chars.peek().map_or(true, |next| next.is_whitespace());
        if at_boundary {
            let sentence = current.trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            current.clear();
        }
    }

    let rest = current.trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }
    sentences
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_basic() {
        let parts = split_sentences("One thing. Another thing! A third? ");
        assert_eq!(parts, vec!["One thing.", "Another thing!", "A third?"]);
    }

    #[test]
    fn split_keeps_inner_dots_and_tail() {
        let parts = split_sentences("It cost 3.50 dollars. And then the rain");
        assert_eq!(parts, vec!["It cost 3.50 dollars.", "And then the rain"]);
    }

    #[test]
    fn split_empty() {
        assert!(split_sentences("   ").is_empty());
    }

    #[test]
    fn closures_are_backends() {
        let echo = |prompt: &str, seed: u64| -> Result<String, BackendError> {
            Ok(format!("{} ({})", prompt, seed))
        };
        assert_eq!(echo.continue_text("hi", 3).unwrap(), "hi (3)");
        assert_eq!(echo.name(), "backend");

        let broken = |_: &str, _: u64| -> Result<String, BackendError> {
            Err(BackendError::Unavailable("no model".to_string()))
        };
        assert!(broken.continue_text("hi", 3).is_err());
    }
}
