/// Style pass: light tone-driven touches applied to every candidate sentence.
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Sentence-ending punctuation.
pub const TERMINALS: &[char] = &['.', '!', '?'];

/// Openers and adjectives associated with one tone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToneStyle {
    /// Words or short phrases that may lead a sentence, e.g. "In time".
    pub openers: Vec<String>,
    pub adjectives: Vec<String>,
}

/// The style pass applied to each sentence before the repetition guard.
pub struct StylePass;

impl StylePass {
    /// Maybe prepend an opener, maybe inject an adjective after the first
    /// word, then capitalize, terminate, and collapse whitespace.
    pub fn apply(text: &str, style: &ToneStyle, rng: &mut StdRng) -> String {
        let opener = style.openers.choose(rng).filter(|_| rng.gen_bool(0.5));
        let adjective = style.adjectives.choose(rng).filter(|_| rng.gen_bool(0.5));

        let mut sentence = text.trim().to_string();
        if let Some(adjective) = adjective {
            if rng.gen_bool(0.5) {
                sentence = inject_after_first_word(&sentence, adjective);
            }
        }
        if let Some(opener) = opener {
            sentence = format!("{}, {}", opener, sentence);
        }

        collapse_whitespace(&ensure_terminal(&capitalize_first(&sentence)))
    }
}

fn inject_after_first_word(sentence: &str, word: &str) -> String {
    match sentence.split_once(' ') {
        Some((first, rest)) => format!("{} {} {}", first, word, rest),
        None => sentence.to_string(),
    }
}

pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Append a period unless the text already ends a sentence.
pub fn ensure_terminal(text: &str) -> String {
    let trimmed = text.trim_end();
    if trimmed.is_empty() || trimmed.ends_with(TERMINALS) {
        trimmed.to_string()
    } else {
        format!("{}.", trimmed)
    }
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
