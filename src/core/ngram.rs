/// Word tokenization, n-gram windows, and lexical uniqueness scoring.
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// An ordered run of `n` consecutive tokens.
pub type Ngram = Vec<String>;

/// How strictly text is split into tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenMode {
    /// Lowercase, split on whitespace. Punctuation stays attached to words.
    Loose,
    /// Lowercase, keep only runs of letters and apostrophes.
    Strict,
}

/// Split `text` into lowercase word tokens.
pub fn tokenize(text: &str, mode: TokenMode) -> Vec<String> {
    let lowered = text.to_lowercase();
    match mode {
        TokenMode::Loose => lowered.split_whitespace().map(str::to_string).collect(),
        TokenMode::Strict => lowered
            .split(|c: char| !(c.is_alphabetic() || c == '\''))
            .filter(|run| !run.is_empty())
            .map(str::to_string)
            .collect(),
    }
}

/// The set of all contiguous `n`-token windows in `tokens`.
///
/// Repeated windows collapse into one entry. Returns an empty set when
/// `n == 0` or there are fewer than `n` tokens.
pub fn ngrams(tokens: &[String], n: usize) -> FxHashSet<Ngram> {
    if n == 0 || tokens.len() < n {
        return FxHashSet::default();
    }
    tokens.windows(n).map(|window| window.to_vec()).collect()
}

/// Loose-tokenize a sentence and return its `n`-gram set.
pub fn sentence_ngrams(sentence: &str, n: usize) -> FxHashSet<Ngram> {
    ngrams(&tokenize(sentence, TokenMode::Loose), n)
}

/// Ratio of distinct n-grams to n-gram positions, aggregated over chunks.
///
/// The stream is cut into consecutive chunks of `window` tokens (the last
/// chunk may be shorter; `window == 0` means a single chunk). The result is
/// `sum(distinct) / sum(positions)` across chunks, so longer chunks weigh
/// more. Chunks shorter than `n` are skipped. With no positions at all the
/// text is considered fully unique and 1.0 is returned.
pub fn uniqueness_ratio(tokens: &[String], n: usize, window: usize) -> f64 {
    if tokens.is_empty() || n == 0 {
        return 1.0;
    }
    let window = if window == 0 { tokens.len() } else { window };

    let mut unique = 0usize;
    let mut total = 0usize;
    for chunk in tokens.chunks(window) {
        if chunk.len() < n {
            continue;
        }
        total += chunk.len() - n + 1;
        unique += ngrams(chunk, n).len();
    }

    if total == 0 {
        1.0
    } else {
        unique as f64 / total as f64
    }
}
