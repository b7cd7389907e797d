/// Seen set: the n-grams already emitted during one generation pass.
use rustc_hash::FxHashSet;

use crate::core::ngram::Ngram;

/// Accumulates n-grams across one guard scope.
///
/// Insert-only: nothing is ever removed, so a collision decision made early
/// in a pass can never be undone by a later one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenSet {
    grams: FxHashSet<Ngram>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.grams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grams.is_empty()
    }

    pub fn contains(&self, gram: &[String]) -> bool {
        self.grams.contains(gram)
    }

    /// Returns true if any of `grams` has already been seen.
    pub fn collides(&self, grams: &FxHashSet<Ngram>) -> bool {
        grams.iter().any(|gram| self.grams.contains(gram))
    }

    /// Number of `grams` that have already been seen.
    pub fn overlap(&self, grams: &FxHashSet<Ngram>) -> usize {
        grams.iter().filter(|gram| self.grams.contains(*gram)).count()
    }

    /// Record `grams` as emitted.
    pub fn absorb(&mut self, grams: FxHashSet<Ngram>) {
        self.grams.extend(grams);
    }

    pub fn is_superset_of(&self, other: &SeenSet) -> bool {
        self.grams.is_superset(&other.grams)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ngram> {
        self.grams.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ngram::sentence_ngrams;

    #[test]
    fn seen_set_default_is_empty() {
        let seen = SeenSet::default();
        assert!(seen.is_empty());
        assert_eq!(seen.len(), 0);
    }

    #[test]
    fn absorb_then_collide() {
        let mut seen = SeenSet::new();
        seen.absorb(sentence_ngrams("the owl sang softly", 3));
        assert_eq!(seen.len(), 2);

        assert!(seen.collides(&sentence_ngrams("then the owl sang again", 3)));
        assert!(!seen.collides(&sentence_ngrams("the fox slept", 3)));
        assert_eq!(seen.overlap(&sentence_ngrams("the owl sang softly now", 3)), 2);
    }

    #[test]
    fn absorb_only_grows() {
        let mut seen = SeenSet::new();
        seen.absorb(sentence_ngrams("a b c d", 2));
        let before = seen.clone();
        seen.absorb(sentence_ngrams("c d e", 2));
        assert!(seen.is_superset_of(&before));
        assert_eq!(seen.len(), 4);
    }
}
