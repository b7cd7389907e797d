/// Repetition guard: filters candidate sentences against a growing seen set.
///
/// Each candidate is accepted as-is when none of its n-grams has been
/// emitted yet. Otherwise its cosmetic variants are tried in order and the
/// first non-colliding one is accepted. When every variant collides the
/// collision policy decides: by default the sentence is dropped.
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::ngram::{sentence_ngrams, Ngram};
use crate::core::seen::SeenSet;
use crate::core::variants::variants;

/// What to do with a sentence whose every variant collides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CollisionPolicy {
    /// Omit the sentence. The unit gets shorter instead of repeating itself.
    #[default]
    Drop,
    /// Keep the variant that shares the fewest n-grams with the seen set.
    KeepLeastColliding,
}

/// A guard scope: one seen set, one n-gram size, one policy.
#[derive(Debug, Clone)]
pub struct RepetitionGuard {
    n: usize,
    policy: CollisionPolicy,
    seen: SeenSet,
}

impl RepetitionGuard {
    /// A guard with an empty seen set and the default drop policy.
    pub fn new(n: usize) -> Self {
        Self::resume(n, SeenSet::new())
    }

    /// A guard that continues from an existing seen set.
    pub fn resume(n: usize, seen: SeenSet) -> Self {
        Self {
            n,
            policy: CollisionPolicy::default(),
            seen,
        }
    }

    pub fn with_policy(mut self, policy: CollisionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn policy(&self) -> CollisionPolicy {
        self.policy
    }

    pub fn seen(&self) -> &SeenSet {
        &self.seen
    }

    pub fn into_seen(self) -> SeenSet {
        self.seen
    }

    /// Decide on a single sentence. Returns the text to emit, if any.
    pub fn admit(&mut self, sentence: &str) -> Option<String> {
        let grams = sentence_ngrams(sentence, self.n);
        if !self.seen.collides(&grams) {
            self.seen.absorb(grams);
            return Some(sentence.to_string());
        }

        let mut least: Option<(usize, String, FxHashSet<Ngram>)> = None;
        for variant in variants(sentence) {
            let grams = sentence_ngrams(&variant, self.n);
            let overlap = self.seen.overlap(&grams);
            if overlap == 0 {
                debug!(original = sentence, variant = %variant, "repetition avoided with variant");
                self.seen.absorb(grams);
                return Some(variant);
            }
            if least.as_ref().map_or(true, |(best, _, _)| overlap < *best) {
                least = Some((overlap, variant, grams));
            }
        }

        match self.policy {
            CollisionPolicy::Drop => {
                debug!(sentence, n = self.n, "dropping repeated sentence");
                None
            }
            CollisionPolicy::KeepLeastColliding => least.map(|(overlap, variant, grams)| {
                debug!(variant = %variant, overlap, "keeping least colliding variant");
                self.seen.absorb(grams);
                variant
            }),
        }
    }

    /// Filter one ordered list of candidates, preserving relative order.
    pub fn filter_sequence<S: AsRef<str>>(&mut self, candidates: &[S]) -> Vec<String> {
        candidates
            .iter()
            .filter_map(|candidate| self.admit(candidate.as_ref()))
            .collect()
    }

    /// Filter grouped candidates with one seen set shared across all groups.
    ///
    /// The output has exactly as many groups as the input; any of them may
    /// come back shorter or empty.
    pub fn filter_grouped<S: AsRef<str>>(&mut self, groups: &[Vec<S>]) -> Vec<Vec<String>> {
        groups
            .iter()
            .map(|group| self.filter_sequence(group))
            .collect()
    }
}

/// Filter `candidates` in a fresh scope at n-gram size `n`.
pub fn filter_sequence<S: AsRef<str>>(candidates: &[S], n: usize) -> Vec<String> {
    RepetitionGuard::new(n).filter_sequence(candidates)
}

/// Filter `groups` in a single fresh scope shared across groups.
pub fn filter_grouped<S: AsRef<str>>(groups: &[Vec<S>], n: usize) -> Vec<Vec<String>> {
    RepetitionGuard::new(n).filter_grouped(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ngram::{ngrams, tokenize, TokenMode};

    fn shares_ngram(a: &str, b: &str, n: usize) -> bool {
        let ga = ngrams(&tokenize(a, TokenMode::Loose), n);
        let gb = ngrams(&tokenize(b, TokenMode::Loose), n);
        ga.iter().any(|g| gb.contains(g))
    }

    #[test]
    fn distinct_sentences_pass_through() {
        let input = [
            "The owl watched the river.",
            "A fox crossed the bridge at dawn.",
            "Nobody spoke of the lantern again.",
        ];
        assert_eq!(filter_sequence(&input, 3), input.to_vec());
    }

    #[test]
    fn variant_replaces_colliding_sentence() {
        // The & variant breaks every shared trigram with the first sentence.
        let input = ["Bread and jam.", "Bread and jam."];
        let out = filter_sequence(&input, 3);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], "Bread and jam.");
        assert_eq!(out[1], "Bread & jam.");
    }

    #[test]
    fn exact_duplicates_collapse() {
        let sentence = "The fox, and the owl sang softly by the river.";
        let input = vec![sentence; 5];
        let out = filter_sequence(&input, 3);
        assert!(!out.is_empty() && out.len() <= 5);
        for i in 0..out.len() {
            for j in (i + 1)..out.len() {
                assert!(
                    !shares_ngram(&out[i], &out[j], 3),
                    "{:?} and {:?} share a trigram",
                    out[i],
                    out[j]
                );
            }
        }
    }

    #[test]
    fn short_sentences_never_collide() {
        let input = ["Hush.", "Hush.", "Hush."];
        assert_eq!(filter_sequence(&input, 3).len(), 3);
    }

    #[test]
    fn order_preserved() {
        let input = [
            "one two three four",
            "one two three four",
            "five six seven eight",
            "nine ten eleven twelve",
        ];
        let out = filter_sequence(&input, 3);
        assert_eq!(
            out,
            vec![
                "one two three four".to_string(),
                "five six seven eight".to_string(),
                "nine ten eleven twelve".to_string(),
            ]
        );
    }

    #[test]
    fn same_input_same_output() {
        let input = [
            "Then, the lantern flickered and went out.",
            "The lantern flickered and went out.",
            "Somewhere, the lantern flickered and went out.",
        ];
        let start = {
            let mut guard = RepetitionGuard::new(3);
            guard.filter_sequence(&["the lantern flickered twice"]);
            guard.into_seen()
        };
        let a = RepetitionGuard::resume(3, start.clone()).filter_sequence(&input);
        let b = RepetitionGuard::resume(3, start).filter_sequence(&input);
        assert_eq!(a, b);
    }

    #[test]
    fn seen_set_only_grows() {
        let mut guard = RepetitionGuard::new(2);
        guard.filter_sequence(&["red fish blue fish"]);
        let before = guard.seen().clone();
        guard.filter_sequence(&["red fish again", "one fish two fish"]);
        assert!(guard.seen().is_superset_of(&before));
        assert!(guard.seen().len() >= before.len());
    }

    #[test]
    fn filtered_output_is_stable() {
        let input = [
            "The door creaked, and the hall went cold.",
            "The door creaked, and the hall went cold.",
            "The hall went cold as the door creaked.",
            "Mira counted the stairs twice.",
            "Mira counted the stairs twice, and then once more.",
        ];
        for n in [2, 3, 4] {
            let once = filter_sequence(&input, n);
            let twice = filter_sequence(&once, n);
            assert_eq!(once, twice, "n = {}", n);
        }
    }

    #[test]
    fn grouped_shares_scope_and_keeps_groups() {
        let groups = vec![
            vec!["the storm rolled over the hills"],
            vec!["the storm rolled over the hills", "a bird sang"],
            vec![],
        ];
        let out = filter_grouped(&groups, 3);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], vec!["the storm rolled over the hills".to_string()]);
        assert_eq!(out[1], vec!["a bird sang".to_string()]);
        assert!(out[2].is_empty());
    }

    #[test]
    fn group_may_become_empty() {
        let groups = vec![vec!["quiet quiet quiet night"], vec!["quiet quiet quiet night"]];
        let out = filter_grouped(&groups, 3);
        assert_eq!(out[0].len(), 1);
        assert!(out[1].is_empty());
    }

    #[test]
    fn keep_least_colliding_never_drops() {
        let input = ["one two three four", "one two three four"];
        let mut guard = RepetitionGuard::new(3).with_policy(CollisionPolicy::KeepLeastColliding);
        let out = guard.filter_sequence(&input);
        assert_eq!(out.len(), 2);
        assert_eq!(guard.policy(), CollisionPolicy::KeepLeastColliding);
    }
}
