/// Guard and scoring settings, loadable from RON.
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::banks::ConfigError;
use crate::core::guard::CollisionPolicy;
use crate::schema::params::StoryLength;

/// Minimum uniqueness score per story length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub short: f64,
    pub medium: f64,
    pub long: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            short: 0.86,
            medium: 0.90,
            long: 0.92,
        }
    }
}

/// N-gram sizes and thresholds used by the assembler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardSettings {
    /// N-gram size of the per-beat guard.
    pub local_n: usize,
    /// N-gram size of the cross-beat guard.
    pub global_n: usize,
    /// N-gram size of the final uniqueness score.
    pub score_n: usize,
    /// Chunk size of the final score; 0 scores the whole text as one chunk.
    pub score_window: usize,
    pub policy: CollisionPolicy,
    pub thresholds: Thresholds,
}

impl Default for GuardSettings {
    fn default() -> Self {
        Self {
            local_n: 4,
            global_n: 4,
            score_n: 4,
            score_window: 0,
            policy: CollisionPolicy::Drop,
            thresholds: Thresholds::default(),
        }
    }
}

impl GuardSettings {
    pub fn load_from_ron(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    pub fn parse_ron(input: &str) -> Result<Self, ConfigError> {
        let settings: GuardSettings = ron::from_str(input)?;
        settings.check()?;
        Ok(settings)
    }

    pub fn threshold(&self, length: StoryLength) -> f64 {
        match length {
            StoryLength::Short => self.thresholds.short,
            StoryLength::Medium => self.thresholds.medium,
            StoryLength::Long => self.thresholds.long,
        }
    }

    /// Reject n-gram sizes of zero and thresholds outside [0, 1].
    pub fn check(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();
        for (name, n) in [
            ("local_n", self.local_n),
            ("global_n", self.global_n),
            ("score_n", self.score_n),
        ] {
            if n == 0 {
                problems.push(format!("{} must be at least 1", name));
            }
        }
        for length in StoryLength::ALL {
            let threshold = self.threshold(length);
            if !(0.0..=1.0).contains(&threshold) {
                problems.push(format!(
                    "threshold for {} must be within 0..=1, got {}",
                    length, threshold
                ));
            }
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = GuardSettings::default();
        assert_eq!(settings.local_n, 4);
        assert_eq!(settings.global_n, 4);
        assert_eq!(settings.policy, CollisionPolicy::Drop);
        assert_eq!(settings.threshold(StoryLength::Short), 0.86);
        assert_eq!(settings.threshold(StoryLength::Medium), 0.90);
        assert_eq!(settings.threshold(StoryLength::Long), 0.92);
        assert!(settings.check().is_ok());
    }

    #[test]
    fn partial_ron_keeps_defaults() {
        let settings =
            GuardSettings::parse_ron("(local_n: 3, policy: KeepLeastColliding, thresholds: (long: 0.8))")
                .unwrap();
        assert_eq!(settings.local_n, 3);
        assert_eq!(settings.global_n, 4);
        assert_eq!(settings.policy, CollisionPolicy::KeepLeastColliding);
        assert_eq!(settings.thresholds.long, 0.8);
        assert_eq!(settings.thresholds.short, 0.86);
    }

    #[test]
    fn invalid_values_rejected() {
        let err = GuardSettings::parse_ron("(score_n: 0, thresholds: (short: 1.5))").unwrap_err();
        match err {
            ConfigError::Invalid(problems) => assert_eq!(problems.len(), 2),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn load_fixture() {
        let path = std::path::PathBuf::from("tests/fixtures/strict_guard.ron");
        let settings = GuardSettings::load_from_ron(&path).unwrap();
        assert_eq!(settings.local_n, 3);
        assert_eq!(settings.global_n, 3);
        assert_eq!(settings.score_window, 50);
    }
}
