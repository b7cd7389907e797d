use serde::{Deserialize, Serialize};

use super::params::StoryParams;
use super::plan::StoryPlan;

/// A generated story plus the metadata frontends display or store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    /// Paragraphs joined by blank lines.
    pub text: String,
    /// One paragraph per beat, in beat order. A beat whose every sentence
    /// was filtered out leaves an empty paragraph.
    pub paragraphs: Vec<String>,
    /// Canonical beat names, in order.
    pub beats: Vec<String>,
    /// Distinct / total 4-gram positions over the final text.
    pub uniqueness_score: f64,
    /// Threshold the score was compared against.
    pub threshold: f64,
    /// Whether `uniqueness_score >= threshold`. Advisory only.
    pub passed_guard: bool,
    /// Seed actually used; feeding it back reproduces this story.
    pub seed: u64,
    pub word_count: usize,
    pub plan: StoryPlan,
    pub params: StoryParams,
}

impl Story {
    pub fn title(&self) -> &str {
        &self.plan.title
    }
}
