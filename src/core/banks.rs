/// Story banks: the static name, setting, and template tables, loaded from RON.
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use thiserror::Error;

use crate::core::style::ToneStyle;
use crate::core::template::Template;
use crate::schema::beat::Beat;
use crate::schema::params::{Genre, Tone};
use crate::schema::plan::StoryPlan;

/// The bank file compiled into the crate.
pub const EMBEDDED_BANKS: &str = include_str!("../../story_data/banks.ron");

/// Bank key every genre falls back to.
const GENERAL: &str = "general";

/// Slots a stake pattern may reference.
const STAKE_SLOTS: [&str; 2] = ["consequence", "silver"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("no prompt for beat '{0}'")]
    MissingBeatPrompt(&'static str),
    #[error("bank '{0}' is empty")]
    EmptyBank(String),
    #[error("invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// One entry of a genre's setting bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingEntry {
    pub place: String,
    pub era: String,
    pub mood: String,
}

/// Stake sentence patterns and the phrases they are filled with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakeBanks {
    pub patterns: Vec<String>,
    pub consequence: Vec<String>,
    pub silver: Vec<String>,
}

/// Character traits per role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitBanks {
    pub protagonist: Vec<String>,
    pub antagonist: Vec<String>,
    pub ally: Vec<String>,
}

/// Calm closing line appended to a story's final sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalmClosure {
    /// If the final sentence already mentions one of these, it is left alone.
    pub keywords: Vec<String>,
    pub line: String,
}

/// All static data the planner and assembler draw from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryBanks {
    /// Names by genre key. The genre's names are pooled with "general".
    pub names: HashMap<String, Vec<String>>,
    /// Settings by genre key. Unknown genres use "general".
    pub settings: HashMap<String, Vec<SettingEntry>>,
    pub themes: Vec<String>,
    pub desires: Vec<String>,
    pub stakes: StakeBanks,
    pub traits: TraitBanks,
    /// Style lists by tone key. Unknown tones use "serious".
    pub tones: HashMap<String, ToneStyle>,
    /// One anchor template per beat key.
    pub beat_prompts: HashMap<String, String>,
    /// Templates for the remaining sentences of a beat.
    pub sentence_patterns: Vec<String>,
    /// Filler phrases chosen once per beat. Ordered so that draws from the
    /// seeded generator happen in a stable sequence.
    pub beat_fillers: BTreeMap<String, Vec<String>>,
    /// Filler phrases chosen again for every sentence.
    pub sentence_fillers: BTreeMap<String, Vec<String>>,
    pub calm_closure: CalmClosure,
}

impl StoryBanks {
    /// The banks shipped with the crate.
    pub fn embedded() -> Result<StoryBanks, ConfigError> {
        Self::parse_ron(EMBEDDED_BANKS)
    }

    /// Load banks from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<StoryBanks, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse banks from a RON string. Does not validate; see `validate`.
    pub fn parse_ron(input: &str) -> Result<StoryBanks, ConfigError> {
        Ok(ron::from_str(input)?)
    }

    /// Name pool for a genre: its own names followed by the general names.
    pub fn names_for(&self, genre: Genre) -> Vec<&str> {
        let own = self.names.get(genre.key()).into_iter().flatten();
        let general = match genre {
            Genre::General => None,
            _ => self.names.get(GENERAL),
        };
        own.chain(general.into_iter().flatten())
            .map(String::as_str)
            .collect()
    }

    pub fn settings_for(&self, genre: Genre) -> &[SettingEntry] {
        self.settings
            .get(genre.key())
            .filter(|entries| !entries.is_empty())
            .or_else(|| self.settings.get(GENERAL))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn tone_style(&self, tone: Tone) -> Result<&ToneStyle, ConfigError> {
        self.tones
            .get(tone.key())
            .or_else(|| self.tones.get(Tone::Serious.key()))
            .ok_or_else(|| ConfigError::EmptyBank("tones".to_string()))
    }

    pub fn beat_prompt(&self, beat: Beat) -> Result<&str, ConfigError> {
        self.beat_prompts
            .get(beat.key())
            .map(String::as_str)
            .ok_or(ConfigError::MissingBeatPrompt(beat.name()))
    }

    /// Every problem that would make generation fail or misbehave.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        for (label, map_len, general_len) in [
            ("names", self.names.len(), self.names.get(GENERAL).map_or(0, Vec::len)),
            ("settings", self.settings.len(), self.settings.get(GENERAL).map_or(0, Vec::len)),
        ] {
            if map_len == 0 || general_len == 0 {
                problems.push(format!("bank '{}.{}' is empty", label, GENERAL));
            }
        }
        for (key, names) in sorted(&self.names) {
            require_entries(&mut problems, &format!("names.{}", key), names.len());
        }
        for (key, entries) in sorted(&self.settings) {
            require_entries(&mut problems, &format!("settings.{}", key), entries.len());
        }

        for (label, len) in [
            ("themes", self.themes.len()),
            ("desires", self.desires.len()),
            ("stakes.patterns", self.stakes.patterns.len()),
            ("stakes.consequence", self.stakes.consequence.len()),
            ("stakes.silver", self.stakes.silver.len()),
            ("traits.protagonist", self.traits.protagonist.len()),
            ("traits.antagonist", self.traits.antagonist.len()),
            ("traits.ally", self.traits.ally.len()),
            ("sentence_patterns", self.sentence_patterns.len()),
        ] {
            require_entries(&mut problems, label, len);
        }
        for (slot, phrases) in self.beat_fillers.iter().chain(&self.sentence_fillers) {
            require_entries(&mut problems, &format!("fillers.{}", slot), phrases.len());
        }

        if !self.tones.contains_key(Tone::Serious.key()) {
            problems.push("tones has no 'serious' entry to fall back on".to_string());
        }
        if self.calm_closure.line.trim().is_empty() {
            problems.push("calm_closure.line is empty".to_string());
        }

        let plan_slot = |slot: &str| StoryPlan::SLOTS.contains(&slot);
        for beat in Beat::ALL {
            match self.beat_prompts.get(beat.key()) {
                Some(prompt) => check_template(
                    &mut problems,
                    &format!("beat_prompts.{}", beat.key()),
                    prompt,
                    &plan_slot,
                ),
                None => problems.push(format!("no prompt for beat '{}'", beat.key())),
            }
        }
        for (i, pattern) in self.stakes.patterns.iter().enumerate() {
            check_template(
                &mut problems,
                &format!("stakes.patterns[{}]", i),
                pattern,
                &|slot: &str| STAKE_SLOTS.contains(&slot),
            );
        }
        let sentence_slot = |slot: &str| {
            plan_slot(slot)
                || self.beat_fillers.contains_key(slot)
                || self.sentence_fillers.contains_key(slot)
        };
        for (i, pattern) in self.sentence_patterns.iter().enumerate() {
            check_template(
                &mut problems,
                &format!("sentence_patterns[{}]", i),
                pattern,
                &sentence_slot,
            );
        }

        problems
    }

    /// Fail if `problems` reports anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let problems = self.problems();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems))
        }
    }
}

/// Choose one entry of `items`, failing with the bank label if it is empty.
pub fn pick<'a, T>(rng: &mut StdRng, items: &'a [T], bank: &str) -> Result<&'a T, ConfigError> {
    items
        .choose(rng)
        .ok_or_else(|| ConfigError::EmptyBank(bank.to_string()))
}

fn sorted<V>(map: &HashMap<String, V>) -> Vec<(&String, &V)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}

fn require_entries(problems: &mut Vec<String>, label: &str, len: usize) {
    if len == 0 {
        problems.push(format!("bank '{}' is empty", label));
    }
}

fn check_template(
    problems: &mut Vec<String>,
    context: &str,
    text: &str,
    allowed: &dyn Fn(&str) -> bool,
) {
    match Template::parse(text) {
        Ok(template) => {
            for slot in template.slots() {
                if !allowed(slot) {
                    problems.push(format!("{}: unknown placeholder {{{}}}", context, slot));
                }
            }
        }
        Err(e) => problems.push(format!("{}: {}", context, e)),
    }
}
