/// The story assembler: Plan → Beats → Text orchestration.
///
/// Wires together planning, template fill, the optional text backend, the
/// style pass, the local and global repetition guards, and final scoring.
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::backend::{split_sentences, TextBackend};
use crate::core::banks::{pick, CalmClosure, ConfigError, StoryBanks};
use crate::core::guard::RepetitionGuard;
use crate::core::ngram::{tokenize, uniqueness_ratio, TokenMode};
use crate::core::planner::plan_story;
use crate::core::settings::GuardSettings;
use crate::core::style::{StylePass, ToneStyle};
use crate::core::template::{fill, TemplateError};
use crate::schema::beat::Beat;
use crate::schema::params::StoryParams;
use crate::schema::plan::StoryPlan;
use crate::schema::story::Story;

/// Backend output is trimmed to at least this many trailing sentences.
const MIN_BACKEND_SENTENCES: usize = 3;

/// Seed spacing between stories of one batch.
const BATCH_SEED_STRIDE: u64 = 1000;

/// Drawn seeds fit in an f64 mantissa so JSON callers can hand them back.
const SEED_BITS: u32 = 53;

#[derive(Debug, Error)]
pub enum ForgeError {
    #[error("template error: {0}")]
    Template(#[from] TemplateError),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// The top-level story engine. Built via `StoryEngine::builder()`.
pub struct StoryEngine {
    banks: StoryBanks,
    settings: GuardSettings,
    backend: Option<Box<dyn TextBackend>>,
}

/// Builder for constructing a `StoryEngine`.
#[derive(Default)]
pub struct StoryEngineBuilder {
    banks_path: Option<PathBuf>,
    settings_path: Option<PathBuf>,
    /// Directly provided banks (for testing without files).
    banks: Option<StoryBanks>,
    /// Directly provided settings (for testing without files).
    settings: Option<GuardSettings>,
    backend: Option<Box<dyn TextBackend>>,
}

impl StoryEngine {
    pub fn builder() -> StoryEngineBuilder {
        StoryEngineBuilder::default()
    }

    pub fn banks(&self) -> &StoryBanks {
        &self.banks
    }

    pub fn settings(&self) -> &GuardSettings {
        &self.settings
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Generate one story. With `params.seed` set the output is
    /// byte-identical across calls; otherwise a seed is drawn and recorded
    /// in the returned story.
    pub fn generate(&self, params: &StoryParams) -> Result<Story, ForgeError> {
        let seed = params.seed.unwrap_or_else(draw_seed);
        let plan = plan_story(&self.banks, params, seed)?;
        let style = self.banks.tone_style(params.tone)?;

        let mut beats = Vec::with_capacity(Beat::ALL.len());
        for (index, beat) in Beat::ALL.into_iter().enumerate() {
            let mut rng = beat_rng(seed, index);
            let candidates = self.expand_beat(beat, &plan, params, style, seed, &mut rng)?;
            let kept = RepetitionGuard::new(self.settings.local_n)
                .with_policy(self.settings.policy)
                .filter_sequence(&candidates);
            debug!(
                beat = beat.name(),
                candidates = candidates.len(),
                kept = kept.len(),
                "beat expanded"
            );
            beats.push(kept);
        }

        let guarded = RepetitionGuard::new(self.settings.global_n)
            .with_policy(self.settings.policy)
            .filter_grouped(&beats);

        let mut paragraphs: Vec<String> = guarded.iter().map(|sentences| sentences.join(" ")).collect();
        if params.calm_closure {
            close_calmly(&mut paragraphs, &self.banks.calm_closure);
        }
        let text = paragraphs.join("\n\n");

        let tokens = tokenize(&text, TokenMode::Strict);
        let uniqueness_score =
            uniqueness_ratio(&tokens, self.settings.score_n, self.settings.score_window);
        let threshold = self.settings.threshold(params.length);
        let passed_guard = uniqueness_score >= threshold;
        if !passed_guard {
            debug!(uniqueness_score, threshold, "story below uniqueness threshold");
        }

        Ok(Story {
            word_count: text.split_whitespace().count(),
            text,
            paragraphs,
            beats: Beat::names(),
            uniqueness_score,
            threshold,
            passed_guard,
            seed,
            plan,
            params: StoryParams {
                seed: Some(seed),
                ..params.clone()
            },
        })
    }

    /// Generate `count` stories with seeds spaced from one base seed. The
    /// first story equals `generate` with the base seed.
    pub fn generate_batch(
        &self,
        params: &StoryParams,
        count: usize,
    ) -> Result<Vec<Story>, ForgeError> {
        let base = params.seed.unwrap_or_else(draw_seed);
        (0..count as u64)
            .map(|i| {
                let params = StoryParams {
                    seed: Some(base.wrapping_add(i.wrapping_mul(BATCH_SEED_STRIDE))),
                    ..params.clone()
                };
                self.generate(&params)
            })
            .collect()
    }

    /// Candidate sentences for one beat, styled but not yet guarded.
    fn expand_beat(
        &self,
        beat: Beat,
        plan: &StoryPlan,
        params: &StoryParams,
        style: &ToneStyle,
        seed: u64,
        rng: &mut StdRng,
    ) -> Result<Vec<String>, ForgeError> {
        let mut bindings = plan.bindings();
        let prompt = fill(self.banks.beat_prompt(beat)?, &bindings)?;
        let target = params.length.target_sentences();

        if params.use_backend {
            if let Some(sentences) = self.backend_sentences(beat, &prompt, target, seed) {
                return Ok(sentences
                    .iter()
                    .map(|sentence| StylePass::apply(sentence, style, rng))
                    .collect());
            }
        }

        for (slot, phrases) in &self.banks.beat_fillers {
            bindings.bind(slot.as_str(), pick(rng, phrases, slot)?.as_str());
        }

        let mut sentences = Vec::with_capacity(target);
        sentences.push(StylePass::apply(&prompt, style, rng));
        while sentences.len() < target {
            let pattern = pick(rng, &self.banks.sentence_patterns, "sentence_patterns")?;
            for (slot, phrases) in &self.banks.sentence_fillers {
                bindings.bind(slot.as_str(), pick(rng, phrases, slot)?.as_str());
            }
            let sentence = fill(pattern, &bindings)?;
            sentences.push(StylePass::apply(&sentence, style, rng));
        }
        Ok(sentences)
    }

    /// The trailing sentences of a backend continuation, or `None` when the
    /// sentence banks should be used instead.
    fn backend_sentences(
        &self,
        beat: Beat,
        prompt: &str,
        target: usize,
        seed: u64,
    ) -> Option<Vec<String>> {
        let Some(backend) = self.backend.as_ref() else {
            warn!(beat = beat.name(), "backend requested but none configured; using sentence banks");
            return None;
        };

        match backend.continue_text(prompt, seed) {
            Ok(text) => {
                let mut sentences = split_sentences(&text);
                if sentences.is_empty() {
                    warn!(
                        backend = backend.name(),
                        beat = beat.name(),
                        "backend returned no text; using sentence banks"
                    );
                    return None;
                }
                let keep = target.max(MIN_BACKEND_SENTENCES);
                let skip = sentences.len().saturating_sub(keep);
                Some(sentences.split_off(skip))
            }
            Err(e) => {
                warn!(
                    backend = backend.name(),
                    beat = beat.name(),
                    error = %e,
                    "backend failed; using sentence banks"
                );
                None
            }
        }
    }
}

fn draw_seed() -> u64 {
    rand::random::<u64>() >> (u64::BITS - SEED_BITS)
}

/// Per-beat generator derived from the story seed.
fn beat_rng(seed: u64, index: usize) -> StdRng {
    StdRng::seed_from_u64(seed.wrapping_add((index as u64 + 1).wrapping_mul(7919)))
}

/// Append the calm line to the last non-empty paragraph unless its final
/// sentence already mentions one of the closure keywords.
fn close_calmly(paragraphs: &mut [String], closure: &CalmClosure) {
    let Some(index) = paragraphs
        .iter()
        .rposition(|paragraph| !paragraph.trim().is_empty())
    else {
        if let Some(last) = paragraphs.last_mut() {
            *last = closure.line.clone();
        }
        return;
    };

    let last_sentence = split_sentences(&paragraphs[index])
        .pop()
        .unwrap_or_default()
        .to_lowercase();
    let already_calm = closure
        .keywords
        .iter()
        .any(|keyword| last_sentence.contains(&keyword.to_lowercase()));
    if !already_calm {
        let paragraph = &mut paragraphs[index];
        paragraph.push(' ');
        paragraph.push_str(&closure.line);
    }
}

impl StoryEngineBuilder {
    /// Load story banks from a RON file instead of the embedded banks.
    pub fn banks_path(mut self, path: impl AsRef<Path>) -> Self {
        self.banks_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Load guard settings from a RON file instead of the defaults.
    pub fn settings_path(mut self, path: impl AsRef<Path>) -> Self {
        self.settings_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Provide banks directly (for testing without files).
    pub fn with_banks(mut self, banks: StoryBanks) -> Self {
        self.banks = Some(banks);
        self
    }

    /// Provide settings directly (for testing without files).
    pub fn with_settings(mut self, settings: GuardSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn with_backend<B: TextBackend + 'static>(mut self, backend: B) -> Self {
        self.backend = Some(Box::new(backend));
        self
    }

    /// Load and validate everything. Invalid banks or settings fail here
    /// rather than during generation.
    pub fn build(self) -> Result<StoryEngine, ForgeError> {
        let banks = match (self.banks, &self.banks_path) {
            (Some(banks), _) => banks,
            (None, Some(path)) => StoryBanks::load_from_ron(path)?,
            (None, None) => StoryBanks::embedded()?,
        };
        banks.validate()?;

        let settings = match (self.settings, &self.settings_path) {
            (Some(settings), _) => settings,
            (None, Some(path)) => GuardSettings::load_from_ron(path)?,
            (None, None) => GuardSettings::default(),
        };
        settings.check()?;

        info!(
            patterns = banks.sentence_patterns.len(),
            themes = banks.themes.len(),
            local_n = settings.local_n,
            global_n = settings.global_n,
            backend = self.backend.as_ref().map(|backend| backend.name()),
            "story engine ready"
        );

        Ok(StoryEngine {
            banks,
            settings,
            backend: self.backend,
        })
    }
}
