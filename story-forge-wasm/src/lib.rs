//! WASM bindings for story-forge: JSON in, JSON out.

use wasm_bindgen::prelude::*;

use story_forge::core::assembler::StoryEngine;
use story_forge::schema::beat::Beat;
use story_forge::schema::params::{Genre, StoryParams, Tone};

/// Summary returned by `StoryForge::batch`.
#[derive(serde::Serialize)]
struct BatchEntry {
    seed: u64,
    title: String,
    uniqueness_score: f64,
    passed_guard: bool,
}

fn parse_params(params_json: &str) -> Result<StoryParams, JsError> {
    if params_json.trim().is_empty() {
        return Ok(StoryParams::default());
    }
    serde_json::from_str(params_json)
        .map_err(|e| JsError::new(&format!("Invalid params JSON: {e}")))
}

fn keys<T>(all: &[T], key: fn(&T) -> &'static str) -> String {
    let keys: Vec<&str> = all.iter().map(key).collect();
    serde_json::to_string(&keys).unwrap_or_else(|_| "[]".to_string())
}

// ---------------------------------------------------------------------------
// StoryForge: an engine built once and reused across calls
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct StoryForge {
    engine: StoryEngine,
}

#[wasm_bindgen]
impl StoryForge {
    /// Build an engine over the embedded story banks.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<StoryForge, JsError> {
        let engine = StoryEngine::builder()
            .build()
            .map_err(|e| JsError::new(&format!("Engine build error: {e}")))?;
        Ok(StoryForge { engine })
    }

    /// Generate a story. Takes a JSON `StoryParams` object (missing fields
    /// use defaults) and returns the full story record as JSON.
    ///
    /// ```json
    /// { "genre": "mystery", "tone": "dark", "length": "short", "seed": 42 }
    /// ```
    pub fn generate(&self, params_json: &str) -> Result<String, JsError> {
        let params = parse_params(params_json)?;
        let story = self
            .engine
            .generate(&params)
            .map_err(|e| JsError::new(&format!("Generation error: {e}")))?;
        serde_json::to_string(&story)
            .map_err(|e| JsError::new(&format!("Serialization error: {e}")))
    }

    /// Generate `count` stories and return a JSON array of their seeds,
    /// titles and scores.
    pub fn batch(&self, params_json: &str, count: usize) -> Result<String, JsError> {
        let params = parse_params(params_json)?;
        let stories = self
            .engine
            .generate_batch(&params, count)
            .map_err(|e| JsError::new(&format!("Generation error: {e}")))?;
        let entries: Vec<BatchEntry> = stories
            .iter()
            .map(|story| BatchEntry {
                seed: story.seed,
                title: story.title().to_string(),
                uniqueness_score: story.uniqueness_score,
                passed_guard: story.passed_guard,
            })
            .collect();
        serde_json::to_string(&entries)
            .map_err(|e| JsError::new(&format!("Serialization error: {e}")))
    }
}

/// One-shot generation with a fresh engine.
#[wasm_bindgen]
pub fn generate_story(params_json: &str) -> Result<String, JsError> {
    StoryForge::new()?.generate(params_json)
}

/// Return JSON array of beat names, in story order.
#[wasm_bindgen]
pub fn beat_names() -> String {
    serde_json::to_string(&Beat::names()).unwrap_or_else(|_| "[]".to_string())
}

/// Return JSON array of genre identifiers.
#[wasm_bindgen]
pub fn genres() -> String {
    keys(&Genre::ALL, Genre::key)
}

/// Return JSON array of tone identifiers.
#[wasm_bindgen]
pub fn tones() -> String {
    keys(&Tone::ALL, Tone::key)
}
