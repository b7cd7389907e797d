//! Story Forge: offline story generation.
//!
//! Fills hand-written beat templates with a planned cast and setting, then
//! runs every beat through an n-gram repetition guard so the assembled prose
//! does not echo itself.

pub mod core;
pub mod schema;
