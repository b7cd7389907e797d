pub mod assembler;
pub mod backend;
pub mod banks;
pub mod guard;
pub mod ngram;
pub mod planner;
pub mod seen;
pub mod settings;
pub mod style;
pub mod template;
pub mod variants;
