//! Knowledge excerpt source.
//!
//! A pure lookup the prompt builder embeds in generation requests. The
//! trait keeps the source swappable (a deployment may back it with a
//! content system); the built-in presets are the default implementation.

pub mod preset;

use crate::fields::MainIssue;

/// Pure excerpt lookup keyed by age and issue.
pub trait KnowledgeSource: Send + Sync {
    fn load_excerpt(&self, age_months: u32, main_issue: Option<MainIssue>) -> String;
}

pub use preset::BuiltinKnowledge;
