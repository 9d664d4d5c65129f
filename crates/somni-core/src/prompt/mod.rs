//! Deterministic generation-prompt rendering.

pub mod builder;

pub use builder::{build_prompt, build_repair_prompt, structural_rules, SCHEDULE_HEADING};
