//! The slot set the dialogue is trying to resolve, and its cross-turn
//! merge rule.

pub mod merge;
pub mod model;

pub use merge::merge;
pub use model::{ExtractedFields, MainIssue};
