//! Field extraction strategies.
//!
//! Three independent sources feed the merger each turn:
//! - the deterministic pattern pass over all user-authored text,
//! - an optional semantic fallback (application layer, capability-backed),
//! - the exact chip parser over the latest user message.

pub mod chips;
pub mod deterministic;

pub use chips::parse_chip_answer;
pub use deterministic::extract;
