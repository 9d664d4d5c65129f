//! Turn request/response wire shapes.

pub mod model;

pub use model::{OutputMode, TurnRequest, TurnResponse};
