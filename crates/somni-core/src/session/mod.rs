//! Session domain types.
//!
//! A session is client-held: the full transcript and extracted fields are
//! round-tripped between client and server on every turn, so the core never
//! stores them.

pub mod message;
pub mod model;

pub use message::{ChatMessage, MessageRole};
pub use model::SessionState;
