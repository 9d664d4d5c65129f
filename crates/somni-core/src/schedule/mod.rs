//! Schedule document parsing and structural validation.

pub mod model;
pub mod validator;

pub use model::{ScheduleEntry, ValidationIssue};
pub use validator::{extract_schedule_section, parse_entries, validate};
