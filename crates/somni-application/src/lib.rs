//! Orchestration layer: wires the pure domain components of `somni-core`
//! to the external generation capability, one stateless invocation per
//! conversation turn.

pub mod generation;
pub mod semantic_extractor;
pub mod topic_classifier;
pub mod turn_usecase;

pub use generation::{GenerationAdapter, GeneratedSchedule, ScheduleService};
pub use semantic_extractor::SemanticExtractorService;
pub use topic_classifier::TopicClassifierService;
pub use turn_usecase::TurnUseCase;
