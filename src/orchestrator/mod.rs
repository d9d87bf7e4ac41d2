//! Debounced, single-flight translation orchestration.
//!
//! [`TranslationOrchestrator`] owns the session state machine; everything
//! else in the crate is a collaborator it routes requests through.

pub mod engine;
pub mod state;

pub use engine::{OrchestratorEvent, TranslationOrchestrator, DEFAULT_DEBOUNCE};
pub use state::{new_shared_state, OrchestratorPhase, SharedState, TranslatorState};
