//! Orchestrator state machine phases and shared UI state.
//!
//! [`OrchestratorPhase`] drives the translation state machine.  The UI
//! reads it via [`SharedState`] to render the appropriate view.
//!
//! [`TranslatorState`] is the single source of truth for everything the UI
//! needs: current phase, the text panes, selected languages, and any error
//! or notice message.
//!
//! [`SharedState`] is a type alias for `Arc<Mutex<TranslatorState>>` — cheap
//! to clone and safe to share across tasks.

use std::sync::{Arc, Mutex};

// ---------------------------------------------------------------------------
// OrchestratorPhase
// ---------------------------------------------------------------------------

/// Phases of the translation orchestrator.
///
/// The state machine transitions are:
///
/// ```text
/// Idle ──text/language change──▶ Debouncing
/// Debouncing ──more changes──▶ Debouncing   (timer restarts)
///            ──timer fires───▶ Resolving    (live call)
///            ──timer fires───▶ Settled      (empty / identity / cache hit)
/// Resolving ──success──▶ Settled
///           ──failure──▶ Failed
/// Settled / Failed ──any change──▶ Debouncing
/// any phase ──clear──▶ Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorPhase {
    /// Nothing pending; waiting for input.
    Idle,

    /// A change arrived; the debounce timer is running.
    Debouncing,

    /// A live translation call is in flight.
    Resolving,

    /// A result is displayed (possibly empty).
    Settled,

    /// The live call failed; a retryable error is displayed.
    Failed,
}

impl OrchestratorPhase {
    /// Returns `true` while input is being debounced or a call is in
    /// flight.  The UI uses this to disable the swap button.
    ///
    /// ```
    /// use pocket_translate::orchestrator::OrchestratorPhase;
    ///
    /// assert!(!OrchestratorPhase::Idle.is_busy());
    /// assert!(OrchestratorPhase::Debouncing.is_busy());
    /// assert!(OrchestratorPhase::Resolving.is_busy());
    /// assert!(!OrchestratorPhase::Settled.is_busy());
    /// assert!(!OrchestratorPhase::Failed.is_busy());
    /// ```
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            OrchestratorPhase::Debouncing | OrchestratorPhase::Resolving
        )
    }

    /// A short human-readable label suitable for a status bar.
    pub fn label(&self) -> &'static str {
        match self {
            OrchestratorPhase::Idle => "Idle",
            OrchestratorPhase::Debouncing => "Waiting",
            OrchestratorPhase::Resolving => "Translating",
            OrchestratorPhase::Settled => "Done",
            OrchestratorPhase::Failed => "Error",
        }
    }
}

impl Default for OrchestratorPhase {
    fn default() -> Self {
        OrchestratorPhase::Idle
    }
}

// ---------------------------------------------------------------------------
// TranslatorState
// ---------------------------------------------------------------------------

/// Shared translator state — the single source of truth for the UI.
///
/// Held behind [`SharedState`] (`Arc<Mutex<TranslatorState>>`).  The
/// orchestrator mutates it; the front end reads it.
#[derive(Debug, Clone)]
pub struct TranslatorState {
    /// Current phase of the orchestrator.
    pub phase: OrchestratorPhase,

    /// Selected source language code.
    pub source_lang: String,

    /// Selected target language code.
    pub target_lang: String,

    /// Current input text (typed or dictated).
    pub source_text: String,

    /// The displayed translation result.  Empty until the first settle.
    pub translated_text: String,

    /// Error message to display when `phase == OrchestratorPhase::Failed`.
    pub error_message: Option<String>,

    /// Informational message (e.g. translation unavailable offline).
    pub notice: Option<String>,
}

impl TranslatorState {
    pub fn new(source_lang: &str, target_lang: &str) -> Self {
        Self {
            phase: OrchestratorPhase::Idle,
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
            source_text: String::new(),
            translated_text: String::new(),
            error_message: None,
            notice: None,
        }
    }
}

// ---------------------------------------------------------------------------
// SharedState
// ---------------------------------------------------------------------------

/// Task-safe handle to [`TranslatorState`].
///
/// Cheap to clone (`Arc` clone).  Lock with `.lock().unwrap()` for a short
/// critical section; do **not** hold the lock across `.await` points.
pub type SharedState = Arc<Mutex<TranslatorState>>;

/// Construct a new [`SharedState`] for a fresh session.
pub fn new_shared_state(source_lang: &str, target_lang: &str) -> SharedState {
    Arc::new(Mutex::new(TranslatorState::new(source_lang, target_lang)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- OrchestratorPhase::is_busy ---

    #[test]
    fn idle_is_not_busy() {
        assert!(!OrchestratorPhase::Idle.is_busy());
    }

    #[test]
    fn debouncing_is_busy() {
        assert!(OrchestratorPhase::Debouncing.is_busy());
    }

    #[test]
    fn resolving_is_busy() {
        assert!(OrchestratorPhase::Resolving.is_busy());
    }

    #[test]
    fn settled_is_not_busy() {
        assert!(!OrchestratorPhase::Settled.is_busy());
    }

    #[test]
    fn failed_is_not_busy() {
        assert!(!OrchestratorPhase::Failed.is_busy());
    }

    // ---- OrchestratorPhase::label ---

    #[test]
    fn labels_are_stable() {
        assert_eq!(OrchestratorPhase::Idle.label(), "Idle");
        assert_eq!(OrchestratorPhase::Debouncing.label(), "Waiting");
        assert_eq!(OrchestratorPhase::Resolving.label(), "Translating");
        assert_eq!(OrchestratorPhase::Settled.label(), "Done");
        assert_eq!(OrchestratorPhase::Failed.label(), "Error");
    }

    // ---- Default ---

    #[test]
    fn default_phase_is_idle() {
        assert_eq!(OrchestratorPhase::default(), OrchestratorPhase::Idle);
    }

    // ---- TranslatorState / SharedState ---

    #[test]
    fn new_state_is_empty_session() {
        let state = TranslatorState::new("en", "es");
        assert_eq!(state.phase, OrchestratorPhase::Idle);
        assert_eq!(state.source_lang, "en");
        assert_eq!(state.target_lang, "es");
        assert!(state.source_text.is_empty());
        assert!(state.translated_text.is_empty());
        assert!(state.error_message.is_none());
        assert!(state.notice.is_none());
    }

    #[test]
    fn shared_state_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SharedState>();
    }

    #[test]
    fn shared_state_can_be_cloned_and_mutated() {
        let state = new_shared_state("en", "es");
        let state2 = Arc::clone(&state);

        state.lock().unwrap().phase = OrchestratorPhase::Resolving;
        assert_eq!(state2.lock().unwrap().phase, OrchestratorPhase::Resolving);
    }
}
