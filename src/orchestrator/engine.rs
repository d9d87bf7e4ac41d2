//! The translation orchestrator event loop.
//!
//! A single task owns the debounce timer, the request generation counter
//! and all writes to [`SharedState`].  Input events arrive on an mpsc
//! channel; live call results come back on an internal channel so the loop
//! can fence stale responses.
//!
//! Resolution order at commit time:
//!
//! 1. empty input settles to an empty result,
//! 2. identical source and target languages echo the input back,
//! 3. with offline mode enabled, an unexpired cache entry wins even online,
//! 4. offline without a cache entry settles empty (with a notice when
//!    offline mode is disabled),
//! 5. otherwise a live call is spawned.
//!
//! Only the response for the most recent commit may touch the state; older
//! in-flight responses are discarded by generation number.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant};

use crate::cache::TranslationCache;
use crate::connectivity::ConnectivityMonitor;
use crate::history::{HistoryStore, NewHistoryEntry};
use crate::languages::label_for_code;
use crate::translate::{TranslateError, TranslationRequest, Translator};

use super::state::{OrchestratorPhase, SharedState};

/// How long input must stay unchanged before a commit.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Message shown instead of a result when the device is offline and offline
/// mode is disabled.
const OFFLINE_NOTICE: &str =
    "No internet connection. Enable offline mode to use cached translations.";

/// Message shown when the live call fails.
const TRANSLATE_FAILED_MESSAGE: &str = "Failed to translate the text. Please try again.";

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Input events the orchestrator reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorEvent {
    /// The input text changed (typed, pasted or dictated).
    TextChanged(String),
    /// A new source language was selected.
    SourceLanguageChanged(String),
    /// A new target language was selected.
    TargetLanguageChanged(String),
    /// Swap source and target languages, seeding the input with the
    /// previous result.
    SwapLanguages,
    /// Commit immediately, skipping the debounce window.
    TranslateNow,
    /// Reset the session: both panes emptied, any pending work fenced.
    Clear,
}

/// Completed live call, tagged with the generation that spawned it.
struct LiveOutcome {
    generation: u64,
    request: TranslationRequest,
    cache_on_success: bool,
    result: Result<String, TranslateError>,
}

// ---------------------------------------------------------------------------
// TranslationOrchestrator
// ---------------------------------------------------------------------------

/// Debounced, single-flight translation driver.
///
/// Owns the state machine in [`SharedState`]; see the module docs for the
/// resolution order.
pub struct TranslationOrchestrator {
    state: SharedState,
    translator: Arc<dyn Translator>,
    cache: Arc<TranslationCache>,
    history: Arc<HistoryStore>,
    connectivity: Arc<ConnectivityMonitor>,
    offline_mode: watch::Receiver<bool>,
    recording_active: Arc<AtomicBool>,
    debounce: Duration,
    generation: u64,
    deadline: Option<Instant>,
}

impl TranslationOrchestrator {
    pub fn new(
        state: SharedState,
        translator: Arc<dyn Translator>,
        cache: Arc<TranslationCache>,
        history: Arc<HistoryStore>,
        connectivity: Arc<ConnectivityMonitor>,
        offline_mode: watch::Receiver<bool>,
    ) -> Self {
        Self {
            state,
            translator,
            cache,
            history,
            connectivity,
            offline_mode,
            recording_active: Arc::new(AtomicBool::new(false)),
            debounce: DEFAULT_DEBOUNCE,
            generation: 0,
            deadline: None,
        }
    }

    /// Override the debounce window (mainly for tests and config).
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Share the recording-session activity flag so language swaps are
    /// rejected while dictation is in progress.
    pub fn with_recording_gate(mut self, flag: Arc<AtomicBool>) -> Self {
        self.recording_active = flag;
        self
    }

    /// Run the event loop until the event channel closes.
    pub async fn run(mut self, mut events: mpsc::Receiver<OrchestratorEvent>) {
        let (outcome_tx, mut outcomes) = mpsc::channel::<LiveOutcome>(8);
        log::info!("orchestrator: running");

        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else {
                        log::info!("orchestrator: event channel closed, shutting down");
                        break;
                    };
                    self.on_event(event, &outcome_tx);
                }
                Some(outcome) = outcomes.recv() => {
                    self.on_outcome(outcome);
                }
                _ = Self::sleep_until(self.deadline), if self.deadline.is_some() => {
                    self.commit(&outcome_tx);
                }
            }
        }
    }

    async fn sleep_until(deadline: Option<Instant>) {
        match deadline {
            Some(deadline) => time::sleep_until(deadline).await,
            // Guarded out by the select! branch condition.
            None => std::future::pending().await,
        }
    }

    // -----------------------------------------------------------------------
    // Event handling
    // -----------------------------------------------------------------------

    fn on_event(&mut self, event: OrchestratorEvent, outcome_tx: &mpsc::Sender<LiveOutcome>) {
        match event {
            OrchestratorEvent::TextChanged(text) => {
                let emptied = text.trim().is_empty();
                self.state.lock().unwrap().source_text = text;
                if emptied {
                    self.reset_pending();
                } else {
                    self.arm_debounce();
                }
            }
            OrchestratorEvent::SourceLanguageChanged(code) => {
                self.state.lock().unwrap().source_lang = code;
                self.arm_if_text_present();
            }
            OrchestratorEvent::TargetLanguageChanged(code) => {
                self.state.lock().unwrap().target_lang = code;
                self.arm_if_text_present();
            }
            OrchestratorEvent::SwapLanguages => self.on_swap(),
            OrchestratorEvent::TranslateNow => self.commit(outcome_tx),
            OrchestratorEvent::Clear => self.on_clear(),
        }
    }

    /// Start (or restart) the debounce window.
    fn arm_debounce(&mut self) {
        {
            let mut state = self.state.lock().unwrap();
            state.phase = OrchestratorPhase::Debouncing;
            state.error_message = None;
            state.notice = None;
        }
        self.deadline = Some(Instant::now() + self.debounce);
    }

    fn arm_if_text_present(&mut self) {
        let has_text = !self.state.lock().unwrap().source_text.trim().is_empty();
        if has_text {
            self.arm_debounce();
        } else {
            self.reset_pending();
        }
    }

    /// Cancel the debounce window and fence any in-flight call, clearing
    /// the displayed result.
    fn reset_pending(&mut self) {
        self.deadline = None;
        self.generation += 1;
        let mut state = self.state.lock().unwrap();
        state.phase = OrchestratorPhase::Idle;
        state.translated_text.clear();
        state.error_message = None;
        state.notice = None;
    }

    fn on_clear(&mut self) {
        log::debug!("orchestrator: clear");
        self.reset_pending();
        self.state.lock().unwrap().source_text.clear();
    }

    fn on_swap(&mut self) {
        if self.state.lock().unwrap().phase == OrchestratorPhase::Resolving {
            log::debug!("orchestrator: swap rejected, call in flight");
            return;
        }
        if self.recording_active.load(Ordering::SeqCst) {
            log::debug!("orchestrator: swap rejected, recording in progress");
            return;
        }
        if !self.connectivity.is_online() && !*self.offline_mode.borrow() {
            log::debug!("orchestrator: swap rejected, offline without offline mode");
            return;
        }

        let has_text = {
            let mut state = self.state.lock().unwrap();
            let state = &mut *state;
            std::mem::swap(&mut state.source_lang, &mut state.target_lang);
            state.source_text = state.translated_text.clone();
            !state.source_text.trim().is_empty()
        };
        if has_text {
            self.arm_debounce();
        } else {
            self.reset_pending();
        }
    }

    // -----------------------------------------------------------------------
    // Commit and resolution
    // -----------------------------------------------------------------------

    /// Commit the current input: snapshot the freshest state, bump the
    /// generation, and resolve.
    fn commit(&mut self, outcome_tx: &mpsc::Sender<LiveOutcome>) {
        self.deadline = None;
        self.generation += 1;

        let (text, source_lang, target_lang) = {
            let state = self.state.lock().unwrap();
            (
                state.source_text.clone(),
                state.source_lang.clone(),
                state.target_lang.clone(),
            )
        };

        let Some(request) = TranslationRequest::new(&text, &source_lang, &target_lang) else {
            self.settle(String::new());
            return;
        };

        if request.is_identity() {
            self.settle(request.text().to_string());
            return;
        }

        let offline_mode = *self.offline_mode.borrow();
        if offline_mode {
            if let Some(cached) = self.cache.get(&request) {
                log::debug!("orchestrator: cache hit for {} -> {}", source_lang, target_lang);
                self.settle(cached);
                return;
            }
        }

        if !self.connectivity.is_online() {
            if offline_mode {
                log::debug!("orchestrator: offline, no cached translation");
                self.settle(String::new());
            } else {
                let mut state = self.state.lock().unwrap();
                state.phase = OrchestratorPhase::Settled;
                state.translated_text.clear();
                state.error_message = None;
                state.notice = Some(OFFLINE_NOTICE.to_string());
            }
            return;
        }

        {
            let mut state = self.state.lock().unwrap();
            state.phase = OrchestratorPhase::Resolving;
            state.error_message = None;
            state.notice = None;
        }

        let generation = self.generation;
        let translator = Arc::clone(&self.translator);
        let outcome_tx = outcome_tx.clone();
        tokio::spawn(async move {
            let result = translator
                .translate(request.text(), request.source_lang(), request.target_lang())
                .await;
            let _ = outcome_tx
                .send(LiveOutcome {
                    generation,
                    request,
                    cache_on_success: offline_mode,
                    result,
                })
                .await;
        });
    }

    fn on_outcome(&mut self, outcome: LiveOutcome) {
        if outcome.generation != self.generation {
            log::debug!(
                "orchestrator: discarding stale response (generation {} != {})",
                outcome.generation,
                self.generation
            );
            return;
        }

        match outcome.result {
            Ok(translated) => {
                if outcome.cache_on_success {
                    self.cache.put(&outcome.request, &translated);
                }
                if !translated.is_empty() {
                    let recorded = self.history.append(NewHistoryEntry {
                        source_language: label_for_code(outcome.request.source_lang()),
                        target_language: label_for_code(outcome.request.target_lang()),
                        source_text: outcome.request.text().to_string(),
                        target_text: translated.clone(),
                        source_language_code: Some(outcome.request.source_lang().to_string()),
                        target_language_code: Some(outcome.request.target_lang().to_string()),
                    });
                    if recorded.is_none() {
                        log::warn!("orchestrator: translation not recorded in history");
                    }
                }
                self.settle(translated);
            }
            Err(e) => {
                log::warn!("orchestrator: translation failed: {e}");
                let mut state = self.state.lock().unwrap();
                state.phase = OrchestratorPhase::Failed;
                state.translated_text.clear();
                state.notice = None;
                state.error_message = Some(TRANSLATE_FAILED_MESSAGE.to_string());
            }
        }
    }

    fn settle(&mut self, translated: String) {
        let mut state = self.state.lock().unwrap();
        state.phase = OrchestratorPhase::Settled;
        state.translated_text = translated;
        state.error_message = None;
        state.notice = None;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
