//! Speech input controller — voice capture sessions with toggle semantics.
//!
//! At most one session is active system-wide.  While listening, each
//! recognition update replaces the current transcript wholesale: the
//! concatenation of all finalized segments, or the latest interim text when
//! nothing is final yet.  Interim results are provisional, never appended.
//!
//! Explicit stop lands in [`RecordingState::Stopped`] with the transcript
//! retained; an engine error lands in [`RecordingState::Idle`], also
//! retaining the last partial transcript so the user keeps what was heard.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::connectivity::ConnectivityMonitor;

use super::SpeechError;

// ---------------------------------------------------------------------------
// Capability interface
// ---------------------------------------------------------------------------

/// One recognized span of speech.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptSegment {
    pub text: String,
    /// Finalized segments are stable; non-final segments are provisional.
    pub is_final: bool,
}

impl TranscriptSegment {
    pub fn interim(text: impl Into<String>) -> Self {
        Self { text: text.into(), is_final: false }
    }

    pub fn finalized(text: impl Into<String>) -> Self {
        Self { text: text.into(), is_final: true }
    }
}

/// Events a recognition engine emits while a session runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// The full segment list recognized so far (finalized and interim).
    Results(Vec<TranscriptSegment>),
    /// The session ended normally (engine-side or after `stop`).
    Ended,
    /// The session aborted with a categorized error.
    Error(SpeechError),
}

/// Platform speech-recognition capability.
///
/// `start` hands the engine a channel to push [`RecognitionEvent`]s into;
/// `stop` asks the engine to finish (it should still emit `Ended`).
pub trait SpeechRecognizer: Send + Sync {
    /// Whether this platform can recognize speech at all.
    fn is_supported(&self) -> bool {
        true
    }

    fn start(
        &self,
        language: &str,
        events: mpsc::UnboundedSender<RecognitionEvent>,
    ) -> Result<(), SpeechError>;

    fn stop(&self);
}

// ---------------------------------------------------------------------------
// SpeechInputController
// ---------------------------------------------------------------------------

/// Lifecycle state of the recording session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordingState {
    /// No session yet, or the last one aborted on error.
    #[default]
    Idle,
    /// Microphone is live; transcript updates are streaming in.
    Listening,
    /// The last session finished normally; transcript is available.
    Stopped,
}

/// What [`SpeechInputController::toggle`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Started,
    Stopped,
}

#[derive(Default)]
struct SessionInner {
    state: RecordingState,
    transcript: String,
    last_error: Option<SpeechError>,
}

type CancelHook = Box<dyn Fn() + Send + Sync>;

/// Manages the single voice-capture session.
///
/// Assembled transcript updates are forwarded through the channel supplied
/// to [`toggle`](Self::toggle); the wiring layer feeds them into the
/// orchestrator's debounced text path.
pub struct SpeechInputController {
    recognizer: Arc<dyn SpeechRecognizer>,
    connectivity: Arc<ConnectivityMonitor>,
    inner: Arc<Mutex<SessionInner>>,
    active: Arc<AtomicBool>,
    playback_cancel: Mutex<Option<CancelHook>>,
}

impl SpeechInputController {
    pub fn new(
        recognizer: Arc<dyn SpeechRecognizer>,
        connectivity: Arc<ConnectivityMonitor>,
    ) -> Self {
        Self {
            recognizer,
            connectivity,
            inner: Arc::new(Mutex::new(SessionInner::default())),
            active: Arc::new(AtomicBool::new(false)),
            playback_cancel: Mutex::new(None),
        }
    }

    /// Install the hook that cancels pending speech-output playback; fired
    /// every time a session starts.
    pub fn set_playback_cancel(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.playback_cancel.lock().unwrap() = Some(Box::new(hook));
    }

    /// Shared flag the orchestrator samples to reject swaps mid-recording.
    pub fn activity_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.active)
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> RecordingState {
        self.inner.lock().unwrap().state
    }

    /// The most recent assembled transcript (survives stop and error).
    pub fn transcript(&self) -> String {
        self.inner.lock().unwrap().transcript.clone()
    }

    pub fn last_error(&self) -> Option<SpeechError> {
        self.inner.lock().unwrap().last_error.clone()
    }

    /// Start a session, or stop the active one (toggle semantics: starting
    /// while already listening is a no-op that stops instead).
    ///
    /// Fails fast with [`SpeechError::Unsupported`] when the platform has no
    /// recognition capability and [`SpeechError::Offline`] when the
    /// connectivity monitor reports offline.
    pub fn toggle(
        &self,
        language: &str,
        transcript_tx: mpsc::Sender<String>,
    ) -> Result<ToggleOutcome, SpeechError> {
        if self.is_active() {
            self.stop();
            return Ok(ToggleOutcome::Stopped);
        }
        self.begin(language, transcript_tx)?;
        Ok(ToggleOutcome::Started)
    }

    /// Explicit user stop.  The transcript is retained.
    pub fn stop(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }
        self.recognizer.stop();
        let mut inner = self.inner.lock().unwrap();
        if inner.state == RecordingState::Listening {
            inner.state = RecordingState::Stopped;
        }
        log::debug!("speech input: session stopped");
    }

    fn begin(
        &self,
        language: &str,
        transcript_tx: mpsc::Sender<String>,
    ) -> Result<(), SpeechError> {
        if !self.recognizer.is_supported() {
            return Err(SpeechError::Unsupported);
        }
        if !self.connectivity.is_online() {
            return Err(SpeechError::Offline);
        }

        // A new recording session supersedes any pending playback.
        if let Some(hook) = self.playback_cancel.lock().unwrap().as_ref() {
            hook();
        }

        {
            let mut inner = self.inner.lock().unwrap();
            inner.state = RecordingState::Listening;
            inner.transcript.clear();
            inner.last_error = None;
        }
        self.active.store(true, Ordering::SeqCst);

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        if let Err(e) = self.recognizer.start(language, event_tx) {
            self.active.store(false, Ordering::SeqCst);
            let mut inner = self.inner.lock().unwrap();
            inner.state = RecordingState::Idle;
            inner.last_error = Some(e.clone());
            return Err(e);
        }

        log::debug!("speech input: session started (lang={language})");
        tokio::spawn(pump(
            event_rx,
            Arc::clone(&self.inner),
            Arc::clone(&self.active),
            transcript_tx,
        ));
        Ok(())
    }
}

/// Drains engine events for one session: assembles the transcript, records
/// errors, and releases the activity flag when the session ends.
async fn pump(
    mut event_rx: mpsc::UnboundedReceiver<RecognitionEvent>,
    inner: Arc<Mutex<SessionInner>>,
    active: Arc<AtomicBool>,
    transcript_tx: mpsc::Sender<String>,
) {
    while let Some(event) = event_rx.recv().await {
        match event {
            RecognitionEvent::Results(segments) => {
                let current = assemble_transcript(&segments);
                inner.lock().unwrap().transcript = current.clone();
                if transcript_tx.send(current).await.is_err() {
                    // Consumer went away; keep assembling for transcript().
                    log::debug!("speech input: transcript consumer dropped");
                }
            }
            RecognitionEvent::Ended => {
                active.store(false, Ordering::SeqCst);
                let mut guard = inner.lock().unwrap();
                if guard.state == RecordingState::Listening {
                    guard.state = RecordingState::Stopped;
                }
                break;
            }
            RecognitionEvent::Error(e) => {
                log::warn!("speech input: recognition error: {e}");
                active.store(false, Ordering::SeqCst);
                let mut guard = inner.lock().unwrap();
                guard.state = RecordingState::Idle;
                guard.last_error = Some(e);
                // Transcript is deliberately left in place.
                break;
            }
        }
    }
}

/// Concatenation of all finalized segments, or the interim text when no
/// segment is final yet.
fn assemble_transcript(segments: &[TranscriptSegment]) -> String {
    let finalized: String = segments
        .iter()
        .filter(|s| s.is_final)
        .map(|s| s.text.as_str())
        .collect();
    if !finalized.is_empty() {
        return finalized;
    }
    segments
        .iter()
        .filter(|s| !s.is_final)
        .map(|s| s.text.as_str())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Recognizer that hands the event sender back to the test so it can
    /// script the session.
    #[derive(Default)]
    struct ScriptedRecognizer {
        supported: bool,
        sender: Mutex<Option<mpsc::UnboundedSender<RecognitionEvent>>>,
        stop_calls: AtomicUsize,
    }

    impl ScriptedRecognizer {
        fn new() -> Self {
            Self { supported: true, ..Default::default() }
        }

        fn unsupported() -> Self {
            Self { supported: false, ..Default::default() }
        }

        fn emit(&self, event: RecognitionEvent) {
            let guard = self.sender.lock().unwrap();
            guard.as_ref().expect("session not started").send(event).unwrap();
        }
    }

    impl SpeechRecognizer for ScriptedRecognizer {
        fn is_supported(&self) -> bool {
            self.supported
        }

        fn start(
            &self,
            _language: &str,
            events: mpsc::UnboundedSender<RecognitionEvent>,
        ) -> Result<(), SpeechError> {
            *self.sender.lock().unwrap() = Some(events);
            Ok(())
        }

        fn stop(&self) {
            self.stop_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(tx) = self.sender.lock().unwrap().as_ref() {
                let _ = tx.send(RecognitionEvent::Ended);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn make_controller(
        recognizer: Arc<ScriptedRecognizer>,
        online: bool,
    ) -> (SpeechInputController, mpsc::Receiver<String>) {
        let connectivity = Arc::new(ConnectivityMonitor::new(online));
        let controller = SpeechInputController::new(
            recognizer as Arc<dyn SpeechRecognizer>,
            connectivity,
        );
        let (_tx, rx) = mpsc::channel(16);
        (controller, rx)
    }

    async fn recv_update(rx: &mut mpsc::Receiver<String>) -> String {
        tokio::time::timeout(std::time::Duration::from_secs(1), rx.recv())
            .await
            .expect("timed out waiting for transcript")
            .expect("channel closed")
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn unsupported_platform_fails_fast() {
        let recognizer = Arc::new(ScriptedRecognizer::unsupported());
        let (controller, _rx) = make_controller(recognizer, true);
        let (tx, _rx2) = mpsc::channel(4);

        let err = controller.toggle("en", tx).unwrap_err();
        assert_eq!(err, SpeechError::Unsupported);
        assert_eq!(controller.state(), RecordingState::Idle);
    }

    #[tokio::test]
    async fn offline_fails_fast() {
        let recognizer = Arc::new(ScriptedRecognizer::new());
        let (controller, _rx) = make_controller(recognizer, false);
        let (tx, _rx2) = mpsc::channel(4);

        let err = controller.toggle("en", tx).unwrap_err();
        assert_eq!(err, SpeechError::Offline);
        assert!(!controller.is_active());
    }

    #[tokio::test]
    async fn interim_results_replace_wholesale() {
        let recognizer = Arc::new(ScriptedRecognizer::new());
        let (controller, _unused) = make_controller(Arc::clone(&recognizer), true);
        let (tx, mut rx) = mpsc::channel(16);

        assert_eq!(controller.toggle("en", tx).unwrap(), ToggleOutcome::Started);
        assert_eq!(controller.state(), RecordingState::Listening);

        recognizer.emit(RecognitionEvent::Results(vec![TranscriptSegment::interim("hel")]));
        assert_eq!(recv_update(&mut rx).await, "hel");

        // The next interim update replaces, never appends.
        recognizer.emit(RecognitionEvent::Results(vec![TranscriptSegment::interim("hello wor")]));
        assert_eq!(recv_update(&mut rx).await, "hello wor");
    }

    #[tokio::test]
    async fn finalized_segments_win_over_interim() {
        let recognizer = Arc::new(ScriptedRecognizer::new());
        let (controller, _unused) = make_controller(Arc::clone(&recognizer), true);
        let (tx, mut rx) = mpsc::channel(16);
        controller.toggle("en", tx).unwrap();

        recognizer.emit(RecognitionEvent::Results(vec![
            TranscriptSegment::finalized("hello "),
            TranscriptSegment::finalized("world"),
            TranscriptSegment::interim("ignored tail"),
        ]));
        assert_eq!(recv_update(&mut rx).await, "hello world");
    }

    #[tokio::test]
    async fn toggle_while_listening_stops() {
        let recognizer = Arc::new(ScriptedRecognizer::new());
        let (controller, _unused) = make_controller(Arc::clone(&recognizer), true);
        let (tx, _rx) = mpsc::channel(16);
        controller.toggle("en", tx.clone()).unwrap();

        let outcome = controller.toggle("en", tx).unwrap();
        assert_eq!(outcome, ToggleOutcome::Stopped);
        assert!(!controller.is_active());
        assert_eq!(controller.state(), RecordingState::Stopped);
        assert_eq!(recognizer.stop_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stop_preserves_transcript() {
        let recognizer = Arc::new(ScriptedRecognizer::new());
        let (controller, _unused) = make_controller(Arc::clone(&recognizer), true);
        let (tx, mut rx) = mpsc::channel(16);
        controller.toggle("en", tx).unwrap();

        recognizer.emit(RecognitionEvent::Results(vec![TranscriptSegment::finalized("keep me")]));
        recv_update(&mut rx).await;

        controller.stop();
        assert_eq!(controller.transcript(), "keep me");
    }

    #[tokio::test]
    async fn error_aborts_but_preserves_transcript() {
        let recognizer = Arc::new(ScriptedRecognizer::new());
        let (controller, _unused) = make_controller(Arc::clone(&recognizer), true);
        let (tx, mut rx) = mpsc::channel(16);
        controller.toggle("en", tx).unwrap();

        recognizer.emit(RecognitionEvent::Results(vec![TranscriptSegment::interim("partial")]));
        recv_update(&mut rx).await;

        recognizer.emit(RecognitionEvent::Error(SpeechError::NoSpeech));
        // Give the pump a beat to process the error.
        tokio::task::yield_now().await;
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        assert!(!controller.is_active());
        assert_eq!(controller.state(), RecordingState::Idle);
        assert_eq!(controller.last_error(), Some(SpeechError::NoSpeech));
        assert_eq!(controller.transcript(), "partial");
    }

    #[tokio::test]
    async fn starting_clears_previous_session_state() {
        let recognizer = Arc::new(ScriptedRecognizer::new());
        let (controller, _unused) = make_controller(Arc::clone(&recognizer), true);
        let (tx, mut rx) = mpsc::channel(16);
        controller.toggle("en", tx.clone()).unwrap();
        recognizer.emit(RecognitionEvent::Results(vec![TranscriptSegment::finalized("old")]));
        recv_update(&mut rx).await;
        controller.stop();

        controller.toggle("en", tx).unwrap();
        assert_eq!(controller.transcript(), "");
        assert_eq!(controller.state(), RecordingState::Listening);
    }

    #[tokio::test]
    async fn starting_fires_playback_cancel_hook() {
        let recognizer = Arc::new(ScriptedRecognizer::new());
        let (controller, _unused) = make_controller(recognizer, true);

        let cancels = Arc::new(AtomicUsize::new(0));
        let cancels_clone = Arc::clone(&cancels);
        controller.set_playback_cancel(move || {
            cancels_clone.fetch_add(1, Ordering::SeqCst);
        });

        let (tx, _rx) = mpsc::channel(4);
        controller.toggle("en", tx).unwrap();
        assert_eq!(cancels.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn assemble_prefers_finalized() {
        let segments = vec![
            TranscriptSegment::finalized("a"),
            TranscriptSegment::interim("b"),
        ];
        assert_eq!(assemble_transcript(&segments), "a");
    }

    #[test]
    fn assemble_falls_back_to_interim() {
        let segments = vec![TranscriptSegment::interim("only interim")];
        assert_eq!(assemble_transcript(&segments), "only interim");
    }

    #[test]
    fn assemble_empty_is_empty() {
        assert_eq!(assemble_transcript(&[]), "");
    }
}
