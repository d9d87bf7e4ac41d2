//! Speech input (recognition) and output (synthesis).
//!
//! Platform speech engines are callback-heavy and platform-specific, so
//! they sit behind two capability traits — [`SpeechRecognizer`] and
//! [`SpeechSynthesizer`] — and the controllers here depend only on those.
//! Tests (and headless builds) supply mock engines.
//!
//! Cross-cancellation rules:
//! - starting a recording session cancels any pending speech playback;
//! - starting speech playback stops any active recording session.
//!
//! Each controller exposes a hook for the wiring layer to connect the two
//! without a circular dependency.

pub mod input;
pub mod output;

use thiserror::Error;

pub use input::{
    RecognitionEvent, RecordingState, SpeechInputController, SpeechRecognizer, ToggleOutcome,
    TranscriptSegment,
};
pub use output::{SpeechOutputController, SpeechSynthesizer, Voice};

// ---------------------------------------------------------------------------
// SpeechError
// ---------------------------------------------------------------------------

/// Errors surfaced by the speech controllers.
///
/// All variants abort the current recording/playback; none are fatal to the
/// process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpeechError {
    /// The platform offers no speech capability at all.
    #[error("speech is not supported on this platform")]
    Unsupported,

    /// Speech requires a network connection in this design.
    #[error("speech requires a network connection")]
    Offline,

    /// The engine heard nothing.
    #[error("no speech detected")]
    NoSpeech,

    /// Microphone permission was denied.
    #[error("microphone permission denied")]
    PermissionDenied,

    /// Microphone or audio pipeline failure.
    #[error("audio capture failed: {0}")]
    AudioCapture(String),

    /// Network failure inside the recognition engine.
    #[error("network error during speech recognition")]
    Network,

    /// Anything else the engine reports.
    #[error("speech engine error: {0}")]
    Engine(String),
}
