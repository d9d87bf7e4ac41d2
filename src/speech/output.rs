//! Speech output controller — plays back translated text.
//!
//! Voice selection is a prefix match on the language tag (a `"es"` request
//! matches an `"es-ES"` voice), falling back to the platform default when
//! nothing matches.  If the voice catalog has not finished loading at the
//! first attempt, the controller waits for the catalog-ready notification
//! exactly once and never waits again afterwards.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::connectivity::ConnectivityMonitor;

use super::SpeechError;

// ---------------------------------------------------------------------------
// Capability interface
// ---------------------------------------------------------------------------

/// One synthesizer voice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    /// BCP-47-ish tag, e.g. `"es-ES"`.
    pub language: String,
}

/// Platform text-to-speech capability.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Whether this platform can synthesize speech at all.
    fn is_supported(&self) -> bool {
        true
    }

    /// The currently loaded voice catalog (may be empty while loading).
    fn voices(&self) -> Vec<Voice>;

    /// Resolves once the voice catalog has finished loading.
    async fn wait_voices_ready(&self);

    /// Begin playback.  `voice` of `None` means the platform default.
    fn speak(&self, text: &str, voice: Option<&Voice>, language: &str)
        -> Result<(), SpeechError>;

    /// Stop playback; must be safe to call when nothing is playing.
    fn cancel(&self);
}

// ---------------------------------------------------------------------------
// SpeechOutputController
// ---------------------------------------------------------------------------

type CancelHook = Box<dyn Fn() + Send + Sync>;

/// Drives voice playback of the orchestrator's result text.
pub struct SpeechOutputController {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    connectivity: Arc<ConnectivityMonitor>,
    waited_for_voices: AtomicBool,
    capture_cancel: Mutex<Option<CancelHook>>,
}

impl SpeechOutputController {
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        connectivity: Arc<ConnectivityMonitor>,
    ) -> Self {
        Self {
            synthesizer,
            connectivity,
            waited_for_voices: AtomicBool::new(false),
            capture_cancel: Mutex::new(None),
        }
    }

    /// Install the hook that stops any active recording session; fired
    /// before every playback.
    pub fn set_capture_cancel(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.capture_cancel.lock().unwrap() = Some(Box::new(hook));
    }

    /// Speak `text` in `language`.
    ///
    /// Fails with [`SpeechError::Offline`] when the connectivity monitor
    /// reports offline and [`SpeechError::Unsupported`] when the platform
    /// has no synthesizer.  Any in-progress playback and any active
    /// recording session are cancelled first.
    pub async fn speak(&self, text: &str, language: &str) -> Result<(), SpeechError> {
        if !self.connectivity.is_online() {
            return Err(SpeechError::Offline);
        }
        if !self.synthesizer.is_supported() {
            return Err(SpeechError::Unsupported);
        }

        self.synthesizer.cancel();
        if let Some(hook) = self.capture_cancel.lock().unwrap().as_ref() {
            hook();
        }

        let mut voices = self.synthesizer.voices();
        if voices.is_empty() && !self.waited_for_voices.swap(true, Ordering::SeqCst) {
            // Catalog still loading: wait for the ready notification, once.
            self.synthesizer.wait_voices_ready().await;
            voices = self.synthesizer.voices();
        }

        let voice = select_voice(&voices, language);
        if voice.is_none() {
            log::debug!("speech output: no voice for {language}, using platform default");
        }

        self.synthesizer.speak(text, voice, language)
    }

    /// Cancel playback.  Idempotent; safe when nothing is playing.
    pub fn cancel(&self) {
        self.synthesizer.cancel();
    }
}

/// First voice whose language tag starts with the requested code.
fn select_voice<'a>(voices: &'a [Voice], language: &str) -> Option<&'a Voice> {
    voices.iter().find(|v| v.language.starts_with(language))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
