//! Seams for text-to-speech playback and speech-to-text capture.
//!
//! Recognition is asynchronous and single-shot: `start_listening` hands back a
//! `PendingCapture` while the platform adapter keeps the matching
//! `CaptureResponder`, which can deliver exactly one result.

use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tracing::{debug, warn};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CaptureError {
    #[error("speech recognition is unavailable")]
    Unavailable,
    #[error("a speech capture is already in progress")]
    Busy,
    #[error("speech recognition failed: {0}")]
    Recognition(String),
}

/// Fire-and-forget playback.
pub trait SpeechSynthesizer: Send + Sync {
    fn speak(&self, text: &str, language_tag: &str);
}

pub trait SpeechRecognizer: Send + Sync {
    /// Begin one capture in the given language.
    ///
    /// # Errors
    ///
    /// Returns `CaptureError::Busy` while a previous capture is still pending,
    /// or `CaptureError::Unavailable` if there is no recognizer.
    fn start_listening(&self, language_tag: &str) -> Result<PendingCapture, CaptureError>;
}

//
// ─── CHANNEL ───────────────────────────────────────────────────────────────────
//

type CaptureResult = Result<String, CaptureError>;

/// Create a linked responder and pending capture.
#[must_use]
pub fn capture_channel() -> (CaptureResponder, PendingCapture) {
    let (tx, rx) = oneshot::channel();
    (
        CaptureResponder { tx },
        PendingCapture { rx, done: false },
    )
}

/// Sending half, held by the recognizer adapter.
#[derive(Debug)]
pub struct CaptureResponder {
    tx: oneshot::Sender<CaptureResult>,
}

impl CaptureResponder {
    /// Deliver the single result. Returns `false` if the capture was dropped.
    pub fn deliver(self, result: CaptureResult) -> bool {
        self.tx.send(result).is_ok()
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receiving half. Dropping it cancels the capture.
#[derive(Debug)]
pub struct PendingCapture {
    rx: oneshot::Receiver<CaptureResult>,
    done: bool,
}

impl PendingCapture {
    /// Poll without waiting. `None` means no result yet, which is distinct from
    /// `Some("")` for an empty or failed recognition. Yields a result at most once.
    pub fn try_result(&mut self) -> Option<String> {
        if self.done {
            return None;
        }
        let outcome = match self.rx.try_recv() {
            Ok(result) => transcript_or_empty(result),
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Closed) => {
                debug!("speech capture closed without a result");
                String::new()
            }
        };
        self.done = true;
        Some(outcome)
    }

    /// Wait for the result. Errors and an abandoned responder yield `""`.
    pub async fn transcript(self) -> String {
        if self.done {
            return String::new();
        }
        match self.rx.await {
            Ok(result) => transcript_or_empty(result),
            Err(_) => {
                debug!("speech capture closed without a result");
                String::new()
            }
        }
    }
}

fn transcript_or_empty(result: CaptureResult) -> String {
    match result {
        Ok(text) => text,
        Err(err) => {
            warn!(error = %err, "speech capture failed");
            String::new()
        }
    }
}

//
// ─── SLOT ──────────────────────────────────────────────────────────────────────
//

/// Holds the responder of the in-flight capture for a recognizer adapter and
/// refuses a second capture until the first is delivered or cancelled.
#[derive(Debug, Default)]
pub struct CaptureSlot {
    active: Mutex<Option<CaptureResponder>>,
}

impl CaptureSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the slot and return the pending half.
    ///
    /// # Errors
    ///
    /// Returns `CaptureError::Busy` if a live capture already occupies the slot.
    pub fn begin(&self) -> Result<PendingCapture, CaptureError> {
        let mut active = self.active.lock().map_err(|_| CaptureError::Unavailable)?;
        if active.as_ref().is_some_and(|r| !r.is_cancelled()) {
            return Err(CaptureError::Busy);
        }
        let (responder, pending) = capture_channel();
        *active = Some(responder);
        Ok(pending)
    }

    /// Deliver the result of the in-flight capture and free the slot.
    /// Returns `false` when nothing was waiting for it.
    pub fn complete(&self, result: CaptureResult) -> bool {
        let responder = match self.active.lock() {
            Ok(mut active) => active.take(),
            Err(_) => None,
        };
        responder.is_some_and(|r| r.deliver(result))
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.active
            .lock()
            .map(|active| active.as_ref().is_some_and(|r| !r.is_cancelled()))
            .unwrap_or(false)
    }
}

//
// ─── DEFAULT ADAPTERS ──────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSynthesizer;

impl SpeechSynthesizer for SilentSynthesizer {
    fn speak(&self, text: &str, language_tag: &str) {
        debug!(language_tag, text, "speech playback skipped");
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableRecognizer;

impl SpeechRecognizer for UnavailableRecognizer {
    fn start_listening(&self, _language_tag: &str) -> Result<PendingCapture, CaptureError> {
        Err(CaptureError::Unavailable)
    }
}

/// Synthesizer and recognizer pair injected into the lesson and exam services.
#[derive(Clone)]
pub struct SpeechIo {
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub recognizer: Arc<dyn SpeechRecognizer>,
}

impl SpeechIo {
    #[must_use]
    pub fn new(
        synthesizer: Arc<dyn SpeechSynthesizer>,
        recognizer: Arc<dyn SpeechRecognizer>,
    ) -> Self {
        Self {
            synthesizer,
            recognizer,
        }
    }

    /// No playback and no recognition.
    #[must_use]
    pub fn silent() -> Self {
        Self::new(Arc::new(SilentSynthesizer), Arc::new(UnavailableRecognizer))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
