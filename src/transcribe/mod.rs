//! Transcription gateway — the opaque speech-to-text boundary.
//!
//! The session engine only ever sees the [`Transcriber`] trait: audio samples
//! plus a language code in, text or a [`TranscribeError`] out.  Whether the
//! engine runs in-process ([`WhisperTranscriber`]) or as a separate
//! whisper.cpp server process ([`ServerTranscriber`]) is invisible to the
//! pipeline.
//!
//! The call is blocking and is always dispatched through
//! `tokio::task::spawn_blocking`; its completion is posted back to the engine
//! queue exactly once.  Cancellation is advisory — an in-flight call runs to
//! completion and the engine discards the late result.

pub mod server;
pub mod whisper;

pub use server::ServerTranscriber;
pub use whisper::WhisperTranscriber;

use thiserror::Error;

// ---------------------------------------------------------------------------
// TranscribeError
// ---------------------------------------------------------------------------

/// Failures surfaced by a transcription attempt.
#[derive(Debug, Clone, Error)]
pub enum TranscribeError {
    /// Backend process or model is not ready (missing model file, server
    /// unreachable).
    #[error("transcription engine unavailable: {0}")]
    EngineUnavailable(String),

    /// Zero-length audio buffer; the gateway must never be asked to
    /// transcribe silence of length zero.
    #[error("no audio was captured")]
    EmptyAudio,

    /// The engine ran but failed: inference error, malformed response,
    /// backend crash.
    #[error("transcription failed: {0}")]
    Engine(String),

    /// The user cancelled while the call was in flight.
    #[error("transcription cancelled")]
    Cancelled,
}

// ---------------------------------------------------------------------------
// Transcriber trait
// ---------------------------------------------------------------------------

/// Object-safe, thread-safe speech-to-text call.
///
/// # Contract
///
/// * `audio` is 16 kHz mono `f32` PCM.
/// * `language` is an ISO-639-1 code, or `"auto"` for engine-side detection.
/// * An empty `audio` slice returns `Err(TranscribeError::EmptyAudio)`.
pub trait Transcriber: Send + Sync {
    /// Transcribe `audio` and return the trimmed transcript.
    fn transcribe(&self, audio: &[f32], language: &str) -> Result<String, TranscribeError>;
}

const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn Transcriber>) {}
};

// ---------------------------------------------------------------------------
// MockTranscriber  (test-only)
// ---------------------------------------------------------------------------

/// Test double returning a pre-configured response, with call counting so
/// tests can assert the gateway was (or was not) invoked.
#[cfg(test)]
pub struct MockTranscriber {
    response: Result<String, TranscribeError>,
    pub calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockTranscriber {
    /// Mock that always succeeds with `text`.
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            response: Ok(text.into()),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Mock that always fails with `error`.
    pub fn err(error: TranscribeError) -> Self {
        Self {
            response: Err(error),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Number of `transcribe` invocations so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
impl Transcriber for MockTranscriber {
    fn transcribe(&self, audio: &[f32], _language: &str) -> Result<String, TranscribeError> {
        self.calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if audio.is_empty() {
            return Err(TranscribeError::EmptyAudio);
        }
        self.response.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_ok_returns_configured_text() {
        let t = MockTranscriber::ok("hello world");
        assert_eq!(t.transcribe(&[0.0; 320], "en").unwrap(), "hello world");
        assert_eq!(t.call_count(), 1);
    }

    #[test]
    fn mock_enforces_empty_audio_contract() {
        let t = MockTranscriber::ok("text");
        assert!(matches!(
            t.transcribe(&[], "auto").unwrap_err(),
            TranscribeError::EmptyAudio
        ));
    }

    #[test]
    fn box_dyn_transcriber_compiles() {
        let t: Box<dyn Transcriber> = Box::new(MockTranscriber::ok("ok"));
        let _ = t.transcribe(&[0.0; 320], "auto");
    }

    #[test]
    fn error_display_is_user_readable() {
        assert!(TranscribeError::EmptyAudio.to_string().contains("no audio"));
        assert!(TranscribeError::EngineUnavailable("server down".into())
            .to_string()
            .contains("server down"));
    }
}
