//! Session state machine and the single event queue that drives it.
//!
//! Everything that can influence a dictation session — hotkeys, captured
//! audio frames, capture failures, finished transcriptions — is expressed as
//! a [`SessionEvent`] and posted onto one `tokio::mpsc` queue.  The
//! [`SessionEngine`](engine::SessionEngine) is the queue's only consumer, so
//! all state transitions are serialised in arrival order and the state
//! machine itself needs no locks.

pub mod engine;

pub use engine::SessionEngine;

use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::audio::{AudioFrame, CaptureError};
use crate::transcribe::TranscribeError;

// ---------------------------------------------------------------------------
// SessionEvent
// ---------------------------------------------------------------------------

/// One message on the session queue.
#[derive(Debug)]
pub enum SessionEvent {
    /// Toggle hotkey: start when idle, stop-and-transcribe when recording,
    /// ignored while a transcription is in flight.
    Toggle,
    /// Cancel hotkey: discard the recording or orphan the in-flight
    /// transcription.  Ignored when idle.
    Cancel,
    /// A chunk of 16 kHz mono audio from the capture thread.
    Frame(AudioFrame),
    /// The capture thread could not open or keep the input stream.
    CaptureFailed(CaptureError),
    /// A transcription task finished.  `session_id` identifies the session
    /// that spawned it; results for an already-cancelled id are discarded.
    TranscriptionDone {
        session_id: u64,
        result: Result<String, TranscribeError>,
    },
    /// Stop the engine loop.  Used on app exit and by tests.
    Shutdown,
}

// ---------------------------------------------------------------------------
// SessionPhase / StatusSnapshot
// ---------------------------------------------------------------------------

/// Externally visible pipeline phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Recording,
    Transcribing,
}

impl SessionPhase {
    /// Short label for the UI.
    pub fn label(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "Ready",
            SessionPhase::Recording => "Recording",
            SessionPhase::Transcribing => "Transcribing",
        }
    }

    /// True while a session is open in either form.
    pub fn is_busy(&self) -> bool {
        !matches!(self, SessionPhase::Idle)
    }
}

/// Snapshot of engine state published for the UI thread.
///
/// The engine overwrites this under a mutex on every transition; the UI polls
/// it each frame.  It is deliberately plain data so the UI never blocks on
/// engine work.
#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    pub phase: SessionPhase,
    /// Most recent successful transcript, kept for display until the next
    /// session starts.
    pub last_text: Option<String>,
    /// Most recent failure message, cleared when the next session starts.
    pub error: Option<String>,
    /// Length of the current recording, updated as frames arrive.
    pub recording_secs: f32,
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self {
            phase: SessionPhase::Idle,
            last_text: None,
            error: None,
            recording_secs: 0.0,
        }
    }
}

/// Status shared between the engine and the UI.
pub type SharedStatus = Arc<Mutex<StatusSnapshot>>;

/// New shared status in the idle state.
pub fn shared_status() -> SharedStatus {
    Arc::new(Mutex::new(StatusSnapshot::default()))
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Accumulated state of one open recording.
#[derive(Debug)]
pub(crate) struct Session {
    /// Monotonic id, unique across the process lifetime.  Used to match
    /// transcription results back to the session that requested them.
    pub id: u64,
    pub started_at: Instant,
    /// 16 kHz mono samples in capture order.
    pub samples: Vec<f32>,
}

impl Session {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            started_at: Instant::now(),
            samples: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_labels_and_busy_flag() {
        assert_eq!(SessionPhase::Idle.label(), "Ready");
        assert!(!SessionPhase::Idle.is_busy());
        assert!(SessionPhase::Recording.is_busy());
        assert!(SessionPhase::Transcribing.is_busy());
    }

    #[test]
    fn default_snapshot_is_idle_and_clean() {
        let snap = StatusSnapshot::default();
        assert_eq!(snap.phase, SessionPhase::Idle);
        assert!(snap.last_text.is_none());
        assert!(snap.error.is_none());
    }
}
