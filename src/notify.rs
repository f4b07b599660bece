//! User-facing status notifications.
//!
//! The session engine reports every observable transition through the
//! [`Notifier`] trait so that the choice of surface (log lines, the floating
//! widget, a future system tray) stays out of the state machine.  The default
//! [`LogNotifier`] writes structured log lines; the UI reads the shared
//! status snapshot instead and needs no notifier of its own.

use std::fmt;

/// One user-visible pipeline transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    /// A recording session opened and the microphone is live.
    RecordingStarted,
    /// Recording stopped; audio handed to the transcription gateway.
    Processing,
    /// A transcript was produced and handed to the output sink.
    TranscriptionComplete,
    /// The session ended without a transcript.  The payload is a
    /// user-readable reason.
    TranscriptionFailed(String),
    /// The user discarded the session.
    Cancelled,
    /// A transcript existed but could not be delivered to the sink.
    OutputFailed(String),
}

impl fmt::Display for StatusUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusUpdate::RecordingStarted => write!(f, "recording started"),
            StatusUpdate::Processing => write!(f, "transcribing"),
            StatusUpdate::TranscriptionComplete => write!(f, "transcription complete"),
            StatusUpdate::TranscriptionFailed(reason) => {
                write!(f, "transcription failed: {reason}")
            }
            StatusUpdate::Cancelled => write!(f, "cancelled"),
            StatusUpdate::OutputFailed(reason) => write!(f, "output failed: {reason}"),
        }
    }
}

/// Sink for status updates.  Implementations must be cheap; the engine calls
/// them inline on its event loop.
pub trait Notifier: Send + Sync {
    fn notify(&self, update: StatusUpdate);
}

/// Notifier that writes to the log.  Failures are warnings, cancellation is
/// routine and logged at debug.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, update: StatusUpdate) {
        match &update {
            StatusUpdate::TranscriptionFailed(_) | StatusUpdate::OutputFailed(_) => {
                log::warn!("{update}");
            }
            StatusUpdate::Cancelled => log::debug!("{update}"),
            _ => log::info!("{update}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Test double
// ---------------------------------------------------------------------------

/// Notifier that records every update for later assertions.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingNotifier {
    updates: std::sync::Mutex<Vec<StatusUpdate>>,
}

#[cfg(test)]
impl RecordingNotifier {
    pub fn updates(&self) -> Vec<StatusUpdate> {
        self.updates.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl Notifier for RecordingNotifier {
    fn notify(&self, update: StatusUpdate) {
        self.updates.lock().unwrap().push(update);
    }
}
