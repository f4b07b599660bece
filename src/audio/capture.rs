//! Microphone capture on a dedicated OS thread.
//!
//! `cpal::Stream` is not `Send` on every platform, so it can never live
//! inside the session engine's tokio task.  Instead [`CpalRecorder::spawn`]
//! starts an `audio-capture` thread that owns the stream and reacts to
//! `Start`/`Stop` commands.  While a stream is open, every hardware buffer is
//! downmixed, resampled to 16 kHz and posted to the session queue as a
//! [`SessionEvent::Frame`]; failures to open the device are posted as
//! [`SessionEvent::CaptureFailed`] so the engine can abort the session.
//!
//! Stopping is always safe, including before the first frame has arrived —
//! a zero-frame recording simply leaves the session buffer empty.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use thiserror::Error;
use tokio::sync::mpsc;

use super::resample::to_mono_16k;
use crate::session::SessionEvent;

// ---------------------------------------------------------------------------
// AudioFrame
// ---------------------------------------------------------------------------

/// One chunk of captured audio, already converted to 16 kHz mono `f32`.
///
/// Frames reach the session engine in capture order over the single event
/// queue; the engine appends them to the session buffer and folds them into
/// the waveform window.
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// PCM samples in `[-1.0, 1.0]`, 16 kHz mono.
    pub samples: Vec<f32>,
}

// ---------------------------------------------------------------------------
// CaptureError
// ---------------------------------------------------------------------------

/// Errors raised while opening or running the capture stream.
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    /// No input device, or the requested device does not exist.
    #[error("audio input device unavailable: {0}")]
    DeviceUnavailable(String),

    /// The OS refused microphone access.
    #[error("microphone access denied: {0}")]
    PermissionDenied(String),

    /// The platform rejected the stream configuration.
    #[error("failed to build input stream: {0}")]
    StreamBuild(String),

    /// The stream was built but could not be started.
    #[error("failed to start input stream: {0}")]
    StreamPlay(String),
}

/// Route a backend error string to [`CaptureError::PermissionDenied`] when it
/// looks like an access problem, otherwise wrap it with `fallback`.
///
/// cpal reports permission failures as backend-specific errors with no
/// dedicated variant, so string inspection is the only portable signal.
fn classify(detail: String, fallback: fn(String) -> CaptureError) -> CaptureError {
    let lower = detail.to_lowercase();
    if lower.contains("permission") || lower.contains("access denied") {
        CaptureError::PermissionDenied(detail)
    } else {
        fallback(detail)
    }
}

// ---------------------------------------------------------------------------
// Recorder trait
// ---------------------------------------------------------------------------

/// Start/stop handle the session engine holds on the capture subsystem.
///
/// The production implementation is [`CpalRecorder`]; engine tests substitute
/// a stub and feed [`SessionEvent::Frame`]s directly.
pub trait Recorder: Send {
    /// Request the capture stream to open.  Open failures on the capture
    /// thread arrive asynchronously as [`SessionEvent::CaptureFailed`]; an
    /// `Err` here means the request itself could not be delivered.
    fn start(&mut self) -> Result<(), CaptureError>;

    /// Close the capture stream and release the device.  Safe to call when
    /// nothing is open.
    fn stop(&mut self);
}

// ---------------------------------------------------------------------------
// CpalRecorder
// ---------------------------------------------------------------------------

/// Command set understood by the capture thread.
enum CaptureCommand {
    Start,
    Stop,
}

/// Handle to the `audio-capture` thread.
pub struct CpalRecorder {
    cmd_tx: std::sync::mpsc::Sender<CaptureCommand>,
}

impl CpalRecorder {
    /// Spawn the capture thread.
    ///
    /// * `events` — the session engine's queue; receives `Frame` and
    ///   `CaptureFailed` events.
    /// * `device_name` — input device to use, `None` for the system default.
    ///
    /// # Panics
    ///
    /// Panics if the OS refuses to create the thread.
    pub fn spawn(events: mpsc::Sender<SessionEvent>, device_name: Option<String>) -> Self {
        let (cmd_tx, cmd_rx) = std::sync::mpsc::channel::<CaptureCommand>();

        std::thread::Builder::new()
            .name("audio-capture".into())
            .spawn(move || capture_loop(cmd_rx, events, device_name))
            .expect("failed to spawn audio-capture thread");

        Self { cmd_tx }
    }
}

impl Recorder for CpalRecorder {
    fn start(&mut self) -> Result<(), CaptureError> {
        self.cmd_tx
            .send(CaptureCommand::Start)
            .map_err(|_| CaptureError::DeviceUnavailable("capture thread has exited".into()))
    }

    fn stop(&mut self) {
        // A dead capture thread means the stream is already gone.
        let _ = self.cmd_tx.send(CaptureCommand::Stop);
    }
}

// ---------------------------------------------------------------------------
// Capture thread body
// ---------------------------------------------------------------------------

/// Thread main: owns at most one open `cpal::Stream` at a time.
fn capture_loop(
    cmd_rx: std::sync::mpsc::Receiver<CaptureCommand>,
    events: mpsc::Sender<SessionEvent>,
    device_name: Option<String>,
) {
    let mut active: Option<cpal::Stream> = None;

    while let Ok(cmd) = cmd_rx.recv() {
        match cmd {
            CaptureCommand::Start => {
                if active.is_some() {
                    // At most one open stream; a duplicate Start is a bug
                    // upstream but harmless here.
                    log::warn!("capture: start requested while a stream is open");
                    continue;
                }
                match open_stream(&events, device_name.as_deref()) {
                    Ok(stream) => active = Some(stream),
                    Err(e) => {
                        log::warn!("capture: failed to open stream: {e}");
                        let _ = events.blocking_send(SessionEvent::CaptureFailed(e));
                    }
                }
            }
            CaptureCommand::Stop => {
                // Dropping the stream stops delivery and releases the device.
                active = None;
            }
        }
    }

    drop(active);
    log::debug!("capture: command channel closed, thread exiting");
}

/// Open, configure and start an input stream on the given (or default)
/// device.  The callback converts each buffer and posts it to `events`.
fn open_stream(
    events: &mpsc::Sender<SessionEvent>,
    device_name: Option<&str>,
) -> Result<cpal::Stream, CaptureError> {
    let host = cpal::default_host();

    let device = match device_name {
        Some(name) => host
            .input_devices()
            .map_err(|e| classify(e.to_string(), CaptureError::DeviceUnavailable))?
            .find(|d| d.name().is_ok_and(|n| n == name))
            .ok_or_else(|| {
                CaptureError::DeviceUnavailable(format!("input device '{name}' not found"))
            })?,
        None => host
            .default_input_device()
            .ok_or_else(|| CaptureError::DeviceUnavailable("no default input device".into()))?,
    };

    let supported = device
        .default_input_config()
        .map_err(|e| classify(e.to_string(), CaptureError::DeviceUnavailable))?;

    let sample_rate = supported.sample_rate().0;
    let channels = supported.channels();
    let config: cpal::StreamConfig = supported.into();

    let tx = events.clone();
    let stream = device
        .build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let samples = to_mono_16k(data, sample_rate, channels);
                // try_send keeps the realtime callback non-blocking; the
                // queue only fills if the engine has stalled entirely.
                if tx
                    .try_send(SessionEvent::Frame(AudioFrame { samples }))
                    .is_err()
                {
                    log::warn!("capture: frame dropped, session queue full or closed");
                }
            },
            |err: cpal::StreamError| {
                log::error!("capture: stream error: {err}");
            },
            None,
        )
        .map_err(|e| classify(e.to_string(), CaptureError::StreamBuild))?;

    stream
        .play()
        .map_err(|e| classify(e.to_string(), CaptureError::StreamPlay))?;

    log::info!("capture: stream open ({sample_rate} Hz, {channels} ch)");
    Ok(stream)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audio_frame_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<AudioFrame>();
    }

    #[test]
    fn classify_routes_permission_strings() {
        let e = classify(
            "Permission denied by the OS".into(),
            CaptureError::StreamBuild,
        );
        assert!(matches!(e, CaptureError::PermissionDenied(_)));
    }

    #[test]
    fn classify_falls_back_for_other_strings() {
        let e = classify("device disconnected".into(), CaptureError::StreamBuild);
        assert!(matches!(e, CaptureError::StreamBuild(_)));
    }

    #[test]
    fn capture_error_messages_name_the_failure() {
        let e = CaptureError::DeviceUnavailable("no default input device".into());
        assert!(e.to_string().contains("unavailable"));
        let e = CaptureError::PermissionDenied("denied".into());
        assert!(e.to_string().contains("denied"));
    }
}
