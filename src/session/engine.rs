//! The session engine: single consumer of the event queue.
//!
//! The engine owns the only mutable pipeline state.  Audio capture, hotkeys
//! and transcription tasks all communicate with it exclusively by posting
//! [`SessionEvent`]s, so every transition happens in arrival order on one
//! task.  Transcription runs on the blocking pool and reports back through
//! the same queue, tagged with the session id; cancellation merely forgets
//! the id, and the late result is discarded when it arrives.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::{Session, SessionEvent, SessionPhase, SharedStatus, StatusSnapshot};
use crate::audio::{Recorder, SharedWaveform, TARGET_RATE};
use crate::notify::{Notifier, StatusUpdate};
use crate::output::OutputSink;
use crate::transcribe::Transcriber;

/// Engine-internal phase, carrying the per-session state the public
/// [`SessionPhase`] leaves out.
enum Phase {
    Idle,
    Recording(Session),
    Transcribing { session_id: u64 },
}

pub struct SessionEngine {
    status: SharedStatus,
    waveform: SharedWaveform,
    recorder: Box<dyn Recorder>,
    transcriber: Arc<dyn Transcriber>,
    sink: Arc<dyn OutputSink>,
    notifier: Arc<dyn Notifier>,
    /// Language code handed to the gateway, `"auto"` for detection.
    language: String,
    /// Hard cap on buffered samples; recording past it aborts the session.
    max_samples: usize,
    /// Self-sender: transcription tasks post their results back here.
    tx: mpsc::Sender<SessionEvent>,
    phase: Phase,
    next_session_id: u64,
}

impl SessionEngine {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tx: mpsc::Sender<SessionEvent>,
        status: SharedStatus,
        waveform: SharedWaveform,
        recorder: Box<dyn Recorder>,
        transcriber: Arc<dyn Transcriber>,
        sink: Arc<dyn OutputSink>,
        notifier: Arc<dyn Notifier>,
        language: String,
        max_recording_secs: f32,
    ) -> Self {
        Self {
            status,
            waveform,
            recorder,
            transcriber,
            sink,
            notifier,
            language,
            max_samples: (max_recording_secs * TARGET_RATE as f32) as usize,
            tx,
            phase: Phase::Idle,
            next_session_id: 0,
        }
    }

    /// Drain the queue until [`SessionEvent::Shutdown`] or all senders drop.
    pub async fn run(mut self, mut rx: mpsc::Receiver<SessionEvent>) {
        while let Some(event) = rx.recv().await {
            if !self.handle(event).await {
                break;
            }
        }
        log::debug!("engine: event loop finished");
    }

    /// Apply one event.  Returns `false` when the loop should stop.
    ///
    /// Exposed to tests so transitions can be driven deterministically
    /// without the queue.
    pub(crate) async fn handle(&mut self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::Toggle => self.on_toggle(),
            SessionEvent::Cancel => self.on_cancel(),
            SessionEvent::Frame(frame) => self.on_frame(frame.samples),
            SessionEvent::CaptureFailed(error) => self.on_capture_failed(error.to_string()),
            SessionEvent::TranscriptionDone { session_id, result } => {
                self.on_transcription_done(session_id, result).await;
            }
            SessionEvent::Shutdown => return false,
        }
        true
    }

    // -- transitions --------------------------------------------------------

    fn on_toggle(&mut self) {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => self.start_recording(),
            Phase::Recording(session) => self.stop_and_transcribe(session),
            Phase::Transcribing { session_id } => {
                // A toggle while the previous session is still transcribing
                // is ignored; starting here would let sessions overlap.
                log::debug!("engine: toggle ignored, session {session_id} still transcribing");
                self.phase = Phase::Transcribing { session_id };
            }
        }
    }

    fn start_recording(&mut self) {
        self.waveform.lock().unwrap().clear();

        if let Err(e) = self.recorder.start() {
            self.fail(e.to_string());
            return;
        }

        let id = self.next_session_id;
        self.next_session_id += 1;
        self.phase = Phase::Recording(Session::new(id));

        self.set_status(|s| {
            s.phase = SessionPhase::Recording;
            s.error = None;
            s.recording_secs = 0.0;
        });
        self.notifier.notify(StatusUpdate::RecordingStarted);
        log::info!("engine: session {id} recording");
    }

    fn stop_and_transcribe(&mut self, session: Session) {
        self.recorder.stop();
        let elapsed = session.started_at.elapsed().as_secs_f32();
        log::info!(
            "engine: session {} stopped after {elapsed:.1}s, {} samples",
            session.id,
            session.samples.len()
        );

        if session.samples.is_empty() {
            // Nothing ever reached the queue; do not bother the gateway.
            self.waveform.lock().unwrap().clear();
            self.fail("no audio was captured".into());
            return;
        }

        self.phase = Phase::Transcribing {
            session_id: session.id,
        };
        self.set_status(|s| s.phase = SessionPhase::Transcribing);
        self.notifier.notify(StatusUpdate::Processing);

        let transcriber = Arc::clone(&self.transcriber);
        let tx = self.tx.clone();
        let language = self.language.clone();
        let session_id = session.id;
        let samples = session.samples;

        tokio::task::spawn_blocking(move || {
            let result = transcriber.transcribe(&samples, &language);
            // The engine may have shut down; a closed queue is fine.
            let _ = tx.blocking_send(SessionEvent::TranscriptionDone { session_id, result });
        });
    }

    fn on_cancel(&mut self) {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => {
                self.phase = Phase::Idle;
            }
            Phase::Recording(session) => {
                self.recorder.stop();
                self.waveform.lock().unwrap().clear();
                log::info!("engine: session {} cancelled while recording", session.id);
                self.finish_cancelled();
            }
            Phase::Transcribing { session_id } => {
                // The blocking task keeps running; forgetting the id is what
                // orphans its eventual result.
                self.waveform.lock().unwrap().clear();
                log::info!("engine: session {session_id} cancelled while transcribing");
                self.finish_cancelled();
            }
        }
    }

    fn finish_cancelled(&mut self) {
        self.set_status(|s| {
            s.phase = SessionPhase::Idle;
            s.recording_secs = 0.0;
        });
        self.notifier.notify(StatusUpdate::Cancelled);
    }

    fn on_frame(&mut self, samples: Vec<f32>) {
        let (buffered, id) = match &mut self.phase {
            Phase::Recording(session) => {
                session.samples.extend_from_slice(&samples);
                (session.samples.len(), session.id)
            }
            // Frames race the stream teardown; late ones are dropped.
            _ => return,
        };

        self.waveform.lock().unwrap().push_frame(&samples);
        let secs = buffered as f32 / TARGET_RATE as f32;
        self.set_status(|s| s.recording_secs = secs);

        if buffered > self.max_samples {
            self.recorder.stop();
            self.waveform.lock().unwrap().clear();
            self.phase = Phase::Idle;
            log::warn!("engine: session {id} exceeded the maximum recording length");
            self.fail("recording exceeded the maximum length".into());
        }
    }

    fn on_capture_failed(&mut self, reason: String) {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Recording(session) => {
                self.recorder.stop();
                self.waveform.lock().unwrap().clear();
                log::warn!("engine: session {} lost its capture stream", session.id);
                self.fail(reason);
            }
            other => {
                // Capture failures outside a recording leave nothing to
                // abort, but the user still sees the reason.
                self.phase = other;
                self.set_status(|s| s.error = Some(reason.clone()));
                self.notifier
                    .notify(StatusUpdate::TranscriptionFailed(reason));
            }
        }
    }

    async fn on_transcription_done(
        &mut self,
        session_id: u64,
        result: Result<String, crate::transcribe::TranscribeError>,
    ) {
        match &self.phase {
            Phase::Transcribing {
                session_id: current,
            } if *current == session_id => {}
            _ => {
                log::debug!("engine: discarding late result for session {session_id}");
                return;
            }
        }

        self.phase = Phase::Idle;
        self.waveform.lock().unwrap().clear();

        let text = match result {
            Ok(text) => text,
            Err(e) => {
                self.fail(e.to_string());
                return;
            }
        };

        if text.trim().is_empty() {
            self.fail("no speech detected".into());
            return;
        }

        self.set_status(|s| {
            s.phase = SessionPhase::Idle;
            s.last_text = Some(text.clone());
            s.error = None;
            s.recording_secs = 0.0;
        });
        self.notifier.notify(StatusUpdate::TranscriptionComplete);
        log::info!("engine: session {session_id} produced {} chars", text.len());

        // Delivery runs on the blocking pool; a failure is reported once and
        // the session stays finished.
        let sink = Arc::clone(&self.sink);
        let delivery = tokio::task::spawn_blocking(move || sink.deliver(&text)).await;

        let outcome = match delivery {
            Ok(outcome) => outcome,
            Err(join_error) => {
                self.notifier
                    .notify(StatusUpdate::OutputFailed(join_error.to_string()));
                return;
            }
        };
        if let Err(e) = outcome {
            self.set_status(|s| s.error = Some(e.to_string()));
            self.notifier.notify(StatusUpdate::OutputFailed(e.to_string()));
        }
    }

    // -- helpers ------------------------------------------------------------

    /// Report a failed session and return to idle.
    fn fail(&mut self, reason: String) {
        self.set_status(|s| {
            s.phase = SessionPhase::Idle;
            s.error = Some(reason.clone());
            s.recording_secs = 0.0;
        });
        self.notifier
            .notify(StatusUpdate::TranscriptionFailed(reason));
    }

    fn set_status(&self, apply: impl FnOnce(&mut StatusSnapshot)) {
        apply(&mut self.status.lock().unwrap());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{shared_waveform, AudioFrame, CaptureError};
    use crate::notify::RecordingNotifier;
    use crate::output::OutputError;
    use crate::session::shared_status;
    use crate::transcribe::{MockTranscriber, TranscribeError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct StubRecorder {
        starts: Arc<AtomicUsize>,
        stops: Arc<AtomicUsize>,
        fail_start: bool,
    }

    impl Recorder for StubRecorder {
        fn start(&mut self) -> Result<(), CaptureError> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            if self.fail_start {
                return Err(CaptureError::DeviceUnavailable("no microphone".into()));
            }
            Ok(())
        }

        fn stop(&mut self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Transcriber that stores the audio it was handed.
    struct CapturingTranscriber {
        audio: Mutex<Vec<f32>>,
    }

    impl Transcriber for CapturingTranscriber {
        fn transcribe(
            &self,
            audio: &[f32],
            _language: &str,
        ) -> Result<String, TranscribeError> {
            *self.audio.lock().unwrap() = audio.to_vec();
            Ok("captured".into())
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        delivered: Mutex<Vec<String>>,
        fail: bool,
    }

    impl OutputSink for RecordingSink {
        fn deliver(&self, text: &str) -> Result<(), OutputError> {
            if self.fail {
                return Err(OutputError::ClipboardAccess("clipboard locked".into()));
            }
            self.delivered.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    struct Harness {
        engine: SessionEngine,
        rx: mpsc::Receiver<SessionEvent>,
        status: SharedStatus,
        waveform: SharedWaveform,
        transcriber: Arc<MockTranscriber>,
        sink: Arc<RecordingSink>,
        notifier: Arc<RecordingNotifier>,
        starts: Arc<AtomicUsize>,
        stops: Arc<AtomicUsize>,
    }

    fn harness(transcriber: MockTranscriber) -> Harness {
        harness_with(transcriber, RecordingSink::default(), false, 120.0)
    }

    fn harness_with(
        transcriber: MockTranscriber,
        sink: RecordingSink,
        fail_start: bool,
        max_recording_secs: f32,
    ) -> Harness {
        let (tx, rx) = mpsc::channel(64);
        let status = shared_status();
        let waveform = shared_waveform(120);
        let transcriber = Arc::new(transcriber);
        let sink = Arc::new(sink);
        let notifier = Arc::new(RecordingNotifier::default());
        let starts = Arc::new(AtomicUsize::new(0));
        let stops = Arc::new(AtomicUsize::new(0));

        let engine = SessionEngine::new(
            tx,
            Arc::clone(&status),
            Arc::clone(&waveform),
            Box::new(StubRecorder {
                starts: Arc::clone(&starts),
                stops: Arc::clone(&stops),
                fail_start,
            }),
            Arc::clone(&transcriber) as Arc<dyn Transcriber>,
            Arc::clone(&sink) as Arc<dyn OutputSink>,
            Arc::clone(&notifier) as Arc<dyn Notifier>,
            "auto".into(),
            max_recording_secs,
        );

        Harness {
            engine,
            rx,
            status,
            waveform,
            transcriber,
            sink,
            notifier,
            starts,
            stops,
        }
    }

    fn frame(n: usize) -> SessionEvent {
        SessionEvent::Frame(AudioFrame {
            samples: vec![0.1_f32; n],
        })
    }

    fn phase(h: &Harness) -> SessionPhase {
        h.status.lock().unwrap().phase
    }

    #[tokio::test]
    async fn toggle_starts_recording_from_idle() {
        let mut h = harness(MockTranscriber::ok("hello"));
        h.engine.handle(SessionEvent::Toggle).await;

        assert_eq!(phase(&h), SessionPhase::Recording);
        assert_eq!(h.starts.load(Ordering::SeqCst), 1);
        assert_eq!(h.notifier.updates(), vec![StatusUpdate::RecordingStarted]);
    }

    #[tokio::test]
    async fn failed_recorder_start_stays_idle_with_error() {
        let mut h = harness_with(
            MockTranscriber::ok("hello"),
            RecordingSink::default(),
            true,
            120.0,
        );
        h.engine.handle(SessionEvent::Toggle).await;

        assert_eq!(phase(&h), SessionPhase::Idle);
        let error = h.status.lock().unwrap().error.clone().unwrap();
        assert!(error.contains("unavailable"));
        assert_eq!(h.transcriber.call_count(), 0);
    }

    #[tokio::test]
    async fn full_session_delivers_transcript() {
        let mut h = harness(MockTranscriber::ok("  hello world  "));
        h.engine.handle(SessionEvent::Toggle).await;
        h.engine.handle(frame(1600)).await;
        h.engine.handle(SessionEvent::Toggle).await;

        assert_eq!(phase(&h), SessionPhase::Transcribing);

        // The blocking task posts its result on the engine queue.
        let done = h.rx.recv().await.unwrap();
        h.engine.handle(done).await;

        assert_eq!(phase(&h), SessionPhase::Idle);
        assert_eq!(h.transcriber.call_count(), 1);
        assert_eq!(
            *h.sink.delivered.lock().unwrap(),
            vec!["  hello world  "]
        );
        assert_eq!(
            h.status.lock().unwrap().last_text.as_deref(),
            Some("  hello world  ")
        );
        assert_eq!(
            h.notifier.updates(),
            vec![
                StatusUpdate::RecordingStarted,
                StatusUpdate::Processing,
                StatusUpdate::TranscriptionComplete,
            ]
        );
    }

    #[tokio::test]
    async fn stop_with_no_frames_reports_empty_audio_without_the_gateway() {
        let mut h = harness(MockTranscriber::ok("hello"));
        h.engine.handle(SessionEvent::Toggle).await;
        h.engine.handle(SessionEvent::Toggle).await;

        assert_eq!(phase(&h), SessionPhase::Idle);
        assert_eq!(h.transcriber.call_count(), 0);
        let error = h.status.lock().unwrap().error.clone().unwrap();
        assert!(error.contains("no audio"));
    }

    #[tokio::test]
    async fn toggle_while_transcribing_is_ignored() {
        let mut h = harness(MockTranscriber::ok("hello"));
        h.engine.handle(SessionEvent::Toggle).await;
        h.engine.handle(frame(1600)).await;
        h.engine.handle(SessionEvent::Toggle).await;

        // A second toggle must not start an overlapping session.
        h.engine.handle(SessionEvent::Toggle).await;

        assert_eq!(phase(&h), SessionPhase::Transcribing);
        assert_eq!(h.starts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancel_while_recording_discards_audio() {
        let mut h = harness(MockTranscriber::ok("hello"));
        h.engine.handle(SessionEvent::Toggle).await;
        h.engine.handle(frame(1600)).await;
        h.engine.handle(SessionEvent::Cancel).await;

        assert_eq!(phase(&h), SessionPhase::Idle);
        assert_eq!(h.stops.load(Ordering::SeqCst), 1);
        assert_eq!(h.transcriber.call_count(), 0);
        assert!(h.waveform.lock().unwrap().is_empty());
        assert!(h
            .notifier
            .updates()
            .contains(&StatusUpdate::Cancelled));
    }

    #[tokio::test]
    async fn cancel_while_idle_is_a_no_op() {
        let mut h = harness(MockTranscriber::ok("hello"));
        h.engine.handle(SessionEvent::Cancel).await;

        assert_eq!(phase(&h), SessionPhase::Idle);
        assert!(h.notifier.updates().is_empty());
    }

    #[tokio::test]
    async fn late_result_after_cancel_is_discarded() {
        let mut h = harness(MockTranscriber::ok("stale text"));
        h.engine.handle(SessionEvent::Toggle).await;
        h.engine.handle(frame(1600)).await;
        h.engine.handle(SessionEvent::Toggle).await;

        // Cancel wins the race; the blocking task still completes.
        h.engine.handle(SessionEvent::Cancel).await;
        let done = h.rx.recv().await.unwrap();
        h.engine.handle(done).await;

        assert_eq!(phase(&h), SessionPhase::Idle);
        assert!(h.sink.delivered.lock().unwrap().is_empty());
        assert!(h.status.lock().unwrap().last_text.is_none());
    }

    #[tokio::test]
    async fn new_session_after_cancel_does_not_receive_old_result() {
        let mut h = harness(MockTranscriber::ok("text"));

        // First session, cancelled mid-transcription.
        h.engine.handle(SessionEvent::Toggle).await;
        h.engine.handle(frame(1600)).await;
        h.engine.handle(SessionEvent::Toggle).await;
        let stale = h.rx.recv().await.unwrap();
        h.engine.handle(SessionEvent::Cancel).await;

        // Second session reaches the transcribing phase.
        h.engine.handle(SessionEvent::Toggle).await;
        h.engine.handle(frame(1600)).await;
        h.engine.handle(SessionEvent::Toggle).await;

        // The stale result carries the old id and must not finish the new
        // session.
        h.engine.handle(stale).await;
        assert_eq!(phase(&h), SessionPhase::Transcribing);
        assert!(h.sink.delivered.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn transcription_error_reports_and_returns_to_idle() {
        let mut h = harness(MockTranscriber::err(TranscribeError::EngineUnavailable(
            "server down".into(),
        )));
        h.engine.handle(SessionEvent::Toggle).await;
        h.engine.handle(frame(1600)).await;
        h.engine.handle(SessionEvent::Toggle).await;
        let done = h.rx.recv().await.unwrap();
        h.engine.handle(done).await;

        assert_eq!(phase(&h), SessionPhase::Idle);
        assert!(h.sink.delivered.lock().unwrap().is_empty());
        let error = h.status.lock().unwrap().error.clone().unwrap();
        assert!(error.contains("server down"));
    }

    #[tokio::test]
    async fn blank_transcript_is_a_failure_not_a_delivery() {
        let mut h = harness(MockTranscriber::ok("   "));
        h.engine.handle(SessionEvent::Toggle).await;
        h.engine.handle(frame(1600)).await;
        h.engine.handle(SessionEvent::Toggle).await;
        let done = h.rx.recv().await.unwrap();
        h.engine.handle(done).await;

        assert!(h.sink.delivered.lock().unwrap().is_empty());
        let error = h.status.lock().unwrap().error.clone().unwrap();
        assert!(error.contains("no speech"));
    }

    #[tokio::test]
    async fn overlong_recording_is_aborted() {
        // 0.05 s cap at 16 kHz is 800 samples.
        let mut h = harness_with(
            MockTranscriber::ok("hello"),
            RecordingSink::default(),
            false,
            0.05,
        );
        h.engine.handle(SessionEvent::Toggle).await;
        h.engine.handle(frame(1600)).await;

        assert_eq!(phase(&h), SessionPhase::Idle);
        assert_eq!(h.stops.load(Ordering::SeqCst), 1);
        assert_eq!(h.transcriber.call_count(), 0);
        let error = h.status.lock().unwrap().error.clone().unwrap();
        assert!(error.contains("maximum"));
    }

    #[tokio::test]
    async fn capture_failure_aborts_the_recording() {
        let mut h = harness(MockTranscriber::ok("hello"));
        h.engine.handle(SessionEvent::Toggle).await;
        h.engine
            .handle(SessionEvent::CaptureFailed(
                CaptureError::PermissionDenied("microphone blocked".into()),
            ))
            .await;

        assert_eq!(phase(&h), SessionPhase::Idle);
        let error = h.status.lock().unwrap().error.clone().unwrap();
        assert!(error.contains("denied"));
    }

    #[tokio::test]
    async fn frames_outside_a_recording_are_dropped() {
        let mut h = harness(MockTranscriber::ok("hello"));
        h.engine.handle(frame(1600)).await;

        assert_eq!(phase(&h), SessionPhase::Idle);
        assert!(h.waveform.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn output_failure_is_reported_once_and_session_stays_finished() {
        let mut h = harness_with(
            MockTranscriber::ok("hello"),
            RecordingSink {
                delivered: Mutex::new(Vec::new()),
                fail: true,
            },
            false,
            120.0,
        );
        h.engine.handle(SessionEvent::Toggle).await;
        h.engine.handle(frame(1600)).await;
        h.engine.handle(SessionEvent::Toggle).await;
        let done = h.rx.recv().await.unwrap();
        h.engine.handle(done).await;

        assert_eq!(phase(&h), SessionPhase::Idle);
        // The transcript itself succeeded; only delivery failed.
        assert_eq!(h.status.lock().unwrap().last_text.as_deref(), Some("hello"));
        let failures: Vec<_> = h
            .notifier
            .updates()
            .into_iter()
            .filter(|u| matches!(u, StatusUpdate::OutputFailed(_)))
            .collect();
        assert_eq!(failures.len(), 1);
    }

    #[tokio::test]
    async fn frames_advance_the_recording_clock() {
        let mut h = harness(MockTranscriber::ok("hello"));
        h.engine.handle(SessionEvent::Toggle).await;
        h.engine.handle(frame(16_000)).await;

        let secs = h.status.lock().unwrap().recording_secs;
        assert!((secs - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn gateway_receives_frames_concatenated_in_arrival_order() {
        let (tx, mut rx) = mpsc::channel(64);
        let status = shared_status();
        let waveform = shared_waveform(120);
        let transcriber = Arc::new(CapturingTranscriber {
            audio: Mutex::new(Vec::new()),
        });
        let sink = Arc::new(RecordingSink::default());

        let mut engine = SessionEngine::new(
            tx,
            Arc::clone(&status),
            waveform,
            Box::new(StubRecorder {
                starts: Arc::new(AtomicUsize::new(0)),
                stops: Arc::new(AtomicUsize::new(0)),
                fail_start: false,
            }),
            Arc::clone(&transcriber) as Arc<dyn Transcriber>,
            sink as Arc<dyn OutputSink>,
            Arc::new(RecordingNotifier::default()) as Arc<dyn Notifier>,
            "auto".into(),
            120.0,
        );

        engine.handle(SessionEvent::Toggle).await;
        let frames: Vec<Vec<f32>> = (1..=5)
            .map(|i| vec![i as f32 * 0.01; 320])
            .collect();
        for samples in &frames {
            engine
                .handle(SessionEvent::Frame(AudioFrame {
                    samples: samples.clone(),
                }))
                .await;
        }
        engine.handle(SessionEvent::Toggle).await;
        let done = rx.recv().await.unwrap();
        engine.handle(done).await;

        let expected: Vec<f32> = frames.concat();
        assert_eq!(*transcriber.audio.lock().unwrap(), expected);
    }

    #[tokio::test]
    async fn run_loop_terminates_on_shutdown() {
        let h = harness(MockTranscriber::ok("hello"));
        let Harness { engine, rx, .. } = h;

        // The engine holds a clone of the sender, so the loop only ends on
        // an explicit shutdown event.
        let tx = engine.tx.clone();
        let driver = tokio::spawn(engine.run(rx));
        tx.send(SessionEvent::Toggle).await.unwrap();
        tx.send(SessionEvent::Shutdown).await.unwrap();
        driver.await.unwrap();
    }
}
