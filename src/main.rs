//! Application entry point.
//!
//! # Startup sequence
//!
//! 1. Load [`AppConfig`] (a default file is written on first run).
//! 2. Initialise logging with the configured filter.
//! 3. Create the tokio runtime (multi-thread, 2 workers).
//! 4. Build the transcription gateway from config, degrading to a stub that
//!    reports the problem when the backend cannot be constructed.
//! 5. Create the session event queue and spawn the engine on the runtime.
//! 6. Spawn the capture thread and the hotkey listener; hotkeys are
//!    forwarded onto the engine queue by a small runtime task.
//! 7. Run [`eframe::run_native`] — blocks the main thread until the widget
//!    is closed.

use std::sync::Arc;

use eframe::egui;
use tokio::sync::mpsc;
use voiceclip::{
    app::VoiceclipApp,
    audio::{shared_waveform, CpalRecorder},
    config::{AppConfig, AppPaths, EngineBackend},
    hotkey::{parse_key, HotkeyEvent, HotkeyListener},
    notify::LogNotifier,
    output::{ClipboardSink, OutputSink},
    session::{shared_status, SessionEngine, SessionEvent},
    transcribe::{ServerTranscriber, TranscribeError, Transcriber, WhisperTranscriber},
};

/// Build the configured transcription backend, falling back to a stub so the
/// app still launches when the model or server is missing.
fn build_transcriber(config: &AppConfig, paths: &AppPaths) -> Arc<dyn Transcriber> {
    if let Some(device) = &config.engine.device {
        // Advisory only; the backends pick their own compute.
        log::info!("engine device hint: {device}");
    }
    match config.engine.backend {
        EngineBackend::Local => {
            let model_path = paths.model_file(&config.engine.model);
            match WhisperTranscriber::load(&model_path, config.engine.n_threads) {
                Ok(engine) => {
                    log::info!("whisper model loaded: {}", model_path.display());
                    Arc::new(engine)
                }
                Err(e) => {
                    log::warn!("could not load whisper model: {e}");
                    Arc::new(UnavailableTranscriber {
                        reason: e.to_string(),
                    })
                }
            }
        }
        EngineBackend::Server => {
            match ServerTranscriber::new(
                config.engine.server_url.clone(),
                config.engine.server_timeout_secs,
            ) {
                Ok(gateway) => {
                    log::info!("using whisper server at {}", config.engine.server_url);
                    Arc::new(gateway)
                }
                Err(e) => {
                    log::warn!("could not build server gateway: {e}");
                    Arc::new(UnavailableTranscriber {
                        reason: e.to_string(),
                    })
                }
            }
        }
    }
}

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let mut vp = egui::ViewportBuilder::default()
        .with_decorations(false)
        .with_transparent(true)
        .with_inner_size([300.0, 80.0])
        .with_min_inner_size([250.0, 50.0])
        .with_resizable(false);

    if config.ui.always_on_top {
        vp = vp.with_always_on_top();
    }

    if let Some((x, y)) = config.ui.window_position {
        vp = vp.with_position(egui::pos2(x, y));
    }

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

fn main() -> eframe::Result<()> {
    // 1. Configuration, then 2. logging with the configured filter.
    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("voiceclip: failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&config.log_level),
    )
    .init();
    log::info!("voiceclip starting up");

    // 3. Tokio runtime for the engine and blocking transcription tasks.
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to create tokio runtime");

    // 4. Transcription gateway and output sink.
    let paths = AppPaths::resolve();
    let transcriber = build_transcriber(&config, &paths);
    let sink: Arc<dyn OutputSink> = Arc::new(ClipboardSink::new(
        config.output.auto_paste,
        config.output.restore_clipboard,
    ));

    // 5. The session queue and its single consumer.
    let (event_tx, event_rx) = mpsc::channel::<SessionEvent>(256);
    let status = shared_status();
    let waveform = shared_waveform(config.ui.waveform_columns);

    let recorder = CpalRecorder::spawn(event_tx.clone(), config.audio.input_device.clone());

    let engine = SessionEngine::new(
        event_tx.clone(),
        Arc::clone(&status),
        Arc::clone(&waveform),
        Box::new(recorder),
        transcriber,
        sink,
        Arc::new(LogNotifier),
        config.language.clone(),
        config.audio.max_recording_secs,
    );
    rt.spawn(engine.run(event_rx));

    // 6. Hotkeys: listener thread plus a forwarder onto the engine queue.
    let (hotkey_tx, mut hotkey_rx) = mpsc::channel::<HotkeyEvent>(16);
    {
        let event_tx = event_tx.clone();
        rt.spawn(async move {
            while let Some(event) = hotkey_rx.recv().await {
                let session_event = match event {
                    HotkeyEvent::ToggleRecording => SessionEvent::Toggle,
                    HotkeyEvent::Cancel => SessionEvent::Cancel,
                };
                if event_tx.send(session_event).await.is_err() {
                    break;
                }
            }
        });
    }

    let toggle_key = parse_key(&config.hotkey.toggle_key).unwrap_or(rdev::Key::F9);
    let cancel_key = parse_key(&config.hotkey.cancel_key).unwrap_or(rdev::Key::Escape);
    let _hotkey_listener = HotkeyListener::start(toggle_key, cancel_key, hotkey_tx);

    // 7. Run the widget; blocks until closed.
    let app = VoiceclipApp::new(status, waveform, event_tx, config.clone());
    let options = native_options(&config);

    eframe::run_native("Voiceclip", options, Box::new(move |_cc| Ok(Box::new(app))))
}

// ---------------------------------------------------------------------------
// UnavailableTranscriber — stub when no backend could be constructed
// ---------------------------------------------------------------------------

struct UnavailableTranscriber {
    reason: String,
}

impl Transcriber for UnavailableTranscriber {
    fn transcribe(&self, _audio: &[f32], _language: &str) -> Result<String, TranscribeError> {
        Err(TranscribeError::EngineUnavailable(self.reason.clone()))
    }
}
