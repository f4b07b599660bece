//! In-process transcription via `whisper_rs`.

use std::path::Path;

use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use super::{TranscribeError, Transcriber};

/// In-process Whisper engine wrapping a `whisper_rs::WhisperContext`.
///
/// A fresh `WhisperState` is created per call, so one engine instance can be
/// shared behind an `Arc` and called from any blocking thread without locks.
pub struct WhisperTranscriber {
    ctx: WhisperContext,
    n_threads: i32,
}

impl std::fmt::Debug for WhisperTranscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperTranscriber")
            .field("n_threads", &self.n_threads)
            .finish_non_exhaustive()
    }
}

// `WhisperContext` holds a raw pointer but whisper-rs declares it Send+Sync;
// the model weights are read-only after load.
// SAFETY: WhisperContext is Send+Sync as declared by whisper-rs.
unsafe impl Send for WhisperTranscriber {}
unsafe impl Sync for WhisperTranscriber {}

impl WhisperTranscriber {
    /// Load a GGML model from disk.
    ///
    /// # Errors
    ///
    /// [`TranscribeError::EngineUnavailable`] when the file is missing or
    /// whisper-rs cannot initialise a context from it.
    pub fn load(model_path: impl AsRef<Path>, n_threads: i32) -> Result<Self, TranscribeError> {
        let path = model_path.as_ref();

        if !path.exists() {
            return Err(TranscribeError::EngineUnavailable(format!(
                "model not found: {}",
                path.display()
            )));
        }

        let path_str = path.to_str().ok_or_else(|| {
            TranscribeError::EngineUnavailable(format!(
                "model path is not valid UTF-8: {}",
                path.display()
            ))
        })?;

        let ctx = WhisperContext::new_with_params(path_str, WhisperContextParameters::default())
            .map_err(|e| TranscribeError::EngineUnavailable(e.to_string()))?;

        Ok(Self { ctx, n_threads })
    }
}

impl Transcriber for WhisperTranscriber {
    fn transcribe(&self, audio: &[f32], language: &str) -> Result<String, TranscribeError> {
        if audio.is_empty() {
            return Err(TranscribeError::EmptyAudio);
        }

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });

        // "auto" -> None lets Whisper run its own language detection.
        let lang = (language != "auto").then_some(language);
        params.set_language(lang);
        params.set_n_threads(self.n_threads);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_special(false);

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| TranscribeError::Engine(e.to_string()))?;

        state
            .full(params, audio)
            .map_err(|e| TranscribeError::Engine(e.to_string()))?;

        let n_segments = state
            .full_n_segments()
            .map_err(|e| TranscribeError::Engine(e.to_string()))?;

        let mut text = String::new();
        for i in 0..n_segments {
            let seg = state
                .full_get_segment_text(i)
                .map_err(|e| TranscribeError::Engine(format!("segment {i}: {e}")))?;
            text.push_str(&seg);
        }

        Ok(text.trim().to_string())
    }
}
