//! Out-of-process transcription via a whisper.cpp server.
//!
//! Talks to the `/inference` endpoint of a running `whisper-server`: a
//! multipart POST carrying a 16-bit PCM WAV body, the task name, and the
//! language code, answered with JSON `{ "text": ..., "language": ... }`.
//! Whether that server runs locally or elsewhere is the operator's business;
//! this gateway only knows the URL.

use std::io::Cursor;
use std::time::Duration;

use serde::Deserialize;

use super::{TranscribeError, Transcriber};
use crate::audio::TARGET_RATE;

/// JSON body returned by the whisper.cpp `/inference` endpoint.
#[derive(Debug, Deserialize)]
struct InferenceResponse {
    text: String,
    /// Detected (or echoed) language; informational only.
    #[serde(default)]
    language: Option<String>,
}

/// HTTP gateway to a whisper.cpp server.
pub struct ServerTranscriber {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl ServerTranscriber {
    /// Build a gateway for `endpoint` (e.g. `http://127.0.0.1:8080/inference`)
    /// with a per-request timeout.
    ///
    /// # Errors
    ///
    /// [`TranscribeError::EngineUnavailable`] if the HTTP client cannot be
    /// initialised (TLS backend failure).
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Result<Self, TranscribeError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| TranscribeError::EngineUnavailable(e.to_string()))?;

        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }
}

impl Transcriber for ServerTranscriber {
    fn transcribe(&self, audio: &[f32], language: &str) -> Result<String, TranscribeError> {
        if audio.is_empty() {
            return Err(TranscribeError::EmptyAudio);
        }

        let wav = wav_bytes(audio)?;

        let file = reqwest::blocking::multipart::Part::bytes(wav)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| TranscribeError::Engine(e.to_string()))?;

        // "auto" is passed through verbatim; the server runs its own
        // language detection for it.
        let form = reqwest::blocking::multipart::Form::new()
            .part("file", file)
            .text("task", "transcribe")
            .text("language", language.to_string());

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    TranscribeError::EngineUnavailable(e.to_string())
                } else {
                    TranscribeError::Engine(e.to_string())
                }
            })?;

        let response = response
            .error_for_status()
            .map_err(|e| TranscribeError::Engine(e.to_string()))?;

        let body: InferenceResponse = response
            .json()
            .map_err(|e| TranscribeError::Engine(format!("malformed response: {e}")))?;

        if let Some(lang) = &body.language {
            log::debug!("server gateway: detected language '{lang}'");
        }

        Ok(body.text.trim().to_string())
    }
}

/// Encode 16 kHz mono `f32` samples as a 16-bit PCM WAV byte buffer.
fn wav_bytes(audio: &[f32]) -> Result<Vec<u8>, TranscribeError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: TARGET_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| TranscribeError::Engine(e.to_string()))?;
        for &s in audio {
            let pcm = (s.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
            writer
                .write_sample(pcm)
                .map_err(|e| TranscribeError::Engine(e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| TranscribeError::Engine(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}
