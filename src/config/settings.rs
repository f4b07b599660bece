//! Settings file schema, loading and first-run creation.
//!
//! The file is TOML with one table per subsystem.  Every field has a serde
//! default so users can keep a minimal file; unknown fields are ignored,
//! which lets older builds read newer files.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::paths::AppPaths;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("config file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot serialise config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Which transcription backend to construct at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineBackend {
    /// In-process whisper via a local model file.
    Local,
    /// HTTP gateway to a running whisper.cpp server.
    Server,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub backend: EngineBackend,
    /// Model file name, resolved against the models directory.
    pub model: String,
    /// Inference endpoint for the `server` backend.
    pub server_url: String,
    /// Request timeout for the `server` backend, seconds.
    pub server_timeout_secs: u64,
    /// Worker threads for local inference.
    pub n_threads: i32,
    /// Advisory compute hint (e.g. "cpu", "cuda"); passed through to the
    /// backend, which may ignore it.
    pub device: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            backend: EngineBackend::Local,
            model: "ggml-base.bin".into(),
            server_url: "http://127.0.0.1:8080/inference".into(),
            server_timeout_secs: 60,
            n_threads: 4,
            device: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Input device name; `None` picks the system default.
    pub input_device: Option<String>,
    /// Sessions longer than this are aborted.
    pub max_recording_secs: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            input_device: None,
            max_recording_secs: 120.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HotkeyConfig {
    pub toggle_key: String,
    pub cancel_key: String,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            toggle_key: "F9".into(),
            cancel_key: "Escape".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Simulate the paste shortcut after copying the transcript.
    pub auto_paste: bool,
    /// Put the previous clipboard content back after pasting.
    pub restore_clipboard: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            auto_paste: true,
            restore_clipboard: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Bars shown in the rolling waveform.
    pub waveform_columns: usize,
    pub always_on_top: bool,
    /// Last widget position, `(x, y)` in screen coordinates.
    pub window_position: Option<(f32, f32)>,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            waveform_columns: 120,
            always_on_top: true,
            window_position: None,
        }
    }
}

/// Root of the settings file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// ISO-639-1 language code, or `"auto"` for engine-side detection.
    pub language: String,
    /// `env_logger` filter string, e.g. `"info"` or `"voiceclip=debug"`.
    pub log_level: String,
    pub engine: EngineConfig,
    pub audio: AudioConfig,
    pub hotkey: HotkeyConfig,
    pub output: OutputConfig,
    pub ui: UiConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            language: "auto".into(),
            log_level: "info".into(),
            engine: EngineConfig::default(),
            audio: AudioConfig::default(),
            hotkey: HotkeyConfig::default(),
            output: OutputConfig::default(),
            ui: UiConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Load / save
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Load from the standard location, writing a default file on first run.
    pub fn load() -> Result<Self, ConfigError> {
        let paths = AppPaths::resolve();
        Self::load_from(&paths.settings_file())
    }

    /// Load from an explicit path.  A missing file is created with defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            log::info!("config: wrote default settings to {}", path.display());
            return Ok(config);
        }
        let raw = fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Write to an explicit path, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
