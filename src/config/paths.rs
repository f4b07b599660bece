//! Filesystem locations for configuration and model files.

use std::path::PathBuf;

const APP_DIR: &str = "voiceclip";

/// Resolved application paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory holding `settings.toml`.
    pub config_dir: PathBuf,
    /// Directory where local whisper models are looked up.
    pub models_dir: PathBuf,
}

impl AppPaths {
    /// Platform-appropriate paths (`~/.config/voiceclip` on Linux).
    ///
    /// Falls back to the current directory when the OS reports no config
    /// directory, which only happens in stripped-down environments.
    pub fn resolve() -> Self {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        let config_dir = base.join(APP_DIR);
        let models_dir = config_dir.join("models");
        Self {
            config_dir,
            models_dir,
        }
    }

    /// Full path of the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.toml")
    }

    /// Full path of a model file by name.
    pub fn model_file(&self, name: &str) -> PathBuf {
        self.models_dir.join(name)
    }
}
