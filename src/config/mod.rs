//! Configuration: TOML settings file plus path resolution.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    AppConfig, AudioConfig, ConfigError, EngineBackend, EngineConfig, HotkeyConfig, OutputConfig,
    UiConfig,
};
