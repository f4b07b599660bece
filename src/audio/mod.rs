//! Audio subsystem — capture thread, format conversion, waveform window.
//!
//! ```text
//! microphone -> cpal callback -> to_mono_16k -> SessionEvent::Frame
//!                                                 |
//!                               session engine ---+--> session buffer
//!                                                 '--> WaveformWindow (UI snapshots)
//! ```

pub mod capture;
pub mod resample;
pub mod waveform;

pub use capture::{AudioFrame, CaptureError, CpalRecorder, Recorder};
pub use resample::{downmix, resample, to_mono_16k, TARGET_RATE};
pub use waveform::{shared_waveform, SharedWaveform, WaveformWindow};
