//! Voiceclip — push-to-toggle desktop dictation.
//!
//! Press a hotkey to start recording, press it again to transcribe and put
//! the text on the clipboard (optionally pasting it into the focused window),
//! or press the cancel key to throw the session away.
//!
//! The crate is organised around one event queue: every input — hotkeys,
//! captured audio, capture failures, finished transcriptions — becomes a
//! [`session::SessionEvent`], and the [`session::SessionEngine`] is the
//! queue's single consumer.
//!
//! * [`audio`] — cpal capture, resampling to 16 kHz mono, the rolling
//!   waveform window.
//! * [`session`] — the Idle/Recording/Transcribing state machine.
//! * [`transcribe`] — the speech-to-text gateway (in-process whisper or a
//!   whisper.cpp server).
//! * [`output`] — clipboard delivery with optional auto-paste.
//! * [`hotkey`] — global key listener.
//! * [`notify`] — user-facing status reporting.
//! * [`config`] — TOML settings.
//! * [`app`] — the floating egui widget.

pub mod app;
pub mod audio;
pub mod config;
pub mod hotkey;
pub mod notify;
pub mod output;
pub mod session;
pub mod transcribe;

pub use session::{SessionEngine, SessionEvent, SessionPhase};
