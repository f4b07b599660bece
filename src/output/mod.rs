//! Output sink — clipboard delivery with optional auto-paste.
//!
//! The session engine calls [`OutputSink::deliver`] exactly once per
//! successfully transcribed session, never for cancelled or failed ones.
//! Delivery is fire-and-forget from the engine's point of view: a failure is
//! reported to the user once and does not reopen the session or retry the
//! transcription.

pub mod clipboard;
pub mod keyboard;

pub use clipboard::{read_text, restore_text, write_text};
pub use keyboard::simulate_paste;

use thiserror::Error;

// ---------------------------------------------------------------------------
// OutputError
// ---------------------------------------------------------------------------

/// Failures while putting text in front of the user.
#[derive(Debug, Error)]
pub enum OutputError {
    /// The OS clipboard could not be opened.
    #[error("cannot access clipboard: {0}")]
    ClipboardAccess(String),

    /// The clipboard was opened but writing failed.
    #[error("cannot write clipboard text: {0}")]
    ClipboardSet(String),

    /// The paste keystroke could not be synthesised.
    #[error("cannot simulate paste keystroke: {0}")]
    KeySimulation(String),
}

// ---------------------------------------------------------------------------
// OutputSink trait
// ---------------------------------------------------------------------------

/// Destination for a completed transcription.
pub trait OutputSink: Send + Sync {
    /// Deliver `text` to the user.
    fn deliver(&self, text: &str) -> Result<(), OutputError>;
}

// ---------------------------------------------------------------------------
// ClipboardSink
// ---------------------------------------------------------------------------

/// Clipboard-based sink, optionally followed by a simulated paste.
///
/// With `auto_paste` and `restore_clipboard` both enabled the sequence is:
/// save old content, write text, wait for the clipboard manager to flush,
/// paste, wait for the target app, restore old content (best-effort).
#[derive(Debug, Clone)]
pub struct ClipboardSink {
    /// Simulate the paste shortcut after the clipboard write.
    pub auto_paste: bool,
    /// Put the previous clipboard content back after pasting.
    pub restore_clipboard: bool,
    /// Delay between clipboard write and paste, in milliseconds.
    pub paste_delay_ms: u64,
    /// Delay between paste and restore, in milliseconds.
    pub restore_delay_ms: u64,
}

impl Default for ClipboardSink {
    fn default() -> Self {
        Self {
            auto_paste: true,
            restore_clipboard: true,
            paste_delay_ms: 50,
            restore_delay_ms: 100,
        }
    }
}

impl ClipboardSink {
    /// Sink configured from the output section of the app config.
    pub fn new(auto_paste: bool, restore_clipboard: bool) -> Self {
        Self {
            auto_paste,
            restore_clipboard,
            ..Self::default()
        }
    }
}

impl OutputSink for ClipboardSink {
    fn deliver(&self, text: &str) -> Result<(), OutputError> {
        if !self.auto_paste {
            // Plain clipboard mode: the text must stay there for the user,
            // so there is nothing to save or restore.
            return write_text(text);
        }

        let saved = if self.restore_clipboard {
            read_text()?
        } else {
            None
        };

        write_text(text)?;
        std::thread::sleep(std::time::Duration::from_millis(self.paste_delay_ms));
        simulate_paste()?;

        if self.restore_clipboard {
            std::thread::sleep(std::time::Duration::from_millis(self.restore_delay_ms));
            // Best-effort; the paste already succeeded.
            if let Err(e) = restore_text(saved) {
                log::debug!("output: clipboard restore failed: {e}");
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
