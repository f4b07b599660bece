//! Clipboard access backed by `arboard`.
//!
//! A fresh `arboard::Clipboard` handle is opened per call; the handle is not
//! `Send` on every platform and is cheap to create, so nothing is cached.

use arboard::Clipboard;

use super::OutputError;

fn open() -> Result<Clipboard, OutputError> {
    Clipboard::new().map_err(|e| OutputError::ClipboardAccess(e.to_string()))
}

/// Read the current plain-text clipboard content.
///
/// An empty or non-text clipboard (image, files) yields `Ok(None)`; only a
/// failure to open the clipboard itself is an error.
pub fn read_text() -> Result<Option<String>, OutputError> {
    Ok(open()?.get_text().ok())
}

/// Replace the clipboard content with `text`.
pub fn write_text(text: &str) -> Result<(), OutputError> {
    open()?
        .set_text(text)
        .map_err(|e| OutputError::ClipboardSet(e.to_string()))
}

/// Put a previously captured value back.  `None` (nothing was saved) is a
/// no-op.
pub fn restore_text(saved: Option<String>) -> Result<(), OutputError> {
    match saved {
        Some(text) => write_text(&text),
        None => Ok(()),
    }
}
