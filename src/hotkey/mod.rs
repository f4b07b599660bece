//! Global hotkey signal source, backed by `rdev`.
//!
//! The pipeline consumes hotkeys as two discrete logical signals —
//! [`HotkeyEvent::ToggleRecording`] and [`HotkeyEvent::Cancel`] — delivered
//! over a channel.  The session engine never touches the OS keyboard state
//! itself, so it can be tested by sending events on the channel directly.

pub mod listener;

pub use listener::HotkeyListener;

/// Logical hotkey signals consumed by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyEvent {
    /// Start recording when idle, stop-and-transcribe when recording.
    ToggleRecording,
    /// Discard the current recording or in-flight transcription.
    Cancel,
}

// ---------------------------------------------------------------------------
// parse_key
// ---------------------------------------------------------------------------

/// Map a key name from the config file to an [`rdev::Key`].
///
/// Accepts `F1`–`F12`, single ASCII letters (case-insensitive) and a handful
/// of named keys.  Unknown names yield `None` so callers can fall back to a
/// default binding.
///
/// ```
/// use voiceclip::hotkey::parse_key;
///
/// assert_eq!(parse_key("F9"), Some(rdev::Key::F9));
/// assert_eq!(parse_key("Esc"), Some(rdev::Key::Escape));
/// assert_eq!(parse_key("r"), Some(rdev::Key::KeyR));
/// assert_eq!(parse_key("Hyper"), None);
/// ```
pub fn parse_key(name: &str) -> Option<rdev::Key> {
    use rdev::Key;

    if let Some(digits) = name.strip_prefix(['F', 'f']) {
        if let Ok(n) = digits.parse::<u8>() {
            return function_key(n);
        }
    }

    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_alphabetic() {
            return letter_key(c.to_ascii_lowercase());
        }
    }

    match name.to_ascii_lowercase().as_str() {
        "escape" | "esc" => Some(Key::Escape),
        "space" => Some(Key::Space),
        "return" | "enter" => Some(Key::Return),
        "tab" => Some(Key::Tab),
        "backspace" => Some(Key::Backspace),
        "delete" | "del" => Some(Key::Delete),
        "home" => Some(Key::Home),
        "end" => Some(Key::End),
        "pageup" => Some(Key::PageUp),
        "pagedown" => Some(Key::PageDown),
        "capslock" => Some(Key::CapsLock),
        "pause" => Some(Key::Pause),
        _ => None,
    }
}

fn function_key(n: u8) -> Option<rdev::Key> {
    use rdev::Key;
    Some(match n {
        1 => Key::F1,
        2 => Key::F2,
        3 => Key::F3,
        4 => Key::F4,
        5 => Key::F5,
        6 => Key::F6,
        7 => Key::F7,
        8 => Key::F8,
        9 => Key::F9,
        10 => Key::F10,
        11 => Key::F11,
        12 => Key::F12,
        _ => return None,
    })
}

fn letter_key(c: char) -> Option<rdev::Key> {
    use rdev::Key;
    Some(match c {
        'a' => Key::KeyA,
        'b' => Key::KeyB,
        'c' => Key::KeyC,
        'd' => Key::KeyD,
        'e' => Key::KeyE,
        'f' => Key::KeyF,
        'g' => Key::KeyG,
        'h' => Key::KeyH,
        'i' => Key::KeyI,
        'j' => Key::KeyJ,
        'k' => Key::KeyK,
        'l' => Key::KeyL,
        'm' => Key::KeyM,
        'n' => Key::KeyN,
        'o' => Key::KeyO,
        'p' => Key::KeyP,
        'q' => Key::KeyQ,
        'r' => Key::KeyR,
        's' => Key::KeyS,
        't' => Key::KeyT,
        'u' => Key::KeyU,
        'v' => Key::KeyV,
        'w' => Key::KeyW,
        'x' => Key::KeyX,
        'y' => Key::KeyY,
        'z' => Key::KeyZ,
        _ => return None,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_keys_parse_across_the_range() {
        assert_eq!(parse_key("F1"), Some(rdev::Key::F1));
        assert_eq!(parse_key("F9"), Some(rdev::Key::F9));
        assert_eq!(parse_key("F12"), Some(rdev::Key::F12));
        assert_eq!(parse_key("F13"), None);
        assert_eq!(parse_key("F0"), None);
    }

    #[test]
    fn letters_parse_case_insensitively() {
        assert_eq!(parse_key("r"), Some(rdev::Key::KeyR));
        assert_eq!(parse_key("R"), Some(rdev::Key::KeyR));
        assert_eq!(parse_key("z"), Some(rdev::Key::KeyZ));
    }

    #[test]
    fn lone_f_is_the_letter_not_a_function_key() {
        assert_eq!(parse_key("f"), Some(rdev::Key::KeyF));
        assert_eq!(parse_key("F"), Some(rdev::Key::KeyF));
    }

    #[test]
    fn named_keys_and_aliases() {
        assert_eq!(parse_key("Escape"), Some(rdev::Key::Escape));
        assert_eq!(parse_key("esc"), Some(rdev::Key::Escape));
        assert_eq!(parse_key("Enter"), Some(rdev::Key::Return));
        assert_eq!(parse_key("Space"), Some(rdev::Key::Space));
    }

    #[test]
    fn unknown_names_yield_none() {
        assert_eq!(parse_key(""), None);
        assert_eq!(parse_key("alt+shift+r"), None);
        assert_eq!(parse_key("Hyper"), None);
    }
}
