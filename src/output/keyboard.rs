//! Paste-keystroke simulation backed by `enigo`.

use enigo::{Direction, Enigo, Key, Keyboard, Settings};

use super::OutputError;

/// Send the platform paste shortcut (⌘V on macOS, Ctrl+V elsewhere) to the
/// focused window.
///
/// A new `Enigo` handle is created per call; it is not `Send` and costs
/// little to construct.
pub fn simulate_paste() -> Result<(), OutputError> {
    let mut enigo =
        Enigo::new(&Settings::default()).map_err(|e| OutputError::KeySimulation(e.to_string()))?;

    let modifier = if cfg!(target_os = "macos") {
        Key::Meta
    } else {
        Key::Control
    };

    chord(&mut enigo, modifier, 'v')
}

/// Press `modifier`, click the `key` character, release `modifier`.
fn chord(enigo: &mut Enigo, modifier: Key, key: char) -> Result<(), OutputError> {
    let map = |e: enigo::InputError| OutputError::KeySimulation(e.to_string());

    enigo.key(modifier, Direction::Press).map_err(map)?;
    let result = enigo.key(Key::Unicode(key), Direction::Click).map_err(map);
    // Release the modifier even when the click failed, or the user's
    // keyboard is left with a stuck Ctrl/⌘.
    let released = enigo.key(modifier, Direction::Release).map_err(map);
    result.and(released)
}
