//! OS-global key listener on a dedicated thread.
//!
//! `rdev::listen` blocks its thread forever, so the listener runs on its own
//! `hotkey-listener` thread and forwards recognised presses over a tokio
//! channel.  OS auto-repeat is suppressed with a per-key "already down" flag:
//! holding the toggle key yields exactly one `ToggleRecording`, not a burst.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rdev::EventType;
use tokio::sync::mpsc;

use super::HotkeyEvent;

/// Handle to the running listener thread.
///
/// The underlying `rdev::listen` call cannot be interrupted portably; calling
/// [`stop`](Self::stop) makes the callback ignore everything, which is enough
/// for shutdown since the process exits right after.
pub struct HotkeyListener {
    stop: Arc<AtomicBool>,
}

impl HotkeyListener {
    /// Spawn the listener thread watching `toggle_key` and `cancel_key`.
    ///
    /// Recognised presses are forwarded to `tx`; a full or closed channel
    /// drops the event with a warning rather than blocking the OS hook.
    ///
    /// # Panics
    ///
    /// Panics if the OS refuses to create the thread.
    pub fn start(
        toggle_key: rdev::Key,
        cancel_key: rdev::Key,
        tx: mpsc::Sender<HotkeyEvent>,
    ) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        std::thread::Builder::new()
            .name("hotkey-listener".into())
            .spawn(move || {
                let mut toggle_down = false;
                let mut cancel_down = false;

                let result = rdev::listen(move |event| {
                    if stop_flag.load(Ordering::Relaxed) {
                        return;
                    }
                    match event.event_type {
                        EventType::KeyPress(key) => {
                            let signal = if key == toggle_key && !toggle_down {
                                toggle_down = true;
                                Some(HotkeyEvent::ToggleRecording)
                            } else if key == cancel_key && !cancel_down {
                                cancel_down = true;
                                Some(HotkeyEvent::Cancel)
                            } else {
                                None
                            };
                            if let Some(signal) = signal {
                                if tx.try_send(signal).is_err() {
                                    log::warn!("hotkey: dropped {signal:?}, channel full or closed");
                                }
                            }
                        }
                        EventType::KeyRelease(key) => {
                            if key == toggle_key {
                                toggle_down = false;
                            }
                            if key == cancel_key {
                                cancel_down = false;
                            }
                        }
                        _ => {}
                    }
                });

                if let Err(e) = result {
                    // Typically missing input-monitoring permission on macOS
                    // or no X11/uinput access on Linux.
                    log::error!("hotkey: global listener failed: {e:?}");
                }
            })
            .expect("failed to spawn hotkey-listener thread");

        Self { stop }
    }

    /// Make the listener ignore all further events.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

impl Drop for HotkeyListener {
    fn drop(&mut self) {
        self.stop();
    }
}
