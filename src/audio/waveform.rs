//! Rolling amplitude window behind the live waveform display.
//!
//! Each captured frame contributes one RMS amplitude; the window keeps the
//! most recent `capacity` of them and evicts the oldest as new ones arrive.
//! The UI calls [`WaveformWindow::snapshot`] on its own repaint schedule,
//! which may be faster or slower than the audio cadence — a snapshot is an
//! owned copy, so the renderer never observes a half-updated window.
//!
//! The window's lifetime is independent of any recording session: it exists
//! for as long as the widget does and is merely cleared between sessions.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Amplitude divisor that maps typical speech RMS (~0.05–0.3) onto the full
/// bar height.  Matches the sensitivity of the original display.
const SENSITIVITY: f32 = 0.3;

/// Fixed-capacity rolling window of display amplitudes in `[0.0, 1.0]`.
#[derive(Debug)]
pub struct WaveformWindow {
    bars: VecDeque<f32>,
    capacity: usize,
}

impl WaveformWindow {
    /// Create a window holding at most `capacity` amplitudes.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "waveform window capacity must be > 0");
        Self {
            bars: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Fold one audio frame into the window as a single RMS amplitude.
    ///
    /// O(1) amortized: at most one eviction per push.  Empty frames push a
    /// zero bar so the display keeps scrolling during silence gaps.
    pub fn push_frame(&mut self, samples: &[f32]) {
        self.push_amplitude(rms(samples));
    }

    /// Push a pre-computed raw RMS amplitude (scaled and clamped here).
    pub fn push_amplitude(&mut self, amplitude: f32) {
        if self.bars.len() == self.capacity {
            self.bars.pop_front();
        }
        self.bars.push_back((amplitude / SENSITIVITY).clamp(0.0, 1.0));
    }

    /// Owned copy of the current window, oldest first.
    pub fn snapshot(&self) -> Vec<f32> {
        self.bars.iter().copied().collect()
    }

    /// Discard all amplitudes (session start / cancel).
    pub fn clear(&mut self) {
        self.bars.clear();
    }

    /// Number of amplitudes currently held.
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// True when no amplitudes are held.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Maximum number of amplitudes the window can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Thread-safe handle shared between the session engine (producer) and the
/// egui widget (consumer).
pub type SharedWaveform = Arc<Mutex<WaveformWindow>>;

/// Construct a [`SharedWaveform`] with the given capacity.
pub fn shared_waveform(capacity: usize) -> SharedWaveform {
    Arc::new(Mutex::new(WaveformWindow::new(capacity)))
}

/// Root-mean-square of a sample slice; 0.0 for an empty slice.
fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let mean_sq = samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32;
    mean_sq.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_preserves_push_order() {
        let mut w = WaveformWindow::new(8);
        w.push_amplitude(0.03);
        w.push_amplitude(0.06);
        w.push_amplitude(0.09);
        let snap = w.snapshot();
        assert_eq!(snap.len(), 3);
        assert!(snap[0] < snap[1] && snap[1] < snap[2]);
    }

    #[test]
    fn window_never_exceeds_capacity() {
        let mut w = WaveformWindow::new(16);
        // far more pushes than the capacity — arbitrarily long session
        for i in 0..10_000 {
            w.push_amplitude(i as f32 * 1e-5);
            assert!(w.len() <= 16);
        }
        assert_eq!(w.len(), 16);
        assert_eq!(w.snapshot().len(), 16);
    }

    #[test]
    fn oldest_amplitude_is_evicted_first() {
        let mut w = WaveformWindow::new(2);
        w.push_amplitude(0.3); // scaled to 1.0
        w.push_amplitude(0.0);
        w.push_amplitude(0.0);
        let snap = w.snapshot();
        // the 1.0 bar was the oldest and must be gone
        assert_eq!(snap, vec![0.0, 0.0]);
    }

    #[test]
    fn amplitudes_clamped_to_unit_range() {
        let mut w = WaveformWindow::new(4);
        w.push_amplitude(5.0);
        assert_eq!(w.snapshot(), vec![1.0]);
    }

    #[test]
    fn push_frame_uses_rms() {
        let mut w = WaveformWindow::new(4);
        w.push_frame(&vec![0.3_f32; 320]); // RMS 0.3 -> scaled 1.0
        w.push_frame(&[]); // silence gap
        let snap = w.snapshot();
        assert!((snap[0] - 1.0).abs() < 1e-5);
        assert_eq!(snap[1], 0.0);
    }

    #[test]
    fn clear_empties_the_window() {
        let mut w = WaveformWindow::new(4);
        w.push_amplitude(0.1);
        w.push_amplitude(0.2);
        w.clear();
        assert!(w.is_empty());
        assert!(w.snapshot().is_empty());
        // usable again afterwards
        w.push_amplitude(0.1);
        assert_eq!(w.len(), 1);
    }

    #[test]
    fn rms_of_silence_is_zero() {
        assert_eq!(rms(&[0.0; 160]), 0.0);
        assert_eq!(rms(&[]), 0.0);
    }

    #[test]
    #[should_panic(expected = "capacity must be > 0")]
    fn zero_capacity_panics() {
        let _ = WaveformWindow::new(0);
    }

    #[test]
    fn shared_waveform_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SharedWaveform>();
    }
}
