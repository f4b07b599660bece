//! Sample-format conversion for the capture thread.
//!
//! The transcription engines expect **16 kHz mono `f32`** PCM.  Hardware
//! devices rarely deliver that directly, so every raw cpal buffer passes
//! through [`to_mono_16k`] before it becomes an
//! [`AudioFrame`](crate::audio::AudioFrame).

/// Target rate consumed by the transcription engines.
pub const TARGET_RATE: u32 = 16_000;

/// Downmix interleaved multi-channel audio and resample it to 16 kHz.
///
/// Combines [`downmix`] and [`resample`]; when the input is already 16 kHz
/// mono the samples pass through untouched (aside from the copy).
pub fn to_mono_16k(samples: &[f32], sample_rate: u32, channels: u16) -> Vec<f32> {
    let mono = downmix(samples, channels);
    resample(&mono, sample_rate, TARGET_RATE)
}

/// Average interleaved channels down to mono.
///
/// Output length is `samples.len() / channels`.  `channels == 0` yields an
/// empty vector rather than dividing by zero.
pub fn downmix(samples: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.to_vec(),
        n => {
            let n = usize::from(n);
            samples
                .chunks_exact(n)
                .map(|frame| frame.iter().sum::<f32>() / n as f32)
                .collect()
        }
    }
}

/// Linear-interpolation resampler.
///
/// Good enough for speech headed into Whisper; the per-chunk boundaries
/// introduce no audible artifacts at dictation quality.  Returns the input
/// unchanged when `from == to`.
pub fn resample(samples: &[f32], from: u32, to: u32) -> Vec<f32> {
    if from == to || samples.is_empty() || from == 0 {
        return samples.to_vec();
    }

    let ratio = f64::from(to) / f64::from(from);
    let out_len = (samples.len() as f64 * ratio).ceil() as usize;
    let mut out = Vec::with_capacity(out_len);

    for i in 0..out_len {
        let pos = i as f64 / ratio;
        let idx = pos as usize;
        let frac = (pos - idx as f64) as f32;
        let s = match (samples.get(idx), samples.get(idx + 1)) {
            (Some(&a), Some(&b)) => a * (1.0 - frac) + b * frac,
            (Some(&a), None) => a,
            _ => 0.0,
        };
        out.push(s);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downmix_mono_passthrough() {
        let input = vec![0.1_f32, 0.2, 0.3];
        assert_eq!(downmix(&input, 1), input);
    }

    #[test]
    fn downmix_stereo_averages_pairs() {
        let out = downmix(&[1.0_f32, -1.0, 0.5, 0.5], 2);
        assert_eq!(out.len(), 2);
        assert!((out[0]).abs() < 1e-6);
        assert!((out[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn downmix_zero_channels_is_empty() {
        assert!(downmix(&[1.0_f32, 2.0], 0).is_empty());
    }

    #[test]
    fn resample_same_rate_is_noop() {
        let input: Vec<f32> = (0..160).map(|i| i as f32 / 160.0).collect();
        assert_eq!(resample(&input, 16_000, 16_000), input);
    }

    #[test]
    fn resample_48k_down_to_16k_length() {
        // 480 samples at 48 kHz is 10 ms -> 160 samples at 16 kHz
        let out = resample(&vec![0.5_f32; 480], 48_000, 16_000);
        assert_eq!(out.len(), 160);
    }

    #[test]
    fn resample_44100_approximate_length() {
        let out = resample(&vec![0.0_f32; 44_100], 44_100, 16_000);
        assert!(out.len().abs_diff(16_000) <= 1, "got {}", out.len());
    }

    #[test]
    fn resample_preserves_dc_level() {
        let out = resample(&vec![0.5_f32; 480], 48_000, 16_000);
        for &s in &out {
            assert!((s - 0.5).abs() < 1e-5, "amplitude drift: {s}");
        }
    }

    #[test]
    fn to_mono_16k_combines_both_steps() {
        // stereo 48 kHz, 10 ms -> 160 mono samples at 16 kHz
        let stereo = vec![0.4_f32; 960];
        let out = to_mono_16k(&stereo, 48_000, 2);
        assert_eq!(out.len(), 160);
        assert!((out[0] - 0.4).abs() < 1e-5);
    }
}
