//! Goertzel frequency estimator (component C2).
//!
//! A single-bin DFT evaluated recursively, so a frequency estimate costs
//! `O(n)` per candidate frequency rather than `O(n log n)` for a full FFT —
//! the right tradeoff here since only a handful of tones (sync/porch/
//! separator/channel) are ever candidates at once.

use std::f32::consts::PI;

/// Coarse sweep bounds and step, covering every tone used by the supported
/// modes (1100 Hz VIS high bit through 2300 Hz channel max).
const COARSE_LO_HZ: f32 = 1100.0;
const COARSE_HI_HZ: f32 = 2500.0;
const COARSE_STEP_HZ: f32 = 25.0;
const FINE_SPAN_HZ: f32 = 30.0;
const FINE_STEP_HZ: f32 = 1.0;

/// Magnitude of the Goertzel filter response at `frequency_hz`, evaluated
/// over `samples`. `frequency_hz` need not fall on an integer DFT bin.
pub fn goertzel_magnitude(samples: &[f32], sample_rate: f32, frequency_hz: f32) -> f32 {
    let n = samples.len() as f32;
    let k = n * frequency_hz / sample_rate;
    let omega = 2.0 * PI * k / n;
    let coeff = 2.0 * omega.cos();

    let mut s_prev = 0.0f32;
    let mut s_prev2 = 0.0f32;
    for &sample in samples {
        let s = sample + coeff * s_prev - s_prev2;
        s_prev2 = s_prev;
        s_prev = s;
    }

    let real = s_prev - s_prev2 * omega.cos();
    let imag = s_prev2 * omega.sin();
    (real * real + imag * imag).sqrt()
}

/// Estimates the dominant tone frequency in `samples` by a two-pass sweep:
/// a coarse pass at 25 Hz steps over `[1100,2500]` Hz, then a fine pass at
/// 1 Hz steps within `±30` Hz of the coarse winner.
pub fn estimate_frequency(samples: &[f32], sample_rate: f32) -> f32 {
    let mut coarse_freq = COARSE_LO_HZ;
    let mut coarse_mag = f32::MIN;

    let mut f = COARSE_LO_HZ;
    while f <= COARSE_HI_HZ {
        let mag = goertzel_magnitude(samples, sample_rate, f);
        if mag > coarse_mag {
            coarse_mag = mag;
            coarse_freq = f;
        }
        f += COARSE_STEP_HZ;
    }

    let lo = (coarse_freq - FINE_SPAN_HZ).max(0.0);
    let hi = coarse_freq + FINE_SPAN_HZ;

    let mut fine_freq = coarse_freq;
    let mut fine_mag = f32::MIN;

    let mut f = lo;
    while f <= hi {
        let mag = goertzel_magnitude(samples, sample_rate, f);
        if mag > fine_mag {
            fine_mag = mag;
            fine_freq = f;
        }
        f += FINE_STEP_HZ;
    }

    fine_freq
}

#[cfg(test)]
mod tests {
    use std::f32::consts::TAU;

    use super::*;

    fn pure_tone(freq_hz: f32, sample_rate: f32, num_samples: usize) -> Vec<f32> {
        (0..num_samples)
            .map(|i| (TAU * freq_hz * i as f32 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn estimates_pure_tone_within_one_hz() {
        let sample_rate = 48_000.0;
        for freq in [1200.0, 1500.0, 1900.0, 2300.0] {
            let samples = pure_tone(freq, sample_rate, 200);
            let estimate = estimate_frequency(&samples, sample_rate);
            assert!((estimate - freq).abs() <= 1.0, "{estimate} vs {freq}");
        }
    }

    #[test]
    fn magnitude_peaks_at_true_frequency() {
        let sample_rate = 48_000.0;
        let samples = pure_tone(1900.0, sample_rate, 200);
        let at_peak = goertzel_magnitude(&samples, sample_rate, 1900.0);
        let off_peak = goertzel_magnitude(&samples, sample_rate, 1500.0);
        assert!(at_peak > off_peak * 5.0);
    }
}
