//! Window functions and an FIR lowpass designer built from them.
//!
//! The complex baseband prefilter (component C3) needs a tight,
//! low-ripple lowpass with a short group delay, which is what the Kaiser
//! window is for: its stopband attenuation is tunable through `beta`
//! independently of tap count.

use std::f32::consts::PI;

/// Zeroth-order modified Bessel function of the first kind, by series
/// summation. Converges quickly for the `beta` values used here (`< 10`).
fn bessel_i0(x: f32) -> f32 {
    let mut term = 1.0f32;
    let mut sum = 1.0f32;
    let half_x = x / 2.0;
    for k in 1..=20 {
        term *= half_x / k as f32;
        let squared = term * term;
        sum += squared;
        if squared < sum * 1e-9 {
            break;
        }
    }
    sum
}

/// Kaiser window of length `n` (`n` samples, indices `0..n`).
pub fn kaiser_window(n: usize, beta: f32) -> Vec<f32> {
    if n == 1 {
        return vec![1.0];
    }
    let denom = bessel_i0(beta);
    let m = (n - 1) as f32;
    (0..n)
        .map(|i| {
            let t = 2.0 * i as f32 / m - 1.0;
            let arg = beta * (1.0 - t * t).max(0.0).sqrt();
            bessel_i0(arg) / denom
        })
        .collect()
}

/// Hann window of length `n + 1`, matching the convention used by
/// [`lowpass_taps`] for an odd-length symmetric filter.
pub fn hann_window(n: usize) -> Vec<f32> {
    (0..=n)
        .map(|i| (PI * i as f32 / n as f32).sin().powi(2))
        .collect()
}

/// Designs a windowed-sinc lowpass filter with `num_taps` coefficients
/// (odd, so the filter has integer group delay), cutoff `cutoff_hz` at
/// sample rate `sample_rate`, windowed by a Kaiser window with the given
/// `beta`.
pub fn lowpass_taps(num_taps: usize, cutoff_hz: f32, sample_rate: f32, beta: f32) -> Vec<f32> {
    assert!(num_taps % 2 == 1, "lowpass_taps needs an odd tap count");

    let window = kaiser_window(num_taps, beta);
    let center = (num_taps - 1) as f32 / 2.0;
    let fc = cutoff_hz / sample_rate;

    let mut taps: Vec<f32> = (0..num_taps)
        .map(|i| {
            let x = i as f32 - center;
            let sinc = if x == 0.0 {
                2.0 * fc
            }
            else {
                (2.0 * PI * fc * x).sin() / (PI * x)
            };
            sinc * window[i]
        })
        .collect();

    let sum: f32 = taps.iter().sum();
    if sum.abs() > 1e-9 {
        for tap in &mut taps {
            *tap /= sum;
        }
    }

    taps
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn kaiser_window_is_symmetric_and_bounded() {
        let w = kaiser_window(31, 8.0);
        assert_eq!(w.len(), 31);
        for i in 0..w.len() {
            assert_abs_diff_eq!(w[i], w[w.len() - 1 - i], epsilon = 1e-5);
            assert!(w[i] >= 0.0 && w[i] <= 1.0 + 1e-6);
        }
        assert_abs_diff_eq!(w[15], 1.0, epsilon = 1e-4);
    }

    #[test]
    fn lowpass_taps_have_unity_dc_gain() {
        let taps = lowpass_taps(65, 400.0, 9600.0, 8.0);
        let dc_gain: f32 = taps.iter().sum();
        assert_abs_diff_eq!(dc_gain, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn lowpass_taps_attenuate_above_cutoff() {
        let taps = lowpass_taps(129, 400.0, 9600.0, 8.0);
        let sample_rate = 9600.0f32;

        let response_at = |freq_hz: f32| -> f32 {
            let mut re = 0.0f32;
            let mut im = 0.0f32;
            for (i, &tap) in taps.iter().enumerate() {
                let phase = -2.0 * PI * freq_hz * i as f32 / sample_rate;
                re += tap * phase.cos();
                im += tap * phase.sin();
            }
            (re * re + im * im).sqrt()
        };

        let passband = response_at(100.0);
        let stopband = response_at(1200.0);
        assert!(stopband < passband * 0.1, "{stopband} vs {passband}");
    }
}
