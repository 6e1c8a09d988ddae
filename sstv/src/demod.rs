//! FM front end (component C3): complex baseband mixer, Kaiser-windowed
//! lowpass prefilter, and phase-difference demodulator.
//!
//! This is an alternative to the Goertzel sweep in [`crate::filter::goertzel`]
//! for recovering instantaneous tone frequency; [`crate::config::Config`]
//! selects between them. The Goertzel path is the default because it needs
//! no prefilter design and tolerates short, non-stationary dwell windows
//! better; the FM path is here for signals where a continuous frequency
//! track is preferable to per-symbol bin search.

use std::f32::consts::TAU;

use num_complex::Complex32;

use crate::{
    filter::{
        FirFilter,
        kaiser::lowpass_taps,
    },
    util::wrap_phase,
};

/// Nominal center of the 800 Hz SSTV tone band (1100-2300 Hz, centered on
/// the 1900 Hz leader tone).
pub const CARRIER_HZ: f32 = 1900.0;
/// Total bandwidth occupied by every tone the codec emits or expects.
pub const BANDWIDTH_HZ: f32 = 800.0;

const PREFILTER_DURATION_S: f32 = 2e-3;
const PREFILTER_CUTOFF_HZ: f32 = 400.0;
const PREFILTER_BETA: f32 = 8.0;

/// Converts a real PCM sample stream into an instantaneous-frequency signal
/// scaled to `[-1, 1]` over the tone band, one sample at a time.
pub struct FmDemodulator {
    sample_rate: f32,
    mixer_phase: f32,
    lowpass: FirFilter<Complex32>,
    prev_phase: f32,
    scale: f32,
}

impl FmDemodulator {
    pub fn new(sample_rate: f32) -> Self {
        let mut num_taps = (PREFILTER_DURATION_S * sample_rate).round() as usize;
        num_taps |= 1;
        num_taps = num_taps.max(3);

        let taps = lowpass_taps(num_taps, PREFILTER_CUTOFF_HZ, sample_rate, PREFILTER_BETA);

        Self {
            sample_rate,
            mixer_phase: 0.0,
            lowpass: FirFilter::new(taps),
            prev_phase: 0.0,
            scale: sample_rate / (std::f32::consts::PI * BANDWIDTH_HZ),
        }
    }

    /// Demodulates a single real sample, returning the instantaneous
    /// frequency relative to [`CARRIER_HZ`], scaled so `±BANDWIDTH_HZ/2`
    /// maps to `±1`.
    pub fn demod(&mut self, sample: f32) -> f32 {
        let local_oscillator = Complex32::from_polar(1.0, -self.mixer_phase);
        let mixed = Complex32::new(sample, 0.0) * local_oscillator;

        self.mixer_phase += TAU * CARRIER_HZ / self.sample_rate;
        if self.mixer_phase >= TAU {
            self.mixer_phase -= TAU;
        }

        let filtered = self.lowpass.scan(mixed);
        let phase = filtered.arg();
        let diff = wrap_phase(phase - self.prev_phase);
        self.prev_phase = phase;

        (diff * self.scale).clamp(-1.0, 1.0)
    }

    pub fn demod_block(&mut self, samples: &[f32]) -> Vec<f32> {
        samples.iter().map(|&s| self.demod(s)).collect()
    }
}

/// Estimates the dominant tone frequency in `samples` via the FM
/// phase-difference front end, for callers that prefer it over
/// [`crate::filter::goertzel::estimate_frequency`]. Drops the filter's
/// group-delay transient from the front of the window before averaging.
pub fn estimate_frequency(samples: &[f32], sample_rate: f32) -> f32 {
    let mut demod = FmDemodulator::new(sample_rate);
    let out = demod.demod_block(samples);

    let skip = (out.len() / 4).min(out.len().saturating_sub(1));
    let settled = &out[skip..];
    let mean = if settled.is_empty() {
        0.0
    }
    else {
        settled.iter().sum::<f32>() / settled.len() as f32
    };

    CARRIER_HZ + mean * BANDWIDTH_HZ / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pure_tone(freq_hz: f32, sample_rate: f32, num_samples: usize) -> Vec<f32> {
        (0..num_samples)
            .map(|i| (TAU * freq_hz * i as f32 / sample_rate).sin())
            .collect()
    }

    fn mean(samples: &[f32]) -> f32 {
        samples.iter().sum::<f32>() / samples.len() as f32
    }

    #[test]
    fn tone_above_carrier_demodulates_positive() {
        let sample_rate = 48_000.0;
        let samples = pure_tone(2300.0, sample_rate, 400);
        let mut demod = FmDemodulator::new(sample_rate);
        let out = demod.demod_block(&samples);
        assert!(mean(&out[200..]) > 0.1, "{}", mean(&out[200..]));
    }

    #[test]
    fn tone_below_carrier_demodulates_negative() {
        let sample_rate = 48_000.0;
        let samples = pure_tone(1500.0, sample_rate, 400);
        let mut demod = FmDemodulator::new(sample_rate);
        let out = demod.demod_block(&samples);
        assert!(mean(&out[200..]) < -0.1, "{}", mean(&out[200..]));
    }

    #[test]
    fn output_stays_within_unit_range() {
        let sample_rate = 48_000.0;
        let samples = pure_tone(2300.0, sample_rate, 400);
        let mut demod = FmDemodulator::new(sample_rate);
        let out = demod.demod_block(&samples);
        assert!(out.iter().all(|s| (-1.0..=1.0).contains(s)));
    }
}
