//! Tone generator (component C1).
//!
//! The only legal source of encoder samples: every tone emitted through a
//! single [`ToneGenerator`] shares one continuous phase accumulator, so
//! consecutive tones never click at the boundary.

use std::f32::consts::TAU;

#[derive(Clone, Copy, Debug)]
pub struct ToneGenerator {
    sample_rate: f32,
    phase: f32,
}

impl ToneGenerator {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            phase: 0.0,
        }
    }

    #[inline]
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Appends `⌊duration_s * sample_rate⌋` samples of `sin(phase)` at
    /// `freq_hz` to `out`, advancing the shared phase accumulator.
    pub fn emit(&mut self, freq_hz: f32, duration_s: f32, out: &mut Vec<f32>) {
        let num_samples = (duration_s * self.sample_rate) as usize;
        let step = TAU * freq_hz / self.sample_rate;

        out.reserve(num_samples);
        for _ in 0..num_samples {
            out.push(self.phase.sin());
            self.phase += step;
            if self.phase >= TAU {
                self.phase -= TAU;
            }
            else if self.phase < 0.0 {
                self.phase += TAU;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_zero_crossings(samples: &[f32]) -> usize {
        samples
            .windows(2)
            .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
            .count()
    }

    #[test]
    fn emits_expected_sample_count() {
        let mut tone = ToneGenerator::new(48_000.0);
        let mut out = Vec::new();
        tone.emit(1500.0, 0.3, &mut out);
        assert_eq!(out.len(), (0.3 * 48_000.0) as usize);
    }

    #[test]
    fn zero_crossings_match_frequency() {
        let mut tone = ToneGenerator::new(48_000.0);
        let mut out = Vec::new();
        let freq = 1500.0;
        let duration = 0.2;
        tone.emit(freq, duration, &mut out);

        let expected = (2.0 * freq * duration).floor() as i64;
        let actual = count_zero_crossings(&out) as i64;
        assert!(
            (actual - expected).abs() <= 2,
            "expected {expected} zero crossings, got {actual}"
        );
    }

    #[test]
    fn phase_is_continuous_across_calls() {
        let mut tone = ToneGenerator::new(48_000.0);
        let mut out = Vec::new();
        tone.emit(1500.0, 0.01, &mut out);
        tone.emit(2300.0, 0.01, &mut out);

        let max_step = out.windows(2).map(|w| (w[1] - w[0]).abs()).fold(0.0, f32::max);
        // |sin(phase_n) - sin(phase_{n-1})| is bounded by the instantaneous
        // frequency; at f_max = 2300 Hz this is the worst case.
        let bound = 2.0 * (std::f32::consts::PI * 2300.0 / 48_000.0).sin();
        assert!(max_step <= bound + 1e-4, "{max_step} > {bound}");
    }

    #[test]
    fn samples_stay_in_unit_range() {
        let mut tone = ToneGenerator::new(48_000.0);
        let mut out = Vec::new();
        tone.emit(2300.0, 1.0, &mut out);
        assert!(out.iter().all(|s| (-1.0..=1.0).contains(s)));
    }
}
