//! Sync pulse tracking (component C8).
//!
//! Every line starts with a 1200 Hz pulse. The decoder uses this module
//! twice: once, over a wide window, to find the VIS header's sync pulses
//! when the start of the recording is unknown; then, per line, over a
//! narrow window around the expected offset, to correct for clock drift
//! between the transmitting and receiving sound cards.

use crate::{
    filter::goertzel::goertzel_magnitude,
    vis::SYNC_TONE_HZ,
};

/// Searches `samples[start..]` for the offset of strongest 1200 Hz energy,
/// scanning up to `max_offset` samples forward, evaluated over windows of
/// `pulse_len` samples. Returns `None` if the search range is empty.
pub fn find_sync_pulse(
    samples: &[f32],
    sample_rate: f32,
    start: usize,
    max_offset: usize,
    pulse_len: usize,
) -> Option<usize> {
    if start + pulse_len > samples.len() {
        return None;
    }

    let end = (start + max_offset).min(samples.len().saturating_sub(pulse_len));
    if end < start {
        return None;
    }

    let mut best_offset = start;
    let mut best_mag = f32::MIN;

    for offset in start..=end {
        let window = &samples[offset..offset + pulse_len];
        let mag = goertzel_magnitude(window, sample_rate, SYNC_TONE_HZ);
        if mag > best_mag {
            best_mag = mag;
            best_offset = offset;
        }
    }

    Some(best_offset)
}

/// Confidence that `samples[offset..offset+pulse_len]` is actually a sync
/// pulse, relative to the average tone energy in the window: the ratio of
/// 1200 Hz magnitude to the mean magnitude across the tone band. A ratio
/// near 1 means no pulse stands out at all.
pub fn sync_confidence(samples: &[f32], sample_rate: f32, offset: usize, pulse_len: usize) -> f32 {
    if offset + pulse_len > samples.len() {
        return 0.0;
    }
    let window = &samples[offset..offset + pulse_len];
    let sync_mag = goertzel_magnitude(window, sample_rate, SYNC_TONE_HZ);
    let reference_mag = goertzel_magnitude(window, sample_rate, 1900.0);
    if reference_mag < 1e-6 {
        return 0.0;
    }
    sync_mag / reference_mag
}

#[cfg(test)]
mod tests {
    use std::f32::consts::TAU;

    use super::*;

    fn tone_burst(freq_hz: f32, sample_rate: f32, num_samples: usize) -> Vec<f32> {
        (0..num_samples)
            .map(|i| (TAU * freq_hz * i as f32 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn finds_sync_pulse_at_known_offset() {
        let sample_rate = 48_000.0;
        let mut samples = tone_burst(1900.0, sample_rate, 200);
        samples.extend(tone_burst(1200.0, sample_rate, 100));
        samples.extend(tone_burst(1900.0, sample_rate, 200));

        let found = find_sync_pulse(&samples, sample_rate, 0, 400, 80).unwrap();
        assert!((found as i64 - 200).abs() <= 10, "found {found}");
    }

    #[test]
    fn confidence_is_high_inside_pulse_low_outside() {
        let sample_rate = 48_000.0;
        let mut samples = tone_burst(1900.0, sample_rate, 200);
        samples.extend(tone_burst(1200.0, sample_rate, 100));

        let inside = sync_confidence(&samples, sample_rate, 210, 80);
        let outside = sync_confidence(&samples, sample_rate, 10, 80);
        assert!(inside > outside);
    }
}
