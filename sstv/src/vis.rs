//! VIS (Vertical Interval Signalling) header (component C6): the
//! mode-identifying preamble that precedes every line of video.
//!
//! Sequence: two 300 ms 1900 Hz leader tones separated by a 10 ms 1200 Hz
//! break, a 30 ms 1200 Hz start bit, seven 30 ms data bits (LSB first,
//! 1100 Hz = 1, 1300 Hz = 0), a 30 ms even-parity bit, and a 30 ms 1200 Hz
//! stop bit.

use crate::{
    filter::goertzel::goertzel_magnitude,
    tone::ToneGenerator,
};

pub const LEADER_TONE_HZ: f32 = 1900.0;
pub const LEADER_TIME_S: f32 = 0.300;
pub const LEADER_BREAK_TIME_S: f32 = 0.010;

pub const VIS_BIT_TIME_S: f32 = 0.030;
pub const VIS_LOW_TONE_HZ: f32 = 1300.0;
pub const VIS_HIGH_TONE_HZ: f32 = 1100.0;

pub const SYNC_TONE_HZ: f32 = 1200.0;

/// Even parity over the 7 data bits: the total number of `1` bits across
/// data + parity is always even.
pub fn parity_bit(vis_code: u8) -> bool {
    (vis_code & 0x7f).count_ones() % 2 != 0
}

/// Appends the full VIS preamble for `vis_code` to `out`.
pub fn emit(tone: &mut ToneGenerator, vis_code: u8, out: &mut Vec<f32>) {
    tone.emit(LEADER_TONE_HZ, LEADER_TIME_S, out);
    tone.emit(SYNC_TONE_HZ, LEADER_BREAK_TIME_S, out);
    tone.emit(LEADER_TONE_HZ, LEADER_TIME_S, out);
    tone.emit(SYNC_TONE_HZ, VIS_BIT_TIME_S, out);

    for bit in 0..7 {
        let set = (vis_code >> bit) & 1 != 0;
        let freq = if set { VIS_HIGH_TONE_HZ } else { VIS_LOW_TONE_HZ };
        tone.emit(freq, VIS_BIT_TIME_S, out);
    }

    let parity = parity_bit(vis_code);
    let freq = if parity { VIS_HIGH_TONE_HZ } else { VIS_LOW_TONE_HZ };
    tone.emit(freq, VIS_BIT_TIME_S, out);

    tone.emit(SYNC_TONE_HZ, VIS_BIT_TIME_S, out);
}

/// Total sample count of a VIS preamble at `sample_rate`, used by the
/// decoder to size its search window.
pub fn preamble_len_samples(sample_rate: f32) -> usize {
    let seconds =
        2.0 * LEADER_TIME_S + LEADER_BREAK_TIME_S + (8.0 + 2.0) * VIS_BIT_TIME_S;
    (seconds * sample_rate) as usize
}

/// Classifies one VIS data/parity bit by majority vote across several
/// Goertzel sub-windows spanning `samples` (nominally one bit period). This
/// is more robust to a short burst of noise than a single whole-window
/// comparison.
fn classify_bit(samples: &[f32], sample_rate: f32) -> bool {
    let sub_window = ((sample_rate * 0.005) as usize).max(8);

    let mut low_votes = 0usize;
    let mut high_votes = 0usize;

    for chunk in samples.chunks(sub_window) {
        if chunk.len() < sub_window / 2 {
            continue;
        }
        let low = goertzel_magnitude(chunk, sample_rate, VIS_LOW_TONE_HZ);
        let high = goertzel_magnitude(chunk, sample_rate, VIS_HIGH_TONE_HZ);
        if high > low {
            high_votes += 1;
        }
        else {
            low_votes += 1;
        }
    }

    high_votes >= low_votes
}

/// Decodes the 7 data bits + parity bit following the VIS start bit.
/// `bits_samples` must contain exactly 8 consecutive bit windows.
/// Returns the VIS code if the parity check passes.
pub fn decode_bits(bit_windows: &[&[f32]], sample_rate: f32) -> Option<u8> {
    assert_eq!(bit_windows.len(), 8);

    let mut vis_code = 0u8;
    for (bit, window) in bit_windows[..7].iter().enumerate() {
        if classify_bit(window, sample_rate) {
            vis_code |= 1 << bit;
        }
    }

    let parity_received = classify_bit(bit_windows[7], sample_rate);
    if parity_received == parity_bit(vis_code) {
        Some(vis_code)
    }
    else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parity_is_even_over_data_plus_parity() {
        for code in 0..=0x7fu8 {
            let total_ones = code.count_ones() + parity_bit(code) as u32;
            assert_eq!(total_ones % 2, 0);
        }
    }

    #[test]
    fn emit_then_decode_round_trips() {
        let sample_rate = 48_000.0;
        for vis_code in [0x08u8, 0x2c, 0x3c] {
            let mut tone = ToneGenerator::new(sample_rate);
            let mut out = Vec::new();

            // skip the leader/break/start, only emit the 8 bit tones for
            // this focused test
            for bit in 0..7 {
                let set = (vis_code >> bit) & 1 != 0;
                let freq = if set { VIS_HIGH_TONE_HZ } else { VIS_LOW_TONE_HZ };
                tone.emit(freq, VIS_BIT_TIME_S, &mut out);
            }
            let parity = parity_bit(vis_code);
            let freq = if parity { VIS_HIGH_TONE_HZ } else { VIS_LOW_TONE_HZ };
            tone.emit(freq, VIS_BIT_TIME_S, &mut out);

            let bit_len = (VIS_BIT_TIME_S * sample_rate) as usize;
            let windows: Vec<&[f32]> = out.chunks(bit_len).collect();
            assert_eq!(windows.len(), 8);

            let decoded = decode_bits(&windows, sample_rate);
            assert_eq!(decoded, Some(vis_code));
        }
    }
}
