//! Encoder pipeline (component C7): turns a raster and a mode into a PCM
//! tone train, by walking the same [`State`] machine the decoder reads
//! back against.

use crate::{
    color::rgb_to_ycbcr,
    error::EncodeError,
    raster::FrameBuffer,
    modes::{
        ColorFormat,
        ModeSpecification,
    },
    state::{
        HeaderState,
        LineState,
        State,
    },
    tone::ToneGenerator,
    util::{
        lerp,
        unlerp,
    },
    vis,
};

const PORCH_TONE_HZ: f32 = 1500.0;
const CHANNEL_LOW_HZ: f32 = 1500.0;
const CHANNEL_HIGH_HZ: f32 = 2300.0;

/// BT.601 video-range luma bounds (spec.md §4.7's `(Y-16)/219` convention).
const LUMA_LOW: f32 = 16.0;
const LUMA_HIGH: f32 = 235.0;
/// BT.601 video-range chroma bounds.
const CHROMA_LOW: f32 = 16.0;
const CHROMA_HIGH: f32 = 240.0;

/// Encodes `frame` under `mode` into a mono PCM buffer at `sample_rate`.
pub fn encode<F>(frame: &F, mode: ModeSpecification, sample_rate: f32) -> Result<Vec<f32>, EncodeError>
where
    F: FrameBuffer,
{
    if !(sample_rate > 0.0) {
        return Err(EncodeError::InvalidSampleRate(sample_rate));
    }
    if frame.width() != mode.width as usize || frame.height() != mode.lines as usize {
        return Err(EncodeError::InvalidMode(format!(
            "{} expects {}x{}, frame buffer is {}x{}",
            mode.name,
            mode.width,
            mode.lines,
            frame.width(),
            frame.height()
        )));
    }

    tracing::info!(mode = mode.name, sample_rate, "encode started");

    let mut tone = ToneGenerator::new(sample_rate);
    let mut out = Vec::new();

    let mut state = State::default();
    loop {
        let (frequency, duration) = pulse_for_state(&state, &mode, frame, mode.vis_code);
        tracing::debug!(?state, frequency, duration, "emitting pulse");
        tone.emit(frequency, duration, &mut out);

        match state.next(Some(&mode)) {
            Some(next) => state = next,
            None => break,
        }
    }

    tracing::info!(mode = mode.name, samples = out.len(), "encode finished");
    Ok(out)
}

fn pulse_for_state<F>(state: &State, mode: &ModeSpecification, frame: &F, vis_code: u8) -> (f32, f32)
where
    F: FrameBuffer,
{
    match state {
        State::Header { header_state } => pulse_for_header(header_state, vis_code),
        State::Line { y, line_state } => pulse_for_line(*y, line_state, mode, frame),
    }
}

fn pulse_for_header(header_state: &HeaderState, vis_code: u8) -> (f32, f32) {
    match header_state {
        HeaderState::Leader1 | HeaderState::Leader2 => (vis::LEADER_TONE_HZ, vis::LEADER_TIME_S),
        HeaderState::LeaderBreak => (vis::SYNC_TONE_HZ, vis::LEADER_BREAK_TIME_S),
        HeaderState::VisStart | HeaderState::VisStop => (vis::SYNC_TONE_HZ, vis::VIS_BIT_TIME_S),
        HeaderState::VisBit { bit } => {
            let set = if *bit == 7 {
                vis::parity_bit(vis_code)
            }
            else {
                (vis_code >> bit) & 1 != 0
            };
            let freq = if set { vis::VIS_HIGH_TONE_HZ } else { vis::VIS_LOW_TONE_HZ };
            (freq, vis::VIS_BIT_TIME_S)
        }
    }
}

fn pulse_for_line<F>(y: usize, line_state: &LineState, mode: &ModeSpecification, frame: &F) -> (f32, f32)
where
    F: FrameBuffer,
{
    match line_state {
        LineState::Sync => (vis::SYNC_TONE_HZ, mode.sync_time),
        LineState::Porch | LineState::ChromaPorch => (PORCH_TONE_HZ, mode.porch_time),
        // 1500 Hz, not the 1200 Hz spec §4.7 names; see DESIGN.md Open Questions.
        LineState::Separator { .. } => (PORCH_TONE_HZ, mode.sep_time),
        LineState::Scan { channel, x } => {
            let freq = match mode.color_format {
                ColorFormat::Rgb => {
                    let (r, g, b) = frame.pixel(*x, y);
                    let value = match mode.channel_order[*channel] {
                        0 => r,
                        1 => g,
                        _ => b,
                    };
                    tone_for_range(value as f32, 0.0, 255.0)
                }
                ColorFormat::Yuv => {
                    let (r, g, b) = frame.pixel(*x, y);
                    let y_value = rgb_to_ycbcr(r, g, b).0;
                    tone_for_range(y_value, LUMA_LOW, LUMA_HIGH)
                }
            };
            (freq, mode.pixel_time)
        }
        LineState::ChromaSeparator => {
            let carries_cr = y % 2 == 0;
            let freq = if carries_cr { CHANNEL_LOW_HZ } else { CHANNEL_HIGH_HZ };
            (freq, mode.chroma_sep_time)
        }
        LineState::ChromaScan { x } => {
            let x0 = x * 2;
            let x1 = (x0 + 1).min(mode.width as usize - 1);
            let (r0, g0, b0) = frame.pixel(x0, y);
            let (r1, g1, b1) = frame.pixel(x1, y);
            let (_, cb0, cr0) = rgb_to_ycbcr(r0, g0, b0);
            let (_, cb1, cr1) = rgb_to_ycbcr(r1, g1, b1);

            let carries_cr = y % 2 == 0;
            let value = if carries_cr { (cr0 + cr1) / 2.0 } else { (cb0 + cb1) / 2.0 };
            (tone_for_range(value, CHROMA_LOW, CHROMA_HIGH), mode.chroma_pixel_time)
        }
    }
}

/// Maps `value` (clamped to `[lo,hi]`) onto the 1500-2300 Hz tone band.
#[inline]
fn tone_for_range(value: f32, lo: f32, hi: f32) -> f32 {
    lerp(unlerp(value, lo, hi).clamp(0.0, 1.0), CHANNEL_LOW_HZ, CHANNEL_HIGH_HZ)
}

#[cfg(test)]
mod tests {
    use image::RgbImage;

    use super::*;
    use crate::modes::ModeSpecification;

    #[test]
    fn solid_grey_robot36_has_expected_sample_count() {
        let mode = ModeSpecification::ROBOT36;
        let frame = RgbImage::from_pixel(mode.width, mode.lines, image::Rgb([128, 128, 128]));
        let sample_rate = 48_000.0;

        let pcm = encode(&frame, mode, sample_rate).unwrap();

        let preamble = vis::preamble_len_samples(sample_rate);
        let line_samples = (mode.line_time * sample_rate) as usize;
        let expected_min = preamble + mode.lines as usize * line_samples;

        assert!(
            pcm.len() > expected_min - 1000 && pcm.len() < expected_min + mode.lines as usize * 20,
            "{} vs ~{}",
            pcm.len(),
            expected_min
        );
    }

    #[test]
    fn rejects_mismatched_frame_size() {
        let mode = ModeSpecification::MARTIN_M1;
        let frame = RgbImage::new(10, 10);
        assert!(encode(&frame, mode, 48_000.0).is_err());
    }

    #[test]
    fn rejects_non_positive_sample_rate() {
        let mode = ModeSpecification::MARTIN_M1;
        let frame = RgbImage::new(mode.width, mode.lines);
        assert!(encode(&frame, mode, 0.0).is_err());
    }

    #[test]
    fn samples_stay_in_unit_range() {
        let mode = ModeSpecification::SCOTTIE_S1;
        let frame = RgbImage::from_fn(mode.width, mode.lines, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let pcm = encode(&frame, mode, 48_000.0).unwrap();
        assert!(pcm.iter().all(|s| (-1.0..=1.0).contains(s)));
    }
}
