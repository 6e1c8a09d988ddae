//! Decoder pipeline (component C9): recovers a raster from a PCM buffer by
//! locating the VIS header, resolving the mode, then walking each line's
//! sync/porch/scan segments with drift correction from [`crate::sync`].

use image::RgbaImage;

use crate::{
    color::{
        clamp_u8,
        ycbcr_to_rgb,
    },
    config::Config,
    demod,
    error::{
        DecodeError,
        Decoded,
        Warning,
    },
    filter::goertzel::{
        self,
        goertzel_magnitude,
    },
    modes::{
        ColorFormat,
        ModeSpecification,
        SelectMode,
    },
    raster::{
        ChromaRow,
        FrameBufferMut,
    },
    sync,
    util::unlerp,
    vis,
};

const CHANNEL_LOW_HZ: f32 = 1500.0;
const CHANNEL_HIGH_HZ: f32 = 2300.0;

/// BT.601 video-range luma bounds, matching [`crate::encoder`]'s tone mapping.
const LUMA_LOW: f32 = 16.0;
const LUMA_HIGH: f32 = 235.0;
/// BT.601 video-range chroma bounds.
const CHROMA_LOW: f32 = 16.0;
const CHROMA_HIGH: f32 = 240.0;

/// Frequency-estimation window width for RGB channel and Robot 36 luma
/// scans, in multiples of one pixel's dwell (spec §4.2: "widened beyond one
/// pixel, typically 4-8 pixels' worth"; a single dwell is too short for an
/// unbiased Goertzel estimate in the 1500-2300 Hz band).
const PIXEL_WINDOW_MULTIPLE: usize = 6;
/// Chroma sample window width as a fraction of the chroma-pixel dwell
/// (spec §4.9c: "width = 98% of the chroma-pixel dwell").
const CHROMA_WINDOW_FRACTION: f32 = 0.98;

/// Leader-detection search window: how far into the recording to look for
/// the start of the VIS header.
const LEADER_SEARCH_SPAN_S: f32 = 3.0;
/// Width of the window used to score candidate leader start offsets.
const LEADER_SCORE_WINDOW_S: f32 = 0.1;
const LEADER_SEARCH_STEP_S: f32 = 0.005;

/// Fraction of a line's duration the per-line sync search is allowed to
/// drift from the expected offset before falling back to extrapolation.
const SYNC_SEARCH_FRACTION: f32 = 0.25;
const SYNC_CONFIDENCE_MIN: f32 = 1.2;

/// Decodes `samples` (mono PCM at `sample_rate`) into a fresh [`RgbaImage`]
/// (alpha=255 everywhere, per spec), resolving the mode through
/// `select_mode`, using the default [`Config`].
pub fn decode<M>(samples: &[f32], sample_rate: f32, select_mode: &M) -> Result<Decoded<RgbaImage>, DecodeError>
where
    M: SelectMode,
{
    decode_with_config(samples, sample_rate, select_mode, &Config::default())
}

/// As [`decode`], but with an explicit [`Config`].
pub fn decode_with_config<M>(
    samples: &[f32],
    sample_rate: f32,
    select_mode: &M,
    config: &Config,
) -> Result<Decoded<RgbaImage>, DecodeError>
where
    M: SelectMode,
{
    let mut frame = RgbaImage::new(0, 0);
    let warnings = decode_into(samples, sample_rate, select_mode, config, &mut frame)?;
    Ok(Decoded {
        raster: frame,
        warnings,
    })
}

/// Decodes into a caller-supplied frame buffer, for callers that want a
/// concrete type other than [`RgbaImage`] or want to reuse an allocation.
pub fn decode_into<F, M>(
    samples: &[f32],
    sample_rate: f32,
    select_mode: &M,
    config: &Config,
    frame: &mut F,
) -> Result<Vec<Warning>, DecodeError>
where
    F: FrameBufferMut,
    M: SelectMode,
{
    if !(sample_rate > 0.0) {
        return Err(DecodeError::InvalidSampleRate(sample_rate));
    }

    tracing::info!(sample_rate, samples = samples.len(), "decode started");

    let mut warnings = Vec::new();

    let leader_start = locate_leader_start(samples, sample_rate).ok_or(DecodeError::NoSync)?;

    let (mode, header_end) = match decode_vis(samples, sample_rate, leader_start, select_mode) {
        Some(mode) => mode,
        None => {
            push_warning(&mut warnings, Warning::UnrecognisedVis);
            let fallback = ModeSpecification::ROBOT36;
            let header_len = vis::preamble_len_samples(sample_rate);
            (fallback, leader_start + header_len)
        }
    };

    tracing::debug!(mode = mode.name, header_end, "resolved mode");
    frame.set_size(mode.width as usize, mode.lines as usize);

    // Robot 36 only: per-line luma and half-resolution chroma scratch,
    // buffered for the whole frame so reassembly (§4.9 step 6) can pair each
    // even line's Cr with the following odd line's Cb after every line has
    // been decoded, instead of compositing from a stale previous pair.
    let mut luma_rows: Vec<Vec<u8>> = Vec::new();
    let mut chroma_rows: Vec<ChromaRow> = Vec::new();

    let mut cursor = header_end;
    let line_len = (mode.line_time * sample_rate) as usize;

    for y in 0..mode.lines as usize {
        if cursor >= samples.len() {
            push_warning(&mut warnings, Warning::TruncatedInput);
            break;
        }

        let sync_len = (mode.sync_time * sample_rate) as usize;
        let search_span = ((line_len as f32) * SYNC_SEARCH_FRACTION) as usize;
        let search_start = cursor.saturating_sub(search_span / 2);

        let sync_offset = sync::find_sync_pulse(samples, sample_rate, search_start, search_span, sync_len.max(1));

        let line_start = match sync_offset {
            Some(offset)
                if sync::sync_confidence(samples, sample_rate, offset, sync_len.max(1)) > SYNC_CONFIDENCE_MIN =>
            {
                offset
            }
            _ => {
                push_warning(&mut warnings, Warning::SyncLost);
                cursor
            }
        };

        tracing::debug!(y, line_start, ?sync_offset, "line sync");

        let mut pos = line_start + sync_len;
        pos += (mode.porch_time * sample_rate) as usize;

        match mode.color_format {
            ColorFormat::Rgb => {
                let mut rows = [vec![0u8; mode.width as usize], vec![0u8; mode.width as usize], vec![0u8; mode.width as usize]];

                for slot in 0..3 {
                    let pixel_len = (mode.pixel_time * sample_rate).round() as usize;
                    let window_len = pixel_len * PIXEL_WINDOW_MULTIPLE;
                    for x in 0..mode.width as usize {
                        if pos >= samples.len() {
                            push_warning(&mut warnings, Warning::TruncatedInput);
                            break;
                        }
                        let center = pos + pixel_len / 2;
                        let window = centered_window(samples, center, window_len);
                        let freq = estimate_window_frequency(window, sample_rate, config);
                        let value = unlerp(freq, CHANNEL_LOW_HZ, CHANNEL_HIGH_HZ).clamp(0.0, 1.0);
                        rows[mode.channel_order[slot]][x] = clamp_u8(value * 255.0);
                        pos = (pos + pixel_len).min(samples.len());
                    }
                    pos += (mode.sep_time * sample_rate) as usize;
                }

                for x in 0..mode.width as usize {
                    frame.set_pixel(x, y, (rows[0][x], rows[1][x], rows[2][x]));
                }
            }
            ColorFormat::Yuv => {
                let mut luma = vec![0u8; mode.width as usize];
                let pixel_len = (mode.pixel_time * sample_rate).round() as usize;
                let window_len = pixel_len * PIXEL_WINDOW_MULTIPLE;

                for x in 0..mode.width as usize {
                    if pos >= samples.len() {
                        push_warning(&mut warnings, Warning::TruncatedInput);
                        break;
                    }
                    let center = pos + pixel_len / 2;
                    let window = centered_window(samples, center, window_len);
                    let freq = estimate_window_frequency(window, sample_rate, config);
                    let value = unlerp(freq, CHANNEL_LOW_HZ, CHANNEL_HIGH_HZ).clamp(0.0, 1.0);
                    luma[x] = clamp_u8(LUMA_LOW + value * (LUMA_HIGH - LUMA_LOW));
                    pos = (pos + pixel_len).min(samples.len());
                }

                pos += (mode.sep_time * sample_rate) as usize;
                pos += (mode.chroma_sep_time * sample_rate) as usize;
                pos += (mode.chroma_porch_time * sample_rate) as usize;

                let half_width = mode.width as usize / 2;
                let chroma_pixel_len = (mode.chroma_pixel_time * sample_rate).round() as usize;
                let chroma_window_len = (chroma_pixel_len as f32 * CHROMA_WINDOW_FRACTION).round() as usize;
                let mut chroma = ChromaRow::new(mode.width as usize);

                for half_x in 0..half_width {
                    if pos >= samples.len() {
                        push_warning(&mut warnings, Warning::TruncatedInput);
                        break;
                    }
                    let center = pos + chroma_pixel_len / 2;
                    let window = centered_window(samples, center, chroma_window_len);
                    let freq = estimate_window_frequency(window, sample_rate, config);
                    let value = unlerp(freq, CHANNEL_LOW_HZ, CHANNEL_HIGH_HZ).clamp(0.0, 1.0);
                    let byte = clamp_u8(CHROMA_LOW + value * (CHROMA_HIGH - CHROMA_LOW));
                    chroma.set(half_x, byte);
                    pos = (pos + chroma_pixel_len).min(samples.len());
                }

                luma_rows.push(luma);
                chroma_rows.push(chroma);
            }
        }

        cursor = line_start + line_len;
    }

    if mode.color_format == ColorFormat::Yuv {
        reassemble_yuv(frame, mode, &luma_rows, &chroma_rows);
    }

    tracing::info!(mode = mode.name, warnings = warnings.len(), "decode finished");
    Ok(warnings)
}

/// YUV reassembly (spec §4.9 step 6): process decoded lines in pairs
/// `(0,1), (2,3), …`; within a pair, Cr comes from the even line's scratch
/// and Cb from the odd line's scratch (line-interleaved transmission), and
/// both lines of the pair share that one Cb/Cr. A line missing its pair
/// partner (truncated input) falls back to its own scratch, which defaults
/// to neutral 128.
fn reassemble_yuv<F>(frame: &mut F, mode: ModeSpecification, luma_rows: &[Vec<u8>], chroma_rows: &[ChromaRow])
where
    F: FrameBufferMut,
{
    let width = mode.width as usize;
    let decoded_lines = luma_rows.len();

    for pair_start in (0..decoded_lines).step_by(2) {
        let even = pair_start;
        let odd = pair_start + 1;

        let cr_row = &chroma_rows[even];
        let cb_row = if odd < decoded_lines { &chroma_rows[odd] } else { &chroma_rows[even] };

        for y in even..=odd.min(decoded_lines - 1) {
            for x in 0..width {
                let luma = luma_rows[y][x];
                let cb = cb_row.sample(x);
                let cr = cr_row.sample(x);
                frame.set_pixel(x, y, ycbcr_to_rgb(luma as f32, cb as f32, cr as f32));
            }
        }
    }
}

fn push_warning(warnings: &mut Vec<Warning>, warning: Warning) {
    tracing::warn!(%warning, "decode warning");
    warnings.push(warning);
}

/// Slices `samples` to a window of `width` samples centred on `center`,
/// clamped to the available range. Falls back to whatever is left when
/// fewer than `width` samples remain.
fn centered_window(samples: &[f32], center: usize, width: usize) -> &[f32] {
    let half = width / 2;
    let start = center.saturating_sub(half).min(samples.len());
    let end = (start + width).min(samples.len());
    &samples[start..end]
}

/// Estimates the dominant tone frequency in a dwell window, using whichever
/// front end `config` selects.
fn estimate_window_frequency(window: &[f32], sample_rate: f32, config: &Config) -> f32 {
    if config.use_fm_demod {
        demod::estimate_frequency(window, sample_rate)
    }
    else {
        goertzel::estimate_frequency(window, sample_rate)
    }
}

/// Finds the strongest sustained 1900 Hz leader-tone window in the first
/// [`LEADER_SEARCH_SPAN_S`] seconds of `samples`.
fn locate_leader_start(samples: &[f32], sample_rate: f32) -> Option<usize> {
    let window_len = (LEADER_SCORE_WINDOW_S * sample_rate) as usize;
    if window_len == 0 || window_len > samples.len() {
        return None;
    }

    let step = ((LEADER_SEARCH_STEP_S * sample_rate) as usize).max(1);
    let span = ((LEADER_SEARCH_SPAN_S * sample_rate) as usize).min(samples.len());

    let mut best_offset = None;
    let mut best_mag = f32::MIN;

    let mut offset = 0;
    while offset + window_len <= span {
        let mag = goertzel_magnitude(&samples[offset..offset + window_len], sample_rate, vis::LEADER_TONE_HZ);
        if mag > best_mag {
            best_mag = mag;
            best_offset = Some(offset);
        }
        offset += step;
    }

    best_offset
}

/// Decodes the VIS header starting at `leader_start`, returning the
/// resolved mode and the sample offset where the first line's sync pulse
/// begins.
fn decode_vis<M>(
    samples: &[f32],
    sample_rate: f32,
    leader_start: usize,
    select_mode: &M,
) -> Option<(ModeSpecification, usize)>
where
    M: SelectMode,
{
    let bit_len = (vis::VIS_BIT_TIME_S * sample_rate) as usize;
    let mut pos = leader_start;
    pos += (2.0 * vis::LEADER_TIME_S * sample_rate) as usize;
    pos += (vis::LEADER_BREAK_TIME_S * sample_rate) as usize;
    pos += bit_len; // VIS start bit

    let mut windows = Vec::with_capacity(8);
    for _ in 0..8 {
        let end = (pos + bit_len).min(samples.len());
        if pos >= end {
            return None;
        }
        windows.push(&samples[pos..end]);
        pos += bit_len;
    }

    let vis_code = vis::decode_bits(&windows, sample_rate)?;
    pos += bit_len; // VIS stop bit

    let mode = select_mode.select(vis_code)?;
    Some((mode, pos))
}

#[cfg(test)]
mod tests {
    use image::{
        Rgb,
        RgbImage,
    };

    use super::*;
    use crate::{
        encoder::encode,
        modes::DefaultModes,
    };

    #[test]
    fn round_trips_solid_grey_robot36() {
        let mode = ModeSpecification::ROBOT36;
        let frame = RgbImage::from_pixel(mode.width, mode.lines, Rgb([128, 128, 128]));
        let sample_rate = 16_000.0;

        let pcm = encode(&frame, mode, sample_rate).unwrap();
        let decoded = decode(&pcm, sample_rate, &DefaultModes).unwrap();

        assert_eq!(decoded.raster.width(), mode.width);
        assert_eq!(decoded.raster.height(), mode.lines);

        let center = decoded.raster.get_pixel(mode.width / 2, mode.lines / 2);
        for channel in &center.0[..3] {
            assert!((*channel as i32 - 128).abs() < 40, "{:?}", center.0);
        }
        assert_eq!(center.0[3], 255);
    }

    #[test]
    fn round_trips_martin_m1_vis_code() {
        let mode = ModeSpecification::MARTIN_M1;
        let frame = RgbImage::from_pixel(mode.width, mode.lines, Rgb([200, 50, 80]));
        let sample_rate = 16_000.0;

        let pcm = encode(&frame, mode, sample_rate).unwrap();
        let decoded = decode(&pcm, sample_rate, &DefaultModes).unwrap();

        assert!(decoded.warnings.is_empty(), "{:?}", decoded.warnings);
        assert_eq!(decoded.raster.width(), mode.width);
        assert_eq!(decoded.raster.height(), mode.lines);
    }

    #[test]
    fn empty_input_is_no_sync() {
        let err = decode(&[], 48_000.0, &DefaultModes).unwrap_err();
        assert!(matches!(err, DecodeError::NoSync));
    }

    #[test]
    fn non_positive_sample_rate_is_rejected() {
        let err = decode(&[0.0; 100], 0.0, &DefaultModes).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidSampleRate(_)));
    }
}
