//! BT.601 video-range colour converter (component C5).
//!
//! Converts between 8-bit RGB and YCbCr with Y in `[16,235]` and Cb/Cr in
//! `[16,240]` — "video range", as opposed to "full range" 0-255. Encoder and
//! decoder must agree on this; mixing ranges produces a green cast on
//! neutral greys (spec §4.5).

/// Converts RGB (each `0..=255`) to video-range YCbCr.
pub fn rgb_to_ycbcr(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let (r, g, b) = (r as f32, g as f32, b as f32);
    let y = 16.0 + (65.738 * r + 129.057 * g + 25.064 * b) / 256.0;
    let cb = 128.0 + (-37.945 * r - 74.494 * g + 112.439 * b) / 256.0;
    let cr = 128.0 + (112.439 * r - 94.154 * g - 18.285 * b) / 256.0;
    (y, cb, cr)
}

/// Converts video-range YCbCr back to RGB, clamped to `0..=255`.
pub fn ycbcr_to_rgb(y: f32, cb: f32, cr: f32) -> (u8, u8, u8) {
    let y_scaled = 298.082 * (y - 16.0);
    let r = 0.003_906 * (y_scaled + 408.583 * (cr - 128.0));
    let g = 0.003_906 * (y_scaled - 100.291 * (cb - 128.0) - 208.120 * (cr - 128.0));
    let b = 0.003_906 * (y_scaled + 516.411 * (cb - 128.0));
    (clamp_u8(r), clamp_u8(g), clamp_u8(b))
}

#[inline]
pub(crate) fn clamp_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}
