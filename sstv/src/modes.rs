//! Mode table (component C4): static descriptors for the three supported
//! SSTV modes, keyed by VIS code (decode) and by name (encode).
//!
//! Timings are taken from the widely used N7CXI (2000) measurements; Robot
//! 36's Y/separator/porch/chroma sub-timings follow spec §3.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorFormat {
    /// Three full-resolution channel scans, in G, B, R order.
    Rgb,
    /// One full-resolution luma scan followed by a half-resolution,
    /// line-alternating chroma scan.
    Yuv,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModeSpecification {
    pub name: &'static str,
    pub vis_code: u8,
    pub width: u32,
    pub lines: u32,
    pub color_format: ColorFormat,
    /// RGB modes only: which RGB channel (0=R, 1=G, 2=B) is scanned in each
    /// of the three slots. Martin and Scottie both transmit G, B, R.
    pub channel_order: [usize; 3],

    /// 1200 Hz sync pulse duration at the start of each line.
    pub sync_time: f32,
    /// 1500 Hz porch duration following sync.
    pub porch_time: f32,
    /// 1200 Hz separator duration between RGB channel scans (ignored for
    /// YUV, which has its own chroma separator/porch below).
    pub sep_time: f32,
    /// Per-pixel dwell time for an RGB channel scan, or for the Robot 36
    /// luma scan.
    pub pixel_time: f32,
    /// Total duration of one scan line, sync through the last channel/chroma
    /// sample.
    pub line_time: f32,

    /// Robot 36 only: separator duration between Y and chroma, alternating
    /// 1500/2300 Hz by line parity (informational only on decode, see spec
    /// §9).
    pub chroma_sep_time: f32,
    /// Robot 36 only: 1500 Hz porch between the chroma separator and the
    /// chroma scan.
    pub chroma_porch_time: f32,
    /// Robot 36 only: per-sample dwell for the half-resolution chroma scan
    /// (each sample covers two source pixels).
    pub chroma_pixel_time: f32,
}

impl ModeSpecification {
    pub const ROBOT36: Self = Self {
        name: "Robot 36",
        vis_code: 0x08,
        width: 320,
        lines: 240,
        color_format: ColorFormat::Yuv,
        channel_order: [0, 1, 2],
        sync_time: 9e-3,
        porch_time: 3e-3,
        sep_time: 0.0,
        pixel_time: 88e-3 / 320.0,
        line_time: 150e-3,
        chroma_sep_time: 4.5e-3,
        chroma_porch_time: 1.5e-3,
        chroma_pixel_time: 44e-3 / 160.0,
    };

    pub const MARTIN_M1: Self = Self {
        name: "Martin M1",
        vis_code: 0x2c,
        width: 320,
        lines: 256,
        color_format: ColorFormat::Rgb,
        channel_order: [1, 2, 0],
        sync_time: 4.862e-3,
        porch_time: 0.572e-3,
        sep_time: 0.572e-3,
        pixel_time: 0.4576e-3,
        line_time: 446.446e-3,
        chroma_sep_time: 0.0,
        chroma_porch_time: 0.0,
        chroma_pixel_time: 0.0,
    };

    pub const SCOTTIE_S1: Self = Self {
        name: "Scottie S1",
        vis_code: 0x3c,
        width: 320,
        lines: 256,
        color_format: ColorFormat::Rgb,
        channel_order: [1, 2, 0],
        sync_time: 9e-3,
        porch_time: 1.5e-3,
        sep_time: 1.5e-3,
        pixel_time: 0.4320e-3,
        line_time: 428.38e-3,
        chroma_sep_time: 0.0,
        chroma_porch_time: 0.0,
        chroma_pixel_time: 0.0,
    };

    pub const ALL: [Self; 3] = [Self::ROBOT36, Self::MARTIN_M1, Self::SCOTTIE_S1];

    pub fn by_vis_code(vis_code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.vis_code == vis_code)
    }

    pub fn by_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.name.eq_ignore_ascii_case(name))
    }
}

/// Strategy for resolving a decoded VIS code to a mode. Kept as a trait (not
/// a bare function) so a caller can force a mode for testing or for input
/// known in advance to be ambiguous, without touching the decoder pipeline.
pub trait SelectMode {
    fn select(&self, vis_code: u8) -> Option<ModeSpecification>;
}

/// Looks the VIS code up in [`ModeSpecification::ALL`]; this is what the
/// decoder uses unless the caller supplies something else.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultModes;

impl SelectMode for DefaultModes {
    fn select(&self, vis_code: u8) -> Option<ModeSpecification> {
        ModeSpecification::by_vis_code(vis_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vis_codes_match_spec() {
        assert_eq!(ModeSpecification::ROBOT36.vis_code, 0x08);
        assert_eq!(ModeSpecification::MARTIN_M1.vis_code, 0x2c);
        assert_eq!(ModeSpecification::SCOTTIE_S1.vis_code, 0x3c);
    }

    #[test]
    fn lookup_by_vis_code_round_trips_with_name() {
        for mode in ModeSpecification::ALL {
            assert_eq!(ModeSpecification::by_vis_code(mode.vis_code), Some(mode));
            assert_eq!(ModeSpecification::by_name(mode.name), Some(mode));
        }
    }

    #[test]
    fn unknown_vis_code_is_none() {
        assert_eq!(ModeSpecification::by_vis_code(0xff), None);
    }
}
