//! Pixel storage: an RGB frame buffer seam so the codec core doesn't
//! depend on a concrete `image` type, plus the chroma scratch buffer Robot
//! 36 needs while its half-resolution, line-interleaved Cb/Cr samples are
//! still arriving.

use image::{
    Rgb,
    RgbImage,
    Rgba,
    RgbaImage,
};

/// Read side of the frame buffer seam used by the encoder. Alpha, if the
/// concrete storage has one, is ignored on read (spec §6: "alpha is ignored
/// on input").
pub trait FrameBuffer {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn pixel(&self, x: usize, y: usize) -> (u8, u8, u8);
}

impl<F> FrameBuffer for &F
where
    F: FrameBuffer,
{
    #[inline]
    fn width(&self) -> usize {
        (**self).width()
    }

    #[inline]
    fn height(&self) -> usize {
        (**self).height()
    }

    #[inline]
    fn pixel(&self, x: usize, y: usize) -> (u8, u8, u8) {
        (**self).pixel(x, y)
    }
}

impl FrameBuffer for RgbImage {
    #[inline]
    fn width(&self) -> usize {
        RgbImage::width(self) as usize
    }

    #[inline]
    fn height(&self) -> usize {
        RgbImage::height(self) as usize
    }

    #[inline]
    fn pixel(&self, x: usize, y: usize) -> (u8, u8, u8) {
        let p = self.get_pixel(x as u32, y as u32);
        (p.0[0], p.0[1], p.0[2])
    }
}

impl FrameBuffer for RgbaImage {
    #[inline]
    fn width(&self) -> usize {
        RgbaImage::width(self) as usize
    }

    #[inline]
    fn height(&self) -> usize {
        RgbaImage::height(self) as usize
    }

    #[inline]
    fn pixel(&self, x: usize, y: usize) -> (u8, u8, u8) {
        let p = self.get_pixel(x as u32, y as u32);
        (p.0[0], p.0[1], p.0[2])
    }
}

/// Write side of the frame buffer seam used by the decoder. `set_size` is
/// called once the VIS code has resolved a mode, before any pixel is
/// written.
pub trait FrameBufferMut {
    fn set_size(&mut self, width: usize, height: usize);
    fn set_pixel(&mut self, x: usize, y: usize, rgb: (u8, u8, u8));
}

impl<F> FrameBufferMut for &mut F
where
    F: FrameBufferMut,
{
    #[inline]
    fn set_size(&mut self, width: usize, height: usize) {
        (**self).set_size(width, height);
    }

    #[inline]
    fn set_pixel(&mut self, x: usize, y: usize, rgb: (u8, u8, u8)) {
        (**self).set_pixel(x, y, rgb);
    }
}

impl FrameBufferMut for RgbImage {
    fn set_size(&mut self, width: usize, height: usize) {
        *self = RgbImage::new(width as u32, height as u32);
    }

    fn set_pixel(&mut self, x: usize, y: usize, rgb: (u8, u8, u8)) {
        *self.get_pixel_mut(x as u32, y as u32) = Rgb([rgb.0, rgb.1, rgb.2]);
    }
}

/// Decoder output type (spec §3: "output raster (RGBA, alpha=255
/// everywhere)"). `set_size` fills the raster opaque black, matching spec
/// §4.9's decoder-initialisation step; every written pixel keeps alpha=255.
impl FrameBufferMut for RgbaImage {
    fn set_size(&mut self, width: usize, height: usize) {
        *self = RgbaImage::from_pixel(width as u32, height as u32, Rgba([0, 0, 0, 255]));
    }

    fn set_pixel(&mut self, x: usize, y: usize, rgb: (u8, u8, u8)) {
        *self.get_pixel_mut(x as u32, y as u32) = Rgba([rgb.0, rgb.1, rgb.2, 255]);
    }
}

/// One Robot 36 line's half-horizontal-resolution chroma scratch row,
/// upsampled to full width by nearest-neighbour duplication on read. A row
/// holds a single channel — whichever of Cb or Cr that line's separator
/// carried (spec §4.9c) — not a merged Cb/Cr pair; pairing across two lines
/// happens afterwards, in the decoder's reassembly pass (spec §4.9 step 6).
/// Starts at 128 (neutral) so a truncated line still renders without tint.
#[derive(Clone, Debug)]
pub struct ChromaRow {
    half_width: usize,
    samples: Vec<u8>,
}

impl ChromaRow {
    pub fn new(width: usize) -> Self {
        let half_width = width.div_ceil(2);
        Self {
            half_width,
            samples: vec![128; half_width],
        }
    }

    #[inline]
    pub fn set(&mut self, half_x: usize, value: u8) {
        self.samples[half_x] = value;
    }

    /// Upsampled value at full-resolution column `x`.
    #[inline]
    pub fn sample(&self, x: usize) -> u8 {
        let half_x = (x / 2).min(self.half_width - 1);
        self.samples[half_x]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chroma_row_starts_neutral() {
        let row = ChromaRow::new(320);
        assert_eq!(row.sample(0), 128);
        assert_eq!(row.sample(319), 128);
    }

    #[test]
    fn chroma_row_upsamples_by_pair() {
        let mut row = ChromaRow::new(8);
        row.set(2, 200);
        assert_eq!(row.sample(4), 200);
        assert_eq!(row.sample(5), 200);
        assert_eq!(row.sample(3), 128);
    }
}
