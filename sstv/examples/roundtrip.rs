//! Encodes a generated test pattern as Martin M1, writes it to a WAV file,
//! then decodes that WAV back and reports how closely the two match.
//!
//! Run with: `cargo run --example roundtrip -- out.wav`

use std::{
    env,
    path::PathBuf,
};

use image::{
    Rgb,
    RgbImage,
};
use sstv::{
    encoder,
    decoder,
    modes::{
        DefaultModes,
        ModeSpecification,
    },
    wav,
};

fn test_pattern(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let band = x * 3 / width;
        match band {
            0 => Rgb([220, 40, 40]),
            1 => Rgb([40, 200, 60]),
            _ => Rgb([40, 80, 220]),
        }
        .map(|channel| {
            let shade = 0.6 + 0.4 * (y as f32 / height as f32);
            (channel as f32 * shade) as u8
        })
    })
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt::init();

    let out_path = env::args().nth(1).map(PathBuf::from).unwrap_or_else(|| PathBuf::from("roundtrip.wav"));

    let mode = ModeSpecification::MARTIN_M1;
    let sample_rate = 44_100.0;
    let source = test_pattern(mode.width, mode.lines);

    let pcm = encoder::encode(&source, mode, sample_rate)?;
    wav::write_file(&out_path, &pcm, sample_rate)?;
    println!("wrote {} samples to {}", pcm.len(), out_path.display());

    let recording = wav::read_file(&out_path)?;
    let decoded = decoder::decode(&recording.samples, recording.sample_rate, &DefaultModes)?;

    if !decoded.warnings.is_empty() {
        println!("decode warnings: {:?}", decoded.warnings);
    }

    let mut max_error = 0i32;
    for y in 0..mode.lines {
        for x in 0..mode.width {
            let expected = source.get_pixel(x, y);
            let actual = decoded.raster.get_pixel(x, y);
            for c in 0..3 {
                let error = (expected.0[c] as i32 - actual.0[c] as i32).abs();
                max_error = max_error.max(error);
            }
        }
    }
    println!("max per-channel error: {max_error}");
    println!("output alpha always opaque: {}", decoded.raster.pixels().all(|p| p.0[3] == 255));

    Ok(())
}
