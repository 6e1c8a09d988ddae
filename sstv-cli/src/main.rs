mod args;

use clap::Parser;
use color_eyre::eyre::{
    Result,
    eyre,
};
use image::{
    GenericImageView,
    RgbaImage,
};
use sstv::{
    Config,
    decoder,
    encoder,
    modes::{
        DefaultModes,
        ModeSpecification,
    },
    wav,
};
use tracing_subscriber::EnvFilter;

use crate::args::{
    Args,
    Command,
};

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    match args.command {
        Command::Encode {
            image,
            wav: wav_path,
            mode,
            sample_rate,
        } => encode(&image, &wav_path, &mode, sample_rate),
        Command::Decode {
            wav: wav_path,
            image,
            fm_demod,
        } => decode(&wav_path, &image, fm_demod),
    }
}

fn resolve_mode(name: &str) -> Result<ModeSpecification> {
    if let Some(mode) = ModeSpecification::by_name(name) {
        return Ok(mode);
    }

    let lower = name.to_ascii_lowercase();
    let mode = if lower.contains("robot") {
        ModeSpecification::ROBOT36
    }
    else if lower.contains("martin") {
        ModeSpecification::MARTIN_M1
    }
    else if lower.contains("scottie") {
        ModeSpecification::SCOTTIE_S1
    }
    else {
        return Err(eyre!("unknown SSTV mode: {name:?}"));
    };

    Ok(mode)
}

fn encode(image_path: &std::path::Path, wav_path: &std::path::Path, mode_name: &str, sample_rate: f32) -> Result<()> {
    let mode = resolve_mode(mode_name)?;

    let source = image::open(image_path)?;
    let frame: RgbaImage = if source.dimensions() == (mode.width, mode.lines) {
        source.to_rgba8()
    }
    else {
        tracing::info!(
            from = ?source.dimensions(),
            to = ?(mode.width, mode.lines),
            "resizing input image to fit mode"
        );
        image::imageops::resize(
            &source.to_rgba8(),
            mode.width,
            mode.lines,
            image::imageops::FilterType::Lanczos3,
        )
    };

    let pcm = encoder::encode(&frame, mode, sample_rate)?;
    wav::write_file(wav_path, &pcm, sample_rate)?;

    tracing::info!(mode = mode.name, samples = pcm.len(), "encoded");
    Ok(())
}

fn decode(wav_path: &std::path::Path, image_path: &std::path::Path, fm_demod: bool) -> Result<()> {
    let recording = wav::read_file(wav_path)?;
    let config = Config {
        sample_rate: recording.sample_rate,
        use_fm_demod: fm_demod,
    };

    let decoded = decoder::decode_with_config(
        &recording.samples,
        recording.sample_rate,
        &DefaultModes,
        &config,
    )?;

    for warning in &decoded.warnings {
        tracing::warn!(%warning, "decode warning");
    }

    let raster: RgbaImage = decoded.raster;
    raster.save(image_path)?;

    tracing::info!(path = %image_path.display(), "decoded");
    Ok(())
}
