//! WAV container codec. The wire format is mono 16-bit PCM (component C1's
//! external interface, spec §6); [`hound`] handles the RIFF framing.

use std::{
    io::{
        Read,
        Seek,
        Write,
    },
    path::Path,
};

use hound::{
    SampleFormat,
    WavSpec,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WavError {
    #[error(transparent)]
    Hound(#[from] hound::Error),
}

/// PCM samples plus the sample rate they were recorded/should be played at.
#[derive(Clone, Debug)]
pub struct WavSamples {
    pub samples: Vec<f32>,
    pub sample_rate: f32,
}

/// Reads a mono or multi-channel WAV file, downmixing to mono by averaging
/// channels if necessary, and converting to `f32` in `[-1, 1]`.
pub fn read<R>(reader: R) -> Result<WavSamples, WavError>
where
    R: Read,
{
    let mut wav = hound::WavReader::new(reader)?;
    let spec = wav.spec();
    let channels = spec.channels.max(1) as usize;

    let mono: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => {
            let samples: Vec<f32> = wav.samples::<f32>().collect::<Result<_, _>>()?;
            downmix(&samples, channels)
        }
        SampleFormat::Int => {
            let scale = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
            let samples: Vec<f32> = wav
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 * scale))
                .collect::<Result<_, _>>()?;
            downmix(&samples, channels)
        }
    };

    Ok(WavSamples {
        samples: mono,
        sample_rate: spec.sample_rate as f32,
    })
}

fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Reads a mono or multi-channel WAV file from `path`.
pub fn read_file<P>(path: P) -> Result<WavSamples, WavError>
where
    P: AsRef<Path>,
{
    let file = std::fs::File::open(path)?;
    read(std::io::BufReader::new(file))
}

/// Writes `samples` (`f32` in `[-1, 1]`) as a canonical 16-bit mono PCM WAV.
pub fn write<W>(writer: W, samples: &[f32], sample_rate: f32) -> Result<(), WavError>
where
    W: Write + Seek,
{
    let spec = WavSpec {
        channels: 1,
        sample_rate: sample_rate.round() as u32,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut wav = hound::WavWriter::new(writer, spec)?;
    for &sample in samples {
        let quantized = (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16;
        wav.write_sample(quantized)?;
    }
    wav.finalize()?;

    Ok(())
}

/// Writes `samples` to a new WAV file at `path`.
pub fn write_file<P>(path: P, samples: &[f32], sample_rate: f32) -> Result<(), WavError>
where
    P: AsRef<Path>,
{
    let spec = WavSpec {
        channels: 1,
        sample_rate: sample_rate.round() as u32,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut wav = hound::WavWriter::create(path, spec)?;
    for &sample in samples {
        let quantized = (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16;
        wav.write_sample(quantized)?;
    }
    wav.finalize()?;
    Ok(())
}

impl From<std::io::Error> for WavError {
    fn from(error: std::io::Error) -> Self {
        WavError::Hound(hound::Error::IoError(error))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn write_then_read_round_trips_within_quantization_error() {
        let sample_rate = 8_000.0;
        let samples: Vec<f32> = (0..800).map(|i| (i as f32 * 0.1).sin() * 0.8).collect();

        let mut buffer = Cursor::new(Vec::new());
        write(&mut buffer, &samples, sample_rate).unwrap();

        buffer.set_position(0);
        let decoded = read(buffer).unwrap();

        assert_eq!(decoded.sample_rate, sample_rate);
        assert_eq!(decoded.samples.len(), samples.len());
        for (a, b) in samples.iter().zip(&decoded.samples) {
            assert!((a - b).abs() < 1e-3, "{a} vs {b}");
        }
    }
}
