use std::path::PathBuf;

use clap::{
    Parser,
    Subcommand,
};

#[derive(Debug, Parser)]
#[clap(about = "Encode images to SSTV audio, and decode SSTV audio back to images")]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Encodes an image into an SSTV WAV file.
    Encode {
        /// Input image (resized to the mode's frame size if necessary).
        image: PathBuf,
        /// Output WAV file.
        wav: PathBuf,
        /// SSTV mode to encode as.
        #[clap(short, long, default_value = "robot36")]
        mode: String,
        #[clap(short, long, default_value_t = 48_000.0)]
        sample_rate: f32,
    },
    /// Decodes an SSTV WAV file into an image.
    Decode {
        /// Input WAV file.
        wav: PathBuf,
        /// Output image.
        image: PathBuf,
        /// Use the FM phase-difference front end instead of the Goertzel
        /// sweep for tone recovery.
        #[clap(long)]
        fm_demod: bool,
    },
}
