//! Runtime configuration shared by the library entry points and the CLI.

/// Tuning knobs for a codec run. The defaults match what the encoder and
/// decoder use when driven programmatically without a `Config` at all.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// PCM sample rate used for encoding and assumed for decoding unless
    /// overridden by the input file's own WAV header.
    pub sample_rate: f32,
    /// Use the FM phase-difference front end ([`crate::demod`]) instead of
    /// the Goertzel sweep ([`crate::filter::goertzel`]) for tone recovery
    /// during decode.
    pub use_fm_demod: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            use_fm_demod: false,
        }
    }
}
