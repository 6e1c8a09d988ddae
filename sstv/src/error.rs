//! Error and warning types for the codec, following spec §7.
//!
//! Structural errors ([`EncodeError::InvalidMode`],
//! [`DecodeError::InvalidSampleRate`]) abort the call immediately. Content
//! errors ([`Warning`]) are recovered where possible: the caller still gets a
//! best-effort raster, with the warnings describing what went wrong.

use thiserror::Error;

/// Non-fatal condition encountered while decoding. The decoder keeps going
/// and these are surfaced alongside the best-effort output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Warning {
    /// VIS detection failed within the search window; the decoder fell back
    /// to Robot 36 and kept decoding.
    #[error("VIS header not recognised, defaulting to Robot 36")]
    UnrecognisedVis,
    /// No 1200 Hz sync pulse was found for a line; the decoder extrapolated
    /// the line position from timing and kept going.
    #[error("sync pulse not found, continuing with extrapolated position")]
    SyncLost,
    /// The sample stream ended before all lines were decoded.
    #[error("input truncated before the frame was fully decoded")]
    TruncatedInput,
}

/// Errors that can occur while encoding a raster into a tone train.
#[derive(Clone, Debug, Error)]
pub enum EncodeError {
    /// The caller asked for a mode name that isn't in the mode table. This is
    /// a caller bug and is fatal.
    #[error("unknown SSTV mode: {0:?}")]
    InvalidMode(String),
    /// The sample rate passed to the encoder was not positive.
    #[error("invalid sample rate: {0}")]
    InvalidSampleRate(f32),
}

/// Errors that can occur while decoding a tone train into a raster.
#[derive(Clone, Debug, Error)]
pub enum DecodeError {
    /// No 1200 Hz sync pulse was found anywhere in the input: the audio is
    /// most likely not SSTV, or has severe timing skew.
    #[error(
        "no sync pulse found in the input; it is likely not an SSTV transmission or has severe \
         clock skew"
    )]
    NoSync,
    /// The sample rate reported by the PCM source was not positive.
    #[error("invalid sample rate: {0}")]
    InvalidSampleRate(f32),
}

/// Result of a decode: the best-effort raster plus anything that went wrong
/// along the way. A non-empty `warnings` does not mean the raster is
/// unusable — see spec §4.10.
#[derive(Clone, Debug)]
pub struct Decoded<T> {
    pub raster: T,
    pub warnings: Vec<Warning>,
}
