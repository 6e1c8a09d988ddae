//! Bidirectional SSTV (Slow-Scan Television) signal codec.
//!
//! Encodes an RGB raster into mono PCM tones ([`encoder`]) and decodes a PCM
//! recording back into a raster ([`decoder`]), for Robot 36, Martin M1 and
//! Scottie S1. Everything runs synchronously over in-memory buffers: there
//! is no async I/O and no live audio capture in this crate.

pub mod color;
pub mod config;
pub mod demod;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod filter;
pub mod modes;
pub mod raster;
pub mod state;
pub mod sync;
pub mod tone;
pub mod util;
pub mod vis;
pub mod wav;

pub use config::Config;
pub use error::{
    DecodeError,
    Decoded,
    EncodeError,
    Warning,
};
pub use modes::ModeSpecification;
