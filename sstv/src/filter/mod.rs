//! Signal-processing primitives shared by the encoder and decoder: FIR
//! filtering, window design, and the Goertzel frequency estimator.

pub mod fir;
pub mod goertzel;
pub mod kaiser;

pub use fir::FirFilter;
