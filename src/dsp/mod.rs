//! Spectral DSP
//!
//! The building blocks of the anonymization pass, leaves first:
//! transform, chunking, per-bin effects and the time-domain shaper.

mod chunk;
mod fft;
mod shaper;
mod spectral;

pub use chunk::{load_window, ChunkScheduler};
pub use fft::SpectralTransform;
pub use shaper::TimeDomainShaper;
pub use spectral::EffectEngine;

/// Samples per FFT window. Must stay a power of two.
pub const WINDOW_SIZE: usize = 2048;

const _: () = assert!(WINDOW_SIZE.is_power_of_two());
