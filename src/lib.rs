//! Voiceveil - Spectral Voice Anonymization
//!
//! Turns a recorded speech buffer into an anonymized 16-bit PCM WAV blob by
//! rewriting its spectrum window by window:
//! 1. Chunk each channel into fixed 2048-sample windows (zero-padded tail)
//! 2. Forward FFT, per-bin phase/magnitude effects and optional bin scrambling
//! 3. Inverse FFT and an optional normalized tanh waveshaper
//! 4. Encode the result as a channel-major WAV byte stream
//!
//! # Example
//! ```
//! use voiceveil::engine::{generate_test_tone, ProcessingContext};
//! use voiceveil::VoiceSettings;
//!
//! let input = generate_test_tone(220.0, 0.5, 16000);
//! let mut ctx = ProcessingContext::seeded(7);
//! let blob = ctx.anonymize(&input, &VoiceSettings::default())?;
//! assert_eq!(blob.len(), 44 + 2 * input.len());
//! # Ok::<(), voiceveil::VeilError>(())
//! ```

pub mod cli;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod settings;

pub use error::{Result, VeilError};
pub use settings::VoiceSettings;
