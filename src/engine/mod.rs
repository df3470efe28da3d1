//! Audio Engine Module
//!
//! Buffers, the anonymization pipeline and the WAV boundary:
//! - Sample buffer management
//! - Caller-owned processing context and pipeline
//! - WAV decoding (input) and channel-major WAV encoding (output)

pub mod buffer;
pub mod io;
pub mod pipeline;
pub mod wav;

pub use buffer::SampleBuffer;
pub use io::{decode_wav_bytes, decode_wav_file, generate_test_tone, write_blob};
pub use pipeline::ProcessingContext;
pub use wav::{decode_channel_major, encode_wav, WavBlob, WavHeader, MAX_CHANNELS, WAV_HEADER_LEN};
