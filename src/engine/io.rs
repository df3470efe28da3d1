//! Audio file I/O
//!
//! Decodes captured recordings into a [`SampleBuffer`] and writes encoded
//! blobs back to disk. Decoding accepts 8/16/24/32-bit integer and 32-bit
//! float WAV at any channel count and sample rate; nothing is resampled.
//!
//! A decode failure is always an error: no partial buffer is returned.

use std::io::{Cursor, Read};
use std::path::Path;

use hound::{SampleFormat, WavReader};
use log::debug;

use crate::engine::buffer::SampleBuffer;
use crate::engine::wav::WavBlob;
use crate::error::{Result, VeilError};

/// Decode a WAV file from disk
///
/// # Errors
/// * `FileNotFound` - If the file does not exist
/// * `InvalidAudio` - If the file is not a decodable WAV file
/// * `UnsupportedFormat` - For bit depths hound can read but we don't convert
/// * `EmptyAudio` - If the file decodes to zero samples
pub fn decode_wav_file(path: &Path) -> Result<SampleBuffer> {
    if !path.exists() {
        return Err(VeilError::FileNotFound {
            path: path.display().to_string(),
            source: None,
        });
    }

    let reader = WavReader::open(path).map_err(|e| VeilError::InvalidAudio {
        reason: format!("Failed to open WAV file: {}", e),
        source: Some(Box::new(e)),
    })?;

    decode_reader(reader)
}

/// Decode an in-memory WAV byte stream
pub fn decode_wav_bytes(bytes: &[u8]) -> Result<SampleBuffer> {
    let reader = WavReader::new(Cursor::new(bytes)).map_err(|e| VeilError::InvalidAudio {
        reason: format!("Failed to parse WAV data: {}", e),
        source: Some(Box::new(e)),
    })?;

    decode_reader(reader)
}

fn decode_reader<R: Read>(reader: WavReader<R>) -> Result<SampleBuffer> {
    let spec = reader.spec();
    let channels = spec.channels as usize;

    debug!(
        "Decoding WAV: {} ch, {} Hz, {}-bit {:?}",
        channels, spec.sample_rate, spec.bits_per_sample, spec.sample_format
    );

    let interleaved = read_samples_as_f32(reader, spec.bits_per_sample, spec.sample_format)?;
    if interleaved.is_empty() {
        return Err(VeilError::EmptyAudio);
    }

    SampleBuffer::from_interleaved(&interleaved, channels, spec.sample_rate)
}

/// Write an encoded blob to disk
pub fn write_blob(blob: &WavBlob, path: &Path) -> Result<()> {
    std::fs::write(path, blob.as_bytes())?;
    Ok(())
}

/// Generate a mono sine test tone
pub fn generate_test_tone(frequency: f32, duration_secs: f32, sample_rate: u32) -> SampleBuffer {
    let num_samples = (duration_secs * sample_rate as f32) as usize;
    let angular_freq = 2.0 * std::f32::consts::PI * frequency / sample_rate as f32;

    let samples = (0..num_samples)
        .map(|i| (angular_freq * i as f32).sin())
        .collect();

    SampleBuffer::mono(samples, sample_rate)
}

// ============================================================================
// Internal helper functions
// ============================================================================

/// Read samples from WAV reader and convert to f32
fn read_samples_as_f32<R: Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<f32>> {
    match sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| invalid("float", e)),
        SampleFormat::Int => match bits_per_sample {
            // hound maps unsigned 8-bit onto i8
            8 => reader
                .samples::<i8>()
                .map(|s| s.map(|v| v as f32 / 128.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| invalid("8-bit", e)),
            16 => reader
                .samples::<i16>()
                .map(|s| s.map(|v| v as f32 / 32768.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| invalid("16-bit", e)),
            24 => reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / 8388608.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| invalid("24-bit", e)),
            32 => reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / 2147483648.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(|e| invalid("32-bit int", e)),
            _ => Err(VeilError::UnsupportedFormat {
                format: format!("{}-bit integer audio", bits_per_sample),
            }),
        },
    }
}

fn invalid(kind: &str, e: hound::Error) -> VeilError {
    VeilError::InvalidAudio {
        reason: format!("Failed to read {} samples: {}", kind, e),
        source: Some(Box::new(e)),
    }
}

// ============================================================================
// Tests
// ============================================================================
