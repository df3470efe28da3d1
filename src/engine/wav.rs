//! WAV encoding
//!
//! Serializes a rendered buffer as a canonical 44-byte RIFF/WAVE header
//! followed by 16-bit little-endian PCM.
//!
//! # Sample layout
//! The payload is **channel-major**: every sample of channel 0, then every
//! sample of channel 1, and so on. Conventional PCM interleaves frames.
//! Players that expect interleaved data will hear stereo output as two
//! half-speed halves; the layout is kept for byte parity with existing
//! anonymized recordings.

use crate::engine::buffer::SampleBuffer;
use crate::error::{Result, VeilError};

/// Size of the canonical header in bytes
pub const WAV_HEADER_LEN: usize = 44;

const BITS_PER_SAMPLE: u16 = 16;
const BYTES_PER_SAMPLE: u32 = 2;
const FORMAT_PCM: u16 = 1;
const FMT_CHUNK_LEN: u32 = 16;

/// An encoded WAV byte stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavBlob(Vec<u8>);

impl WavBlob {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse the header back out of the blob
    pub fn header(&self) -> Result<WavHeader> {
        WavHeader::parse(&self.0)
    }
}

impl AsRef<[u8]> for WavBlob {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Convert one float sample to 16-bit PCM.
///
/// Clamps to [-1, 1], then scales negatives by 0x8000 and the rest by
/// 0x7FFF, truncating toward zero. NaN encodes as 0. The product is taken in
/// `f64` so values just below an integer step are not rounded up to it.
#[inline]
pub fn sample_to_pcm16(sample: f32) -> i16 {
    let clamped = (sample as f64).clamp(-1.0, 1.0);
    if clamped < 0.0 {
        (clamped * 32768.0) as i16
    } else {
        (clamped * 32767.0) as i16
    }
}

/// Encode a buffer as a channel-major 16-bit PCM WAV blob.
///
/// # Errors
/// `OutputTooLarge` when a header field cannot hold the buffer: more than
/// [`MAX_CHANNELS`] channels, a payload whose RIFF size passes `u32::MAX`
/// (just under 4 GiB), or a byte rate that overflows `u32`.
pub fn encode_wav(buffer: &SampleBuffer) -> Result<WavBlob> {
    let fields = HeaderFields::for_buffer(buffer)?;

    let mut bytes = Vec::with_capacity(WAV_HEADER_LEN + fields.data_len as usize);
    fields.write(&mut bytes);

    for channel in buffer.channels() {
        for &sample in channel {
            bytes.extend_from_slice(&sample_to_pcm16(sample).to_le_bytes());
        }
    }

    Ok(WavBlob(bytes))
}

/// Most channels a 16-bit header can describe (`block_align` is a `u16`)
pub const MAX_CHANNELS: usize = u16::MAX as usize / BYTES_PER_SAMPLE as usize;

/// Header values checked against their field widths
struct HeaderFields {
    channels: u16,
    sample_rate: u32,
    byte_rate: u32,
    block_align: u16,
    data_len: u32,
    riff_len: u32,
}

impl HeaderFields {
    fn for_buffer(buffer: &SampleBuffer) -> Result<Self> {
        let num_channels = buffer.num_channels();
        if num_channels > MAX_CHANNELS {
            return Err(too_large(format!(
                "{} channels (at most {})",
                num_channels, MAX_CHANNELS
            )));
        }

        // MAX_CHANNELS * 2 fits in u16
        let channels = num_channels as u16;
        let block_align = channels * BYTES_PER_SAMPLE as u16;

        let data_len = (buffer.len() as u64)
            .checked_mul(block_align as u64)
            .and_then(|len| u32::try_from(len).ok())
            .ok_or_else(|| {
                too_large(format!(
                    "{} samples x {} channels exceeds the 32-bit data size",
                    buffer.len(),
                    num_channels
                ))
            })?;
        let riff_len = data_len
            .checked_add(WAV_HEADER_LEN as u32 - 8)
            .ok_or_else(|| {
                too_large(format!("data size {} leaves no room for the header", data_len))
            })?;

        let sample_rate = buffer.sample_rate();
        let byte_rate = sample_rate.checked_mul(block_align as u32).ok_or_else(|| {
            too_large(format!(
                "byte rate for {} Hz x {} channels overflows",
                sample_rate, num_channels
            ))
        })?;

        Ok(Self {
            channels,
            sample_rate,
            byte_rate,
            block_align,
            data_len,
            riff_len,
        })
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&self.riff_len.to_le_bytes());
        out.extend_from_slice(b"WAVE");

        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&FMT_CHUNK_LEN.to_le_bytes());
        out.extend_from_slice(&FORMAT_PCM.to_le_bytes());
        out.extend_from_slice(&self.channels.to_le_bytes());
        out.extend_from_slice(&self.sample_rate.to_le_bytes());
        out.extend_from_slice(&self.byte_rate.to_le_bytes());
        out.extend_from_slice(&self.block_align.to_le_bytes());
        out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

        out.extend_from_slice(b"data");
        out.extend_from_slice(&self.data_len.to_le_bytes());
    }
}

// ============================================================================
// Header parsing
// ============================================================================

/// Fields of a canonical 44-byte PCM header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    /// RIFF chunk size (file length - 8)
    pub riff_len: u32,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    /// Payload length in bytes
    pub data_len: u32,
}

impl WavHeader {
    /// Parse the canonical header at the start of `bytes`.
    ///
    /// Only the exact layout produced by [`encode_wav`] is accepted: RIFF,
    /// a 16-byte PCM `fmt ` chunk and a `data` chunk at offset 36.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < WAV_HEADER_LEN {
            return Err(malformed(format!(
                "{} bytes is shorter than the {}-byte header",
                bytes.len(),
                WAV_HEADER_LEN
            )));
        }

        for (offset, tag) in [(0, b"RIFF"), (8, b"WAVE"), (12, b"fmt "), (36, b"data")] {
            if &bytes[offset..offset + 4] != tag {
                return Err(malformed(format!(
                    "expected '{}' at offset {}",
                    String::from_utf8_lossy(tag),
                    offset
                )));
            }
        }

        let fmt_len = read_u32(bytes, 16);
        if fmt_len != FMT_CHUNK_LEN {
            return Err(malformed(format!("fmt chunk length {} (expected 16)", fmt_len)));
        }

        let format = read_u16(bytes, 20);
        if format != FORMAT_PCM {
            return Err(malformed(format!("format tag {} is not PCM", format)));
        }

        Ok(Self {
            riff_len: read_u32(bytes, 4),
            channels: read_u16(bytes, 22),
            sample_rate: read_u32(bytes, 24),
            byte_rate: read_u32(bytes, 28),
            block_align: read_u16(bytes, 32),
            bits_per_sample: read_u16(bytes, 34),
            data_len: read_u32(bytes, 40),
        })
    }

    /// Samples per channel described by the header
    pub fn samples_per_channel(&self) -> usize {
        if self.block_align == 0 {
            return 0;
        }
        (self.data_len / self.block_align as u32) as usize
    }
}

/// Decode a channel-major 16-bit blob back into a float buffer.
///
/// Inverse of [`encode_wav`] up to quantization.
pub fn decode_channel_major(bytes: &[u8]) -> Result<SampleBuffer> {
    let header = WavHeader::parse(bytes)?;
    if header.bits_per_sample != BITS_PER_SAMPLE {
        return Err(VeilError::UnsupportedFormat {
            format: format!("{}-bit payload", header.bits_per_sample),
        });
    }

    if header.block_align as usize != header.channels as usize * 2 {
        return Err(malformed(format!(
            "block align {} does not match {} channels",
            header.block_align, header.channels
        )));
    }

    let payload = &bytes[WAV_HEADER_LEN..];
    if payload.len() < header.data_len as usize {
        return Err(malformed(format!(
            "payload has {} bytes, header declares {}",
            payload.len(),
            header.data_len
        )));
    }

    let per_channel = header.samples_per_channel();
    let samples: Vec<Vec<f32>> = (0..header.channels as usize)
        .map(|ch| {
            payload[ch * per_channel * 2..(ch + 1) * per_channel * 2]
                .chunks_exact(2)
                .map(|pair| {
                    let value = i16::from_le_bytes([pair[0], pair[1]]);
                    if value < 0 {
                        value as f32 / 32768.0
                    } else {
                        value as f32 / 32767.0
                    }
                })
                .collect::<Vec<f32>>()
        })
        .collect();

    SampleBuffer::new(samples, header.sample_rate)
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn malformed(reason: String) -> VeilError {
    VeilError::MalformedWav { reason }
}

fn too_large(reason: String) -> VeilError {
    VeilError::OutputTooLarge { reason }
}
