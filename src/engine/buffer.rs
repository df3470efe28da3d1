//! Sample buffers
//!
//! Non-interleaved multichannel `f32` audio with a fixed sample rate. The
//! same type carries the decoded input and the rendered output; output
//! samples may exceed [-1, 1] (or be non-finite) until WAV encoding clamps
//! them.

use crate::error::{Result, VeilError};

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert linear amplitude to decibels
///
/// Returns -f32::INFINITY for zero input.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        f32::NEG_INFINITY
    } else {
        20.0 * linear.log10()
    }
}

// ============================================================================
// Sample Buffer
// ============================================================================

/// Multichannel audio, one `Vec<f32>` per channel.
///
/// All channels always have the same length.
///
/// # Example
/// ```
/// use voiceveil::engine::SampleBuffer;
///
/// let buffer = SampleBuffer::silence(2, 16000, 16000);
/// assert_eq!(buffer.num_channels(), 2);
/// assert_eq!(buffer.len(), 16000);
/// assert_eq!(buffer.duration_secs(), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<Vec<f32>>,
    sample_rate: u32,
}

impl SampleBuffer {
    /// Build a buffer from per-channel sample vectors.
    ///
    /// # Errors
    /// `InvalidAudio` if the channels differ in length.
    pub fn new(samples: Vec<Vec<f32>>, sample_rate: u32) -> Result<Self> {
        if let Some(first) = samples.first() {
            let expected = first.len();
            if let Some((index, channel)) = samples
                .iter()
                .enumerate()
                .find(|(_, channel)| channel.len() != expected)
            {
                return Err(VeilError::InvalidAudio {
                    reason: format!(
                        "channel {} has {} samples, expected {}",
                        index,
                        channel.len(),
                        expected
                    ),
                    source: None,
                });
            }
        }

        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Single-channel buffer
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples: vec![samples],
            sample_rate,
        }
    }

    /// Zero-filled buffer
    pub fn silence(num_channels: usize, num_samples: usize, sample_rate: u32) -> Self {
        Self {
            samples: vec![vec![0.0; num_samples]; num_channels],
            sample_rate,
        }
    }

    /// De-interleave frame-ordered samples (L, R, L, R, ...).
    ///
    /// # Errors
    /// `InvalidAudio` if the sample count is not a multiple of `num_channels`
    /// or `num_channels` is zero.
    pub fn from_interleaved(interleaved: &[f32], num_channels: usize, sample_rate: u32) -> Result<Self> {
        if num_channels == 0 {
            return Err(VeilError::InvalidAudio {
                reason: "channel count is zero".to_string(),
                source: None,
            });
        }

        if interleaved.len() % num_channels != 0 {
            return Err(VeilError::InvalidAudio {
                reason: format!(
                    "Interleaved data length {} is not divisible by channel count {}",
                    interleaved.len(),
                    num_channels
                ),
                source: None,
            });
        }

        let frames = interleaved.len() / num_channels;
        let mut samples = vec![Vec::with_capacity(frames); num_channels];
        for frame in interleaved.chunks_exact(num_channels) {
            for (ch, &sample) in frame.iter().enumerate() {
                samples[ch].push(sample);
            }
        }

        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Sample rate in Hz
    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of channels
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.samples.len()
    }

    /// Number of samples per channel
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.first().map(|ch| ch.len()).unwrap_or(0)
    }

    /// True when there are no samples in any channel
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.len() as f64 / self.sample_rate as f64
    }

    /// Samples of one channel
    ///
    /// # Panics
    /// If `index` is out of bounds
    #[inline]
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.samples[index]
    }

    /// Mutable samples of one channel
    ///
    /// # Panics
    /// If `index` is out of bounds
    #[inline]
    pub fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        &mut self.samples[index]
    }

    /// Iterate channels in order
    pub fn channels(&self) -> impl Iterator<Item = &[f32]> {
        self.samples.iter().map(Vec::as_slice)
    }

    /// Highest absolute sample value across all channels (NaN is ignored)
    pub fn peak(&self) -> f32 {
        self.samples
            .iter()
            .flat_map(|channel| channel.iter())
            .map(|&s| s.abs())
            .fold(0.0_f32, f32::max)
    }

    /// RMS level of all samples in dB; -inf for empty or silent buffers
    pub fn rms_db(&self) -> f32 {
        let total = self.num_channels() * self.len();
        if total == 0 {
            return f32::NEG_INFINITY;
        }

        let sum_squares: f64 = self
            .samples
            .iter()
            .flat_map(|channel| channel.iter())
            .map(|&s| (s as f64) * (s as f64))
            .sum();

        linear_to_db((sum_squares / total as f64).sqrt() as f32)
    }

    /// Count of NaN or infinite samples.
    ///
    /// Extreme settings can push the spectral stage to non-finite values,
    /// which the WAV encoder silently clamps. Callers that care check this
    /// on the rendered buffer before encoding.
    pub fn non_finite_count(&self) -> usize {
        self.samples
            .iter()
            .flat_map(|channel| channel.iter())
            .filter(|s| !s.is_finite())
            .count()
    }
}
