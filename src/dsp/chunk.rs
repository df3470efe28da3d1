//! Chunk scheduling
//!
//! Splits a channel into consecutive, non-overlapping windows of the FFT
//! size. There is no taper and no overlap-add: each window is transformed
//! on its own, which leaves audible seams every `window_size` samples. That
//! is part of the anonymized sound and is kept as-is.

use std::ops::Range;

use num_complex::Complex;

/// Iterator over the sample ranges `[i*N, min((i+1)*N, len))` of a channel.
#[derive(Debug, Clone)]
pub struct ChunkScheduler {
    len: usize,
    window_size: usize,
    next_start: usize,
}

impl ChunkScheduler {
    /// Schedule a channel of `len` samples into windows of `window_size`
    pub fn new(len: usize, window_size: usize) -> Self {
        assert!(window_size > 0, "window size must be non-zero");
        Self {
            len,
            window_size,
            next_start: 0,
        }
    }

    /// Number of windows needed to cover the channel
    pub fn chunk_count(&self) -> usize {
        self.len.div_ceil(self.window_size)
    }
}

impl Iterator for ChunkScheduler {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_start >= self.len {
            return None;
        }

        let start = self.next_start;
        let end = (start + self.window_size).min(self.len);
        self.next_start = end;
        Some(start..end)
    }
}

/// Copy `samples[range]` into the window as real values and zero the tail.
pub fn load_window(samples: &[f32], range: Range<usize>, window: &mut [Complex<f64>]) {
    let chunk = &samples[range];
    debug_assert!(chunk.len() <= window.len());

    for (slot, &sample) in window.iter_mut().zip(chunk.iter()) {
        *slot = Complex::new(sample as f64, 0.0);
    }
    for slot in window.iter_mut().skip(chunk.len()) {
        *slot = Complex::new(0.0, 0.0);
    }
}
